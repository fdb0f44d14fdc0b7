//! pNode Network Status
//!
//! This crate resolves the state of a storage pNode network for dashboards,
//! including:
//!
//! - **Strategy Chain**: Ordered JSON-RPC queries against the storage network
//!   and an independent cluster, each with its own timeout
//! - **Normalization**: Heterogeneous upstream records turned into one
//!   canonical [`Node`] shape, with malformed records repaired or dropped
//! - **Simulation Fallback**: A synthetic node set whenever no live source
//!   produces usable data
//! - **HTTP API**: `GET /api/network-status` and `GET /api/summary` for the
//!   dashboard frontend
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     NetworkStatusResolver                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │   primary getClusterNodes ─► primary getClusterInfo ─► secondary  │
//! │          │                          │                     │       │
//! │          └──────────────┬───────────┴─────────────────────┘       │
//! │                         ▼                                         │
//! │                    Normalizer ──► Location Estimator              │
//! │                         │                                         │
//! │            nodes? ──yes─┴─► NetworkResponse { live }              │
//! │              │                                                    │
//! │              no ──► Simulation ──► NetworkResponse { simulation } │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pnode_status::{NetworkStatusResolver, ResolverConfig};
//!
//! let resolver = NetworkStatusResolver::from_config(ResolverConfig::from_env())?;
//! let status = resolver.resolve().await; // never fails
//! println!("{} nodes ({})", status.node_count, status.source_mode);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod normalize;
pub mod resolver;
pub mod rpc;
pub mod server;
pub mod simulation;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use client::DashboardClient;
pub use config::{AppConfig, ResolverConfig, ServerConfig};
pub use error::{ConfigError, StrategyError};
pub use location::{GeoEstimate, estimate as estimate_location};
pub use normalize::{ApiNodeRecord, ClusterNodeRecord, RawRecord, RecordShape, normalize};
pub use resolver::{NetworkStatusResolver, ProbeOutcome, ProbeReport, ResultShape, Strategy};
pub use rpc::{HttpTransport, RpcRequest, RpcTransport};
pub use server::{SummaryResponse, serve, status_routes};
pub use simulation::generate_simulation;
pub use stats::{NetworkSummary, performance_score, top_node, top_nodes};
pub use types::{NetworkResponse, Node, NodeStatus, SourceMode};
