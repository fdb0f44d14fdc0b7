//! Network status resolution.
//!
//! The resolver walks an ordered chain of upstream strategies and returns the
//! first one that produces at least one usable node. When every strategy fails
//! it serves a simulated node set instead. Callers always get a
//! [`NetworkResponse`]; failures are only visible in the logs.
//!
//! # Strategy chain
//!
//! ```text
//!  ┌──────────────────────────────┐  ok   ┌────────────────┐
//!  │ 1. primary  getClusterNodes  │──────►│ live response  │
//!  │    (10s)                     │       └────────────────┘
//!  └──────────────┬───────────────┘               ▲
//!                 │ error / timeout / empty       │
//!  ┌──────────────▼───────────────┐  ok           │
//!  │ 2. primary  getClusterInfo   │───────────────┤
//!  │    (10s, result.clusterNodes)│               │
//!  └──────────────┬───────────────┘               │
//!                 │                               │
//!  ┌──────────────▼───────────────┐  ok           │
//!  │ 3. secondary getClusterNodes │───────────────┘
//!  │    (15s, addressed records)  │
//!  └──────────────┬───────────────┘
//!                 │
//!  ┌──────────────▼───────────────┐
//!  │ 4. simulation (50 nodes)     │
//!  └──────────────────────────────┘
//! ```
//!
//! Strategies run strictly one after another. Each call has its own timer and
//! expiry cancels only that call. Resolutions share no mutable state, so any
//! number may run concurrently against one resolver.

use crate::config::ResolverConfig;
use crate::error::StrategyError;
use crate::normalize::{RawRecord, RecordShape, normalize_batch};
use crate::rpc::{
    HttpTransport, METHOD_GET_CLUSTER_INFO, METHOD_GET_CLUSTER_NODES, RpcRequest, RpcTransport,
    into_result,
};
use crate::simulation::generate_simulation;
use crate::types::{Node, NetworkResponse};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where a strategy finds the node list inside `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// `result` is the node array
    NodeList,
    /// `result.clusterNodes` is the node array
    NestedClusterNodes,
    /// `result` is the node array; only records with an address are kept
    AddressedNodeList,
}

impl ResultShape {
    /// Pull the raw records out of an RPC `result`. Empty lists are failures.
    pub fn extract(self, result: Value) -> Result<Vec<Value>, StrategyError> {
        let records = match self {
            ResultShape::NodeList => into_array(result, "array of cluster nodes")?,
            ResultShape::NestedClusterNodes => {
                let Value::Object(mut info) = result else {
                    return Err(StrategyError::UnexpectedShape("cluster info object"));
                };
                let nodes = info
                    .remove("clusterNodes")
                    .ok_or(StrategyError::UnexpectedShape("result.clusterNodes"))?;
                into_array(nodes, "result.clusterNodes array")?
            }
            ResultShape::AddressedNodeList => {
                into_array(result, "array of cluster nodes")?
                    .into_iter()
                    .filter(has_address)
                    .collect()
            }
        };

        if records.is_empty() {
            Err(StrategyError::Empty)
        } else {
            Ok(records)
        }
    }
}

fn into_array(value: Value, expected: &'static str) -> Result<Vec<Value>, StrategyError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(StrategyError::UnexpectedShape(expected)),
    }
}

fn has_address(value: &Value) -> bool {
    matches!(
        RawRecord::from_value(value, RecordShape::ClusterNode),
        Some(RawRecord::ClusterNode(record)) if record.has_address()
    )
}

/// One upstream query in the resolution chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    /// Stable name used in logs and probe reports
    pub name: &'static str,
    /// JSON-RPC endpoint URL
    pub endpoint: String,
    /// RPC method
    pub method: &'static str,
    /// Time budget for the call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Location of the node list in the result
    pub shape: ResultShape,
}

impl Strategy {
    /// The standard chain, in priority order.
    #[must_use]
    pub fn chain(config: &ResolverConfig) -> Vec<Strategy> {
        vec![
            Strategy {
                name: "primary-cluster-nodes",
                endpoint: config.primary_rpc_url.clone(),
                method: METHOD_GET_CLUSTER_NODES,
                timeout: config.primary_timeout,
                shape: ResultShape::NodeList,
            },
            Strategy {
                name: "primary-cluster-info",
                endpoint: config.primary_rpc_url.clone(),
                method: METHOD_GET_CLUSTER_INFO,
                timeout: config.primary_timeout,
                shape: ResultShape::NestedClusterNodes,
            },
            Strategy {
                name: "secondary-cluster-nodes",
                endpoint: config.secondary_rpc_url.clone(),
                method: METHOD_GET_CLUSTER_NODES,
                timeout: config.secondary_timeout,
                shape: ResultShape::AddressedNodeList,
            },
        ]
    }
}

/// Outcome of probing one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ProbeOutcome {
    /// Strategy produced usable nodes
    Ok {
        /// Number of normalized nodes
        nodes: usize,
    },
    /// Strategy failed
    Failed {
        /// Failure description
        error: String,
    },
}

/// Diagnostic report for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Strategy name
    pub strategy: String,
    /// Endpoint queried
    pub endpoint: String,
    /// RPC method used
    pub method: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    /// Wall-clock time spent
    pub elapsed_ms: u64,
}

impl ProbeReport {
    /// Whether the strategy produced nodes.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Ok { .. })
    }
}

/// Resolves the current network status through the strategy chain.
#[derive(Debug, Clone)]
pub struct NetworkStatusResolver<T = HttpTransport> {
    config: ResolverConfig,
    strategies: Vec<Strategy>,
    transport: T,
}

impl NetworkStatusResolver<HttpTransport> {
    /// Resolver talking HTTP to the configured endpoints.
    pub fn from_config(config: ResolverConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(config, HttpTransport::new()?))
    }
}

impl<T: RpcTransport> NetworkStatusResolver<T> {
    /// Resolver using the standard chain over `transport`.
    #[must_use]
    pub fn new(config: ResolverConfig, transport: T) -> Self {
        let strategies = Strategy::chain(&config);
        Self {
            config,
            strategies,
            transport,
        }
    }

    /// Resolver with a custom strategy chain.
    #[must_use]
    pub fn with_strategies(config: ResolverConfig, strategies: Vec<Strategy>, transport: T) -> Self {
        Self {
            config,
            strategies,
            transport,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Strategies in priority order.
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the network status. Never fails.
    pub async fn resolve(&self) -> NetworkResponse {
        let mut rng = self.new_rng();
        self.resolve_with_rng(&mut rng).await
    }

    /// Resolve using a caller-supplied random source for synthesized values.
    pub async fn resolve_with_rng<R: Rng + Send>(&self, rng: &mut R) -> NetworkResponse {
        for strategy in &self.strategies {
            match self.attempt(strategy, rng).await {
                Ok(nodes) => {
                    info!(
                        strategy = strategy.name,
                        endpoint = %strategy.endpoint,
                        node_count = nodes.len(),
                        "resolved live network status"
                    );
                    return NetworkResponse::live(nodes);
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name,
                        endpoint = %strategy.endpoint,
                        error = %e,
                        "strategy failed, trying next"
                    );
                }
            }
        }

        warn!(
            count = self.config.simulation_count,
            "all live strategies failed, serving simulated network"
        );
        NetworkResponse::simulation(generate_simulation(self.config.simulation_count, rng))
    }

    /// Run every strategy once without short-circuiting and report each outcome.
    pub async fn probe(&self) -> Vec<ProbeReport> {
        let mut rng = self.new_rng();
        let mut reports = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let started = Instant::now();
            let outcome = match self.attempt(strategy, &mut rng).await {
                Ok(nodes) => ProbeOutcome::Ok { nodes: nodes.len() },
                Err(e) => ProbeOutcome::Failed {
                    error: e.to_string(),
                },
            };
            reports.push(ProbeReport {
                strategy: strategy.name.to_string(),
                endpoint: strategy.endpoint.clone(),
                method: strategy.method.to_string(),
                outcome,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        reports
    }

    async fn attempt<R: Rng + Send>(
        &self,
        strategy: &Strategy,
        rng: &mut R,
    ) -> Result<Vec<Node>, StrategyError> {
        debug!(
            strategy = strategy.name,
            endpoint = %strategy.endpoint,
            method = strategy.method,
            timeout = ?strategy.timeout,
            "attempting strategy"
        );

        let request = RpcRequest::new(strategy.method);
        let body = tokio::time::timeout(
            strategy.timeout,
            self.transport.call(&strategy.endpoint, &request),
        )
        .await
        .map_err(|_| StrategyError::Timeout(strategy.timeout))??;

        let result = into_result(body)?;
        let records = strategy.shape.extract(result)?;
        let nodes = normalize_batch(&records, RecordShape::ClusterNode, rng);

        if nodes.is_empty() {
            Err(StrategyError::Empty)
        } else {
            Ok(nodes)
        }
    }

    fn new_rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
