//! HTTP API for the dashboard.
//!
//! # API Endpoints
//!
//! - `GET /api/network-status` - Freshly resolved [`NetworkResponse`]
//! - `GET /api/summary` - Headline figures, rankings and distributions
//! - `GET /health` - Liveness check
//!
//! Every request resolves anew; responses carry a `Cache-Control` header so
//! an HTTP cache in front of the service can absorb bursts of dashboard loads.

use crate::config::ServerConfig;
use crate::resolver::NetworkStatusResolver;
use crate::rpc::RpcTransport;
use crate::stats::{
    Bucket, DEFAULT_TOP_NODES, NetworkSummary, region_breakdown, top_nodes, version_breakdown,
};
use crate::types::{NetworkResponse, Node, SourceMode};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use warp::Filter;

/// Response body of `GET /api/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// Source of the nodes the summary was computed over
    pub source_mode: SourceMode,
    /// When the underlying nodes were resolved
    pub retrieved_at: DateTime<Utc>,
    /// Headline figures
    #[serde(flatten)]
    pub summary: NetworkSummary,
    /// Best active nodes, best first
    pub top_nodes: Vec<Node>,
    /// Node count per region
    pub regions: Vec<Bucket>,
    /// Node count per version bucket
    pub versions: Vec<Bucket>,
}

impl SummaryResponse {
    /// Summarize a resolved response.
    #[must_use]
    pub fn from_response(response: &NetworkResponse) -> Self {
        Self {
            source_mode: response.source_mode,
            retrieved_at: response.retrieved_at,
            summary: NetworkSummary::from_nodes(&response.nodes),
            top_nodes: top_nodes(&response.nodes, DEFAULT_TOP_NODES)
                .into_iter()
                .cloned()
                .collect(),
            regions: region_breakdown(&response.nodes),
            versions: version_breakdown(&response.nodes),
        }
    }
}

/// Create the API routes.
pub fn status_routes<T>(
    resolver: Arc<NetworkStatusResolver<T>>,
    revalidate: Duration,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
where
    T: RpcTransport + 'static,
{
    let cache_control = cache_control_value(revalidate);

    let api_status = warp::path!("api" / "network-status")
        .and(warp::get())
        .and(with_resolver(resolver.clone()))
        .and(warp::any().map(move || cache_control.clone()))
        .and_then(get_network_status);

    let api_summary = warp::path!("api" / "summary")
        .and(warp::get())
        .and(with_resolver(resolver))
        .and_then(get_summary);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            }))
        });

    api_status.or(api_summary).or(health)
}

/// Bind and serve until Ctrl+C.
pub async fn serve<T>(config: &ServerConfig, resolver: Arc<NetworkStatusResolver<T>>) -> anyhow::Result<()>
where
    T: RpcTransport + 'static,
{
    let routes = status_routes(resolver, config.revalidate).with(warp::log("pnode_status::api"));

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(config.bind_addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(%addr, "network status API listening");
    server.await;
    info!("network status API stopped");
    Ok(())
}

fn cache_control_value(revalidate: Duration) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate",
        revalidate.as_secs()
    )
}

fn with_resolver<T>(
    resolver: Arc<NetworkStatusResolver<T>>,
) -> impl Filter<Extract = (Arc<NetworkStatusResolver<T>>,), Error = std::convert::Infallible> + Clone
where
    T: RpcTransport + 'static,
{
    warp::any().map(move || resolver.clone())
}

async fn get_network_status<T: RpcTransport>(
    resolver: Arc<NetworkStatusResolver<T>>,
    cache_control: String,
) -> Result<impl warp::Reply, warp::Rejection> {
    let response = resolver.resolve().await;
    Ok(warp::reply::with_header(
        warp::reply::json(&response),
        "Cache-Control",
        cache_control,
    ))
}

async fn get_summary<T: RpcTransport>(
    resolver: Arc<NetworkStatusResolver<T>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let response = resolver.resolve().await;
    Ok(warp::reply::json(&SummaryResponse::from_response(&response)))
}
