//! Dashboard-side client for the status API.
//!
//! The dashboard must never show an unhandled failure. If the API cannot be
//! reached or answers with garbage, [`DashboardClient::fetch`] substitutes a
//! locally generated simulation so there is still something to render.

use crate::config::DEFAULT_SIMULATION_COUNT;
use crate::simulation::generate_simulation;
use crate::types::NetworkResponse;
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the network status endpoint.
pub const NETWORK_STATUS_PATH: &str = "/api/network-status";

/// Client for the status API.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: String,
    client: reqwest::Client,
    fallback_count: usize,
}

impl DashboardClient {
    /// Client for the API at `base_url` (e.g. `http://localhost:8080`).
    ///
    /// The timeout has to cover a full resolution on the server side, which
    /// may walk the whole strategy chain.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            fallback_count: DEFAULT_SIMULATION_COUNT,
        })
    }

    /// Number of simulated nodes substituted on failure.
    #[must_use]
    pub fn with_fallback_count(mut self, count: usize) -> Self {
        self.fallback_count = count;
        self
    }

    /// Full URL of the status endpoint.
    #[must_use]
    pub fn status_url(&self) -> String {
        format!("{}{}", self.base_url, NETWORK_STATUS_PATH)
    }

    /// Fetch the network status, substituting a local simulation on any failure.
    pub async fn fetch(&self) -> NetworkResponse {
        match self.try_fetch().await {
            Ok(response) => response,
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(
                    url = %self.status_url(),
                    error = %reason,
                    "status API unavailable, using local simulation"
                );
                let mut rng = StdRng::from_entropy();
                NetworkResponse::simulation(generate_simulation(self.fallback_count, &mut rng))
            }
        }
    }

    /// Fetch the network status, reporting failures.
    ///
    /// Nodes violating the range invariants are dropped and `nodeCount` is
    /// recomputed from what remains.
    pub async fn try_fetch(&self) -> Result<NetworkResponse> {
        let url = self.status_url();
        debug!(%url, "fetching network status");

        let received: NetworkResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .context("status API returned an error status")?
            .json()
            .await
            .context("status API returned an invalid body")?;

        let nodes: Vec<_> = received
            .nodes
            .into_iter()
            .filter(|n| n.is_well_formed())
            .collect();

        Ok(NetworkResponse {
            node_count: nodes.len(),
            nodes,
            source_mode: received.source_mode,
            retrieved_at: received.retrieved_at,
        })
    }
}
