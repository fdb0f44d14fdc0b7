//! Canonical data model shared by the resolver, the HTTP API and the dashboard client.
//!
//! These types are designed for JSON serialization to the frontend. Field names
//! are camelCase on the wire and `retrievedAt` is rendered as an ISO-8601 string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used whenever a node cannot be placed on the map.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Whether a node is currently serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Node is reachable and serving storage
    Active,
    /// Node is known but not serving
    Offline,
}

impl NodeStatus {
    /// Returns true for [`NodeStatus::Active`].
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, NodeStatus::Active)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Active => write!(f, "active"),
            NodeStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Where the nodes of a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// At least one node was read from a reachable, parseable upstream
    Live,
    /// No upstream produced usable nodes; data is synthetic
    Simulation,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Live => write!(f, "live"),
            SourceMode::Simulation => write!(f, "simulation"),
        }
    }
}

/// One storage node in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Opaque node identifier (usually a 64-char hex or base58 pubkey)
    pub identity: String,
    /// Dotted-quad IPv4 address
    pub network_address: String,
    /// Storage capacity in terabytes
    pub storage_capacity: f64,
    /// Uptime percentage in [0, 100]
    pub uptime_ratio: f64,
    /// Latitude in [-90, 90]
    pub latitude: f64,
    /// Longitude in [-180, 180]
    pub longitude: f64,
    /// Operational state
    pub operational_state: NodeStatus,
    /// Human-readable place name, e.g. "Tokyo, JP"
    pub location_label: String,
}

impl Node {
    /// Check that the coordinates are finite and inside their geographic ranges.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        is_valid_latitude(self.latitude) && is_valid_longitude(self.longitude)
    }

    /// Check every range invariant a node must satisfy before it is handed to callers.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.identity.is_empty()
            && self.has_valid_coordinates()
            && self.storage_capacity.is_finite()
            && self.storage_capacity >= 0.0
            && self.uptime_ratio.is_finite()
            && (0.0..=100.0).contains(&self.uptime_ratio)
    }

    /// Whether the node is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.operational_state.is_active()
    }

    /// First 8 characters of the identity, for compact display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let end = self
            .identity
            .char_indices()
            .nth(8)
            .map_or(self.identity.len(), |(i, _)| i);
        &self.identity[..end]
    }
}

/// Finite latitude within [-90, 90].
#[must_use]
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Finite longitude within [-180, 180].
#[must_use]
pub fn is_valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// Result of one network status resolution.
///
/// Built fresh on every call and never mutated afterwards. `node_count` always
/// equals `nodes.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    /// Nodes in upstream (or generation) order
    pub nodes: Vec<Node>,
    /// Live or simulated data
    pub source_mode: SourceMode,
    /// Number of nodes
    pub node_count: usize,
    /// When the response was assembled
    pub retrieved_at: DateTime<Utc>,
}

impl NetworkResponse {
    /// Assemble a response stamped with the current time.
    #[must_use]
    pub fn new(nodes: Vec<Node>, source_mode: SourceMode) -> Self {
        Self {
            node_count: nodes.len(),
            nodes,
            source_mode,
            retrieved_at: Utc::now(),
        }
    }

    /// Response built from live upstream data.
    #[must_use]
    pub fn live(nodes: Vec<Node>) -> Self {
        Self::new(nodes, SourceMode::Live)
    }

    /// Response built from simulated data.
    #[must_use]
    pub fn simulation(nodes: Vec<Node>) -> Self {
        Self::new(nodes, SourceMode::Simulation)
    }

    /// Whether the data came from a live upstream.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.source_mode == SourceMode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> Node {
        Node {
            identity: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                .to_string(),
            network_address: "10.0.0.1".to_string(),
            storage_capacity: 120.5,
            uptime_ratio: 97.25,
            latitude: 40.7,
            longitude: -74.0,
            operational_state: NodeStatus::Active,
            location_label: "New York, US".to_string(),
        }
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let json = serde_json::to_value(sample_node()).unwrap();
        assert_eq!(json["networkAddress"], "10.0.0.1");
        assert_eq!(json["storageCapacity"], 120.5);
        assert_eq!(json["operationalState"], "active");
        assert_eq!(json["locationLabel"], "New York, US");
    }

    #[test]
    fn test_response_count_matches_nodes() {
        let response = NetworkResponse::live(vec![sample_node(), sample_node()]);
        assert_eq!(response.node_count, 2);
        assert!(response.is_live());

        let empty = NetworkResponse::simulation(Vec::new());
        assert_eq!(empty.node_count, 0);
        assert_eq!(empty.source_mode, SourceMode::Simulation);
    }

    #[test]
    fn test_retrieved_at_is_iso8601_and_restores() {
        let response = NetworkResponse::simulation(vec![sample_node()]);
        let json = serde_json::to_string(&response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stamp = value["retrievedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(value["sourceMode"], "simulation");

        let restored: NetworkResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, response);
    }

    #[test]
    fn test_coordinate_validation() {
        let mut node = sample_node();
        assert!(node.is_well_formed());

        node.latitude = f64::NAN;
        assert!(!node.has_valid_coordinates());

        node.latitude = 91.0;
        assert!(!node.has_valid_coordinates());

        node.latitude = 0.0;
        node.longitude = f64::INFINITY;
        assert!(!node.has_valid_coordinates());
    }

    #[test]
    fn test_well_formed_rejects_bad_telemetry() {
        let mut node = sample_node();
        node.uptime_ratio = 100.5;
        assert!(!node.is_well_formed());

        let mut node = sample_node();
        node.storage_capacity = -1.0;
        assert!(!node.is_well_formed());

        let mut node = sample_node();
        node.identity.clear();
        assert!(!node.is_well_formed());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(sample_node().short_id(), "9f86d081");
        let mut node = sample_node();
        node.identity = "abc".to_string();
        assert_eq!(node.short_id(), "abc");
    }
}
