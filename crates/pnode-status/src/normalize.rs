//! Conversion of upstream records into canonical [`Node`]s.
//!
//! Upstreams speak two dialects:
//!
//! - **Cluster topology** records from `getClusterNodes`-style RPC methods: an
//!   identity under one of several keys plus gossip/TPU/RPC socket addresses.
//!   They carry no telemetry, so capacity and uptime are synthesized.
//! - **API** records from first-party HTTP endpoints: flat objects with
//!   coordinates, capacity, uptime and status, often with numbers as strings.
//!
//! Each dialect is parsed into its own variant of [`RawRecord`] by probing a
//! fixed list of field names, then normalized by a dedicated function. A record
//! that cannot be repaired yields `None` and is dropped from the batch.

use crate::location::{self, GeoEstimate};
use crate::simulation::{random_ipv4, random_pubkey, synthesize_storage, synthesize_uptime};
use crate::types::{Node, NodeStatus, UNKNOWN_LOCATION, is_valid_latitude, is_valid_longitude};
use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

/// First dotted-quad shaped substring. Octets are not range checked here.
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)").expect("IPv4 pattern is valid")
});

const GOSSIP_KEYS: &[&str] = &["gossip", "gossipAddr", "gossipAddress"];
const TPU_KEYS: &[&str] = &["tpu", "tpuAddress"];
const RPC_KEYS: &[&str] = &["rpc", "rpcAddress"];
const IDENTITY_KEYS: &[&str] = &["pubkey", "identity", "publicKey"];

/// Keys inside an object-valued identity that hold its canonical string form.
const IDENTITY_OBJECT_KEYS: &[&str] = &["base58", "value", "key", "pubkey"];

/// Which dialect a batch of raw records is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// RPC cluster topology records
    ClusterNode,
    /// Flat first-party API records
    Api,
}

/// An upstream record, resolved into one of the known dialects.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// RPC cluster topology record
    ClusterNode(ClusterNodeRecord),
    /// Flat API record
    Api(ApiNodeRecord),
}

impl RawRecord {
    /// Interpret a JSON value in the given dialect. Non-objects yield `None`.
    #[must_use]
    pub fn from_value(value: &Value, shape: RecordShape) -> Option<Self> {
        let obj = value.as_object()?;
        Some(match shape {
            RecordShape::ClusterNode => RawRecord::ClusterNode(ClusterNodeRecord::from_map(obj)),
            RecordShape::Api => RawRecord::Api(ApiNodeRecord::from_map(obj)),
        })
    }
}

/// Identity value as found upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityValue {
    /// Plain string key
    Text(String),
    /// Numeric identifier
    Number(serde_json::Number),
    /// Boolean (seen on broken upstreams; coerced like any scalar)
    Bool(bool),
    /// Raw key bytes, e.g. `[12, 200, ...]`
    Bytes(Vec<u8>),
    /// Structured key object such as `{"base58": "..."}`
    Object(Map<String, Value>),
}

impl IdentityValue {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(IdentityValue::Text(s.clone())),
            Value::Number(n) => Some(IdentityValue::Number(n.clone())),
            Value::Bool(b) => Some(IdentityValue::Bool(*b)),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(IdentityValue::Bytes),
            Value::Object(map) => Some(IdentityValue::Object(map.clone())),
        }
    }

    /// Canonical string form, or `None` when the value carries no usable identity.
    #[must_use]
    pub fn to_identity(&self) -> Option<String> {
        let text = match self {
            IdentityValue::Text(s) => s.trim().to_string(),
            IdentityValue::Number(n) => n.to_string(),
            IdentityValue::Bool(b) => b.to_string(),
            IdentityValue::Bytes(bytes) => hex::encode(bytes),
            IdentityValue::Object(map) => IDENTITY_OBJECT_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string())?,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Record from an RPC cluster topology listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterNodeRecord {
    /// Gossip socket address
    pub gossip: Option<String>,
    /// TPU socket address
    pub tpu: Option<String>,
    /// RPC socket address
    pub rpc: Option<String>,
    /// Identity candidates in probe order (`pubkey`, `identity`, `publicKey`)
    pub identities: Vec<IdentityValue>,
    /// Software version string
    pub version: Option<String>,
}

impl ClusterNodeRecord {
    fn from_map(obj: &Map<String, Value>) -> Self {
        Self {
            gossip: first_text(obj, GOSSIP_KEYS),
            tpu: first_text(obj, TPU_KEYS),
            rpc: first_text(obj, RPC_KEYS),
            identities: IDENTITY_KEYS
                .iter()
                .filter_map(|k| obj.get(*k).and_then(IdentityValue::from_value))
                .collect(),
            version: first_text(obj, &["version"]),
        }
    }

    /// Address field in priority order: gossip, then TPU, then RPC.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.gossip
            .as_deref()
            .or(self.tpu.as_deref())
            .or(self.rpc.as_deref())
    }

    /// Whether any of the three address fields is present.
    #[must_use]
    pub fn has_address(&self) -> bool {
        self.address().is_some()
    }

    /// First identity candidate that converts to a non-empty string.
    #[must_use]
    pub fn identity(&self) -> Option<String> {
        self.identities.iter().find_map(IdentityValue::to_identity)
    }
}

/// Record from a flat first-party API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiNodeRecord {
    /// Identity from `pubkey`, `id` or `address`
    pub identity: Option<String>,
    /// Address from `ip` or `ipAddress`
    pub ip: Option<String>,
    /// Latitude from `lat` or `latitude`, coerced from strings
    pub latitude: Option<f64>,
    /// Longitude from `lng` or `longitude`, coerced from strings
    pub longitude: Option<f64>,
    /// Capacity in TB from `storage` or `capacity`
    pub storage: Option<f64>,
    /// Uptime percent from `uptime` or `uptimePercentage`
    pub uptime: Option<f64>,
    /// Textual status
    pub status: Option<String>,
    /// Boolean liveness flag
    pub online: Option<bool>,
    /// Label from `location` or `city`
    pub location: Option<String>,
}

impl ApiNodeRecord {
    fn from_map(obj: &Map<String, Value>) -> Self {
        Self {
            identity: ["pubkey", "id", "address"]
                .iter()
                .filter_map(|k| obj.get(*k).and_then(IdentityValue::from_value))
                .find_map(|v| v.to_identity()),
            ip: first_text(obj, &["ip", "ipAddress"]),
            latitude: first_number(obj, &["lat", "latitude"]),
            longitude: first_number(obj, &["lng", "longitude"]),
            storage: first_number(obj, &["storage", "capacity"]),
            uptime: first_number(obj, &["uptime", "uptimePercentage"]),
            status: first_text(obj, &["status"]),
            online: obj.get("online").and_then(Value::as_bool),
            location: first_text(obj, &["location", "city"]),
        }
    }
}

/// Normalize one record. `None` means the record is unusable and is dropped.
pub fn normalize<R: Rng + ?Sized>(record: &RawRecord, rng: &mut R) -> Option<Node> {
    let node = match record {
        RawRecord::ClusterNode(r) => normalize_cluster_node(r, rng)?,
        RawRecord::Api(r) => normalize_api_node(r, rng),
    };
    if node.is_well_formed() {
        Some(node)
    } else {
        debug!(identity = %node.identity, "dropping node that violates range invariants");
        None
    }
}

/// Normalize a batch of JSON values in the given dialect, dropping unusable ones.
pub fn normalize_batch<R: Rng + ?Sized>(
    values: &[Value],
    shape: RecordShape,
    rng: &mut R,
) -> Vec<Node> {
    let nodes: Vec<Node> = values
        .iter()
        .filter_map(|value| {
            let record = RawRecord::from_value(value, shape);
            if record.is_none() {
                debug!("dropping non-object record");
            }
            record
        })
        .filter_map(|record| normalize(&record, rng))
        .collect();

    if nodes.len() < values.len() {
        debug!(
            received = values.len(),
            kept = nodes.len(),
            "dropped malformed records"
        );
    }
    nodes
}

/// Normalize an RPC cluster topology record.
///
/// Capacity and uptime are synthesized: topology feeds carry no telemetry and
/// consumers rely on the value ranges being populated.
pub fn normalize_cluster_node<R: Rng + ?Sized>(
    record: &ClusterNodeRecord,
    rng: &mut R,
) -> Option<Node> {
    let Some(address) = record.address() else {
        debug!("dropping record without gossip/tpu/rpc address");
        return None;
    };
    let Some(identity) = record.identity() else {
        debug!(address, "dropping record without identity");
        return None;
    };

    let network_address = extract_ipv4(address).unwrap_or_else(|| random_ipv4(rng));
    let geo = location::estimate(&network_address, rng);

    let operational_state = if record.version.is_some() || !address.is_empty() {
        NodeStatus::Active
    } else {
        NodeStatus::Offline
    };

    Some(Node {
        identity,
        network_address,
        storage_capacity: synthesize_storage(rng),
        uptime_ratio: synthesize_uptime(rng),
        latitude: geo.latitude,
        longitude: geo.longitude,
        operational_state,
        location_label: geo.label,
    })
}

/// Normalize a flat API record.
///
/// This path is trusted more than topology feeds, so bad coordinates are
/// repaired to the neutral placement instead of dropping the record.
pub fn normalize_api_node<R: Rng + ?Sized>(record: &ApiNodeRecord, rng: &mut R) -> Node {
    let coords = record
        .latitude
        .zip(record.longitude)
        .filter(|(lat, lng)| is_valid_latitude(*lat) && is_valid_longitude(*lng));

    let geo = match coords {
        Some((latitude, longitude)) => GeoEstimate {
            latitude,
            longitude,
            label: record
                .location
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        },
        None => GeoEstimate::unknown(),
    };

    let storage_capacity = record
        .storage
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or_else(|| synthesize_storage(rng));
    let uptime_ratio = record
        .uptime
        .filter(|u| u.is_finite() && (0.0..=100.0).contains(u))
        .unwrap_or_else(|| synthesize_uptime(rng));

    let active = record.status.as_deref() == Some("active") || record.online == Some(true);

    Node {
        identity: record
            .identity
            .clone()
            .unwrap_or_else(|| random_pubkey(rng)),
        network_address: record
            .ip
            .as_deref()
            .and_then(extract_ipv4)
            .unwrap_or_else(|| random_ipv4(rng)),
        storage_capacity,
        uptime_ratio,
        latitude: geo.latitude,
        longitude: geo.longitude,
        operational_state: if active {
            NodeStatus::Active
        } else {
            NodeStatus::Offline
        },
        location_label: geo.label,
    }
}

/// First dotted-quad shaped substring of `text`.
#[must_use]
pub fn extract_ipv4(text: &str) -> Option<String> {
    IPV4_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
