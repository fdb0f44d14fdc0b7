//! Aggregate figures derived from a node list.
//!
//! These back the headline cards of the dashboard: total capacity, active
//! node count, network health and the top performers.

use crate::location::first_octet;
use crate::types::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capacity at which the storage component of the score saturates, in TB.
pub const SCORE_STORAGE_CEILING_TB: f64 = 500.0;

/// Default size of the top-node ranking.
pub const DEFAULT_TOP_NODES: usize = 25;

/// Headline figures for a node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    /// Sum of all node capacities, in petabytes
    pub total_capacity_pb: f64,
    /// Number of active nodes
    pub active_nodes: usize,
    /// Total number of nodes
    pub total_nodes: usize,
    /// Mean uptime across all nodes, in percent (0 when empty)
    pub network_health: f64,
    /// Best performing active node
    pub top_node: Option<Node>,
}

impl NetworkSummary {
    /// Compute the summary of `nodes`.
    #[must_use]
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let total_tb: f64 = nodes.iter().map(|n| n.storage_capacity).sum();
        let network_health = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(|n| n.uptime_ratio).sum::<f64>() / nodes.len() as f64
        };

        Self {
            total_capacity_pb: total_tb / 1000.0,
            active_nodes: nodes.iter().filter(|n| n.is_active()).count(),
            total_nodes: nodes.len(),
            network_health,
            top_node: top_node(nodes).cloned(),
        }
    }
}

/// Weighted performance score: 60% capacity (saturating at 500 TB), 40% uptime.
/// Offline nodes score 0.
#[must_use]
pub fn performance_score(node: &Node) -> f64 {
    if !node.is_active() {
        return 0.0;
    }
    let storage_score = (node.storage_capacity / SCORE_STORAGE_CEILING_TB).min(1.0);
    let uptime_score = node.uptime_ratio / 100.0;
    storage_score * 0.6 + uptime_score * 0.4
}

/// Highest scoring active node. Ties keep the earliest node.
#[must_use]
pub fn top_node(nodes: &[Node]) -> Option<&Node> {
    nodes
        .iter()
        .filter(|n| n.is_active())
        .fold(None, |best: Option<(&Node, f64)>, node| {
            let score = performance_score(node);
            match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((node, score)),
            }
        })
        .map(|(node, _)| node)
}

/// Up to `count` active nodes ordered by score, best first.
#[must_use]
pub fn top_nodes(nodes: &[Node], count: usize) -> Vec<&Node> {
    let mut ranked: Vec<(&Node, f64)> = nodes
        .iter()
        .filter(|n| n.is_active())
        .map(|n| (n, performance_score(n)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(count).map(|(n, _)| n).collect()
}

/// Coarse world region used for distribution charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// North and South America
    #[serde(rename = "North America")]
    NorthAmerica,
    /// Europe and Russia
    Europe,
    /// Asia and Oceania
    #[serde(rename = "Asia Pacific")]
    AsiaPacific,
    /// Anything else
    Other,
    /// No usable hint
    Unknown,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::AsiaPacific => "Asia Pacific",
            Region::Other => "Other",
            Region::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Region of a node, from the country code that ends its location label, or
/// from the address band when the label has no country.
#[must_use]
pub fn region_of(node: &Node) -> Region {
    if let Some((_, country)) = node.location_label.rsplit_once(',') {
        return match country.trim() {
            "US" | "MX" | "BR" | "CA" => Region::NorthAmerica,
            "GB" | "DE" | "FR" | "RU" => Region::Europe,
            "JP" | "CN" | "SG" | "AU" => Region::AsiaPacific,
            _ => Region::Other,
        };
    }

    match first_octet(&node.network_address) {
        Some(0..=63) => Region::NorthAmerica,
        Some(64..=127) => Region::Europe,
        Some(128..=191) => Region::AsiaPacific,
        Some(_) => Region::Other,
        None => Region::Unknown,
    }
}

/// One bar or slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket label
    pub name: String,
    /// Number of nodes in the bucket
    pub count: usize,
}

/// Node counts per region, largest first, ties by name.
#[must_use]
pub fn region_breakdown(nodes: &[Node]) -> Vec<Bucket> {
    let mut counts: HashMap<Region, usize> = HashMap::new();
    for node in nodes {
        *counts.entry(region_of(node)).or_default() += 1;
    }
    into_sorted_buckets(counts.into_iter().map(|(r, c)| (r.to_string(), c)))
}

/// Illustrative software-version buckets derived from uptime, largest first.
///
/// Upstreams do not report versions for every node, so the dashboard buckets
/// by uptime: >98% v2.0.0, >95% v1.5.0, >90% v1.2.0, else v1.0.0.
#[must_use]
pub fn version_breakdown(nodes: &[Node]) -> Vec<Bucket> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for node in nodes {
        let version = match node.uptime_ratio {
            u if u > 98.0 => "v2.0.0",
            u if u > 95.0 => "v1.5.0",
            u if u > 90.0 => "v1.2.0",
            _ => "v1.0.0",
        };
        *counts.entry(version).or_default() += 1;
    }
    into_sorted_buckets(counts.into_iter().map(|(v, c)| (v.to_string(), c)))
}

fn into_sorted_buckets(entries: impl Iterator<Item = (String, usize)>) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = entries
        .map(|(name, count)| Bucket { name, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    buckets
}
