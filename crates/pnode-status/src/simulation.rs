//! Simulated node sets.
//!
//! Used when no live source is reachable so that the dashboard always has
//! something to render. The shape of the data matches live output; only the
//! values are synthetic. Randomness comes from the caller so runs can be
//! reproduced with a seeded RNG.

use crate::types::{Node, NodeStatus};
use rand::Rng;
use std::net::Ipv4Addr;
use std::ops::Range;

/// Synthesized storage capacity range, in TB.
pub const STORAGE_RANGE_TB: Range<f64> = 1.0..500.0;

/// Synthesized uptime range, in percent.
pub const UPTIME_RANGE_PCT: Range<f64> = 85.0..99.9;

/// Probability that a simulated node is active.
pub const ACTIVE_PROBABILITY: f64 = 0.9;

/// A city that simulated nodes cluster around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityAnchor {
    /// City latitude
    pub latitude: f64,
    /// City longitude
    pub longitude: f64,
    /// Width of the jitter window on each axis, in degrees
    pub spread: f64,
    /// Label copied verbatim onto generated nodes
    pub label: &'static str,
}

const fn city(latitude: f64, longitude: f64, spread: f64, label: &'static str) -> CityAnchor {
    CityAnchor {
        latitude,
        longitude,
        spread,
        label,
    }
}

/// Cities used for simulated placement. Spreads are small enough that jittered
/// coordinates stay inside valid ranges without clamping.
pub const CITY_ANCHORS: [CityAnchor; 12] = [
    city(40.7128, -74.006, 15.0, "New York, US"),
    city(51.5074, -0.1278, 10.0, "London, GB"),
    city(35.6762, 139.6503, 8.0, "Tokyo, JP"),
    city(37.7749, -122.4194, 12.0, "San Francisco, US"),
    city(52.52, 13.405, 10.0, "Berlin, DE"),
    city(-33.8688, 151.2093, 8.0, "Sydney, AU"),
    city(1.3521, 103.8198, 6.0, "Singapore, SG"),
    city(55.7558, 37.6173, 10.0, "Moscow, RU"),
    city(48.8566, 2.3522, 8.0, "Paris, FR"),
    city(39.9042, 116.4074, 10.0, "Beijing, CN"),
    city(19.4326, -99.1332, 12.0, "Mexico City, MX"),
    city(-23.5505, -46.6333, 10.0, "São Paulo, BR"),
];

/// Generate `count` simulated nodes.
pub fn generate_simulation<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Node> {
    (0..count).map(|_| simulated_node(rng)).collect()
}

fn simulated_node<R: Rng + ?Sized>(rng: &mut R) -> Node {
    let storage = round2(synthesize_storage(rng));
    let uptime = round2(synthesize_uptime(rng));
    let operational_state = if rng.gen_bool(ACTIVE_PROBABILITY) {
        NodeStatus::Active
    } else {
        NodeStatus::Offline
    };

    let anchor = &CITY_ANCHORS[rng.gen_range(0..CITY_ANCHORS.len())];
    let latitude = anchor.latitude + rng.gen_range(-0.5..0.5) * anchor.spread;
    let longitude = anchor.longitude + rng.gen_range(-0.5..0.5) * anchor.spread;

    Node {
        identity: random_pubkey(rng),
        network_address: random_ipv4(rng),
        storage_capacity: storage,
        uptime_ratio: uptime,
        latitude,
        longitude,
        operational_state,
        location_label: anchor.label.to_string(),
    }
}

/// Storage capacity for nodes whose source carries no telemetry.
pub fn synthesize_storage<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(STORAGE_RANGE_TB)
}

/// Uptime for nodes whose source carries no telemetry.
pub fn synthesize_uptime<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(UPTIME_RANGE_PCT)
}

/// Random 64-character lowercase hex identity.
pub fn random_pubkey<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(bytes)
}

/// Random dotted-quad address.
pub fn random_ipv4<R: Rng + ?Sized>(rng: &mut R) -> String {
    Ipv4Addr::new(
        rng.gen_range(0..255),
        rng.gen_range(0..255),
        rng.gen_range(0..255),
        rng.gen_range(0..255),
    )
    .to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
