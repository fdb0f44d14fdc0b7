//! Coarse location estimation from an IPv4 address.
//!
//! This is not geolocation. The first octet selects one of four regional anchors
//! and the coordinates are jittered around it so that nodes in the same band do
//! not stack on a single map pixel.
//!
//! | First octet | Anchor |
//! |-------------|--------|
//! | 0-63 | New York, US |
//! | 64-127 | London, GB |
//! | 128-191 | Tokyo, JP |
//! | 192-255 | Sydney, AU |

use crate::types::UNKNOWN_LOCATION;
use rand::Rng;

/// Maximum jitter applied to each axis, in degrees.
pub const JITTER_DEGREES: f64 = 5.0;

/// A fixed point on the map with a display label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoAnchor {
    /// Latitude of the anchor
    pub latitude: f64,
    /// Longitude of the anchor
    pub longitude: f64,
    /// Label reported for nodes placed around this anchor
    pub label: &'static str,
}

/// Regional anchors indexed by `first_octet / 64`.
pub const REGION_ANCHORS: [GeoAnchor; 4] = [
    GeoAnchor {
        latitude: 40.7128,
        longitude: -74.006,
        label: "New York, US",
    },
    GeoAnchor {
        latitude: 51.5074,
        longitude: -0.1278,
        label: "London, GB",
    },
    GeoAnchor {
        latitude: 35.6762,
        longitude: 139.6503,
        label: "Tokyo, JP",
    },
    GeoAnchor {
        latitude: -33.8688,
        longitude: 151.2093,
        label: "Sydney, AU",
    },
];

/// Estimated placement of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoEstimate {
    /// Latitude in [-90, 90]
    pub latitude: f64,
    /// Longitude in [-180, 180]
    pub longitude: f64,
    /// Human-readable label
    pub label: String,
}

impl GeoEstimate {
    /// Neutral placement used when nothing is known: (20, 0, "Unknown").
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            latitude: 20.0,
            longitude: 0.0,
            label: UNKNOWN_LOCATION.to_string(),
        }
    }
}

/// Parse the first octet of a dotted-quad string.
///
/// Leading digits of the first segment are read, so `"10:8001"` style
/// leftovers do not matter. Returns `None` for non-numeric input or values
/// outside 0-255.
#[must_use]
pub fn first_octet(address: &str) -> Option<u8> {
    let segment = address.trim().split('.').next()?;
    let digits: &str = {
        let end = segment
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(segment.len());
        &segment[..end]
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok().and_then(|v| u8::try_from(v).ok())
}

/// Anchor for an address, or `None` when the first octet is unusable.
#[must_use]
pub fn anchor_for(address: &str) -> Option<&'static GeoAnchor> {
    first_octet(address).map(|octet| &REGION_ANCHORS[usize::from(octet / 64)])
}

/// Estimate a location for `address`. Total: never fails, always in range.
pub fn estimate<R: Rng + ?Sized>(address: &str, rng: &mut R) -> GeoEstimate {
    let Some(anchor) = anchor_for(address) else {
        return GeoEstimate::unknown();
    };

    let latitude = anchor.latitude + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES);
    let longitude = anchor.longitude + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES);

    GeoEstimate {
        latitude: latitude.clamp(-90.0, 90.0),
        longitude: longitude.clamp(-180.0, 180.0),
        label: anchor.label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_banding_is_stable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(estimate("10.0.0.1", &mut rng).label, "New York, US");
            assert_eq!(estimate("200.1.1.1", &mut rng).label, "Sydney, AU");
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(anchor_for("63.1.1.1").unwrap().label, "New York, US");
        assert_eq!(anchor_for("64.1.1.1").unwrap().label, "London, GB");
        assert_eq!(anchor_for("127.0.0.1").unwrap().label, "London, GB");
        assert_eq!(anchor_for("128.0.0.1").unwrap().label, "Tokyo, JP");
        assert_eq!(anchor_for("191.0.0.1").unwrap().label, "Tokyo, JP");
        assert_eq!(anchor_for("192.0.0.1").unwrap().label, "Sydney, AU");
        assert_eq!(anchor_for("255.255.255.255").unwrap().label, "Sydney, AU");
        assert_eq!(anchor_for("0.0.0.0").unwrap().label, "New York, US");
    }

    #[test]
    fn test_out_of_range_octet_is_unknown() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(estimate("300.1.1.1", &mut rng), GeoEstimate::unknown());
        let unknown = estimate("300.0.0.1", &mut rng);
        assert_eq!(unknown.latitude, 20.0);
        assert_eq!(unknown.longitude, 0.0);
        assert_eq!(unknown.label, "Unknown");
    }

    #[test]
    fn test_garbage_is_unknown() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(estimate("", &mut rng), GeoEstimate::unknown());
        assert_eq!(estimate("localhost", &mut rng), GeoEstimate::unknown());
        assert_eq!(estimate("-1.2.3.4", &mut rng), GeoEstimate::unknown());
        assert_eq!(
            estimate("99999999999999999999999.1.1.1", &mut rng),
            GeoEstimate::unknown()
        );
    }

    #[test]
    fn test_jitter_stays_near_anchor() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let est = estimate("130.10.10.10", &mut rng);
            let anchor = &REGION_ANCHORS[2];
            assert!((est.latitude - anchor.latitude).abs() <= JITTER_DEGREES);
            assert!((est.longitude - anchor.longitude).abs() <= JITTER_DEGREES);
            assert!(est.latitude.is_finite() && est.longitude.is_finite());
        }
    }

    #[test]
    fn test_first_octet_parsing() {
        assert_eq!(first_octet("10.0.0.1"), Some(10));
        assert_eq!(first_octet(" 8.8.8.8"), Some(8));
        assert_eq!(first_octet("256.0.0.1"), None);
        assert_eq!(first_octet("abc"), None);
    }
}
