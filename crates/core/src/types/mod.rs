//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
///
/// Ephemeral by design: captured from the device at submission time and
/// discarded once the request completes. Never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}
