//! Sample types produced by the sensor link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped temperature/humidity sample.
///
/// Immutable once created; the ingestion loop stamps the timestamp at the
/// moment the frame is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was accepted
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity as a percentage
    pub humidity_pct: f64,
}

impl Reading {
    /// Create a reading stamped with the current time.
    pub fn new(temperature_c: f64, humidity_pct: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            temperature_c,
            humidity_pct,
        }
    }

    /// Create a reading with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, temperature_c: f64, humidity_pct: f64) -> Self {
        Self {
            timestamp,
            temperature_c,
            humidity_pct,
        }
    }
}
