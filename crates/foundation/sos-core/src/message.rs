//! Alert text composition. Pure, no I/O.

use crate::model::LocationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Map link prefix; coordinates are appended as `lat,lon`.
pub const MAPS_QUERY_BASE: &str = "https://maps.google.com/?q=";

/// Sent when no position could be resolved.
pub const FALLBACK_MESSAGE: &str = "🚨 SOS! I need help. Location unavailable.";

/// The body of an outgoing SOS text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    body: String,
    has_location: bool,
}

impl AlertMessage {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn has_location(&self) -> bool {
        self.has_location
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Build the alert text for a location attempt.
///
/// f64 `Display` is the shortest form that round-trips, so the link carries
/// the coordinates at full precision (`37.422` stays `37.422`).
pub fn compose(location: &LocationResult) -> AlertMessage {
    match location {
        Ok(coords) => AlertMessage {
            body: format!(
                "SOS! I need help. Location: {}{},{}",
                MAPS_QUERY_BASE, coords.latitude, coords.longitude
            ),
            has_location: true,
        },
        Err(_) => AlertMessage {
            body: FALLBACK_MESSAGE.to_string(),
            has_location: false,
        },
    }
}
