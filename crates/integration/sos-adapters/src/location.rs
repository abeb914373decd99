//! Configured position in place of a GPS fix.

use async_trait::async_trait;
use sos_core::{Coordinates, LocationError, LocationProvider, LocationRequest};

pub struct FixedLocation {
    position: Option<Coordinates>,
}

impl FixedLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Some(Coordinates::new(latitude, longitude)),
        }
    }

    /// Always errors, so every alert carries the fallback text.
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn current_position(&self, _request: LocationRequest) -> Result<Coordinates, LocationError> {
        self.position
            .ok_or_else(|| LocationError::Provider("no fixed position configured".into()))
    }
}
