//! Location probe with its own deadline.

use sos_core::{LocationError, LocationProvider, LocationRequest, LocationResult};
use std::sync::Arc;
use std::time::Duration;

pub struct LocationProbe {
    provider: Arc<dyn LocationProvider>,
    high_accuracy: bool,
}

impl LocationProbe {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            high_accuracy: true,
        }
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    /// Never waits longer than `timeout`, even if the provider ignores it.
    pub async fn resolve(&self, timeout: Duration) -> LocationResult {
        let request = LocationRequest {
            high_accuracy: self.high_accuracy,
            timeout,
        };

        let result = tokio::time::timeout(timeout, self.provider.current_position(request))
            .await
            .unwrap_or(Err(LocationError::Timeout(timeout)))?;

        if !result.is_valid() {
            return Err(LocationError::InvalidCoordinates {
                latitude: result.latitude,
                longitude: result.longitude,
            });
        }
        tracing::debug!(provider = self.provider.name(), ?result, "Location resolved");
        Ok(result)
    }
}
