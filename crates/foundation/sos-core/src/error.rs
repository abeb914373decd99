//! Error taxonomy for the capabilities and the number store.

use std::time::Duration;

/// Key-value capability failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Why a save did not happen.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Empty or whitespace-only input. Checked before any storage call.
    #[error("Please enter a valid phone number")]
    Validation,

    #[error("Failed to persist SOS number: {0}")]
    Store(#[from] StoreError),
}

/// Synchronous SMS transport failures (malformed arguments, transport missing).
///
/// Asynchronous outcomes are reported through the completion callback instead.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("Invalid SMS request: {0}")]
    InvalidRequest(String),

    #[error("SMS transport unavailable: {0}")]
    Unavailable(String),
}

/// Location resolution failures. Always recoverable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Location provider error: {0}")]
    Provider(String),

    #[error("Location provider returned invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Permission capability failures. The gate reduces these to "deny".
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("Permission request failed: {0}")]
    RequestFailed(String),
}
