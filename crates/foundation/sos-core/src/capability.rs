//! Capability traits
//!
//! The four platform services the dispatcher depends on. Implementations
//! live in `sos-store` (storage) and `sos-adapters` (desktop stand-ins);
//! tests provide scripted fakes.

use crate::error::{LocationError, PermissionError, SmsError, StoreError};
use crate::model::{Coordinates, LocationRequest, Permission, PermissionStatus, SmsReceipt, SmsRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Persistent string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Completion callback for an SMS send.
///
/// Transports may invoke it zero, one or several times, from any thread.
pub type SmsCallback = Arc<dyn Fn(SmsReceipt) + Send + Sync>;

/// SMS dispatch.
///
/// `send` returns immediately. An `Err` means the request was refused
/// synchronously and the callback will never fire.
///
/// Work a transport started keeps running after the dispatcher stops
/// waiting on it. Callers that are about to exit use `flush` so it is not
/// cut off.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    fn name(&self) -> &str;

    fn send(&self, request: SmsRequest, on_complete: SmsCallback) -> Result<(), SmsError>;

    /// Sends that have not finished yet.
    fn pending(&self) -> usize {
        0
    }

    /// Wait up to `grace` for every pending send to finish.
    ///
    /// Returns `false` if some were still running when `grace` ran out.
    async fn flush(&self, _grace: Duration) -> bool {
        true
    }
}

/// Current-position lookup.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn current_position(&self, request: LocationRequest) -> Result<Coordinates, LocationError>;
}

/// Batch runtime-permission request.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<HashMap<Permission, PermissionStatus>, PermissionError>;
}
