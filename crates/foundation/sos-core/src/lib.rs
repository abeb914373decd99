//! # SOS Core
//!
//! Shared vocabulary for the SOS alert workspace.
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌────────────────┐   ┌──────────┐
//! │ Number Store │──▶│ Permission Gate │──▶│ Location Probe │──▶│ Composer │──▶ SMS
//! └──────────────┘   └─────────────────┘   └────────────────┘   └──────────┘
//!        ▲                        SOS Dispatcher (sos-dispatch)
//!        └──────────────── UI shell (sos-cli / sos-tui)
//! ```
//!
//! Everything platform-specific sits behind the traits in [`capability`]:
//! key-value storage, SMS transport, geolocation and runtime permissions.
//! This crate holds no I/O of its own.

pub mod capability;
pub mod error;
pub mod message;
pub mod model;

pub use capability::{
    KeyValueStore, LocationProvider, PermissionProvider, SmsCallback, SmsTransport,
};
pub use error::{LocationError, PermissionError, SaveError, SmsError, StoreError};
pub use message::{compose, AlertMessage, FALLBACK_MESSAGE, MAPS_QUERY_BASE};
pub use model::{
    Alert, AlertKind, Coordinates, DispatchState, LocationRequest, LocationResult, Permission,
    PermissionStatus, SmsReceipt, SmsRequest, SosEvent, SosNumber,
};

/// Storage key holding the saved SOS number.
pub const SOS_NUMBER_KEY: &str = "sosPhoneNumber";
