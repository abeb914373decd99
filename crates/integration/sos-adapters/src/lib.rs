//! # SOS Adapters
//!
//! Concrete capabilities for running the SOS session on a workstation:
//!
//! | Capability  | Adapter                                   |
//! |-------------|-------------------------------------------|
//! | storage     | `sos_store::FileKeyValueStore`            |
//! | SMS         | [`DryRunSms`] or [`WebhookSms`]           |
//! | location    | [`FixedLocation`]                         |
//! | permissions | [`StaticPermissions`] or no runtime model |

pub mod location;
pub mod permissions;
pub mod sms;

pub use location::FixedLocation;
pub use permissions::StaticPermissions;
pub use sms::{DryRunSms, WebhookSms, GATEWAY_TIMEOUT, SEND_GRACE};

use sos_config::{PermissionModel, SmsMode, SosConfig};
use sos_core::SmsTransport;
use sos_dispatch::{Capabilities, PermissionGate};
use sos_store::FileKeyValueStore;
use std::sync::Arc;

/// Wire every capability from config.
pub fn build_capabilities(config: &SosConfig) -> Result<Capabilities, sos_core::SmsError> {
    let sms: Arc<dyn SmsTransport> = match config.sms.mode {
        SmsMode::DryRun => Arc::new(DryRunSms::new()),
        SmsMode::Webhook => {
            let url = config.sms.webhook_url.as_deref().ok_or_else(|| {
                sos_core::SmsError::Unavailable("sms.webhook_url is not set".into())
            })?;
            Arc::new(WebhookSms::new(url)?)
        }
    };

    let location = Arc::new(match config.location.fixed_position() {
        Some((lat, lon)) => FixedLocation::at(lat, lon),
        None => FixedLocation::unavailable(),
    });

    let permissions = match config.permissions.model {
        PermissionModel::Runtime => PermissionGate::runtime(Arc::new(StaticPermissions::new(
            config.permissions.granted.iter().copied(),
        ))),
        PermissionModel::None => PermissionGate::unrestricted(),
    };

    tracing::debug!(
        sms = sms.name(),
        store = %config.store_path().display(),
        "Capabilities assembled"
    );

    Ok(Capabilities {
        store: Arc::new(FileKeyValueStore::at_path(config.store_path())),
        sms,
        location,
        permissions,
    })
}
