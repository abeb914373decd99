//! Permission answers from configuration.

use async_trait::async_trait;
use sos_core::{Permission, PermissionError, PermissionProvider, PermissionStatus};
use std::collections::{HashMap, HashSet};

/// Grants exactly the configured set; everything else is denied.
pub struct StaticPermissions {
    granted: HashSet<Permission>,
}

impl StaticPermissions {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<HashMap<Permission, PermissionStatus>, PermissionError> {
        Ok(permissions
            .iter()
            .map(|p| {
                let status = if self.granted.contains(p) {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Denied
                };
                tracing::debug!(permission = p.identifier(), ?status, "Permission answered");
                (*p, status)
            })
            .collect())
    }
}
