//! Permission gate: one batch request reduced to proceed / deny.

use sos_core::{Permission, PermissionProvider, PermissionStatus};
use std::collections::HashMap;
use std::sync::Arc;

pub struct PermissionGate {
    /// `None` on platforms without a runtime permission model.
    provider: Option<Arc<dyn PermissionProvider>>,
}

impl PermissionGate {
    pub fn runtime(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Gate that always passes without asking anything.
    pub fn unrestricted() -> Self {
        Self { provider: None }
    }

    pub async fn request_all(&self) -> bool {
        let Some(provider) = &self.provider else {
            return true;
        };

        match provider.request(&Permission::ALL).await {
            Ok(statuses) => {
                let granted = Self::evaluate(&statuses);
                if !granted {
                    tracing::warn!(?statuses, "Required permissions not granted");
                }
                granted
            }
            Err(err) => {
                tracing::warn!("Permission request failed: {}", err);
                false
            }
        }
    }

    /// SMS is mandatory; either location tier satisfies the location requirement.
    pub fn evaluate(statuses: &HashMap<Permission, PermissionStatus>) -> bool {
        let granted = |p: Permission| statuses.get(&p).is_some_and(|s| s.is_granted());
        granted(Permission::SendSms)
            && (granted(Permission::FineLocation) || granted(Permission::CoarseLocation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPermissions;
    use PermissionStatus::*;

    fn statuses(sms: PermissionStatus, fine: PermissionStatus, coarse: PermissionStatus) -> HashMap<Permission, PermissionStatus> {
        HashMap::from([
            (Permission::SendSms, sms),
            (Permission::FineLocation, fine),
            (Permission::CoarseLocation, coarse),
        ])
    }

    #[test]
    fn test_reduction_rule() {
        assert!(PermissionGate::evaluate(&statuses(Granted, Granted, Granted)));
        assert!(PermissionGate::evaluate(&statuses(Granted, Denied, Granted)));
        assert!(PermissionGate::evaluate(&statuses(Granted, Granted, NeverAskAgain)));
        assert!(!PermissionGate::evaluate(&statuses(Denied, Granted, Granted)));
        assert!(!PermissionGate::evaluate(&statuses(Granted, Denied, Denied)));
        assert!(!PermissionGate::evaluate(&HashMap::new()));
    }

    #[tokio::test]
    async fn test_unrestricted_gate_passes() {
        assert!(PermissionGate::unrestricted().request_all().await);
    }

    #[tokio::test]
    async fn test_runtime_gate_asks_once_for_all() {
        let provider = Arc::new(ScriptedPermissions::granting(&[Permission::SendSms, Permission::CoarseLocation]));
        let gate = PermissionGate::runtime(provider.clone());
        assert!(gate.request_all().await);
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_request(), Permission::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_provider_error_denies() {
        let gate = PermissionGate::runtime(Arc::new(ScriptedPermissions::failing()));
        assert!(!gate.request_all().await);
    }
}
