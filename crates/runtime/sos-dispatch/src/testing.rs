//! Scripted capability fakes for the dispatch tests.

use async_trait::async_trait;
use sos_core::{
    Coordinates, LocationError, LocationProvider, LocationRequest, Permission, PermissionError,
    PermissionProvider, PermissionStatus, SmsCallback, SmsError, SmsReceipt, SmsRequest,
    SmsTransport, SosEvent,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

/// How the fake transport answers.
#[derive(Debug, Clone)]
pub enum SmsScript {
    /// Fire the callback `times` times after `delay` (zero delay still goes through a task).
    Reply {
        status: String,
        delay: Duration,
        times: usize,
    },
    /// Fire synchronously, inside `send`.
    ReplyInline { status: String, times: usize },
    /// Accept the request and never call back.
    Silent,
    /// Refuse synchronously.
    Reject,
}

pub struct RecordingSms {
    script: SmsScript,
    requests: Mutex<Vec<SmsRequest>>,
}

impl RecordingSms {
    pub fn new(script: SmsScript) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(status: &str) -> Self {
        Self::new(SmsScript::Reply {
            status: status.to_string(),
            delay: Duration::from_millis(200),
            times: 1,
        })
    }

    pub fn replying_after(status: &str, delay: Duration) -> Self {
        Self::new(SmsScript::Reply {
            status: status.to_string(),
            delay,
            times: 1,
        })
    }

    pub fn sent(&self) -> Vec<SmsRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl SmsTransport for RecordingSms {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, request: SmsRequest, on_complete: SmsCallback) -> Result<(), SmsError> {
        if let SmsScript::Reject = self.script {
            return Err(SmsError::InvalidRequest("rejected by script".into()));
        }
        self.requests.lock().unwrap().push(request);

        match self.script.clone() {
            SmsScript::Reply { status, delay, times } => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    for i in 0..times {
                        on_complete(SmsReceipt::new(Some(format!("msg-{}", i)), status.clone()));
                    }
                });
            }
            SmsScript::ReplyInline { status, times } => {
                for i in 0..times {
                    on_complete(SmsReceipt::new(Some(format!("msg-{}", i)), status.clone()));
                }
            }
            SmsScript::Silent | SmsScript::Reject => {}
        }
        Ok(())
    }
}

enum LocationScript {
    Fixed(Coordinates),
    Fail(String),
    Hang,
}

pub struct ScriptedLocation {
    script: LocationScript,
    delay: Duration,
    requests: Mutex<Vec<LocationRequest>>,
}

impl ScriptedLocation {
    fn new(script: LocationScript) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(LocationScript::Fixed(Coordinates::new(latitude, longitude)))
    }

    pub fn failing(reason: &str) -> Self {
        Self::new(LocationScript::Fail(reason.to_string()))
    }

    pub fn hanging() -> Self {
        Self::new(LocationScript::Hang)
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<LocationRequest> {
        self.requests.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn current_position(&self, request: LocationRequest) -> Result<Coordinates, LocationError> {
        self.requests.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            LocationScript::Fixed(coords) => Ok(*coords),
            LocationScript::Fail(reason) => Err(LocationError::Provider(reason.clone())),
            LocationScript::Hang => std::future::pending().await,
        }
    }
}

pub struct ScriptedPermissions {
    granted: Option<Vec<Permission>>,
    calls: AtomicUsize,
    last: Mutex<Vec<Permission>>,
}

impl ScriptedPermissions {
    pub fn granting(granted: &[Permission]) -> Self {
        Self {
            granted: Some(granted.to_vec()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn granting_all() -> Self {
        Self::granting(&Permission::ALL)
    }

    pub fn failing() -> Self {
        Self {
            granted: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<Permission> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl PermissionProvider for ScriptedPermissions {
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<HashMap<Permission, PermissionStatus>, PermissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = permissions.to_vec();

        let granted = self
            .granted
            .as_ref()
            .ok_or_else(|| PermissionError::RequestFailed("scripted failure".into()))?;
        Ok(permissions
            .iter()
            .map(|p| {
                let status = if granted.contains(p) {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Denied
                };
                (*p, status)
            })
            .collect())
    }
}

/// Everything currently queued on the event channel.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<SosEvent>) -> Vec<SosEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
