//! Application session: the state a shell binds to.

use crate::dispatcher::{DispatchOutcome, DispatchSettings, Dispatcher};
use crate::gate::PermissionGate;
use crate::probe::LocationProbe;
use sos_core::{
    Alert, DispatchState, KeyValueStore, LocationProvider, SaveError, SmsTransport, SosEvent,
    SosNumber,
};
use sos_store::NumberStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// The platform services a session runs on.
pub struct Capabilities {
    pub store: Arc<dyn KeyValueStore>,
    pub sms: Arc<dyn SmsTransport>,
    pub location: Arc<dyn LocationProvider>,
    pub permissions: PermissionGate,
}

struct Inner {
    numbers: Mutex<NumberStore>,
    dispatcher: Dispatcher,
    events: mpsc::UnboundedSender<SosEvent>,
}

/// Cheap-to-clone handle over the number store and the dispatcher.
///
/// All user-visible results come out of the event receiver returned by
/// [`SosSession::new`]; the methods' return values are for scripting and tests.
#[derive(Clone)]
pub struct SosSession {
    inner: Arc<Inner>,
}

impl SosSession {
    pub fn new(
        capabilities: Capabilities,
        settings: DispatchSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SosEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let Capabilities {
            store,
            sms,
            location,
            permissions,
        } = capabilities;

        let dispatcher = Dispatcher::new(
            permissions,
            LocationProbe::new(location),
            sms,
            settings,
            tx.clone(),
        );
        let session = Self {
            inner: Arc::new(Inner {
                numbers: Mutex::new(NumberStore::new(store)),
                dispatcher,
                events: tx,
            }),
        };
        (session, rx)
    }

    /// Startup load. Emits `NumberLoaded` whether or not a number was found.
    pub async fn load(&self) -> Option<SosNumber> {
        let number = self.inner.numbers.lock().await.load().await;
        self.emit(SosEvent::NumberLoaded(number.clone()));
        number
    }

    /// Save the input as the default SOS number.
    pub async fn save(&self, input: &str) -> Option<SosNumber> {
        let result = self.inner.numbers.lock().await.save(input).await;
        match result {
            Ok(number) => {
                self.emit(SosEvent::Alert(Alert::saved(&number)));
                self.emit(SosEvent::NumberSaved(number.clone()));
                Some(number)
            }
            Err(SaveError::Validation) => {
                self.emit(SosEvent::Alert(Alert::invalid_number()));
                None
            }
            // Already logged by the store; the session keeps going without it.
            Err(SaveError::Store(_)) => None,
        }
    }

    pub async fn saved_number(&self) -> Option<SosNumber> {
        self.inner.numbers.lock().await.saved().cloned()
    }

    /// Dispatch to the saved number, or to `input` if nothing is saved.
    pub async fn send_sos(&self, input: &str) -> DispatchOutcome {
        let saved = self.saved_number().await;
        self.inner.dispatcher.dispatch(saved.as_ref(), input).await
    }

    /// Wait up to `grace` for SMS sends still in flight, e.g. one the
    /// watchdog stopped waiting on. Call before exiting the process.
    pub async fn flush_sms(&self, grace: Duration) -> bool {
        self.inner.dispatcher.flush_transport(grace).await
    }

    pub fn pending_sms(&self) -> usize {
        self.inner.dispatcher.pending_sends()
    }

    pub fn state(&self) -> DispatchState {
        self.inner.dispatcher.state()
    }

    pub fn settings(&self) -> &DispatchSettings {
        self.inner.dispatcher.settings()
    }

    fn emit(&self, event: SosEvent) {
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drain, RecordingSms, ScriptedLocation, ScriptedPermissions, SmsScript};
    use crate::Rejection;
    use sos_core::AlertKind;
    use sos_store::MemoryKeyValueStore;

    fn session_with(
        store: Arc<MemoryKeyValueStore>,
        sms: Arc<RecordingSms>,
    ) -> (SosSession, mpsc::UnboundedReceiver<SosEvent>) {
        SosSession::new(
            Capabilities {
                store,
                sms,
                location: Arc::new(ScriptedLocation::at(37.422, -122.084)),
                permissions: PermissionGate::runtime(Arc::new(ScriptedPermissions::granting_all())),
            },
            DispatchSettings::default(),
        )
    }

    fn inline_sms() -> Arc<RecordingSms> {
        Arc::new(RecordingSms::new(SmsScript::ReplyInline {
            status: "SMS sent".into(),
            times: 1,
        }))
    }

    #[tokio::test]
    async fn test_load_reports_stored_number() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(sos_core::SOS_NUMBER_KEY, "+15551234567").await.unwrap();
        let (session, mut events) = session_with(store, inline_sms());

        let loaded = session.load().await.unwrap();
        assert_eq!(loaded.as_str(), "+15551234567");
        assert_eq!(drain(&mut events), vec![SosEvent::NumberLoaded(Some(loaded))]);
    }

    #[tokio::test]
    async fn test_save_emits_alert_and_number() {
        let (session, mut events) = session_with(Arc::new(MemoryKeyValueStore::new()), inline_sms());

        let saved = session.save(" +15551234567 ").await.unwrap();
        assert_eq!(saved.as_str(), "+15551234567");

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], SosEvent::Alert(a) if a.kind == AlertKind::Saved));
        assert_eq!(events[1], SosEvent::NumberSaved(saved));
    }

    #[tokio::test]
    async fn test_blank_save_is_validation_alert() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (session, mut events) = session_with(store.clone(), inline_sms());

        assert!(session.save("  ").await.is_none());
        let events = drain(&mut events);
        assert!(matches!(&events[..], [SosEvent::Alert(a)] if a.kind == AlertKind::Validation));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set_failing(true);
        let (session, mut events) = session_with(store, inline_sms());

        assert!(session.load().await.is_none());
        assert!(session.save("112").await.is_none());
        assert_eq!(drain(&mut events), vec![SosEvent::NumberLoaded(None)]);
        assert!(session.saved_number().await.is_none());
    }

    #[tokio::test]
    async fn test_saved_number_beats_input() {
        let sms = inline_sms();
        let (session, _events) = session_with(Arc::new(MemoryKeyValueStore::new()), sms.clone());

        session.save("111").await.unwrap();
        let outcome = session.send_sos("222").await;
        assert!(outcome.attempted());
        assert_eq!(sms.sent()[0].to, "111");
    }

    #[tokio::test]
    async fn test_send_without_any_number() {
        let sms = inline_sms();
        let (session, mut events) = session_with(Arc::new(MemoryKeyValueStore::new()), sms.clone());

        let outcome = session.send_sos("").await;
        assert_eq!(outcome, DispatchOutcome::Rejected(Rejection::MissingNumber));
        assert_eq!(session.state(), DispatchState::Idle);

        let events = drain(&mut events);
        assert!(matches!(&events[..], [SosEvent::Alert(a)] if a.title == "Missing Number"));
        assert_eq!(sms.send_count(), 0);
    }
}
