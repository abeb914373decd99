//! Application state for the SOS terminal UI
//!
//! The app only binds input and forwards the two user actions to the
//! session. Everything it shows comes back through the session's event
//! channel, which is drained on every tick.

use crate::theme::ThemePalette;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sos_core::{Alert, DispatchState, SosEvent, SosNumber};
use sos_dispatch::SosSession;
use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedReceiver;

/// Alerts kept in the history pane
const MAX_ALERTS: usize = 50;

/// Longest phone number the input accepts
const MAX_INPUT_LEN: usize = 32;

pub struct App {
    session: SosSession,
    events: UnboundedReceiver<SosEvent>,

    /// Pending phone number being typed
    pub input: String,
    pub saved: Option<SosNumber>,
    pub state: DispatchState,
    /// False until the startup load has reported back
    pub loaded: bool,

    /// Newest last
    pub alerts: VecDeque<Alert>,
    /// Alert shown as a blocking popup until dismissed
    pub popup: Option<Alert>,

    pub palette: ThemePalette,
    pub tick_count: u64,
}

impl App {
    /// Must be called inside a tokio runtime: kicks off the startup load.
    pub fn new(session: SosSession, events: UnboundedReceiver<SosEvent>) -> Self {
        let loader = session.clone();
        tokio::spawn(async move {
            loader.load().await;
        });

        Self {
            session,
            events,
            input: String::new(),
            saved: None,
            state: DispatchState::Idle,
            loaded: false,
            alerts: VecDeque::new(),
            popup: None,
            palette: ThemePalette::default(),
            tick_count: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
        self.poll_session_events();
    }

    fn poll_session_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SosEvent) {
        match event {
            SosEvent::State(state) => self.state = state,
            SosEvent::Alert(alert) => {
                self.alerts.push_back(alert.clone());
                while self.alerts.len() > MAX_ALERTS {
                    self.alerts.pop_front();
                }
                self.popup = Some(alert);
            }
            SosEvent::NumberLoaded(number) => {
                if self.input.is_empty() {
                    if let Some(number) = &number {
                        self.input = number.as_str().to_string();
                    }
                }
                self.saved = number;
                self.loaded = true;
            }
            SosEvent::NumberSaved(number) => self.saved = Some(number),
        }
    }

    /// The SOS button is disabled while a dispatch is in flight.
    pub fn can_send(&self) -> bool {
        !self.state.is_sending() && !self.session.state().is_sending()
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return true,
            _ => {}
        }

        // The popup consumes keys until it is dismissed
        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.popup = None;
            }
            return false;
        }

        match key.code {
            KeyCode::F(5) => self.send_sos(),
            KeyCode::Char('o') if ctrl => self.send_sos(),
            KeyCode::Enter => self.save_number(),
            KeyCode::Char('s') if ctrl => self.save_number(),
            KeyCode::Char('u') if ctrl => self.input.clear(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !ctrl => {
                if self.input.chars().count() < MAX_INPUT_LEN && !c.is_control() {
                    self.input.push(c);
                }
            }
            _ => {}
        }

        false
    }

    fn save_number(&mut self) {
        let session = self.session.clone();
        let input = self.input.clone();
        tokio::spawn(async move {
            session.save(&input).await;
        });
    }

    fn send_sos(&mut self) {
        if !self.can_send() {
            tracing::debug!("SOS already in flight, ignoring trigger");
            return;
        }
        let session = self.session.clone();
        let input = self.input.clone();
        tokio::spawn(async move {
            let outcome = session.send_sos(&input).await;
            tracing::info!(?outcome, "SOS dispatch finished");
        });
    }

    pub fn sos_label(&self) -> &'static str {
        if self.state.is_sending() {
            "Sending..."
        } else {
            "Send SOS To Saved Number"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_adapters::{DryRunSms, FixedLocation};
    use sos_core::{AlertKind, KeyValueStore, SOS_NUMBER_KEY};
    use sos_dispatch::{Capabilities, DispatchSettings, PermissionGate};
    use sos_store::MemoryKeyValueStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        app_with_store(Arc::new(MemoryKeyValueStore::new()))
    }

    fn app_with_store(store: Arc<MemoryKeyValueStore>) -> App {
        let capabilities = Capabilities {
            store,
            sms: Arc::new(DryRunSms::with_latency(Duration::from_millis(100))),
            location: Arc::new(FixedLocation::at(37.422, -122.084)),
            permissions: PermissionGate::unrestricted(),
        };
        let (session, events) = SosSession::new(capabilities, DispatchSettings::default());
        App::new(session, events)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    async fn settle(app: &mut App, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        app.on_tick();
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_load_reports_no_number() {
        let mut app = app();
        assert!(!app.loaded);
        settle(&mut app, 10).await;
        assert!(app.loaded);
        assert!(app.saved.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_load_fills_empty_input() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(SOS_NUMBER_KEY, "+15551234567").await.unwrap();

        let mut app = app_with_store(store);
        settle(&mut app, 10).await;
        assert_eq!(app.saved.as_ref().map(|n| n.as_str()), Some("+15551234567"));
        assert_eq!(app.input, "+15551234567");
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_load_keeps_typed_input() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(SOS_NUMBER_KEY, "+15551234567").await.unwrap();

        let mut app = app_with_store(store);
        type_text(&mut app, "112");
        settle(&mut app, 10).await;
        assert_eq!(app.saved.as_ref().map(|n| n.as_str()), Some("+15551234567"));
        assert_eq!(app.input, "112");
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_and_backspace() {
        let mut app = app();
        type_text(&mut app, "+1555");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "+155");

        app.handle_key(ctrl('u'));
        assert!(app.input.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_saves_and_pops_alert() {
        let mut app = app();
        type_text(&mut app, "+15551234567");
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app, 10).await;

        assert_eq!(app.saved.as_ref().map(|n| n.as_str()), Some("+15551234567"));
        let popup = app.popup.as_ref().unwrap();
        assert_eq!(popup.kind, AlertKind::Saved);

        // Typing is swallowed while the popup is up
        type_text(&mut app, "9");
        assert_eq!(app.input, "+15551234567");

        app.handle_key(key(KeyCode::Esc));
        assert!(app.popup.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_save_shows_validation() {
        let mut app = app();
        type_text(&mut app, "   ");
        app.handle_key(ctrl('s'));
        settle(&mut app, 10).await;

        assert!(app.saved.is_none());
        assert_eq!(app.popup.as_ref().unwrap().kind, AlertKind::Validation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_without_number_is_rejected() {
        let mut app = app();
        app.handle_key(key(KeyCode::F(5)));
        settle(&mut app, 10).await;

        assert_eq!(app.state, DispatchState::Idle);
        assert_eq!(app.popup.as_ref().unwrap().title, "Missing Number");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_goes_through_sending_and_back() {
        let mut app = app();
        type_text(&mut app, "+15551234567");
        app.handle_key(key(KeyCode::F(5)));

        settle(&mut app, 10).await;
        assert!(app.state.is_sending());
        assert_eq!(app.sos_label(), "Sending...");
        assert!(!app.can_send());

        settle(&mut app, 500).await;
        assert_eq!(app.state, DispatchState::Idle);
        assert_eq!(app.sos_label(), "Send SOS To Saved Number");
        let popup = app.popup.as_ref().unwrap();
        assert_eq!(popup.kind, AlertKind::SmsStatus);
        assert_eq!(popup.body, "SMS queued (dry run)");
        assert_eq!(app.alerts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_keys() {
        let mut app = app();
        assert!(app.handle_key(ctrl('q')));
        assert!(app.handle_key(ctrl('c')));
        assert!(!app.handle_key(key(KeyCode::Char('q'))));
    }
}
