//! SOS dispatcher
//!
//! ```text
//!   Idle ──(target ok, permissions ok)──▶ Sending ──┬─ SMS callback ─▶ Idle  (alert: SMS Status)
//!                                                   ├─ watchdog ─────▶ Idle  (log only)
//!                                                   └─ send refused ─▶ Idle  (alert: Error)
//! ```
//!
//! Whichever of callback / watchdog claims the [`Settlement`] first decides
//! the outcome. Later or duplicate callbacks are dropped.

use crate::gate::PermissionGate;
use crate::probe::LocationProbe;
use crate::settle::Settlement;
use sos_config::SosConfig;
use sos_core::{
    compose, Alert, AlertMessage, DispatchState, SmsCallback, SmsReceipt, SmsRequest,
    SmsTransport, SosEvent, SosNumber,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Timing and routing knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub location_timeout: Duration,
    /// Armed right before the SMS send; shorter than the location timeout.
    pub watchdog: Duration,
    pub sms_channel: u8,
    pub high_accuracy: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            location_timeout: Duration::from_millis(10_000),
            watchdog: Duration::from_millis(5_000),
            sms_channel: 1,
            high_accuracy: true,
        }
    }
}

impl DispatchSettings {
    pub fn from_config(config: &SosConfig) -> Self {
        Self {
            location_timeout: config.dispatch.location_timeout(),
            watchdog: config.dispatch.watchdog(),
            sms_channel: config.dispatch.sms_channel,
            high_accuracy: config.location.high_accuracy,
        }
    }
}

/// Why a dispatch never entered `Sending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingNumber,
    PermissionDenied,
    /// Another dispatch is in flight. Silent.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rejected(Rejection),
    Delivered {
        message: AlertMessage,
        receipt: SmsReceipt,
    },
    /// Watchdog fired first. The SMS may still have gone out.
    TimedOut { message: AlertMessage },
    SendFailed {
        message: AlertMessage,
        reason: String,
    },
}

impl DispatchOutcome {
    pub fn message(&self) -> Option<&AlertMessage> {
        match self {
            Self::Rejected(_) => None,
            Self::Delivered { message, .. }
            | Self::TimedOut { message }
            | Self::SendFailed { message, .. } => Some(message),
        }
    }

    /// True when an SMS was handed to the transport.
    pub fn attempted(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::TimedOut { .. })
    }
}

pub struct Dispatcher {
    gate: PermissionGate,
    probe: LocationProbe,
    sms: Arc<dyn SmsTransport>,
    settings: DispatchSettings,
    events: mpsc::UnboundedSender<SosEvent>,
    sending: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        gate: PermissionGate,
        probe: LocationProbe,
        sms: Arc<dyn SmsTransport>,
        settings: DispatchSettings,
        events: mpsc::UnboundedSender<SosEvent>,
    ) -> Self {
        Self {
            gate,
            probe: probe.with_high_accuracy(settings.high_accuracy),
            sms,
            settings,
            events,
            sending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> DispatchState {
        if self.sending.load(Ordering::Acquire) {
            DispatchState::Sending
        } else {
            DispatchState::Idle
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run one SOS dispatch to the active target (saved number, else input).
    pub async fn dispatch(&self, saved: Option<&SosNumber>, input: &str) -> DispatchOutcome {
        if self.state().is_sending() {
            tracing::debug!("Dispatch already in flight, ignoring trigger");
            return DispatchOutcome::Rejected(Rejection::Busy);
        }

        let Some(target) = SosNumber::active_target(saved, input) else {
            self.alert(Alert::missing_number());
            return DispatchOutcome::Rejected(Rejection::MissingNumber);
        };

        if !self.gate.request_all().await {
            self.alert(Alert::permission_denied());
            return DispatchOutcome::Rejected(Rejection::PermissionDenied);
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Lost the race to another dispatch, ignoring trigger");
            return DispatchOutcome::Rejected(Rejection::Busy);
        }
        self.emit(SosEvent::State(DispatchState::Sending));

        let outcome = self.send_to(&target).await;

        self.sending.store(false, Ordering::Release);
        self.emit(SosEvent::State(DispatchState::Idle));
        outcome
    }

    async fn send_to(&self, target: &SosNumber) -> DispatchOutcome {
        let location = self.probe.resolve(self.settings.location_timeout).await;
        if let Err(err) = &location {
            tracing::warn!("⚠️ Location error: {}", err);
        }
        let message = compose(&location);
        tracing::info!(to = %target, "📤 Sending SMS: {}", message);

        let settlement = Arc::new(Settlement::new());
        let (receipt_tx, mut receipt_rx) = mpsc::unbounded_channel();
        let callback = receipt_callback(settlement.clone(), receipt_tx);

        let request = SmsRequest {
            channel: self.settings.sms_channel,
            to: target.as_str().to_string(),
            body: message.body().to_string(),
        };

        let watchdog = tokio::time::sleep(self.settings.watchdog);
        tokio::pin!(watchdog);

        if let Err(err) = self.sms.send(request, callback) {
            settlement.claim();
            tracing::error!(transport = self.sms.name(), "❌ SMS send failed: {}", err);
            self.alert(Alert::send_failure());
            return DispatchOutcome::SendFailed {
                message,
                reason: err.to_string(),
            };
        }

        let receipt = tokio::select! {
            Some(receipt) = receipt_rx.recv() => Some(receipt),
            _ = &mut watchdog => watchdog_fired(&settlement, &mut receipt_rx).await,
        };

        match receipt {
            Some(receipt) => {
                tracing::info!(
                    message_id = ?receipt.message_id,
                    "📬 SMS Result: {}",
                    receipt.status
                );
                self.alert(Alert::sms_status(&receipt));
                DispatchOutcome::Delivered { message, receipt }
            }
            None => {
                tracing::warn!(watchdog = ?self.settings.watchdog, "⏱️ Timeout fallback");
                DispatchOutcome::TimedOut { message }
            }
        }
    }

    /// Wait up to `grace` for sends the transport still has in flight.
    pub async fn flush_transport(&self, grace: Duration) -> bool {
        self.sms.flush(grace).await
    }

    pub fn pending_sends(&self) -> usize {
        self.sms.pending()
    }

    fn alert(&self, alert: Alert) {
        self.emit(SosEvent::Alert(alert));
    }

    fn emit(&self, event: SosEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No shell attached, dropping event");
        }
    }
}

/// Forwards the first receipt to `receipts`; later ones are dropped.
fn receipt_callback(
    settlement: Arc<Settlement>,
    receipts: mpsc::UnboundedSender<SmsReceipt>,
) -> SmsCallback {
    Arc::new(move |receipt: SmsReceipt| {
        if settlement.claim() {
            let _ = receipts.send(receipt);
        } else {
            tracing::debug!(status = %receipt.status, "Ignoring late SMS callback");
        }
    })
}

/// The watchdog elapsed. A callback that claimed the settlement first has
/// already queued its receipt, and that receipt still wins.
async fn watchdog_fired(
    settlement: &Settlement,
    receipts: &mut mpsc::UnboundedReceiver<SmsReceipt>,
) -> Option<SmsReceipt> {
    if settlement.claim() {
        None
    } else {
        receipts.recv().await
    }
}
