//! Console rendering of session events and dispatch outcomes.

use sos_core::{DispatchState, SosEvent};
use sos_dispatch::{DispatchOutcome, Rejection};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn print_events(events: &mut UnboundedReceiver<SosEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SosEvent::Alert(alert) => {
                println!("{} {}: {}", alert.kind.icon(), alert.title, alert.body);
            }
            SosEvent::State(DispatchState::Sending) => println!("Sending..."),
            SosEvent::State(DispatchState::Idle) => {}
            SosEvent::NumberLoaded(_) | SosEvent::NumberSaved(_) => {}
        }
    }
}

pub fn drain_quietly(events: &mut UnboundedReceiver<SosEvent>) {
    while events.try_recv().is_ok() {}
}

pub fn print_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Delivered { message, receipt } => {
            println!("Sent: {}", message);
            if let Some(id) = &receipt.message_id {
                println!("Message id: {}", id);
            }
        }
        DispatchOutcome::TimedOut { message } => {
            println!("No delivery report within the watchdog window.");
            println!("Message: {}", message);
        }
        DispatchOutcome::SendFailed { reason, .. } => {
            eprintln!("Send failed: {}", reason);
        }
        DispatchOutcome::Rejected(Rejection::Busy) => {
            eprintln!("Another SOS is already being sent");
        }
        DispatchOutcome::Rejected(_) => {}
    }
}

/// Called once the transport was given its grace period.
pub fn print_settlement(outcome: &DispatchOutcome, settled: bool, grace: Duration) {
    if !matches!(outcome, DispatchOutcome::TimedOut { .. }) {
        return;
    }
    if settled {
        println!("The SMS transport finished; the message may still arrive.");
    } else {
        eprintln!(
            "The SMS transport was still busy after {}s; the send was abandoned.",
            grace.as_secs()
        );
    }
}

/// A timeout counts as success once the transport has finished with the
/// message; an abandoned send does not.
pub fn exit_code(outcome: &DispatchOutcome, settled: bool) -> i32 {
    match outcome {
        DispatchOutcome::Delivered { .. } => 0,
        DispatchOutcome::TimedOut { .. } if settled => 0,
        DispatchOutcome::TimedOut { .. } => 1,
        DispatchOutcome::Rejected(_) => 2,
        DispatchOutcome::SendFailed { .. } => 1,
    }
}
