//! # SOS Dispatch
//!
//! The sequencing core: permission gate → bounded location probe → message
//! composition → SMS send, with the SMS completion callback raced against a
//! watchdog so the shell never stays stuck in `Sending`.
//!
//! [`SosSession`] is the application-state owner a shell talks to. It emits
//! [`SosEvent`](sos_core::SosEvent)s on a one-way channel.

pub mod dispatcher;
pub mod gate;
pub mod probe;
pub mod session;
pub mod settle;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{DispatchOutcome, DispatchSettings, Dispatcher, Rejection};
pub use gate::PermissionGate;
pub use probe::LocationProbe;
pub use session::{Capabilities, SosSession};
pub use settle::Settlement;
