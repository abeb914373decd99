//! Domain model: numbers, coordinates, permissions and the events a shell observes.

use crate::error::LocationError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A trimmed, non-empty phone number used as an SOS target.
///
/// Free-form: no E.164 enforcement, only the non-empty invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SosNumber(String);

impl SosNumber {
    /// Trim and validate raw input. Returns `None` for empty or whitespace-only text.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Active target: the saved number wins, otherwise whatever is in the input field.
    pub fn active_target(saved: Option<&SosNumber>, input: &str) -> Option<SosNumber> {
        saved.cloned().or_else(|| Self::parse(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SosNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "SOS number must not be empty".to_string())
    }
}

impl From<SosNumber> for String {
    fn from(number: SosNumber) -> Self {
        number.0
    }
}

impl fmt::Display for SosNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SosNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A resolved device position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Outcome of one location attempt. Computed fresh per dispatch, never stored.
pub type LocationResult = Result<Coordinates, LocationError>;

/// Options handed to the location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// Dispatcher busy flag as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchState {
    #[default]
    Idle,
    Sending,
}

impl DispatchState {
    pub fn is_sending(self) -> bool {
        matches!(self, Self::Sending)
    }

    pub fn display(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Sending => "SENDING",
        }
    }
}

/// Runtime permissions the dispatcher asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    SendSms,
    FineLocation,
    CoarseLocation,
}

impl Permission {
    /// The batch requested before every dispatch.
    pub const ALL: [Permission; 3] = [
        Permission::SendSms,
        Permission::FineLocation,
        Permission::CoarseLocation,
    ];

    /// Platform identifier, in the form the Android permission API uses.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::SendSms => "android.permission.SEND_SMS",
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendSms => write!(f, "send_sms"),
            Self::FineLocation => write!(f, "fine_location"),
            Self::CoarseLocation => write!(f, "coarse_location"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    NeverAskAgain,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Outgoing SMS as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRequest {
    /// Transport channel selector (SIM slot / provider route).
    pub channel: u8,
    pub to: String,
    pub body: String,
}

/// What the transport reports back through its completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsReceipt {
    pub message_id: Option<String>,
    pub status: String,
}

impl SmsReceipt {
    pub fn new(message_id: Option<String>, status: impl Into<String>) -> Self {
        Self {
            message_id,
            status: status.into(),
        }
    }
}

/// Category of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    Validation,
    PermissionDenied,
    SmsStatus,
    SendFailure,
    Saved,
}

impl AlertKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Validation => "⚠️",
            Self::PermissionDenied => "⛔",
            Self::SmsStatus => "📬",
            Self::SendFailure => "❌",
            Self::Saved => "✅",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Validation | Self::PermissionDenied | Self::SendFailure)
    }
}

/// A blocking, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    pub raised_at: DateTime<Local>,
}

impl Alert {
    pub fn new(kind: AlertKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            raised_at: Local::now(),
        }
    }

    pub fn missing_number() -> Self {
        Self::new(
            AlertKind::Validation,
            "Missing Number",
            "Please set an SOS phone number first.",
        )
    }

    pub fn invalid_number() -> Self {
        Self::new(
            AlertKind::Validation,
            "Validation",
            "Please enter a valid phone number",
        )
    }

    pub fn permission_denied() -> Self {
        Self::new(
            AlertKind::PermissionDenied,
            "Permission Denied",
            "SMS and Location permissions are required.",
        )
    }

    pub fn sms_status(receipt: &SmsReceipt) -> Self {
        Self::new(AlertKind::SmsStatus, "SMS Status", receipt.status.clone())
    }

    pub fn send_failure() -> Self {
        Self::new(AlertKind::SendFailure, "Error", "Failed to send SMS.")
    }

    pub fn saved(number: &SosNumber) -> Self {
        Self::new(
            AlertKind::Saved,
            "Saved",
            format!("Default SOS number saved: {}", number),
        )
    }
}

/// One-way notifications from the session to whichever shell is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum SosEvent {
    State(DispatchState),
    Alert(Alert),
    NumberLoaded(Option<SosNumber>),
    NumberSaved(SosNumber),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_rejects_blank() {
        assert_eq!(SosNumber::parse("  +15551234567 ").unwrap().as_str(), "+15551234567");
        assert!(SosNumber::parse("").is_none());
        assert!(SosNumber::parse(" \t ").is_none());
    }

    #[test]
    fn test_active_target_prefers_saved() {
        let saved = SosNumber::parse("111").unwrap();
        let target = SosNumber::active_target(Some(&saved), "222").unwrap();
        assert_eq!(target.as_str(), "111");

        let target = SosNumber::active_target(None, " 222 ").unwrap();
        assert_eq!(target.as_str(), "222");

        assert!(SosNumber::active_target(None, "   ").is_none());
    }

    #[test]
    fn test_sos_number_serde_rejects_empty() {
        let ok: SosNumber = serde_json::from_str("\"+4412345\"").unwrap();
        assert_eq!(ok.as_str(), "+4412345");
        assert!(serde_json::from_str::<SosNumber>("\"  \"").is_err());
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(37.422, -122.084).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
        assert!(!Coordinates::new(0.0, 180.5).is_valid());
    }

    #[test]
    fn test_permission_status() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::NeverAskAgain.is_granted());
        assert_eq!(Permission::ALL.len(), 3);
    }

    #[test]
    fn test_saved_alert_mentions_number() {
        let number = SosNumber::parse("+15550000").unwrap();
        let alert = Alert::saved(&number);
        assert_eq!(alert.kind, AlertKind::Saved);
        assert!(alert.body.contains("+15550000"));
    }
}
