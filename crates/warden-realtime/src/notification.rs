//! Inbound notifications and where they go.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Event names the back office reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new sign-up is waiting for approval.
    RegistrationPending,
    /// A customer placed a booking.
    BookingCreated,
    /// A customer cancelled a booking.
    BookingCancelled,
    /// Anything else; forwarded untouched.
    Other(String),
}

/// A server-push event.
///
/// Frames arrive as JSON text: `{"event": "registration_pending", "payload": {...}}`.
/// Notifications are informational. Acting on one (approving a registration,
/// say) goes through the access guard like any other privileged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Event name.
    pub event: String,
    /// Event body.
    #[serde(default)]
    pub payload: Value,
}

impl Notification {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Classify the event name.
    pub fn kind(&self) -> NotificationKind {
        match self.event.as_str() {
            "registration_pending" => NotificationKind::RegistrationPending,
            "booking_created" => NotificationKind::BookingCreated,
            "booking_cancelled" => NotificationKind::BookingCancelled,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

/// Receives notifications from the hub (e.g. the toast presenter).
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver one notification. Must not block.
    fn deliver(&self, notification: Notification);
}

impl NotificationSink for mpsc::UnboundedSender<Notification> {
    fn deliver(&self, notification: Notification) {
        if self.send(notification).is_err() {
            log::debug!("Notification receiver dropped; discarding");
        }
    }
}
