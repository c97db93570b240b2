//! Server-push notifications for Warden.
//!
//! A single [`NotificationHub`] owns the push connection for the whole
//! application. It connects lazily, reconnects with exponential backoff
//! after a drop, and hands every inbound [`Notification`] to a
//! [`NotificationSink`]. The wire protocol lives behind [`Transport`].

pub mod config;
pub mod error;
pub mod hub;
pub mod notification;
pub mod transport;

pub use config::RealtimeConfig;
pub use error::{Error, Result};
pub use hub::{ConnectionId, ConnectionState, NotificationHub};
pub use notification::{Notification, NotificationKind, NotificationSink};
pub use transport::{Connection, Transport};
