//! The shared notification connection.
//!
//! One [`NotificationHub`] per application. [`NotificationHub::connect`] is
//! lazy and idempotent: the first call spawns the pump task, later calls
//! return the id of the connection already running. The pump reconnects with
//! exponential backoff whenever the transport drops, and forwards every
//! well-formed inbound frame to the sink. [`NotificationHub::disconnect`]
//! stops the pump and clears the handle so a later `connect` starts fresh.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use backon::Retryable;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::RealtimeConfig;
use crate::error::{Error, Result};
use crate::notification::{Notification, NotificationSink};
use crate::transport::{Connection, Transport};

/// Lifecycle of the shared connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No pump running.
    #[default]
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Receiving notifications.
    Connected,
    /// Connection lost; retrying.
    Reconnecting,
    /// Gave up. `connect` again to start over.
    Failed(String),
}

impl ConnectionState {
    /// Returns `true` for `Connected`.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
            ConnectionState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Identifies one pump lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

struct Running {
    id: ConnectionId,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Connection state plus the id of the pump allowed to write it.
///
/// A pump that has been replaced by a newer `connect` can no longer publish.
struct StateCell {
    tx: watch::Sender<ConnectionState>,
    owner: AtomicU64,
}

impl StateCell {
    fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            tx,
            owner: AtomicU64::new(0),
        }
    }

    fn claim(&self, id: ConnectionId) {
        self.owner.store(id.0, Ordering::SeqCst);
    }

    /// Publish `next` if `id` still owns the connection.
    fn publish(&self, id: ConnectionId, next: ConnectionState) -> bool {
        self.tx.send_if_modified(|current| {
            if self.owner.load(Ordering::SeqCst) != id.0 {
                return false;
            }
            *current = next;
            true
        })
    }
}

/// Owner of the single push connection.
pub struct NotificationHub {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    config: RealtimeConfig,
    state: Arc<StateCell>,
    running: Mutex<Option<Running>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    /// Create a hub. Nothing connects until [`connect`](Self::connect).
    pub fn new<T, S>(transport: T, sink: S, config: RealtimeConfig) -> Self
    where
        T: Transport,
        S: NotificationSink,
    {
        Self {
            transport: Arc::new(transport),
            sink: Arc::new(sink),
            config,
            state: Arc::new(StateCell::new()),
            running: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start the shared connection, or return the one already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) -> ConnectionId {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = running.as_ref()
            && !current.task.is_finished()
        {
            return current.id;
        }

        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.state.claim(id);
        self.state.publish(id, ConnectionState::Connecting);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let pump = Pump {
            id,
            transport: self.transport.clone(),
            sink: self.sink.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
        };
        log::info!("Starting notification connection to {}", self.config.endpoint);
        let task = tokio::spawn(pump.run(shutdown_rx));
        *running = Some(Running { id, shutdown, task });
        id
    }

    /// Stop the connection and clear the shared handle.
    ///
    /// No-op when nothing is running. If another `connect` starts while this
    /// waits for the old pump, the new connection keeps its state.
    pub async fn disconnect(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(running) = running else {
            return;
        };

        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            log::warn!("Notification pump ended abnormally: {e}");
        }
        self.state.publish(running.id, ConnectionState::Disconnected);
        log::info!("Notification connection closed");
    }

    /// Whether a pump task is currently alive.
    pub fn is_active(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.tx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.tx.subscribe()
    }

    /// Wait until the state satisfies `pred`, up to `timeout`.
    pub async fn wait_until<F>(&self, timeout: Duration, mut pred: F) -> Result<ConnectionState>
    where
        F: FnMut(&ConnectionState) -> bool,
    {
        let mut rx = self.state.tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|s| pred(s))).await {
            Ok(Ok(state)) => Ok(state.clone()),
            Ok(Err(_)) => Err(Error::transport("state channel closed")),
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }

    /// The reconnect policy in use.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("endpoint", &self.config.endpoint)
            .field("state", &*self.state.tx.borrow())
            .finish()
    }
}

impl Drop for NotificationHub {
    fn drop(&mut self) {
        let running = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            running.task.abort();
        }
    }
}

// ============================================================================
// Pump
// ============================================================================

enum Exit {
    Shutdown,
    Lost,
}

struct Pump {
    id: ConnectionId,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    config: RealtimeConfig,
    state: Arc<StateCell>,
}

impl Pump {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut reconnecting = false;
        loop {
            self.state.publish(
                self.id,
                if reconnecting {
                    ConnectionState::Reconnecting
                } else {
                    ConnectionState::Connecting
                },
            );

            let opened = tokio::select! {
                _ = shutdown.changed() => None,
                result = self.open() => Some(result),
            };
            let mut conn = match opened {
                None => break,
                Some(Ok(conn)) => conn,
                Some(Err(e)) => {
                    log::error!(
                        "Giving up on notification connection to {}: {e}",
                        self.config.endpoint
                    );
                    self.state.publish(self.id, ConnectionState::Failed(e.to_string()));
                    return;
                }
            };

            self.state.publish(self.id, ConnectionState::Connected);
            log::info!("Notification connection established");

            match self.forward(conn.as_mut(), &mut shutdown).await {
                Exit::Shutdown => {
                    if let Err(e) = conn.close().await {
                        log::debug!("Error closing notification connection: {e}");
                    }
                    break;
                }
                Exit::Lost => reconnecting = true,
            }
        }
        self.state.publish(self.id, ConnectionState::Disconnected);
    }

    /// Connect with exponential backoff.
    async fn open(&self) -> Result<Box<dyn Connection>> {
        let transport = self.transport.clone();
        let endpoint = self.config.endpoint.clone();
        let attempt = move || {
            let transport = transport.clone();
            let endpoint = endpoint.clone();
            async move { transport.connect(&endpoint).await }
        };

        attempt
            .retry(self.config.backoff())
            .sleep(tokio::time::sleep)
            .when(Error::is_retryable)
            .notify(|err: &Error, delay: Duration| {
                log::warn!("Notification connect failed: {err}; retrying in {delay:?}");
            })
            .await
    }

    async fn forward(
        &self,
        conn: &mut dyn Connection,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Exit {
        loop {
            tokio::select! {
                _ = shutdown.changed() => return Exit::Shutdown,
                frame = conn.recv() => match frame {
                    Some(Ok(text)) => self.dispatch(&text),
                    Some(Err(e)) => {
                        log::warn!("Notification connection error: {e}; reconnecting");
                        return Exit::Lost;
                    }
                    None => {
                        log::warn!("Notification connection lost; reconnecting");
                        return Exit::Lost;
                    }
                },
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match Notification::parse(text) {
            Ok(notification) => {
                log::debug!("Notification received: {}", notification.event);
                self.sink.deliver(notification);
            }
            Err(e) => log::warn!("Dropping frame: {e}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
