//! Transport abstraction for the push channel.
//!
//! The hub never speaks a wire protocol itself. A [`Transport`] opens
//! [`Connection`]s; a connection yields text frames until it is lost.

use async_trait::async_trait;

use crate::error::Result;

/// Opens connections to a push endpoint.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open a new connection to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>>;
}

/// One live connection.
#[async_trait]
pub trait Connection: Send {
    /// Wait for the next text frame.
    ///
    /// `None` means the connection is gone and the hub should reconnect.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;
}
