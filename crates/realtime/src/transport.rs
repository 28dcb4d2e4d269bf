//! Transport seam between the supervisor and the network
//!
//! The supervisor drives a message-framed duplex connection through the
//! [`Transport`]/[`Connection`] traits. Production uses a WebSocket client
//! over `tokio-tungstenite`; tests substitute a scripted transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Event emitted by a live connection.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A complete inbound text frame.
    Frame(String),

    /// Transport-level error. A fatal error is followed by [`Closed`]
    /// so the supervisor always reaches its retry decision.
    ///
    /// [`Closed`]: TransportEvent::Closed
    Error(String),

    /// The connection closed, cleanly or not.
    Closed,
}

/// Connects to a message-framed duplex endpoint.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Establish a new connection to `url`.
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>>;
}

/// One live duplex connection, exclusively owned by the supervisor.
#[async_trait]
pub trait Connection: Send {
    /// Write one text frame.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next event from the connection; `None` once the stream is exhausted.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Close the connection.
    async fn close(&mut self);
}

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| Error::ConnectFailed(e.to_string()))?;
        debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WebSocketConnection {
            stream,
            failed: false,
        }))
    }
}

/// Live WebSocket connection.
pub struct WebSocketConnection {
    stream: WsStream,
    failed: bool,
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::SendFailed(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.failed {
            // The read side is gone after a protocol/IO error; report the
            // close the error implies instead of polling a dead stream.
            return Some(TransportEvent::Closed);
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(TransportEvent::Frame(text)),
                Some(Ok(Message::Binary(_))) => {
                    debug!("Ignoring binary frame; the channel carries JSON text frames");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    // tungstenite answers pings itself.
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "WebSocket close frame received");
                    return Some(TransportEvent::Closed);
                }
                Some(Err(e)) => {
                    self.failed = true;
                    return Some(TransportEvent::Error(e.to_string()));
                }
                None => return Some(TransportEvent::Closed),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close handshake failed");
        }
    }
}
