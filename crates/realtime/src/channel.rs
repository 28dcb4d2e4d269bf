//! Command surface: the handle the UI layer drives the channel with

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::config::ChannelConfig;
use crate::frame::Frame;
use crate::observer::ChannelObserver;
use crate::supervisor::{ChannelStatus, Command, Lifecycle, SharedState, Supervisor};
use crate::transport::{Transport, WebSocketTransport};
use crate::{Error, Result};

/// Handle to a managed realtime channel.
///
/// Cloning the handle shares the underlying channel; dropping the last
/// clone stops the supervisor and closes any live connection. All methods
/// return promptly — the reconnection delay is a timer inside the
/// supervisor, never a blocking wait here.
#[derive(Clone)]
pub struct RealtimeChannel {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<SharedState>,
}

impl RealtimeChannel {
    /// Create a channel over the WebSocket transport.
    ///
    /// Validates the configuration and spawns the supervisor task in the
    /// idle state; call [`open`](Self::open) to connect. Must be called
    /// from within a tokio runtime.
    pub fn new(config: ChannelConfig, observer: Arc<dyn ChannelObserver>) -> Result<Self> {
        Self::with_transport(config, observer, Arc::new(WebSocketTransport))
    }

    /// Create a channel over a custom transport.
    pub fn with_transport(
        config: ChannelConfig,
        observer: Arc<dyn ChannelObserver>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(SharedState::new());
        let (commands, command_rx) = mpsc::unbounded_channel();
        let supervisor = Supervisor::new(config, transport, observer, shared.clone(), command_rx);
        tokio::spawn(supervisor.run());

        Ok(Self { commands, shared })
    }

    /// Begin connecting. No-op while already connecting or open.
    pub fn open(&self) {
        self.shared.set_user_closed(false);
        self.command(Command::Open);
    }

    /// Clear the closed state, reset the attempt counter, and connect.
    pub fn reconnect(&self) {
        self.shared.set_user_closed(false);
        self.command(Command::Reconnect);
    }

    /// Tear the connection down and cancel any pending reconnection.
    ///
    /// Safe to call multiple times. The closed flag is set before the
    /// command is enqueued, so no retry can fire once this returns.
    pub fn close(&self) {
        self.shared.set_user_closed(true);
        self.command(Command::Close);
    }

    /// Serialize `frame` and write it as a single text frame.
    ///
    /// Never queues: fails with [`Error::NotConnected`] unless the channel
    /// is open, and reports write failures as results rather than panics.
    pub async fn send(&self, frame: &Frame) -> Result<()> {
        self.send_raw(frame.to_text()?).await
    }

    /// Write pre-serialized text unchanged as a single frame.
    pub async fn send_raw(&self, text: impl Into<String>) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let (ack, response) = oneshot::channel();
        self.commands
            .send(Command::Send {
                text: text.into(),
                ack,
            })
            .map_err(|_| Error::NotConnected)?;

        response.await.map_err(|_| Error::NotConnected)?
    }

    /// Whether the channel is currently open.
    pub fn is_connected(&self) -> bool {
        self.shared.lifecycle().is_open()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lifecycle()
    }

    /// Most recently dispatched non-signal frame.
    pub fn last_message(&self) -> Option<Frame> {
        self.shared.status().last_message
    }

    /// Automatic reconnection attempts in the current cycle.
    ///
    /// Callers that need to distinguish "temporarily down" from "gave up"
    /// compare this against their configured maximum.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.status().reconnect_attempts
    }

    /// Full state snapshot.
    pub fn status(&self) -> ChannelStatus {
        self.shared.status()
    }

    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Channel supervisor already stopped");
        }
    }
}
