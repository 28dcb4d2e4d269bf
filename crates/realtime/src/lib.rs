//! Resilient realtime channel for the teamdesk collaboration dashboard
//!
//! This crate maintains the chat/call feature's duplex connection: an
//! auto-reconnecting, message-framed WebSocket client that survives
//! transient network loss, interleaves user-initiated teardown safely with
//! timer-driven reconnection, and routes peer-call signaling frames to an
//! unrelated subsystem over a process-wide bus.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  UI layer (chat pane, call modal)                        │
//! │  ↓ commands               ↑ state / frames               │
//! │  RealtimeChannel (command surface)                       │
//! │  ├─ Supervisor (lifecycle state machine, retry timer)    │
//! │  │   └─ Transport / Connection (tokio-tungstenite)       │
//! │  └─ FrameDispatcher (parse → classify → route)           │
//! │      ├─ ChannelObserver::on_message (all frames)         │
//! │      └─ signaling bus (webrtc_signal frames only)        │
//! │          ↓                                               │
//! │  call subsystem (subscribes independently)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The supervisor task exclusively owns the live connection and the retry
//! timer, so the channel is never simultaneously connecting and waiting to
//! retry, and a manual `close()` deterministically cancels a pending
//! reconnection.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use teamdesk_realtime::{ChannelCallbacks, ChannelConfig, Frame, RealtimeChannel};
//!
//! # async fn example() -> teamdesk_realtime::Result<()> {
//! let callbacks = ChannelCallbacks::new()
//!     .with_on_message(|frame| println!("received {}", frame.frame_type));
//!
//! let config = ChannelConfig::new("wss://teamdesk.example.com/ws/chat/lobby/");
//! let channel = RealtimeChannel::new(config, Arc::new(callbacks))?;
//! channel.open();
//!
//! channel
//!     .send(&Frame::new("chat_message").with_field("text", "hello"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

// Public modules
pub mod bus;
pub mod config;
pub mod error;
pub mod frame;
pub mod observer;
pub mod transport;

// Internal modules
mod channel;
mod dispatch;
mod supervisor;

// Re-exports for public API
pub use channel::RealtimeChannel;
pub use config::ChannelConfig;
pub use error::{Error, Result};
pub use frame::{CallSignal, Frame, PING_FRAME_TYPE, PONG_FRAME_TYPE, SIGNAL_FRAME_TYPE};
pub use observer::{ChannelCallbacks, ChannelObserver, NullObserver};
pub use supervisor::{ChannelStatus, Lifecycle};
pub use transport::{Connection, Transport, TransportEvent, WebSocketTransport};

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
