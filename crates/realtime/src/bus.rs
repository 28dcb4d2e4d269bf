//! Process-wide signaling bus
//!
//! Decouples the channel from call-signaling consumers: the peer-call UI
//! subscribes here and never touches the channel's types or configuration,
//! while both share one physical connection. The bus exists for the life of
//! the process; subscribers register and drop independently.

use std::sync::OnceLock;

use tokio::sync::broadcast;

use crate::frame::CallSignal;

/// Signals buffered per subscriber before the oldest are dropped.
const BUS_CAPACITY: usize = 64;

/// Global call-signal broadcaster
static CALL_SIGNALS: OnceLock<broadcast::Sender<CallSignal>> = OnceLock::new();

fn sender() -> &'static broadcast::Sender<CallSignal> {
    CALL_SIGNALS.get_or_init(|| broadcast::channel(BUS_CAPACITY).0)
}

/// Subscribe to peer-call signals.
///
/// Can be called any number of times; each call returns an independent
/// receiver that sees signals published after it was created.
pub fn subscribe_call_signals() -> broadcast::Receiver<CallSignal> {
    sender().subscribe()
}

/// Publish a peer-call signal.
///
/// If no subscribers are listening, this is a no-op.
pub fn publish_call_signal(signal: CallSignal) {
    tracing::debug!(
        signal_type = %signal.signal_type,
        user_id = %signal.user_id,
        "Publishing call signal"
    );
    let _ = sender().send(signal);
}
