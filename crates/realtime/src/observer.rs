//! Observer hooks for channel lifecycle and message notifications

use crate::error::Error;
use crate::frame::Frame;

/// Receives channel lifecycle and message notifications.
///
/// Every method defaults to a no-op so implementors override only what they
/// need. Hooks are invoked from the supervisor task and must not block; do
/// any heavy work on your own task.
pub trait ChannelObserver: Send + Sync {
    /// The channel transitioned to open.
    fn on_open(&self) {}

    /// A frame was dispatched.
    fn on_message(&self, _frame: &Frame) {}

    /// The connection closed — remote close, failure, or manual close.
    fn on_close(&self) {}

    /// The transport reported an error. State changes are driven by the
    /// close that follows, not by this hook.
    fn on_error(&self, _error: &Error) {}
}

/// Observer for callers that only poll the command surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ChannelObserver for NullObserver {}

/// Callback invoked on open/close transitions.
pub type LifecycleCallback = Box<dyn Fn() + Send + Sync>;

/// Callback receiving dispatched frames.
pub type MessageCallback = Box<dyn Fn(&Frame) + Send + Sync>;

/// Callback receiving transport errors.
pub type ErrorCallback = Box<dyn Fn(&Error) + Send + Sync>;

/// Closure-based observer for callers that prefer optional callbacks over
/// implementing [`ChannelObserver`] themselves.
///
/// # Example
///
/// ```
/// use teamdesk_realtime::ChannelCallbacks;
///
/// let callbacks = ChannelCallbacks::new()
///     .with_on_open(|| println!("connected"))
///     .with_on_message(|frame| println!("got {}", frame.frame_type));
/// ```
#[derive(Default)]
pub struct ChannelCallbacks {
    on_open: Option<LifecycleCallback>,
    on_message: Option<MessageCallback>,
    on_close: Option<LifecycleCallback>,
    on_error: Option<ErrorCallback>,
}

impl ChannelCallbacks {
    /// Create an empty callback set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the open callback.
    pub fn with_on_open<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_open = Some(Box::new(callback));
        self
    }

    /// Set the message callback.
    pub fn with_on_message<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.on_message = Some(Box::new(callback));
        self
    }

    /// Set the close callback.
    pub fn with_on_close<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Set the error callback.
    pub fn with_on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl ChannelObserver for ChannelCallbacks {
    fn on_open(&self) {
        if let Some(callback) = &self.on_open {
            callback();
        }
    }

    fn on_message(&self, frame: &Frame) {
        if let Some(callback) = &self.on_message {
            callback(frame);
        }
    }

    fn on_close(&self) {
        if let Some(callback) = &self.on_close {
            callback();
        }
    }

    fn on_error(&self, error: &Error) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callbacks_invoke_configured_closures() {
        let opens = Arc::new(AtomicUsize::new(0));
        let messages = Arc::new(AtomicUsize::new(0));

        let opens_counter = opens.clone();
        let messages_counter = messages.clone();
        let callbacks = ChannelCallbacks::new()
            .with_on_open(move || {
                opens_counter.fetch_add(1, Ordering::SeqCst);
            })
            .with_on_message(move |_| {
                messages_counter.fetch_add(1, Ordering::SeqCst);
            });

        callbacks.on_open();
        callbacks.on_message(&Frame::new("chat_message"));
        callbacks.on_close();
        callbacks.on_error(&Error::NotConnected);

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(messages.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_null_observer_ignores_everything() {
        let observer = NullObserver;
        observer.on_open();
        observer.on_message(&Frame::new("chat_message"));
        observer.on_close();
        observer.on_error(&Error::NotConnected);
    }
}
