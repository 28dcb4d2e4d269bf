//! Test doubles for exercising the channel without a network
//!
//! `MockTransport` follows a scripted per-connect outcome plan; each
//! accepted connection hands the test a `ConnectionControl` to feed
//! inbound events and inspect writes. `RecordingObserver` counts every
//! hook invocation.

// Shared between test binaries; not every binary uses every helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use teamdesk_realtime::{
    ChannelObserver, Connection, Error, Frame, Result, Transport, TransportEvent,
};
use tokio::sync::mpsc;

/// Scripted outcome for one connect call.
#[derive(Debug, Clone, Copy)]
pub enum ConnectOutcome {
    /// Construction fails.
    Fail,
    /// Construction succeeds; the test drives the connection.
    Succeed,
}

/// Handle the test uses to drive one accepted connection.
#[derive(Clone)]
pub struct ConnectionControl {
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl ConnectionControl {
    /// Deliver an inbound event to the supervisor.
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    /// Deliver one inbound text frame.
    pub fn emit_frame(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Frame(text.into()));
    }

    /// Close the connection from the remote side.
    pub fn emit_closed(&self) {
        self.emit(TransportEvent::Closed);
    }

    /// Frames written to this connection so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// How many times the supervisor closed this connection.
    pub fn close_calls(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Transport with a scripted per-connect outcome plan.
///
/// Connect calls beyond the end of the plan fail, which keeps
/// always-failing scenarios easy to script.
#[derive(Default)]
pub struct MockTransport {
    plan: Mutex<VecDeque<ConnectOutcome>>,
    connects: AtomicUsize,
    controls: Mutex<Vec<ConnectionControl>>,
}

impl MockTransport {
    pub fn new(plan: impl IntoIterator<Item = ConnectOutcome>) -> Arc<Self> {
        Arc::new(Self {
            plan: Mutex::new(plan.into_iter().collect()),
            connects: AtomicUsize::new(0),
            controls: Mutex::new(Vec::new()),
        })
    }

    /// Transport whose every connect fails.
    pub fn failing() -> Arc<Self> {
        Self::new(Vec::new())
    }

    /// Total connect calls observed.
    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Control handle for the n-th successful connection.
    pub fn control(&self, index: usize) -> Option<ConnectionControl> {
        self.controls.lock().get(index).cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Connection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let outcome = self.plan.lock().pop_front().unwrap_or(ConnectOutcome::Fail);
        match outcome {
            ConnectOutcome::Fail => Err(Error::ConnectFailed("scripted failure".to_string())),
            ConnectOutcome::Succeed => {
                let (events, event_rx) = mpsc::unbounded_channel();
                let sent = Arc::new(Mutex::new(Vec::new()));
                let closes = Arc::new(AtomicUsize::new(0));
                self.controls.lock().push(ConnectionControl {
                    events,
                    sent: sent.clone(),
                    closes: closes.clone(),
                });
                Ok(Box::new(MockConnection {
                    events: event_rx,
                    sent,
                    closes,
                }))
            }
        }
    }
}

struct MockConnection {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn send(&mut self, text: String) -> Result<()> {
        self.sent.lock().push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Observer recording every hook invocation.
#[derive(Default)]
pub struct RecordingObserver {
    opens: AtomicUsize,
    closes: AtomicUsize,
    errors: AtomicUsize,
    messages: Mutex<Vec<Frame>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<Frame> {
        self.messages.lock().clone()
    }
}

impl ChannelObserver for RecordingObserver {
    fn on_open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }

    fn on_message(&self, frame: &Frame) {
        self.messages.lock().push(frame.clone());
    }

    fn on_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _error: &Error) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

/// Poll until `condition` holds, letting the paused clock advance.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached in simulated time");
}
