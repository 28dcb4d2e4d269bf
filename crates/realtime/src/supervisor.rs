//! Connection supervisor: lifecycle state machine, reconnection policy,
//! and cancellation discipline
//!
//! The supervisor is one spawned task that exclusively owns the live
//! connection and the retry timer. Handles talk to it over a command
//! channel and read the status snapshot it publishes, which is what makes
//! the state machine race-free without locks around the transitions: the
//! connection exists only in the connect/open arms of the loop and the
//! retry sleep only in the retry arm, so the channel is never both
//! connecting and waiting to retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::dispatch::FrameDispatcher;
use crate::frame::Frame;
use crate::observer::ChannelObserver;
use crate::transport::{Connection, Transport, TransportEvent};
use crate::{Error, Result};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Channel constructed, no connection requested yet.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// The connection is established and frames flow.
    Open,
    /// A manual close is tearing the connection down.
    Closing,
    /// No live connection. A retry may be pending.
    Closed,
}

impl Lifecycle {
    /// Whether frames can currently be sent.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a connection attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

/// Snapshot of the channel state observable through the command surface.
#[derive(Debug, Clone, Default)]
pub struct ChannelStatus {
    /// Current lifecycle state.
    pub lifecycle: Lifecycle,
    /// Automatic reconnection attempts in the current cycle.
    pub reconnect_attempts: u32,
    /// Most recently dispatched non-signal frame.
    pub last_message: Option<Frame>,
}

/// State shared between the supervisor task and channel handles.
///
/// The supervisor is the only writer of lifecycle and attempt counts;
/// handles read. `user_closed` is written by `close()` before its command
/// is enqueued so that a retry timer racing the command still observes it.
pub(crate) struct SharedState {
    status: RwLock<ChannelStatus>,
    user_closed: AtomicBool,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            status: RwLock::new(ChannelStatus::default()),
            user_closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn status(&self) -> ChannelStatus {
        self.status.read().clone()
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.status.read().lifecycle
    }

    pub(crate) fn set_lifecycle(&self, lifecycle: Lifecycle) {
        self.status.write().lifecycle = lifecycle;
    }

    pub(crate) fn set_attempts(&self, attempts: u32) {
        self.status.write().reconnect_attempts = attempts;
    }

    pub(crate) fn record_message(&self, frame: Frame) {
        self.status.write().last_message = Some(frame);
    }

    pub(crate) fn user_closed(&self) -> bool {
        self.user_closed.load(Ordering::SeqCst)
    }

    pub(crate) fn set_user_closed(&self, closed: bool) {
        self.user_closed.store(closed, Ordering::SeqCst);
    }
}

/// Commands accepted by the supervisor task.
pub(crate) enum Command {
    /// Begin connecting. No-op while already connecting or open.
    Open,
    /// Clear the closed state, reset the attempt counter, then connect.
    Reconnect,
    /// Write one pre-serialized frame to the wire.
    Send {
        text: String,
        ack: oneshot::Sender<Result<()>>,
    },
    /// Tear down the connection and cancel any pending retry.
    Close,
}

/// Next arm of the supervisor loop.
enum Step {
    /// Nothing in flight; wait for commands in the given lifecycle state.
    Parked(Lifecycle),
    /// Attempt a connection.
    Connect,
    /// Wait out the reconnection delay.
    Retry,
    /// Every handle is gone; stop.
    Shutdown,
}

/// Owns the lifecycle state machine for one channel.
pub(crate) struct Supervisor {
    config: ChannelConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn ChannelObserver>,
    dispatcher: FrameDispatcher,
    shared: Arc<SharedState>,
    commands: mpsc::UnboundedReceiver<Command>,
    attempts: u32,
}

impl Supervisor {
    pub(crate) fn new(
        config: ChannelConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn ChannelObserver>,
        shared: Arc<SharedState>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let dispatcher = FrameDispatcher::new(observer.clone(), shared.clone());
        Self {
            config,
            transport,
            observer,
            dispatcher,
            shared,
            commands,
            attempts: 0,
        }
    }

    /// Run the state machine until every channel handle is dropped.
    pub(crate) async fn run(mut self) {
        let mut step = Step::Parked(Lifecycle::Idle);
        loop {
            step = match step {
                Step::Parked(lifecycle) => self.parked(lifecycle).await,
                Step::Connect => self.connect().await,
                Step::Retry => self.wait_retry().await,
                Step::Shutdown => break,
            };
        }
        self.shared.set_lifecycle(Lifecycle::Closed);
        debug!("Channel supervisor stopped");
    }

    /// Idle or terminally closed: nothing in flight, only commands matter.
    async fn parked(&mut self, lifecycle: Lifecycle) -> Step {
        self.shared.set_lifecycle(lifecycle);
        loop {
            match self.commands.recv().await {
                Some(Command::Open | Command::Reconnect) => {
                    self.begin_cycle();
                    return Step::Connect;
                }
                Some(Command::Send { ack, .. }) => {
                    let _ = ack.send(Err(Error::NotConnected));
                }
                Some(Command::Close) => {
                    // Already closed; close() is idempotent.
                    self.shared.set_user_closed(true);
                }
                None => return Step::Shutdown,
            }
        }
    }

    /// Start a fresh cycle on a manual open/reconnect.
    fn begin_cycle(&mut self) {
        self.shared.set_user_closed(false);
        self.attempts = 0;
        self.shared.set_attempts(0);
    }

    /// One connection attempt. Construction failure feeds the same retry
    /// path as a post-connection failure.
    async fn connect(&mut self) -> Step {
        self.shared.set_lifecycle(Lifecycle::Connecting);
        info!(url = %self.config.url, "Connecting realtime channel");

        // The connect future owns its inputs so commands can be serviced
        // while the handshake is in flight.
        let transport = Arc::clone(&self.transport);
        let url = self.config.url.clone();
        let connect = async move { transport.connect(&url).await };
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok(conn) => self.open_loop(conn).await,
                        Err(e) => {
                            warn!(error = %e, "Channel connect failed");
                            self.observer.on_error(&e);
                            self.observer.on_close();
                            self.after_close()
                        }
                    };
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Open | Command::Reconnect) => {
                        debug!("Channel already connecting; open request ignored");
                    }
                    Some(Command::Send { ack, .. }) => {
                        let _ = ack.send(Err(Error::NotConnected));
                    }
                    Some(Command::Close) => {
                        // Dropping the in-flight handshake is the close.
                        self.shared.set_user_closed(true);
                        self.observer.on_close();
                        return Step::Parked(Lifecycle::Closed);
                    }
                    None => return Step::Shutdown,
                }
            }
        }
    }

    /// Established connection: pump commands, transport events, keepalives.
    async fn open_loop(&mut self, mut conn: Box<dyn Connection>) -> Step {
        self.attempts = 0;
        self.shared.set_attempts(0);
        self.shared.set_lifecycle(Lifecycle::Open);
        info!("Realtime channel open");
        self.observer.on_open();

        let mut keepalive = self.config.ping_interval().map(|period| {
            // interval_at skips the immediate first tick.
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });

        loop {
            tokio::select! {
                event = conn.next_event() => match event {
                    Some(TransportEvent::Frame(text)) => self.dispatcher.dispatch(&text),
                    Some(TransportEvent::Error(message)) => {
                        warn!(error = %message, "Transport error on realtime channel");
                        self.observer.on_error(&Error::Transport(message));
                    }
                    Some(TransportEvent::Closed) | None => {
                        info!("Realtime channel connection closed");
                        self.observer.on_close();
                        return self.after_close();
                    }
                },
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Send { text, ack }) => {
                        let result = conn.send(text).await;
                        if let Err(e) = &result {
                            warn!(error = %e, "Frame write failed");
                        }
                        let _ = ack.send(result);
                    }
                    Some(Command::Open | Command::Reconnect) => {
                        debug!("Channel already open; open request ignored");
                    }
                    Some(Command::Close) => {
                        self.shared.set_user_closed(true);
                        self.shared.set_lifecycle(Lifecycle::Closing);
                        conn.close().await;
                        self.observer.on_close();
                        return Step::Parked(Lifecycle::Closed);
                    }
                    None => {
                        conn.close().await;
                        return Step::Shutdown;
                    }
                },
                _ = maybe_tick(&mut keepalive) => {
                    if let Ok(text) = Frame::ping().to_text() {
                        if let Err(e) = conn.send(text).await {
                            debug!(error = %e, "Keepalive ping failed");
                        }
                    }
                }
            }
        }
    }

    /// The single retry decision every failure funnels into.
    fn after_close(&mut self) -> Step {
        self.shared.set_lifecycle(Lifecycle::Closed);

        if self.shared.user_closed() || !self.config.auto_reconnect {
            return Step::Parked(Lifecycle::Closed);
        }
        if self.attempts >= self.config.max_reconnect_attempts {
            warn!(
                attempts = self.attempts,
                "Max reconnection attempts reached; channel stays closed"
            );
            return Step::Parked(Lifecycle::Closed);
        }
        Step::Retry
    }

    /// Closed with a retry scheduled: one cancellable timer, nothing else.
    async fn wait_retry(&mut self) -> Step {
        let delay = sleep(self.config.reconnect_interval());
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => {
                    // close() may have raced the timer; it wins.
                    if self.shared.user_closed() {
                        return Step::Parked(Lifecycle::Closed);
                    }
                    self.attempts += 1;
                    self.shared.set_attempts(self.attempts);
                    info!(
                        attempt = self.attempts,
                        max = self.config.max_reconnect_attempts,
                        "Reconnecting realtime channel"
                    );
                    return Step::Connect;
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Close) => {
                        self.shared.set_user_closed(true);
                        return Step::Parked(Lifecycle::Closed);
                    }
                    Some(Command::Open | Command::Reconnect) => {
                        // Manual request supersedes the timer.
                        self.begin_cycle();
                        return Step::Connect;
                    }
                    Some(Command::Send { ack, .. }) => {
                        let _ = ack.send(Err(Error::NotConnected));
                    }
                    None => return Step::Shutdown,
                }
            }
        }
    }
}

/// Tick the keepalive timer, or park forever when keepalives are disabled.
async fn maybe_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
