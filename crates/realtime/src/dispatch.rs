//! Inbound frame dispatch: parse, classify, route

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bus;
use crate::frame::{CallSignal, Frame, PONG_FRAME_TYPE};
use crate::observer::ChannelObserver;
use crate::supervisor::SharedState;

/// Routes each inbound payload to the observer and, for signal frames, the
/// process-wide signaling bus.
///
/// Signal frames go to both sinks; the bus republication never replaces the
/// normal message path. Keepalive pongs are consumed here and reach neither.
pub(crate) struct FrameDispatcher {
    observer: Arc<dyn ChannelObserver>,
    shared: Arc<SharedState>,
}

impl FrameDispatcher {
    pub(crate) fn new(observer: Arc<dyn ChannelObserver>, shared: Arc<SharedState>) -> Self {
        Self { observer, shared }
    }

    /// Dispatch one raw inbound payload.
    ///
    /// Malformed payloads are dropped with a diagnostic; nothing propagates
    /// back into the supervisor loop.
    pub(crate) fn dispatch(&self, text: &str) {
        let frame = match Frame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping malformed inbound frame");
                return;
            }
        };

        if frame.frame_type == PONG_FRAME_TYPE {
            debug!("Keepalive pong received");
            return;
        }

        if frame.is_signal() {
            match CallSignal::from_frame(&frame) {
                Some(signal) => bus::publish_call_signal(signal),
                None => {
                    warn!("Signal frame missing signal_type/userId; not republished");
                }
            }
        } else {
            self.shared.record_message(frame.clone());
        }

        self.observer.on_message(&frame);
    }
}
