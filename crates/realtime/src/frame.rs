//! Wire frame model: one JSON object per text frame, discriminated by `type`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Reserved frame type carrying peer-call signaling traffic.
///
/// Frames with this discriminator are republished on the signaling bus in
/// addition to the normal message path; their payload is opaque to the
/// channel.
pub const SIGNAL_FRAME_TYPE: &str = "webrtc_signal";

/// Frame type of outbound keepalive pings.
pub const PING_FRAME_TYPE: &str = "ping";

/// Frame type of inbound keepalive acknowledgements.
pub const PONG_FRAME_TYPE: &str = "pong";

/// One discrete message unit sent or received over the channel.
///
/// The `type` discriminator selects routing; everything else is carried
/// opaquely in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Discriminator, e.g. `"chat_message"` or `"webrtc_signal"`.
    #[serde(rename = "type")]
    pub frame_type: String,

    /// Remaining payload fields, opaque to the channel.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Frame {
    /// Create a frame with the given discriminator and no payload.
    pub fn new(frame_type: impl Into<String>) -> Self {
        Self {
            frame_type: frame_type.into(),
            fields: Map::new(),
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// A keepalive ping frame.
    pub fn ping() -> Self {
        Self::new(PING_FRAME_TYPE)
    }

    /// Parse one inbound text frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to wire text.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether this frame carries peer-call signaling.
    pub fn is_signal(&self) -> bool {
        self.frame_type == SIGNAL_FRAME_TYPE
    }

    /// Get a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Peer-call signaling payload republished on the signaling bus.
///
/// Extracted from a signal frame; carried but never interpreted by the
/// channel. `signal_type` is `offer`, `answer`, `ice_candidate`,
/// `call_request`, `call_end`, or whatever the call subsystem defines next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSignal {
    /// Signal kind, taken from the frame's `signal_type` field.
    #[serde(rename = "type")]
    pub signal_type: String,

    /// Session description, present on offers and answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,

    /// ICE candidate payload, opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Value>,

    /// Peer the signal concerns.
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Audio-only call hint.
    #[serde(rename = "isAudioOnly", skip_serializing_if = "Option::is_none")]
    pub is_audio_only: Option<bool>,
}

impl CallSignal {
    /// Extract the bus payload from a signal frame.
    ///
    /// Returns `None` when the frame is not a signal frame or is missing
    /// its required `signal_type`/`userId` fields.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if !frame.is_signal() {
            return None;
        }

        let signal_type = frame.get("signal_type")?.as_str()?.to_string();
        let user_id = frame.get("userId")?.as_str()?.to_string();

        Some(Self {
            signal_type,
            sdp: frame.get("sdp").and_then(Value::as_str).map(String::from),
            candidate: frame.get("candidate").cloned().filter(|v| !v.is_null()),
            user_id,
            is_audio_only: frame.get("isAudioOnly").and_then(Value::as_bool),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chat_frame() {
        let frame = Frame::parse(r#"{"type":"chat_message","text":"hi","roomId":7}"#).unwrap();
        assert_eq!(frame.frame_type, "chat_message");
        assert_eq!(frame.get("text").and_then(Value::as_str), Some("hi"));
        assert_eq!(frame.get("roomId").and_then(Value::as_u64), Some(7));
        assert!(!frame.is_signal());
    }

    #[test]
    fn test_parse_rejects_missing_discriminator() {
        assert!(Frame::parse(r#"{"text":"hi"}"#).is_err());
        assert!(Frame::parse("not json").is_err());
        assert!(Frame::parse(r#"[1,2,3]"#).is_err());
    }

    #[test]
    fn test_serialize_flattens_fields() {
        let frame = Frame::new("chat_message").with_field("text", "hello");
        let value: Value = serde_json::from_str(&frame.to_text().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "chat_message", "text": "hello"}));
    }

    #[test]
    fn test_ping_frame_shape() {
        assert_eq!(Frame::ping().to_text().unwrap(), r#"{"type":"ping"}"#);
    }

    #[test]
    fn test_signal_extraction_full() {
        let frame = Frame::new(SIGNAL_FRAME_TYPE)
            .with_field("signal_type", "offer")
            .with_field("sdp", "v=0...")
            .with_field("candidate", json!({"sdpMid": "0"}))
            .with_field("userId", "u1")
            .with_field("isAudioOnly", true);

        let signal = CallSignal::from_frame(&frame).unwrap();
        assert_eq!(signal.signal_type, "offer");
        assert_eq!(signal.sdp.as_deref(), Some("v=0..."));
        assert_eq!(signal.candidate, Some(json!({"sdpMid": "0"})));
        assert_eq!(signal.user_id, "u1");
        assert_eq!(signal.is_audio_only, Some(true));
    }

    #[test]
    fn test_signal_extraction_minimal() {
        let frame = Frame::new(SIGNAL_FRAME_TYPE)
            .with_field("signal_type", "call_end")
            .with_field("userId", "u2");

        let signal = CallSignal::from_frame(&frame).unwrap();
        assert_eq!(signal.signal_type, "call_end");
        assert_eq!(signal.sdp, None);
        assert_eq!(signal.candidate, None);
        assert_eq!(signal.is_audio_only, None);
    }

    #[test]
    fn test_signal_extraction_requires_signal_frame() {
        let chat = Frame::new("chat_message").with_field("userId", "u1");
        assert!(CallSignal::from_frame(&chat).is_none());

        let missing_user = Frame::new(SIGNAL_FRAME_TYPE).with_field("signal_type", "offer");
        assert!(CallSignal::from_frame(&missing_user).is_none());
    }

    #[test]
    fn test_signal_serialization_omits_absent_optionals() {
        let signal = CallSignal {
            signal_type: "offer".to_string(),
            sdp: None,
            candidate: None,
            user_id: "u1".to_string(),
            is_audio_only: None,
        };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value, json!({"type": "offer", "userId": "u1"}));
    }
}
