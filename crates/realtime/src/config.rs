//! Configuration types for the realtime channel

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default delay between reconnection attempts in milliseconds.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 3000;

/// Default bound on automatic reconnection attempts per cycle.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Configuration for a [`RealtimeChannel`](crate::RealtimeChannel).
///
/// Immutable once the channel is built. Reconnection uses a fixed delay
/// between attempts, bounded by `max_reconnect_attempts`; both bounds hold
/// by construction because the fields are unsigned.
///
/// # Example
///
/// ```
/// use teamdesk_realtime::ChannelConfig;
///
/// let config = ChannelConfig::new("ws://localhost:8000/ws/chat/lobby/");
/// assert!(config.validate().is_ok());
/// assert!(config.auto_reconnect);
/// assert_eq!(config.max_reconnect_attempts, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Endpoint URL (ws:// or wss://)
    pub url: String,

    /// Automatically reconnect after a lost connection (default: true)
    pub auto_reconnect: bool,

    /// Delay between reconnection attempts in milliseconds (default: 3000)
    pub reconnect_interval_ms: u64,

    /// Maximum automatic reconnection attempts per cycle (default: 5)
    pub max_reconnect_attempts: u32,

    /// Keepalive ping cadence in milliseconds (default: disabled)
    pub ping_interval_ms: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auto_reconnect: true,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            ping_interval_ms: None,
        }
    }
}

impl ChannelConfig {
    /// Create a configuration for the given endpoint with default policy.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Enable or disable automatic reconnection.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the fixed delay between reconnection attempts.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the bound on automatic reconnection attempts.
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Enable keepalive pings at the given cadence.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Delay between reconnection attempts.
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// Keepalive ping cadence, if enabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        self.ping_interval_ms.map(Duration::from_millis)
    }

    /// Validate the configuration.
    ///
    /// The URL must parse and use the ws:// or wss:// scheme.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::InvalidConfig("channel url cannot be empty".to_string()));
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| Error::InvalidConfig(format!("invalid channel url: {}", e)))?;

        match parsed.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(Error::InvalidConfig(format!(
                "channel url must use ws:// or wss://, got: {}://",
                other
            ))),
        }
    }
}
