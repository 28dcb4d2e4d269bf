//! Error types for the realtime channel

/// Result type alias using the channel Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in realtime channel operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transport could not be constructed (bad address, refused connection)
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Error reported by the underlying connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// The operation requires an open channel
    #[error("Channel is not connected")]
    NotConnected,

    /// A frame could not be written to the wire
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Frame serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error marks a connection loss the supervisor may retry.
    ///
    /// Construction failures and transport errors funnel into the same
    /// retry decision; the remaining variants are caller mistakes or data
    /// problems that retrying cannot fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ConnectFailed(_) | Error::Transport(_))
    }
}
