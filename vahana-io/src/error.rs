//! Error types for VahanaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// VahanaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (socket read/write, file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration is structurally valid but rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Camera frame could not be produced
    #[error("Frame capture failed: {0}")]
    Capture(String),

    /// Video stream request was malformed or too large
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Peer closed the connection (zero-length read)
    #[error("Peer disconnected")]
    Disconnected,

    /// The other end of an internal channel went away
    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    /// Daemon shutdown was requested while blocked
    #[error("Shutdown requested")]
    Shutdown,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the peer is gone rather than a local failure.
    ///
    /// Every protocol server treats these uniformly as a disconnect.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::Disconnected => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }
}
