//! Error types for command parsing, validation and reply framing.

use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Command text could not be turned into a [`crate::Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing but whitespace was received.
    #[error("empty command")]
    Empty,
    /// The received bytes are not UTF-8.
    #[error("command is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] Utf8Error),
    /// The first token is empty, as in `:FREQ:5?`.
    #[error("command '{text}' has no root keyword")]
    MissingRoot {
        /// Text after trimming.
        text: String,
    },
}

/// Value outside an enumerated option set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid option '{value}', choose between {}", allowed.join(", "))]
pub struct InvalidOption {
    /// Rejected value.
    pub value: String,
    /// Accepted values.
    pub allowed: Vec<String>,
}

/// Reply framing failures.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying stream failed or closed early.
    #[error("frame I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The payload length does not fit in the 4-byte prefix.
    #[error("payload of {len} bytes exceeds the {max} byte frame limit")]
    Oversize {
        /// Payload length.
        len: usize,
        /// Largest representable length.
        max: usize,
    },
    /// The stream ended inside a payload.
    #[error("frame truncated: expected {expected} bytes, received {received}")]
    Truncated {
        /// Length announced by the prefix.
        expected: usize,
        /// Bytes actually received.
        received: usize,
    },
    /// Payload could not be encoded or decoded as JSON.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
