//! Error types for command dispatch failures.
//!
//! None of these errors produce a reply on the wire: the session logs them
//! and waits for the next command.

use thiserror::Error;

use tonewire_pcm::CodecError;
use tonewire_protocol::{InvalidOption, ParseError};

use crate::playback::CollaboratorError;

/// Errors surfaced while routing or executing a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Command text was malformed.
    #[error("malformed command: {0}")]
    Parse(#[from] ParseError),

    /// Root or sub keyword is not in the registry.
    #[error("unknown command {root}{}", sub.as_deref().map(|sub| format!(":{sub}")).unwrap_or_default())]
    InvalidCommand {
        /// Root keyword as received.
        root: String,
        /// Sub keyword as received, if any.
        sub: Option<String>,
    },

    /// Value is not one of the enumerated options.
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),

    /// Value could not be interpreted for the command.
    #[error("invalid value '{value}' for {root}: {reason}")]
    InvalidValue {
        /// Root keyword of the command.
        root: String,
        /// Rejected value text.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// Synthesis rejected the stored parameters.
    #[error("waveform synthesis failed: {0}")]
    Codec(#[from] CodecError),

    /// An external player or capture executable failed.
    #[error("collaborator failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Internal fault such as a poisoned lock.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the fault.
        message: String,
    },
}

impl DispatchError {
    /// Whether the session may carry on after this error.
    ///
    /// Command faults only abort the current command. Internal faults mean
    /// server state can no longer be trusted.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }

    /// Creates an unknown command error.
    #[must_use]
    pub fn invalid_command(root: impl Into<String>, sub: Option<&str>) -> Self {
        Self::InvalidCommand {
            root: root.into(),
            sub: sub.map(str::to_owned),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        root: impl Into<String>,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidValue {
            root: root.into(),
            value: value.into(),
            reason,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_command_names_the_keywords() {
        let error = DispatchError::invalid_command("SOUR", Some("BOGUS"));
        assert_eq!(error.to_string(), "unknown command SOUR:BOGUS");
        let error = DispatchError::invalid_command("GARBAGE", None);
        assert_eq!(error.to_string(), "unknown command GARBAGE");
    }

    #[test]
    fn only_internal_faults_are_unrecoverable() {
        assert!(DispatchError::invalid_command("X", None).is_recoverable());
        assert!(DispatchError::Codec(CodecError::NoChannels).is_recoverable());
        assert!(!DispatchError::internal("poisoned").is_recoverable());
    }
}
