//! Error types for the client runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use tonewire_protocol::{FrameError, InvalidOption};

/// Failures surfaced by the client, the instrument helpers and the CLI.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Command-line arguments were rejected.
    #[error("{0}")]
    CliUsage(clap::Error),
    /// The server address did not resolve.
    #[error("failed to resolve server address {endpoint}: {source}")]
    Resolve {
        /// `host:port` as configured.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The connection attempt failed or timed out.
    #[error("failed to connect to server at {endpoint}: {source}")]
    Connect {
        /// `host:port` as configured.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An operation needed a connection that is not open.
    #[error("not connected to the server")]
    NotConnected,
    /// Sending a command failed.
    #[error("failed to send command: {0}")]
    SendCommand(#[source] io::Error),
    /// Reading or decoding a reply failed.
    #[error("failed to read reply: {0}")]
    ReadReply(#[source] FrameError),
    /// A query was issued without the `?` suffix.
    #[error("a query must include '?': {command}")]
    NotAQuery {
        /// Command text as given.
        command: String,
    },
    /// The reply did not carry the expected root key.
    #[error("reply to {root} has no '{root}' entry: {reply}")]
    MissingRootKey {
        /// Root keyword of the query.
        root: String,
        /// Reply as received.
        reply: String,
    },
    /// An option was rejected before it was sent.
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),
    /// Writing results to stdout failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}
