//! Errors that abort `run_daemon`.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// The server could not start, or could not wait for its stop signal.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration layers could not be merged.
    #[error("configuration rejected: {0}")]
    Config(#[from] Arc<OrthoError>),
    /// Telemetry or stream format setup failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The TCP listener could not be bound, started or joined.
    #[error("listener failed: {0}")]
    Listener(#[from] ListenerError),
    /// Signal handlers could not be registered.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}
