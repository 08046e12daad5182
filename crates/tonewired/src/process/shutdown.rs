//! Termination signal handling for the server's main thread.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Signals that stop the server.
pub const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Why the main thread stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A termination signal arrived.
    Signal(i32),
    /// The signal source closed without delivering a signal.
    SourceClosed,
}

/// Blocks the main thread until the server should stop.
pub trait ShutdownSignal: Send + Sync {
    /// Returns once the server should drain and exit.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be set up.
    fn wait(&self) -> Result<StopReason, ShutdownError>;
}

/// Shutdown notification could not be arranged.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the signal handlers failed.
    #[error("failed to register handlers for signals {signals:?}: {source}")]
    Register {
        /// Signals that were being registered.
        signals: Vec<i32>,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for one of [`TERMINATION_SIGNALS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<StopReason, ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Register {
                signals: TERMINATION_SIGNALS.to_vec(),
                source,
            })?;
        let reason = signals
            .forever()
            .next()
            .map_or(StopReason::SourceClosed, StopReason::Signal);
        info!(target: PROCESS_TARGET, ?reason, "stop requested");
        Ok(reason)
    }
}
