//! Lifecycle events for the board server: bootstrap outcome and client
//! sessions.

use std::net::SocketAddr;
use std::sync::Arc;

use tonewire_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Receives server lifecycle events.
///
/// Production code logs them; tests record them for assertions.
pub trait HealthReporter: Send + Sync {
    /// Bootstrap is about to read configuration.
    fn bootstrap_starting(&self);

    /// Telemetry is up and the stream format is valid.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Bootstrap stopped at `error`.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// A client was accepted.
    fn session_opened(&self, peer: Option<SocketAddr>);

    /// A client left after sending `commands` chunks.
    fn session_closed(&self, peer: Option<SocketAddr>, commands: u64);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_opened(&self, peer: Option<SocketAddr>) {
        (**self).session_opened(peer);
    }

    fn session_closed(&self, peer: Option<SocketAddr>, commands: u64) {
        (**self).session_closed(peer, commands);
    }
}

/// Emits each event as a `tracing` record with an `event` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Creates the reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting server bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen_address(),
            identity = config.identity(),
            sample_rate_hz = config.sample_rate_hz,
            channels = config.channels,
            bit_depth = config.bit_depth,
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "server bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "server bootstrap failed"
        );
    }

    fn session_opened(&self, peer: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_opened",
            peer = ?peer,
            "client connected"
        );
    }

    fn session_closed(&self, peer: Option<SocketAddr>, commands: u64) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_closed",
            peer = ?peer,
            commands,
            "client disconnected"
        );
    }
}
