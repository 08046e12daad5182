//! Process-wide `tracing` subscriber for the server.
//!
//! Events go to stderr with RFC 3339 UTC timestamps, as flattened JSON or
//! compact text depending on `log_format`. Everything done on behalf of a
//! client runs inside a `session` span that records the peer address, and
//! the playback worker inherits the span of the session that started it, so
//! a player failure can be traced back to the connection that asked for it.
//! JSON lines carry the span fields under `span`.

use std::io::{self, IsTerminal};
use std::net::SocketAddr;

use once_cell::sync::OnceCell;
use tracing::{Span, Subscriber, info, info_span, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

use tonewire_config::{Config, LogFormat};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");
const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the subscriber is installed, and in which format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    ///
    /// This is the format of the first successful installation, which may
    /// differ from the configuration passed to a later call.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// The subscriber could not be installed.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` expression.
    #[error("log filter rejected: {0}")]
    Filter(String),
    /// A subscriber from elsewhere already owns the global slot.
    #[error("global subscriber already set: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// Later calls return a handle to the existing subscriber without touching
/// global state, so bootstrap can run more than once in a process.
///
/// # Examples
///
/// ```rust
/// use tonewire_config::Config;
/// use tonewired::telemetry;
///
/// # fn main() -> Result<(), tonewired::telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// assert_eq!(first.format(), second.format());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a foreign
/// subscriber already owns the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| install_subscriber(config))
        .map(|format| TelemetryHandle { format: *format })
}

/// Span wrapping one client connection.
///
/// Unknown peers are recorded as `unknown`.
pub(crate) fn session_span(peer: Option<SocketAddr>) -> Span {
    let peer = peer.map_or_else(|| String::from("unknown"), |addr| addr.to_string());
    info_span!(target: SESSION_TARGET, "session", %peer)
}

fn install_subscriber(config: &Config) -> Result<LogFormat, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let format = config.log_format();
    let subscriber = build_subscriber(
        format,
        filter,
        io::stderr,
        io::stderr().is_terminal(),
    );
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    info!(
        target: TELEMETRY_TARGET,
        %format,
        filter = config.log_filter(),
        listen = %config.listen_address(),
        "telemetry ready"
    );
    Ok(format)
}

fn build_subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
    ansi: bool,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    match format {
        LogFormat::Json => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        ),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    }
}
