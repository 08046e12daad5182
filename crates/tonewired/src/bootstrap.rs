//! Server bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use tonewire_config::Config;
use tonewire_pcm::CodecError;

use crate::dispatch::StreamFormat;
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Loads the server configuration; swapped out in tests.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    ///
    /// # Errors
    ///
    /// Returns the layered loader's error unchanged.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Reads defaults, file, environment and process arguments via [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already-resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// The stage at which bootstrap stopped.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration layers could not be merged.
    #[error("configuration rejected: {source}")]
    Configuration {
        /// Loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The tracing subscriber could not be installed.
    #[error("telemetry unavailable: {source}")]
    Telemetry {
        /// Subscriber error.
        #[source]
        source: TelemetryError,
    },
    /// Sample rate, channel count or bit depth cannot be synthesised.
    #[error("unsupported stream format: {source}")]
    StreamFormat {
        /// Codec error naming the bad setting.
        #[source]
        source: CodecError,
    },
}

/// A bootstrapped server, ready to bind and serve.
pub struct Daemon {
    config: Config,
    format: StreamFormat,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("config", &self.config)
            .field("format", &self.format)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validated output stream format.
    #[must_use]
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Telemetry handle, mostly useful in tests.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter used for lifecycle events.
    #[must_use]
    pub fn reporter(&self) -> Arc<dyn HealthReporter> {
        Arc::clone(&self.reporter)
    }
}

/// Bootstraps the server: configuration, telemetry, then stream format.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first stage that fails. The reporter
/// is told about the failure before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    let (config, telemetry, format) =
        prepare(loader).inspect_err(|error| reporter.bootstrap_failed(error))?;
    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        format,
        telemetry,
        reporter,
    })
}

fn prepare(
    loader: &dyn ConfigLoader,
) -> Result<(Config, TelemetryHandle, StreamFormat), BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let format = StreamFormat::from_config(&config)
        .map_err(|source| BootstrapError::StreamFormat { source })?;
    Ok((config, telemetry, format))
}
