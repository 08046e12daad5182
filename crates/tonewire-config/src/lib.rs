//! Shared configuration for the tonewire server and client.
//!
//! Both binaries resolve a single [`Config`] through `ortho_config`, layering
//! built-in defaults, an optional configuration file (`--config-path`),
//! `TONEWIRE_*` environment variables, and command-line flags in increasing
//! order of precedence. The server reads the listen address, the stream format
//! and the paths of the external player and capture executables; the client
//! reads the target address and its socket pacing.

mod defaults;
mod logging;

use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BIT_DEPTH, DEFAULT_CAPTURE_EXECUTABLE, DEFAULT_CAPTURE_FILE, DEFAULT_CHANNELS,
    DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PLAYER_EXECUTABLE,
    DEFAULT_PORT, DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WRITE_DELAY_MS, default_capture_executable,
    default_capture_file, default_log_filter, default_log_format, default_player_executable,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by `tonewired` and `tonewire`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TONEWIRE")]
#[serde(default)]
pub struct Config {
    /// Address the server listens on, or the client connects to.
    pub host: String,
    /// TCP port of the command socket.
    pub port: u16,
    /// Reply to `*IDN?`; the host string is used when unset.
    pub identity: Option<String>,
    /// Tracing filter expression.
    pub log_filter: String,
    /// Tracing output format.
    pub log_format: LogFormat,
    /// Sample rate used for synthesis and playback.
    pub sample_rate_hz: u32,
    /// Number of interleaved channels per frame.
    pub channels: u16,
    /// Sample width in bits (16, 24 or 32).
    pub bit_depth: u8,
    /// Executable that streams PCM bytes to the hardware.
    pub player_executable: Utf8PathBuf,
    /// Executable that records samples into `capture_file`.
    pub capture_executable: Utf8PathBuf,
    /// File written by the capture executable.
    pub capture_file: Utf8PathBuf,
    /// Extra command run when playback is stopped.
    pub stop_command: Option<Utf8PathBuf>,
    /// Audio device forwarded to the player.
    pub device: Option<String>,
    /// Client connect and read timeout in seconds.
    pub client_timeout_secs: u64,
    /// Client pause after each write, in milliseconds.
    pub write_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            identity: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            channels: DEFAULT_CHANNELS,
            bit_depth: DEFAULT_BIT_DEPTH,
            player_executable: default_player_executable(),
            capture_executable: default_capture_executable(),
            capture_file: default_capture_file(),
            stop_command: None,
            device: None,
            client_timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            write_delay_ms: DEFAULT_WRITE_DELAY_MS,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a source cannot be parsed.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration treating `args` as the command line.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a source cannot be parsed.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// `host:port` pair used for binding and connecting.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Identity string returned for `*IDN?`.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identity.as_deref().unwrap_or(self.host.as_str())
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Tracing output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
