use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Address the server binds to by default.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Port shared by the server and the client.
pub const DEFAULT_PORT: u16 = 7000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Highest sample rate supported by the board.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 192_000;

/// The board streams stereo frames.
pub const DEFAULT_CHANNELS: u16 = 2;

/// Sample width handed to the player.
pub const DEFAULT_BIT_DEPTH: u8 = 24;

/// Playback executable looked up relative to the working directory.
pub const DEFAULT_PLAYER_EXECUTABLE: &str = "./FunctionPlayer";

/// Capture executable looked up relative to the working directory.
pub const DEFAULT_CAPTURE_EXECUTABLE: &str = "./FunctionReader";

/// File the capture executable writes raw samples into.
pub const DEFAULT_CAPTURE_FILE: &str = "data.txt";

/// Client connect/read timeout in seconds.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 10;

/// Pause after every client write, in milliseconds.
pub const DEFAULT_WRITE_DELAY_MS: u64 = 100;

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default path of the playback executable.
#[must_use]
pub fn default_player_executable() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PLAYER_EXECUTABLE)
}

/// Default path of the capture executable.
#[must_use]
pub fn default_capture_executable() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CAPTURE_EXECUTABLE)
}

/// Default path of the capture hand-off file.
#[must_use]
pub fn default_capture_file() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CAPTURE_FILE)
}
