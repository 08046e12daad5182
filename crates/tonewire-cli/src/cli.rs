//! Command-line definitions for the `tonewire` binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Playback mode selected with `play --mode`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum PlayModeArg {
    /// Loop until `stop` is issued.
    #[default]
    #[value(name = "CONT", alias = "cont")]
    Continuous,
    /// Play once for the configured duration.
    #[value(name = "LIM", alias = "lim")]
    Limited,
}

impl PlayModeArg {
    pub(crate) const fn token(self) -> &'static str {
        match self {
            Self::Continuous => "CONT",
            Self::Limited => "LIM",
        }
    }
}

/// Waveform shape selected with `play --shape`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ShapeArg {
    #[value(name = "SIN", alias = "sin")]
    Sine,
    #[value(name = "TRIA", alias = "tria")]
    Triangle,
    #[value(name = "SQUA", alias = "squa")]
    Square,
    #[value(name = "CONST", alias = "const")]
    Constant,
}

impl ShapeArg {
    pub(crate) const fn token(self) -> &'static str {
        match self {
            Self::Sine => "SIN",
            Self::Triangle => "TRIA",
            Self::Square => "SQUA",
            Self::Constant => "CONST",
        }
    }
}

/// Client for the tonewire signal board server.
///
/// Connection flags (`--host`, `--port`, `--client-timeout-secs`,
/// `--write-delay-ms`, `--config-path`) go before the subcommand.
#[derive(Parser, Debug)]
#[command(name = "tonewire", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Prints the server identification string.
    Idn,
    /// Applies waveform settings, then starts playback.
    Play {
        /// Continuous or time-limited playback.
        #[arg(long, value_enum, default_value_t = PlayModeArg::Continuous)]
        mode: PlayModeArg,
        /// Generator frequency in hertz.
        #[arg(long)]
        frequency: Option<f64>,
        /// Wave duration in seconds.
        #[arg(long)]
        duration: Option<f64>,
        /// Peak amplitude in volts.
        #[arg(long)]
        amplitude: Option<f64>,
        /// DC offset in volts.
        #[arg(long)]
        offset: Option<f64>,
        /// Waveform shape.
        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
    },
    /// Acquires both input channels for roughly SECONDS.
    Fetch {
        /// Acquisition time in seconds.
        #[arg(value_name = "SECONDS")]
        seconds: f64,
        /// Averaging count to set first.
        #[arg(long)]
        averages: Option<u32>,
    },
    /// Stops any running playback.
    Stop,
    /// Sends raw queries over one connection, in order.
    Query {
        /// Query text such as `SOUR:FREQ:500Hz?`.
        #[arg(value_name = "COMMAND", required = true, num_args = 1..)]
        commands: Vec<String>,
    },
}
