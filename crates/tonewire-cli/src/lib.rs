//! Client library and command-line runtime for the tonewire signal board.
//!
//! [`Client`] speaks the wire protocol: unframed command text out,
//! length-prefixed JSON replies back. [`Instrument`] layers the board's
//! command set on top. [`run`] drives both from the `tonewire` binary, with
//! configuration loading and IO streams substitutable in tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use tonewire_config::Config;

mod cli;
mod client;
mod config;
mod errors;
mod instrument;
#[cfg(test)]
mod test_support;

use cli::{Cli, CliCommand};
pub use client::Client;
use config::{ConfigLoader, OrthoConfigLoader, prepare_cli_arguments, split_config_arguments};
pub use errors::AppError;
pub use instrument::{Instrument, MAX_FREQUENCY_HZ, PLAY_OPTIONS, WAVE_OPTIONS};

/// Runs the CLI using the provided arguments and IO handles.
///
/// Each reply is written to `stdout` as one JSON line; failures go to
/// `stderr` and yield a non-zero exit code.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

fn run_with_loader<I, W, E, L>(args: I, stdout: &mut W, stderr: &mut E, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(prepare_cli_arguments(&args, &split)) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(&cli.command, &config, stdout));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(command: &CliCommand, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    let mut client = Client::from_config(config);
    client.connect()?;
    let mut instrument = Instrument::new(client);

    match command {
        CliCommand::Idn => emit(stdout, &instrument.get_id()?),
        CliCommand::Play {
            mode,
            frequency,
            duration,
            amplitude,
            offset,
            shape,
        } => {
            if let Some(frequency) = frequency {
                emit(stdout, &instrument.set_frequency(*frequency)?)?;
            }
            if let Some(duration) = duration {
                emit(stdout, &instrument.set_duration(*duration)?)?;
            }
            if let Some(amplitude) = amplitude {
                emit(stdout, &instrument.set_amplitude(*amplitude)?)?;
            }
            if let Some(offset) = offset {
                emit(stdout, &instrument.set_offset(*offset)?)?;
            }
            if let Some(shape) = shape {
                emit(stdout, &instrument.set_wave(shape.token())?)?;
            }
            emit(stdout, &instrument.play(mode.token())?)
        }
        CliCommand::Fetch { seconds, averages } => {
            if let Some(count) = averages {
                emit(stdout, &instrument.set_averages(*count)?)?;
            }
            emit(stdout, &instrument.read_signal(*seconds)?)
        }
        CliCommand::Stop => emit(stdout, &instrument.stop_signal()?),
        CliCommand::Query { commands } => {
            for text in commands {
                let reply = instrument.client_mut().query(text)?;
                emit(stdout, &reply)?;
            }
            Ok(())
        }
    }
}

fn emit<W: Write>(stdout: &mut W, reply: &Value) -> Result<(), AppError> {
    writeln!(stdout, "{reply}").map_err(AppError::WriteOutput)?;
    stdout.flush().map_err(AppError::WriteOutput)
}
