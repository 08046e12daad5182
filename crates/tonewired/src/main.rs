//! Entry point for the tonewire signal board server.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(error) = tonewired::run_daemon() {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "tonewired: {error}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
