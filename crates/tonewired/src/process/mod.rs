//! Process lifecycle: launch, serve, and shut down on signals.

use std::time::Duration;

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub(crate) use launch::{LaunchPlan, run_daemon_with};
pub use shutdown::{
    ShutdownError, ShutdownSignal, StopReason, SystemShutdownSignal, TERMINATION_SIGNALS,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
