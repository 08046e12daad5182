//! The tonewire server.
//!
//! `tonewired` exposes a signal generator and two-channel acquisition board
//! over a line-less TCP text protocol. Clients send commands such as
//! `SOUR:FREQ:500Hz?` or `FETC:0.03?`; every read from the socket is one
//! command, and replies are JSON objects framed with a 4-byte little-endian
//! length prefix.
//!
//! Audio never passes through this process's devices. Playback hands
//! synthesised PCM to an external player executable on a background thread,
//! and acquisition runs an external capture executable and decodes the file it
//! writes. Both sit behind the [`playback::Collaborators`] seam.
//!
//! The server serves one client at a time. Waveform settings live for the
//! duration of a session; the running playback is shared so any later
//! session can stop it.

mod bootstrap;
pub mod dispatch;
mod health;
pub mod playback;
mod process;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, StopReason, SystemShutdownSignal, run_daemon,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{
    ConnectionHandler, ListenerError, ListenerHandle, SessionError, SessionHandler, SocketListener,
};

#[cfg(test)]
mod tests;
