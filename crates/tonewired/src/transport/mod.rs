//! TCP transport for the command protocol.
//!
//! The listener accepts on a background thread and serves one client at a
//! time: a second connection waits in the backlog until the current session
//! ends.

mod errors;
mod handler;
mod listener;
mod session;
#[cfg(test)]
mod session_tests;
#[cfg(test)]
mod test_utils;

pub use self::errors::{ListenerError, SessionError};
pub use self::handler::ConnectionHandler;
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::session::SessionHandler;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
