//! Connection handling abstraction for the listener.

use std::net::TcpStream;
use std::sync::atomic::AtomicBool;

/// Handles accepted client connections.
///
/// Handlers run on the accept thread, so the listener accepts nothing else
/// until `handle` returns.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves one connection until the peer closes it or `shutdown` is set.
    ///
    /// Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream, shutdown: &AtomicBool);
}
