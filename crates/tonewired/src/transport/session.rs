//! Per-connection read, dispatch and reply loop.

use std::io::{self, Read};
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, warn};

use tonewire_protocol::{READ_CHUNK_BYTES, decode, write_reply};

use super::{ConnectionHandler, LISTENER_TARGET, SessionError};
use crate::dispatch::{Dispatcher, WaveformSettings};
use crate::health::HealthReporter;
use crate::telemetry;

/// Interval at which a blocked read wakes to observe shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Serves the text protocol on one client connection.
///
/// Every read of up to [`READ_CHUNK_BYTES`] bytes is treated as exactly one
/// command. Waveform settings start from their defaults for each session.
pub struct SessionHandler {
    dispatcher: Arc<Dispatcher>,
    reporter: Arc<dyn HealthReporter>,
}

impl SessionHandler {
    /// Creates a handler sharing `dispatcher` across sessions.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            dispatcher,
            reporter,
        }
    }

    fn serve(
        &self,
        stream: &mut TcpStream,
        shutdown: &AtomicBool,
        commands: &mut u64,
    ) -> Result<(), SessionError> {
        stream
            .set_read_timeout(Some(SHUTDOWN_POLL))
            .map_err(|source| SessionError::Configure { source })?;
        let mut settings = WaveformSettings::default();
        let mut chunk = [0_u8; READ_CHUNK_BYTES];

        while !shutdown.load(Ordering::SeqCst) {
            let read = match stream.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(read) => read,
                Err(error) if is_retryable(&error) => continue,
                Err(source) => return Err(SessionError::Read { source }),
            };
            *commands += 1;
            self.process(&chunk[..read], &mut settings, stream)?;
        }
        debug!(target: LISTENER_TARGET, "session interrupted by shutdown");
        Ok(())
    }

    fn process(
        &self,
        raw: &[u8],
        settings: &mut WaveformSettings,
        stream: &mut TcpStream,
    ) -> Result<(), SessionError> {
        let command = match decode(raw) {
            Ok(command) => command,
            Err(error) => {
                warn!(target: LISTENER_TARGET, %error, bytes = raw.len(), "command dropped");
                return Ok(());
            }
        };

        match self.dispatcher.dispatch(&command, settings) {
            Ok(Some(reply)) => {
                write_reply(stream, &reply).map_err(|source| SessionError::Write { source })
            }
            Ok(None) => Ok(()),
            Err(error) if error.is_recoverable() => {
                warn!(
                    target: LISTENER_TARGET,
                    %error,
                    root = %command.root,
                    "command failed; no reply sent"
                );
                Ok(())
            }
            Err(source) => Err(SessionError::Dispatch { source }),
        }
    }
}

impl ConnectionHandler for SessionHandler {
    fn handle(&self, mut stream: TcpStream, shutdown: &AtomicBool) {
        let peer = stream.peer_addr().ok();
        let _session = telemetry::session_span(peer).entered();
        self.reporter.session_opened(peer);
        let mut commands = 0;
        if let Err(failure) = self.serve(&mut stream, shutdown, &mut commands) {
            error!(target: LISTENER_TARGET, error = %failure, ?peer, "session ended");
        }
        self.reporter.session_closed(peer, commands);
    }
}

fn is_retryable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
