//! Blocking TCP client for the signal board server.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use tonewire_config::Config;
use tonewire_protocol::{IDENTITY_QUERY, decode_reply, read_frame};

use crate::AppError;

/// Root keyword whose replies are returned whole.
const FETCH_ROOT: &str = "FETC";

/// Connection to one server.
///
/// Commands are written unframed, one per write, followed by a fixed delay so
/// consecutive commands do not share a server read. Replies are read as
/// length-prefixed JSON.
#[derive(Debug)]
pub struct Client {
    host: String,
    port: u16,
    timeout: Duration,
    write_delay: Duration,
    stream: Option<TcpStream>,
}

impl Client {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(tonewire_config::DEFAULT_CLIENT_TIMEOUT_SECS),
            write_delay: Duration::from_millis(tonewire_config::DEFAULT_WRITE_DELAY_MS),
            stream: None,
        }
    }

    /// Creates a disconnected client for the configured server.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.host.clone(), config.port)
            .with_timeout(Duration::from_secs(config.client_timeout_secs))
            .with_write_delay(Duration::from_millis(config.write_delay_ms))
    }

    /// Overrides the connect and read timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the pause after each write.
    #[must_use]
    pub const fn with_write_delay(mut self, write_delay: Duration) -> Self {
        self.write_delay = write_delay;
        self
    }

    /// `host:port` of the server.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a connection is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Opens the connection. Does nothing when already connected.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Resolve`] when the address does not resolve and
    /// [`AppError::Connect`] when no resolved address accepts in time.
    pub fn connect(&mut self) -> Result<(), AppError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let endpoint = self.endpoint();
        let addresses: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| AppError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?
            .collect();

        let mut last_error = None;
        for address in addresses {
            match self.open(address) {
                Ok(stream) => {
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(error) => last_error = Some(error),
            }
        }
        Err(AppError::Connect {
            endpoint,
            source: last_error.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
            }),
        })
    }

    fn open(&self, address: SocketAddr) -> std::io::Result<TcpStream> {
        let stream = TcpStream::connect_timeout(&address, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Closes the connection. Does nothing when not connected.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone; dropping the stream closes it.
            drop(stream.shutdown(std::net::Shutdown::Both));
        }
    }

    /// Sends `command` and waits for the write delay.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConnected`] without a connection and
    /// [`AppError::SendCommand`] when the socket write fails.
    pub fn write(&mut self, command: &str) -> Result<(), AppError> {
        let stream = self.stream.as_mut().ok_or(AppError::NotConnected)?;
        stream
            .write_all(command.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(AppError::SendCommand)?;
        if !self.write_delay.is_zero() {
            thread::sleep(self.write_delay);
        }
        Ok(())
    }

    /// Reads one framed reply.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConnected`] without a connection and
    /// [`AppError::ReadReply`] when the frame is incomplete, times out or is
    /// not JSON.
    pub fn read(&mut self) -> Result<Value, AppError> {
        let stream = self.stream.as_mut().ok_or(AppError::NotConnected)?;
        let payload = read_frame(stream).map_err(AppError::ReadReply)?;
        decode_reply(&payload).map_err(AppError::ReadReply)
    }

    /// Sends a query and returns its reply.
    ///
    /// Replies to `FETC` and `*IDN?` are returned whole; every other reply is
    /// reduced to the value under the command's root keyword.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAQuery`] for text without `?`, any error from
    /// [`Client::write`] or [`Client::read`], and
    /// [`AppError::MissingRootKey`] when the reply lacks the root entry.
    pub fn query(&mut self, command: &str) -> Result<Value, AppError> {
        if !command.contains('?') {
            return Err(AppError::NotAQuery {
                command: command.to_owned(),
            });
        }
        self.write(command)?;
        let reply = self.read()?;

        let root = command.split(':').next().unwrap_or(command);
        if root == FETCH_ROOT || root == IDENTITY_QUERY {
            return Ok(reply);
        }
        match reply {
            Value::Object(mut entries) => {
                entries
                    .remove(root)
                    .ok_or_else(|| AppError::MissingRootKey {
                        root: root.to_owned(),
                        reply: Value::Object(entries).to_string(),
                    })
            }
            other => Err(AppError::MissingRootKey {
                root: root.to_owned(),
                reply: other.to_string(),
            }),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}
