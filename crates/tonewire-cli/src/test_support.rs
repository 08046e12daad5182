//! Loopback stand-in for the server used by unit tests.

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;

use tonewire_protocol::{READ_CHUNK_BYTES, write_reply};

/// Accepts one connection and answers each received command with the next
/// scripted reply, recording the command text.
pub(crate) struct FakeServer {
    port: u16,
    received: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeServer {
    pub(crate) fn start(replies: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        let handle = thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            serve(stream, replies, &log);
        });
        Self {
            port,
            received,
            handle: Some(handle),
        }
    }

    pub(crate) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the connection to finish and returns the commands seen.
    pub(crate) fn received(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("fake server thread");
        }
        self.received.lock().expect("received lock").clone()
    }

    pub(crate) fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.local_addr().expect("local addr").port()
    }
}

fn serve(mut stream: TcpStream, replies: Vec<Value>, log: &Mutex<Vec<String>>) {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    let mut buffer = [0_u8; READ_CHUNK_BYTES];
    for reply in replies {
        let read = match stream.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        let text = String::from_utf8_lossy(&buffer[..read]).into_owned();
        log.lock().expect("received lock").push(text);
        if write_reply(&mut stream, &reply).is_err() {
            return;
        }
    }
}
