//! Loopback tests for the session loop.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use tonewire_pcm::BitDepth;
use tonewire_protocol::{FrameError, decode_reply, read_frame};

use super::{ConnectionHandler, SessionHandler};
use crate::dispatch::{Dispatcher, StreamFormat};
use crate::playback::{Collaborators, MockCollaborators, PlaybackController};
use crate::tests::support::{HealthEvent, RecordingHealthReporter};

struct SessionHarness {
    client: TcpStream,
    server: JoinHandle<()>,
    reporter: Arc<RecordingHealthReporter>,
}

impl SessionHarness {
    fn send(&mut self, text: &str) {
        self.client.write_all(text.as_bytes()).expect("write command");
        self.client.flush().expect("flush");
    }

    fn reply(&mut self) -> Value {
        let payload = read_frame(&mut self.client).expect("reply frame");
        decode_reply(&payload).expect("reply json")
    }

    fn expect_silence(&mut self) {
        self.client
            .set_read_timeout(Some(Duration::from_millis(300)))
            .expect("set timeout");
        match read_frame(&mut self.client) {
            Err(FrameError::Io(error)) => assert!(matches!(
                error.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            )),
            other => panic!("expected no reply, got {other:?}"),
        }
        self.client.set_read_timeout(None).expect("clear timeout");
    }

    fn close(self) -> Vec<HealthEvent> {
        drop(self.client);
        self.server.join().expect("server join");
        self.reporter.events()
    }
}

#[fixture]
fn harness() -> SessionHarness {
    let collaborators: Arc<dyn Collaborators> = Arc::new(MockCollaborators::new());
    let playback = Arc::new(PlaybackController::new(Arc::clone(&collaborators)));
    let format = StreamFormat {
        sample_rate_hz: 192_000,
        channels: 2,
        bit_depth: BitDepth::TwentyFour,
    };
    let dispatcher = Arc::new(Dispatcher::new("bench-01", format, playback, collaborators));
    let reporter = Arc::new(RecordingHealthReporter::default());
    let handler = SessionHandler::new(dispatcher, reporter.clone());

    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        handler.handle(stream, &AtomicBool::new(false));
    });
    let client = TcpStream::connect(addr).expect("connect");
    SessionHarness {
        client,
        server,
        reporter,
    }
}

#[rstest]
fn queries_receive_length_prefixed_replies(mut harness: SessionHarness) {
    harness.send("SOUR:FREQ:500Hz?");
    assert_eq!(harness.reply(), json!({"SOUR": 500}));

    harness.send("SOUR:FREQ:999999Hz?");
    assert_eq!(harness.reply(), json!({"SOUR": 192_000}));

    harness.send("*IDN?");
    assert_eq!(harness.reply(), json!("bench-01"));

    let events = harness.close();
    assert_eq!(
        events,
        vec![
            HealthEvent::SessionOpened,
            HealthEvent::SessionClosed { commands: 3 },
        ]
    );
}

#[rstest]
fn invalid_commands_get_no_reply_and_the_session_survives(mut harness: SessionHarness) {
    harness.send("GARBAGE:1?");
    harness.expect_silence();

    harness.send("SOUR:FREQ:500Hz");
    harness.expect_silence();

    harness.send("SOUR:FREQ?");
    assert_eq!(harness.reply(), json!({"SOUR": 700}));
    harness.close();
}

#[rstest]
fn trailing_newline_is_ignored(mut harness: SessionHarness) {
    harness.send("SOUR:FUNC:TRIA?\n");
    assert_eq!(harness.reply(), json!({"SOUR": "TRIA"}));
    harness.close();
}
