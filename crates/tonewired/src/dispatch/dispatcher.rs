//! Executes resolved commands against session and server state.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info};

use tonewire_pcm::{deinterleave, snr_db, unpack_padded24};
use tonewire_protocol::Command;

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::registry::{CommandKind, CommandRegistry, PlayMode, Route};
use super::settings::{StreamFormat, WaveformSettings, parse_number};
use crate::playback::{CaptureJob, Collaborators, PlaybackController, PlaybackJob};

/// Sample width recorded by the capture executable before padding.
const CAPTURE_SAMPLE_BITS: u32 = 24;

const PLAY_REPLY: &str = "Playing the data";
const STOP_REPLY: &str = "Data stream interrupted";
const STOP_KEYWORD: &str = "STATE";

/// Routes decoded commands to settings, playback and acquisition.
///
/// One dispatcher serves every session. Waveform settings are owned by the
/// session and passed in per call; playback state is shared.
pub struct Dispatcher {
    registry: CommandRegistry,
    identity: String,
    format: StreamFormat,
    playback: Arc<PlaybackController>,
    collaborators: Arc<dyn Collaborators>,
}

impl Dispatcher {
    /// Creates a dispatcher with the standard command table.
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        format: StreamFormat,
        playback: Arc<PlaybackController>,
        collaborators: Arc<dyn Collaborators>,
    ) -> Self {
        Self {
            registry: CommandRegistry::standard(),
            identity: identity.into(),
            format,
            playback,
            collaborators,
        }
    }

    /// Shared playback controller.
    #[must_use]
    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    /// Executes `command` and returns the reply payload, if any.
    ///
    /// Non-query commands are resolved but not executed and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the command is unknown, its value is
    /// rejected, or a collaborator fails. Callers log the error; nothing is
    /// sent to the client.
    pub fn dispatch(
        &self,
        command: &Command,
        settings: &mut WaveformSettings,
    ) -> Result<Option<Value>, DispatchError> {
        if command.is_identity {
            return Ok(Some(Value::String(self.identity.clone())));
        }

        let route = self.registry.resolve(command)?;
        if !command.is_query {
            debug!(
                target: DISPATCH_TARGET,
                root = route.root,
                "command without '?' dropped"
            );
            return Ok(None);
        }

        let reply = match route.kind {
            CommandKind::SetParameter(handler) => {
                let value = handler(settings, route.value)?;
                single_entry(route.root, value)
            }
            CommandKind::StartPlay(mode) => self.start_play(settings, mode)?,
            CommandKind::Fetch => self.fetch(&route)?,
            CommandKind::Stop => self.stop(&route)?,
        };
        Ok(Some(reply))
    }

    fn start_play(
        &self,
        settings: &WaveformSettings,
        mode: PlayMode,
    ) -> Result<Value, DispatchError> {
        let request = settings.to_request(self.format);
        request.validate()?;
        info!(
            target: DISPATCH_TARGET,
            ?mode,
            shape = %request.shape,
            frequency_hz = request.frequency_hz,
            duration_s = request.duration_s,
            "starting playback"
        );
        self.playback.start(PlaybackJob { request, mode })?;
        Ok(single_entry("INIT", Value::from(PLAY_REPLY)))
    }

    fn fetch(&self, route: &Route<'_>) -> Result<Value, DispatchError> {
        let text = route
            .value
            .ok_or_else(|| DispatchError::invalid_value(route.root, "", "expected seconds"))?;
        let seconds = parse_number(route.root, text)?;
        if seconds < 0.0 {
            return Err(DispatchError::invalid_value(
                route.root,
                text,
                "expected a non-negative duration",
            ));
        }

        let job = CaptureJob::for_duration(seconds, self.format.sample_rate_hz, CAPTURE_SAMPLE_BITS);
        let raw = self.collaborators.capture(&job)?;
        let samples = unpack_padded24(&raw);
        let (ch0, ch1) = deinterleave(&samples);
        debug!(
            target: DISPATCH_TARGET,
            bytes = raw.len(),
            frames = ch0.len(),
            snr_db = snr_db(&ch0),
            "acquisition decoded"
        );
        Ok(json!({ "ch0": ch0, "ch1": ch1 }))
    }

    fn stop(&self, route: &Route<'_>) -> Result<Value, DispatchError> {
        match route.value {
            Some(value) if value.starts_with(STOP_KEYWORD) => {}
            other => return Err(DispatchError::invalid_command(route.root, other)),
        }
        self.playback.stop()?;
        Ok(single_entry(route.root, Value::from(STOP_REPLY)))
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut object = serde_json::Map::with_capacity(1);
    object.insert(key.to_owned(), value);
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::{fixture, rstest};
    use tonewire_pcm::{BitDepth, CodecError, WaveShape};
    use tonewire_protocol::decode;

    use super::*;
    use crate::playback::MockCollaborators;
    use crate::tests::support::captured_logs;

    fn format() -> StreamFormat {
        StreamFormat {
            sample_rate_hz: 192_000,
            channels: 2,
            bit_depth: BitDepth::TwentyFour,
        }
    }

    fn dispatcher(collaborators: MockCollaborators) -> Dispatcher {
        let collaborators: Arc<dyn Collaborators> = Arc::new(collaborators);
        let playback = Arc::new(PlaybackController::new(Arc::clone(&collaborators)));
        Dispatcher::new("rp-board", format(), playback, collaborators)
    }

    #[fixture]
    fn idle() -> Dispatcher {
        dispatcher(MockCollaborators::new())
    }

    fn run(
        dispatcher: &Dispatcher,
        settings: &mut WaveformSettings,
        text: &str,
    ) -> Result<Option<Value>, DispatchError> {
        let command = decode(text.as_bytes()).expect("decode");
        dispatcher.dispatch(&command, settings)
    }

    #[rstest]
    #[case::in_range("SOUR:FREQ:500Hz?", json!({"SOUR": 500}))]
    #[case::clamped("SOUR:FREQ:999999Hz?", json!({"SOUR": 192_000}))]
    #[case::volts("SOUR:VOLT:1.5V?", json!({"SOUR": 1.5}))]
    #[case::shape("SOUR:FUNC:SQUA?", json!({"SOUR": "SQUA"}))]
    #[case::averages("SENS:AVER:8COUN?", json!({"SENS": 8}))]
    #[case::current_value("SOUR:LEN?", json!({"SOUR": 1}))]
    fn parameter_queries_echo_the_stored_value(
        idle: Dispatcher,
        #[case] text: &str,
        #[case] expected: Value,
    ) {
        let mut settings = WaveformSettings::default();
        let reply = run(&idle, &mut settings, text).expect("dispatch");
        assert_eq!(reply, Some(expected));
    }

    #[rstest]
    #[case::clamped("SOUR:FREQ:999999Hz?", 1)]
    #[case::in_range("SOUR:FREQ:500Hz?", 0)]
    fn clamping_logs_one_warning_per_correction(
        idle: Dispatcher,
        #[case] text: &str,
        #[case] warnings: usize,
    ) {
        let mut settings = WaveformSettings::default();
        let logs = captured_logs(|| {
            run(&idle, &mut settings, text).expect("dispatch");
        });
        let clamp_lines: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("value out of range"))
            .collect();
        assert_eq!(clamp_lines.len(), warnings, "{logs}");
        for line in clamp_lines {
            assert!(line.contains("WARN"), "{line}");
            assert!(line.contains("corrected=192000"), "{line}");
        }
    }

    #[rstest]
    fn identity_returns_the_configured_string(idle: Dispatcher) {
        let mut settings = WaveformSettings::default();
        let reply = run(&idle, &mut settings, "*IDN?").expect("dispatch");
        assert_eq!(reply, Some(json!("rp-board")));
    }

    #[rstest]
    fn non_query_commands_are_dropped_unexecuted(idle: Dispatcher) {
        let mut settings = WaveformSettings::default();
        let reply = run(&idle, &mut settings, "SOUR:FREQ:500Hz").expect("dispatch");
        assert_eq!(reply, None);
        assert_eq!(settings, WaveformSettings::default());
    }

    #[rstest]
    #[case::unknown_root("GARBAGE:1?")]
    #[case::unknown_sub("SOUR:PHASE:1?")]
    #[case::bad_shape("SOUR:FUNC:SAW?")]
    #[case::bad_number("SOUR:FREQ:fastHz?")]
    #[case::bad_stop("OUTPUT:LEVEL?")]
    #[case::negative_fetch("FETC:-1?")]
    fn invalid_commands_produce_errors_not_replies(idle: Dispatcher, #[case] text: &str) {
        let mut settings = WaveformSettings::default();
        let error = run(&idle, &mut settings, text).expect_err("must fail");
        assert!(error.is_recoverable());
    }

    #[rstest]
    fn play_rejects_frequencies_above_nyquist(idle: Dispatcher) {
        let mut settings = WaveformSettings {
            frequency_hz: 100_001.0,
            ..WaveformSettings::default()
        };
        let error = run(&idle, &mut settings, "INIT:CONT?").expect_err("nyquist");
        assert!(matches!(error, DispatchError::Codec(_)));
    }

    #[rstest]
    fn constant_level_is_still_bound_by_nyquist(idle: Dispatcher) {
        let mut settings = WaveformSettings {
            frequency_hz: 100_001.0,
            shape: WaveShape::Constant,
            ..WaveformSettings::default()
        };
        let error = run(&idle, &mut settings, "INIT:LIM?").expect_err("nyquist");
        assert!(matches!(
            error,
            DispatchError::Codec(CodecError::NyquistViolation { .. })
        ));
    }

    #[test]
    fn hour_long_playback_starts_without_rendering_up_front() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let mut collaborators = MockCollaborators::new();
        collaborators
            .expect_play()
            .once()
            .returning(move |job, _slot| {
                sender
                    .send(job.request.duration_s)
                    .expect("report duration");
                Ok(())
            });
        collaborators.expect_stop().returning(|_| Ok(()));
        let dispatcher = dispatcher(collaborators);
        let mut settings = WaveformSettings::default();

        let reply = run(&dispatcher, &mut settings, "SOUR:LEN:3600?").expect("set length");
        assert_eq!(reply, Some(json!({"SOUR": 3600})));
        let reply = run(&dispatcher, &mut settings, "INIT:CONT?").expect("dispatch");
        assert_eq!(reply, Some(json!({"INIT": "Playing the data"})));
        let duration_s = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("player invoked");
        assert!((duration_s - 3_600.0).abs() < f64::EPSILON);
        dispatcher.playback().shutdown(Duration::from_secs(5));
    }

    #[test]
    fn play_starts_background_playback() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let mut collaborators = MockCollaborators::new();
        collaborators
            .expect_play()
            .once()
            .returning(move |job, _slot| {
                sender.send(job.mode).expect("report mode");
                Ok(())
            });
        collaborators.expect_stop().returning(|_| Ok(()));
        let dispatcher = dispatcher(collaborators);
        let mut settings = WaveformSettings {
            duration_s: 0.01,
            ..WaveformSettings::default()
        };

        let reply = run(&dispatcher, &mut settings, "INIT:LIM?").expect("dispatch");
        assert_eq!(reply, Some(json!({"INIT": "Playing the data"})));
        let mode = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("player invoked");
        assert_eq!(mode, PlayMode::Limited);
        dispatcher.playback().shutdown(Duration::from_secs(5));
    }

    #[test]
    fn fetch_decodes_both_channels() {
        let mut collaborators = MockCollaborators::new();
        collaborators
            .expect_capture()
            .once()
            .withf(|job| job.loops == 15 && job.bits == 24)
            .returning(|_| {
                let mut raw = Vec::new();
                for value in [1_i32, -1, 2, -2] {
                    raw.extend_from_slice(&value.to_le_bytes()[..3]);
                    raw.push(0);
                }
                Ok(raw)
            });
        let dispatcher = dispatcher(collaborators);
        let mut settings = WaveformSettings::default();

        let reply = run(&dispatcher, &mut settings, "FETC:0.03?").expect("dispatch");
        assert_eq!(reply, Some(json!({"ch0": [1, 2], "ch1": [-1, -2]})));
    }

    #[test]
    fn stop_signals_playback() {
        let mut collaborators = MockCollaborators::new();
        collaborators.expect_stop().once().returning(|_| Ok(()));
        let dispatcher = dispatcher(collaborators);
        let mut settings = WaveformSettings::default();

        let reply = run(&dispatcher, &mut settings, "OUTPUT:STATE OFF?").expect("dispatch");
        assert_eq!(reply, Some(json!({"OUTPUT": "Data stream interrupted"})));
    }
}
