//! Typed helpers for the board's command set.

use serde_json::Value;

use tonewire_protocol::{IDENTITY_QUERY, clamp_range, validate_option};

use crate::{AppError, Client};

/// Highest generator frequency accepted by the board, in hertz.
pub const MAX_FREQUENCY_HZ: f64 = 192_000.0;
/// Waveform shapes accepted by [`Instrument::set_wave`].
pub const WAVE_OPTIONS: [&str; 4] = ["SIN", "TRIA", "SQUA", "CONST"];
/// Playback modes accepted by [`Instrument::play`].
pub const PLAY_OPTIONS: [&str; 2] = ["CONT", "LIM"];

/// Signal board reached through a [`Client`].
///
/// Option sets and the frequency range are checked before anything is sent.
/// Every other bound is enforced by the server.
#[derive(Debug)]
pub struct Instrument {
    client: Client,
}

impl Instrument {
    /// Wraps `client`; the caller connects it.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Underlying connection.
    pub const fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    /// Identification string of the server.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn get_id(&mut self) -> Result<Value, AppError> {
        self.client.query(IDENTITY_QUERY)
    }

    /// Sets the generator frequency in hertz, clamped to `[0, 192000]`.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn set_frequency(&mut self, frequency_hz: f64) -> Result<Value, AppError> {
        let frequency_hz = clamp_range(frequency_hz, 0.0, MAX_FREQUENCY_HZ);
        self.client.query(&format!("SOUR:FREQ:{frequency_hz}Hz?"))
    }

    /// Sets the wave duration in seconds.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn set_duration(&mut self, duration_s: f64) -> Result<Value, AppError> {
        self.client.query(&format!("SOUR:LEN:{duration_s}?"))
    }

    /// Selects the waveform shape: `SIN`, `TRIA`, `SQUA` or `CONST`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidOption`] for any other shape, otherwise
    /// propagates [`Client::query`] failures.
    pub fn set_wave(&mut self, shape: &str) -> Result<Value, AppError> {
        validate_option(shape, &WAVE_OPTIONS)?;
        self.client.query(&format!("SOUR:FUNC:{shape}?"))
    }

    /// Sets the peak amplitude in volts.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn set_amplitude(&mut self, volts: f64) -> Result<Value, AppError> {
        self.client.query(&format!("SOUR:VOLT:{volts}V?"))
    }

    /// Sets the DC offset in volts.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn set_offset(&mut self, volts: f64) -> Result<Value, AppError> {
        self.client.query(&format!("SOUR:OFFSET:{volts}V?"))
    }

    /// Sets the acquisition averaging count.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn set_averages(&mut self, count: u32) -> Result<Value, AppError> {
        self.client.query(&format!("SENS:AVER:{count}COUN?"))
    }

    /// Starts playback in `CONT` (until stopped) or `LIM` (for the set
    /// duration) mode.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidOption`] for any other mode, otherwise
    /// propagates [`Client::query`] failures.
    pub fn play(&mut self, mode: &str) -> Result<Value, AppError> {
        validate_option(mode, &PLAY_OPTIONS)?;
        self.client.query(&format!("INIT:{mode}?"))
    }

    /// Acquires roughly `duration_s` seconds from both input channels.
    ///
    /// The reply is the whole `{"ch0": [...], "ch1": [...]}` object.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn read_signal(&mut self, duration_s: f64) -> Result<Value, AppError> {
        self.client.query(&format!("FETC:{duration_s}?"))
    }

    /// Stops any running playback.
    ///
    /// # Errors
    ///
    /// Propagates [`Client::query`] failures.
    pub fn stop_signal(&mut self) -> Result<Value, AppError> {
        self.client.query("OUTPUT:STATE OFF?")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::FakeServer;
    use rstest::rstest;
    use serde_json::json;

    fn connected(server: &FakeServer) -> Instrument {
        let mut client = Client::new("127.0.0.1", server.port())
            .with_timeout(Duration::from_secs(2))
            .with_write_delay(Duration::ZERO);
        client.connect().expect("connect");
        Instrument::new(client)
    }

    #[test]
    fn sends_the_board_command_set() {
        let server = FakeServer::start(vec![
            json!("bench-01"),
            json!({"SOUR": 192_000}),
            json!({"SOUR": 2.5}),
            json!({"SOUR": "TRIA"}),
            json!({"SOUR": 1.5}),
            json!({"SOUR": 0.25}),
            json!({"SENS": 8}),
            json!({"INIT": "Playing the data"}),
            json!({"OUTPUT": "Data stream interrupted"}),
        ]);
        let mut instrument = connected(&server);

        assert_eq!(instrument.get_id().expect("idn"), json!("bench-01"));
        assert_eq!(instrument.set_frequency(250_000.0).expect("freq"), json!(192_000));
        assert_eq!(instrument.set_duration(2.5).expect("len"), json!(2.5));
        assert_eq!(instrument.set_wave("TRIA").expect("func"), json!("TRIA"));
        assert_eq!(instrument.set_amplitude(1.5).expect("volt"), json!(1.5));
        assert_eq!(instrument.set_offset(0.25).expect("offset"), json!(0.25));
        assert_eq!(instrument.set_averages(8).expect("aver"), json!(8));
        assert_eq!(instrument.play("LIM").expect("play"), json!("Playing the data"));
        assert_eq!(
            instrument.stop_signal().expect("stop"),
            json!("Data stream interrupted")
        );
        drop(instrument);

        assert_eq!(
            server.received(),
            vec![
                "*IDN?",
                "SOUR:FREQ:192000Hz?",
                "SOUR:LEN:2.5?",
                "SOUR:FUNC:TRIA?",
                "SOUR:VOLT:1.5V?",
                "SOUR:OFFSET:0.25V?",
                "SENS:AVER:8COUN?",
                "INIT:LIM?",
                "OUTPUT:STATE OFF?",
            ]
        );
    }

    #[test]
    fn read_signal_returns_both_channels() {
        let channels = json!({"ch0": [10, 20], "ch1": [-10, -20]});
        let server = FakeServer::start(vec![channels.clone()]);
        let mut instrument = connected(&server);
        assert_eq!(instrument.read_signal(0.5).expect("fetch"), channels);
        drop(instrument);
        assert_eq!(server.received(), vec!["FETC:0.5?"]);
    }

    #[rstest]
    #[case::saw_wave("SAW")]
    #[case::lowercase("sin")]
    fn rejects_unknown_shapes_before_sending(#[case] shape: &str) {
        let mut instrument = Instrument::new(Client::new("127.0.0.1", 1));
        let error = instrument.set_wave(shape).expect_err("unlisted shape");
        assert!(matches!(error, AppError::InvalidOption(_)));
    }

    #[test]
    fn rejects_unknown_play_modes_before_sending() {
        let mut instrument = Instrument::new(Client::new("127.0.0.1", 1));
        let error = instrument.play("ONCE").expect_err("unlisted mode");
        assert!(matches!(error, AppError::InvalidOption(_)));
    }
}
