//! Session-scoped waveform parameters and their setter handlers.

use serde_json::Value;

use tonewire_config::Config;
use tonewire_pcm::{BitDepth, CodecError, WaveShape, WaveformRequest};
use tonewire_protocol::{clamp_range, validate_option};

use super::errors::DispatchError;

/// Peak output voltage of the board at full-scale sample value.
pub const FULL_SCALE_VOLTS: f64 = 2.96;

/// Inclusive frequency bounds in hertz.
pub const FREQUENCY_RANGE_HZ: (f64, f64) = (0.0, 192_000.0);
/// Inclusive duration bounds in seconds.
pub const DURATION_RANGE_S: (f64, f64) = (0.0, 3_600.0);
/// Inclusive amplitude and offset bounds in volts.
pub const VOLTAGE_RANGE_V: (f64, f64) = (0.0, FULL_SCALE_VOLTS);
/// Inclusive averaging count bounds.
pub const AVERAGES_RANGE: (u32, u32) = (1, 1_024);

/// Output stream format shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Samples per second per channel.
    pub sample_rate_hz: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Packed sample width.
    pub bit_depth: BitDepth,
}

impl StreamFormat {
    /// Reads the stream format from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] for an unsupported bit depth, zero channels or a
    /// zero sample rate.
    pub fn from_config(config: &Config) -> Result<Self, CodecError> {
        if config.channels == 0 {
            return Err(CodecError::NoChannels);
        }
        if config.sample_rate_hz == 0 {
            return Err(CodecError::ZeroSampleRate);
        }
        Ok(Self {
            sample_rate_hz: config.sample_rate_hz,
            channels: config.channels,
            bit_depth: BitDepth::try_from(config.bit_depth)?,
        })
    }
}

/// Waveform parameters set by `SOUR:*` and `SENS:*` commands.
///
/// Each session starts from the defaults; later writes overwrite earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSettings {
    /// Generator frequency in hertz.
    pub frequency_hz: f64,
    /// Wave duration in seconds.
    pub duration_s: f64,
    /// Peak amplitude in volts.
    pub amplitude_v: f64,
    /// DC offset in volts.
    pub offset_v: f64,
    /// Waveform shape.
    pub shape: WaveShape,
    /// Number of averages requested for acquisition. Stored only.
    pub averages: u32,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 700.0,
            duration_s: 1.0,
            amplitude_v: FULL_SCALE_VOLTS,
            offset_v: 0.0,
            shape: WaveShape::Sine,
            averages: 1,
        }
    }
}

impl WaveformSettings {
    /// Builds a synthesis request, converting volts to sample counts.
    ///
    /// Amplitude counts are clamped to `[1, full_scale]` and offset counts to
    /// `[0, full_scale]`.
    #[must_use]
    pub fn to_request(&self, format: StreamFormat) -> WaveformRequest {
        let full_scale = format.bit_depth.full_scale();
        let amplitude = volts_to_counts(self.amplitude_v, full_scale).clamp(1, full_scale);
        let offset = volts_to_counts(self.offset_v, full_scale).clamp(0, full_scale);
        WaveformRequest {
            shape: self.shape,
            frequency_hz: self.frequency_hz,
            duration_s: self.duration_s,
            amplitude: amplitude as f64,
            offset,
            sample_rate_hz: format.sample_rate_hz,
            channel_count: format.channels,
            bit_depth: format.bit_depth,
        }
    }
}

fn volts_to_counts(volts: f64, full_scale: i64) -> i64 {
    (volts * full_scale as f64 / FULL_SCALE_VOLTS).round() as i64
}

/// Signature shared by every parameter setter.
///
/// `None` leaves the setting untouched and reports its current value.
pub type ParameterHandler = fn(&mut WaveformSettings, Option<&str>) -> Result<Value, DispatchError>;

pub(crate) fn set_frequency(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        let (min, max) = FREQUENCY_RANGE_HZ;
        settings.frequency_hz = clamp_range(parse_number("SOUR", text)?, min, max);
    }
    Ok(number_value(settings.frequency_hz))
}

pub(crate) fn set_duration(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        let (min, max) = DURATION_RANGE_S;
        settings.duration_s = clamp_range(parse_number("SOUR", text)?, min, max);
    }
    Ok(number_value(settings.duration_s))
}

pub(crate) fn set_amplitude(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        let (min, max) = VOLTAGE_RANGE_V;
        settings.amplitude_v = clamp_range(parse_number("SOUR", text)?, min, max);
    }
    Ok(number_value(settings.amplitude_v))
}

pub(crate) fn set_offset(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        let (min, max) = VOLTAGE_RANGE_V;
        settings.offset_v = clamp_range(parse_number("SOUR", text)?, min, max);
    }
    Ok(number_value(settings.offset_v))
}

pub(crate) fn set_shape(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        validate_option(text, &WaveShape::TOKENS)?;
        settings.shape = text
            .parse()
            .map_err(|_| DispatchError::invalid_value("SOUR", text, "unknown waveform"))?;
    }
    Ok(Value::String(settings.shape.to_string()))
}

pub(crate) fn set_averages(
    settings: &mut WaveformSettings,
    value: Option<&str>,
) -> Result<Value, DispatchError> {
    if let Some(text) = value {
        let count: u32 = text
            .trim()
            .parse()
            .map_err(|_| DispatchError::invalid_value("SENS", text, "expected a whole number"))?;
        let (min, max) = AVERAGES_RANGE;
        settings.averages = clamp_range(count, min, max);
    }
    Ok(Value::from(settings.averages))
}

/// Parses a finite decimal number.
pub(crate) fn parse_number(root: &str, text: &str) -> Result<f64, DispatchError> {
    let number: f64 = text
        .trim()
        .parse()
        .map_err(|_| DispatchError::invalid_value(root, text, "expected a decimal number"))?;
    if !number.is_finite() {
        return Err(DispatchError::invalid_value(
            root,
            text,
            "expected a finite number",
        ));
    }
    Ok(number)
}

/// Encodes whole numbers as JSON integers and everything else as floats.
pub(crate) fn number_value(number: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() <= MAX_EXACT {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}
