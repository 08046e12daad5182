//! Waveform synthesis into interleaved signed samples.

use std::f64::consts::{PI, TAU};

use crate::{CodecError, WaveShape};

/// Number of frames a request produces.
///
/// Periodic shapes are truncated to whole cycles: one cycle is
/// `floor(rate / f)` frames and `floor(duration * f)` cycles are emitted.
/// [`WaveShape::Constant`] uses `floor(rate * duration)` frames and accepts
/// any frequency up to the Nyquist limit, zero included.
///
/// # Errors
///
/// Returns [`CodecError`] when the frequency, duration or sample rate cannot
/// describe a valid signal for the shape.
pub fn frame_count(
    shape: WaveShape,
    frequency_hz: f64,
    duration_s: f64,
    sample_rate_hz: u32,
) -> Result<usize, CodecError> {
    if sample_rate_hz == 0 {
        return Err(CodecError::ZeroSampleRate);
    }
    if duration_s.is_nan() || duration_s < 0.0 {
        return Err(CodecError::InvalidDuration { duration_s });
    }
    let rate = f64::from(sample_rate_hz);
    let limit_hz = rate / 2.0;
    if frequency_hz > limit_hz {
        return Err(CodecError::NyquistViolation {
            frequency_hz,
            limit_hz,
        });
    }
    if !shape.is_periodic() {
        return Ok((rate * duration_s).floor() as usize);
    }
    if frequency_hz.is_nan() || frequency_hz <= 0.0 {
        return Err(CodecError::NonPositiveFrequency { frequency_hz });
    }
    let cycle = (rate / frequency_hz).floor() as usize;
    let cycles = (duration_s * frequency_hz).floor() as usize;
    Ok(cycle * cycles)
}

/// Synthesises `shape` as interleaved samples, one copy per channel.
///
/// Samples are rounded to the nearest integer. The caller is responsible for
/// keeping `amplitude` within the range of the eventual bit depth.
///
/// # Errors
///
/// Returns [`CodecError::NoChannels`] when `channel_count` is zero, and the
/// errors of [`frame_count`] otherwise.
pub fn synthesize(
    shape: WaveShape,
    frequency_hz: f64,
    duration_s: f64,
    amplitude: f64,
    sample_rate_hz: u32,
    channel_count: u16,
) -> Result<Vec<i32>, CodecError> {
    if channel_count == 0 {
        return Err(CodecError::NoChannels);
    }
    let frames = frame_count(shape, frequency_hz, duration_s, sample_rate_hz)?;
    let channels = usize::from(channel_count);

    let mut samples = Vec::with_capacity(frames * channels);
    for index in 0..frames {
        let value = sample_at(shape, frequency_hz, amplitude, sample_rate_hz, index);
        samples.extend(std::iter::repeat_n(value, channels));
    }
    Ok(samples)
}

/// Rounded sample for frame `index`, before any offset is applied.
pub(crate) fn sample_at(
    shape: WaveShape,
    frequency_hz: f64,
    amplitude: f64,
    sample_rate_hz: u32,
    index: usize,
) -> i32 {
    let phase = frequency_hz * index as f64 / f64::from(sample_rate_hz);
    (amplitude * unit_sample(shape, phase)).round() as i32
}

/// Shape value in `[-1, 1]` at `phase` cycles.
fn unit_sample(shape: WaveShape, phase: f64) -> f64 {
    match shape {
        WaveShape::Sine => (TAU * phase).sin(),
        WaveShape::Triangle => (2.0 / PI) * (TAU * phase).sin().asin(),
        WaveShape::Square => {
            if phase.fract() < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        WaveShape::Constant => 1.0,
    }
}
