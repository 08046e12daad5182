//! Errors raised while synthesising or packing samples.

use thiserror::Error;

/// Failures reported by the sample codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The requested frequency cannot be represented at the sample rate.
    #[error("frequency {frequency_hz} Hz exceeds the Nyquist limit of {limit_hz} Hz")]
    NyquistViolation {
        /// Requested frequency.
        frequency_hz: f64,
        /// Half the sample rate.
        limit_hz: f64,
    },
    /// Bit depth outside 16, 24 and 32.
    #[error("unsupported precision: {bits} bits (expected 16, 24 or 32)")]
    UnsupportedPrecision {
        /// Requested sample width.
        bits: u32,
    },
    /// Periodic shapes need a strictly positive frequency.
    #[error("frequency must be positive for periodic shapes, got {frequency_hz} Hz")]
    NonPositiveFrequency {
        /// Requested frequency.
        frequency_hz: f64,
    },
    /// Amplitude does not fit in the selected bit depth.
    #[error("amplitude {amplitude} exceeds the {max} full-scale value of the bit depth")]
    AmplitudeOutOfRange {
        /// Requested amplitude in counts.
        amplitude: f64,
        /// Largest positive sample of the bit depth.
        max: i64,
    },
    /// At least one channel is required.
    #[error("channel count must be at least 1")]
    NoChannels,
    /// Duration was negative or not a number.
    #[error("duration must be a non-negative number of seconds, got {duration_s}")]
    InvalidDuration {
        /// Requested duration.
        duration_s: f64,
    },
    /// Sample rate of zero.
    #[error("sample rate must be positive")]
    ZeroSampleRate,
}
