//! Waveform shapes and their command-language tokens.

use strum::{Display, EnumString};

/// Shape of a synthesised waveform.
///
/// The string forms are the option tokens accepted by `SOUR:FUNC`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
pub enum WaveShape {
    /// `round(A * sin(2π f i / rate))`.
    #[default]
    #[strum(serialize = "SIN")]
    Sine,
    /// `round(A * (2/π) * asin(sin(2π f i / rate)))`: starts at zero and
    /// peaks a quarter cycle in, in phase with [`WaveShape::Sine`].
    #[strum(serialize = "TRIA")]
    Triangle,
    /// 50% duty square wave.
    #[strum(serialize = "SQUA")]
    Square,
    /// Flat level at the amplitude.
    #[strum(serialize = "CONST")]
    Constant,
}

impl WaveShape {
    /// Every option token, in command-table order.
    pub const TOKENS: [&'static str; 4] = ["SIN", "TRIA", "SQUA", "CONST"];

    /// Whether the frame count is truncated to whole cycles.
    #[must_use]
    pub const fn is_periodic(self) -> bool {
        !matches!(self, Self::Constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_str() {
        for token in WaveShape::TOKENS {
            let shape: WaveShape = token.parse().expect("known token");
            assert_eq!(shape.to_string(), token);
        }
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert!("sin".parse::<WaveShape>().is_err());
    }

    #[test]
    fn only_constant_is_aperiodic() {
        assert!(WaveShape::Sine.is_periodic());
        assert!(!WaveShape::Constant.is_periodic());
    }
}
