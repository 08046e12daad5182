//! Supported PCM sample widths.

use std::fmt;

use crate::CodecError;

/// Sample width of a packed PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// Two bytes per sample.
    Sixteen,
    /// Three bytes per sample, produced by dropping the top byte of a 32-bit word.
    TwentyFour,
    /// Four bytes per sample.
    ThirtyTwo,
}

impl BitDepth {
    /// Number of bits per sample.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Sixteen => 16,
            Self::TwentyFour => 24,
            Self::ThirtyTwo => 32,
        }
    }

    /// Number of bytes each sample occupies once packed.
    #[must_use]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::Sixteen => 2,
            Self::TwentyFour => 3,
            Self::ThirtyTwo => 4,
        }
    }

    /// Largest positive sample, `2^(bits-1) - 1`.
    #[must_use]
    pub const fn full_scale(self) -> i64 {
        (1_i64 << (self.bits() - 1)) - 1
    }

    /// Smallest negative sample, `-2^(bits-1)`.
    #[must_use]
    pub const fn min_sample(self) -> i64 {
        -(1_i64 << (self.bits() - 1))
    }

    /// ALSA format name handed to the player executable.
    #[must_use]
    pub const fn alsa_format(self) -> &'static str {
        match self {
            Self::Sixteen => "S16_LE",
            Self::TwentyFour => "S24_LE",
            Self::ThirtyTwo => "S32_LE",
        }
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = CodecError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(Self::Sixteen),
            24 => Ok(Self::TwentyFour),
            32 => Ok(Self::ThirtyTwo),
            other => Err(CodecError::UnsupportedPrecision { bits: other }),
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::try_from(u32::from(bits))
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}-bit", self.bits())
    }
}
