//! Little-endian PCM packing and padded capture decoding.

use crate::{BitDepth, CodecError};

/// Packs samples at the width named by `bit_depth`.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedPrecision`] for widths other than 16, 24
/// and 32.
pub fn pack(samples: &[i32], bit_depth: u32) -> Result<Vec<u8>, CodecError> {
    let depth = BitDepth::try_from(bit_depth)?;
    Ok(pack_samples(samples, depth))
}

/// Packs samples at a known width.
///
/// Each sample is encoded as a 4-byte little-endian word and the excess high
/// bytes are discarded: 16-bit keeps bytes 0..2, 24-bit removes byte 3 from
/// every group. Samples wider than the target are truncated, not clamped.
#[must_use]
pub fn pack_samples(samples: &[i32], depth: BitDepth) -> Vec<u8> {
    let width = depth.bytes_per_sample();
    let mut bytes = Vec::with_capacity(samples.len() * width);
    for sample in samples {
        let word = sample.to_le_bytes();
        bytes.extend_from_slice(&word[..width]);
    }
    bytes
}

/// Decodes a padded 24-bit capture stream.
///
/// The acquisition tool writes every sample as a 4-byte group whose byte 3 is
/// padding. Bytes 0..3 carry a little-endian signed 24-bit value. A trailing
/// partial group is ignored.
#[must_use]
pub fn unpack_padded24(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|group| {
            let widened = i32::from_le_bytes([0, group[0], group[1], group[2]]);
            widened >> 8
        })
        .collect()
}

/// Splits an interleaved stereo sequence into even and odd positions.
#[must_use]
pub fn deinterleave(samples: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let mut even = Vec::with_capacity(samples.len().div_ceil(2));
    let mut odd = Vec::with_capacity(samples.len() / 2);
    for (index, sample) in samples.iter().enumerate() {
        if index % 2 == 0 {
            even.push(*sample);
        } else {
            odd.push(*sample);
        }
    }
    (even, odd)
}
