//! Sample-domain codec for the tonewire signal board.
//!
//! The crate synthesises periodic and constant waveforms as signed integer
//! sample sequences and packs them into little-endian PCM frames at 16, 24 or
//! 32 bits per sample. It also decodes the padded 24-bit capture files written
//! by the acquisition executable.
//!
//! Two behaviours are deliberately exact and covered by tests:
//!
//! - Periodic shapes are truncated to a whole number of cycles: the frame count
//!   is `floor(rate / f) * floor(duration * f)`, so the requested duration is
//!   rounded down rather than padded with a partial cycle.
//! - 24-bit packing encodes each sample as a 32-bit little-endian integer and
//!   then deletes the most significant byte of every 4-byte group. Values must
//!   already fit in 24 bits; anything wider silently loses the dropped byte.
//!
//! Long requests can be rendered incrementally with
//! [`WaveformRequest::chunks`], which yields the same bytes as
//! [`WaveformRequest::render`] a bounded number of frames at a time.
//!
//! ```
//! use tonewire_pcm::{WaveShape, pack, synthesize};
//!
//! let samples = synthesize(WaveShape::Square, 1_000.0, 0.002, 100.0, 8_000, 2)?;
//! assert_eq!(samples.len(), 8 * 2 * 2);
//! let bytes = pack(&samples, 16)?;
//! assert_eq!(bytes.len(), samples.len() * 2);
//! # Ok::<(), tonewire_pcm::CodecError>(())
//! ```

mod analysis;
mod depth;
mod error;
mod pack;
mod request;
mod shape;
mod synth;

pub use analysis::snr_db;
pub use depth::BitDepth;
pub use error::CodecError;
pub use pack::{deinterleave, pack, pack_samples, unpack_padded24};
pub use request::{PcmChunks, WaveformRequest, apply_offset};
pub use shape::WaveShape;
pub use synth::{frame_count, synthesize};
