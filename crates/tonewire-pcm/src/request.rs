//! Validated playback requests.

use crate::synth::sample_at;
use crate::{BitDepth, CodecError, WaveShape, pack_samples, synthesize};

/// Everything needed to render one playback buffer.
///
/// `amplitude` and `offset` are in sample counts, not volts.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformRequest {
    /// Waveform shape.
    pub shape: WaveShape,
    /// Frequency in hertz. Ignored for [`WaveShape::Constant`].
    pub frequency_hz: f64,
    /// Requested duration in seconds.
    pub duration_s: f64,
    /// Peak amplitude in counts.
    pub amplitude: f64,
    /// DC offset in counts added after synthesis.
    pub offset: i64,
    /// Output sample rate.
    pub sample_rate_hz: u32,
    /// Number of interleaved channels.
    pub channel_count: u16,
    /// Packed sample width.
    pub bit_depth: BitDepth,
}

impl WaveformRequest {
    /// Checks the request without rendering it.
    ///
    /// # Errors
    ///
    /// Returns the first [`CodecError`] the request would raise.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.channel_count == 0 {
            return Err(CodecError::NoChannels);
        }
        let max = self.bit_depth.full_scale();
        if self.amplitude.is_nan() || self.amplitude.abs() > max as f64 {
            return Err(CodecError::AmplitudeOutOfRange {
                amplitude: self.amplitude,
                max,
            });
        }
        crate::frame_count(
            self.shape,
            self.frequency_hz,
            self.duration_s,
            self.sample_rate_hz,
        )
        .map(|_| ())
    }

    /// Synthesises, offsets and packs the request.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when validation fails.
    pub fn render(&self) -> Result<Vec<u8>, CodecError> {
        self.validate()?;
        let mut samples = synthesize(
            self.shape,
            self.frequency_hz,
            self.duration_s,
            self.amplitude,
            self.sample_rate_hz,
            self.channel_count,
        )?;
        apply_offset(&mut samples, self.offset, self.bit_depth);
        Ok(pack_samples(&samples, self.bit_depth))
    }

    /// Renders the request lazily, at most `frames_per_chunk` frames per item.
    ///
    /// Concatenating the chunks yields the same bytes as [`Self::render`],
    /// but only one chunk is held in memory at a time. A `frames_per_chunk`
    /// of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when validation fails.
    pub fn chunks(&self, frames_per_chunk: usize) -> Result<PcmChunks, CodecError> {
        self.validate()?;
        let total_frames = crate::frame_count(
            self.shape,
            self.frequency_hz,
            self.duration_s,
            self.sample_rate_hz,
        )?;
        Ok(PcmChunks {
            request: self.clone(),
            frames_per_chunk: frames_per_chunk.max(1),
            next_frame: 0,
            total_frames,
        })
    }
}

/// Iterator over packed PCM chunks of a validated [`WaveformRequest`].
#[derive(Debug, Clone)]
pub struct PcmChunks {
    request: WaveformRequest,
    frames_per_chunk: usize,
    next_frame: usize,
    total_frames: usize,
}

impl PcmChunks {
    /// Frames the whole request produces.
    #[must_use]
    pub const fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Frames not yet yielded.
    #[must_use]
    pub const fn remaining_frames(&self) -> usize {
        self.total_frames - self.next_frame
    }
}

impl Iterator for PcmChunks {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_frame >= self.total_frames {
            return None;
        }
        let end = self
            .next_frame
            .saturating_add(self.frames_per_chunk)
            .min(self.total_frames);
        let request = &self.request;
        let channels = usize::from(request.channel_count);

        let mut samples = Vec::with_capacity((end - self.next_frame) * channels);
        for index in self.next_frame..end {
            let value = sample_at(
                request.shape,
                request.frequency_hz,
                request.amplitude,
                request.sample_rate_hz,
                index,
            );
            samples.extend(std::iter::repeat_n(value, channels));
        }
        self.next_frame = end;
        apply_offset(&mut samples, request.offset, request.bit_depth);
        Some(pack_samples(&samples, request.bit_depth))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining_frames().div_ceil(self.frames_per_chunk);
        (chunks, Some(chunks))
    }
}

/// Adds `offset` to every sample, saturating at the limits of `depth`.
pub fn apply_offset(samples: &mut [i32], offset: i64, depth: BitDepth) {
    if offset == 0 {
        return;
    }
    let (low, high) = (depth.min_sample(), depth.full_scale());
    for sample in samples.iter_mut() {
        let shifted = (i64::from(*sample) + offset).clamp(low, high);
        *sample = shifted as i32;
    }
}
