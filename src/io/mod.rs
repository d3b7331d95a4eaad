//! Decoded audio shared by decoding, recording and rendering.
//!
//! Everything that enters analysis or leaves the synthesizer is an
//! [`AudioBuffer`]: planar `f32` channels at a sample rate. Buffers are
//! validated once on construction and never change afterwards.

use std::io::Read;

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn from_mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self, DecodeError> {
        Self::from_planar(sample_rate, vec![samples])
    }

    /// One `Vec` per channel, all the same length.
    pub fn from_planar(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::InvalidSampleRate(sample_rate));
        }
        let expected = channels.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(DecodeError::Empty);
        }
        for (channel, samples) in channels.iter().enumerate() {
            if samples.len() != expected {
                return Err(DecodeError::ChannelMismatch {
                    channel,
                    expected,
                    got: samples.len(),
                });
            }
            if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
                return Err(DecodeError::NonFinite { index });
            }
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Frames of `channel_count` samples, one after another.
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: usize,
        samples: &[f32],
    ) -> Result<Self, DecodeError> {
        if channel_count == 0 || samples.len() % channel_count != 0 {
            return Err(DecodeError::Interleave {
                len: samples.len(),
                channels: channel_count,
            });
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::from_planar(sample_rate, channels)
    }

    /// Renderer output: the length and sample rate are already known good.
    pub(crate) fn from_rendered(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Every sample of every channel.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.channels.iter().flatten().copied()
    }

    /// Average of all channels.
    pub fn mixdown(&self) -> Vec<f32> {
        let count = self.channels.len().max(1) as f32;
        (0..self.len())
            .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / count)
            .collect()
    }
}

/// Decode a WAV stream (integer PCM or float) into an `AudioBuffer`.
pub fn decode_wav<R: Read>(reader: R) -> Result<AudioBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    log::debug!(
        "decoded wav: {} Hz, {} channels, {} samples",
        spec.sample_rate,
        spec.channels,
        samples.len()
    );
    AudioBuffer::from_interleaved(spec.sample_rate, spec.channels as usize, &samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(
        spec: hound::WavSpec,
        write: impl FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>),
    ) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn interleaved_samples_split_into_channels() {
        let buffer = AudioBuffer::from_interleaved(8_000, 2, &[0.1, -0.1, 0.2, -0.2]).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.channel(0), Some(&[0.1, 0.2][..]));
        assert_eq!(buffer.channel(1), Some(&[-0.1, -0.2][..]));
        assert_eq!(buffer.mixdown(), vec![0.0, 0.0]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            AudioBuffer::from_mono(44_100, Vec::new()),
            Err(DecodeError::Empty)
        ));
        assert!(matches!(
            AudioBuffer::from_mono(0, vec![0.0]),
            Err(DecodeError::InvalidSampleRate(0))
        ));
        assert!(matches!(
            AudioBuffer::from_planar(44_100, vec![vec![0.0; 4], vec![0.0; 3]]),
            Err(DecodeError::ChannelMismatch { channel: 1, .. })
        ));
        assert!(matches!(
            AudioBuffer::from_mono(44_100, vec![0.0, f32::NAN]),
            Err(DecodeError::NonFinite { index: 1 })
        ));
        assert!(matches!(
            AudioBuffer::from_interleaved(44_100, 2, &[0.0; 3]),
            Err(DecodeError::Interleave { .. })
        ));
    }

    #[test]
    fn decodes_integer_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0i16, 16_384, -32_768] {
                w.write_sample(s).unwrap();
            }
        });
        let buffer = decode_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(buffer.channel(0), Some(&[0.0, 0.5, -1.0][..]));
    }

    #[test]
    fn decodes_float_stereo_wav() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0.25f32, -0.25, 0.5, -0.5] {
                w.write_sample(s).unwrap();
            }
        });
        let buffer = decode_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.channel(1), Some(&[-0.25, -0.5][..]));
        assert!((buffer.duration() - 2.0 / 48_000.0).abs() < 1e-12);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_wav(Cursor::new(b"not a wav file".to_vec())),
            Err(DecodeError::Wav(_))
        ));
    }

    #[test]
    fn empty_wav_is_empty() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |_| {});
        assert!(matches!(decode_wav(Cursor::new(bytes)), Err(DecodeError::Empty)));
    }
}
