//! WAV packaging for raw PCM takes.

use crate::error::{MockviewError, Result};
use std::io::Cursor;

/// Encode 16-bit mono PCM samples as a WAV file in memory.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;

    Ok(cursor.into_inner())
}

/// Serialize samples as little-endian PCM bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Parse little-endian PCM bytes. A trailing odd byte is dropped.
pub fn le_bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Average interleaved frames down to one channel.
pub fn mix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = (position.floor() as usize).min(samples.len() - 1);
            let fraction = position - index as f64;

            match samples.get(index + 1) {
                Some(&next) => {
                    let current = samples[index] as f64;
                    (current + (next as f64 - current) * fraction) as i16
                }
                None => samples[index],
            }
        })
        .collect()
}

fn wav_error(e: hound::Error) -> MockviewError {
    MockviewError::Audio {
        message: format!("Failed to encode WAV: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_is_readable_by_hound() {
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];

        let wav = encode_wav(&samples, 16000).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();

        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_empty_take_still_produces_a_header() {
        let wav = encode_wav(&[], 16000).unwrap();
        assert!(wav.starts_with(b"RIFF"));
        assert_eq!(wav.len(), 44);
    }

    #[test]
    fn test_mix_to_mono_averages_frames() {
        assert_eq!(mix_to_mono(&[100, 300, -50, 50], 2), vec![200, 0]);
        assert_eq!(mix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_resample_48k_to_16k_keeps_duration() {
        let samples = vec![0i16; 48000];
        assert_eq!(resample(&samples, 48000, 16000).len(), 16000);
    }

    #[test]
    fn test_resample_identity_and_empty() {
        assert_eq!(resample(&[5, 6, 7], 16000, 16000), vec![5, 6, 7]);
        assert!(resample(&[], 44100, 16000).is_empty());
    }

    #[test]
    fn test_le_bytes_drop_trailing_odd_byte() {
        let bytes = samples_to_le_bytes(&[1, -2]);
        assert_eq!(bytes, vec![1, 0, 0xFE, 0xFF]);

        let mut odd = bytes.clone();
        odd.push(7);
        assert_eq!(le_bytes_to_samples(&odd), vec![1, -2]);
    }
}
