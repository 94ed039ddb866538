//! WAV encoding helpers

use std::sync::LazyLock;

use crate::{Error, Result};

/// Sample rate for generated audio (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Length of the fallback silent clip
const SILENCE_MS: u32 = 250;

/// Minimum size of a canonical WAV header
const WAV_HEADER_LEN: usize = 44;

static SILENT_CLIP: LazyLock<Vec<u8>> = LazyLock::new(|| {
    silence(SILENCE_MS, SAMPLE_RATE).expect("in-memory WAV encoding cannot fail")
});

/// Convert f32 samples to 16-bit mono WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Encode `duration_ms` of silence
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn silence(duration_ms: u32, sample_rate: u32) -> Result<Vec<u8>> {
    let count = u64::from(sample_rate) * u64::from(duration_ms) / 1000;
    let samples = vec![0.0; usize::try_from(count).unwrap_or_default()];
    samples_to_wav(&samples, sample_rate)
}

/// Pre-baked silent clip returned when synthesis fails
#[must_use]
pub fn silent_clip() -> &'static [u8] {
    &SILENT_CLIP
}

/// Whether `bytes` start with a RIFF/WAVE header
#[must_use]
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= WAV_HEADER_LEN && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_clip_is_playable() {
        let clip = silent_clip();
        assert!(is_wav(clip));

        let reader = hound::WavReader::new(std::io::Cursor::new(clip)).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), SAMPLE_RATE * SILENCE_MS / 1000);
    }

    #[test]
    fn test_is_wav_rejects_garbage() {
        assert!(!is_wav(b""));
        assert!(!is_wav(&[0u8; 44]));
        assert!(!is_wav(b"ID3\x04 this is an mp3 not a wav at all......"));
    }

    #[test]
    fn test_samples_to_wav_header() {
        let wav = samples_to_wav(&[0.0, 0.5, -0.5, 1.0], SAMPLE_RATE).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > 44);
    }
}
