//! Best-effort conversion of captured audio to the upload format
//!
//! WAV in, 16 kHz mono FLAC out. Callers fall back to the original clip on
//! any error.

use std::io::Cursor;

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use hound::{SampleFormat, WavReader};
use rubato::{FftFixedIn, Resampler};
use thiserror::Error;
use tracing::debug;

use crate::domain::transcription::{AudioClip, AudioMimeType};
use crate::infrastructure::recording::pcm::{downmix_to_mono, f32_to_i16, int_to_i16};

/// Speech-optimized sample rate
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const BITS_PER_SAMPLE: usize = 16;
const RESAMPLER_CHUNK: usize = 1024;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unsupported input format: {0}")]
    Unsupported(String),

    #[error("Failed to decode WAV: {0}")]
    Decode(#[from] hound::Error),

    #[error("Clip contains no samples")]
    NoSamples,

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),
}

/// Decode, downmix, resample and FLAC-encode a WAV clip.
pub fn to_canonical(clip: &AudioClip) -> Result<AudioClip, TranscodeError> {
    if clip.mime_type() != AudioMimeType::Wav {
        return Err(TranscodeError::Unsupported(clip.mime_type().to_string()));
    }

    let (samples, sample_rate, channels) = decode_wav(clip.data())?;
    let mono = downmix_to_mono(&samples, channels);
    if mono.is_empty() {
        return Err(TranscodeError::NoSamples);
    }

    let resampled = resample(&mono, sample_rate)?;
    let flac = encode_flac(&resampled)?;
    Ok(AudioClip::new(flac, AudioMimeType::Flac))
}

/// [`to_canonical`], or the untouched clip if anything goes wrong
pub fn prepare_upload(clip: AudioClip) -> AudioClip {
    match to_canonical(&clip) {
        Ok(converted) => {
            debug!(
                original = clip.size_bytes(),
                converted = converted.size_bytes(),
                "Transcoded clip to FLAC"
            );
            converted
        }
        Err(e) => {
            debug!(error = %e, "Uploading original clip");
            clip
        }
    }
}

fn decode_wav(bytes: &[u8]) -> Result<(Vec<i16>, u32, u16), TranscodeError> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits) if bits <= 32 => reader
            .samples::<i32>()
            .map(|s| s.map(|v| int_to_i16(v, bits)))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(f32_to_i16))
            .collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(TranscodeError::Unsupported(format!(
                "{:?} {}-bit WAV",
                format, bits
            )))
        }
    };

    Ok((samples, spec.sample_rate, spec.channels))
}

fn resample(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, TranscodeError> {
    if source_rate == TARGET_SAMPLE_RATE {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 {
        return Err(TranscodeError::Resample("source sample rate is 0".into()));
    }

    let input: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    let expected_len =
        (input.len() as f64 * TARGET_SAMPLE_RATE as f64 / source_rate as f64).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        RESAMPLER_CHUNK,
        2,
        1,
    )
    .map_err(|e| TranscodeError::Resample(e.to_string()))?;

    let mut output = Vec::with_capacity(expected_len);
    let mut pos = 0;
    while pos < input.len() {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(input.len());
        let mut chunk = input[pos..end].to_vec();
        chunk.resize(needed, 0.0);

        let frames = resampler
            .process(&[chunk], None)
            .map_err(|e| TranscodeError::Resample(e.to_string()))?;
        output.extend(frames[0].iter().map(|&s| f32_to_i16(s)));
        pos = end;
    }

    output.truncate(expected_len);
    Ok(output)
}

fn encode_flac(samples: &[i16]) -> Result<Vec<u8>, TranscodeError> {
    let widened: Vec<i32> = samples.iter().map(|&s| s as i32).collect();

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| TranscodeError::Encode(format!("{:?}", e)))?;
    let source = MemSource::from_samples(&widened, 1, BITS_PER_SAMPLE, TARGET_SAMPLE_RATE as usize);

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| TranscodeError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| TranscodeError::Encode(e.to_string()))?;
    Ok(sink.into_inner())
}
