//! PCM helpers shared by capture and transcoding

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Average interleaved frames down to one channel
pub fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Rescale an integer sample of `bits` width to 16 bits
pub fn int_to_i16(sample: i32, bits: u16) -> i16 {
    match bits {
        16 => sample as i16,
        b if b > 16 => (sample >> (b - 16)) as i16,
        b => (sample << (16 - b)) as i16,
    }
}

/// Wrap mono 16-bit samples in a WAV container
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
