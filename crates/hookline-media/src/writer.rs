//! Writing detected segments back out as WAV files

use crate::audio::MonoAudio;
use anyhow::{Context, Result};
use std::path::Path;

/// Write a mono waveform as 16-bit PCM WAV
pub fn write_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for &sample in samples {
        let v = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
    }
    writer
        .finalize()
        .with_context(|| format!("cannot finalize {}", path.display()))?;

    Ok(())
}

/// Cut `[start, start + duration)` seconds out of `audio` and write it as WAV
///
/// The window is clamped to the waveform, so a hook whose duration floor
/// reaches past the end of the song still produces a valid (shorter) clip.
pub fn write_segment(audio: &MonoAudio, start: f64, duration: f64, path: &Path) -> Result<()> {
    let start_sample = (start * audio.sample_rate as f64) as usize;
    let len = (duration * audio.sample_rate as f64) as usize;

    if start_sample >= audio.samples.len() {
        anyhow::bail!(
            "segment start {:.2}s is past the end of the audio ({:.2}s)",
            start,
            audio.duration_secs()
        );
    }

    let end_sample = (start_sample + len).min(audio.samples.len());
    write_wav(
        &audio.samples[start_sample..end_sample],
        audio.sample_rate,
        path,
    )
}
