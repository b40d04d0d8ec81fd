//! Decoding of audio files into a mono analysis waveform

use super::{container, resample_linear, AudioFormat};
use anyhow::{Context, Result};
use std::path::Path;

/// A decoded, mono waveform ready for analysis
#[derive(Debug, Clone)]
pub struct MonoAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl MonoAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Interleaved multi-channel audio as it comes out of a decoder
#[derive(Debug, Clone)]
pub(crate) struct RawAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RawAudio {
    /// Fold down to mono by averaging channels
    pub(crate) fn into_mono(self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples;
        }
        let channels = self.channels as usize;
        self.samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }
}

/// Decode an audio file to mono at `target_rate` Hz
pub fn decode_to_mono(path: &Path, target_rate: u32) -> Result<MonoAudio> {
    if !path.exists() {
        anyhow::bail!("audio file not found: {}", path.display());
    }

    let format = AudioFormat::from_path(path);
    let raw = match format {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        // Containers, plus anything unrecognized: let Symphonia probe it.
        _ => container::extract_audio_track(path)?,
    };

    let source_rate = raw.sample_rate;
    let mono = raw.into_mono();

    let samples = if source_rate != target_rate {
        log::debug!(
            "resampling {} from {} Hz to {} Hz",
            path.display(),
            source_rate,
            target_rate
        );
        resample_linear(&mono, source_rate, target_rate)
    } else {
        mono
    };

    Ok(MonoAudio {
        samples,
        sample_rate: target_rate,
    })
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<RawAudio> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => {
            reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?
        }
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(RawAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<RawAudio> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read MP3 file: {}", path.display()))?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                for &sample in &frame.data {
                    samples.push(sample as f32 / 32768.0);
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => anyhow::bail!("MP3 decode error in {}: {}", path.display(), e),
        }
    }

    if sample_rate == 0 {
        anyhow::bail!("no decodable MP3 frames in {}", path.display());
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<RawAudio> {
    let mut reader = claxon::FlacReader::open(path)
        .with_context(|| format!("failed to open FLAC file: {}", path.display()))?;

    let info = reader.streaminfo();
    let sample_rate = info.sample_rate;
    let channels = info.channels as u16;

    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;
    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<RawAudio> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open OGG file: {}", path.display()))?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;
    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        for &sample in &packet {
            samples.push(sample as f32 / 32768.0);
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stereo_fold_down_averages_channels() {
        let raw = RawAudio {
            samples: vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0],
            sample_rate: 44100,
            channels: 2,
        };
        let mono = raw.into_mono();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mono_passthrough() {
        let raw = RawAudio {
            samples: vec![0.1, 0.2, 0.3],
            sample_rate: 44100,
            channels: 1,
        };
        assert_eq!(raw.into_mono(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = decode_to_mono(Path::new("/nonexistent/nothing.wav"), 44100);
        assert!(result.is_err());
    }

    #[test]
    fn test_wav_round_trip_with_resample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..22050 {
            let v = (0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin()
                * i16::MAX as f32) as i16;
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let audio = decode_to_mono(&path, 44100).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_relative_eq!(audio.duration_secs(), 1.0, max_relative = 0.01);
    }
}
