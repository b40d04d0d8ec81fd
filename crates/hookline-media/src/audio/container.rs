//! Audio track extraction from media containers using Symphonia

use super::decoder::RawAudio;
use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Demux a container file and decode its first audio track
pub(crate) fn extract_audio_track(path: &Path) -> Result<RawAudio> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open media file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions {
        enable_gapless: true,
        prebuild_seek_index: false,
        seek_index_fill_rate: 20,
    };

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .with_context(|| format!("failed to probe media file: {}", path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow::anyhow!("no audio track in {}", path.display()))?;

    let track_id = track.id;
    let codec_params = &track.codec_params;
    let sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;

    let mut decoder = symphonia::default::get_codecs()
        .make(codec_params, &DecoderOptions::default())
        .context("failed to create audio decoder")?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => anyhow::bail!("error reading packet from {}: {}", path.display(), e),
        };

        if packet.track_id() != track_id {
            continue;
        }

        // Skip corrupted packets, keep whatever decodes.
        let Ok(decoded) = decoder.decode(&packet) else {
            continue;
        };

        append_interleaved(&decoded, &mut samples)?;
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Interleave one decoded buffer onto the sample vector as f32
fn append_interleaved(decoded: &AudioBufferRef, samples: &mut Vec<f32>) -> Result<()> {
    match decoded {
        AudioBufferRef::F32(buf) => {
            for frame_idx in 0..buf.frames() {
                for ch in 0..buf.spec().channels.count() {
                    samples.push(buf.chan(ch)[frame_idx]);
                }
            }
        }
        AudioBufferRef::F64(buf) => {
            for frame_idx in 0..buf.frames() {
                for ch in 0..buf.spec().channels.count() {
                    samples.push(buf.chan(ch)[frame_idx] as f32);
                }
            }
        }
        AudioBufferRef::S32(buf) => {
            for frame_idx in 0..buf.frames() {
                for ch in 0..buf.spec().channels.count() {
                    samples.push(buf.chan(ch)[frame_idx] as f32 / i32::MAX as f32);
                }
            }
        }
        AudioBufferRef::S16(buf) => {
            for frame_idx in 0..buf.frames() {
                for ch in 0..buf.spec().channels.count() {
                    samples.push(buf.chan(ch)[frame_idx] as f32 / i16::MAX as f32);
                }
            }
        }
        AudioBufferRef::U8(buf) => {
            for frame_idx in 0..buf.frames() {
                for ch in 0..buf.spec().channels.count() {
                    samples.push((buf.chan(ch)[frame_idx] as f32 - 128.0) / 128.0);
                }
            }
        }
        _ => anyhow::bail!("unsupported audio buffer format"),
    }
    Ok(())
}
