//! Frame grid: mapping between frame indices, sample offsets, and seconds

use crate::config::HookConfig;
use crate::error::{HookError, Result};

/// Time bookkeeping for a framed waveform
///
/// A frame `i` covers samples `[i * hop_length, i * hop_length + frame_length)`
/// and is stamped with the time of its first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub frame_length: usize,
    pub hop_length: usize,
    pub sample_rate: u32,
}

impl FrameGrid {
    pub fn new(frame_length: usize, hop_length: usize, sample_rate: u32) -> Self {
        Self {
            frame_length,
            hop_length,
            sample_rate,
        }
    }

    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(config.frame_length, config.hop_length, config.sample_rate)
    }

    /// Number of full frames that fit in `num_samples`
    ///
    /// Only full windows count; trailing samples that cannot fill a frame are
    /// dropped so every feature channel sees identical framing.
    pub fn num_frames(&self, num_samples: usize) -> Result<usize> {
        if num_samples < self.frame_length {
            return Err(HookError::InvalidInput(format!(
                "waveform has {} samples, shorter than one frame ({})",
                num_samples, self.frame_length
            )));
        }
        Ok(1 + (num_samples - self.frame_length) / self.hop_length)
    }

    /// Sample offset of a frame's first sample
    pub fn frame_to_sample(&self, frame: usize) -> usize {
        frame * self.hop_length
    }

    /// Time in seconds of a frame's first sample
    pub fn frame_to_time(&self, frame: usize) -> f64 {
        self.frame_to_sample(frame) as f64 / self.sample_rate as f64
    }

    /// Frame index whose start is nearest to `time` seconds
    pub fn time_to_frame(&self, time: f64) -> usize {
        let sample = time * self.sample_rate as f64;
        (sample / self.hop_length as f64).round() as usize
    }

    /// Duration of one hop in seconds
    pub fn hop_duration(&self) -> f64 {
        self.hop_length as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FrameGrid {
        FrameGrid::new(2048, 512, 44100)
    }

    #[test]
    fn test_num_frames() {
        let g = grid();
        assert_eq!(g.num_frames(2048).unwrap(), 1);
        assert_eq!(g.num_frames(2048 + 512).unwrap(), 2);
        assert_eq!(g.num_frames(2048 + 511).unwrap(), 1);
    }

    #[test]
    fn test_too_short_is_invalid_input() {
        let g = grid();
        assert!(matches!(
            g.num_frames(2047),
            Err(HookError::InvalidInput(_))
        ));
        assert!(g.num_frames(0).is_err());
    }

    #[test]
    fn test_frame_time_round_trip() {
        let g = grid();
        for frame in [0usize, 1, 7, 129, 10_000] {
            let t = g.frame_to_time(frame);
            assert_eq!(g.time_to_frame(t), frame);
        }
    }

    #[test]
    fn test_hop_duration() {
        let g = grid();
        assert!((g.hop_duration() - 512.0 / 44100.0).abs() < 1e-12);
    }
}
