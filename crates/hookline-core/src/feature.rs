//! Per-frame audio descriptors on a common hop grid
//!
//! Every channel is computed from the same framing, so values are comparable
//! index-for-index. The magnitude spectrum is computed once per frame (Hann
//! window + FFT) and reused by the spectral channels; frames are independent
//! and processed in parallel, merged back in frame order.

use crate::config::HookConfig;
use crate::error::Result;
use crate::grid::FrameGrid;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Mel bands for the texture descriptor
const N_MELS: usize = 128;

/// Floor for log scaling of mel power
const POWER_FLOOR: f32 = 1e-10;

/// Per-frame scalar descriptors, one value per frame in every channel
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Short-time RMS energy
    pub energy: Vec<f32>,
    /// Spectral centroid in Hz
    pub brightness: Vec<f32>,
    /// Onset strength: positive spectral flux (first frame is zero)
    pub onset: Vec<f32>,
    /// Mean log-scaled mel-band energy
    pub texture: Vec<f32>,
}

impl FeatureSet {
    pub fn num_frames(&self) -> usize {
        self.energy.len()
    }

    /// Channels by name, in fusion order
    pub fn channels(&self) -> [(&'static str, &[f32]); 4] {
        [
            ("energy", &self.energy),
            ("brightness", &self.brightness),
            ("onset", &self.onset),
            ("texture", &self.texture),
        ]
    }
}

/// Feature extractor over a fixed frame grid
pub struct FeatureExtractor {
    grid: FrameGrid,
    window: Vec<f32>,
    mel_filters: Vec<Vec<f32>>,
}

impl FeatureExtractor {
    pub fn new(config: &HookConfig) -> Self {
        let grid = FrameGrid::from_config(config);
        let num_bins = config.frame_length / 2 + 1;
        Self {
            grid,
            window: hann_window(config.frame_length),
            mel_filters: mel_filterbank(config.sample_rate, config.frame_length, num_bins, N_MELS),
        }
    }

    /// Extract all feature channels from a mono waveform
    pub fn extract(&self, samples: &[f32]) -> Result<FeatureSet> {
        let num_frames = self.grid.num_frames(samples.len())?;
        let frame_length = self.grid.frame_length;
        let hop_length = self.grid.hop_length;
        let num_bins = frame_length / 2 + 1;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_length);

        // RMS plus magnitude spectrum per frame; frames are independent,
        // merged deterministically by index.
        let frames: Vec<(f32, Vec<f32>)> = (0..num_frames)
            .into_par_iter()
            .map(|frame_idx| {
                let start = frame_idx * hop_length;
                let frame = &samples[start..start + frame_length];

                let rms = (frame.iter().map(|&s| s * s).sum::<f32>()
                    / frame_length as f32)
                    .sqrt();

                let mut buffer: Vec<Complex<f32>> = frame
                    .iter()
                    .zip(&self.window)
                    .map(|(&s, &w)| Complex::new(s * w, 0.0))
                    .collect();
                fft.process(&mut buffer);

                let magnitudes: Vec<f32> =
                    buffer[..num_bins].iter().map(|c| c.norm()).collect();

                (rms, magnitudes)
            })
            .collect();

        let mut energy = Vec::with_capacity(num_frames);
        let mut brightness = Vec::with_capacity(num_frames);
        let mut onset = Vec::with_capacity(num_frames);
        let mut texture = Vec::with_capacity(num_frames);

        let bin_width = self.grid.sample_rate as f32 / frame_length as f32;

        for (frame_idx, (rms, magnitudes)) in frames.iter().enumerate() {
            energy.push(*rms);
            brightness.push(spectral_centroid(magnitudes, bin_width));

            // Positive spectral flux against the previous frame; the first
            // frame has no predecessor and is zero-padded.
            let flux = if frame_idx == 0 {
                0.0
            } else {
                let prev = &frames[frame_idx - 1].1;
                magnitudes
                    .iter()
                    .zip(prev)
                    .map(|(&m, &p)| (m - p).max(0.0))
                    .sum()
            };
            onset.push(flux);

            texture.push(self.mel_texture(magnitudes));
        }

        Ok(FeatureSet {
            energy,
            brightness,
            onset,
            texture,
        })
    }

    /// Mean log-scaled mel-band energy for one frame
    fn mel_texture(&self, magnitudes: &[f32]) -> f32 {
        let mut sum_db = 0.0;
        for filter in &self.mel_filters {
            let power: f32 = filter
                .iter()
                .zip(magnitudes)
                .map(|(&w, &m)| w * m * m)
                .sum();
            sum_db += 10.0 * power.max(POWER_FLOOR).log10();
        }
        sum_db / self.mel_filters.len() as f32
    }
}

/// Center of mass of the magnitude spectrum, in Hz
fn spectral_centroid(magnitudes: &[f32], bin_width: f32) -> f32 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (bin, &m) in magnitudes.iter().enumerate() {
        weighted += bin as f32 * bin_width * m;
        total += m;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Create Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = i as f32 / (size - 1) as f32;
            0.5 * (1.0 - (2.0 * PI * x).cos())
        })
        .collect()
}

/// Convert frequency to mel scale
fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel to frequency
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank over FFT bins (n_mels x num_bins)
fn mel_filterbank(
    sample_rate: u32,
    frame_length: usize,
    num_bins: usize,
    n_mels: usize,
) -> Vec<Vec<f32>> {
    let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

    // n_mels + 2 equally spaced mel points, converted back to FFT bins
    let bin_points: Vec<usize> = (0..n_mels + 2)
        .map(|i| {
            let mel = mel_max * i as f32 / (n_mels + 1) as f32;
            let hz = mel_to_hz(mel);
            ((frame_length as f32 + 1.0) * hz / sample_rate as f32).floor() as usize
        })
        .collect();

    let mut filters = vec![vec![0.0; num_bins]; n_mels];

    for m in 0..n_mels {
        let left = bin_points[m];
        let center = bin_points[m + 1];
        let right = bin_points[m + 2];

        for k in left..center {
            if k < num_bins {
                filters[m][k] = (k - left) as f32 / (center - left).max(1) as f32;
            }
        }
        for k in center..right {
            if k < num_bins {
                filters[m][k] = (right - k) as f32 / (right - center).max(1) as f32;
            }
        }
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use approx::assert_relative_eq;

    fn tone(freq: f32, amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_hann_window_shape() {
        let window = hann_window(512);
        assert_eq!(window.len(), 512);
        assert!(window[0].abs() < 0.001);
        assert!((window[256] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_channels_share_length() {
        let config = HookConfig::default();
        let samples = tone(440.0, 0.5, config.sample_rate, 2.0);
        let features = FeatureExtractor::new(&config).extract(&samples).unwrap();

        let n = features.num_frames();
        assert!(n > 0);
        for (_, channel) in features.channels() {
            assert_eq!(channel.len(), n);
        }
    }

    #[test]
    fn test_minimal_waveform_is_one_frame() {
        let config = HookConfig::default();
        let samples = vec![0.1; config.frame_length];
        let features = FeatureExtractor::new(&config).extract(&samples).unwrap();
        assert_eq!(features.num_frames(), 1);
        assert_eq!(features.onset[0], 0.0);
    }

    #[test]
    fn test_too_short_waveform_is_rejected() {
        let config = HookConfig::default();
        let samples = vec![0.1; config.frame_length - 1];
        let result = FeatureExtractor::new(&config).extract(&samples);
        assert!(matches!(result, Err(HookError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_waveform_is_rejected() {
        let config = HookConfig::default();
        assert!(FeatureExtractor::new(&config).extract(&[]).is_err());
    }

    #[test]
    fn test_tone_rms_energy() {
        let config = HookConfig::default();
        let samples = tone(440.0, 0.5, config.sample_rate, 1.0);
        let features = FeatureExtractor::new(&config).extract(&samples).unwrap();

        // RMS of a 0.5 amplitude sine is 0.5 / sqrt(2)
        let expected = 0.5 / 2f32.sqrt();
        for &e in &features.energy {
            assert_relative_eq!(e, expected, max_relative = 0.05);
        }
    }

    #[test]
    fn test_tone_centroid_near_frequency() {
        let config = HookConfig::default();
        let samples = tone(1000.0, 0.5, config.sample_rate, 1.0);
        let features = FeatureExtractor::new(&config).extract(&samples).unwrap();

        for &c in &features.brightness {
            assert!((c - 1000.0).abs() < 150.0, "centroid {} too far from 1 kHz", c);
        }
    }

    #[test]
    fn test_silence_has_flat_channels() {
        let config = HookConfig::default();
        let samples = vec![0.0; config.sample_rate as usize];
        let features = FeatureExtractor::new(&config).extract(&samples).unwrap();

        assert!(features.energy.iter().all(|&e| e == 0.0));
        assert!(features.onset.iter().all(|&o| o == 0.0));
        assert!(features.brightness.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let config = HookConfig::default();
        let samples = tone(440.0, 0.5, config.sample_rate, 2.0);
        let extractor = FeatureExtractor::new(&config);

        let a = extractor.extract(&samples).unwrap();
        let b = extractor.extract(&samples).unwrap();
        assert_eq!(a.energy, b.energy);
        assert_eq!(a.brightness, b.brightness);
        assert_eq!(a.onset, b.onset);
        assert_eq!(a.texture, b.texture);
    }
}
