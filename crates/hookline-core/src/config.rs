//! Configuration parameters for hook detection
//!
//! All knobs of the pipeline live here as named, validated fields. Defaults
//! follow the reference parameter set (2048/512 framing at 44.1 kHz,
//! energy-weighted salience fusion, top 3 hooks).

use crate::error::{HookError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration with validated defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    // Audio framing
    pub sample_rate: u32,
    pub frame_length: usize,
    pub hop_length: usize,

    // Curve fusion
    pub weights: FeatureWeights,
    pub fusion: FusionMode,

    // Peak picking
    pub peak: PeakParams,

    // Segment expansion
    pub min_duration: f64,
    pub max_duration: f64,
    pub decay_factor: f32,

    // Ranking
    pub top_k: usize,
}

/// Per-channel fusion weights (non-negative, ideally summing to 1.0)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub energy: f32,
    pub brightness: f32,
    pub onset: f32,
    pub texture: f32,
}

/// How feature channels are normalized and combined into one curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    /// Min-max normalize each channel, weighted sum ("how notable").
    Salience,
    /// Frame-to-frame differences, standardized and averaged ("how much changed").
    Novelty,
}

/// Windowed peak-picking parameters (frame counts except `delta`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    pub pre_max: usize,
    pub post_max: usize,
    pub pre_avg: usize,
    pub post_avg: usize,
    pub delta: f32,
    pub wait: usize,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frame_length: 2048,
            hop_length: 512,
            weights: FeatureWeights::default(),
            fusion: FusionMode::Salience,
            peak: PeakParams::default(),
            min_duration: 5.0,
            max_duration: 15.0,
            decay_factor: 0.5,
            top_k: 3,
        }
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            energy: 0.4,
            brightness: 0.2,
            onset: 0.2,
            texture: 0.2,
        }
    }
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            pre_max: 20,
            post_max: 20,
            pre_avg: 20,
            post_avg: 20,
            delta: 0.3,
            wait: 10,
        }
    }
}

impl FeatureWeights {
    /// Sum of all channel weights
    pub fn total(&self) -> f32 {
        self.energy + self.brightness + self.onset + self.texture
    }
}

impl HookConfig {
    /// Validate configuration parameters
    ///
    /// Out-of-range values are rejected here so the pipeline never has to
    /// check them mid-computation.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(HookError::InvalidConfig("sample_rate must be > 0".into()));
        }
        if self.hop_length == 0 {
            return Err(HookError::InvalidConfig("hop_length must be > 0".into()));
        }
        if self.frame_length < self.hop_length {
            return Err(HookError::InvalidConfig(
                "frame_length must be >= hop_length".into(),
            ));
        }
        let w = &self.weights;
        if w.energy < 0.0 || w.brightness < 0.0 || w.onset < 0.0 || w.texture < 0.0 {
            return Err(HookError::InvalidConfig(
                "feature weights must be non-negative".into(),
            ));
        }
        if w.total() <= 0.0 {
            return Err(HookError::InvalidConfig(
                "at least one feature weight must be positive".into(),
            ));
        }
        if self.peak.delta < 0.0 {
            return Err(HookError::InvalidConfig("peak delta must be >= 0".into()));
        }
        if self.min_duration < 0.0 || self.min_duration > self.max_duration {
            return Err(HookError::InvalidConfig(format!(
                "duration bounds out of order: min {} > max {}",
                self.min_duration, self.max_duration
            )));
        }
        if self.decay_factor <= 0.0 || self.decay_factor > 1.0 {
            return Err(HookError::InvalidConfig(
                "decay_factor must be in (0, 1]".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(HookError::InvalidConfig("top_k must be > 0".into()));
        }
        Ok(())
    }

    /// Load and validate configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HookError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: HookConfig = toml::from_str(&text).map_err(|e| {
            HookError::InvalidConfig(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = HookConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weights.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_zero_hop() {
        let config = HookConfig {
            hop_length: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HookError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_frame_shorter_than_hop() {
        let config = HookConfig {
            frame_length: 256,
            hop_length: 512,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = HookConfig::default();
        config.weights.onset = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_durations() {
        let config = HookConfig {
            min_duration: 20.0,
            max_duration: 15.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_decay_out_of_range() {
        let config = HookConfig {
            decay_factor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parses_partial_toml() {
        let config: HookConfig = toml::from_str(
            r#"
            top_k = 5
            [weights]
            energy = 0.7
            "#,
        )
        .unwrap();
        assert_eq!(config.top_k, 5);
        assert!((config.weights.energy - 0.7).abs() < 1e-6);
        // Unspecified fields keep their defaults
        assert_eq!(config.frame_length, 2048);
    }
}
