//! Fusion of feature channels into a single per-frame curve
//!
//! Two strategies share one pipeline: salience (min-max normalized weighted
//! sum) and novelty (standardized frame-to-frame change). Either way the
//! result has one value per frame, in [0, 1].

use crate::config::{FeatureWeights, FusionMode, HookConfig};
use crate::feature::FeatureSet;

/// Guard against division by zero on constant channels
const EPS: f32 = 1e-6;

/// Median filter width for the novelty curve (frames)
const MEDIAN_WINDOW: usize = 11;

/// Builds one normalized curve out of a [`FeatureSet`]
pub struct NoveltyCurveBuilder {
    weights: FeatureWeights,
    fusion: FusionMode,
}

impl NoveltyCurveBuilder {
    pub fn new(config: &HookConfig) -> Self {
        Self {
            weights: config.weights,
            fusion: config.fusion,
        }
    }

    /// Fuse all channels into one curve, one value per frame
    pub fn build(&self, features: &FeatureSet) -> Vec<f32> {
        match self.fusion {
            FusionMode::Salience => self.build_salience(features),
            FusionMode::Novelty => self.build_novelty(features),
        }
    }

    /// Min-max normalize each channel independently, then weighted sum
    fn build_salience(&self, features: &FeatureSet) -> Vec<f32> {
        let n = features.num_frames();
        let mut curve = vec![0.0f32; n];

        for (name, channel) in features.channels() {
            let weight = self.weights_for(name);
            if weight == 0.0 {
                continue;
            }
            let Some((min, range)) = channel_range(channel) else {
                log::debug!("channel {} has zero variance, contributing nothing", name);
                continue;
            };
            for (out, &x) in curve.iter_mut().zip(channel) {
                *out += weight * (x - min) / range;
            }
        }

        // Weighted sum of [0,1] channels stays in [0,1] only when the
        // weights sum to 1; rescale by the total otherwise.
        let total = self.weights.total();
        if (total - 1.0).abs() > EPS && total > 0.0 {
            for v in &mut curve {
                *v /= total;
            }
        }

        curve
    }

    /// Difference each channel along time, standardize, average, smooth
    fn build_novelty(&self, features: &FeatureSet) -> Vec<f32> {
        let n = features.num_frames();
        let mut curve = vec![0.0f32; n];
        let channels = features.channels();

        for (name, channel) in channels {
            // Leading zero pad keeps the diffed channel aligned with the grid.
            let mut diffed = vec![0.0f32; n];
            for i in 1..n {
                let d = channel[i] - channel[i - 1];
                // Texture change is direction-less, only its magnitude counts.
                diffed[i] = if name == "texture" { d * d } else { d };
            }

            let Some(standardized) = standardize(&diffed) else {
                log::debug!("channel {} has zero variance, contributing nothing", name);
                continue;
            };
            for (out, v) in curve.iter_mut().zip(standardized) {
                *out += v;
            }
        }

        let count = channels.len() as f32;
        for v in &mut curve {
            *v /= count;
        }

        let smoothed = median_filter(&curve, MEDIAN_WINDOW);

        // Standardized values are not probabilities; stretch the final curve
        // to [0, 1] so downstream confidence keeps its meaning.
        match channel_range(&smoothed) {
            Some((min, range)) => smoothed.iter().map(|&v| (v - min) / range).collect(),
            None => vec![0.0; n],
        }
    }

    fn weights_for(&self, name: &str) -> f32 {
        match name {
            "energy" => self.weights.energy,
            "brightness" => self.weights.brightness,
            "onset" => self.weights.onset,
            "texture" => self.weights.texture,
            _ => 0.0,
        }
    }
}

/// (min, max - min + eps) of a channel, or None when it is constant
fn channel_range(channel: &[f32]) -> Option<(f32, f32)> {
    let min = channel.iter().copied().fold(f32::INFINITY, f32::min);
    let max = channel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !min.is_finite() || max - min <= EPS {
        return None;
    }
    Some((min, max - min + EPS))
}

/// Zero-mean unit-variance scaling, or None for a constant sequence
fn standardize(values: &[f32]) -> Option<Vec<f32>> {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();
    if std <= EPS {
        return None;
    }
    Some(values.iter().map(|&v| (v - mean) / std).collect())
}

/// Sliding median with an odd window, edges handled by shrinking the window
fn median_filter(values: &[f32], window: usize) -> Vec<f32> {
    let half = window / 2;
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    let mut scratch = Vec::with_capacity(window);

    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);
        scratch.clear();
        scratch.extend_from_slice(&values[start..end]);
        scratch.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        out.push(scratch[scratch.len() / 2]);
    }

    out
}
