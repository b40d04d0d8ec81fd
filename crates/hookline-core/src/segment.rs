//! Expansion of curve peaks into time-bounded hook segments

use crate::config::HookConfig;
use crate::grid::FrameGrid;
use crate::peaks::Peak;
use serde::{Deserialize, Serialize};

/// A detected hook: a ranked, time-bounded segment of the song
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    /// Segment start in seconds from the beginning of the waveform
    pub start_time: f64,
    /// Segment length in seconds, within the configured duration bounds
    pub duration: f64,
    /// Curve value at the originating peak, in [0, 1]
    pub confidence: f32,
}

/// Grows a window forward from each peak until the curve decays
pub struct SegmentExpander {
    grid: FrameGrid,
    min_duration: f64,
    max_duration: f64,
    decay_factor: f32,
}

impl SegmentExpander {
    pub fn new(config: &HookConfig) -> Self {
        Self {
            grid: FrameGrid::from_config(config),
            min_duration: config.min_duration,
            max_duration: config.max_duration,
            decay_factor: config.decay_factor,
        }
    }

    /// Expand one peak into a hook
    ///
    /// Walks forward frame by frame while the curve stays above
    /// `peak_value * decay_factor` and the elapsed time stays under
    /// `max_duration`; the resulting duration is clamped into
    /// `[min_duration, max_duration]` regardless of where the walk stopped.
    pub fn expand(&self, peak: &Peak, curve: &[f32]) -> Hook {
        let start_time = self.grid.frame_to_time(peak.frame);
        let floor = peak.value * self.decay_factor;

        let mut frame = peak.frame;
        let mut elapsed = 0.0;

        while frame + 1 < curve.len() {
            let next_elapsed = self.grid.frame_to_time(frame + 1) - start_time;
            if next_elapsed > self.max_duration || curve[frame + 1] < floor {
                break;
            }
            frame += 1;
            elapsed = next_elapsed;
        }

        Hook {
            start_time,
            duration: elapsed.clamp(self.min_duration, self.max_duration),
            confidence: peak.value.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn expander() -> SegmentExpander {
        SegmentExpander::new(&HookConfig::default())
    }

    fn frames_per_second() -> f64 {
        44100.0 / 512.0
    }

    #[test]
    fn test_early_decay_floors_at_min_duration() {
        // Curve collapses right after the peak.
        let mut curve = vec![0.05; 2000];
        curve[100] = 0.9;
        let hook = expander().expand(&Peak { frame: 100, value: 0.9 }, &curve);

        assert_relative_eq!(hook.duration, 5.0);
        assert_relative_eq!(hook.start_time, 100.0 * 512.0 / 44100.0);
        assert!((hook.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_sustained_curve_caps_at_max_duration() {
        // Curve never decays: expansion stops at max_duration.
        let curve = vec![0.9; 3000];
        let hook = expander().expand(&Peak { frame: 0, value: 0.9 }, &curve);

        assert!(hook.duration <= 15.0);
        assert!(hook.duration > 15.0 - 2.0 / frames_per_second());
    }

    #[test]
    fn test_decay_between_bounds_sets_duration() {
        // Curve holds above the decay floor for ~8 seconds after the peak.
        let hold_frames = (8.0 * frames_per_second()) as usize;
        let mut curve = vec![0.05; 3000];
        for v in curve.iter_mut().skip(200).take(hold_frames) {
            *v = 0.8;
        }
        let hook = expander().expand(&Peak { frame: 200, value: 0.8 }, &curve);

        assert!(hook.duration >= 5.0 && hook.duration <= 15.0);
        assert_relative_eq!(hook.duration, 8.0, max_relative = 0.01);
    }

    #[test]
    fn test_peak_at_curve_end() {
        let mut curve = vec![0.05; 500];
        curve[499] = 0.9;
        let hook = expander().expand(&Peak { frame: 499, value: 0.9 }, &curve);
        assert_relative_eq!(hook.duration, 5.0);
    }
}
