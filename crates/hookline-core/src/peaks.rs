//! Peak detection over the fused curve
//!
//! The canonical picker is a windowed local-maximum search with a margin
//! above the local average and a minimum spacing, so one musical swell
//! produces one peak instead of a cluster. A simpler percentile-threshold
//! strategy is kept as a secondary mode for whole-song span estimates.

use crate::config::PeakParams;

/// A locally dominant frame on the curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub frame: usize,
    pub value: f32,
}

/// A group of nearby threshold peaks, as inclusive frame bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub start: usize,
    pub end: usize,
}

/// Windowed local-maxima picker
pub struct PeakPicker {
    params: PeakParams,
}

impl PeakPicker {
    pub fn new(params: PeakParams) -> Self {
        Self { params }
    }

    /// Find peaks ordered by frame index
    ///
    /// A frame qualifies iff it is the maximum of
    /// `[i - pre_max, i + post_max]`, exceeds the mean of
    /// `[i - pre_avg, i + post_avg]` by at least `delta`, and lies at least
    /// `wait` frames after the previously accepted peak. An empty result is
    /// a valid outcome, not an error.
    pub fn pick(&self, curve: &[f32]) -> Vec<Peak> {
        let n = curve.len();
        let p = &self.params;
        let mut peaks = Vec::new();
        let mut last_accepted: Option<usize> = None;

        for i in 0..n {
            let value = curve[i];

            if let Some(last) = last_accepted {
                if i - last < p.wait {
                    continue;
                }
            }

            let max_window = &curve[i.saturating_sub(p.pre_max)..(i + p.post_max + 1).min(n)];
            let window_max = max_window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            if value < window_max {
                continue;
            }

            let avg_window = &curve[i.saturating_sub(p.pre_avg)..(i + p.post_avg + 1).min(n)];
            let window_mean = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
            if value < window_mean + p.delta {
                continue;
            }

            peaks.push(Peak { frame: i, value });
            last_accepted = Some(i);
        }

        peaks
    }
}

/// Percentile-threshold strategy: local maxima above the threshold, spaced by
/// `min_distance`, grouped into spans when closer than `2 * min_distance`
pub fn pick_spans(curve: &[f32], threshold_percentile: f32, min_distance: usize) -> Vec<FrameSpan> {
    let n = curve.len();
    if n < 3 {
        return Vec::new();
    }

    let threshold = percentile(curve, threshold_percentile);

    let mut accepted: Vec<usize> = Vec::new();
    for i in 1..n - 1 {
        if curve[i] <= curve[i - 1] || curve[i] <= curve[i + 1] {
            continue;
        }
        if curve[i] < threshold {
            continue;
        }
        if let Some(&last) = accepted.last() {
            if i - last < min_distance {
                continue;
            }
        }
        accepted.push(i);
    }

    let mut spans = Vec::new();
    let mut group_start = match accepted.first() {
        Some(&first) => first,
        None => return spans,
    };
    let mut group_end = group_start;

    for &peak in &accepted[1..] {
        if peak - group_end < min_distance * 2 {
            group_end = peak;
        } else {
            spans.push(FrameSpan {
                start: group_start,
                end: group_end,
            });
            group_start = peak;
            group_end = peak;
        }
    }
    spans.push(FrameSpan {
        start: group_start,
        end: group_end,
    });

    spans
}

/// Nearest-rank percentile of a curve
fn percentile(values: &[f32], pct: f32) -> f32 {
    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (pct / 100.0 * (sorted.len() - 1) as f32).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(wait: usize, delta: f32) -> PeakParams {
        PeakParams {
            pre_max: 3,
            post_max: 3,
            pre_avg: 3,
            post_avg: 3,
            delta,
            wait,
        }
    }

    #[test]
    fn test_single_clear_peak() {
        let mut curve = vec![0.1; 31];
        curve[15] = 1.0;
        let peaks = PeakPicker::new(params(5, 0.3)).pick(&curve);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].frame, 15);
        assert!((peaks[0].value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_curve_has_no_peaks() {
        let curve = vec![0.5; 50];
        assert!(PeakPicker::new(params(5, 0.3)).pick(&curve).is_empty());
    }

    #[test]
    fn test_zero_curve_has_no_peaks() {
        let curve = vec![0.0; 50];
        assert!(PeakPicker::new(params(5, 0.3)).pick(&curve).is_empty());
    }

    #[test]
    fn test_empty_curve() {
        assert!(PeakPicker::new(params(5, 0.3)).pick(&[]).is_empty());
    }

    #[test]
    fn test_bump_below_delta_margin_rejected() {
        // Local max exists but clears the neighborhood mean by under delta.
        let mut curve = vec![0.5; 21];
        curve[10] = 0.6;
        let peaks = PeakPicker::new(params(5, 0.3)).pick(&curve);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_wait_enforces_minimum_separation() {
        // Alternating tall spikes every 2 frames; wait=5 thins them out.
        let mut curve = vec![0.0; 40];
        for i in (2..38).step_by(2) {
            curve[i] = 1.0;
        }
        let peaks = PeakPicker::new(params(5, 0.1)).pick(&curve);
        assert!(!peaks.is_empty());
        for pair in peaks.windows(2) {
            assert!(pair[1].frame - pair[0].frame >= 5);
        }
    }

    #[test]
    fn test_peaks_are_local_maxima() {
        let curve: Vec<f32> = (0..60)
            .map(|i| ((i as f32 / 6.0).sin().abs()))
            .collect();
        let picker = PeakPicker::new(params(4, 0.05));
        for peak in picker.pick(&curve) {
            let lo = peak.frame.saturating_sub(4);
            let hi = (peak.frame + 5).min(curve.len());
            let window_max = curve[lo..hi].iter().copied().fold(f32::NEG_INFINITY, f32::max);
            assert!(peak.value >= window_max);
        }
    }

    #[test]
    fn test_spans_group_nearby_peaks() {
        // Two clusters of spikes, far apart.
        let mut curve = vec![0.0; 200];
        for &i in &[20usize, 28, 36] {
            curve[i] = 1.0;
        }
        for &i in &[150usize, 158] {
            curve[i] = 0.9;
        }
        let spans = pick_spans(&curve, 80.0, 5);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], FrameSpan { start: 20, end: 36 });
        assert_eq!(spans[1], FrameSpan { start: 150, end: 158 });
    }

    #[test]
    fn test_spans_empty_when_nothing_clears_threshold() {
        let curve = vec![0.2; 100];
        assert!(pick_spans(&curve, 85.0, 10).is_empty());
    }
}
