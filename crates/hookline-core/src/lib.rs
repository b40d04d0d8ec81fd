//! Hookline Core - Song Hook Detection
//!
//! Finds short, musically salient "hook" segments in a waveform: per-frame
//! feature extraction, fusion into a normalized salience/novelty curve,
//! windowed peak picking, decay-bounded segment expansion, and confidence
//! ranking. The pipeline is a pure function of the waveform and
//! configuration; decoding, fetching, and separation live in hookline-media.

pub mod config;
pub mod error;
pub mod feature;
pub mod grid;
pub mod novelty;
pub mod peaks;
pub mod rank;
pub mod segment;

pub use config::{FeatureWeights, FusionMode, HookConfig, PeakParams};
pub use error::{HookError, Result};
pub use feature::{FeatureExtractor, FeatureSet};
pub use grid::FrameGrid;
pub use novelty::NoveltyCurveBuilder;
pub use peaks::{pick_spans, FrameSpan, Peak, PeakPicker};
pub use rank::rank;
pub use segment::{Hook, SegmentExpander};

/// Detect the top hooks in a mono waveform
///
/// `samples` must be mono at `sample_rate` Hz; the configured
/// `frame_length`/`hop_length` framing is applied at that rate. Returns up
/// to `top_k` hooks, best first. An empty result means the computation
/// succeeded but nothing stood out.
pub fn detect_hooks(samples: &[f32], sample_rate: u32, config: &HookConfig) -> Result<Vec<Hook>> {
    config.validate()?;
    if sample_rate == 0 {
        return Err(HookError::InvalidInput("sample rate must be > 0".into()));
    }

    // The analysis grid follows the waveform's actual rate.
    let config = HookConfig {
        sample_rate,
        ..config.clone()
    };

    // Extract per-frame descriptors
    let features = FeatureExtractor::new(&config).extract(samples)?;

    // Fuse into one normalized curve
    let curve = NoveltyCurveBuilder::new(&config).build(&features);

    // Locate dominant frames
    let peaks = PeakPicker::new(config.peak).pick(&curve);
    log::debug!("{} candidate peaks on {} frames", peaks.len(), curve.len());

    // Expand each peak into a candidate segment
    let expander = SegmentExpander::new(&config);
    let hooks: Vec<Hook> = peaks.iter().map(|p| expander.expand(p, &curve)).collect();

    // Rank and truncate
    Ok(rank(hooks, config.top_k))
}

/// Whole-song salient span via the secondary threshold strategy
///
/// Returns the start and end time of the region spanned by the first and
/// last group of above-threshold curve maxima, or `None` when the curve has
/// no qualifying peaks.
pub fn salient_span(
    samples: &[f32],
    sample_rate: u32,
    config: &HookConfig,
) -> Result<Option<(f64, f64)>> {
    config.validate()?;
    if sample_rate == 0 {
        return Err(HookError::InvalidInput("sample rate must be > 0".into()));
    }

    let config = HookConfig {
        sample_rate,
        ..config.clone()
    };

    let features = FeatureExtractor::new(&config).extract(samples)?;
    let curve = NoveltyCurveBuilder::new(&config).build(&features);

    let spans = pick_spans(&curve, 85.0, 100);
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return Ok(None);
    };

    let grid = FrameGrid::from_config(&config);
    Ok(Some((
        grid.frame_to_time(first.start),
        grid.frame_to_time(last.end),
    )))
}
