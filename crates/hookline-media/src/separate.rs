//! Vocal separation behind a trait
//!
//! The separation model itself is an external heavyweight collaborator; the
//! pipeline only needs "waveform in, isolated waveform out at the same
//! rate". `DemucsCommand` shells out to the demucs CLI; `NoSeparation`
//! analyzes the full mix.

use crate::audio::decode_to_mono;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Produces an isolated component (vocals) from a mixed waveform
pub trait VocalSeparator: Send + Sync {
    /// Separate `samples` (mono, `sample_rate` Hz) and return the isolated
    /// component at the same sample rate and length ordering.
    fn separate(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;

    /// Human-readable name for logs and reports
    fn name(&self) -> &str;
}

/// Passthrough: analyze the mix as-is
pub struct NoSeparation;

impl VocalSeparator for NoSeparation {
    fn separate(&self, samples: &[f32], _sample_rate: u32) -> Result<Vec<f32>> {
        Ok(samples.to_vec())
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Two-stem vocal separation through the external demucs CLI
pub struct DemucsCommand {
    command: String,
    model: String,
}

impl Default for DemucsCommand {
    fn default() -> Self {
        Self {
            command: "demucs".to_string(),
            model: "htdemucs".to_string(),
        }
    }
}

impl DemucsCommand {
    pub fn new(command: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: model.into(),
        }
    }
}

impl VocalSeparator for DemucsCommand {
    fn separate(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let workdir = tempfile::tempdir().context("cannot create separation scratch dir")?;
        let mix_path = workdir.path().join("mix.wav");
        crate::writer::write_wav(samples, sample_rate, &mix_path)?;

        let status = Command::new(&self.command)
            .arg("--two-stems")
            .arg("vocals")
            .arg("-n")
            .arg(&self.model)
            .arg("-o")
            .arg(workdir.path())
            .arg(&mix_path)
            .status()
            .with_context(|| format!("failed to run {}", self.command))?;

        if !status.success() {
            anyhow::bail!("{} exited with {}", self.command, status);
        }

        // demucs writes <out>/<model>/<track>/vocals.wav
        let vocals_path: PathBuf = workdir
            .path()
            .join(&self.model)
            .join("mix")
            .join("vocals.wav");
        let vocals = decode_to_mono(&vocals_path, sample_rate)
            .with_context(|| format!("no vocals output at {}", vocals_path.display()))?;

        Ok(vocals.samples)
    }

    fn name(&self) -> &str {
        "demucs"
    }
}
