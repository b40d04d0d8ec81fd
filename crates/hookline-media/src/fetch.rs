//! Remote media fetching through a yt-dlp subprocess
//!
//! Downloading is a collaborator concern: the core never sees a URL, only
//! the decoded waveform. Failures surface once; retry policy belongs to the
//! caller, not here.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Downloads remote media references to local audio files
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    command: String,
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher {
    pub fn new() -> Self {
        Self {
            command: "yt-dlp".to_string(),
        }
    }

    /// Use a different downloader binary (e.g. a pinned path)
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Download `url` into `dest_dir`, returning the audio file path
    pub fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let template = dest_dir.join("source.%(ext)s");

        let output = Command::new(&self.command)
            .arg("--no-playlist")
            .arg("-f")
            .arg("bestaudio[ext=m4a]/bestaudio/best")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .output()
            .with_context(|| format!("failed to run {}", self.command))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} failed for {}: {}",
                self.command,
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // yt-dlp substitutes the real extension; find what it produced.
        let downloaded = std::fs::read_dir(dest_dir)
            .with_context(|| format!("cannot list {}", dest_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|stem| stem == "source")
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow::anyhow!("{} produced no output file for {}", self.command, url))?;

        log::info!("fetched {} -> {}", url, downloaded.display());
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_downloader_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MediaFetcher::with_command("hookline-no-such-binary");
        let result = fetcher.fetch("https://example.com/watch?v=x", dir.path());
        assert!(result.is_err());
    }
}
