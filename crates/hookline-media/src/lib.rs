//! Hookline Media - I/O collaborators around the detection core
//!
//! Everything the pipeline treats as an external collaborator lives here:
//! decoding audio files to a mono waveform at the analysis rate, fetching
//! remote media through yt-dlp, vocal separation behind a trait, and writing
//! detected segments back out as WAV files.

pub mod audio;
pub mod fetch;
pub mod separate;
pub mod writer;

pub use audio::{decode_to_mono, AudioFormat, MonoAudio};
pub use fetch::MediaFetcher;
pub use separate::{DemucsCommand, NoSeparation, VocalSeparator};
pub use writer::write_segment;
