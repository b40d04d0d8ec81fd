//! Shared pieces of the hookline command-line tools

pub mod output;
