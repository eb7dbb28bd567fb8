//! Showsplit - A Rust CLI tool for turning one weekly studio recording into its syndication cuts
//!
//! This library slices a raw broadcast recording into a highlight clip, five satellite-feed
//! segments and a stitched weekly podcast, embeds ID3 metadata into the podcast, and uploads
//! the resulting files to a set of configured FTP destinations with retry and verification.

pub mod assemble;
pub mod calendar;
pub mod cli;
pub mod codec;
pub mod config;
pub mod distribute;
pub mod jobs;
pub mod progress;
pub mod segments;
pub mod tagger;
pub mod transfer;

pub use assemble::OutputFileSet;
pub use calendar::BroadcastDate;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use jobs::{JobRegistry, JobRequest, JobRunner, DONE_SENTINEL};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Invalid broadcast date {0:?}: expected MM-DD-YY")]
    InvalidDateFormat(String),

    #[error("Failed to decode source recording: {0}")]
    SourceDecode(String),

    #[error("Failed to write podcast tags: {0}")]
    TagWrite(String),

    #[error("Upload of {file} to {destination} failed after {attempts} attempts")]
    TransferExhausted {
        destination: String,
        file: String,
        attempts: u32,
    },

    #[error("One or more FTP uploads failed:\n{}", .0.join("\n"))]
    DistributionPartialFailure(Vec<String>),
}
