use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assemble::OutputFileSet;
use crate::config::Destination;
use crate::progress::Progress;
use crate::transfer::TransferEngine;
use crate::{PipelineError, Result};

/// The kinds of artifact in one output file set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Highlight,
    FeedSegment,
    Podcast,
}

impl OutputKind {
    /// Filename token a rename rule substitutes, for kinds that carry one
    fn suffix_token(&self) -> Option<&'static str> {
        match self {
            OutputKind::Highlight => Some("H1"),
            OutputKind::FeedSegment | OutputKind::Podcast => None,
        }
    }
}

/// Declarative description of which outputs a destination receives.
///
/// Destinations carry one of these instead of being special-cased by name,
/// so adding a syndication partner is a config edit, not a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DeliveryRule {
    /// Every file in the output set, original names
    All,
    /// Only the listed kinds, original names
    Only { kinds: Vec<OutputKind> },
    /// The kind's files uploaded once per suffix, each suffix replacing the
    /// kind's filename token (e.g. `H1` -> `NONCOM`), as separate uploads
    Renamed { kind: OutputKind, suffixes: Vec<String> },
}

impl std::fmt::Display for DeliveryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryRule::All => write!(f, "all outputs"),
            DeliveryRule::Only { kinds } => write!(f, "only {:?}", kinds),
            DeliveryRule::Renamed { kind, suffixes } => {
                write!(f, "{:?} renamed to {}", kind, suffixes.join("/"))
            }
        }
    }
}

/// One invocation of the transfer engine: a file list plus remote renames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub files: Vec<PathBuf>,
    pub rename: HashMap<String, String>,
}

fn files_of_kind(outputs: &OutputFileSet, kind: OutputKind) -> Vec<PathBuf> {
    match kind {
        OutputKind::Highlight => vec![outputs.highlight.clone()],
        OutputKind::FeedSegment => outputs.feed_segments.clone(),
        OutputKind::Podcast => vec![outputs.podcast.clone()],
    }
}

/// Render a delivery rule against a concrete output set.
pub fn upload_calls(outputs: &OutputFileSet, rule: &DeliveryRule) -> Result<Vec<UploadCall>> {
    match rule {
        DeliveryRule::All => {
            let files = [OutputKind::Highlight, OutputKind::FeedSegment, OutputKind::Podcast]
                .into_iter()
                .flat_map(|kind| files_of_kind(outputs, kind))
                .collect();
            Ok(vec![UploadCall { files, rename: HashMap::new() }])
        }
        DeliveryRule::Only { kinds } => {
            let files = kinds
                .iter()
                .flat_map(|kind| files_of_kind(outputs, *kind))
                .collect();
            Ok(vec![UploadCall { files, rename: HashMap::new() }])
        }
        DeliveryRule::Renamed { kind, suffixes } => {
            let token = kind.suffix_token().ok_or_else(|| {
                anyhow::anyhow!("{kind:?} files have no filename token to rename")
            })?;
            let files = files_of_kind(outputs, *kind);

            let mut calls = Vec::with_capacity(suffixes.len());
            for suffix in suffixes {
                let rename = files
                    .iter()
                    .filter_map(|f| f.file_name().map(|n| n.to_string_lossy().to_string()))
                    .map(|name| {
                        let renamed =
                            name.replace(&format!("_{token}."), &format!("_{suffix}."));
                        (name, renamed)
                    })
                    .collect();
                calls.push(UploadCall { files: files.clone(), rename });
            }
            Ok(calls)
        }
    }
}

/// Push one output set to every configured destination.
///
/// Destinations are attempted in configured order; a failing destination is
/// recorded and the loop moves on, so one dead FTP server cannot block the
/// others. The aggregated error is only raised after every destination had
/// its chance.
pub fn distribute(
    engine: &TransferEngine<'_>,
    outputs: &OutputFileSet,
    destinations: &[Destination],
    progress: &Progress,
) -> Result<()> {
    let mut errors = Vec::new();

    for destination in destinations {
        progress.report(format!("Uploading to {}...", destination.name.to_uppercase()));

        let result = upload_calls(outputs, &destination.rule).and_then(|calls| {
            for call in calls {
                engine.upload(&call.files, destination, &call.rename, progress)?;
            }
            Ok(())
        });

        if let Err(e) = result {
            let message = format!("❌ FTP upload failed for site {}: {:#}", destination.name, e);
            progress.report(message.clone());
            errors.push(message);
        }
    }

    if errors.is_empty() {
        progress.report("🎉 All FTP uploads completed successfully!");
        Ok(())
    } else {
        Err(PipelineError::DistributionPartialFailure(errors).into())
    }
}
