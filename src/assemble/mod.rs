use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::calendar::BroadcastDate;
use crate::codec::{AudioCodec, EncodeSpec, Waveform};
use crate::progress::Progress;
use crate::segments;
use crate::{PipelineError, Result};

/// Slug used in feed and highlight filenames
pub const ARTIST_SLUG: &str = "stevebrown";

/// Bitrate of the highlight clip, kbit/s
const HIGHLIGHT_BITRATE_KBPS: u32 = 320;

/// Bitrate and sample rate of the weekly podcast
const PODCAST_BITRATE_KBPS: u32 = 96;
const PODCAST_SAMPLE_RATE: u32 = 44_100;

/// The complete collection of derivative files produced from one recording.
///
/// Filenames are a pure function of the broadcast date, so the set never
/// needs to be guessed after the fact: a successful assembly always returns
/// the manifest.
#[derive(Debug, Clone)]
pub struct OutputFileSet {
    pub highlight: PathBuf,
    pub feed_segments: Vec<PathBuf>,
    pub podcast: PathBuf,
}

/// `<artist-slug>_<MM-DD-YY>_H1.mp3`, dated to the preceding Saturday.
pub fn highlight_filename(date: &BroadcastDate) -> String {
    format!("{}_{}_H1.mp3", ARTIST_SLUG, date.preceding_saturday())
}

/// `<artist-slug>_<MM-DD-YY>_S{n}_Sirius.wav`, dated to the preceding Saturday.
pub fn feed_filename(date: &BroadcastDate, segment_name: &str) -> String {
    format!(
        "{}_{}_{}_Sirius.wav",
        ARTIST_SLUG,
        date.preceding_saturday(),
        segment_name
    )
}

/// `sbe<weekNumber>-<MMDDYYYY>.mp3`, dated to the Monday of the week.
pub fn podcast_filename(date: &BroadcastDate) -> String {
    format!("sbe{}-{}.mp3", date.week_sequence_number(), date.monday_token())
}

/// Slice and re-encode one source recording into the full output file set.
///
/// The source file is never modified. Every artifact is written through a
/// temporary file and renamed into place, so a path returned in the manifest
/// always points at a complete file. Progress is reported after each artifact
/// is on disk.
pub fn assemble(
    codec: &dyn AudioCodec,
    source: &Path,
    output_dir: &Path,
    date: &BroadcastDate,
    progress: &Progress,
) -> Result<OutputFileSet> {
    let audio = codec
        .decode(source)
        .map_err(|e| PipelineError::SourceDecode(format!("{e:#}")))?;

    // Highlight clip: prefix of the recording at high bitrate
    progress.report("Starting H1 MP3 export...");
    let highlight = output_dir.join(highlight_filename(date));
    let clip = audio.slice_ms(0, segments::highlight_cutoff_ms());
    write_atomic(codec, &clip, &highlight, &EncodeSpec::mp3(HIGHLIGHT_BITRATE_KBPS))?;
    progress.report(format!("H1 exported: {}", highlight.display()));

    // Satellite-feed segments: exact lossless slices
    let mut feed_segments = Vec::with_capacity(segments::feed_table().len());
    for seg in segments::feed_table() {
        let cut = audio.slice_ms(seg.start_ms(), seg.end_ms());
        let path = output_dir.join(feed_filename(date, seg.name));
        write_atomic(codec, &cut, &path, &EncodeSpec::wav())?;
        progress.report(format!("Sirius segment exported: {}", path.display()));
        feed_segments.push(path);
    }

    // Weekly podcast: ordered concatenation of the podcast table
    let mut stitched: Option<Waveform> = None;
    for range in segments::podcast_table() {
        let cut = audio.slice_ms(range.start_ms(), range.end_ms());
        match stitched.as_mut() {
            Some(acc) => acc.append(&cut),
            None => stitched = Some(cut),
        }
    }
    let stitched = stitched.context("Podcast assembly table is empty")?;
    let podcast = output_dir.join(podcast_filename(date));
    write_atomic(
        codec,
        &stitched,
        &podcast,
        &EncodeSpec::mp3(PODCAST_BITRATE_KBPS).with_sample_rate(PODCAST_SAMPLE_RATE),
    )?;
    progress.report(format!("Podcast exported: {}", podcast.display()));

    Ok(OutputFileSet { highlight, feed_segments, podcast })
}

/// Encode into a temporary sibling file, then rename over the final path.
fn write_atomic(
    codec: &dyn AudioCodec,
    waveform: &Waveform,
    path: &Path,
    spec: &EncodeSpec,
) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(".export-")
        .suffix(&format!(".{}", spec.format.as_str()))
        .tempfile_in(dir)
        .with_context(|| format!("Failed to stage output next to {}", path.display()))?;

    codec.encode(waveform, staged.path(), spec)?;

    staged
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move finished file into {}", path.display()))?;
    Ok(())
}
