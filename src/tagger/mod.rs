use std::path::Path;

use anyhow::Context;
use id3::frame::{Comment, Picture, PictureType};
use id3::{Tag, TagLike, Version};

use crate::calendar::BroadcastDate;
use crate::{PipelineError, Result};

const ARTIST: &str = "Steve Brown";
const ALBUM: &str = "Steve Brown, Etc.";
const GENRE: &str = "Podcast - Talk";

/// Embed the weekly descriptive tags into the podcast file.
///
/// Frames of the same kind are replaced, everything else in an existing tag
/// is left alone, and the audio payload is never touched. Returns whether
/// tagging succeeded; tag faults are logged, not propagated, because a
/// missing tag is not worth losing the week's distribution over.
pub fn tag_podcast(
    podcast: &Path,
    date: &BroadcastDate,
    show_title: &str,
    guest: &str,
    artwork: Option<&Path>,
) -> bool {
    match write_tags(podcast, date, show_title, guest, artwork) {
        Ok(()) => true,
        Err(e) => {
            let fault = PipelineError::TagWrite(format!("{e:#}"));
            tracing::error!("{} ({})", fault, podcast.display());
            false
        }
    }
}

fn write_tags(
    podcast: &Path,
    date: &BroadcastDate,
    show_title: &str,
    guest: &str,
    artwork: Option<&Path>,
) -> Result<()> {
    // Keep whatever tag already exists; create one only when absent
    let mut tag = Tag::read_from_path(podcast).unwrap_or_else(|_| Tag::new());

    let week = date.week_sequence_number();
    let title = format!(
        "SBE{} | {} | {} | {}",
        week,
        date.preceding_sunday_long(),
        show_title,
        guest
    );
    let comment = format!(
        "© & ℗ {} Key Life Network http://www.KeyLife.org",
        date.year()
    );

    tag.set_title(title);
    tag.set_artist(ARTIST);
    tag.set_album(ALBUM);
    tag.set_track(u32::try_from(week).unwrap_or(0));
    tag.set_year(date.year());
    tag.set_genre(GENRE);

    // Same language and description every week, so this replaces rather
    // than accumulates
    tag.add_frame(Comment {
        lang: "eng".to_string(),
        description: String::new(),
        text: comment,
    });

    if let Some(artwork) = artwork {
        if artwork.exists() {
            let data = fs_err::read(artwork)
                .with_context(|| format!("Failed to read artwork {}", artwork.display()))?;
            tag.add_frame(Picture {
                mime_type: "image/png".to_string(),
                picture_type: PictureType::CoverFront,
                description: "Cover".to_string(),
                data,
            });
        }
    }

    tag.write_to_path(podcast, Version::Id3v24)
        .with_context(|| format!("Failed to write tags to {}", podcast.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PAYLOAD: &[u8] = b"pretend mpeg audio frames";

    fn podcast_file(dir: &Path) -> PathBuf {
        let path = dir.join("sbe900-06172024.mp3");
        fs_err::write(&path, PAYLOAD).unwrap();
        path
    }

    fn anchor_date() -> BroadcastDate {
        BroadcastDate::parse("06-17-24").unwrap()
    }

    #[test]
    fn tags_carry_every_derived_field() {
        let dir = tempfile::tempdir().unwrap();
        let podcast = podcast_file(dir.path());

        assert!(tag_podcast(&podcast, &anchor_date(), "Grace in Practice", "Jane Doe", None));

        let tag = Tag::read_from_path(&podcast).unwrap();
        assert_eq!(
            tag.title(),
            Some("SBE900 | June 16, 2024 | Grace in Practice | Jane Doe")
        );
        assert_eq!(tag.artist(), Some("Steve Brown"));
        assert_eq!(tag.album(), Some("Steve Brown, Etc."));
        assert_eq!(tag.track(), Some(900));
        assert_eq!(tag.year(), Some(2024));
        assert_eq!(tag.genre(), Some("Podcast - Talk"));

        let comments: Vec<_> = tag.comments().collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].text,
            "© & ℗ 2024 Key Life Network http://www.KeyLife.org"
        );
    }

    #[test]
    fn tagging_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let podcast = podcast_file(dir.path());
        let date = anchor_date();

        assert!(tag_podcast(&podcast, &date, "Show", "Guest", None));
        assert!(tag_podcast(&podcast, &date, "Show", "Guest", None));

        let tag = Tag::read_from_path(&podcast).unwrap();
        assert_eq!(tag.title(), Some("SBE900 | June 16, 2024 | Show | Guest"));
        assert_eq!(tag.comments().count(), 1);
    }

    #[test]
    fn audio_payload_survives_tagging() {
        let dir = tempfile::tempdir().unwrap();
        let podcast = podcast_file(dir.path());

        assert!(tag_podcast(&podcast, &anchor_date(), "Show", "Guest", None));

        let bytes = fs_err::read(&podcast).unwrap();
        assert!(bytes.ends_with(PAYLOAD));
    }

    #[test]
    fn artwork_is_embedded_when_the_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let podcast = podcast_file(dir.path());
        let artwork = dir.path().join("album_art.png");
        fs_err::write(&artwork, b"\x89PNG fake image").unwrap();

        assert!(tag_podcast(&podcast, &anchor_date(), "Show", "Guest", Some(&artwork)));

        let tag = Tag::read_from_path(&podcast).unwrap();
        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].mime_type, "image/png");
        assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
    }

    #[test]
    fn missing_artwork_is_skipped_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let podcast = podcast_file(dir.path());
        let missing = dir.path().join("nope.png");

        assert!(tag_podcast(&podcast, &anchor_date(), "Show", "Guest", Some(&missing)));

        let tag = Tag::read_from_path(&podcast).unwrap();
        assert_eq!(tag.pictures().count(), 0);
    }

    #[test]
    fn unwritable_target_reports_failure() {
        let date = anchor_date();
        assert!(!tag_podcast(
            Path::new("/nonexistent/dir/podcast.mp3"),
            &date,
            "Show",
            "Guest",
            None
        ));
    }
}
