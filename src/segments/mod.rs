//! Fixed timing tables for every output product.
//!
//! Two disjoint tables exist: the named satellite-feed table (S1..S5) whose
//! entries become standalone WAV files, and the unnamed podcast table whose
//! ranges are concatenated into the weekly podcast. The ranges are close but
//! independently tunable, which is why they are not shared.

/// One named time range of the satellite-feed table, in minutes against the
/// source recording.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub name: &'static str,
    pub start_minutes: f64,
    pub end_minutes: f64,
}

/// One unnamed time range of the podcast-assembly table.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub start_minutes: f64,
    pub end_minutes: f64,
}

const FEED_TABLE: &[SegmentSpec] = &[
    SegmentSpec { name: "S1", start_minutes: 6.0, end_minutes: 18.0 },
    SegmentSpec { name: "S2", start_minutes: 21.0, end_minutes: 30.0 },
    SegmentSpec { name: "S3", start_minutes: 34.0, end_minutes: 41.0 },
    SegmentSpec { name: "S4", start_minutes: 44.0, end_minutes: 53.0 },
    SegmentSpec { name: "S5", start_minutes: 55.0067, end_minutes: 58.833 },
];

const PODCAST_TABLE: &[TimeRange] = &[
    TimeRange { start_minutes: 6.0, end_minutes: 19.0 },
    TimeRange { start_minutes: 21.0, end_minutes: 30.99783333333333 },
    TimeRange { start_minutes: 34.0, end_minutes: 42.0 },
    TimeRange { start_minutes: 44.0, end_minutes: 54.0 },
    TimeRange { start_minutes: 55.0, end_minutes: 58.833 },
];

/// Total duration of the highlight clip, from the start of the recording.
pub const HIGHLIGHT_CUTOFF_MINUTES: f64 = 58.833;

/// Convert fractional minutes to absolute milliseconds, rounded to the
/// nearest millisecond so repeated runs slice at identical offsets.
pub fn minutes_to_ms(minutes: f64) -> u64 {
    (minutes * 60_000.0).round() as u64
}

/// The satellite-feed table, in declaration order.
pub fn feed_table() -> &'static [SegmentSpec] {
    FEED_TABLE
}

/// The podcast-assembly table, in declaration order.
pub fn podcast_table() -> &'static [TimeRange] {
    PODCAST_TABLE
}

pub fn highlight_cutoff_ms() -> u64 {
    minutes_to_ms(HIGHLIGHT_CUTOFF_MINUTES)
}

impl SegmentSpec {
    pub fn start_ms(&self) -> u64 {
        minutes_to_ms(self.start_minutes)
    }

    pub fn end_ms(&self) -> u64 {
        minutes_to_ms(self.end_minutes)
    }
}

impl TimeRange {
    pub fn start_ms(&self) -> u64 {
        minutes_to_ms(self.start_minutes)
    }

    pub fn end_ms(&self) -> u64 {
        minutes_to_ms(self.end_minutes)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms() - self.start_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_table_is_ascending_and_disjoint() {
        let mut previous_end = 0;
        for seg in feed_table() {
            assert!(seg.end_ms() > seg.start_ms(), "{} is empty", seg.name);
            assert!(seg.start_ms() >= previous_end, "{} overlaps its predecessor", seg.name);
            previous_end = seg.end_ms();
        }
    }

    #[test]
    fn podcast_table_is_ascending_and_disjoint() {
        let mut previous_end = 0;
        for range in podcast_table() {
            assert!(range.end_ms() > range.start_ms());
            assert!(range.start_ms() >= previous_end);
            previous_end = range.end_ms();
        }
    }

    #[test]
    fn fractional_minutes_round_to_nearest_millisecond() {
        assert_eq!(minutes_to_ms(55.0067), 3_300_402);
        assert_eq!(minutes_to_ms(58.833), 3_529_980);
        assert_eq!(minutes_to_ms(30.99783333333333), 1_859_870);
        assert_eq!(minutes_to_ms(6.0), 360_000);
    }

    #[test]
    fn tables_have_five_entries_each() {
        assert_eq!(feed_table().len(), 5);
        assert_eq!(podcast_table().len(), 5);
        assert_eq!(
            feed_table().iter().map(|s| s.name).collect::<Vec<_>>(),
            ["S1", "S2", "S3", "S4", "S5"]
        );
    }

    #[test]
    fn highlight_covers_the_last_podcast_range() {
        let last = podcast_table().last().unwrap();
        assert_eq!(highlight_cutoff_ms(), last.end_ms());
    }
}
