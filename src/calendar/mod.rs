use chrono::{Datelike, Duration, NaiveDate};

use crate::{PipelineError, Result};

/// The known Monday every week sequence number is anchored to.
const ANCHOR_YMD: (i32, u32, u32) = (2024, 6, 17);

/// Week sequence number of the anchor Monday.
const ANCHOR_NUMBER: i64 = 900;

/// The calendar date identifying one week's recording.
///
/// Every derived naming token (week sequence number, Saturday/Sunday/Monday
/// tokens) is a pure function of this date, so the whole output file set is
/// deterministic once the date is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastDate(NaiveDate);

impl BroadcastDate {
    /// Parse a broadcast date in `MM-DD-YY` form.
    pub fn parse(input: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(input, "%m-%d-%y")
            .map_err(|_| PipelineError::InvalidDateFormat(input.to_string()))?;
        Ok(Self(date))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Calendar year of the broadcast date.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Incrementing integer identifying this broadcast week.
    ///
    /// Anchored at Monday 2024-06-17 = 900 and advancing by exactly one per
    /// elapsed calendar week. Euclidean division keeps pre-anchor weeks
    /// flooring instead of truncating toward zero.
    pub fn week_sequence_number(&self) -> i64 {
        let anchor = NaiveDate::from_ymd_opt(ANCHOR_YMD.0, ANCHOR_YMD.1, ANCHOR_YMD.2)
            .expect("anchor date is a valid calendar date");
        let days = monday_of_week(self.0)
            .signed_duration_since(monday_of_week(anchor))
            .num_days();
        ANCHOR_NUMBER + days.div_euclid(7)
    }

    /// The Saturday preceding the broadcast date, as an `MM-DD-YY` token.
    pub fn preceding_saturday(&self) -> String {
        (self.0 - Duration::days(2)).format("%m-%d-%y").to_string()
    }

    /// The Sunday preceding the broadcast date, long form (e.g. "June 16, 2024").
    pub fn preceding_sunday_long(&self) -> String {
        (self.0 - Duration::days(1)).format("%B %-d, %Y").to_string()
    }

    /// The Monday of the broadcast date's week, as an `MMDDYYYY` token.
    pub fn monday_token(&self) -> String {
        monday_of_week(self.0).format("%m%d%Y").to_string()
    }
}

impl std::fmt::Display for BroadcastDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%m-%d-%y"))
    }
}

/// The Monday of the week containing `date`.
fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_week_yields_anchor_number() {
        let date = BroadcastDate::parse("06-17-24").unwrap();
        assert_eq!(date.week_sequence_number(), 900);
    }

    #[test]
    fn next_monday_advances_by_exactly_one() {
        let date = BroadcastDate::parse("06-24-24").unwrap();
        assert_eq!(date.week_sequence_number(), 901);
    }

    #[test]
    fn mid_week_dates_share_their_monday_number() {
        // Wednesday and Sunday of the anchor week
        assert_eq!(
            BroadcastDate::parse("06-19-24").unwrap().week_sequence_number(),
            900
        );
        assert_eq!(
            BroadcastDate::parse("06-23-24").unwrap().week_sequence_number(),
            900
        );
    }

    #[test]
    fn pre_anchor_weeks_floor_instead_of_truncating() {
        assert_eq!(
            BroadcastDate::parse("06-10-24").unwrap().week_sequence_number(),
            899
        );
        // A mid-week date in the week before the anchor must not round up
        assert_eq!(
            BroadcastDate::parse("06-12-24").unwrap().week_sequence_number(),
            899
        );
    }

    #[test]
    fn preceding_saturday_token() {
        let date = BroadcastDate::parse("06-17-24").unwrap();
        assert_eq!(date.preceding_saturday(), "06-15-24");
    }

    #[test]
    fn preceding_sunday_long_form() {
        let date = BroadcastDate::parse("06-17-24").unwrap();
        assert_eq!(date.preceding_sunday_long(), "June 16, 2024");

        // Single-digit days must not be zero padded
        let date = BroadcastDate::parse("04-10-23").unwrap();
        assert_eq!(date.preceding_sunday_long(), "April 9, 2023");
    }

    #[test]
    fn monday_token_uses_the_weeks_monday() {
        assert_eq!(BroadcastDate::parse("06-17-24").unwrap().monday_token(), "06172024");
        // A Thursday collapses back to its Monday
        assert_eq!(BroadcastDate::parse("06-20-24").unwrap().monday_token(), "06172024");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let err = BroadcastDate::parse("2024-06-17").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::PipelineError>(),
            Some(crate::PipelineError::InvalidDateFormat(_))
        ));
        assert!(BroadcastDate::parse("13-40-24").is_err());
        assert!(BroadcastDate::parse("not a date").is_err());
    }

    #[test]
    fn year_comes_from_the_broadcast_date() {
        assert_eq!(BroadcastDate::parse("06-17-24").unwrap().year(), 2024);
        assert_eq!(BroadcastDate::parse("01-01-30").unwrap().year(), 2030);
    }
}
