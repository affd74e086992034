//! Date bucketing for the contribution grid, the journal month selector and day grouping.
//!
//! Every bucket is keyed by the calendar day the viewer perceives, so instants are always
//! converted through a [`Zone`] before their date is taken.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Local, Months, NaiveDate, NaiveDateTime,
    NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::store::TimeRange;

/// The viewer's time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    /// Parse an offset such as `-05:00` or `+0530`
    pub fn parse_offset(s: &str) -> Result<Zone, CalendarError> {
        let s = s.trim();
        let (sign, rest) = match s.chars().next() {
            Some('+') => (1, &s[1..]),
            Some('-') => (-1, &s[1..]),
            _ => return Err(CalendarError::InvalidOffset(s.to_string())),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CalendarError::InvalidOffset(s.to_string()));
        }
        let hours: i32 = digits[..2].parse().map_err(|_| CalendarError::InvalidOffset(s.to_string()))?;
        let minutes: i32 = digits[2..].parse().map_err(|_| CalendarError::InvalidOffset(s.to_string()))?;
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(|| CalendarError::InvalidOffset(s.to_string()))
    }

    /// Local calendar date of an instant
    pub fn date_of(&self, ts: &DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => ts.with_timezone(&Local).date_naive(),
            Zone::Fixed(offset) => ts.with_timezone(offset).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now())
    }

    /// First instant of a local calendar day
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            Zone::Local => local_instant(&Local, midnight),
            Zone::Fixed(offset) => local_instant(offset, midnight),
        }
    }
}

fn local_instant<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    // A DST gap can swallow midnight; the first existing instant after it is used instead
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("invalid UTC offset '{0}', expected e.g. -05:00")]
    InvalidOffset(String),
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12); 0 for an out-of-range month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A calendar month, displayed as `YYYY-MM`. Ordering is chronological.
///
/// Holds the month's first day, so every value names a representable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// `None` for a month outside 1-12 or a year chrono cannot represent
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { first: date - Days::new(u64::from(date.day0())) }
    }

    pub fn current(zone: &Zone) -> Self {
        Self::of(zone.today())
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn last_day(self) -> NaiveDate {
        self.first + Days::new(u64::from(days_in_month(self.year(), self.month()) - 1))
    }

    pub fn next(self) -> Option<Self> {
        self.first.checked_add_months(Months::new(1)).map(|first| Self { first })
    }

    pub fn prev(self) -> Option<Self> {
        self.first.checked_sub_months(Months::new(1)).map(|first| Self { first })
    }

    /// First to last instant of the month in the viewer's zone, both inclusive
    pub fn bounds(self, zone: &Zone) -> TimeRange {
        let start = zone.start_of_day(self.first);
        let end = self
            .next()
            .and_then(|next| zone.start_of_day(next.first).checked_sub_signed(Duration::seconds(1)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        TimeRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Distinct months across all timestamps plus the current month, newest first
pub fn available_months<'a, I>(timestamps: I, current: YearMonth, zone: &Zone) -> Vec<YearMonth>
where
    I: IntoIterator<Item = &'a DateTime<Utc>>,
{
    let mut months: Vec<YearMonth> = timestamps
        .into_iter()
        .map(|ts| YearMonth::of(zone.date_of(ts)))
        .chain(std::iter::once(current))
        .collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// Heat-map intensity of a day in the contribution grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ContributionLevel {
    Level0,
    Level1,
    Level2,
    Level3,
    Level4,
}

impl ContributionLevel {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => ContributionLevel::Level0,
            1 => ContributionLevel::Level1,
            2 => ContributionLevel::Level2,
            3 => ContributionLevel::Level3,
            _ => ContributionLevel::Level4,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Single-cell glyph for terminal output
    pub fn glyph(self) -> char {
        match self {
            ContributionLevel::Level0 => '·',
            ContributionLevel::Level1 => '░',
            ContributionLevel::Level2 => '▒',
            ContributionLevel::Level3 => '▓',
            ContributionLevel::Level4 => '█',
        }
    }
}

/// Count of instants per local calendar day
pub fn contribution_counts<'a, I>(instants: I, zone: &Zone) -> BTreeMap<NaiveDate, u32>
where
    I: IntoIterator<Item = &'a DateTime<Utc>>,
{
    let mut counts = BTreeMap::new();
    for ts in instants {
        *counts.entry(zone.date_of(ts)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub count: u32,
    pub level: ContributionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthColumn {
    pub month: YearMonth,
    /// Week columns the month occupies in the grid
    pub weeks: u32,
    pub days: Vec<GridCell>,
}

/// Every day of `year`, month by month
pub fn year_grid(year: i32, counts: &BTreeMap<NaiveDate, u32>) -> Vec<MonthColumn> {
    (1..=12)
        .filter_map(|month| YearMonth::new(year, month))
        .map(|ym| {
            let total = days_in_month(ym.year(), ym.month());
            let days = (1..=total)
                .filter_map(|day| NaiveDate::from_ymd_opt(ym.year(), ym.month(), day))
                .map(|date| {
                    let count = counts.get(&date).copied().unwrap_or(0);
                    GridCell { date, count, level: ContributionLevel::from_count(count) }
                })
                .collect();
            MonthColumn { month: ym, weeks: total.div_ceil(7), days }
        })
        .collect()
}

/// Records sharing one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub items: Vec<T>,
}

/// Group items by local day, most recent day first. Items keep their input order inside a
/// day.
pub fn group_by_day<T, F>(items: impl IntoIterator<Item = T>, zone: &Zone, instant: F) -> Vec<DayGroup<T>>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
    for item in items {
        buckets.entry(zone.date_of(&instant(&item))).or_default().push(item);
    }
    buckets
        .into_iter()
        .rev()
        .map(|(date, items)| DayGroup { date, items })
        .collect()
}

/// Case-insensitive substring match over free text and tags. A blank query matches
/// everything.
pub fn matches_query(query: &str, text: &str, tags: &[String]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    text.to_lowercase().contains(&needle) || tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_minus_5() -> Zone {
        Zone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
    }

    fn at(zone: &Zone, s: &str) -> DateTime<Utc> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap();
        match zone {
            Zone::Fixed(offset) => offset.from_local_datetime(&naive).unwrap().with_timezone(&Utc),
            Zone::Local => unreachable!(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_lengths_follow_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn contribution_levels_use_fixed_thresholds() {
        let levels: Vec<u8> = [0, 1, 2, 3, 5].into_iter().map(|c| ContributionLevel::from_count(c).value()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn completions_bucket_by_the_viewers_local_day() {
        let zone = utc_minus_5();
        let late = at(&zone, "2025-01-05T23:50:00");
        let early = at(&zone, "2025-01-06T00:10:00");
        // Both instants fall on 2025-01-06 in UTC
        assert_eq!(late.date_naive(), date("2025-01-06"));

        let counts = contribution_counts([&late, &early], &zone);
        assert_eq!(counts.get(&date("2025-01-05")), Some(&1));
        assert_eq!(counts.get(&date("2025-01-06")), Some(&1));
    }

    #[test]
    fn year_grid_enumerates_each_day_once() {
        let mut counts = BTreeMap::new();
        counts.insert(date("2024-02-29"), 4);
        let grid = year_grid(2024, &counts);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.iter().map(|m| m.days.len()).sum::<usize>(), 366);
        assert_eq!(grid[1].days.last().unwrap().level, ContributionLevel::Level4);
        assert_eq!(grid[1].weeks, 5);
        assert_eq!(grid[0].days[0].count, 0);
        assert_eq!(year_grid(2023, &BTreeMap::new()).iter().map(|m| m.days.len()).sum::<usize>(), 365);
    }

    #[test]
    fn month_bounds_cover_first_to_last_instant() {
        let zone = utc_minus_5();
        let range = YearMonth::new(2025, 1).unwrap().bounds(&zone);
        assert_eq!(range.start, at(&zone, "2025-01-01T00:00:00"));
        assert_eq!(range.end, at(&zone, "2025-01-31T23:59:59"));
        assert!(range.contains(&at(&zone, "2025-01-31T23:59:59")));
        assert!(!range.contains(&at(&zone, "2025-02-01T00:00:00")));
    }

    #[test]
    fn available_months_include_current_and_sort_descending() {
        let zone = utc_minus_5();
        let stamps = [
            at(&zone, "2025-01-10T08:00:00"),
            at(&zone, "2024-11-02T08:00:00"),
            at(&zone, "2025-01-20T08:00:00"),
        ];
        let current = YearMonth::new(2025, 2).unwrap();
        let months: Vec<String> = available_months(&stamps, current, &zone).iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2025-02", "2025-01", "2024-11"]);

        let only_current = available_months(std::iter::empty(), current, &zone);
        assert_eq!(only_current, vec![current]);
    }

    #[test]
    fn year_month_parsing_and_stepping() {
        let ym: YearMonth = "2024-12".parse().unwrap();
        let next = ym.next().unwrap();
        assert_eq!(next.to_string(), "2025-01");
        assert_eq!(next.prev(), Some(ym));
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("december".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2024, 2).unwrap().contains(date("2024-02-29")));
        assert_eq!(YearMonth::of(date("2024-02-29")).last_day(), date("2024-02-29"));
    }

    #[test]
    fn years_beyond_the_calendar_are_rejected() {
        let err = "300000-01".parse::<YearMonth>().unwrap_err();
        assert_eq!(err, CalendarError::InvalidMonth("300000-01".to_string()));
        assert!(YearMonth::new(-300000, 6).is_none());

        let last = YearMonth::of(NaiveDate::MAX);
        assert_eq!(last.next(), None);
        let range = last.bounds(&Zone::Fixed(FixedOffset::east_opt(0).unwrap()));
        assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);
        assert!(range.start < range.end);
    }

    #[test]
    fn year_month_serializes_as_text() {
        let ym = YearMonth::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2025-03\"");
        assert_eq!(serde_json::from_str::<YearMonth>("\"2025-03\"").unwrap(), ym);
        assert!(serde_json::from_str::<YearMonth>("\"2025-00\"").is_err());
    }

    #[test]
    fn grouping_orders_days_newest_first_and_keeps_item_order() {
        let zone = utc_minus_5();
        let items = vec![
            ("c", at(&zone, "2025-01-06T09:00:00")),
            ("b", at(&zone, "2025-01-05T23:50:00")),
            ("a", at(&zone, "2025-01-05T08:00:00")),
        ];
        let groups = group_by_day(items, &zone, |(_, ts)| *ts);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, date("2025-01-06"));
        assert_eq!(groups[1].items.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn query_matches_content_or_tags_case_insensitively() {
        assert!(matches_query("CODE", "write code", &[]));
        assert!(matches_query("err", "buy milk", &["Errand".into()]));
        assert!(!matches_query("code", "buy milk", &["errand".into()]));
        assert!(matches_query("  ", "anything", &[]));
    }

    #[test]
    fn offsets_parse_with_or_without_colon() {
        assert_eq!(Zone::parse_offset("-05:00").unwrap(), utc_minus_5());
        assert_eq!(
            Zone::parse_offset("+0530").unwrap(),
            Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert!(Zone::parse_offset("EST").is_err());
        assert!(Zone::parse_offset("+25:00").is_err());
    }
}
