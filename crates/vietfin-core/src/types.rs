//! Request parameter types shared by every provider.
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Exchange`] - Listing venue filter for discovery reports
//! - [`FundType`] - Mutual fund asset class filter
//! - [`DateRange`] - Inclusive calendar range with upstream window clamping

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::{DataError, Result};

/// Default number of rows requested by paginated operations.
pub const DEFAULT_LIMIT: usize = 100;

/// Days looked back when a request names no start date.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty symbol, which search operations read as "everything".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Listing venue used to scope discovery reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    /// Ho Chi Minh City Stock Exchange.
    #[default]
    Hose,
    /// Hanoi Stock Exchange.
    Hnx,
    /// Unlisted Public Company Market.
    Upcom,
    /// Every venue at once.
    All,
}

impl Exchange {
    /// Returns the lowercase code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hose => "hose",
            Self::Hnx => "hnx",
            Self::Upcom => "upcom",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hose" => Ok(Self::Hose),
            "hnx" => Ok(Self::Hnx),
            "upcom" => Ok(Self::Upcom),
            "all" => Ok(Self::All),
            _ => Err(DataError::InvalidParameter(format!(
                "Invalid exchange: {s}. Allowed exchanges are [hose, hnx, upcom, all]."
            ))),
        }
    }
}

/// Asset class of an open-ended fund.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundType {
    /// Balanced funds.
    Balanced,
    /// Bond funds.
    Bond,
    /// Equity funds.
    Stock,
}

impl FundType {
    /// Returns the uppercase code the fund distributors use.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "BALANCED",
            Self::Bond => "BOND",
            Self::Stock => "STOCK",
        }
    }
}

impl FromStr for FundType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BALANCED" => Ok(Self::Balanced),
            "BOND" => Ok(Self::Bond),
            "STOCK" => Ok(Self::Stock),
            _ => Err(DataError::InvalidParameter(format!(
                "Invalid fund type: {s}. Allowed types are [balanced, bond, stock]."
            ))),
        }
    }
}

/// An inclusive calendar date range.
///
/// `start` never comes after `end`: an inverted pair is swapped on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the bounds when they are inverted.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_iso_date(start)?, parse_iso_date(end)?))
    }

    /// Parses optional `YYYY-MM-DD` bounds.
    ///
    /// A missing `end` is `today`; a missing `start` is
    /// [`DEFAULT_LOOKBACK_DAYS`] before `end`.
    pub fn parse_or_default(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let end = end.map(parse_iso_date).transpose()?.unwrap_or(today);
        let start = match start {
            Some(start) => parse_iso_date(start)?,
            None => end - Duration::days(DEFAULT_LOOKBACK_DAYS),
        };
        Ok(Self::new(start, end))
    }

    /// Returns true when `date` falls inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days between `start` and `end`.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Unix timestamp of `start` at midnight UTC.
    #[must_use]
    pub fn start_timestamp(&self) -> i64 {
        midnight_timestamp(self.start)
    }

    /// Unix timestamp of `end` at midnight UTC.
    #[must_use]
    pub fn end_timestamp(&self) -> i64 {
        midnight_timestamp(self.end)
    }

    /// Fits the range into an upstream window of `max_days` ending near `today`.
    ///
    /// When `end` lies `max_days` or more in the past it moves to `today`.
    /// Then, when the range is longer than `max_days`, `start` moves to
    /// `end - max_days`.
    #[must_use]
    pub fn clamp_to_recent(self, max_days: i64, today: NaiveDate) -> Self {
        let mut range = self;
        if (today - range.end).num_days() >= max_days {
            info!(
                end = %range.end,
                adjusted = %today,
                max_days,
                "Adjusting end date to upstream window"
            );
            range.end = today;
        }
        if range.num_days() > max_days {
            let start = range.end - Duration::days(max_days);
            info!(
                start = %range.start,
                adjusted = %start,
                max_days,
                "Adjusting start date to upstream window"
            );
            range.start = start;
        }
        range
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        DataError::InvalidParameter(format!("Invalid date {s:?}, expected YYYY-MM-DD: {e}"))
    })
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
        .unwrap_or(0)
}

/// Page size for offset-paginated endpoints: the whole `limit` when it fits in
/// one page of `max_page`, otherwise full pages. A `limit` of zero means "all".
#[must_use]
pub const fn page_size(limit: usize, max_page: usize) -> usize {
    if limit == 0 || limit > max_page {
        max_page
    } else {
        limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_symbol_uppercase() {
        let symbol = Symbol::new(" vnm ");
        assert_eq!(symbol.as_str(), "VNM");
        assert_eq!(symbol.to_string(), "VNM");
        assert!(Symbol::new("").is_empty());
    }

    #[test]
    fn test_inverted_range_is_swapped() {
        let range = DateRange::parse("2024-03-01", "2024-01-01").unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 3, 1));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = DateRange::parse("01/02/2024", "2024-03-01").unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
    }

    #[test]
    fn test_clamp_moves_stale_end_to_today() {
        let today = date(2024, 6, 30);
        let range = DateRange::new(date(2023, 1, 1), date(2023, 2, 1)).clamp_to_recent(90, today);
        assert_eq!(range.end, today);
        assert_eq!(range.start, today - Duration::days(90));
    }

    #[test]
    fn test_clamp_shortens_long_range() {
        let today = date(2024, 6, 30);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 6, 20)).clamp_to_recent(30, today);
        assert_eq!(range.end, date(2024, 6, 20));
        assert_eq!(range.start, date(2024, 5, 21));
    }

    #[test]
    fn test_clamp_leaves_short_recent_range() {
        let today = date(2024, 6, 30);
        let original = DateRange::new(date(2024, 6, 1), date(2024, 6, 20));
        assert_eq!(original.clamp_to_recent(30, today), original);
    }

    #[test]
    fn test_missing_bounds_default_to_last_year() {
        let today = date(2024, 6, 30);
        let range = DateRange::parse_or_default(None, None, today).unwrap();
        assert_eq!(range, DateRange::new(date(2023, 7, 1), today));

        let range = DateRange::parse_or_default(None, Some("2024-01-31"), today).unwrap();
        assert_eq!(range.start, date(2023, 1, 31));

        let range = DateRange::parse_or_default(Some("2024-03-01"), None, today).unwrap();
        assert_eq!(range.num_days(), 121);
        assert!(DateRange::parse_or_default(Some("yesterday"), None, today).is_err());
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(0, 100), 100);
        assert_eq!(page_size(250, 100), 100);
        assert_eq!(page_size(20, 100), 20);
    }

    #[test]
    fn test_exchange_and_fund_type_parse() {
        assert_eq!("HNX".parse::<Exchange>().unwrap(), Exchange::Hnx);
        assert!("nyse".parse::<Exchange>().is_err());
        assert_eq!("bond".parse::<FundType>().unwrap(), FundType::Bond);
    }
}
