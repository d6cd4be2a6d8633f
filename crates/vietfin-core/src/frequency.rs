//! Bar interval and reporting period definitions.
//!
//! This module defines [`Interval`] for the granularity of price history and
//! [`Period`] for fundamental data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Granularity of a price history request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One-minute bars.
    #[serde(rename = "1m")]
    OneMinute,
    /// Fifteen-minute bars.
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// Thirty-minute bars.
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// Hourly bars.
    #[serde(rename = "1h")]
    OneHour,
    /// Daily bars.
    #[default]
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    /// All intervals, shortest first.
    pub const ALL: [Self; 5] = [
        Self::OneMinute,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::OneDay,
    ];

    /// Returns the short code, e.g. `"1h"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
        }
    }

    /// Returns true for anything shorter than a trading day.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        !matches!(self, Self::OneDay)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == needle)
            .ok_or_else(|| {
                DataError::InvalidParameter(format!(
                    "Invalid interval: {s}. Allowed intervals are [1m, 15m, 30m, 1h, 1d]."
                ))
            })
    }
}

/// Reporting period for fundamental data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarter,
}

impl Period {
    /// Returns `"annual"` or `"quarter"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "quarter" => Ok(Self::Quarter),
            _ => Err(DataError::InvalidParameter(format!(
                "Invalid period: {s}. Allowed periods are [annual, quarter]."
            ))),
        }
    }
}
