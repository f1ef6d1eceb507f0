//! Calendar periods used to index climate series.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling granularity of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One observation per calendar year.
    Annual,
    /// One observation per calendar month.
    Monthly,
}

/// A single period: a calendar year or a (year, month) pair.
///
/// Ordering is only meaningful between periods of the same granularity;
/// [`TimeSeries`](crate::core::TimeSeries) never mixes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Period {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Period {
    /// Create an annual period.
    pub fn year(year: i32) -> Self {
        Period::Year(year)
    }

    /// Create a monthly period, validating the month.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(Period::Month { year, month })
    }

    /// The calendar year this period falls in.
    pub fn calendar_year(&self) -> i32 {
        match *self {
            Period::Year(year) => year,
            Period::Month { year, .. } => year,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Year(_) => Granularity::Annual,
            Period::Month { .. } => Granularity::Monthly,
        }
    }

    /// Linear index: the year for annual periods, `year * 12 + month - 1`
    /// for monthly ones.
    pub fn index(&self) -> i64 {
        match *self {
            Period::Year(year) => year as i64,
            Period::Month { year, month } => year as i64 * 12 + (month as i64 - 1),
        }
    }

    /// Inverse of [`Period::index`].
    pub fn from_index(granularity: Granularity, index: i64) -> Self {
        match granularity {
            Granularity::Annual => Period::Year(index as i32),
            Granularity::Monthly => Period::Month {
                year: index.div_euclid(12) as i32,
                month: index.rem_euclid(12) as u32 + 1,
            },
        }
    }

    /// The immediately following period.
    pub fn next(&self) -> Self {
        Self::from_index(self.granularity(), self.index() + 1)
    }

    /// Number of steps from `self` forward to `later`, or `None` if `later`
    /// is earlier or of another granularity.
    pub fn steps_until(&self, later: &Period) -> Option<usize> {
        if self.granularity() != later.granularity() {
            return None;
        }
        let diff = later.index() - self.index();
        usize::try_from(diff).ok()
    }

    /// The last period of `year` at the given granularity.
    pub fn end_of_year(granularity: Granularity, year: i32) -> Self {
        match granularity {
            Granularity::Annual => Period::Year(year),
            Granularity::Monthly => Period::Month { year, month: 12 },
        }
    }

    /// First calendar day of the period, for chart axes.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            Period::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
            Period::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(year) => write!(f, "{}", year),
            Period::Month { year, month } => write!(f, "{}-{:02}", year, month),
        }
    }
}

/// Inclusive range of calendar years, as selected on a range slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: i32,
    pub end: i32,
}

impl PeriodRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether the period's calendar year lies inside the range.
    pub fn contains(&self, period: &Period) -> bool {
        let year = period.calendar_year();
        year >= self.start && year <= self.end
    }

    /// Number of years covered.
    pub fn span(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}
