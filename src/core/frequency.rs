//! Sampling frequencies and the regular timestamp grids they define.

use crate::error::ForecastError;
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared spacing between consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// All supported frequencies.
    pub const ALL: [Frequency; 5] = [
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
    ];

    /// Parse a frequency tag, returning `None` for anything unrecognized.
    ///
    /// # Example
    /// ```
    /// use demand_forecast::core::Frequency;
    ///
    /// assert_eq!(Frequency::parse("monthly"), Some(Frequency::Monthly));
    /// assert_eq!(Frequency::parse("annual"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            _ => None,
        }
    }

    /// Lowercase tag for this frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }

    /// The `k`-th tick of the grid anchored at `anchor`.
    ///
    /// Calendar frequencies are computed from the anchor directly rather than by
    /// repeated stepping, so a day-of-month clamped in a short month does not
    /// drift. Anchors on the last day of a month stay on month ends.
    pub fn tick(&self, anchor: DateTime<Utc>, k: u32) -> Option<DateTime<Utc>> {
        match self {
            Self::Hourly => anchor.checked_add_signed(Duration::hours(k as i64)),
            Self::Daily => anchor.checked_add_signed(Duration::days(k as i64)),
            Self::Weekly => anchor.checked_add_signed(Duration::weeks(k as i64)),
            Self::Monthly => add_months(anchor, k),
            Self::Quarterly => add_months(anchor, k.checked_mul(3)?),
        }
    }

    /// Every tick in `[start, end]`, anchored at `start`.
    pub fn grid(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut grid = Vec::new();
        let mut k = 0u32;
        while let Some(point) = self.tick(start, k) {
            if point > end {
                break;
            }
            grid.push(point);
            k += 1;
        }
        grid
    }

    /// The `horizon` ticks strictly after `last`.
    pub fn following(&self, last: DateTime<Utc>, horizon: usize) -> Vec<DateTime<Utc>> {
        (1..=horizon as u32)
            .map_while(|k| self.tick(last, k))
            .collect()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ForecastError::UnsupportedFrequency(s.to_string()))
    }
}

fn is_month_end(ts: &DateTime<Utc>) -> bool {
    ts.date_naive()
        .succ_opt()
        .map(|next| next.month() != ts.month())
        .unwrap_or(false)
}

fn add_months(anchor: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    if is_month_end(&anchor) {
        let first = anchor.with_day(1)?;
        let next_first = first.checked_add_months(Months::new(months.checked_add(1)?))?;
        next_first.checked_sub_signed(Duration::days(1))
    } else {
        anchor.checked_add_months(Months::new(months))
    }
}
