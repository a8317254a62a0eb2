//! Data models for the ledger and the daily expense series

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single ledger row after cleaning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

impl TransactionRecord {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// One day of the expense series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// How calendar days without transactions are treated before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    /// Insert missing days with a zero amount
    #[default]
    ZeroFill,
    /// Fit on the observed days only
    AsObserved,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroFill => "zero-fill",
            Self::AsObserved => "as-observed",
        }
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero-fill" | "zero_fill" | "zerofill" => Ok(Self::ZeroFill),
            "as-observed" | "as_observed" | "observed" => Ok(Self::AsObserved),
            _ => Err(format!(
                "Unknown gap policy: {}. Available: zero-fill, as-observed",
                s
            )),
        }
    }
}

/// Daily totals sorted by date with no duplicate days.
///
/// Construction goes through [`DailyExpenseSeries::from_points`], which rejects
/// empty input and enforces strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyExpenseSeries {
    points: Vec<SeriesPoint>,
}

impl DailyExpenseSeries {
    pub fn from_points(points: Vec<SeriesPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }

        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(Error::invalid_parameter(
                "series",
                format!(
                    "dates must be strictly increasing ({} followed by {})",
                    pair[0].date, pair[1].date
                ),
            ));
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amount).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    pub fn last_amount(&self) -> f64 {
        self.points[self.points.len() - 1].amount
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.amount).sum()
    }

    /// Number of calendar days between first and last date that have no entry
    pub fn missing_days(&self) -> usize {
        let span = (self.last_date() - self.first_date()).num_days() as usize + 1;
        span - self.points.len()
    }

    /// The `n` most recent points (or all of them when shorter)
    pub fn tail(&self, n: usize) -> &[SeriesPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// A gap-free copy spanning first..=last date, missing days set to zero
    pub fn reindex_daily(&self) -> Self {
        let mut filled = Vec::with_capacity(self.points.len() + self.missing_days());
        let mut expected = self.first_date();

        for point in &self.points {
            while expected < point.date {
                filled.push(SeriesPoint {
                    date: expected,
                    amount: 0.0,
                });
                expected += Duration::days(1);
            }
            filled.push(*point);
            expected = point.date + Duration::days(1);
        }

        Self { points: filled }
    }

    /// Apply a gap policy, returning the series the model is trained on
    pub fn with_gap_policy(&self, policy: GapPolicy) -> Self {
        match policy {
            GapPolicy::ZeroFill => self.reindex_daily(),
            GapPolicy::AsObserved => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(d: u32, amount: f64) -> SeriesPoint {
        SeriesPoint {
            date: date(2024, 1, d),
            amount,
        }
    }

    #[test]
    fn test_from_points_rejects_empty() {
        let result = DailyExpenseSeries::from_points(vec![]);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_from_points_rejects_unsorted() {
        let result = DailyExpenseSeries::from_points(vec![point(2, 1.0), point(1, 1.0)]);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));

        let result = DailyExpenseSeries::from_points(vec![point(1, 1.0), point(1, 2.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_reindex_daily_fills_gaps() {
        let series =
            DailyExpenseSeries::from_points(vec![point(1, 10.0), point(4, 5.0), point(5, 1.0)])
                .unwrap();
        assert_eq!(series.missing_days(), 2);

        let filled = series.reindex_daily();
        assert_eq!(filled.len(), 5);
        assert_eq!(filled.missing_days(), 0);
        assert_eq!(filled.points()[1], point(2, 0.0));
        assert_eq!(filled.points()[2], point(3, 0.0));
        assert_eq!(filled.total(), series.total());
        assert_eq!(filled.last_date(), series.last_date());
    }

    #[test]
    fn test_gap_policy_as_observed_keeps_series() {
        let series = DailyExpenseSeries::from_points(vec![point(1, 10.0), point(3, 5.0)]).unwrap();
        assert_eq!(series.with_gap_policy(GapPolicy::AsObserved), series);
        assert_eq!(series.with_gap_policy(GapPolicy::ZeroFill).len(), 3);
    }

    #[test]
    fn test_gap_policy_parse() {
        assert_eq!("zero-fill".parse::<GapPolicy>().unwrap(), GapPolicy::ZeroFill);
        assert_eq!(" As-Observed ".parse::<GapPolicy>().unwrap(), GapPolicy::AsObserved);
        assert!("weekly".parse::<GapPolicy>().is_err());
    }

    #[test]
    fn test_tail() {
        let series =
            DailyExpenseSeries::from_points(vec![point(1, 1.0), point(2, 2.0), point(3, 3.0)])
                .unwrap();
        assert_eq!(series.tail(2), &[point(2, 2.0), point(3, 3.0)]);
        assert_eq!(series.tail(10).len(), 3);
    }
}
