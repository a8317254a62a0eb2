//! Scalar statistics and the tabular forecast report

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forecast::ForecastResult;

/// One row of the forecast table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// ISO-8601 date (YYYY-MM-DD)
    pub date: String,
    pub predicted_mean: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Aggregates over the predicted means
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    total: f64,
    peak: f64,
    peak_date: NaiveDate,
    average: f64,
    rows: Vec<ForecastRow>,
}

impl ForecastSummary {
    /// Sum of the predicted means
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn peak_date(&self) -> NaiveDate {
        self.peak_date
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }
}

/// Summarize a forecast: total, peak and average of the predicted means
pub fn summarize(result: &ForecastResult) -> Result<ForecastSummary> {
    let points = result.points();
    let first = points.first().ok_or(Error::EmptyForecast)?;

    let mut total = 0.0;
    let mut peak = first.predicted_mean;
    let mut peak_date = first.date;
    for point in points {
        total += point.predicted_mean;
        // First occurrence wins on ties
        if point.predicted_mean > peak {
            peak = point.predicted_mean;
            peak_date = point.date;
        }
    }

    let rows = points
        .iter()
        .map(|p| ForecastRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            predicted_mean: p.predicted_mean,
            lower_bound: p.lower,
            upper_bound: p.upper,
        })
        .collect();

    Ok(ForecastSummary {
        total,
        peak,
        peak_date,
        average: total / points.len() as f64,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastPoint;
    use crate::test_utils::test_date;

    fn result(means: &[f64]) -> ForecastResult {
        let points = means
            .iter()
            .enumerate()
            .map(|(i, &m)| ForecastPoint {
                date: test_date(2024, 7, 1 + i as u32),
                predicted_mean: m,
                lower: m - 5.0,
                upper: m + 5.0,
            })
            .collect();
        ForecastResult::new(0.95, points, vec![])
    }

    #[test]
    fn test_summarize_statistics() {
        let summary = summarize(&result(&[10.0, 40.0, 25.0, 40.0])).unwrap();
        assert!((summary.total() - 115.0).abs() < 1e-9);
        assert_eq!(summary.peak(), 40.0);
        assert_eq!(summary.peak_date, test_date(2024, 7, 2));
        assert!((summary.average() - 28.75).abs() < 1e-9);
    }

    #[test]
    fn test_rows_preserve_order_and_iso_dates() {
        let summary = summarize(&result(&[1.5, 2.5])).unwrap();
        assert_eq!(
            summary.rows,
            vec![
                ForecastRow {
                    date: "2024-07-01".to_string(),
                    predicted_mean: 1.5,
                    lower_bound: -3.5,
                    upper_bound: 6.5,
                },
                ForecastRow {
                    date: "2024-07-02".to_string(),
                    predicted_mean: 2.5,
                    lower_bound: -2.5,
                    upper_bound: 7.5,
                },
            ]
        );
    }

    #[test]
    fn test_negative_means() {
        let summary = summarize(&result(&[-3.0, -1.0, -2.0])).unwrap();
        assert_eq!(summary.peak(), -1.0);
        assert!((summary.average() + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_accessors_match_rows() {
        let summary = summarize(&result(&[4.0, 8.0, 6.0])).unwrap();
        assert_eq!(summary.total(), 18.0);
        assert_eq!(summary.peak(), 8.0);
        assert_eq!(summary.peak_date(), test_date(2024, 7, 2));
        assert_eq!(summary.average(), 6.0);
        assert_eq!(summary.rows().len(), 3);
        assert_eq!(summary.rows()[1].date, "2024-07-02");

        // Private fields keep their names in the JSON payload
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 18.0);
        assert_eq!(json["peak_date"], "2024-07-02");
        assert_eq!(json["rows"][2]["predicted_mean"], 6.0);
    }

    #[test]
    fn test_empty_result() {
        assert!(matches!(summarize(&result(&[])), Err(Error::EmptyForecast)));
    }
}
