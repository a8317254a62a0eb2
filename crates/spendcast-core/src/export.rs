//! CSV export of the forecast table
//!
//! Format: header `date,predicted_mean,lower_bound,upper_bound`, one row per
//! forecast day, amounts with two decimals.

use std::io::Read;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::error::{Error, Result};
use crate::summary::{ForecastRow, ForecastSummary};

/// Header row of the exported table
pub const CSV_HEADER: [&str; 4] = ["date", "predicted_mean", "lower_bound", "upper_bound"];

/// Suggested file name for downloads
pub const EXPORT_FILENAME: &str = "forecast.csv";

fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Render the forecast table as UTF-8 CSV text
pub fn forecast_csv(summary: &ForecastSummary) -> Result<String> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for row in summary.rows() {
        wtr.write_record([
            row.date.clone(),
            format_amount(row.predicted_mean),
            format_amount(row.lower_bound),
            format_amount(row.upper_bound),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Read a forecast table written by [`forecast_csv`]
pub fn parse_forecast_csv<R: Read>(reader: R) -> Result<Vec<ForecastRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?;
    for column in CSV_HEADER {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: ForecastRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{ForecastPoint, ForecastResult};
    use crate::summary::summarize;
    use crate::test_utils::test_date;

    fn summary() -> ForecastSummary {
        let points = vec![
            ForecastPoint {
                date: test_date(2024, 7, 1),
                predicted_mean: 9.877,
                lower: -1.0,
                upper: 20.5,
            },
            ForecastPoint {
                date: test_date(2024, 7, 2),
                predicted_mean: 20.123,
                lower: 10.004,
                upper: 30.0,
            },
        ];
        summarize(&ForecastResult::new(0.95, points, vec![])).unwrap()
    }

    #[test]
    fn test_forecast_csv_layout() {
        let csv = forecast_csv(&summary()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,predicted_mean,lower_bound,upper_bound");
        assert_eq!(lines[1], "2024-07-01,9.88,-1.00,20.50");
        assert_eq!(lines[2], "2024-07-02,20.12,10.00,30.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_parse_forecast_csv_reads_export() {
        let csv = forecast_csv(&summary()).unwrap();
        let rows = parse_forecast_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].date, "2024-07-02");
        assert_eq!(rows[1].predicted_mean, 20.12);
        assert_eq!(rows[1].lower_bound, 10.0);
    }

    #[test]
    fn test_parse_forecast_csv_missing_column() {
        let result = parse_forecast_csv("date,predicted_mean\n2024-07-01,1.00\n".as_bytes());
        assert!(matches!(result, Err(Error::MissingColumn(ref c)) if c == "lower_bound"));
    }

    #[test]
    fn test_parse_forecast_csv_bad_value() {
        let csv = "date,predicted_mean,lower_bound,upper_bound\n2024-07-01,abc,0,1\n";
        assert!(matches!(parse_forecast_csv(csv.as_bytes()), Err(Error::Csv(_))));
    }
}
