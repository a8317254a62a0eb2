//! Integration tests for spendcast-core
//!
//! These tests exercise the full load → fit → forecast → summarize → export workflow.

use chrono::{Datelike, Duration, NaiveDate};
use spendcast_core::{
    export::{forecast_csv, parse_forecast_csv},
    forecast::forecast,
    import::{aggregate_daily, load_and_aggregate, read_transactions},
    sarima::{fit, ArimaOrder, SeasonalOrder},
    summary::summarize,
    Error, ForecastConfig, ForecastPipeline, GapPolicy,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A ledger with weekend-heavy spending and a small wobble, ending on `end`
fn weekly_ledger(days: i64, end: NaiveDate) -> String {
    let weekday_spend = [32.0, 18.5, 21.0, 24.0, 29.5, 78.0, 61.0];
    let start = end - Duration::days(days - 1);

    let mut csv = String::from("Date,Description,Amount\n");
    for i in 0..days {
        let day = start + Duration::days(i);
        let base = weekday_spend[day.weekday().num_days_from_monday() as usize];
        let wobble = ((i * 37) % 11) as f64 - 5.0;
        let amount = base + wobble;
        csv.push_str(&format!("{},LUNCH,{:.2}\n", day, amount * 0.3));
        csv.push_str(&format!("{},GROCERIES,\"${:.2}\"\n", day, amount * 0.7));
    }
    csv
}

// =============================================================================
// Loader
// =============================================================================

#[test]
fn test_same_day_rows_collapse() {
    let csv = "Date,Amount\n2024-01-01,$10.00\n2024-01-01,$10.00\n";
    let series = load_and_aggregate(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.points()[0].date, date(2024, 1, 1));
    assert!((series.points()[0].amount - 20.0).abs() < 1e-9);
}

#[test]
fn test_series_is_sorted_and_sums_input() {
    let csv = "Transaction Date,Amount\n03/05/2024,4.50\n03/01/2024,10\n03/03/2024,(2.25)\n03/01/2024,1\n";
    let records = read_transactions(csv.as_bytes()).unwrap();
    let series = aggregate_daily(&records).unwrap();

    let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 3), date(2024, 3, 5)]);

    let input: f64 = records.iter().map(|r| r.amount).sum();
    assert!((series.total() - input).abs() < 1e-9);
}

#[test]
fn test_empty_ledger_fails_before_fitting() {
    let result = ForecastPipeline::default().run("date,amount\n".as_bytes());
    assert!(matches!(result, Err(Error::EmptyInput)));
}

// =============================================================================
// Model and forecast
// =============================================================================

#[test]
fn test_five_days_is_insufficient_for_weekly_model() {
    let csv = weekly_ledger(5, date(2024, 1, 5));
    let series = load_and_aggregate(csv.as_bytes()).unwrap();

    let result = fit(&series, ArimaOrder::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7));
    assert!(matches!(
        result,
        Err(Error::InsufficientData { actual: 5, .. })
    ));
}

#[test]
fn test_forecast_starts_day_after_training() {
    let csv = weekly_ledger(112, date(2024, 6, 30));
    let series = load_and_aggregate(csv.as_bytes()).unwrap();
    let model = fit(&series, ArimaOrder::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7)).unwrap();

    let result = forecast(&model, 30, 0.95).unwrap();
    assert_eq!(result.points().len(), 30);
    assert_eq!(result.points()[0].date, date(2024, 7, 1));
    assert_eq!(result.points()[29].date, date(2024, 7, 30));
    for p in result.points() {
        assert!(p.lower <= p.predicted_mean && p.predicted_mean <= p.upper);
    }
}

#[test]
fn test_weekly_pattern_is_forecast() {
    let csv = weekly_ledger(140, date(2024, 6, 30));
    let output = ForecastPipeline::new(ForecastConfig::default().with_horizon(14))
        .run(csv.as_bytes())
        .unwrap();

    // Saturdays should be forecast well above Tuesdays
    let mean_on = |weekday: chrono::Weekday| {
        let values: Vec<f64> = output
            .result
            .points()
            .iter()
            .filter(|p| p.date.weekday() == weekday)
            .map(|p| p.predicted_mean)
            .collect();
        values.iter().sum::<f64>() / values.len() as f64
    };
    assert!(mean_on(chrono::Weekday::Sat) > mean_on(chrono::Weekday::Tue) + 20.0);
}

// =============================================================================
// Summary and export
// =============================================================================

#[test]
fn test_summary_total_matches_means() {
    let csv = weekly_ledger(90, date(2024, 3, 31));
    let output = ForecastPipeline::default().run(csv.as_bytes()).unwrap();

    let total: f64 = output.result.predicted_mean().iter().sum();
    assert!((output.summary.total() - total).abs() < 1e-9);
    assert!(output.summary.peak() >= output.summary.average());
    assert_eq!(output.metrics.projected_total, output.summary.total());
}

#[test]
fn test_csv_export_round_trip() {
    let csv = weekly_ledger(90, date(2024, 3, 31));
    let series = load_and_aggregate(csv.as_bytes()).unwrap();
    let model = fit(&series, ArimaOrder::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7)).unwrap();
    let summary = summarize(&forecast(&model, 21, 0.95).unwrap()).unwrap();

    let exported = forecast_csv(&summary).unwrap();
    assert!(exported.starts_with("date,predicted_mean,lower_bound,upper_bound\n"));

    let rows = parse_forecast_csv(exported.as_bytes()).unwrap();
    assert_eq!(rows.len(), summary.rows().len());
    for (parsed, original) in rows.iter().zip(summary.rows()) {
        assert_eq!(parsed.date, original.date);
        assert!((parsed.predicted_mean - original.predicted_mean).abs() <= 0.005 + 1e-9);
        assert!((parsed.lower_bound - original.lower_bound).abs() <= 0.005 + 1e-9);
        assert!((parsed.upper_bound - original.upper_bound).abs() <= 0.005 + 1e-9);
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_gap_policy_changes_training_series() {
    // Thursdays never have transactions
    let csv: String = weekly_ledger(120, date(2024, 6, 30))
        .lines()
        .filter(|line| {
            line.split(',')
                .next()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .map_or(true, |d| d.weekday() != chrono::Weekday::Thu)
        })
        .map(|line| format!("{}\n", line))
        .collect();

    let zero_filled = ForecastPipeline::default().run(csv.as_bytes()).unwrap();
    assert_eq!(zero_filled.series.len(), 120);
    assert_eq!(zero_filled.series.missing_days(), 0);

    let config = ForecastConfig {
        gap_policy: GapPolicy::AsObserved,
        ..ForecastConfig::default()
    };
    let observed = ForecastPipeline::new(config).run(csv.as_bytes()).unwrap();
    assert!(observed.series.len() < 120);
    assert_eq!(observed.result.points()[0].date, date(2024, 7, 1));
}

#[test]
fn test_run_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    std::fs::write(&path, weekly_ledger(60, date(2024, 2, 29))).unwrap();

    let output = ForecastPipeline::default().run_file(&path).unwrap();
    assert_eq!(output.result.points()[0].date, date(2024, 3, 1));

    let missing = ForecastPipeline::default().run_file(&dir.path().join("missing.csv"));
    assert!(matches!(missing, Err(Error::Io(_))));
}
