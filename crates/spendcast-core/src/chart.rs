//! Chart definition and dashboard metrics handed to the presentation layer

use chrono::NaiveDate;
use serde::Serialize;

use crate::forecast::ForecastResult;
use crate::models::DailyExpenseSeries;
use crate::sarima::FittedModel;
use crate::summary::ForecastSummary;

/// History shown on the chart by default
pub const DEFAULT_HISTORY_WINDOW: usize = 60;

/// Dashboard label for the model family; no exogenous regressors are fitted
pub const ALGORITHM_NAME: &str = "SARIMAX";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Shaded confidence region for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// Everything needed to draw history, forecast and band in one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDefinition {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub confidence: f64,
    pub history: Vec<ChartPoint>,
    pub forecast: Vec<ChartPoint>,
    pub band: Vec<BandPoint>,
}

/// Scalar cards shown above the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub algorithm: String,
    pub seasonal_period: String,
    pub last_daily_spend: f64,
    pub projected_total: f64,
    pub peak: f64,
    pub peak_date: NaiveDate,
    pub average: f64,
}

/// Build the chart from the training series and a forecast.
///
/// Only the `history_window` most recent observations are included.
pub fn build_chart(
    series: &DailyExpenseSeries,
    result: &ForecastResult,
    history_window: usize,
) -> ChartDefinition {
    let history = series
        .tail(history_window)
        .iter()
        .map(|p| ChartPoint {
            date: p.date,
            value: p.amount,
        })
        .collect();

    let forecast = result
        .points()
        .iter()
        .map(|p| ChartPoint {
            date: p.date,
            value: p.predicted_mean,
        })
        .collect();

    let band = result
        .points()
        .iter()
        .map(|p| BandPoint {
            date: p.date,
            lower: p.lower,
            upper: p.upper,
        })
        .collect();

    ChartDefinition {
        title: format!("Daily Spending: History and {}-Day Forecast", result.horizon()),
        x_label: "Date".to_string(),
        y_label: "Daily Spend".to_string(),
        confidence: result.confidence(),
        history,
        forecast,
        band,
    }
}

pub fn dashboard_metrics(
    series: &DailyExpenseSeries,
    model: &FittedModel,
    summary: &ForecastSummary,
) -> DashboardMetrics {
    DashboardMetrics {
        algorithm: ALGORITHM_NAME.to_string(),
        seasonal_period: model.seasonal_order().period_label(),
        last_daily_spend: series.last_amount(),
        projected_total: summary.total(),
        peak: summary.peak(),
        peak_date: summary.peak_date(),
        average: summary.average(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::forecast;
    use crate::sarima::{fit, ArimaOrder, SeasonalOrder};
    use crate::summary::summarize;
    use crate::test_utils::{synthetic_series, test_date};

    #[test]
    fn test_chart_history_is_bounded() {
        let series = synthetic_series(100, test_date(2024, 1, 1), 3);
        let model = fit(&series, ArimaOrder::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7)).unwrap();
        let result = forecast(&model, 14, 0.95).unwrap();

        let chart = build_chart(&series, &result, DEFAULT_HISTORY_WINDOW);
        assert_eq!(chart.history.len(), 60);
        assert_eq!(chart.history.last().unwrap().date, series.last_date());
        assert_eq!(chart.forecast.len(), 14);
        assert_eq!(chart.band.len(), 14);
        assert_eq!(chart.band[0].date, chart.forecast[0].date);
        assert!(chart.history.last().unwrap().date < chart.forecast[0].date);
        assert!(chart.title.contains("14-Day"));

        let short = build_chart(&series, &result, 500);
        assert_eq!(short.history.len(), 100);
    }

    #[test]
    fn test_dashboard_metrics() {
        let series = synthetic_series(60, test_date(2024, 1, 1), 5);
        let model = fit(&series, ArimaOrder::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7)).unwrap();
        let summary = summarize(&forecast(&model, 30, 0.95).unwrap()).unwrap();

        let metrics = dashboard_metrics(&series, &model, &summary);
        assert_eq!(metrics.algorithm, "SARIMAX");
        assert_eq!(metrics.seasonal_period, "7 Days (Weekly)");
        assert_eq!(metrics.last_daily_spend, series.last_amount());
        assert_eq!(metrics.projected_total, summary.total());
        assert_eq!(metrics.peak, summary.peak());
    }

    #[test]
    fn test_chart_serializes_iso_dates() {
        let series = synthetic_series(30, test_date(2024, 6, 1), 9);
        let model = fit(&series, ArimaOrder::new(0, 1, 1), SeasonalOrder::new(0, 1, 1, 7)).unwrap();
        let result = forecast(&model, 7, 0.9).unwrap();
        let json = serde_json::to_value(build_chart(&series, &result, 60)).unwrap();

        assert_eq!(json["forecast"][0]["date"], "2024-07-01");
        assert_eq!(json["confidence"], 0.9);
    }
}
