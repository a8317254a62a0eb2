//! Point forecasts and confidence bands from a fitted model

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sarima::FittedModel;

/// Default two-sided confidence level
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Raised when a band had to be clamped around its mean.
///
/// Non-fatal: the point is kept with `lower <= mean <= upper` restored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundInversionWarning {
    pub date: NaiveDate,
    pub predicted_mean: f64,
    pub original_lower: f64,
    pub original_upper: f64,
}

/// Forecast for consecutive days following the training series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    confidence: f64,
    points: Vec<ForecastPoint>,
    warnings: Vec<BoundInversionWarning>,
}

impl ForecastResult {
    pub(crate) fn new(
        confidence: f64,
        points: Vec<ForecastPoint>,
        warnings: Vec<BoundInversionWarning>,
    ) -> Self {
        Self {
            confidence,
            points,
            warnings,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Days whose bands were clamped around the mean
    pub fn warnings(&self) -> &[BoundInversionWarning] {
        &self.warnings
    }

    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn forecast_index(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn predicted_mean(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_mean).collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lower).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.upper).collect()
    }
}

/// `horizon` consecutive days starting the day after `last_date`
pub fn forecast_index(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|i| last_date + Duration::days(i))
        .collect()
}

/// Standard normal quantile for a two-sided interval
fn z_score(confidence: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| Error::invalid_parameter("confidence", e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + confidence) / 2.0))
}

/// Restore lower <= mean <= upper, returning a warning when anything moved
fn enforce_bounds(point: &mut ForecastPoint) -> Option<BoundInversionWarning> {
    let ordered = point.lower <= point.predicted_mean && point.predicted_mean <= point.upper;
    if ordered {
        return None;
    }

    let warning = BoundInversionWarning {
        date: point.date,
        predicted_mean: point.predicted_mean,
        original_lower: point.lower,
        original_upper: point.upper,
    };

    let (lo, hi) = if point.lower <= point.upper {
        (point.lower, point.upper)
    } else {
        (point.upper, point.lower)
    };
    point.lower = if lo <= point.predicted_mean { lo } else { point.predicted_mean };
    point.upper = if hi >= point.predicted_mean { hi } else { point.predicted_mean };

    warn!(
        date = %warning.date,
        mean = warning.predicted_mean,
        lower = warning.original_lower,
        upper = warning.original_upper,
        "Forecast bounds inverted; clamped around the mean"
    );
    Some(warning)
}

/// Forecast `horizon` days ahead with a two-sided band at `confidence`
pub fn forecast(model: &FittedModel, horizon: usize, confidence: f64) -> Result<ForecastResult> {
    if horizon == 0 {
        return Err(Error::EmptyForecast);
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(Error::invalid_parameter(
            "confidence",
            format!("must be between 0 and 1 (exclusive), got {}", confidence),
        ));
    }

    let z = z_score(confidence)?;
    let means = model.predict_means(horizon);
    let psi = model.psi_weights(horizon);
    let dates = forecast_index(model.last_date(), horizon);

    let mut cumulative = 0.0;
    let mut points = Vec::with_capacity(horizon);
    let mut warnings = Vec::new();

    for ((date, mean), weight) in dates.into_iter().zip(means).zip(psi) {
        cumulative += weight * weight;
        let half_width = z * (model.sigma2() * cumulative).sqrt();

        let mut point = ForecastPoint {
            date,
            predicted_mean: mean,
            lower: mean - half_width,
            upper: mean + half_width,
        };
        if let Some(warning) = enforce_bounds(&mut point) {
            warnings.push(warning);
        }
        points.push(point);
    }

    debug!(
        "Forecast {} days from {} at {:.0}% confidence ({} bound warnings)",
        horizon,
        points[0].date,
        confidence * 100.0,
        warnings.len()
    );

    Ok(ForecastResult::new(confidence, points, warnings))
}
