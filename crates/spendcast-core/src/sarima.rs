//! Seasonal ARIMA estimation
//!
//! Fits SARIMA(p,d,q)(P,D,Q,s) models by conditional sum of squares (CSS):
//!
//! 1. The series is differenced with (1-B)^d (1-B^s)^D
//! 2. AR and MA polynomials are built from the multiplicative seasonal form
//! 3. The CSS of the one-step residuals is minimized with argmin's Nelder-Mead
//!
//! Coefficients are searched in an unconstrained space and mapped through the
//! partial-autocorrelation transform, so every candidate model is stationary
//! and invertible. Forecasting uses the fitted polynomials (see `forecast`).

use std::fmt;

use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::DailyExpenseSeries;

/// Largest AR/MA order accepted for either component
pub const MAX_ARMA_ORDER: usize = 5;

/// Largest differencing order accepted for either component
pub const MAX_DIFF_ORDER: usize = 2;

/// Solver iteration budget
const MAX_ITERS: u64 = 10_000;

/// Standard deviation of simplex costs at which the solver stops
const SD_TOLERANCE: f64 = 1e-10;

/// Cost returned for numerically broken candidates
const PENALTY: f64 = 1e10;

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal order (P, D, Q, s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// Human-readable cycle length for dashboards
    pub fn period_label(&self) -> String {
        match self.period {
            7 => "7 Days (Weekly)".to_string(),
            1 => "1 Day".to_string(),
            n => format!("{} Days", n),
        }
    }
}

impl Default for SeasonalOrder {
    fn default() -> Self {
        Self::new(1, 1, 1, 7)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.period)
    }
}

/// Check that the orders are within the supported range
pub fn validate_orders(order: ArimaOrder, seasonal: SeasonalOrder) -> Result<()> {
    if seasonal.period == 0 {
        return Err(Error::invalid_parameter(
            "seasonal_order",
            "seasonal period must be greater than 0",
        ));
    }

    for (name, value) in [
        ("p", order.p),
        ("q", order.q),
        ("P", seasonal.p),
        ("Q", seasonal.q),
    ] {
        if value > MAX_ARMA_ORDER {
            return Err(Error::invalid_parameter(
                name,
                format!("order must be <= {}", MAX_ARMA_ORDER),
            ));
        }
    }

    for (name, value) in [("d", order.d), ("D", seasonal.d)] {
        if value > MAX_DIFF_ORDER {
            return Err(Error::invalid_parameter(
                name,
                format!("differencing order must be <= {}", MAX_DIFF_ORDER),
            ));
        }
    }

    Ok(())
}

/// Minimum series length for a fit with these orders.
///
/// The series must be longer than the seasonal period, and after differencing
/// and conditioning on the first AR lags there must be more residuals left
/// than free coefficients.
pub fn min_observations(order: ArimaOrder, seasonal: SeasonalOrder) -> usize {
    let diff_lags = order.d + seasonal.d * seasonal.period;
    let ar_lags = order.p + seasonal.p * seasonal.period;
    let n_params = order.p + order.q + seasonal.p + seasonal.q;
    (diff_lags + ar_lags + n_params + 1).max(seasonal.period + 1)
}

/// Multiply two polynomials given by coefficients in ascending powers of B
fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// 1 + sign * sum(c_i B^(i*stride))
fn lag_polynomial(coeffs: &[f64], stride: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coeffs.len() * stride + 1];
    poly[0] = 1.0;
    for (i, &c) in coeffs.iter().enumerate() {
        poly[(i + 1) * stride] = sign * c;
    }
    poly
}

/// (1-B)^d (1-B^s)^D
pub(crate) fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    let seasonal_step = lag_polynomial(&[1.0], period, -1.0);
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &seasonal_step);
    }
    poly
}

/// Apply a differencing polynomial; output is shorter by `poly.len() - 1`
fn apply_differencing(values: &[f64], poly: &[f64]) -> Vec<f64> {
    let lags = poly.len() - 1;
    (lags..values.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * values[t - k]).sum())
        .collect()
}

/// Map unconstrained reals to the coefficients of a stationary AR polynomial.
///
/// Each input becomes a partial autocorrelation in (-1, 1) via tanh, and the
/// Durbin-Levinson recursion turns those into AR coefficients.
fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let n = unconstrained.len();
    let mut phi = vec![0.0; n];
    let mut prev = vec![0.0; n];
    for k in 0..n {
        let r = unconstrained[k].tanh();
        phi[k] = r;
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        prev[..=k].copy_from_slice(&phi[..=k]);
    }
    phi
}

/// Coefficients of one candidate model
#[derive(Debug, Clone, PartialEq)]
struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn from_unconstrained(params: &[f64], order: ArimaOrder, seasonal: SeasonalOrder) -> Self {
        let (ar, rest) = params.split_at(order.p);
        let (ma, rest) = rest.split_at(order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(seasonal.p);

        let negate = |v: Vec<f64>| v.into_iter().map(|c| -c).collect::<Vec<_>>();

        Self {
            ar: constrain_stationary(ar),
            // Invertible MA: 1 + sum(theta B^i) shares the root condition of 1 - sum(phi B^i)
            ma: negate(constrain_stationary(ma)),
            seasonal_ar: constrain_stationary(seasonal_ar),
            seasonal_ma: negate(constrain_stationary(seasonal_ma)),
        }
    }

    /// phi(B) * Phi(B^s), with phi(B) = 1 - sum(phi_i B^i)
    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, period, -1.0),
        )
    }

    /// theta(B) * Theta(B^s), with theta(B) = 1 + sum(theta_i B^i)
    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, period, 1.0),
        )
    }
}

/// One-step residuals of an ARMA model with pre-sample shocks set to zero.
///
/// Residuals before the first full AR window stay zero.
fn css_residuals(w: &[f64], ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let start = ar_poly.len() - 1;
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = 0.0;
        for k in 1..ar_poly.len() {
            pred -= ar_poly[k] * w[t - k];
        }
        for k in 1..ma_poly.len().min(t + 1) {
            pred += ma_poly[k] * e[t - k];
        }
        e[t] = w[t] - pred;
    }
    e
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// CSS objective handed to the optimizer
struct CssObjective {
    w: Vec<f64>,
    order: ArimaOrder,
    seasonal: SeasonalOrder,
    /// Divides the CSS so costs are of order one
    scale: f64,
}

impl CssObjective {
    fn sse(&self, coeffs: &Coefficients) -> f64 {
        let ar_poly = coeffs.ar_polynomial(self.seasonal.period);
        let ma_poly = coeffs.ma_polynomial(self.seasonal.period);
        let start = ar_poly.len() - 1;
        let e = css_residuals(&self.w, &ar_poly, &ma_poly);
        sum_of_squares(&e[start..])
    }
}

impl CostFunction for CssObjective {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let coeffs = Coefficients::from_unconstrained(param, self.order, self.seasonal);
        let cost = self.sse(&coeffs) / self.scale;
        Ok(if cost.is_finite() { cost } else { PENALTY })
    }
}

/// A fitted SARIMA model.
///
/// Holds the estimated coefficients together with the training values, the
/// differenced series and its residuals, which forecasting continues from.
#[derive(Debug, Clone)]
pub struct FittedModel {
    order: ArimaOrder,
    seasonal_order: SeasonalOrder,
    coefficients: Coefficients,
    /// Mean removed from the series when no differencing is applied
    intercept: f64,
    sigma2: f64,
    n_obs: usize,
    iterations: u64,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    last_date: NaiveDate,
}

impl FittedModel {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal_order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ma
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Residual variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Number of residuals the CSS was computed over
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Length of the series the model was trained on
    pub fn training_len(&self) -> usize {
        self.history.len()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Number of estimated coefficients (excluding the variance)
    pub fn n_params(&self) -> usize {
        self.order.p + self.order.q + self.seasonal_order.p + self.seasonal_order.q
    }

    /// Gaussian log-likelihood at the CSS estimate; `None` for a perfect fit
    pub fn log_likelihood(&self) -> Option<f64> {
        if self.sigma2 <= 0.0 {
            return None;
        }
        let n = self.n_obs as f64;
        Some(-0.5 * n * ((2.0 * std::f64::consts::PI * self.sigma2).ln() + 1.0))
    }

    /// Akaike information criterion, counting the variance as a parameter
    pub fn aic(&self) -> Option<f64> {
        self.log_likelihood()
            .map(|ll| -2.0 * ll + 2.0 * (self.n_params() + 1) as f64)
    }

    /// Point predictions for the next `horizon` days on the original scale
    pub(crate) fn predict_means(&self, horizon: usize) -> Vec<f64> {
        let period = self.seasonal_order.period;
        let ar_poly = self.coefficients.ar_polynomial(period);
        let ma_poly = self.coefficients.ma_polynomial(period);

        let n = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        w.reserve(horizon);
        e.reserve(horizon);

        for _ in 0..horizon {
            let t = w.len();
            let mut pred = 0.0;
            for k in 1..ar_poly.len().min(t + 1) {
                pred -= ar_poly[k] * w[t - k];
            }
            for k in 1..ma_poly.len().min(t + 1) {
                pred += ma_poly[k] * e[t - k];
            }
            w.push(pred);
            // Future shocks have zero expectation
            e.push(0.0);
        }

        // Undo the differencing: y_t = w_t - sum(delta_k y_{t-k})
        let delta =
            differencing_polynomial(self.order.d, self.seasonal_order.d, period);
        let n_hist = self.history.len();
        let mut y = self.history.clone();
        y.reserve(horizon);
        for &wf in &w[n..] {
            let t = y.len();
            let mut value = wf + self.intercept;
            for k in 1..delta.len() {
                value -= delta[k] * y[t - k];
            }
            y.push(value);
        }

        y.split_off(n_hist)
    }

    /// MA(infinity) weights of the integrated model, psi_0 = 1
    pub(crate) fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let period = self.seasonal_order.period;
        let delta = differencing_polynomial(self.order.d, self.seasonal_order.d, period);
        let full_ar = poly_mul(&self.coefficients.ar_polynomial(period), &delta);
        let ma_poly = self.coefficients.ma_polynomial(period);

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = ma_poly.get(j).copied().unwrap_or(0.0);
            for k in 1..full_ar.len().min(j + 1) {
                value -= full_ar[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }
}

/// Fit a seasonal ARIMA model to a daily series
pub fn fit(
    series: &DailyExpenseSeries,
    order: ArimaOrder,
    seasonal_order: SeasonalOrder,
) -> Result<FittedModel> {
    validate_orders(order, seasonal_order)?;

    let required = min_observations(order, seasonal_order);
    if series.len() < required {
        return Err(Error::InsufficientData {
            required,
            actual: series.len(),
        });
    }

    let history = series.values();
    let delta = differencing_polynomial(order.d, seasonal_order.d, seasonal_order.period);
    let mut w = apply_differencing(&history, &delta);

    // Without differencing the series is centred; the mean is added back when forecasting
    let intercept = if delta.len() == 1 {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        w.iter_mut().for_each(|v| *v -= mean);
        mean
    } else {
        0.0
    };

    let n_params = order.p + order.q + seasonal_order.p + seasonal_order.q;
    let scale = {
        let mean_square = sum_of_squares(&w) / w.len() as f64;
        if mean_square > 1e-12 {
            mean_square
        } else {
            1.0
        }
    };

    debug!(
        "Fitting SARIMA{}{} on {} observations ({} after differencing)",
        order,
        seasonal_order,
        series.len(),
        w.len()
    );

    let (params, iterations) = if n_params == 0 {
        (Vec::new(), 0)
    } else {
        let objective = CssObjective {
            w: w.clone(),
            order,
            seasonal: seasonal_order,
            scale,
        };
        minimize(objective, n_params, MAX_ITERS)?
    };

    let coefficients = Coefficients::from_unconstrained(&params, order, seasonal_order);
    let ar_poly = coefficients.ar_polynomial(seasonal_order.period);
    let ma_poly = coefficients.ma_polynomial(seasonal_order.period);
    let start = ar_poly.len() - 1;
    let residuals = css_residuals(&w, &ar_poly, &ma_poly);
    let n_obs = w.len() - start;
    let sigma2 = sum_of_squares(&residuals[start..]) / n_obs as f64;

    let all_finite = [
        &coefficients.ar,
        &coefficients.ma,
        &coefficients.seasonal_ar,
        &coefficients.seasonal_ma,
    ]
    .iter()
    .all(|c| c.iter().all(|v| v.is_finite()));

    if !all_finite || !sigma2.is_finite() {
        return Err(Error::FitConvergence(
            "estimation produced non-finite parameters".to_string(),
        ));
    }

    info!(
        "Fitted SARIMA{}{} in {} iterations (sigma2 = {:.4})",
        order, seasonal_order, iterations, sigma2
    );

    Ok(FittedModel {
        order,
        seasonal_order,
        coefficients,
        intercept,
        sigma2,
        n_obs,
        iterations,
        history,
        differenced: w,
        residuals,
        last_date: series.last_date(),
    })
}

/// Run Nelder-Mead over the unconstrained parameters
fn minimize(objective: CssObjective, n_params: usize, max_iters: u64) -> Result<(Vec<f64>, u64)> {
    let start = vec![0.1; n_params];
    let mut simplex = vec![start.clone()];
    for i in 0..n_params {
        let mut vertex = start.clone();
        vertex[i] += 0.5;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(SD_TOLERANCE)
        .map_err(|e| Error::FitConvergence(e.to_string()))?;

    let result = Executor::new(objective, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|e| Error::FitConvergence(e.to_string()))?;

    let state = result.state();
    let iterations = state.get_iter();

    match state.get_termination_reason() {
        Some(TerminationReason::SolverConverged) | Some(TerminationReason::TargetCostReached) => {}
        Some(reason) => {
            return Err(Error::FitConvergence(format!(
                "solver stopped after {} iterations: {:?}",
                iterations, reason
            )))
        }
        None => {
            return Err(Error::FitConvergence(
                "solver did not terminate".to_string(),
            ))
        }
    }

    let best_cost = state.get_best_cost();
    if !best_cost.is_finite() || best_cost >= PENALTY {
        return Err(Error::FitConvergence(format!(
            "no finite objective value found (best cost {})",
            best_cost
        )));
    }

    let params = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| Error::FitConvergence("solver returned no parameters".to_string()))?;

    Ok((params, iterations))
}
