//! Test utilities: deterministic synthetic ledgers
//!
//! Enabled for unit tests and, through the `test-utils` feature, for the
//! integration tests of the CLI and server crates.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::models::{DailyExpenseSeries, SeriesPoint};

/// Average spend per weekday, Monday first
const WEEKDAY_SPEND: [f64; 7] = [35.0, 20.0, 22.0, 25.0, 30.0, 80.0, 60.0];

/// Seeded standard normal draws, reproducible across runs
pub struct NoiseGenerator {
    rng: StdRng,
    normal: Normal<f64>,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            normal: Normal::new(0.0, 1.0).unwrap(),
        }
    }

    pub fn next_gaussian(&mut self) -> f64 {
        self.normal.sample(&mut self.rng)
    }
}

pub fn test_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Weekly-seasonal daily totals starting at `start`
pub fn weekly_amounts(days: usize, start: NaiveDate, seed: u64) -> Vec<(NaiveDate, f64)> {
    use chrono::Datelike;

    let mut noise = NoiseGenerator::new(seed);
    (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let weekday = date.weekday().num_days_from_monday() as usize;
            let trend = i as f64 * 0.05;
            let amount = (WEEKDAY_SPEND[weekday] + trend + 4.0 * noise.next_gaussian()).max(1.0);
            (date, (amount * 100.0).round() / 100.0)
        })
        .collect()
}

/// A synthetic ledger CSV in a Chase-like layout.
///
/// Each day is split into two transactions and every 19th day has none,
/// so the file exercises same-day grouping and gap handling.
pub fn synthetic_ledger_csv(days: usize, start: NaiveDate, seed: u64) -> String {
    let mut csv = String::from("Transaction Date,Description,Amount\n");
    for (i, (date, amount)) in weekly_amounts(days, start, seed).into_iter().enumerate() {
        if i % 19 == 18 {
            continue;
        }
        let first = (amount * 0.6 * 100.0).round() / 100.0;
        let second = ((amount - first) * 100.0).round() / 100.0;
        let day = date.format("%m/%d/%Y");
        csv.push_str(&format!("{},GROCERY STORE,\"${:.2}\"\n", day, first));
        csv.push_str(&format!("{},COFFEE SHOP,{:.2}\n", day, second));
    }
    csv
}

/// A gap-free weekly-seasonal series
pub fn synthetic_series(days: usize, start: NaiveDate, seed: u64) -> DailyExpenseSeries {
    let points = weekly_amounts(days, start, seed)
        .into_iter()
        .map(|(date, amount)| SeriesPoint { date, amount })
        .collect();
    DailyExpenseSeries::from_points(points).unwrap()
}

/// An AR(1) process around `mean`
pub fn ar1_series(
    days: usize,
    start: NaiveDate,
    phi: f64,
    mean: f64,
    seed: u64,
) -> DailyExpenseSeries {
    let mut noise = NoiseGenerator::new(seed);
    let mut level = 0.0;
    // Burn-in so the first value is drawn from the stationary distribution
    for _ in 0..200 {
        level = phi * level + noise.next_gaussian();
    }
    let points = (0..days)
        .map(|i| {
            level = phi * level + noise.next_gaussian();
            SeriesPoint {
                date: start + Duration::days(i as i64),
                amount: mean + level,
            }
        })
        .collect();
    DailyExpenseSeries::from_points(points).unwrap()
}

/// A series with the given values on consecutive days
pub fn series_from_values(start: NaiveDate, values: &[f64]) -> DailyExpenseSeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, &amount)| SeriesPoint {
            date: start + Duration::days(i as i64),
            amount,
        })
        .collect();
    DailyExpenseSeries::from_points(points).unwrap()
}
