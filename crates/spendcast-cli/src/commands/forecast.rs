//! Forecast command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{ForecastConfig, PipelineOutput};

use super::run_pipeline;

pub fn cmd_forecast(file: &Path, config: ForecastConfig, json: bool) -> Result<()> {
    let output = run_pipeline(file, config)?;

    if json {
        let report = serde_json::to_string_pretty(&output.report())
            .context("Failed to serialize forecast report")?;
        println!("{}", report);
        return Ok(());
    }

    print_report(&output);
    Ok(())
}

fn print_report(output: &PipelineOutput) {
    let metrics = &output.metrics;
    let model = &output.model;

    println!();
    println!("📈 Daily Spending Forecast");
    println!(
        "   Model: {}{}{} ({} iterations)",
        metrics.algorithm,
        model.order(),
        model.seasonal_order(),
        model.iterations()
    );
    println!("   Seasonality: {}", metrics.seasonal_period);
    println!(
        "   Training: {} days ({} to {})",
        output.series.len(),
        output.series.first_date(),
        output.series.last_date()
    );
    if let Some(aic) = model.aic() {
        println!("   AIC: {:.2}", aic);
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Last daily spend:   ${:>10.2}", metrics.last_daily_spend);
    println!(
        "   Projected total:    ${:>10.2}  ({} days)",
        metrics.projected_total,
        output.result.horizon()
    );
    println!(
        "   Peak day:           ${:>10.2}  ({})",
        metrics.peak, metrics.peak_date
    );
    println!("   Average per day:    ${:>10.2}", metrics.average);
    println!();

    let percent = output.result.confidence() * 100.0;
    println!(
        "   {:10} │ {:>10} │ {:>10} │ {:>10}",
        "Date",
        "Forecast",
        format!("Low {:.0}%", percent),
        format!("High {:.0}%", percent)
    );
    println!("   ───────────┼────────────┼────────────┼────────────");
    for row in output.summary.rows() {
        println!(
            "   {:10} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
            row.date, row.predicted_mean, row.lower_bound, row.upper_bound
        );
    }

    if !output.result.warnings().is_empty() {
        println!();
        println!(
            "   ⚠️  {} forecast band(s) were clamped around the mean",
            output.result.warnings().len()
        );
    }
}
