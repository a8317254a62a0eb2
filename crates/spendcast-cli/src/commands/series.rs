//! Daily series command implementation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::import::load_and_aggregate;

pub fn cmd_series(file: &Path, limit: usize) -> Result<()> {
    let reader = File::open(file)
        .with_context(|| format!("Failed to open ledger: {}", file.display()))?;
    let series = load_and_aggregate(BufReader::new(reader))
        .with_context(|| format!("Failed to read ledger: {}", file.display()))?;

    println!();
    println!("📅 Daily Expenses");
    println!(
        "   {} days from {} to {} ({} days without transactions)",
        series.len(),
        series.first_date(),
        series.last_date(),
        series.missing_days()
    );
    println!("   Total: ${:.2}", series.total());
    println!();

    let shown = series.tail(limit);
    if shown.len() < series.len() {
        println!("   Showing the last {} days:", shown.len());
    }
    println!("   {:10} │ {:>10}", "Date", "Amount");
    println!("   ───────────┼────────────");
    for point in shown {
        println!("   {:10} │ {:>10.2}", point.date.to_string(), point.amount);
    }

    Ok(())
}
