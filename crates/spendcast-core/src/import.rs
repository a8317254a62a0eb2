//! CSV ledger import and daily aggregation

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{DailyExpenseSeries, SeriesPoint, TransactionRecord};

/// Header names accepted for the transaction date column
const DATE_ALIASES: &[&str] = &[
    "date",
    "transaction date",
    "trans date",
    "posted date",
    "post date",
    "posting date",
    "transaction_date",
];

/// Header names accepted for the amount column
const AMOUNT_ALIASES: &[&str] = &["amount", "transaction amount", "amt", "daily_expense"];

/// Where the amount of a row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountSource {
    Single(usize),
    /// Separate debit and credit columns: amount = credit - debit
    DebitCredit { debit: usize, credit: usize },
}

/// Resolved column positions for a ledger file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    amount: AmountSource,
}

/// Lowercase and trim a header, collapsing inner whitespace runs
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    // Alias order is priority order, so "date" wins over "post date"
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let date = find_column(&normalized, DATE_ALIASES)
            .ok_or_else(|| Error::MissingColumn("date".to_string()))?;

        let amount = match find_column(&normalized, AMOUNT_ALIASES) {
            Some(idx) => AmountSource::Single(idx),
            None => {
                let debit = find_column(&normalized, &["debit"]);
                let credit = find_column(&normalized, &["credit"]);
                match (debit, credit) {
                    (Some(debit), Some(credit)) => AmountSource::DebitCredit { debit, credit },
                    _ => return Err(Error::MissingColumn("amount".to_string())),
                }
            }
        };

        Ok(Self { date, amount })
    }
}

/// Read ledger rows from CSV, normalizing the header names
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::resolve(rdr.headers()?)?;
    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result?;
        // Header is line 1
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let date_str = record.get(columns.date).unwrap_or("");
        let date = parse_date(date_str).ok_or_else(|| Error::Parse {
            line,
            column: "date".to_string(),
            value: date_str.to_string(),
        })?;

        let amount = match columns.amount {
            AmountSource::Single(idx) => {
                let amount_str = record.get(idx).unwrap_or("");
                parse_amount(amount_str).ok_or_else(|| Error::Parse {
                    line,
                    column: "amount".to_string(),
                    value: amount_str.to_string(),
                })?
            }
            AmountSource::DebitCredit { debit, credit } => {
                let debit = parse_optional_amount(&record, debit, "debit", line)?;
                let credit = parse_optional_amount(&record, credit, "credit", line)?;
                credit - debit
            }
        };

        records.push(TransactionRecord::new(date, amount));
    }

    debug!("Parsed {} transactions", records.len());
    Ok(records)
}

/// Empty debit/credit cells count as zero
fn parse_optional_amount(record: &StringRecord, idx: usize, column: &str, line: u64) -> Result<f64> {
    let value = record.get(idx).unwrap_or("");
    if value.is_empty() {
        return Ok(0.0);
    }
    parse_amount(value).ok_or_else(|| Error::Parse {
        line,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Group records by date and sum the amounts
pub fn aggregate_daily(records: &[TransactionRecord]) -> Result<DailyExpenseSeries> {
    if records.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date).or_insert(0.0) += record.amount;
    }

    let points = totals
        .into_iter()
        .map(|(date, amount)| SeriesPoint { date, amount })
        .collect();

    let series = DailyExpenseSeries::from_points(points)?;
    debug!(
        "Aggregated {} transactions into {} days ({} to {})",
        records.len(),
        series.len(),
        series.first_date(),
        series.last_date()
    );
    Ok(series)
}

/// Read a CSV ledger and aggregate it into a daily expense series
pub fn load_and_aggregate<R: Read>(reader: R) -> Result<DailyExpenseSeries> {
    let records = read_transactions(reader)?;
    aggregate_daily(&records)
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            // chrono's %Y also takes "24"; only %y may produce a short year
            if fmt.contains("%Y") && date.year() < 100 {
                continue;
            }
            return Some(date);
        }
    }

    // Timestamps: keep the calendar date
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
