// src/main.rs
mod extractors;
mod report;
mod storage;
mod utils;

use clap::Parser;
use extractors::spending::SpendingExtractor;
use report::rows::ReportRows;
use std::path::PathBuf;
use storage::{OutputTarget, StorageManager};
use utils::AppError;

/// Command Line Interface for the Charge Card Usage report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report year, e.g. 2025
    #[arg(short, long)]
    year: u32,

    /// Report month, by name ("January") or number (1-12)
    #[arg(short, long)]
    month: String,

    /// Write extracted records to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write extracted records to this SQLite database
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Use this report document instead of the {year}-{Month}.pdf convention
    #[arg(short, long)]
    report: Option<PathBuf>,
}

/// Accepts a month by name ("January") or number ("1"), returning the
/// capitalized name the report URLs and file names use.
fn month_name(month: &str) -> Result<String, AppError> {
    if let Ok(n) = month.parse::<u8>() {
        let m = chrono::Month::try_from(n)
            .map_err(|_| AppError::Config(format!("Invalid month number: {}", month)))?;
        return Ok(m.name().to_string());
    }
    let mut chars = month.chars();
    match chars.next() {
        Some(first) => {
            Ok(first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase())
        }
        None => Err(AppError::Config("Month must not be empty".to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction run for args: {:?}", args);

    // 3. Resolve the output destination before touching any input (fail fast)
    let target = OutputTarget::resolve(args.csv.clone(), args.sqlite.clone())?;
    let month = month_name(&args.month)?;

    // 4. Locate the report document, downloading only if absent
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}-{}.pdf", args.year, month)));
    if report_path.exists() {
        tracing::info!("Using existing report {}", report_path.display());
    } else {
        report::client::download_report(args.year, &month, &report_path).await?;
    }

    // 5. Extract records in a single pass over the row stream
    let rows = ReportRows::open(&report_path)?;
    let extractor = SpendingExtractor::new();
    let records = extractor.extract(rows);

    // 6. Persist the collection
    let storage = StorageManager::new();
    let written = storage.save(&records, &target)?;
    tracing::info!("Extraction finished: {} records -> {}", records.len(), written.display());

    let summary = serde_json::json!({
        "year": args.year,
        "month": month,
        "records": records.len(),
        "output": written,
    });
    println!("{}", summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_name_accepts_names_and_numbers() {
        assert_eq!(month_name("January").unwrap(), "January");
        assert_eq!(month_name("january").unwrap(), "January");
        assert_eq!(month_name("1").unwrap(), "January");
        assert_eq!(month_name("12").unwrap(), "December");
    }

    #[test]
    fn month_name_rejects_out_of_range_and_empty() {
        assert!(month_name("0").is_err());
        assert!(month_name("13").is_err());
        assert!(month_name("").is_err());
    }
}
