// src/extractors/spending.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Constants ---
const REPORT_TITLE: &str = "State Government Credit Card Usage Report";
const TABLE_HEADER: [&str; 4] = ["Card Holder", "Vendor Name", "Purchase Date", "Amount"];

// --- Regex Patterns (Lazy Static) ---
// Digit-only check applied after stripping the formatting characters a page
// number ("3", "12/68") or a running total ("$1,234.56") carries.
static ALL_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Failed to compile ALL_DIGITS_RE"));

// --- Data Structures ---

/// One extracted table row: ordered text cells, trailing cells may be empty.
/// A cell may contain embedded line breaks when the upstream layout
/// extractor merged adjacent source lines into one cell.
pub type RawRow = Vec<String>;

/// Classification tag for one raw row.
///
/// Variants are listed in the order `classify` tests them; the first match
/// wins, so the order encodes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Neutral value before the first row of a run has been seen.
    Start,
    Empty,
    PageTitle,
    PageNumber,
    TableHeader,
    CompanyTotal,
    PersonTotal,
    MultiLineCell,
    CardholderDollarLine,
    CompanyNameOnly,
    TransactionLine,
}

/// One normalized charge. Immutable once appended to the output collection.
/// Field order is the CSV column order and the SQLite column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingRecord {
    pub company: String,
    pub cardholder: String,
    pub vendor: String,
    /// Retained verbatim as text, never parsed into a calendar type.
    pub date: String,
    pub amount: f64,
}

/// Running context carried across rows during a single extraction pass.
/// One instance per run; discarded when the run ends.
#[derive(Debug)]
struct ParseContext {
    company: String,
    cardholder: String,
    previous: RowKind,
}

impl ParseContext {
    fn new() -> Self {
        Self {
            company: String::new(),
            cardholder: String::new(),
            previous: RowKind::Start,
        }
    }
}

// --- Row Classifier ---

/// Classifies one raw row. Pure; `previous` carries the only history the
/// classifier is allowed to see.
pub fn classify(row: &[String], previous: RowKind) -> RowKind {
    let first = row.first().map(String::as_str).unwrap_or("");

    if row.iter().all(|cell| cell.is_empty()) {
        return RowKind::Empty;
    }
    if first == REPORT_TITLE {
        return RowKind::PageTitle;
    }
    if ALL_DIGITS_RE.is_match(&first.replace(['/', ','], "")) {
        return RowKind::PageNumber;
    }
    if row.len() == 4 && row.iter().zip(TABLE_HEADER).all(|(cell, want)| cell == want) {
        return RowKind::TableHeader;
    }
    if first.contains("Total for") {
        return RowKind::CompanyTotal;
    }
    if row.len() >= 4
        && row[..3].iter().all(|cell| cell.is_empty())
        && ALL_DIGITS_RE.is_match(&row[3].replace(['$', ',', '.'], ""))
    {
        return RowKind::PersonTotal;
    }
    if first.contains('\n') {
        // Whether this introduces a company or a cardholder depends on the
        // previous row; that resolution happens in the state machine.
        tracing::trace!("Multi-line first cell after {:?}: {:?}", previous, first);
        return RowKind::MultiLineCell;
    }
    if row.len() == 4
        && row[1..].iter().all(|cell| cell.is_empty())
        && first.contains('$')
        && is_all_uppercase(first)
    {
        return RowKind::CardholderDollarLine;
    }
    if row.len() == 1 || row.len() == 2 || (row.len() == 4 && row[1..].iter().all(|cell| cell.is_empty()))
    {
        return RowKind::CompanyNameOnly;
    }
    RowKind::TransactionLine
}

/// True when `text` has at least one cased character and none of them are
/// lowercase. Digits and punctuation are ignored, so
/// "HOLLY PARK ... 01/06/2025 $767.30" qualifies.
fn is_all_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// "ABC DEF COMPANY 01/09/2025 ..." -> "ABC DEF"
fn name_from_line(line: &str) -> String {
    line.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Coerces "$1,234.56" to 1234.56. The only validation is numeric parse
/// after stripping the currency symbol and thousands separators.
fn dollar_amount(text: &str) -> Result<f64, ExtractError> {
    text.replace(['$', ','], "")
        .parse::<f64>()
        .map_err(|_| ExtractError::Amount(text.to_string()))
}

// --- Extraction State Machine ---

pub struct SpendingExtractor;

impl SpendingExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs the single-pass state machine over `rows` and returns the
    /// normalized records in row-stream order.
    ///
    /// A row that fails to convert (most commonly a malformed amount) is
    /// logged and dropped; its context, including the previous-row kind, is
    /// left untouched so one bad row never poisons the rows after it.
    pub fn extract<I>(&self, rows: I) -> Vec<SpendingRecord>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut ctx = ParseContext::new();
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (i, row) in rows.into_iter().enumerate() {
            match self.process_row(&mut ctx, &row) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Error processing row {} {:?}: {}", i + 1, row, e);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Dropped {} rows that failed to convert", skipped);
        }
        tracing::info!("Extracted {} spending records", records.len());
        records
    }

    /// Applies one row to the context, emitting at most one record.
    /// `ctx` is only mutated when the whole row converts cleanly.
    fn process_row(
        &self,
        ctx: &mut ParseContext,
        row: &[String],
    ) -> Result<Option<SpendingRecord>, ExtractError> {
        let kind = classify(row, ctx.previous);
        tracing::debug!("{:?}: {:?}", kind, row);

        let mut record = None;
        match kind {
            // Page furniture and totals carry no data of their own; they
            // matter only through `previous` on the next row.
            RowKind::Start
            | RowKind::Empty
            | RowKind::PageTitle
            | RowKind::PageNumber
            | RowKind::TableHeader
            | RowKind::CompanyTotal
            | RowKind::PersonTotal => {}
            RowKind::MultiLineCell => {
                let first_line = row[0].split('\n').next().unwrap_or("");
                if ctx.previous == RowKind::PersonTotal {
                    // A person's running total ends their block; the merged
                    // cell after it opens the next cardholder's block.
                    ctx.cardholder = name_from_line(first_line);
                    tracing::debug!("Cardholder from multi-line cell: {}", ctx.cardholder);
                }
                if matches!(ctx.previous, RowKind::Empty | RowKind::PageTitle) {
                    ctx.company = first_line.to_string();
                    tracing::debug!("Company from multi-line cell: {}", ctx.company);
                }
            }
            RowKind::CardholderDollarLine => {
                // "NAME VENDOR DATE $AMOUNT" collapsed into one cell; keep
                // the name, skip the unrecoverable remainder.
                ctx.cardholder = name_from_line(&row[0]);
                tracing::debug!("Cardholder from dollar line: {}", ctx.cardholder);
            }
            RowKind::CompanyNameOnly => {
                ctx.company = row[0].clone();
            }
            RowKind::TransactionLine => {
                // Parse the amount before touching any context so a bad row
                // leaves `ctx` exactly as it was.
                let amount_cell = row.last().map(String::as_str).unwrap_or("");
                let amount = dollar_amount(amount_cell)?;
                if !row[0].trim().is_empty() {
                    ctx.cardholder = row[0].clone();
                }
                record = Some(SpendingRecord {
                    company: ctx.company.clone(),
                    cardholder: ctx.cardholder.clone(),
                    vendor: row.get(1).cloned().unwrap_or_default(),
                    date: row.get(2).cloned().unwrap_or_default(),
                    amount,
                });
            }
        }

        ctx.previous = kind;
        Ok(record)
    }
}
