// src/report/rows.rs
use crate::extractors::spending::RawRow;
use crate::utils::error::ReportError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::path::Path;

// The report's text layer separates columns with runs of whitespace; a gap of
// two or more spaces is a cell boundary, a single space is part of a value.
static CELL_GAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("Failed to compile CELL_GAP_RE"));

const ROW_WIDTH: usize = 4;

/// Lazy row stream over one report document.
///
/// `open` acquires and decodes the document; iteration yields one `RawRow`
/// per table line, page by page. The stream is finite and non-restartable;
/// re-extraction means calling `open` again.
pub struct ReportRows {
    pages: std::vec::IntoIter<String>,
    pending: VecDeque<RawRow>,
    page_no: usize,
}

impl ReportRows {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        tracing::info!("Extracting rows from report {}", path.display());

        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| ReportError::Document(e.to_string()))?;
        tracing::debug!("Report has {} pages", pages.len());

        Ok(Self {
            pages: pages.into_iter(),
            pending: VecDeque::new(),
            page_no: 0,
        })
    }
}

impl Iterator for ReportRows {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(row);
            }
            let page = self.pages.next()?;
            self.page_no += 1;
            tracing::debug!("Processing page {}", self.page_no);
            self.pending.extend(page.lines().map(line_to_cells));
        }
    }
}

/// Splits one text line into trimmed cells at column gaps, padding with
/// empty strings to the table's four columns.
fn line_to_cells(line: &str) -> RawRow {
    let mut cells: Vec<String> = CELL_GAP_RE
        .split(line.trim_end())
        .map(|cell| cell.trim().to_string())
        .collect();
    while cells.len() < ROW_WIDTH {
        cells.push(String::new());
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_splits_on_column_gaps_only() {
        assert_eq!(
            line_to_cells("John Doe   Acme Inc   01/02/2025   $12.34"),
            vec!["John Doe", "Acme Inc", "01/02/2025", "$12.34"]
        );
    }

    #[test]
    fn single_value_lines_pad_to_four_cells() {
        assert_eq!(line_to_cells("Beta LLC"), vec!["Beta LLC", "", "", ""]);
    }

    #[test]
    fn blank_lines_become_empty_rows() {
        assert_eq!(line_to_cells(""), vec!["", "", "", ""]);
        assert_eq!(line_to_cells("   "), vec!["", "", "", ""]);
    }

    #[test]
    fn leading_gap_shifts_cells_right() {
        // An indented bare amount keeps its leading empty cell.
        let cells = line_to_cells("  $1,234.56");
        assert_eq!(cells[0], "");
        assert_eq!(cells[1], "$1,234.56");
    }

    #[test]
    fn extra_columns_are_kept() {
        let cells = line_to_cells("a  b  c  d  e");
        assert_eq!(cells.len(), 5);
    }
}
