// src/report/client.rs
use crate::utils::error::ReportError;
use reqwest::header;
use std::path::Path;

// sample URL: https://cg.sc.gov/sites/cg/files/Documents/Fiscal%20Transparency/Monthly%20Charge%20Card%20Usage/2025/CCU-January2025.pdf
const REPORT_URL_TEMPLATE: &str = "https://cg.sc.gov/sites/cg/files/Documents/Fiscal%20Transparency/Monthly%20Charge%20Card%20Usage/{year}/CCU-{month}{year}.pdf";

/// Builds the download URL for one month's usage report.
pub fn report_url(year: u32, month: &str) -> String {
    REPORT_URL_TEMPLATE
        .replace("{year}", &year.to_string())
        .replace("{month}", month)
}

/// Creates a reqwest client configured for downloading reports.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("ccu_extractor/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Downloads one monthly report and writes the body verbatim to `output_path`.
///
/// The response status is checked before any byte is persisted so an HTML
/// error page can never be mistaken for a report document. A single blocking
/// call: no retry, no partial-document handling; failure is fatal to the run.
pub async fn download_report(year: u32, month: &str, output_path: &Path) -> Result<(), ReportError> {
    let client = build_client()?;
    let url = report_url(year, month);

    tracing::info!("Downloading report from: {}", url);
    let response = client
        .get(&url)
        .header(header::ACCEPT, "application/pdf,*/*")
        .send()
        .await?; // Propagates reqwest::Error as ReportError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::NOT_FOUND {
            // The CG posts each month's report with a lag; a 404 usually
            // means the month is not published yet.
            return Err(ReportError::NotFound(url));
        }
        return Err(ReportError::Http(status));
    }

    let body = response.bytes().await?;
    tokio::fs::write(output_path, &body).await?;
    tracing::info!(
        "Report downloaded and saved to {} ({} bytes)",
        output_path.display(),
        body.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_url_fills_year_and_month() {
        assert_eq!(
            report_url(2025, "January"),
            "https://cg.sc.gov/sites/cg/files/Documents/Fiscal%20Transparency/Monthly%20Charge%20Card%20Usage/2025/CCU-January2025.pdf"
        );
    }
}
