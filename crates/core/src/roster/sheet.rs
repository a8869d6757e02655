//! Fetching roster CSV from a published Google Sheet.

use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

const GOOGLE_SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidUrl(String),

    #[error("Could not reach the sheet: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch sheet data (status: {0}). Make sure the sheet is public and the name is correct")]
    Status(u16),
}

/// Anything that can hand back roster CSV text.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_csv(&self, sheet_url: &str, sheet_name: &str) -> Result<String, SheetError>;
}

/// Extract the spreadsheet id from a sheet URL.
pub fn sheet_id(sheet_url: &str) -> Option<&str> {
    let re = Regex::new(r"spreadsheets/d/([a-zA-Z0-9_-]+)").ok()?;
    re.captures(sheet_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads a tab of a public Google Sheet through the gviz CSV endpoint.
pub struct GoogleSheetSource {
    client: Client,
    base_url: String,
}

impl GoogleSheetSource {
    pub fn new(timeout: Duration) -> Result<Self, SheetError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: GOOGLE_SHEETS_BASE.to_string(),
        })
    }

    /// Point at a different host (local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn csv_url(&self, sheet_url: &str, sheet_name: &str) -> Result<String, SheetError> {
        let id = sheet_id(sheet_url).ok_or_else(|| SheetError::InvalidUrl(sheet_url.to_string()))?;
        Ok(format!(
            "{}/{}/gviz/tq?tqx=out:csv&sheet={}",
            self.base_url,
            id,
            urlencoding::encode(sheet_name)
        ))
    }
}

#[async_trait]
impl RosterSource for GoogleSheetSource {
    async fn fetch_csv(&self, sheet_url: &str, sheet_name: &str) -> Result<String, SheetError> {
        let url = self.csv_url(sheet_url, sheet_name)?;
        debug!(url = %url, "Fetching roster sheet");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
