//! REST clients for the Slides and Sheets APIs
//!
//! Calls are made once: no retry, no timeout. A failed call surfaces as
//! `PresoError::Api` and aborts whatever the caller was doing.

use crate::api::{SheetsApi, SlidesApi};
use crate::auth::TokenProvider;
use crate::model::Presentation;
use crate::requests::{BatchUpdate, Request};
use async_trait::async_trait;
use preso_core::{PresoError, Result};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Client for the presentations resource
#[derive(Clone)]
pub struct SlidesClient {
    http: reqwest::Client,
    base: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SlidesClient {
    /// Create a client rooted at `base` (e.g. `https://slides.googleapis.com/v1/presentations`)
    pub fn new(base: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn presentation_url(&self, presentation_id: &str) -> String {
        format!("{}/{}", self.base, presentation_id)
    }

    fn batch_update_url(&self, presentation_id: &str) -> String {
        format!("{}/{}:batchUpdate", self.base, presentation_id)
    }
}

#[async_trait]
impl SlidesApi for SlidesClient {
    #[instrument(skip(self))]
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let token = self.tokens.token().await?;
        let url = self.presentation_url(presentation_id);
        debug!("Fetching presentation {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PresoError::Api(format!("Failed to fetch presentation: {}", e)))?;

        let response = check_status("Slides", response).await?;
        let presentation: Presentation = response
            .json()
            .await
            .map_err(|e| PresoError::Api(format!("Failed to parse presentation: {}", e)))?;

        debug!(
            "Fetched presentation {} ({} slides)",
            presentation.presentation_id,
            presentation.slides.len()
        );
        Ok(presentation)
    }

    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    async fn batch_update(&self, presentation_id: &str, requests: Vec<Request>) -> Result<()> {
        let token = self.tokens.token().await?;
        let count = requests.len();
        let body = BatchUpdate { requests };

        let response = self
            .http
            .post(self.batch_update_url(presentation_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PresoError::Api(format!("Failed to send batch update: {}", e)))?;

        check_status("Slides", response).await?;
        info!("Applied {} requests to {}", count, presentation_id);
        Ok(())
    }
}

/// Client for spreadsheet value reads
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base: String,
    tokens: Arc<dyn TokenProvider>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    /// Create a client rooted at `base` (e.g. `https://sheets.googleapis.com/v4/spreadsheets`)
    pub fn new(base: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| PresoError::Config(format!("Invalid sheets API base {}: {}", self.base, e)))?;
        url.path_segments_mut()
            .map_err(|_| PresoError::Config(format!("Sheets API base cannot take a path: {}", self.base)))?
            .extend([spreadsheet_id, "values", range]);
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        Ok(url)
    }
}

#[async_trait]
impl SheetsApi for SheetsClient {
    #[instrument(skip(self))]
    async fn read_values(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<String>>> {
        let token = self.tokens.token().await?;
        let range = a1_range(sheet_name, rows, columns);
        let url = self.values_url(spreadsheet_id, &range)?;
        debug!("Reading {} from {}", range, spreadsheet_id);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PresoError::Api(format!("Failed to read sheet range: {}", e)))?;

        let response = check_status("Sheets", response).await?;
        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| PresoError::Api(format!("Failed to parse sheet values: {}", e)))?;

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

async fn check_status(service: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown".to_string());
    Err(PresoError::Api(format!(
        "{} API error {}: {}",
        service, status, error_text
    )))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `'Sheet name'!A1:<col><row>` covering `rows` x `columns` from the top-left
fn a1_range(sheet_name: &str, rows: usize, columns: usize) -> String {
    format!(
        "'{}'!A1:{}{}",
        sheet_name.replace('\'', "''"),
        column_letters(columns),
        rows
    )
}

/// 1-based column number to letters: 1 -> A, 26 -> Z, 27 -> AA
fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
