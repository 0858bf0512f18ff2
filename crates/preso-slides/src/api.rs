//! Remote service seams (allows mocking in tests)

use crate::model::Presentation;
use crate::requests::Request;
use async_trait::async_trait;
use preso_core::{PresoError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Presentation fetch and batch mutation
#[async_trait]
pub trait SlidesApi: Send + Sync {
    /// Fetch the full presentation document
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation>;

    /// Submit one batch of requests
    async fn batch_update(&self, presentation_id: &str, requests: Vec<Request>) -> Result<()>;
}

/// Spreadsheet range reads
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Read `rows` x `columns` formatted values from the top-left of a named sheet
    ///
    /// The returned grid may be ragged or short; the service drops trailing
    /// empty cells and rows.
    async fn read_values(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<String>>>;
}

/// In-memory Slides service
///
/// Each fetch returns the next queued document; the last one repeats.
/// Submitted batches are recorded for inspection.
#[derive(Debug, Default)]
pub struct MockSlidesApi {
    documents: Mutex<Vec<Presentation>>,
    fetches: Mutex<usize>,
    batches: Mutex<Vec<Vec<Request>>>,
}

impl MockSlidesApi {
    pub fn new(document: Presentation) -> Self {
        Self::with_documents(vec![document])
    }

    /// Queue documents to hand out on successive fetches
    pub fn with_documents(documents: Vec<Presentation>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        *lock(&self.fetches)
    }

    pub fn batches(&self) -> Vec<Vec<Request>> {
        lock(&self.batches).clone()
    }
}

#[async_trait]
impl SlidesApi for MockSlidesApi {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let mut fetches = lock(&self.fetches);
        let documents = lock(&self.documents);
        let document = documents
            .get(*fetches)
            .or_else(|| documents.last())
            .cloned()
            .ok_or_else(|| PresoError::Api(format!("No mock document for {}", presentation_id)))?;
        *fetches += 1;
        Ok(document)
    }

    async fn batch_update(&self, _presentation_id: &str, requests: Vec<Request>) -> Result<()> {
        lock(&self.batches).push(requests);
        Ok(())
    }
}

/// In-memory Sheets service keyed by `(spreadsheet_id, sheet_name)`
#[derive(Debug, Default)]
pub struct MockSheetsApi {
    sheets: HashMap<(String, String), Vec<Vec<String>>>,
    reads: Mutex<Vec<(String, String, usize, usize)>>,
}

impl MockSheetsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, spreadsheet_id: &str, sheet_name: &str, values: Vec<Vec<&str>>) -> Self {
        let values = values
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect();
        self.sheets
            .insert((spreadsheet_id.to_string(), sheet_name.to_string()), values);
        self
    }

    /// Every read as `(spreadsheet_id, sheet_name, rows, columns)`
    pub fn reads(&self) -> Vec<(String, String, usize, usize)> {
        lock(&self.reads).clone()
    }
}

#[async_trait]
impl SheetsApi for MockSheetsApi {
    async fn read_values(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<String>>> {
        lock(&self.reads).push((
            spreadsheet_id.to_string(),
            sheet_name.to_string(),
            rows,
            columns,
        ));

        let values = self
            .sheets
            .get(&(spreadsheet_id.to_string(), sheet_name.to_string()))
            .ok_or_else(|| {
                PresoError::Api(format!("Unable to parse range: {}!{}", spreadsheet_id, sheet_name))
            })?;

        Ok(values
            .iter()
            .take(rows)
            .map(|row| row.iter().take(columns).cloned().collect())
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
