//! Content refresher
//!
//! Two strictly ordered phases per invocation:
//!
//! 1. **Rename**: give every marked element and every slide its managed id.
//!    Renames go out as one batch, then the deck is fetched again so phase 2
//!    sees the new ids.
//! 2. **Substitute**: rewrite managed text shapes and tables, refresh
//!    spreadsheet-linked charts, all in a single batch.
//!
//! Request planning is pure (`rename_requests`, `table_fill_requests`, ...);
//! only `Refresher` talks to the services.

use crate::api::{SheetsApi, SlidesApi};
use crate::model::{ElementKind, PageElement, Presentation, Table};
use crate::naming::{marker_key, Naming};
use crate::requests::Request;
use preso_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Substitution key to replacement text
pub type TextMappings = HashMap<String, String>;

/// Substitution key to the sheet a table is filled from
pub type TableMappings = HashMap<String, SheetSource>;

/// Sheet feeding a managed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSource {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Which cells of a table currently hold text
///
/// Deleting text from an empty cell is rejected by the API, so a delete is
/// only ever planned for occupied cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyMask {
    cells: Vec<Vec<bool>>,
}

impl OccupancyMask {
    /// A cell is occupied when it has a text body with at least one non-empty run.
    pub fn from_table(table: &Table) -> Self {
        let cells = table
            .table_rows
            .iter()
            .map(|row| {
                row.table_cells
                    .iter()
                    .map(|cell| {
                        cell.text.as_ref().is_some_and(|text| {
                            text.text_elements
                                .iter()
                                .filter_map(|e| e.run_content())
                                .any(|content| !content.is_empty())
                        })
                    })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    pub fn from_rows(cells: Vec<Vec<bool>>) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Widest row
    pub fn columns(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.columns() == 0
    }

    fn row_lengths(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().map(Vec::len).enumerate()
    }
}

/// Outcome of one `update_presentation` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Requests in the rename batch (two per renamed object)
    pub rename_requests: usize,
    /// Requests in the substitution batch, chart refreshes included
    pub content_requests: usize,
    pub charts_refreshed: usize,
}

/// Rename pairs for marked elements, then for slides, in document order
pub fn rename_requests(presentation: &Presentation, naming: &Naming) -> Vec<Request> {
    let mut requests = element_rename_requests(presentation, naming);
    requests.extend(slide_rename_requests(presentation, naming));
    requests
}

/// Rename pairs for unmanaged elements whose representative text is a lone marker
pub fn element_rename_requests(presentation: &Presentation, naming: &Naming) -> Vec<Request> {
    let mut requests = Vec::new();
    for (slide_index, slide) in presentation.slides.iter().enumerate() {
        for (element_index, element) in slide.page_elements.iter().enumerate() {
            if naming.is_managed(&element.object_id) {
                continue;
            }
            let Some((run_index, key)) = sole_marker(element) else {
                continue;
            };
            let new_id = naming.element_id(slide_index, element_index, run_index, key);
            debug!("Renaming element {} to {}", element.object_id, new_id);
            requests.extend(Request::rename_pair(&element.object_id, &new_id));
        }
    }
    requests
}

/// Rename pairs for slides not yet named `<prefix>_<index>_<total>`
pub fn slide_rename_requests(presentation: &Presentation, naming: &Naming) -> Vec<Request> {
    let total = presentation.slides.len();
    presentation
        .slides
        .iter()
        .enumerate()
        .filter_map(|(index, slide)| {
            let new_id = naming.slide_id(index, total);
            (slide.object_id != new_id).then(|| {
                debug!("Renaming slide {} to {}", slide.object_id, new_id);
                Request::rename_pair(&slide.object_id, &new_id)
            })
        })
        .flatten()
        .collect()
}

/// Index and key of the element's only text run, if that run is a marker
fn sole_marker(element: &PageElement) -> Option<(usize, &str)> {
    let text_elements = element.representative_text()?;
    let mut runs = text_elements
        .iter()
        .enumerate()
        .filter_map(|(index, e)| e.run_content().map(|content| (index, content)));

    let (run_index, content) = runs.next()?;
    if runs.next().is_some() {
        return None;
    }
    marker_key(content).map(|key| (run_index, key))
}

/// Delete-all then insert for a text shape; nothing when there is no (or an empty) replacement
pub fn text_replacement_requests(object_id: &str, replacement: Option<&str>) -> Vec<Request> {
    match replacement {
        Some(text) if !text.is_empty() => vec![
            Request::delete_all_text(object_id),
            Request::insert_text(object_id, text),
        ],
        _ => Vec::new(),
    }
}

/// Per-cell requests overwriting a table from a value grid
///
/// Every cell of the mask gets an insert, even when the value is empty.
/// Cells missing from a short grid are filled with empty text.
pub fn table_fill_requests(
    object_id: &str,
    mask: &OccupancyMask,
    values: &[Vec<String>],
) -> Vec<Request> {
    let mut requests = Vec::new();
    for (row, columns) in mask.row_lengths() {
        for column in 0..columns {
            if mask.is_occupied(row, column) {
                requests.push(Request::delete_cell_text(object_id, row, column));
            }
            let value = values
                .get(row)
                .and_then(|r| r.get(column))
                .map(String::as_str)
                .unwrap_or("");
            requests.push(Request::insert_cell_text(object_id, row, column, value));
        }
    }
    requests
}

/// One refresh per spreadsheet-linked chart, managed or not
pub fn chart_refresh_requests(presentation: &Presentation) -> Vec<Request> {
    presentation
        .slides
        .iter()
        .flat_map(|slide| slide.page_elements.iter())
        .filter(|element| element.sheets_chart.is_some())
        .map(|element| Request::refresh_sheets_chart(&element.object_id))
        .collect()
}

/// Drives both phases against the remote services
pub struct Refresher<S: SlidesApi, T: SheetsApi> {
    slides: S,
    sheets: T,
    naming: Naming,
}

impl<S: SlidesApi, T: SheetsApi> Refresher<S, T> {
    pub fn new(slides: S, sheets: T, managed_prefix: &str) -> Result<Self> {
        Ok(Self {
            slides,
            sheets,
            naming: Naming::new(managed_prefix)?,
        })
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn slides(&self) -> &S {
        &self.slides
    }

    pub fn sheets(&self) -> &T {
        &self.sheets
    }

    /// Rename marked objects, then rewrite managed text/tables and refresh charts
    ///
    /// Any remote failure aborts the remaining steps; a rename batch that
    /// already went through stays applied.
    pub async fn update_presentation(
        &self,
        presentation_id: &str,
        text_mappings: &TextMappings,
        table_mappings: &TableMappings,
    ) -> Result<RefreshSummary> {
        info!("Refreshing presentation {}", presentation_id);
        let mut summary = RefreshSummary::default();

        let mut presentation = self.slides.get_presentation(presentation_id).await?;

        let renames = rename_requests(&presentation, &self.naming);
        if !renames.is_empty() {
            summary.rename_requests = renames.len();
            info!("Renaming {} objects", renames.len() / 2);
            self.slides
                .batch_update(&presentation.presentation_id, renames)
                .await?;
            presentation = self.slides.get_presentation(presentation_id).await?;
        }

        let mut requests = self
            .content_requests(&presentation, text_mappings, table_mappings)
            .await?;
        let charts = chart_refresh_requests(&presentation);
        summary.charts_refreshed = charts.len();
        requests.extend(charts);

        if requests.is_empty() {
            info!("No content changes for {}", presentation_id);
            return Ok(summary);
        }

        summary.content_requests = requests.len();
        self.slides
            .batch_update(&presentation.presentation_id, requests)
            .await?;

        info!(
            "Refreshed {} ({} content requests, {} charts)",
            presentation_id, summary.content_requests, summary.charts_refreshed
        );
        Ok(summary)
    }

    /// Substitution requests for every managed text shape and table, in document order
    pub async fn content_requests(
        &self,
        presentation: &Presentation,
        text_mappings: &TextMappings,
        table_mappings: &TableMappings,
    ) -> Result<Vec<Request>> {
        let mut requests = Vec::new();

        for element in presentation.slides.iter().flat_map(|s| s.page_elements.iter()) {
            if !self.naming.is_managed(&element.object_id) {
                continue;
            }
            let Some(key) = self.naming.key_of(&element.object_id) else {
                debug!("Managed id {} carries no key", element.object_id);
                continue;
            };

            match element.kind() {
                ElementKind::TextShape(_) => {
                    let replacement = text_mappings.get(key).map(String::as_str);
                    if replacement.is_none() {
                        debug!("No text mapping for key {}", key);
                    }
                    requests.extend(text_replacement_requests(&element.object_id, replacement));
                }
                ElementKind::Table(table) => {
                    let Some(source) = table_mappings.get(key) else {
                        debug!("No table mapping for key {}", key);
                        continue;
                    };
                    requests.extend(self.table_requests(&element.object_id, table, source).await?);
                }
                ElementKind::SheetsChart(_) | ElementKind::Other => {}
            }
        }

        Ok(requests)
    }

    async fn table_requests(
        &self,
        object_id: &str,
        table: &Table,
        source: &SheetSource,
    ) -> Result<Vec<Request>> {
        let mask = OccupancyMask::from_table(table);
        if mask.is_empty() {
            warn!("Table {} has no cells, skipping", object_id);
            return Ok(Vec::new());
        }

        let values = self
            .sheets
            .read_values(
                &source.spreadsheet_id,
                &source.sheet_name,
                mask.rows(),
                mask.columns(),
            )
            .await?;

        debug!(
            "Filling table {} ({}x{}) from {}/{}",
            object_id,
            mask.rows(),
            mask.columns(),
            source.spreadsheet_id,
            source.sheet_name
        );
        Ok(table_fill_requests(object_id, &mask, &values))
    }
}
