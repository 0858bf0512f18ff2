//! batchUpdate request union
//!
//! Each variant serializes to the single-key object the presentations API
//! expects, e.g. `{"deleteObject": {"objectId": "x"}}`. Constructors here only
//! build requests; deciding which ones to send lives in `refresher`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a `:batchUpdate` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

/// One mutation in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    DuplicateObject(DuplicateObject),
    DeleteObject(DeleteObject),
    DeleteText(DeleteText),
    InsertText(InsertText),
    RefreshSheetsChart(RefreshSheetsChart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateObject {
    pub object_id: String,
    /// Old id to new id for the duplicate (and any children listed)
    pub object_ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObject {
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text: String,
    pub insertion_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSheetsChart {
    pub object_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub row_index: usize,
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub range_type: RangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    All,
}

impl TextRange {
    pub const ALL: TextRange = TextRange {
        range_type: RangeType::All,
    };
}

impl Request {
    /// Duplicate-then-delete pair standing in for a rename
    ///
    /// The API has no rename; the duplicate must come first or there is
    /// nothing left to copy.
    pub fn rename_pair(object_id: &str, new_id: &str) -> [Request; 2] {
        let mut object_ids = BTreeMap::new();
        object_ids.insert(object_id.to_string(), new_id.to_string());
        [
            Request::DuplicateObject(DuplicateObject {
                object_id: object_id.to_string(),
                object_ids,
            }),
            Request::DeleteObject(DeleteObject {
                object_id: object_id.to_string(),
            }),
        ]
    }

    pub fn delete_all_text(object_id: &str) -> Request {
        Request::DeleteText(DeleteText {
            object_id: object_id.to_string(),
            cell_location: None,
            text_range: TextRange::ALL,
        })
    }

    pub fn insert_text(object_id: &str, text: &str) -> Request {
        Request::InsertText(InsertText {
            object_id: object_id.to_string(),
            cell_location: None,
            text: text.to_string(),
            insertion_index: 0,
        })
    }

    pub fn delete_cell_text(object_id: &str, row_index: usize, column_index: usize) -> Request {
        Request::DeleteText(DeleteText {
            object_id: object_id.to_string(),
            cell_location: Some(TableCellLocation {
                row_index,
                column_index,
            }),
            text_range: TextRange::ALL,
        })
    }

    pub fn insert_cell_text(
        object_id: &str,
        row_index: usize,
        column_index: usize,
        text: &str,
    ) -> Request {
        Request::InsertText(InsertText {
            object_id: object_id.to_string(),
            cell_location: Some(TableCellLocation {
                row_index,
                column_index,
            }),
            text: text.to_string(),
            insertion_index: 0,
        })
    }

    pub fn refresh_sheets_chart(object_id: &str) -> Request {
        Request::RefreshSheetsChart(RefreshSheetsChart {
            object_id: object_id.to_string(),
        })
    }

    /// Object the request targets
    pub fn object_id(&self) -> &str {
        match self {
            Request::DuplicateObject(r) => &r.object_id,
            Request::DeleteObject(r) => &r.object_id,
            Request::DeleteText(r) => &r.object_id,
            Request::InsertText(r) => &r.object_id,
            Request::RefreshSheetsChart(r) => &r.object_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rename_pair_wire_shape() {
        let batch = BatchUpdate {
            requests: Request::rename_pair("g123", "__preso_0_1_1_title").to_vec(),
        };

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({"requests": [
                {"duplicateObject": {
                    "objectId": "g123",
                    "objectIds": {"g123": "__preso_0_1_1_title"}
                }},
                {"deleteObject": {"objectId": "g123"}}
            ]})
        );
    }

    #[test]
    fn test_text_requests_wire_shape() {
        assert_eq!(
            serde_json::to_value(Request::delete_all_text("box")).unwrap(),
            json!({"deleteText": {"objectId": "box", "textRange": {"type": "ALL"}}})
        );
        assert_eq!(
            serde_json::to_value(Request::insert_text("box", "hello")).unwrap(),
            json!({"insertText": {"objectId": "box", "text": "hello", "insertionIndex": 0}})
        );
    }

    #[test]
    fn test_cell_requests_wire_shape() {
        assert_eq!(
            serde_json::to_value(Request::delete_cell_text("t", 1, 2)).unwrap(),
            json!({"deleteText": {
                "objectId": "t",
                "cellLocation": {"rowIndex": 1, "columnIndex": 2},
                "textRange": {"type": "ALL"}
            }})
        );
        assert_eq!(
            serde_json::to_value(Request::insert_cell_text("t", 0, 0, "")).unwrap(),
            json!({"insertText": {
                "objectId": "t",
                "cellLocation": {"rowIndex": 0, "columnIndex": 0},
                "text": "",
                "insertionIndex": 0
            }})
        );
    }

    #[test]
    fn test_refresh_chart_wire_shape() {
        let request = Request::refresh_sheets_chart("chart-9");
        assert_eq!(request.object_id(), "chart-9");
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"refreshSheetsChart": {"objectId": "chart-9"}})
        );
    }
}
