//! Presentation document model
//!
//! Only the fields the refresher reads are modelled; everything else in the
//! fetched document is ignored by serde.

use serde::{Deserialize, Serialize};

/// A fetched presentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub presentation_id: String,
    #[serde(default)]
    pub slides: Vec<Page>,
}

/// A slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

/// An element placed on a slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets_chart: Option<SheetsChart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

/// Text body of a shape or table cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

/// One entry of a text body: a run of text, or a paragraph/autotext marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

/// A chart embedded from a spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<i64>,
}

/// What a page element is, as far as the refresher cares
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind<'a> {
    /// A shape carrying a text body
    TextShape(&'a TextContent),
    Table(&'a Table),
    SheetsChart(&'a SheetsChart),
    /// Images, lines, groups, text-less shapes, ...
    Other,
}

impl PageElement {
    pub fn kind(&self) -> ElementKind<'_> {
        if let Some(text) = self.shape.as_ref().and_then(|s| s.text.as_ref()) {
            ElementKind::TextShape(text)
        } else if let Some(table) = &self.table {
            ElementKind::Table(table)
        } else if let Some(chart) = &self.sheets_chart {
            ElementKind::SheetsChart(chart)
        } else {
            ElementKind::Other
        }
    }

    /// Text elements that stand for this element when looking for a marker:
    /// the top-left cell of a table, or the shape's own text.
    pub fn representative_text(&self) -> Option<&[TextElement]> {
        let top_left = self
            .table
            .as_ref()
            .and_then(|t| t.table_rows.first())
            .and_then(|row| row.table_cells.first())
            .and_then(|cell| cell.text.as_ref());

        top_left
            .or_else(|| self.shape.as_ref().and_then(|s| s.text.as_ref()))
            .map(|text| text.text_elements.as_slice())
    }
}

impl TextElement {
    /// Content of this element if it is a text run
    pub fn run_content(&self) -> Option<&str> {
        self.text_run.as_ref().and_then(|run| run.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fetched_document() {
        let doc: Presentation = serde_json::from_value(json!({
            "presentationId": "deck-1",
            "title": "ignored",
            "slides": [{
                "objectId": "p1",
                "pageElements": [
                    {
                        "objectId": "shape-1",
                        "size": {"width": {"magnitude": 100}},
                        "shape": {
                            "shapeType": "TEXT_BOX",
                            "text": {"textElements": [
                                {"endIndex": 9, "paragraphMarker": {}},
                                {"endIndex": 9, "textRun": {"content": "${title}\n"}}
                            ]}
                        }
                    },
                    {"objectId": "chart-1", "sheetsChart": {"spreadsheetId": "s", "chartId": 7}},
                    {"objectId": "image-1", "image": {"contentUrl": "x"}}
                ]
            }, {
                "objectId": "p2"
            }]
        }))
        .unwrap();

        assert_eq!(doc.presentation_id, "deck-1");
        assert_eq!(doc.slides.len(), 2);
        assert!(doc.slides[1].page_elements.is_empty());

        let elements = &doc.slides[0].page_elements;
        assert!(matches!(elements[0].kind(), ElementKind::TextShape(_)));
        assert!(matches!(elements[1].kind(), ElementKind::SheetsChart(_)));
        assert_eq!(elements[2].kind(), ElementKind::Other);

        let runs = elements[0].representative_text().unwrap();
        assert_eq!(runs[0].run_content(), None);
        assert_eq!(runs[1].run_content(), Some("${title}\n"));
    }

    #[test]
    fn test_table_representative_text_is_top_left_cell() {
        let element: PageElement = serde_json::from_value(json!({
            "objectId": "table-1",
            "table": {"tableRows": [
                {"tableCells": [
                    {"text": {"textElements": [{"textRun": {"content": "${sales}\n"}}]}},
                    {"text": {"textElements": [{"textRun": {"content": "other\n"}}]}}
                ]},
                {"tableCells": [{}, {}]}
            ]}
        }))
        .unwrap();

        let runs = element.representative_text().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_content(), Some("${sales}\n"));
    }

    #[test]
    fn test_shape_without_text_is_other() {
        let element = PageElement {
            object_id: "rect".to_string(),
            shape: Some(Shape { text: None }),
            ..Default::default()
        };
        assert_eq!(element.kind(), ElementKind::Other);
        assert!(element.representative_text().is_none());
    }
}
