//! Substitution mapping files
//!
//! ```toml
//! [text]
//! headline = "Q3 numbers"
//!
//! [tables.revenue]
//! spreadsheet_id = "1AbC..."
//! sheet_name = "Revenue"
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use preso_slides::{TableMappings, TextMappings};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct MappingFile {
    #[serde(default)]
    pub text: TextMappings,
    #[serde(default)]
    pub tables: TableMappings,
}

impl MappingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mappings from {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid mappings in {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Map `key` to a "Last updated" line for `now`
    pub fn stamp<Tz: TimeZone>(&mut self, key: &str, now: &DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.text.insert(
            key.to_string(),
            now.format("Last updated: %Y-%m-%d %H:%M").to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    #[test]
    fn test_parse_text_and_tables() {
        let mappings = MappingFile::parse(
            r#"
[text]
headline = "Q3 numbers"

[tables.revenue]
spreadsheet_id = "sheet-1"
sheet_name = "Revenue"
"#,
        )
        .unwrap();

        assert_eq!(mappings.text.get("headline").map(String::as_str), Some("Q3 numbers"));
        let source = &mappings.tables["revenue"];
        assert_eq!(source.spreadsheet_id, "sheet-1");
        assert_eq!(source.sheet_name, "Revenue");
    }

    #[test]
    fn test_sections_are_optional() {
        let mappings = MappingFile::parse("").unwrap();
        assert!(mappings.text.is_empty());
        assert!(mappings.tables.is_empty());
    }

    #[test]
    fn test_incomplete_table_rejected() {
        let err = MappingFile::parse("[tables.revenue]\nsheet_name = \"Revenue\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_stamp() {
        let mut mappings = MappingFile::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        mappings.stamp("updated", &now);
        assert_eq!(mappings.text["updated"], "Last updated: 2024-03-07 09:05");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[text]\nfooter = \"Confidential\"").unwrap();

        let mappings = MappingFile::load(file.path()).unwrap();
        assert_eq!(mappings.text["footer"], "Confidential");
        assert!(MappingFile::load(Path::new("/nonexistent/mappings.toml")).is_err());
    }
}
