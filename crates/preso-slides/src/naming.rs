//! Managed object-id convention
//!
//! Element ids: `<prefix>_<slide>_<element>_<run>_<key>`.
//! Slide ids: `<prefix>_<index>_<total>`.
//!
//! The key is the only link between a document element and the caller's data,
//! so it is always read back from the id string alone.

use preso_core::{PresoError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Parsed managed element id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedElementId<'a> {
    pub slide_index: usize,
    pub element_index: usize,
    pub run_index: usize,
    pub key: &'a str,
}

/// Id builder/parser for one managed prefix
#[derive(Debug, Clone)]
pub struct Naming {
    prefix: String,
    element_re: Regex,
}

impl Naming {
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(PresoError::Config(
                "managed prefix must not be empty".to_string(),
            ));
        }
        let element_re = Regex::new(&format!(
            r"^{}_(\d+)_(\d+)_(\d+)_(.*)$",
            regex::escape(prefix)
        ))
        .map_err(|e| PresoError::Config(format!("Invalid managed prefix {}: {}", prefix, e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            element_re,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether an id already carries the managed prefix
    pub fn is_managed(&self, object_id: &str) -> bool {
        object_id.starts_with(&self.prefix)
    }

    pub fn element_id(
        &self,
        slide_index: usize,
        element_index: usize,
        run_index: usize,
        key: &str,
    ) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.prefix, slide_index, element_index, run_index, key
        )
    }

    pub fn slide_id(&self, index: usize, total: usize) -> String {
        format!("{}_{}_{}", self.prefix, index, total)
    }

    /// Parse a managed element id, `None` when the id does not follow the convention
    pub fn parse_element_id<'a>(&self, object_id: &'a str) -> Option<ManagedElementId<'a>> {
        let caps = self.element_re.captures(object_id)?;
        Some(ManagedElementId {
            slide_index: caps[1].parse().ok()?,
            element_index: caps[2].parse().ok()?,
            run_index: caps[3].parse().ok()?,
            key: caps.get(4)?.as_str(),
        })
    }

    /// Substitution key carried by a managed element id
    pub fn key_of<'a>(&self, object_id: &'a str) -> Option<&'a str> {
        self.parse_element_id(object_id).map(|id| id.key)
    }
}

fn marker_re() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    // `.` stops at newlines, so the marker is a single line ending in exactly one `\n`.
    MARKER.get_or_init(|| Regex::new(r"^\$\{(.+)\}\n$").expect("marker pattern is valid"))
}

/// Key of a substitution marker run (`${key}\n`), `None` for any other text
pub fn marker_key(content: &str) -> Option<&str> {
    marker_re()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_key() {
        assert_eq!(marker_key("${title}\n"), Some("title"));
        assert_eq!(marker_key("${last_updated}\n"), Some("last_updated"));
        assert_eq!(marker_key("${title}"), None);
        assert_eq!(marker_key("Title ${title}\n"), None);
        assert_eq!(marker_key("${title}\n\n"), None);
        assert_eq!(marker_key("${a\nb}\n"), None);
        assert_eq!(marker_key("${}\n"), None);
    }

    #[test]
    fn test_element_id_round_trip() {
        let naming = Naming::new("__preso").unwrap();
        let id = naming.element_id(2, 3, 1, "sales_table");
        assert_eq!(id, "__preso_2_3_1_sales_table");

        let parsed = naming.parse_element_id(&id).unwrap();
        assert_eq!(parsed.slide_index, 2);
        assert_eq!(parsed.element_index, 3);
        assert_eq!(parsed.run_index, 1);
        assert_eq!(parsed.key, "sales_table");
    }

    #[test]
    fn test_slide_id_is_managed_but_has_no_key() {
        let naming = Naming::new("__preso").unwrap();
        let id = naming.slide_id(0, 5);
        assert_eq!(id, "__preso_0_5");
        assert!(naming.is_managed(&id));
        assert_eq!(naming.key_of(&id), None);
    }

    #[test]
    fn test_unmanaged_ids() {
        let naming = Naming::new("__preso").unwrap();
        assert!(!naming.is_managed("g1234abcd"));
        assert_eq!(naming.key_of("g1234abcd"), None);
        assert_eq!(naming.key_of("other_1_2_3_title"), None);
    }

    #[test]
    fn test_prefix_is_matched_literally() {
        let naming = Naming::new("a.b").unwrap();
        assert_eq!(naming.key_of("a.b_0_0_0_k"), Some("k"));
        assert_eq!(naming.key_of("axb_0_0_0_k"), None);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(matches!(Naming::new(""), Err(PresoError::Config(_))));
    }
}
