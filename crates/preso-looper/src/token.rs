//! Slide position tokens
//!
//! The `slide` query parameter of a presenting URL names the slide object as
//! `id.<objectId>`. Slides renamed by the refresher carry their position in
//! the id (`<prefix>_<index>_<total>`), which makes the token advanceable:
//! `id.__preso_2_5` -> `id.__preso_3_5`.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Parsed `id.<base>_<index>_<total>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePosition {
    /// Everything between `id.` and `_<index>_<total>`, kept verbatim
    pub base: String,
    pub index: u64,
    pub total: u64,
}

fn token_re() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"^id\.(.*)_(\d+)_(\d+)$").expect("token pattern is valid"))
}

impl SlidePosition {
    /// Parse a `slide` value; `None` for anything that is not a position token
    ///
    /// A zero total cannot be advanced and is treated as no match.
    /// `index < total` is not checked.
    pub fn parse(value: &str) -> Option<Self> {
        let caps = token_re().captures(value)?;
        let index = caps[2].parse().ok()?;
        let total: u64 = caps[3].parse().ok()?;
        if total == 0 {
            return None;
        }
        Some(Self {
            base: caps[1].to_string(),
            index,
            total,
        })
    }

    /// The following slide, wrapping to 0 after the last
    pub fn next(&self) -> Self {
        Self {
            base: self.base.clone(),
            index: (self.index % self.total + 1) % self.total,
            total: self.total,
        }
    }
}

impl fmt::Display for SlidePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id.{}_{}_{}", self.base, self.index, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let pos = SlidePosition::parse("id.p_2_5").unwrap();
        assert_eq!(pos.base, "p");
        assert_eq!(pos.index, 2);
        assert_eq!(pos.total, 5);
        assert_eq!(pos.to_string(), "id.p_2_5");
    }

    #[test]
    fn test_base_may_contain_underscores() {
        let pos = SlidePosition::parse("id.__preso_3_7").unwrap();
        assert_eq!(pos.base, "__preso");
        assert_eq!(pos.index, 3);
        assert_eq!(pos.total, 7);
    }

    #[test]
    fn test_next_advances_and_wraps() {
        for total in 1..8u64 {
            for index in 0..total {
                let pos = SlidePosition {
                    base: "x_y".to_string(),
                    index,
                    total,
                };
                let next = pos.next();
                assert_eq!(next.index, (index + 1) % total);
                assert_eq!(next.total, total);
                assert_eq!(next.base, "x_y");
            }
        }
    }

    #[test]
    fn test_single_slide_loops_to_itself() {
        let pos = SlidePosition::parse("id.p_0_1").unwrap();
        assert_eq!(pos.next().to_string(), "id.p_0_1");
    }

    #[test]
    fn test_non_tokens() {
        assert_eq!(SlidePosition::parse("id.g1234abcd_0"), None);
        assert_eq!(SlidePosition::parse("p_2_5"), None);
        assert_eq!(SlidePosition::parse("id.p_a_5"), None);
        assert_eq!(SlidePosition::parse("id.p_2_0"), None);
        assert_eq!(SlidePosition::parse("id.p_99999999999999999999_5"), None);
        assert_eq!(SlidePosition::parse(""), None);
    }
}
