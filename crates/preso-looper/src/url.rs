//! Presenting-URL matching and next-slide URL computation

use crate::error::{PresoError, Result};
use crate::query::QueryParams;
use crate::token::SlidePosition;
use regex::Regex;

/// Matches `https://<host>/presentation/d/<id>/present...`
#[derive(Debug, Clone)]
pub struct PresentingMatcher {
    re: Regex,
}

impl PresentingMatcher {
    pub fn new(docs_host: &str) -> Result<Self> {
        let re = Regex::new(&format!(
            r"^https://{}/presentation/d/[^/]+/present(.*)$",
            regex::escape(docs_host)
        ))
        .map_err(|e| PresoError::InvalidUrl(format!("Bad docs host {}: {}", docs_host, e)))?;
        Ok(Self { re })
    }

    pub fn is_presenting(&self, url: &str) -> bool {
        self.re.is_match(url)
    }
}

impl Default for PresentingMatcher {
    fn default() -> Self {
        Self {
            re: Regex::new(r"^https://docs\.google\.com/presentation/d/[^/]+/present(.*)$")
                .expect("presenting pattern is valid"),
        }
    }
}

/// Query parameters of a URL (empty when there is no `?`)
pub fn query_params(url: &str) -> QueryParams {
    url.split_once('?')
        .map(|(_, query)| QueryParams::parse(query))
        .unwrap_or_default()
}

/// Whether the URL asks for looping (`loop` present, any value)
pub fn has_loop_flag(url: &str) -> bool {
    query_params(url).contains("loop")
}

/// Result of computing the next slide URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideStep {
    /// The `slide` token parsed and was advanced
    Advanced { url: String, position: SlidePosition },
    /// No usable `slide` token; the loop stays where it is
    Stalled,
}

impl SlideStep {
    /// URL to navigate to: the advanced one, or `current` unchanged
    pub fn into_url(self, current: &str) -> String {
        match self {
            SlideStep::Advanced { url, .. } => url,
            SlideStep::Stalled => current.to_string(),
        }
    }
}

/// Advance the `slide` token of a presenting URL
///
/// The rebuilt query leads with `loop=1&slide=<next>`; any other parameters
/// follow in their original order.
pub fn next_slide_url(url: &str) -> SlideStep {
    let Some((host_path, query)) = url.split_once('?') else {
        return SlideStep::Stalled;
    };
    let params = QueryParams::parse(query);
    let Some(position) = params.get("slide").and_then(SlidePosition::parse) else {
        return SlideStep::Stalled;
    };
    let next = position.next();

    let mut rebuilt = QueryParams::new();
    rebuilt.set("loop", "1");
    rebuilt.set("slide", &next.to_string());
    for (key, value) in params.iter().filter(|(k, _)| *k != "loop" && *k != "slide") {
        rebuilt.insert(key, value);
    }

    SlideStep::Advanced {
        url: format!("{}?{}", host_path, rebuilt),
        position: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://docs.google.com/presentation/d/ABC/present";

    #[test]
    fn test_is_presenting() {
        let matcher = PresentingMatcher::default();
        assert!(matcher.is_presenting(BASE));
        assert!(matcher.is_presenting(&format!("{}?slide=id.p_0_1", BASE)));
        assert!(!matcher.is_presenting("https://docs.google.com/presentation/d/ABC/edit"));
        assert!(!matcher.is_presenting("http://docs.google.com/presentation/d/ABC/present"));
        assert!(!matcher.is_presenting("https://example.com/presentation/d/ABC/present"));
    }

    #[test]
    fn test_custom_host_is_literal() {
        let matcher = PresentingMatcher::new("docs.example.org").unwrap();
        assert!(matcher.is_presenting("https://docs.example.org/presentation/d/x/present"));
        assert!(!matcher.is_presenting("https://docsXexample.org/presentation/d/x/present"));
    }

    #[test]
    fn test_next_slide() {
        let url = format!("{}?slide=id.p_2_5&loop=1", BASE);
        assert_eq!(
            next_slide_url(&url).into_url(&url),
            format!("{}?loop=1&slide=id.p_3_5", BASE)
        );
    }

    #[test]
    fn test_next_slide_wraps() {
        let url = format!("{}?slide=id.p_4_5&loop=1", BASE);
        let step = next_slide_url(&url);
        match &step {
            SlideStep::Advanced { position, .. } => assert_eq!(position.index, 0),
            SlideStep::Stalled => panic!("expected advance"),
        }
        assert!(step.into_url(&url).ends_with("slide=id.p_0_5"));
    }

    #[test]
    fn test_stalled_urls_unchanged() {
        for url in [
            format!("{}?slide=id.g35f391192_00&loop=1", BASE),
            format!("{}?loop=1", BASE),
            BASE.to_string(),
            format!("{}?slide=whatever", BASE),
        ] {
            let step = next_slide_url(&url);
            assert_eq!(step, SlideStep::Stalled);
            assert_eq!(step.into_url(&url), url);
        }
    }

    #[test]
    fn test_other_params_kept_after_loop_and_slide() {
        let url = format!("{}?rm=minimal&slide=id.p_0_2&loop", BASE);
        assert_eq!(
            next_slide_url(&url).into_url(&url),
            format!("{}?loop=1&slide=id.p_1_2&rm=minimal", BASE)
        );
    }

    #[test]
    fn test_loop_flag() {
        assert!(has_loop_flag(&format!("{}?loop=1", BASE)));
        assert!(has_loop_flag(&format!("{}?slide=id.p_0_1&loop", BASE)));
        assert!(!has_loop_flag(&format!("{}?slide=id.p_0_1", BASE)));
        assert!(!has_loop_flag(BASE));
    }

    #[test]
    fn test_advanced_url_reparses_identically() {
        let url = format!("{}?slide=id.p_1_3&loop=1", BASE);
        let next = next_slide_url(&url).into_url(&url);
        let params = query_params(&next);
        assert_eq!(params.get("slide"), Some("id.p_2_3"));
        assert!(params.contains("loop"));
        assert_eq!(query_params(&format!("{}?{}", BASE, params)), params);
    }
}
