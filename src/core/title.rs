//! Heading detection in rendered HTML
//!
//! Generated modules call an equivalent helper at runtime to turn their HTML
//! body into a title; this is the same logic for use from Rust.

use crate::core::entities::decode_entities;
use regex::Regex;
use std::sync::LazyLock;

/// Number of characters searched when no limit is given
pub const DEFAULT_LIMIT: usize = 1024;

/// File name the runtime title helper is written under
pub const HELPER_FILE_NAME: &str = "detect-title-html.cjs";

/// CommonJS source of the runtime title helper that generated modules
/// import for `detect-title-html` extras. It mirrors [`extract_title`].
pub const HELPER_SOURCE: &str = include_str!("../../assets/detect-title-html.cjs");

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)<h[1-6](?: [^=>]+(?:=[^=>]+)?)*?>(.*?)</h[1-6]>").expect("valid heading pattern")
});

/// Options for [`extract_title`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleOptions {
    /// Returned when no heading is found
    pub default_value: Option<String>,
    /// How many characters from the start of the HTML to search
    pub limit: usize,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            default_value: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TitleOptions {
    /// Options with a fallback value and the default limit
    pub fn with_default(default_value: impl Into<String>) -> Self {
        Self {
            default_value: Some(default_value.into()),
            ..Default::default()
        }
    }
}

/// Return the decoded text of the first `<h1>`..`<h6>` within the first
/// `options.limit` characters of `html`, or `options.default_value`.
pub fn extract_title(html: &str, options: &TitleOptions) -> Option<String> {
    let window = match html.char_indices().nth(options.limit) {
        Some((end, _)) => &html[..end],
        None => html,
    };

    match HEADING.captures(window) {
        Some(caps) => Some(decode_entities(&caps[1])),
        None => options.default_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_with_attributes() {
        let html = "<p>x</p><h2 class=\"a\">Hi &amp; Bye</h2>";
        assert_eq!(
            extract_title(html, &TitleOptions::default()),
            Some("Hi & Bye".to_string())
        );
    }

    #[test]
    fn test_first_heading_wins() {
        let html = "<h3>Third</h3>\n<h1>First</h1>";
        assert_eq!(
            extract_title(html, &TitleOptions::default()),
            Some("Third".to_string())
        );
    }

    #[test]
    fn test_multiple_attributes_and_bare_attribute() {
        let html = "<h1 id=\"top\" data-x=\"1\" hidden>Title</h1>";
        assert_eq!(
            extract_title(html, &TitleOptions::default()),
            Some("Title".to_string())
        );
    }

    #[test]
    fn test_default_value_when_missing() {
        assert_eq!(
            extract_title("no heading here", &TitleOptions::with_default("slug-x")),
            Some("slug-x".to_string())
        );
        assert_eq!(extract_title("no heading here", &TitleOptions::default()), None);
    }

    #[test]
    fn test_limit_restricts_search() {
        let html = format!("{}<h1>Late</h1>", "a".repeat(20));
        let options = TitleOptions {
            default_value: Some("fallback".to_string()),
            limit: 20,
        };
        assert_eq!(extract_title(&html, &options), Some("fallback".to_string()));
        let options = TitleOptions {
            limit: 40,
            ..options
        };
        assert_eq!(extract_title(&html, &options), Some("Late".to_string()));
    }

    #[test]
    fn test_helper_source_is_a_commonjs_module() {
        assert!(HELPER_SOURCE.contains("module.exports = function detectTitleHtml"));
        let opening = HEADING
            .as_str()
            .trim_start_matches("(?m)")
            .split("</")
            .next()
            .unwrap();
        assert!(HELPER_SOURCE.contains(opening));
    }

    #[test]
    fn test_heading_does_not_span_lines() {
        let html = "<h1>broken\nheading</h1>";
        assert_eq!(extract_title(html, &TitleOptions::with_default("d")), Some("d".to_string()));
    }
}
