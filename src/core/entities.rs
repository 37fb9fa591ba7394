//! Decoding of the handful of HTML entities headings usually carry

use regex::{Captures, Regex};
use std::sync::LazyLock;

static NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|amp|quot|lt|gt);").expect("valid entity pattern"));

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(\d+);").expect("valid entity pattern"));

/// Decode `&nbsp;`, `&amp;`, `&quot;`, `&lt;`, `&gt;` and decimal `&#N;` entities.
///
/// Named entities are replaced in a single pass, then numeric entities in a
/// second pass over the result. `&amp;lt;` therefore decodes to `&lt;`, not
/// `<`. `&nbsp;` becomes a plain space. Unknown entities and numeric entities
/// that are not valid code points are left as they are.
pub fn decode_entities(text: &str) -> String {
    let named = NAMED_ENTITY.replace_all(text, |caps: &Captures| {
        let decoded = match &caps[1] {
            "nbsp" => " ",
            "amp" => "&",
            "quot" => "\"",
            "lt" => "<",
            _ => ">",
        };
        decoded.to_string()
    });

    NUMERIC_ENTITY
        .replace_all(&named, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
