//! Behavioural properties of splitting, generation and title detection

use pretty_assertions::assert_eq;
use regex::Regex;
use serde_json::{json, Value};
use std::path::Path;
use tagged_file::*;

#[test]
fn test_json_split_returns_exact_body() {
    let cases = [
        (json!({"a": 1}), "plain body"),
        (json!({"nested": {"list": [1, {"x": "}"}]}}), "\n\n# Title\n"),
        (json!({"quote": "say \"hi\"", "slash": "a\\b"}), "  indented"),
        (json!({}), ""),
    ];
    for (metadata, body) in cases {
        let buffer = format!("{}{}", metadata, body);
        let doc = split(&buffer, ParserMode::Json).unwrap();
        assert_eq!(doc.body(), body);
        assert_eq!(Value::Object(doc.metadata().clone()), metadata);
    }
}

#[test]
fn test_pretty_printed_json_tag() {
    let buffer = "{\n  \"title\": \"x\",\n  \"tags\": [\n    \"a\"\n  ]\n}\nBody";
    let doc = split(buffer, ParserMode::Auto).unwrap();
    assert_eq!(doc.metadata()["tags"], json!(["a"]));
    assert_eq!(doc.body(), "\nBody");
}

#[test]
fn test_escaped_quote_keeps_scanning() {
    let doc = split("{\"a\":\"x\\\"y\"}TAIL", ParserMode::Json).unwrap();
    assert_eq!(doc.body(), "TAIL");
    let doc = split("{\"a\":\"x\\\\\"}TAIL", ParserMode::Json).unwrap();
    assert_eq!(doc.metadata()["a"], "x\\");
    assert_eq!(doc.body(), "TAIL");
}

#[test]
fn test_excess_closers_and_unbalanced_tags() {
    for buffer in ["}", "]{}", "  ]"] {
        assert!(matches!(
            split(buffer, ParserMode::Json),
            Err(TaggedFileError::CorruptedTag { .. })
        ));
    }
    for buffer in ["{", "{\"a\": [1, 2}", "{\"a\": \"}"] {
        assert!(matches!(
            split(buffer, ParserMode::Json),
            Err(TaggedFileError::MalformedTag { .. })
        ));
    }
}

#[test]
fn test_front_matter_split() {
    let doc = split("---\nA: 1\n---\nBODY", ParserMode::Auto).unwrap();
    assert_eq!(Value::Object(doc.metadata().clone()), json!({"A": 1}));
    assert_eq!(doc.body(), "BODY");
}

#[test]
fn test_per_key_exports_parse_back() {
    let metadata = json!({
        "title": "Round \"trip\"",
        "count": 7,
        "ratio": 0.5,
        "draft": false,
        "nothing": null,
        "tags": ["a", "b"],
        "author": {"name": "N", "links": []},
    });
    let Value::Object(map) = metadata.clone() else {
        unreachable!()
    };
    let slug = Slug::from_path(Path::new("x/y.md")).unwrap();
    let code = render("", &map, &slug, &ExportSpec::default()).unwrap();

    let line = Regex::new(r"^export const ([A-Za-z_$][A-Za-z0-9_$]*) = (.*);$").unwrap();
    let mut parsed = serde_json::Map::new();
    for text in code.lines() {
        let caps = line.captures(text).unwrap();
        parsed.insert(caps[1].to_string(), serde_json::from_str(&caps[2]).unwrap());
    }
    assert_eq!(parsed.remove("slug"), Some(json!("x/y")));
    assert_eq!(Value::Object(parsed), metadata);
}

#[test]
fn test_entity_decoding_is_single_pass() {
    assert_eq!(decode_entities("&amp;lt;"), "&lt;");
}

#[test]
fn test_title_extraction() {
    assert_eq!(
        extract_title("<p>x</p><h2 class=\"a\">Hi &amp; Bye</h2>", &TitleOptions::default()),
        Some("Hi & Bye".to_string())
    );
    assert_eq!(
        extract_title("no heading here", &TitleOptions::with_default("slug-x")),
        Some("slug-x".to_string())
    );
}

#[test]
fn test_slug_derivation() {
    let slug = Slug::from_path(Path::new("/content/Guides/setup.md")).unwrap();
    assert_eq!(slug.to_string(), "guides/setup");
    let slug = Slug::from_path(Path::new("/content/My Folder/index.md")).unwrap();
    assert_eq!(slug.to_string(), "content/my-folder");
}

#[test]
fn test_dialect_rewrite_at_end_of_text() {
    let spec = ExportSpec {
        input_dialect: ModuleDialect::CommonJs,
        output_dialect: ModuleDialect::EsModule,
        ..Default::default()
    };
    let slug = Slug::from_path(Path::new("a/b.md")).unwrap();
    let code = render(
        "var code = \"x\";\nmodule.exports = code;",
        &Metadata::new(),
        &slug,
        &spec,
    )
    .unwrap();
    assert_eq!(
        code,
        "var code = \"x\";\nexport default code;\nexport const slug = \"a/b\";\n"
    );
}
