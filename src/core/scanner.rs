//! Splitting tagged files into metadata and body
//!
//! A tagged file starts with either a JSON value or a `---` delimited YAML
//! front matter block. The scanner finds where that block ends without
//! parsing the body, parses the block into [`Metadata`] and hands the rest of
//! the buffer back untouched.

use crate::error::{Result, TaggedFileError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key-ordered metadata extracted from the head of a tagged file
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Line that opens and closes a front matter block
pub const DELIMITER: &str = "---";

/// How the metadata block at the top of a buffer is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserMode {
    /// A single balanced JSON value
    Json,
    /// YAML between two bare `---` lines
    FrontMatter,
    /// Front matter if the buffer starts with `---`, JSON otherwise
    #[default]
    Auto,
}

impl ParserMode {
    /// Resolve `Auto` against the first three characters of `buffer`.
    ///
    /// Concrete modes are returned unchanged.
    pub fn resolve(self, buffer: &str) -> ParserMode {
        match self {
            ParserMode::Auto if buffer.starts_with(DELIMITER) => ParserMode::FrontMatter,
            ParserMode::Auto => ParserMode::Json,
            mode => mode,
        }
    }
}

impl fmt::Display for ParserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserMode::Json => write!(f, "json"),
            ParserMode::FrontMatter => write!(f, "front-matter"),
            ParserMode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ParserMode {
    type Err = TaggedFileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ParserMode::Json),
            "front-matter" => Ok(ParserMode::FrontMatter),
            "auto" => Ok(ParserMode::Auto),
            other => Err(TaggedFileError::invalid_options(format!(
                "unknown parser '{}', expected json, front-matter or auto",
                other
            ))),
        }
    }
}

/// A tagged file broken into its metadata and body
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedDocument {
    metadata: Metadata,
    body: String,
}

impl TaggedDocument {
    /// Create a document from already separated parts
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Get the metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get the body content
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consume the document, returning metadata and body
    pub fn into_parts(self) -> (Metadata, String) {
        (self.metadata, self.body)
    }
}

/// Split `buffer` into metadata and body using `mode`.
///
/// `Auto` is resolved once from the first three characters; there is no
/// fallback to the other mode if the chosen one fails.
pub fn split(buffer: &str, mode: ParserMode) -> Result<TaggedDocument> {
    let resolved = mode.resolve(buffer);
    log::trace!("splitting buffer with parser mode {}", resolved);
    match resolved {
        ParserMode::FrontMatter => split_front_matter(buffer),
        _ => split_json(buffer),
    }
}

/// Lexical state of the JSON boundary scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    EscapePending,
}

/// Find the byte offset just past the first balanced top-level JSON value.
///
/// Brackets are only counted outside string literals, and a backslash inside a
/// string always consumes the following character, so `"x\"y"` stays one
/// string. Leading whitespace is allowed; anything else before the first
/// bracket means there is no tag.
pub fn json_boundary(buffer: &str) -> Result<usize> {
    let mut state = ScanState::Normal;
    let mut depth: usize = 0;

    for (offset, c) in buffer.char_indices() {
        state = match (state, c) {
            (ScanState::Normal, '{' | '[') => {
                depth += 1;
                ScanState::Normal
            }
            (ScanState::Normal, '}' | ']') => {
                if depth == 0 {
                    return Err(TaggedFileError::corrupted_tag(offset));
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(offset + c.len_utf8());
                }
                ScanState::Normal
            }
            (ScanState::Normal, c) if depth == 0 && !c.is_whitespace() => {
                return Err(TaggedFileError::malformed_tag(format!(
                    "expected '{{' or '[' but found '{}' at byte {}",
                    c, offset
                )));
            }
            (ScanState::Normal, '"') => ScanState::InString,
            (ScanState::Normal, _) => ScanState::Normal,
            (ScanState::InString, '\\') => ScanState::EscapePending,
            (ScanState::InString, '"') => ScanState::Normal,
            (ScanState::InString, _) => ScanState::InString,
            (ScanState::EscapePending, _) => ScanState::InString,
        };
    }

    Err(TaggedFileError::malformed_tag(if depth == 0 {
        "no JSON tag found".to_string()
    } else {
        format!("JSON tag is never closed ({} brackets still open)", depth)
    }))
}

/// Split a buffer that starts with a JSON value.
///
/// The body is everything after the closing bracket, byte for byte.
pub fn split_json(buffer: &str) -> Result<TaggedDocument> {
    let end = json_boundary(buffer)?;
    let value: serde_json::Value = serde_json::from_str(&buffer[..end])
        .map_err(|e| TaggedFileError::malformed_tag(format!("invalid JSON tag: {}", e)))?;
    let metadata = into_metadata(value)?;
    Ok(TaggedDocument::new(metadata, &buffer[end..]))
}

/// Split a buffer that starts with a `---` front matter block.
///
/// Lines are compared with carriage returns dropped. The body is the text
/// after the closing delimiter line, unchanged.
pub fn split_front_matter(buffer: &str) -> Result<TaggedDocument> {
    let mut lines = buffer.split_inclusive('\n');
    let mut consumed = 0;

    match lines.next() {
        Some(first) if strip_line(first) == DELIMITER => consumed += first.len(),
        _ => {
            return Err(TaggedFileError::malformed_tag(
                "front matter must start with a '---' line",
            ))
        }
    }

    // The leading newline keeps line numbers in YAML errors aligned with the file.
    let mut yaml = String::from("\n");
    for line in lines {
        consumed += line.len();
        let stripped = strip_line(line);
        if stripped == DELIMITER {
            let metadata = parse_yaml_block(&yaml)?;
            return Ok(TaggedDocument::new(metadata, &buffer[consumed..]));
        }
        yaml.push_str(&stripped);
        yaml.push('\n');
    }

    Err(TaggedFileError::malformed_tag(
        "front matter is never closed by a '---' line",
    ))
}

fn strip_line(line: &str) -> String {
    line.trim_end_matches('\n').replace('\r', "")
}

fn parse_yaml_block(yaml: &str) -> Result<Metadata> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| TaggedFileError::malformed_tag(format!("invalid YAML front matter: {}", e)))?;
    if value.is_null() {
        return Ok(Metadata::new());
    }
    let json = serde_json::to_value(value).map_err(|e| {
        TaggedFileError::malformed_tag(format!("front matter is not JSON compatible: {}", e))
    })?;
    into_metadata(json)
}

fn into_metadata(value: serde_json::Value) -> Result<Metadata> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(Metadata::new()),
        other => Err(TaggedFileError::malformed_tag(format!(
            "metadata must be a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}
