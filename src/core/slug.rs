//! Routing slugs derived from a file's location

use crate::error::{Result, TaggedFileError};
use regex::Regex;
use std::fmt;
use std::path::{Component, Path};
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// File name that makes its directory the page
const INDEX_FILE: &str = "index.md";

/// Two-segment `section/name` identifier for a tagged file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug {
    section: String,
    name: String,
}

impl Slug {
    /// Derive the slug of `path`.
    ///
    /// `guides/Setup.md` becomes `guides/setup`; for `docs/My Folder/index.md`
    /// the directory stands in for the file, giving `docs/my-folder`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let segments: Vec<String> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let needed = match segments.last() {
            Some(last) if last == INDEX_FILE => 3,
            _ => 2,
        };
        if segments.len() < needed {
            return Err(TaggedFileError::invalid_resource_path(path));
        }

        let start = segments.len() - needed;
        let section = &segments[start];
        let name = &segments[start + 1];
        let name = name.strip_suffix(".md").unwrap_or(name);

        Ok(Self {
            section: normalize(section),
            name: normalize(name),
        })
    }

    /// Parent segment
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Page segment
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.name)
    }
}

fn normalize(segment: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&segment.to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file() {
        let slug = Slug::from_path(Path::new("/site/content/Guides/setup.md")).unwrap();
        assert_eq!(slug.to_string(), "guides/setup");
    }

    #[test]
    fn test_index_file_uses_directories() {
        let slug = Slug::from_path(Path::new("/site/Docs/My Folder/index.md")).unwrap();
        assert_eq!(slug.section(), "docs");
        assert_eq!(slug.name(), "my-folder");
    }

    #[test]
    fn test_runs_collapse_to_one_hyphen() {
        let slug = Slug::from_path(Path::new("C++ & Rust/Hello,  World!.md")).unwrap();
        assert_eq!(slug.to_string(), "c-rust/hello-world-");
    }

    #[test]
    fn test_only_trailing_md_is_stripped() {
        let slug = Slug::from_path(Path::new("notes/readme.md.bak")).unwrap();
        assert_eq!(slug.to_string(), "notes/readme-md-bak");
    }

    #[test]
    fn test_too_short() {
        assert!(Slug::from_path(Path::new("setup.md")).is_err());
        assert!(Slug::from_path(Path::new("docs/index.md")).is_err());
    }
}
