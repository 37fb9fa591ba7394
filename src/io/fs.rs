//! Finding, reading and writing files on disk

use crate::error::{Result, TaggedFileError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|s| s == "md" || s == "markdown")
        .unwrap_or(false)
}

/// A file to process and where it sits below the argument it was found from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path below the walked directory, or the bare file name for files
    /// given directly
    pub relative: PathBuf,
}

/// Expand `paths` into files: files are kept as given, directories are
/// walked for markdown files. Paths that do not exist are skipped.
pub fn resolve_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.clone());
            files.push(SourceFile {
                path: path.clone(),
                relative,
            });
        } else if path.is_dir() {
            let mut found: Vec<SourceFile> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
                .map(|e| {
                    let relative = e
                        .path()
                        .strip_prefix(path)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| e.path().to_path_buf());
                    SourceFile {
                        path: e.into_path(),
                        relative,
                    }
                })
                .collect();
            found.sort_by(|a, b| a.path.cmp(&b.path));
            files.extend(found);
        } else {
            log::warn!("skipping {}: no such file or directory", path.display());
        }
    }
    files
}

/// Like [`resolve_sources`], keeping only the paths
pub fn resolve_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    resolve_sources(paths)
        .into_iter()
        .map(|source| source.path)
        .collect()
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TaggedFileError::file_not_found(path),
        _ => TaggedFileError::Io(e),
    })
}

/// Write `content` to `path` through a temporary file in the same directory
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| TaggedFileError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("b.markdown")));
        assert!(!is_markdown(Path::new("c.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn test_resolve_files_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.md"), "").unwrap();
        fs::write(root.join("c.txt"), "").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/b.markdown"), "").unwrap();

        let files = resolve_files(&[root.to_path_buf(), root.join("c.txt"), root.join("missing")]);
        assert_eq!(
            files,
            vec![root.join("a.md"), root.join("sub/b.markdown"), root.join("c.txt")]
        );
    }

    #[test]
    fn test_resolve_sources_keeps_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("docs/guide")).unwrap();
        fs::write(root.join("docs/index.md"), "").unwrap();
        fs::write(root.join("docs/guide/index.md"), "").unwrap();
        fs::write(root.join("single.md"), "").unwrap();

        let sources = resolve_sources(&[root.join("docs"), root.join("single.md")]);
        let relative: Vec<PathBuf> = sources.into_iter().map(|s| s.relative).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("guide/index.md"),
                PathBuf::from("index.md"),
                PathBuf::from("single.md"),
            ]
        );
    }

    #[test]
    fn test_write_atomic_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out/deep/file.js");
        write_atomic(&target, "export default 1;\n").unwrap();
        assert_eq!(read_to_string(&target).unwrap(), "export default 1;\n");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_to_string(Path::new("/nonexistent/file.md")).unwrap_err();
        assert!(matches!(err, TaggedFileError::FileNotFound { .. }));
    }
}
