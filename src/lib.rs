//! tagged-file: turn metadata-tagged markdown files into JavaScript modules
//!
//! A tagged file starts with a metadata block, either a JSON value or YAML
//! front matter between `---` lines, followed by free-form content. This
//! library splits such files, passes the content through a configurable stage
//! pipeline, and generates a module that exports the processed content, the
//! metadata and a path derived slug in ES module or CommonJS syntax.
//!
//! # Quick Start
//!
//! ## Splitting
//!
//! ```rust
//! use tagged_file::{split, ParserMode, Result};
//!
//! fn main() -> Result<()> {
//!     let doc = split("{\"title\": \"Hello\"}\n# Hello", ParserMode::Auto)?;
//!     assert_eq!(doc.metadata()["title"], "Hello");
//!     assert_eq!(doc.body(), "\n# Hello");
//!
//!     let doc = split("---\ntitle: Hello\n---\n# Hello", ParserMode::Auto)?;
//!     assert_eq!(doc.body(), "# Hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Generating a module
//!
//! ```rust
//! use std::path::Path;
//! use tagged_file::{LoaderOptions, StageDescriptor, TaggedFileLoader, Result};
//!
//! fn main() -> Result<()> {
//!     let options = LoaderOptions {
//!         loaders: vec![StageDescriptor::new("raw"), StageDescriptor::new("trim")],
//!         ..Default::default()
//!     };
//!     let loader = TaggedFileLoader::new(options)?;
//!     let output = futures::executor::block_on(
//!         loader.load(Path::new("docs/guides/setup.md"), "{\"order\": 1}\n# Setup\n"),
//!     )?;
//!     assert!(output.code.contains("export const order = 1;"));
//!     assert!(output.code.contains("export const slug = \"guides/setup\";"));
//!     Ok(())
//! }
//! ```
//!
//! ## Title detection
//!
//! ```rust
//! use tagged_file::{extract_title, TitleOptions};
//!
//! let title = extract_title("<h2 class=\"a\">Hi &amp; Bye</h2>", &TitleOptions::default());
//! assert_eq!(title.as_deref(), Some("Hi & Bye"));
//! ```
//!
//! # Architecture
//!
//! - [`core`]: splitting, slugs, title detection, module generation, schema checks
//! - [`pipeline`]: stages the content passes through
//! - [`loader`]: the per-file orchestration and its options
//! - [`io`]: file resolution, reading, atomic writes, config files
//! - [`error`]: the error type shared by all of the above

// Public API exports
pub use error::{ErrorSeverity, Result, TaggedFileError};

// Core types
pub use core::{
    decode_entities, extract_title, render, split, ExportPolicy, ExportSpec, Extra,
    KeyTransform, Metadata, MetadataSchema, ModuleDialect, ParserMode, Slug, TaggedDocument,
    TitleOptions,
};

// Pipeline and loader types
pub use loader::{Destructure, LoadOutput, LoaderOptions, TaggedFileLoader};
pub use pipeline::{Stage, StageContext, StageDescriptor, StageRegistry};

pub mod core;
pub mod error;
pub mod io;
pub mod loader;
pub mod pipeline;
