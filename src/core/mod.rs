//! Core library types and functionality for tagged files
//!
//! This module contains the pure, filesystem-free parts of the library:
//! - scanner: splitting a buffer into metadata and body
//! - entities and title: heading detection in HTML
//! - slug: path based routing identifiers
//! - dialect and emitter: generation of the exporting module
//! - schema: metadata validation

pub mod dialect;
pub mod emitter;
pub mod entities;
pub mod schema;
pub mod scanner;
pub mod slug;
pub mod title;

pub use dialect::{rewrite_default_export, write_export, write_import, ModuleDialect};
pub use emitter::{render, ExportPolicy, ExportSpec, Extra, KeyTransform};
pub use entities::decode_entities;
pub use schema::MetadataSchema;
pub use scanner::{split, Metadata, ParserMode, TaggedDocument};
pub use slug::Slug;
pub use title::{extract_title, TitleOptions};
