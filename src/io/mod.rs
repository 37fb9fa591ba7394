pub mod config;
pub mod fs;

pub use config::{load_options, parse_options, ConfigFormat};
pub use fs::{is_markdown, read_to_string, resolve_files, resolve_sources, write_atomic, SourceFile};
