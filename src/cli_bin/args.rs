//! Command-line argument definitions and parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application
#[derive(Parser)]
#[command(
    name = "tagged-file",
    version,
    about = "Turn JSON or front matter tagged markdown files into JavaScript modules",
    long_about = "tagged-file splits markdown files that start with a JSON or YAML metadata \
                  block, runs the content through a stage pipeline and writes a module \
                  exporting the content, every metadata field and a path derived slug."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate modules from tagged files
    Build(BuildArgs),
    /// Print the metadata and body of a tagged file as JSON
    Split(SplitArgs),
    /// Print the first heading of an HTML file
    Title(TitleArgs),
    /// Print the slug derived from paths
    Slug(SlugArgs),
    /// Check metadata against the configured schema
    Validate(ValidateArgs),
    /// Write the runtime title helper that title exports import
    Helper(HelperArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Files or directories to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Loader options file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured metadata parser
    #[arg(long, value_enum)]
    pub parser: Option<ParserArg>,

    /// Write modules into this directory instead of next to the sources
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Extension of generated modules
    #[arg(long, default_value = "js")]
    pub ext: String,

    /// Print generated modules instead of writing them
    #[arg(long)]
    pub stdout: bool,

    /// Report what would be written without writing
    #[arg(long, conflicts_with = "stdout")]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = ParserArg::Auto)]
    pub parser: ParserArg,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct TitleArgs {
    pub file: PathBuf,

    /// Printed when no heading is found
    #[arg(long = "default")]
    pub default_value: Option<String>,

    /// Number of characters to search
    #[arg(long, default_value_t = tagged_file::core::title::DEFAULT_LIMIT)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct SlugArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Loader options file holding the schema
    #[arg(short, long)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = ValidationFormat::Human)]
    pub format: ValidationFormat,
}

#[derive(Args, Debug)]
pub struct HelperArgs {
    /// Directory to write detect-title-html.cjs into; printed when omitted
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Metadata parser selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserArg {
    /// JSON value at the top of the file
    Json,
    /// YAML between `---` lines
    FrontMatter,
    /// Decide from the first three characters
    Auto,
}

/// Output formats for validate command
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ValidationFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

impl From<ParserArg> for tagged_file::ParserMode {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Json => Self::Json,
            ParserArg::FrontMatter => Self::FrontMatter,
            ParserArg::Auto => Self::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parsing() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_command() {
        let args = vec![
            "tagged-file", "build", "--config", "loader.yaml", "--parser", "front-matter",
            "--out-dir", "dist", "docs/",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Build(build_args) = cli.command {
            assert_eq!(build_args.config, Some(PathBuf::from("loader.yaml")));
            assert_eq!(build_args.parser, Some(ParserArg::FrontMatter));
            assert_eq!(build_args.out_dir, Some(PathBuf::from("dist")));
            assert_eq!(build_args.ext, "js");
            assert_eq!(build_args.files, vec![PathBuf::from("docs/")]);
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_stdout_conflicts_with_dry_run() {
        let args = vec!["tagged-file", "build", "--stdout", "--dry-run", "a.md"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_title_command() {
        let args = vec!["tagged-file", "title", "--default", "none", "page.html"];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Title(title_args) = cli.command {
            assert_eq!(title_args.default_value, Some("none".to_string()));
            assert_eq!(title_args.limit, 1024);
        } else {
            panic!("Expected Title command");
        }
    }

    #[test]
    fn test_helper_command() {
        let cli = Cli::try_parse_from(["tagged-file", "helper", "--out-dir", "dist"]).unwrap();
        if let Commands::Helper(helper_args) = cli.command {
            assert_eq!(helper_args.out_dir, Some(PathBuf::from("dist")));
        } else {
            panic!("Expected Helper command");
        }
    }

    #[test]
    fn test_validate_requires_config() {
        let args = vec!["tagged-file", "validate", "a.md"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
