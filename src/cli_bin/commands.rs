//! CLI command handlers that bridge CLI arguments to library operations

use crate::cli_bin::args::*;
use anyhow::{bail, Context, Result};
use futures::executor::block_on;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tagged_file::core::title::{HELPER_FILE_NAME, HELPER_SOURCE};
use tagged_file::core::{extract_title, split, MetadataSchema, Slug, TitleOptions};
use tagged_file::io::{
    load_options, read_to_string, resolve_files, resolve_sources, write_atomic, SourceFile,
};
use tagged_file::{LoaderOptions, TaggedFileLoader};

/// Execute the build command
pub fn build_command(args: BuildArgs) -> Result<()> {
    debug!("Executing build command with args: {:?}", args);

    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => LoaderOptions::default(),
    };
    if let Some(parser) = args.parser {
        options.parser = parser.into();
    }
    let loader = TaggedFileLoader::new(options)?;

    let sources = resolve_sources(&args.files);
    if sources.is_empty() {
        warn!("No files found to process");
        return Ok(());
    }
    let targets = plan_targets(&sources, args.out_dir.as_deref(), &args.ext)?;

    let mut failed = 0;
    for (source, target) in sources.iter().zip(&targets) {
        let file = &source.path;
        debug!("Processing file: {}", file.display());
        let output = match read_to_string(file).and_then(|buffer| block_on(loader.load(file, &buffer))) {
            Ok(output) => output,
            Err(e) => {
                error!("{} [{}]: {}", file.display(), e.severity(), e);
                failed += 1;
                continue;
            }
        };
        for warning in &output.warnings {
            debug!("{}: continuing despite {}", file.display(), warning);
        }

        if args.stdout {
            println!("// {}", target.display());
            print!("{}", output.code);
        } else if args.dry_run {
            println!("Would write {} ({} bytes)", target.display(), output.code.len());
        } else {
            write_atomic(target, &output.code)?;
            info!("Wrote {}", target.display());
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, sources.len());
    }
    Ok(())
}

/// Targets of every source, in order. Two sources sharing a target is an
/// error, raised before anything is written.
fn plan_targets(sources: &[SourceFile], out_dir: Option<&Path>, ext: &str) -> Result<Vec<PathBuf>> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut targets = Vec::with_capacity(sources.len());
    for source in sources {
        let target = target_path(source, out_dir, ext)?;
        if let Some(previous) = seen.insert(target.clone(), &source.path) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                source.path.display(),
                target.display()
            );
        }
        targets.push(target);
    }
    Ok(targets)
}

/// Where the module generated for `source` goes.
///
/// Inside `out_dir` the source's position below the walked directory is
/// kept.
fn target_path(source: &SourceFile, out_dir: Option<&Path>, ext: &str) -> Result<PathBuf> {
    let stem = source
        .path
        .file_stem()
        .with_context(|| format!("{} has no file name", source.path.display()))?;
    let file_name = format!("{}.{}", stem.to_string_lossy(), ext);
    match out_dir {
        None => Ok(source.path.with_file_name(file_name)),
        Some(dir) => {
            let parent = source.relative.parent().unwrap_or_else(|| Path::new(""));
            Ok(dir.join(parent).join(file_name))
        }
    }
}

/// Execute the helper command
pub fn helper_command(args: HelperArgs) -> Result<()> {
    match &args.out_dir {
        Some(dir) => {
            let target = dir.join(HELPER_FILE_NAME);
            write_atomic(&target, HELPER_SOURCE)?;
            info!("Wrote {}", target.display());
        }
        None => print!("{}", HELPER_SOURCE),
    }
    Ok(())
}

/// Execute the split command
pub fn split_command(args: SplitArgs) -> Result<()> {
    let buffer = read_to_string(&args.file)?;
    let document = split(&buffer, args.parser.into())
        .with_context(|| format!("failed to split {}", args.file.display()))?;
    let json = serde_json::json!({
        "metadata": document.metadata(),
        "body": document.body(),
    });
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", json);
    }
    Ok(())
}

/// Execute the title command
pub fn title_command(args: TitleArgs) -> Result<()> {
    let html = read_to_string(&args.file)?;
    let options = TitleOptions {
        default_value: args.default_value,
        limit: args.limit,
    };
    match extract_title(&html, &options) {
        Some(title) => println!("{}", title),
        None => info!("No heading found in {}", args.file.display()),
    }
    Ok(())
}

/// Execute the slug command
pub fn slug_command(args: SlugArgs) -> Result<()> {
    for path in &args.paths {
        println!("{}", Slug::from_path(path)?);
    }
    Ok(())
}

/// Execute the validate command
pub fn validate_command(args: ValidateArgs) -> Result<()> {
    let options = load_options(&args.config)?;
    let Some(schema) = options.schema.clone() else {
        bail!("{} does not define a schema", args.config.display());
    };
    let schema = MetadataSchema::new(schema)?;

    let files = resolve_files(&args.files);
    if files.is_empty() {
        warn!("No files found to process");
        return Ok(());
    }

    let results: Vec<(PathBuf, tagged_file::Result<()>)> = files
        .into_iter()
        .map(|file| {
            let result = read_to_string(&file)
                .and_then(|buffer| split(&buffer, options.parser))
                .and_then(|document| schema.validate(document.metadata(), &file.to_string_lossy()));
            (file, result)
        })
        .collect();

    output_validation_results(&results, &args.format)?;

    let invalid = results.iter().filter(|(_, result)| result.is_err()).count();
    if invalid > 0 {
        bail!("{} of {} files are invalid", invalid, results.len());
    }
    Ok(())
}

fn output_validation_results(
    results: &[(PathBuf, tagged_file::Result<()>)],
    format: &ValidationFormat,
) -> Result<()> {
    match format {
        ValidationFormat::Human => {
            for (path, result) in results {
                match result {
                    Ok(()) => println!("{}: ✓ OK", path.display()),
                    Err(error) => println!("{}: ✗ ERROR - {}", path.display(), error),
                }
            }
        }
        ValidationFormat::Json => {
            let json_results: Vec<serde_json::Value> = results
                .iter()
                .map(|(path, result)| {
                    serde_json::json!({
                        "file": path.to_string_lossy(),
                        "valid": result.is_ok(),
                        "error": result.as_ref().err().map(|e| e.to_string()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_results)?);
        }
    }
    Ok(())
}
