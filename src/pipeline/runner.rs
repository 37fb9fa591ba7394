//! Running a stage list over a body

use crate::error::{Result, TaggedFileError};
use crate::pipeline::registry::StageRegistry;
use crate::pipeline::stage::{StageContext, StageDescriptor};
use std::path::{Path, PathBuf};

/// A filesystem holding exactly one file
#[derive(Debug, Clone)]
pub struct VirtualFs {
    path: PathBuf,
    contents: String,
}

impl VirtualFs {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read `path`; anything but the served file is an error
    pub fn read(&self, path: &Path) -> Result<&str> {
        if path == self.path {
            Ok(&self.contents)
        } else {
            Err(TaggedFileError::virtual_fs(path))
        }
    }
}

/// Run `stages` over `body`, the content of `resource`.
///
/// Stages execute from last to first, each receiving the previous output;
/// the last stage starts from the body read through a [`VirtualFs`] that
/// serves only `resource`. All loader names are resolved before anything
/// runs. A failing stage's error is returned as is.
pub async fn run_stages(
    registry: &StageRegistry,
    resource: &Path,
    body: String,
    stages: &[StageDescriptor],
) -> Result<String> {
    let resolved = stages
        .iter()
        .map(|descriptor| {
            registry
                .get(&descriptor.loader)
                .ok_or_else(|| TaggedFileError::unknown_stage(&descriptor.loader))
        })
        .collect::<Result<Vec<_>>>()?;

    let fs = VirtualFs::new(resource, body);
    let mut content = fs.read(resource)?.to_string();

    for (index, stage) in resolved.iter().enumerate().rev() {
        log::debug!(
            "running stage '{}' ({}/{}) on {}",
            stage.name(),
            resolved.len() - index,
            resolved.len(),
            resource.display()
        );
        let ctx = StageContext::new(stages, index, resource, &fs);
        content = stage.process(content, &ctx).await.map_err(|e| {
            log::error!("stage '{}' failed on {}: {}", stage.name(), resource.display(), e);
            e
        })?;
    }

    Ok(content)
}
