//! Processing of a single tagged file from raw buffer to generated module
//!
//! [`TaggedFileLoader`] ties the pieces together: it splits the buffer,
//! validates the metadata, runs the body through the configured stages,
//! derives the slug and renders the module.

use crate::core::dialect::ModuleDialect;
use crate::core::emitter::{
    self, ExportPolicy, ExportSpec, Extra, DEFAULT_EXPORT_NAME, DEFAULT_METADATA_NAME,
    DEFAULT_TITLE_HELPER_MODULE,
};
use crate::core::schema::MetadataSchema;
use crate::core::scanner::{self, Metadata, ParserMode};
use crate::core::slug::Slug;
use crate::error::{Result, TaggedFileError};
use crate::pipeline::{run_stages, StageDescriptor, StageRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// `destructure` option: a flag or the name of the combined export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destructure {
    Flag(bool),
    Name(String),
}

impl Destructure {
    /// Export policy this option selects
    pub fn policy(option: Option<&Destructure>) -> ExportPolicy {
        match option {
            None | Some(Destructure::Flag(true)) => ExportPolicy::PerKey,
            Some(Destructure::Flag(false)) => ExportPolicy::Whole(DEFAULT_METADATA_NAME.to_string()),
            Some(Destructure::Name(name)) => ExportPolicy::Whole(name.clone()),
        }
    }
}

/// Loader configuration, as read from a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoaderOptions {
    /// Stages the body is passed through
    #[serde(default)]
    pub loaders: Vec<StageDescriptor>,
    /// Export every key (`true`, default), one `metadata` object (`false`),
    /// or one object with the given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructure: Option<Destructure>,
    #[serde(default = "default_export_name")]
    pub default_export_name: String,
    #[serde(default = "default_true")]
    pub input_es_module: bool,
    #[serde(default = "default_true")]
    pub output_es_module: bool,
    /// Report schema violations as warnings instead of failing
    #[serde(default)]
    pub validation_errors_as_warnings: bool,
    /// Metadata key to `"require"` or `"detect-title-html"`
    #[serde(default)]
    pub extras: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default)]
    pub parser: ParserMode,
    #[serde(default = "default_title_helper_module")]
    pub title_helper_module: String,
}

fn default_export_name() -> String {
    DEFAULT_EXPORT_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_title_helper_module() -> String {
    DEFAULT_TITLE_HELPER_MODULE.to_string()
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            loaders: Vec::new(),
            destructure: None,
            default_export_name: default_export_name(),
            input_es_module: true,
            output_es_module: true,
            validation_errors_as_warnings: false,
            extras: Map::new(),
            schema: None,
            parser: ParserMode::default(),
            title_helper_module: default_title_helper_module(),
        }
    }
}

impl LoaderOptions {
    /// Build the emitter configuration these options describe
    pub fn export_spec(&self) -> Result<ExportSpec> {
        let mut spec = ExportSpec {
            input_dialect: ModuleDialect::from_es_flag(self.input_es_module),
            output_dialect: ModuleDialect::from_es_flag(self.output_es_module),
            default_export_name: self.default_export_name.clone(),
            policy: Destructure::policy(self.destructure.as_ref()),
            extras: Vec::new(),
            title_helper_module: self.title_helper_module.clone(),
        };
        for (key, value) in &self.extras {
            let sentinel = value.as_str().ok_or_else(|| {
                TaggedFileError::invalid_options(format!("extra for '{}' must be a string", key))
            })?;
            spec.set_extra(key.clone(), Extra::from_sentinel(sentinel)?);
        }
        spec.check_names()?;
        Ok(spec)
    }
}

/// Result of processing one file
#[derive(Debug)]
pub struct LoadOutput {
    /// The generated module
    pub code: String,
    pub metadata: Metadata,
    pub slug: Slug,
    /// Non-fatal problems, such as downgraded validation failures
    pub warnings: Vec<TaggedFileError>,
}

/// Turns tagged files into modules
#[derive(Debug, Clone)]
pub struct TaggedFileLoader {
    options: LoaderOptions,
    spec: ExportSpec,
    schema: Option<MetadataSchema>,
    registry: StageRegistry,
}

impl TaggedFileLoader {
    /// Create a loader with the built-in stages registered
    pub fn new(options: LoaderOptions) -> Result<Self> {
        Self::with_registry(options, StageRegistry::with_builtins())
    }

    /// Create a loader resolving stages from `registry`
    pub fn with_registry(options: LoaderOptions, registry: StageRegistry) -> Result<Self> {
        let spec = options.export_spec()?;
        let schema = options.schema.clone().map(MetadataSchema::new).transpose()?;
        Ok(Self {
            options,
            spec,
            schema,
            registry,
        })
    }

    /// Render `key` through `transform`, overriding any configured extra
    pub fn with_transform<F>(mut self, key: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<String> + Send + Sync + 'static,
    {
        self.spec.set_extra(key, Extra::custom(transform));
        self
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Stage registry, for adding custom stages
    pub fn registry_mut(&mut self) -> &mut StageRegistry {
        &mut self.registry
    }

    /// Check `metadata` against the configured schema.
    ///
    /// Returns the validation failure as a warning when failures are
    /// downgraded, and as an error otherwise.
    pub fn validate(&self, metadata: &Metadata, resource: &Path) -> Result<Option<TaggedFileError>> {
        let Some(schema) = &self.schema else {
            return Ok(None);
        };
        match schema.validate(metadata, &resource.to_string_lossy()) {
            Ok(()) => Ok(None),
            Err(err) if self.options.validation_errors_as_warnings => {
                log::warn!("{}", err);
                Ok(Some(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Process the content of `resource`.
    ///
    /// Nothing is produced when any step fails.
    pub async fn load(&self, resource: &Path, buffer: &str) -> Result<LoadOutput> {
        log::debug!("loading {}", resource.display());

        let (metadata, body) = scanner::split(buffer, self.options.parser)?.into_parts();
        let warnings: Vec<TaggedFileError> = self.validate(&metadata, resource)?.into_iter().collect();

        let processed = run_stages(&self.registry, resource, body, &self.options.loaders).await?;
        let slug = Slug::from_path(resource)?;
        let code = emitter::render(&processed, &metadata, &slug, &self.spec)?;

        log::debug!(
            "generated {} bytes for {} ({} metadata keys, slug {})",
            code.len(),
            resource.display(),
            metadata.len(),
            slug
        );
        Ok(LoadOutput {
            code,
            metadata,
            slug,
            warnings,
        })
    }
}
