//! Stages that ship with the library

use crate::core::dialect::{write_export, ModuleDialect};
use crate::core::emitter::{is_identifier, DEFAULT_EXPORT_NAME};
use crate::core::schema::MetadataSchema;
use crate::error::{Result, TaggedFileError};
use crate::pipeline::stage::{Stage, StageContext};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Turns text into a module whose default export is that text.
///
/// Options: `esModule` (default `true`) picks the dialect, `exportName`
/// (default `code`) the binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStage;

impl RawStage {
    pub const NAME: &'static str = "raw";

    fn schema() -> Result<MetadataSchema> {
        MetadataSchema::new(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "esModule": {"type": ["boolean", "string"]},
                "exportName": {"type": "string", "minLength": 1}
            }
        }))
    }
}

#[async_trait]
impl Stage for RawStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: String, ctx: &StageContext<'_>) -> Result<String> {
        let options = ctx.get_options_with_schema(&Self::schema()?)?;
        let es_module = match options.get("esModule") {
            None => true,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.parse::<bool>().map_err(|_| {
                TaggedFileError::pipeline(Self::NAME, format!("esModule must be true or false, got '{}'", flag))
            })?,
            Some(other) => {
                return Err(TaggedFileError::pipeline(
                    Self::NAME,
                    format!("esModule must be a boolean, got {}", other),
                ))
            }
        };
        let name = options
            .get("exportName")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_EXPORT_NAME);
        if !is_identifier(name) {
            return Err(TaggedFileError::pipeline(
                Self::NAME,
                format!("'{}' is not a valid export name", name),
            ));
        }

        let mut module = format!("const {} = {};\n", name, Value::from(input));
        module.push_str(&write_export(ModuleDialect::from_es_flag(es_module), None, name));
        Ok(module)
    }
}

/// Strips leading and trailing whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimStage;

impl TrimStage {
    pub const NAME: &'static str = "trim";
}

#[async_trait]
impl Stage for TrimStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: String, _ctx: &StageContext<'_>) -> Result<String> {
        Ok(input.trim().to_string())
    }
}
