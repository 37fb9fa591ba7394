//! Stage descriptors and the context a running stage sees

use crate::core::schema::MetadataSchema;
use crate::error::{Result, TaggedFileError};
use crate::pipeline::runner::VirtualFs;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// One entry of the configured stage list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DescriptorRepr")]
pub struct StageDescriptor {
    /// Registered name of the stage
    pub loader: String,
    /// Options as configured: an object, a string, or nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorRepr {
    Name(String),
    Full {
        loader: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl From<DescriptorRepr> for StageDescriptor {
    fn from(repr: DescriptorRepr) -> Self {
        match repr {
            DescriptorRepr::Name(loader) => Self {
                loader,
                options: None,
            },
            DescriptorRepr::Full { loader, options } => Self { loader, options },
        }
    }
}

impl StageDescriptor {
    /// Descriptor without options
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    /// Attach options
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// A transformation of the body text
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name descriptors refer to this stage by
    fn name(&self) -> &str;

    /// Transform `input`, the previous stage's output
    async fn process(&self, input: String, ctx: &StageContext<'_>) -> Result<String>;
}

/// What a stage can see while it runs.
///
/// The stage list is shared and immutable; the context only carries the
/// position of the running stage within it.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    stages: &'a [StageDescriptor],
    index: usize,
    resource: &'a Path,
    fs: &'a VirtualFs,
}

impl<'a> StageContext<'a> {
    pub(crate) fn new(
        stages: &'a [StageDescriptor],
        index: usize,
        resource: &'a Path,
        fs: &'a VirtualFs,
    ) -> Self {
        Self {
            stages,
            index,
            resource,
            fs,
        }
    }

    /// Position of the running stage in the configured list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of configured stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Path of the file being processed
    pub fn resource(&self) -> &Path {
        self.resource
    }

    /// Descriptor of the running stage
    pub fn current(&self) -> Option<&'a StageDescriptor> {
        self.stages.get(self.index)
    }

    /// Read a file through the pipeline's virtual filesystem
    pub fn read(&self, path: &Path) -> Result<&'a str> {
        self.fs.read(path)
    }

    /// Read the (metadata free) body of the resource
    pub fn read_resource(&self) -> Result<&'a str> {
        self.fs.read(self.resource)
    }

    /// Options of the running stage as a JSON object.
    ///
    /// Missing options give `{}`. String options are parsed as JSON when they
    /// look like an object, and as a query string otherwise.
    pub fn get_options(&self) -> Result<Value> {
        match self.current().and_then(|stage| stage.options.as_ref()) {
            None | Some(Value::Null) => Ok(Value::Object(Map::new())),
            Some(Value::String(raw)) if raw.starts_with('{') && raw.ends_with('}') => {
                serde_json::from_str(raw).map_err(|e| {
                    TaggedFileError::invalid_options(format!("Cannot parse string options: {}", e))
                })
            }
            Some(Value::String(raw)) => Ok(parse_query(raw)),
            Some(other) => Ok(other.clone()),
        }
    }

    /// Options of the running stage, checked against `schema`
    pub fn get_options_with_schema(&self, schema: &MetadataSchema) -> Result<Value> {
        let options = self.get_options()?;
        let name = self.current().map(|stage| stage.loader.as_str()).unwrap_or("stage");
        schema.validate_value(&options, "options", name)?;
        Ok(options)
    }
}

/// Parse `a=1&b=2&b=3` into `{"a":"1","b":["2","3"]}`
fn parse_query(raw: &str) -> Value {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = Value::String(value.into_owned());
        match map.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(map)
}
