//! Structural validation of metadata and stage options
//!
//! Supports the subset of JSON Schema that tagged file metadata is usually
//! checked with:
//! - types: `type`, `enum`, `const`
//! - strings: `minLength`, `maxLength`, `pattern`
//! - numbers: `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`,
//!   `multipleOf`
//! - objects: `properties`, `required`, `additionalProperties` (boolean or
//!   schema), `minProperties`, `maxProperties`
//! - arrays: `items`, `minItems`, `maxItems`, `uniqueItems`
//! - combinators: `allOf`, `anyOf`, `oneOf`, `not`
//!
//! Annotations such as `title` and `description` are accepted and ignored.
//! A schema using any other keyword is rejected when it is created, so a
//! check is never silently skipped.

use crate::core::scanner::Metadata;
use crate::error::{Result, TaggedFileError};
use regex::Regex;
use serde_json::{Map, Value};

const TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "object", "null"];

const ANNOTATIONS: &[&str] = &[
    "$schema", "$id", "$comment", "title", "description", "default", "examples",
    "deprecated", "readOnly", "writeOnly",
];

const SCHEMA_KEYWORDS: &[&str] = &["items", "not", "additionalProperties"];
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];
const COUNT_KEYWORDS: &[&str] = &[
    "minLength", "maxLength", "minItems", "maxItems", "minProperties", "maxProperties",
];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf",
];

/// A schema that metadata must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSchema {
    schema: Value,
}

impl MetadataSchema {
    /// Wrap a schema value.
    ///
    /// Fails with `InvalidOptions` when the schema is not an object or uses
    /// a keyword, type name or pattern this validator does not support.
    pub fn new(schema: Value) -> Result<Self> {
        if !schema.is_object() {
            return Err(TaggedFileError::invalid_options("schema must be an object"));
        }
        check_schema(&schema, "#")?;
        Ok(Self { schema })
    }

    /// Get the raw schema
    pub fn as_value(&self) -> &Value {
        &self.schema
    }

    /// Validate the metadata of `resource`
    pub fn validate(&self, metadata: &Metadata, resource: &str) -> Result<()> {
        self.validate_value(&Value::Object(metadata.clone()), "metadata", resource)
    }

    /// Validate any value, naming its root `root` in messages
    pub fn validate_value(&self, value: &Value, root: &str, resource: &str) -> Result<()> {
        let mut violations = Vec::new();
        check(&self.schema, value, root, &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(TaggedFileError::validation(resource, violations.join("; ")))
        }
    }
}

fn unsupported(location: &str, detail: impl std::fmt::Display) -> TaggedFileError {
    TaggedFileError::invalid_options(format!("schema at {}: {}", location, detail))
}

/// Reject schemas this validator cannot fully enforce
fn check_schema(schema: &Value, location: &str) -> Result<()> {
    let map = match schema {
        Value::Object(map) => map,
        Value::Bool(_) => return Ok(()),
        other => return Err(unsupported(location, format!("expected a schema, found {}", other))),
    };

    for (keyword, value) in map {
        let here = format!("{}/{}", location, keyword);
        match keyword.as_str() {
            k if ANNOTATIONS.contains(&k) => {}
            "type" => check_type_names(value, &here)?,
            "enum" if value.is_array() => {}
            "const" => {}
            "required" if is_string_list(value) => {}
            "pattern" => {
                let pattern = value
                    .as_str()
                    .ok_or_else(|| unsupported(&here, "pattern must be a string"))?;
                Regex::new(pattern).map_err(|e| unsupported(&here, e))?;
            }
            "uniqueItems" if value.is_boolean() => {}
            k if COUNT_KEYWORDS.contains(&k) && value.is_u64() => {}
            k if NUMBER_KEYWORDS.contains(&k) && value.is_number() => {
                if k == "multipleOf" && value.as_f64().map_or(true, |n| n <= 0.0) {
                    return Err(unsupported(&here, "multipleOf must be positive"));
                }
            }
            k if SCHEMA_KEYWORDS.contains(&k) => check_schema(value, &here)?,
            k if SCHEMA_LIST_KEYWORDS.contains(&k) => match value {
                Value::Array(schemas) if !schemas.is_empty() => {
                    for (index, schema) in schemas.iter().enumerate() {
                        check_schema(schema, &format!("{}/{}", here, index))?;
                    }
                }
                _ => return Err(unsupported(&here, "expected a non-empty list of schemas")),
            },
            "properties" => {
                let properties = value
                    .as_object()
                    .ok_or_else(|| unsupported(&here, "properties must be an object"))?;
                for (name, schema) in properties {
                    check_schema(schema, &format!("{}/{}", here, name))?;
                }
            }
            _ if is_known(keyword) => {
                return Err(unsupported(&here, format!("invalid value {}", value)))
            }
            _ => return Err(unsupported(location, format!("unsupported keyword '{}'", keyword))),
        }
    }
    Ok(())
}

fn is_known(keyword: &str) -> bool {
    matches!(
        keyword,
        "type" | "enum" | "const" | "required" | "pattern" | "uniqueItems" | "properties"
    ) || COUNT_KEYWORDS.contains(&keyword)
        || NUMBER_KEYWORDS.contains(&keyword)
        || SCHEMA_KEYWORDS.contains(&keyword)
        || SCHEMA_LIST_KEYWORDS.contains(&keyword)
}

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn check_type_names(value: &Value, location: &str) -> Result<()> {
    let names: Vec<&Value> = match value {
        Value::Array(names) if !names.is_empty() => names.iter().collect(),
        Value::String(_) => vec![value],
        _ => return Err(unsupported(location, "type must be a name or a list of names")),
    };
    for name in names {
        match name.as_str() {
            Some(name) if TYPES.contains(&name) => {}
            _ => return Err(unsupported(location, format!("unknown type {}", name))),
        }
    }
    Ok(())
}

fn check(schema: &Value, value: &Value, path: &str, violations: &mut Vec<String>) {
    let schema = match schema {
        Value::Object(map) => map,
        Value::Bool(true) => return,
        Value::Bool(false) => {
            violations.push(format!("{} is not allowed", path));
            return;
        }
        _ => return,
    };

    if let Some(expected) = schema.get("type") {
        let allowed: Vec<&str> = match expected {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.iter().any(|name| has_type(value, name)) {
            violations.push(format!("{} should be {}", path, allowed.join(" or ")));
            return;
        }
    }

    if let Some(Value::Array(options)) = schema.get("enum") {
        if !options.iter().any(|option| json_equal(option, value)) {
            let listed: Vec<String> = options.iter().map(Value::to_string).collect();
            violations.push(format!("{} should be one of {}", path, listed.join(", ")));
        }
    }
    if let Some(expected) = schema.get("const") {
        if !json_equal(expected, value) {
            violations.push(format!("{} should be {}", path, expected));
        }
    }

    match value {
        Value::String(text) => check_string(schema, text, path, violations),
        Value::Number(_) => check_number(schema, value, path, violations),
        Value::Object(map) => check_object(schema, map, path, violations),
        Value::Array(items) => check_array(schema, items, path, violations),
        _ => {}
    }

    check_combinators(schema, value, path, violations);
}

fn check_string(schema: &Map<String, Value>, text: &str, path: &str, violations: &mut Vec<String>) {
    let length = text.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            violations.push(format!("{} should have at least {} characters", path, min));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            violations.push(format!("{} should have at most {} characters", path, max));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        // Patterns were compiled once when the schema was created
        if let Ok(regex) = Regex::new(pattern) {
            if !regex.is_match(text) {
                violations.push(format!("{} should match pattern \"{}\"", path, pattern));
            }
        }
    }
}

fn check_number(schema: &Map<String, Value>, value: &Value, path: &str, violations: &mut Vec<String>) {
    let Some(number) = value.as_f64() else {
        return;
    };
    let bound = |keyword: &str| schema.get(keyword).and_then(Value::as_f64);
    if let Some(min) = bound("minimum") {
        if number < min {
            violations.push(format!("{} should be >= {}", path, schema["minimum"]));
        }
    }
    if let Some(max) = bound("maximum") {
        if number > max {
            violations.push(format!("{} should be <= {}", path, schema["maximum"]));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if number <= min {
            violations.push(format!("{} should be > {}", path, schema["exclusiveMinimum"]));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if number >= max {
            violations.push(format!("{} should be < {}", path, schema["exclusiveMaximum"]));
        }
    }
    if let Some(step) = bound("multipleOf") {
        let quotient = number / step;
        if (quotient - quotient.round()).abs() > 1e-9 {
            violations.push(format!("{} should be a multiple of {}", path, schema["multipleOf"]));
        }
    }
}

fn check_object(
    schema: &Map<String, Value>,
    map: &Map<String, Value>,
    path: &str,
    violations: &mut Vec<String>,
) {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(key) {
                violations.push(format!("{} misses the property '{}'", path, key));
            }
        }
    }
    let count = map.len() as u64;
    if let Some(min) = schema.get("minProperties").and_then(Value::as_u64) {
        if count < min {
            violations.push(format!("{} should have at least {} properties", path, min));
        }
    }
    if let Some(max) = schema.get("maxProperties").and_then(Value::as_u64) {
        if count > max {
            violations.push(format!("{} should have at most {} properties", path, max));
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties");
    for (key, child) in map {
        let child_path = format!("{}.{}", path, key);
        match (properties.and_then(|props| props.get(key)), additional) {
            (Some(child_schema), _) => check(child_schema, child, &child_path, violations),
            (None, Some(Value::Bool(false))) => {
                violations.push(format!("{} has an unknown property '{}'", path, key));
            }
            (None, Some(extra_schema)) => check(extra_schema, child, &child_path, violations),
            (None, None) => {}
        }
    }
}

fn check_array(schema: &Map<String, Value>, items: &[Value], path: &str, violations: &mut Vec<String>) {
    let count = items.len() as u64;
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if count < min {
            violations.push(format!("{} should have at least {} items", path, min));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if count > max {
            violations.push(format!("{} should have at most {} items", path, max));
        }
    }
    if schema.get("uniqueItems") == Some(&Value::Bool(true)) {
        let duplicated = items
            .iter()
            .enumerate()
            .any(|(i, a)| items[i + 1..].iter().any(|b| json_equal(a, b)));
        if duplicated {
            violations.push(format!("{} should not contain duplicate items", path));
        }
    }
    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{}[{}]", path, index), violations);
        }
    }
}

fn check_combinators(
    schema: &Map<String, Value>,
    value: &Value,
    path: &str,
    violations: &mut Vec<String>,
) {
    let passes = |sub: &Value| -> bool {
        let mut inner = Vec::new();
        check(sub, value, path, &mut inner);
        inner.is_empty()
    };

    if let Some(Value::Array(schemas)) = schema.get("allOf") {
        for sub in schemas {
            check(sub, value, path, violations);
        }
    }
    if let Some(Value::Array(schemas)) = schema.get("anyOf") {
        if !schemas.iter().any(passes) {
            violations.push(format!("{} should match at least one allowed schema", path));
        }
    }
    if let Some(Value::Array(schemas)) = schema.get("oneOf") {
        let matched = schemas.iter().filter(|sub| passes(sub)).count();
        if matched != 1 {
            violations.push(format!(
                "{} should match exactly one allowed schema, matched {}",
                path, matched
            ));
        }
    }
    if let Some(sub) = schema.get("not") {
        if passes(sub) {
            violations.push(format!("{} should not match the excluded schema", path));
        }
    }
}

fn has_type(value: &Value, name: &str) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.as_f64().is_some_and(|n| n.fract() == 0.0),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => false,
    }
}

/// JSON equality with numbers compared by value, so `1` equals `1.0`
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}
