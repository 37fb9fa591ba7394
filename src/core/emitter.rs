//! Generation of the module that exports a processed body and its metadata
//!
//! [`render`] appends export statements to the pipeline's output: the
//! metadata (one export per key, or one object), the slug, and any values
//! derived through [`Extra`] transforms.

use crate::core::dialect::{rewrite_default_export, write_export, write_import, ModuleDialect};
use crate::core::scanner::Metadata;
use crate::core::slug::Slug;
use crate::error::{Result, TaggedFileError};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Default name of the body's default export binding
pub const DEFAULT_EXPORT_NAME: &str = "code";

/// Name of the combined metadata export when none is given
pub const DEFAULT_METADATA_NAME: &str = "metadata";

/// Module imported by title detection exports
pub const DEFAULT_TITLE_HELPER_MODULE: &str = "tagged-file/detect-title-html";

/// Extras value that derives a key from the body's first heading
pub const DETECT_TITLE_HTML: &str = "detect-title-html";

/// Extras value that turns a metadata value into a module reference
pub const REQUIRE_REFERENCE: &str = "require";

/// Name of the export holding the file's slug
pub const SLUG_EXPORT: &str = "slug";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier pattern"));

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Caller supplied rendering of one metadata value.
///
/// Receives the value and its key and returns a JavaScript expression that is
/// spliced into the output as is.
pub type KeyTransform = Arc<dyn Fn(&Value, &str) -> Result<String> + Send + Sync>;

/// Extra rendering attached to a metadata key
#[derive(Clone)]
pub enum Extra {
    /// Render the value as `require(<value>)`
    RequireReference,
    /// Export the first heading of the body under this key
    DetectTitleHtml,
    /// Render the value through a caller supplied function
    Custom(KeyTransform),
}

impl Extra {
    /// Parse a sentinel string from configuration
    pub fn from_sentinel(value: &str) -> Result<Self> {
        match value {
            REQUIRE_REFERENCE => Ok(Extra::RequireReference),
            DETECT_TITLE_HTML => Ok(Extra::DetectTitleHtml),
            other => Err(TaggedFileError::invalid_options(format!(
                "unknown extra '{}', expected '{}' or '{}'",
                other, REQUIRE_REFERENCE, DETECT_TITLE_HTML
            ))),
        }
    }

    /// Wrap a closure as a custom transform
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<String> + Send + Sync + 'static,
    {
        Extra::Custom(Arc::new(transform))
    }
}

impl fmt::Debug for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extra::RequireReference => write!(f, "RequireReference"),
            Extra::DetectTitleHtml => write!(f, "DetectTitleHtml"),
            Extra::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// How metadata is exported
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportPolicy {
    /// One named export per metadata key
    #[default]
    PerKey,
    /// A single object export under the given name
    Whole(String),
}

/// Everything [`render`] needs to know besides the content itself
#[derive(Debug, Clone)]
pub struct ExportSpec {
    /// Dialect the pipeline output is written in
    pub input_dialect: ModuleDialect,
    /// Dialect of the generated module
    pub output_dialect: ModuleDialect,
    /// Binding the body's default export uses
    pub default_export_name: String,
    pub policy: ExportPolicy,
    /// Extra renderings, in declaration order
    pub extras: Vec<(String, Extra)>,
    /// Module path imported for title detection
    pub title_helper_module: String,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            input_dialect: ModuleDialect::EsModule,
            output_dialect: ModuleDialect::EsModule,
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
            policy: ExportPolicy::default(),
            extras: Vec::new(),
            title_helper_module: DEFAULT_TITLE_HELPER_MODULE.to_string(),
        }
    }
}

impl ExportSpec {
    /// Find the extra registered for `key`
    pub fn extra_for(&self, key: &str) -> Option<&Extra> {
        self.extras
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, extra)| extra)
    }

    /// Set or replace the extra for `key`, keeping its original position
    pub fn set_extra(&mut self, key: impl Into<String>, extra: Extra) {
        let key = key.into();
        match self.extras.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = extra,
            None => self.extras.push((key, extra)),
        }
    }

    fn title_keys(&self) -> impl Iterator<Item = &str> {
        self.extras.iter().filter_map(|(key, extra)| match extra {
            Extra::DetectTitleHtml => Some(key.as_str()),
            _ => None,
        })
    }

    /// Keys whose binding is produced by the emitter or the body itself
    fn is_derived(&self, key: &str) -> bool {
        key == SLUG_EXPORT
            || key == self.default_export_name
            || self
                .title_keys()
                .any(|title| title == key || title_binding(title) == key)
    }

    /// Check that every binding the generated module declares is a valid,
    /// distinct identifier.
    pub fn check_names(&self) -> Result<()> {
        let name = &self.default_export_name;
        if !is_identifier(name) || name == SLUG_EXPORT {
            return Err(TaggedFileError::invalid_options(format!(
                "defaultExportName '{}' is not usable as an export name",
                name
            )));
        }
        for key in self.title_keys() {
            if !is_identifier(key) || key == SLUG_EXPORT || key == name {
                return Err(TaggedFileError::invalid_options(format!(
                    "title export '{}' is not usable as an export name",
                    key
                )));
            }
        }
        if let ExportPolicy::Whole(whole) = &self.policy {
            if !is_identifier(whole)
                || whole == SLUG_EXPORT
                || whole == name
                || self.title_keys().any(|title| title == whole)
            {
                return Err(TaggedFileError::invalid_options(format!(
                    "destructure name '{}' is not usable as an export name",
                    whole
                )));
            }
        }
        Ok(())
    }
}

/// Whether `name` can be used as an exported binding
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !RESERVED_WORDS.contains(&name)
}

/// Render `value` as the expression exported for `key`
pub fn render_value(key: &str, value: &Value, spec: &ExportSpec) -> Result<String> {
    match spec.extra_for(key) {
        Some(Extra::Custom(transform)) => transform(value, key),
        Some(Extra::RequireReference) if value.is_null() => Ok("null".to_string()),
        Some(Extra::RequireReference) => Ok(format!("require({})", serde_json::to_string(value)?)),
        Some(Extra::DetectTitleHtml) | None => Ok(serde_json::to_string(value)?),
    }
}

/// Binding the title helper is imported under for `key`.
///
/// `_` is doubled and any other non-alphanumeric character becomes
/// `_<hex>_`, so distinct keys never share a binding.
fn title_binding(key: &str) -> String {
    let mut mangled = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => mangled.push(c),
            '_' => mangled.push_str("__"),
            c => mangled.push_str(&format!("_{:x}_", u32::from(c))),
        }
    }
    format!("__PARSE_TITLE_HTML_{}_", mangled)
}

/// Append metadata, slug and derived exports to `body`.
///
/// `body` is the pipeline output. A trailing default export written in the
/// input dialect is first rewritten into the output dialect.
pub fn render(body: &str, metadata: &Metadata, slug: &Slug, spec: &ExportSpec) -> Result<String> {
    spec.check_names()?;
    let out = spec.output_dialect;
    let mut text = rewrite_default_export(
        body,
        &spec.default_export_name,
        spec.input_dialect,
        out,
    )?;
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }

    match &spec.policy {
        ExportPolicy::PerKey => {
            for (key, value) in metadata {
                if spec.is_derived(key) {
                    log::debug!("metadata key '{}' is replaced by a derived export", key);
                    continue;
                }
                if !is_identifier(key) {
                    log::warn!("skipping metadata key '{}': not a valid export name", key);
                    continue;
                }
                text.push_str(&write_export(out, Some(key), &render_value(key, value, spec)?));
            }
        }
        ExportPolicy::Whole(name) => {
            let entries = metadata
                .iter()
                .map(|(key, value)| {
                    Ok(format!(
                        "{}:{}",
                        Value::from(key.as_str()),
                        render_value(key, value, spec)?
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            text.push_str(&write_export(
                out,
                Some(name),
                &format!("{{{}}}", entries.join(",")),
            ));
        }
    }

    let slug = slug.to_string();
    text.push_str(&write_export(
        out,
        Some(SLUG_EXPORT),
        &Value::from(slug.as_str()).to_string(),
    ));

    for key in spec.title_keys() {
        let binding = title_binding(key);
        let options = serde_json::json!({ "defaultValue": slug.as_str() });
        text.push_str(&write_import(out, &binding, &spec.title_helper_module));
        text.push_str(&write_export(
            out,
            Some(key),
            &format!("{}({}, {})", binding, spec.default_export_name, options),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test metadata must be an object"),
        }
    }

    fn slug() -> Slug {
        Slug::from_path(Path::new("docs/guides/setup.md")).unwrap()
    }

    const BODY: &str = "const code = \"<h1>Setup</h1>\";\nexport default code;\n";

    #[test]
    fn test_per_key_exports() {
        let meta = metadata(json!({"title": "Setup", "order": 2, "tags": ["a", "b"]}));
        let out = render(BODY, &meta, &slug(), &ExportSpec::default()).unwrap();
        assert_eq!(
            out,
            concat!(
                "const code = \"<h1>Setup</h1>\";\n",
                "export default code;\n",
                "export const title = \"Setup\";\n",
                "export const order = 2;\n",
                "export const tags = [\"a\",\"b\"];\n",
                "export const slug = \"guides/setup\";\n",
            )
        );
    }

    #[test]
    fn test_whole_object_export_in_commonjs() {
        let meta = metadata(json!({"title": "Setup", "draft": false}));
        let spec = ExportSpec {
            input_dialect: ModuleDialect::CommonJs,
            output_dialect: ModuleDialect::CommonJs,
            policy: ExportPolicy::Whole("meta".to_string()),
            ..Default::default()
        };
        let out = render("module.exports = code;", &meta, &slug(), &spec).unwrap();
        assert_eq!(
            out,
            concat!(
                "module.exports = code;\n",
                "module.exports.meta = {\"title\":\"Setup\",\"draft\":false};\n",
                "module.exports.slug = \"guides/setup\";\n",
            )
        );
    }

    #[test]
    fn test_dialect_rewrite_before_exports() {
        let spec = ExportSpec {
            input_dialect: ModuleDialect::CommonJs,
            ..Default::default()
        };
        let out = render(
            "const code = 1;\nmodule.exports = code;\n",
            &Metadata::new(),
            &slug(),
            &spec,
        )
        .unwrap();
        assert_eq!(
            out,
            "const code = 1;\nexport default code;\nexport const slug = \"guides/setup\";\n"
        );
    }

    #[test]
    fn test_require_reference_and_custom_transform() {
        let meta = metadata(json!({"image": "./cover.png", "icon": null, "date": "2024-01-02"}));
        let mut spec = ExportSpec::default();
        spec.set_extra("image", Extra::RequireReference);
        spec.set_extra("icon", Extra::RequireReference);
        spec.set_extra(
            "date",
            Extra::custom(|value, _key| {
                Ok(format!("new Date({})", serde_json::to_string(value)?))
            }),
        );
        let out = render("", &meta, &slug(), &spec).unwrap();
        assert_eq!(
            out,
            concat!(
                "export const image = require(\"./cover.png\");\n",
                "export const icon = null;\n",
                "export const date = new Date(\"2024-01-02\");\n",
                "export const slug = \"guides/setup\";\n",
            )
        );
    }

    #[test]
    fn test_custom_transform_error_propagates() {
        let meta = metadata(json!({"bad": 1}));
        let mut spec = ExportSpec::default();
        spec.set_extra(
            "bad",
            Extra::custom(|_, key| Err(TaggedFileError::invalid_options(format!("no {}", key)))),
        );
        let err = render(BODY, &meta, &slug(), &spec).unwrap_err();
        assert!(matches!(err, TaggedFileError::InvalidOptions { .. }));
    }

    #[test]
    fn test_detect_title_export() {
        let meta = metadata(json!({"title": "ignored", "author": "me"}));
        let mut spec = ExportSpec::default();
        spec.set_extra("title", Extra::DetectTitleHtml);
        let out = render(BODY, &meta, &slug(), &spec).unwrap();
        assert_eq!(
            out,
            concat!(
                "const code = \"<h1>Setup</h1>\";\n",
                "export default code;\n",
                "export const author = \"me\";\n",
                "export const slug = \"guides/setup\";\n",
                "import __PARSE_TITLE_HTML_title_ from \"tagged-file/detect-title-html\";\n",
                "export const title = __PARSE_TITLE_HTML_title_(code, {\"defaultValue\":\"guides/setup\"});\n",
            )
        );
    }

    #[test]
    fn test_invalid_and_colliding_keys_are_skipped() {
        let meta = metadata(json!({"my-key": 1, "default": 2, "slug": "x", "ok": 3}));
        let out = render("", &meta, &slug(), &ExportSpec::default()).unwrap();
        assert_eq!(
            out,
            "export const ok = 3;\nexport const slug = \"guides/setup\";\n"
        );
    }

    #[test]
    fn test_whole_export_keeps_every_key() {
        let meta = metadata(json!({"my-key": "</script>"}));
        let spec = ExportSpec {
            policy: ExportPolicy::Whole(DEFAULT_METADATA_NAME.to_string()),
            ..Default::default()
        };
        let out = render("", &meta, &slug(), &spec).unwrap();
        assert!(out.starts_with("export const metadata = {\"my-key\":\"</script>\"};\n"));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("title"));
        assert!(is_identifier("$x_1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("class"));
        assert_eq!(title_binding("title"), "__PARSE_TITLE_HTML_title_");
        assert_eq!(title_binding("page.title"), "__PARSE_TITLE_HTML_page_2e_title_");
    }

    #[test]
    fn test_title_bindings_are_distinct() {
        assert_eq!(title_binding("a$"), "__PARSE_TITLE_HTML_a_24__");
        assert_eq!(title_binding("a_"), "__PARSE_TITLE_HTML_a___");
        let keys = ["a$", "a_", "a_24_", "a__", "a"];
        let mut bindings: Vec<String> = keys.iter().map(|key| title_binding(key)).collect();
        bindings.sort();
        bindings.dedup();
        assert_eq!(bindings.len(), keys.len());

        let mut spec = ExportSpec::default();
        spec.set_extra("a$", Extra::DetectTitleHtml);
        spec.set_extra("a_", Extra::DetectTitleHtml);
        let out = render(BODY, &Metadata::new(), &slug(), &spec).unwrap();
        assert!(out.contains("import __PARSE_TITLE_HTML_a_24__ from"));
        assert!(out.contains("import __PARSE_TITLE_HTML_a___ from"));
    }

    #[test]
    fn test_default_export_name_key_is_not_redeclared() {
        let meta = metadata(json!({"code": 1, "other": 2}));
        let out = render(BODY, &meta, &slug(), &ExportSpec::default()).unwrap();
        assert_eq!(
            out,
            concat!(
                "const code = \"<h1>Setup</h1>\";\n",
                "export default code;\n",
                "export const other = 2;\n",
                "export const slug = \"guides/setup\";\n",
            )
        );
    }

    #[test]
    fn test_title_binding_key_is_not_redeclared() {
        let meta = metadata(json!({"__PARSE_TITLE_HTML_title_": 1}));
        let mut spec = ExportSpec::default();
        spec.set_extra("title", Extra::DetectTitleHtml);
        let out = render(BODY, &meta, &slug(), &spec).unwrap();
        assert!(!out.contains("export const __PARSE_TITLE_HTML_title_ ="));
    }

    #[test]
    fn test_colliding_names_rejected() {
        let mut spec = ExportSpec::default();
        spec.set_extra("code", Extra::DetectTitleHtml);
        assert!(spec.check_names().is_err());

        let mut spec = ExportSpec::default();
        spec.set_extra("slug", Extra::DetectTitleHtml);
        assert!(render("", &Metadata::new(), &slug(), &spec).is_err());

        let mut spec = ExportSpec::default();
        spec.set_extra("title", Extra::DetectTitleHtml);
        for whole in ["slug", "code", "title", "my-meta"] {
            let spec = ExportSpec {
                policy: ExportPolicy::Whole(whole.to_string()),
                ..spec.clone()
            };
            assert!(
                matches!(spec.check_names(), Err(TaggedFileError::InvalidOptions { .. })),
                "{whole} should be rejected"
            );
        }

        let spec = ExportSpec {
            default_export_name: "slug".to_string(),
            ..Default::default()
        };
        assert!(spec.check_names().is_err());
    }
}
