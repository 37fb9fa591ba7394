//! The two module syntaxes generated code can be written in

use crate::error::Result;
use regex::{NoExpand, Regex};

/// Module export/import syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleDialect {
    /// `export default x` / `import x from "m"`
    EsModule,
    /// `module.exports = x` / `const x = require("m")`
    CommonJs,
}

impl ModuleDialect {
    /// Map an `esModule` style flag to a dialect
    pub fn from_es_flag(es_module: bool) -> Self {
        if es_module {
            ModuleDialect::EsModule
        } else {
            ModuleDialect::CommonJs
        }
    }

    pub fn is_es_module(self) -> bool {
        self == ModuleDialect::EsModule
    }
}

/// Render one export statement.
///
/// Without a key this is the default export, otherwise a named export.
pub fn write_export(dialect: ModuleDialect, key: Option<&str>, value: &str) -> String {
    match (dialect, key) {
        (ModuleDialect::EsModule, None) => format!("export default {};\n", value),
        (ModuleDialect::EsModule, Some(key)) => format!("export const {} = {};\n", key, value),
        (ModuleDialect::CommonJs, None) => format!("module.exports = {};\n", value),
        (ModuleDialect::CommonJs, Some(key)) => format!("module.exports.{} = {};\n", key, value),
    }
}

/// Render an import of `module`'s default export into `binding`
pub fn write_import(dialect: ModuleDialect, binding: &str, module: &str) -> String {
    let module = serde_json::Value::from(module).to_string();
    match dialect {
        ModuleDialect::EsModule => format!("import {} from {};\n", binding, module),
        ModuleDialect::CommonJs => format!("const {} = require({});\n", binding, module),
    }
}

/// Rewrite a trailing default export of `name` from one dialect to the other.
///
/// Only the exact statement `export default <name>;` or
/// `module.exports = <name>;` followed by nothing but line breaks is matched.
/// Text without that ending is returned unchanged.
pub fn rewrite_default_export(
    text: &str,
    name: &str,
    from: ModuleDialect,
    to: ModuleDialect,
) -> Result<String> {
    if from == to {
        return Ok(text.to_string());
    }

    let statement = match from {
        ModuleDialect::EsModule => format!("export default {};", regex::escape(name)),
        ModuleDialect::CommonJs => format!(r"module\.exports = {};", regex::escape(name)),
    };
    let pattern = Regex::new(&format!(r"{}[\r\n]*\z", statement))?;
    let replacement = write_export(to, None, name);

    Ok(pattern.replace(text, NoExpand(&replacement)).into_owned())
}
