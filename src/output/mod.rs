//! Serialization of the generated schema document.
//!
//! The document is always JSON; the JavaScript flavours wrap it in an export
//! statement so it can be imported directly by generated code.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::DatabaseSchema;

/// Base name of the written file.
pub const OUTPUT_FILE_STEM: &str = "relational-schema";

const ES_EXPORT: &str = "export default";
const CJS_EXPORT: &str = "module.exports =";

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output file flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Plain JSON document.
    #[default]
    Json,
    /// ES module (`export default`).
    Es6,
    /// TypeScript module (`export default`).
    #[serde(alias = "typescript")]
    #[value(alias = "typescript")]
    Ts,
    /// CommonJS module (`module.exports =`).
    #[serde(alias = "commonjs")]
    #[value(alias = "commonjs")]
    Cjs,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Es6 | Format::Cjs => "js",
            Format::Ts => "ts",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", OUTPUT_FILE_STEM, self.extension())
    }
}

/// Render the document in `format`.
pub fn render(schema: &DatabaseSchema, format: Format) -> OutputResult<String> {
    let json = serde_json::to_string_pretty(schema)?;
    let rendered = match format {
        Format::Json => format!("{}\n", json),
        Format::Es6 | Format::Ts => format!("{} {};\n", ES_EXPORT, json),
        Format::Cjs => format!("{} {};\n", CJS_EXPORT, json),
    };
    Ok(rendered)
}

/// Parse a document produced by [`render`] in any format.
pub fn parse(contents: &str) -> OutputResult<DatabaseSchema> {
    let mut body = contents.trim();
    for prefix in [ES_EXPORT, CJS_EXPORT] {
        if let Some(rest) = body.strip_prefix(prefix) {
            body = rest.trim_start();
            break;
        }
    }
    let body = body.strip_suffix(';').unwrap_or(body);
    Ok(serde_json::from_str(body)?)
}

/// Write the document into `outdir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn write_schema(schema: &DatabaseSchema, outdir: &Path, format: Format) -> OutputResult<PathBuf> {
    let rendered = render(schema, format)?;

    fs::create_dir_all(outdir).map_err(|source| OutputError::Io {
        path: outdir.to_path_buf(),
        source,
    })?;

    let path = outdir.join(format.file_name());
    fs::write(&path, rendered).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
