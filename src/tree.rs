//! Relation tree printer.
//!
//! Walks the relations of a generated schema document outward from one
//! table, for a quick look at what a query rooted there can reach.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::output::{self, OutputError};
use crate::schema::{Cardinality, DatabaseSchema};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("table '{0}' not found in schema")]
    UnknownTable(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Levels of relations printed below the root.
    pub max_depth: usize,
    /// Also follow `hasMany` edges.
    pub show_backward: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            show_backward: false,
        }
    }
}

/// Load a schema document written in any output format.
pub fn load_schema(path: &Path) -> TreeResult<DatabaseSchema> {
    let contents = fs::read_to_string(path).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(output::parse(&contents)?)
}

/// Render the relation tree of `root`.
///
/// Many-to-many edges are never followed. A table already on the path from
/// the root is not expanded again.
pub fn render_relation_tree(
    schema: &DatabaseSchema,
    root: &str,
    options: &TreeOptions,
) -> TreeResult<String> {
    if !schema.tables.contains_key(root) {
        return Err(TreeError::UnknownTable(root.to_string()));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", root);
    let mut path = vec![root];
    walk(schema, root, 1, options, &mut path, &mut out);
    Ok(out)
}

fn walk<'a>(
    schema: &'a DatabaseSchema,
    table: &str,
    depth: usize,
    options: &TreeOptions,
    path: &mut Vec<&'a str>,
    out: &mut String,
) {
    if depth > options.max_depth {
        return;
    }
    let Some(definition) = schema.tables.get(table) else {
        return;
    };

    for relation in &definition.relations {
        let cardinality = relation.cardinality();
        if cardinality == Cardinality::ManyToMany {
            continue;
        }
        if cardinality == Cardinality::HasMany && !options.show_backward {
            continue;
        }
        let to_table = relation.to_table();
        if path.contains(&to_table) {
            continue;
        }

        let _ = writeln!(
            out,
            "{}└─ {} -> {} ({})",
            "   ".repeat(depth - 1),
            relation.alias(),
            to_table,
            cardinality.as_str()
        );

        path.push(to_table);
        walk(schema, to_table, depth + 1, options, path, out);
        path.pop();
    }
}
