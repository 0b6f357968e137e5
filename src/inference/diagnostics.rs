//! Non-fatal metadata-integrity findings.

use std::fmt;

use serde::Serialize;

/// A problem in the introspected metadata that degraded, but did not abort,
/// the build of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A foreign key references (or is held by) a table outside the
    /// introspected set. The relation was skipped.
    #[serde(rename_all = "camelCase")]
    DanglingForeignKey {
        table: String,
        constraint_name: String,
        related_table: String,
    },

    /// A backward edge whose forward counterpart is missing from the
    /// referencing table. The edge keeps its default `hasMany` cardinality.
    #[serde(rename_all = "camelCase")]
    MissingMirrorRelation {
        table: String,
        constraint_name: String,
        related_table: String,
    },
}

impl Diagnostic {
    /// The table whose build recorded this diagnostic.
    pub fn table(&self) -> &str {
        match self {
            Diagnostic::DanglingForeignKey { table, .. }
            | Diagnostic::MissingMirrorRelation { table, .. } => table,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DanglingForeignKey {
                table,
                constraint_name,
                related_table,
            } => write!(
                f,
                "{}: foreign key '{}' relates to '{}' which was not introspected; relation skipped",
                table, constraint_name, related_table
            ),
            Diagnostic::MissingMirrorRelation {
                table,
                constraint_name,
                related_table,
            } => write!(
                f,
                "{}: no forward relation '{}' found on '{}'; assuming one-to-many",
                table, constraint_name, related_table
            ),
        }
    }
}
