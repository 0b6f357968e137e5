//! Relation inference over introspected metadata.
//!
//! The [`cardinality`] functions classify key constraints, and the
//! [`TableSchemaBuilder`] combines them with the schema-wide [`SchemaMaps`] to
//! produce a [`TableSchemaDefinition`](crate::schema::TableSchemaDefinition)
//! with aliased relations.

pub mod aliases;
mod builder;
pub mod cardinality;
mod diagnostics;
mod error;
pub mod inflection;

pub use builder::{
    soft_delete_column, BuilderOptions, BuiltTable, SchemaMaps, TableSchemaBuilder,
    SOFT_DELETE_COLUMN_NAMES,
};
pub use cardinality::{is_one_to_one_relation, primary_key, unique_constraints, unique_key_combinations};
pub use diagnostics::Diagnostic;
pub use error::{InferenceError, InferenceResult};
pub use inflection::{pluralize, singularize};
