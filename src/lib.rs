//! # relschema
//!
//! Introspects a MySQL or PostgreSQL catalog and produces a relation-aware
//! schema document for code generators.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Catalog (information_schema, pg_catalog)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [introspection: bulk fetches]
//! ┌─────────────────────────────────────────────────────────┐
//! │   SchemaMaps (enums, columns, constraints, relations)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference: one builder per table]
//! ┌─────────────────────────────────────────────────────────┐
//! │   DatabaseSchema (cardinalities, aliases, many-to-many)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [output]
//! ┌─────────────────────────────────────────────────────────┐
//! │      relational-schema.{json,js,ts}                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod inference;
pub mod introspection;
pub mod output;
pub mod schema;
pub mod tree;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{ConnectionConfig, Driver, Settings};
    pub use crate::inference::{BuilderOptions, Diagnostic, SchemaMaps, TableSchemaBuilder};
    pub use crate::introspection::{
        assemble_schema, introspect_schema, Introspection, IntrospectionError, SchemaReport,
    };
    pub use crate::output::{render, write_schema, Format};
    pub use crate::schema::{
        Cardinality, ColumnDefinition, ColumnType, ConstraintDefinition, ConstraintType,
        DatabaseSchema, JoinDefinition, Relation, RelationDefinition, TableSchemaDefinition,
        TransitiveRelationDefinition,
    };
    pub use crate::tree::{render_relation_tree, TreeOptions};
}
