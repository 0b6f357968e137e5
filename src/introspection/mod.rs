//! Catalog introspection.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      assemble_schema()                         │
//! │  list_tables → get_enums → get_columns → get_constraints →     │
//! │  get_forward_relations → get_backward_relations                │
//! │                          │                                     │
//! │                          ▼                                     │
//! │           TableSchemaBuilder (once per table)                  │
//! └───────────────────────────────────────────────────────────────┘
//!                            │
//!              dyn Introspection (one connection)
//!                 ┌──────────┴──────────┐
//!      PostgresIntrospection     MySqlIntrospection
//! ```
//!
//! # Example
//!
//! ```ignore
//! use relschema::config::{ConnectionSettings, Settings};
//! use relschema::inference::BuilderOptions;
//! use relschema::introspection::introspect_schema;
//!
//! let settings = Settings::load()?;
//! let config = settings.connection_config(&ConnectionSettings::from_env()?, &ConnectionSettings::default())?;
//! let report = introspect_schema(&config, &BuilderOptions::default()).await?;
//! println!("{} tables", report.schema.tables.len());
//! ```

mod assemble;
mod error;
pub mod helpers;
pub mod mysql;
pub mod postgres;
mod provider;

pub use assemble::{
    assemble_and_close, assemble_schema, build_schema, connect, introspect_schema, SchemaReport,
};
pub use error::{IntrospectionError, IntrospectionResult};
pub use mysql::MySqlIntrospection;
pub use postgres::PostgresIntrospection;
pub use provider::Introspection;
