//! Schema assembly: bulk fetches, one builder pass per table.

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, info};

use super::error::IntrospectionResult;
use super::mysql::MySqlIntrospection;
use super::postgres::PostgresIntrospection;
use super::provider::Introspection;
use crate::config::{ConnectionConfig, Driver};
use crate::inference::{BuilderOptions, Diagnostic, InferenceResult, SchemaMaps, TableSchemaBuilder};
use crate::schema::{ConnectionSummary, DatabaseSchema};

/// A generated schema and the integrity warnings collected while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    pub schema: DatabaseSchema,
    pub diagnostics: Vec<Diagnostic>,
}

impl SchemaReport {
    /// Number of diagnostics per table, in first-reported order.
    pub fn diagnostic_counts(&self) -> IndexMap<&str, usize> {
        let mut counts = IndexMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.table()).or_insert(0) += 1;
        }
        counts
    }
}

/// Fetch all metadata from `provider` and build every table.
///
/// Does not close the provider; see [`assemble_and_close`].
pub async fn assemble_schema<I>(provider: &I, options: &BuilderOptions) -> IntrospectionResult<SchemaReport>
where
    I: Introspection + ?Sized,
{
    let tables = provider.list_tables().await?;
    info!(count = tables.len(), schema = provider.schema_name(), "found tables");

    let enums = provider.get_enums(&tables).await?;
    let columns = provider.get_columns(&tables, &enums).await?;
    let constraints = provider.get_constraints(&tables).await?;
    let forward_relations = provider.get_forward_relations(&tables).await?;
    let backward_relations = provider.get_backward_relations(&tables).await?;
    debug!("fetched catalog metadata");

    let maps = SchemaMaps {
        enums,
        columns,
        constraints,
        forward_relations,
        backward_relations,
    };

    let report = build_schema(
        provider.database_name(),
        Some(provider.schema_name().to_string()),
        provider.connection_summary(),
        &tables,
        &maps,
        options,
    )?;
    info!(
        tables = report.schema.tables.len(),
        diagnostics = report.diagnostics.len(),
        "built table schemas"
    );
    Ok(report)
}

/// Run [`assemble_schema`] and close the provider whatever the outcome.
pub async fn assemble_and_close<I>(provider: &I, options: &BuilderOptions) -> IntrospectionResult<SchemaReport>
where
    I: Introspection + ?Sized,
{
    let result = assemble_schema(provider, options).await;
    provider.close().await;
    result
}

/// Build the document for `tables` from already fetched metadata.
pub fn build_schema(
    database_name: &str,
    schema_name: Option<String>,
    connection: Option<ConnectionSummary>,
    tables: &[String],
    maps: &SchemaMaps,
    options: &BuilderOptions,
) -> InferenceResult<SchemaReport> {
    let mut definitions = IndexMap::with_capacity(tables.len());
    let mut diagnostics = Vec::new();

    for table in tables {
        let builder = TableSchemaBuilder::new(table, maps);
        let built = builder.build_table_definition(options)?;
        debug!(
            table = builder.table_name(),
            relations = built.definition.relations.len(),
            "built table"
        );
        diagnostics.extend(built.diagnostics);
        definitions.insert(table.clone(), built.definition);
    }

    Ok(SchemaReport {
        schema: DatabaseSchema {
            database_name: database_name.to_string(),
            schema_name,
            connection,
            generated_at: Utc::now(),
            tables: definitions,
        },
        diagnostics,
    })
}

/// Open the provider for the configured driver.
pub async fn connect(config: &ConnectionConfig) -> IntrospectionResult<Box<dyn Introspection>> {
    let provider: Box<dyn Introspection> = match config.driver {
        Driver::Postgres => Box::new(PostgresIntrospection::connect(config).await?),
        Driver::MySql => Box::new(MySqlIntrospection::connect(config).await?),
    };
    Ok(provider)
}

/// Validate `config`, connect, introspect and disconnect.
///
/// Configuration errors are reported before any connection is attempted.
pub async fn introspect_schema(
    config: &ConnectionConfig,
    options: &BuilderOptions,
) -> IntrospectionResult<SchemaReport> {
    config.validate()?;
    let provider = connect(config).await?;
    assemble_and_close(provider.as_ref(), options).await
}
