//! The `Introspection` trait.
//!
//! A provider answers bulk questions about the catalog: every call covers all
//! requested tables at once, so a run costs one round trip per concern no
//! matter how many tables the schema has.

use async_trait::async_trait;

use super::error::IntrospectionResult;
use crate::schema::{
    ConnectionSummary, ConstraintDefinition, RelationDefinition, TableColumns, TableEnums, TableMap,
};

/// Read-only access to one database catalog.
///
/// Implementations hold the single connection of a run. The caller is
/// responsible for calling [`close`](Introspection::close) exactly once, on
/// every exit path.
///
/// # Example
///
/// ```ignore
/// use relschema::introspection::Introspection;
///
/// async fn table_count(provider: &dyn Introspection) -> IntrospectionResult<usize> {
///     let tables = provider.list_tables().await?;
///     let columns = provider.get_columns(&tables, &Default::default()).await?;
///     Ok(columns.len())
/// }
/// ```
#[async_trait]
pub trait Introspection: Send + Sync {
    fn database_name(&self) -> &str;

    /// Catalog schema being introspected (`public`, or the MySQL database).
    fn schema_name(&self) -> &str;

    /// Connection details recorded in the generated document.
    fn connection_summary(&self) -> Option<ConnectionSummary> {
        None
    }

    /// All table names of the schema, sorted.
    async fn list_tables(&self) -> IntrospectionResult<Vec<String>>;

    /// Enum (and MySQL set) types used by each table.
    async fn get_enums(&self, tables: &[String]) -> IntrospectionResult<TableMap<TableEnums>>;

    /// Column definitions of each table. `enums` types enum-valued columns.
    async fn get_columns(
        &self,
        tables: &[String],
        enums: &TableMap<TableEnums>,
    ) -> IntrospectionResult<TableMap<TableColumns>>;

    /// PRIMARY KEY, UNIQUE and FOREIGN KEY constraints of each table.
    async fn get_constraints(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<ConstraintDefinition>>>;

    /// Foreign keys held by each table, as `belongsTo` edges.
    async fn get_forward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>>;

    /// Foreign keys referencing each table, as `hasMany` edges.
    async fn get_backward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>>;

    /// Release the connection.
    async fn close(&self);
}
