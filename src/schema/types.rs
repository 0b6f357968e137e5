//! Value objects of the schema document.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ColumnType;

/// Per-table results keyed by table name.
pub type TableMap<T> = IndexMap<String, T>;

/// Columns of one table keyed by column name, in catalog (ordinal) order.
pub type TableColumns = IndexMap<String, ColumnDefinition>;

/// Enums attached to one table keyed by enum name.
pub type TableEnums = IndexMap<String, EnumDefinition>;

/// A single column of a table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub column_name: String,
    /// Native type name as reported by the catalog (`int4`, `varchar`, ...).
    pub db_type: String,
    pub nullable: bool,
    pub column_default: Option<String>,
    pub inferred_type: ColumnType,
}

/// An enum (or MySQL set) type used by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub enum_name: String,
    pub values: BTreeSet<String>,
    /// Column the enum was declared on, for dialects with column-scoped enums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
    /// Catalog identifier of a globally declared enum type (Postgres type oid).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "UNIQUE")]
    Unique,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
}

impl ConstraintType {
    /// Parse the `constraint_type` value of `information_schema.table_constraints`.
    ///
    /// Returns `None` for constraint kinds that never carry key columns (CHECK, ...).
    pub fn from_catalog(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PRIMARY KEY" => Some(ConstraintType::PrimaryKey),
            "UNIQUE" => Some(ConstraintType::Unique),
            "FOREIGN KEY" => Some(ConstraintType::ForeignKey),
            _ => None,
        }
    }
}

/// A key constraint with its columns in canonical (sorted) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDefinition {
    pub constraint_name: String,
    pub constraint_type: ConstraintType,
    pub column_names: Vec<String>,
}

impl ConstraintDefinition {
    pub fn new<I, S>(name: impl Into<String>, constraint_type: ConstraintType, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut column_names: Vec<String> = columns.into_iter().map(Into::into).collect();
        column_names.sort();
        Self {
            constraint_name: name.into(),
            constraint_type,
            column_names,
        }
    }

    pub fn primary_key<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ConstraintType::PrimaryKey, columns)
    }

    pub fn unique<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ConstraintType::Unique, columns)
    }

    pub fn foreign_key<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ConstraintType::ForeignKey, columns)
    }
}

/// One column pair of a (possibly compound) foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDefinition {
    pub from_column: String,
    pub to_column: String,
}

impl JoinDefinition {
    pub fn new(from_column: impl Into<String>, to_column: impl Into<String>) -> Self {
        Self {
            from_column: from_column.into(),
            to_column: to_column.into(),
        }
    }
}

/// Cardinality of a relation from the owning table's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    /// N:1, the owning table holds the foreign key.
    BelongsTo,
    /// 1:1 in either direction.
    HasOne,
    /// 1:N, the related table holds the foreign key.
    HasMany,
    /// N:M through a junction table.
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::BelongsTo => "belongsTo",
            Cardinality::HasOne => "hasOne",
            Cardinality::HasMany => "hasMany",
            Cardinality::ManyToMany => "manyToMany",
        }
    }
}

/// Which side of the foreign key the owning table is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationDirection {
    /// The owning table holds the foreign-key columns.
    #[default]
    Forward,
    /// Another table holds a foreign key referencing the owning table.
    Backward,
}

/// A direct (single-hop) relation derived from one foreign-key constraint.
///
/// `joins` are oriented from the owning table: `from_column` is always a column
/// of the owning table, `to_column` a column of `to_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDefinition {
    pub to_table: String,
    pub alias: String,
    pub joins: Vec<JoinDefinition>,
    pub cardinality: Cardinality,
    pub constraint_name: String,
    #[serde(default)]
    pub direction: RelationDirection,
}

impl RelationDefinition {
    /// An edge where the owning table holds the key. Defaults to `belongsTo`.
    pub fn forward(
        constraint_name: impl Into<String>,
        to_table: impl Into<String>,
        joins: Vec<JoinDefinition>,
    ) -> Self {
        let to_table = to_table.into();
        Self {
            alias: to_table.clone(),
            to_table,
            joins,
            cardinality: Cardinality::BelongsTo,
            constraint_name: constraint_name.into(),
            direction: RelationDirection::Forward,
        }
    }

    /// An edge where `to_table` holds the key. Defaults to `hasMany`.
    pub fn backward(
        constraint_name: impl Into<String>,
        to_table: impl Into<String>,
        joins: Vec<JoinDefinition>,
    ) -> Self {
        let to_table = to_table.into();
        Self {
            alias: to_table.clone(),
            to_table,
            joins,
            cardinality: Cardinality::HasMany,
            constraint_name: constraint_name.into(),
            direction: RelationDirection::Backward,
        }
    }

    pub fn is_forward(&self) -> bool {
        self.direction == RelationDirection::Forward
    }

    pub fn is_compound(&self) -> bool {
        self.joins.len() > 1
    }

    /// Local (owning-table) side of the joins.
    pub fn local_columns(&self) -> impl Iterator<Item = &str> {
        self.joins.iter().map(|j| j.from_column.as_str())
    }
}

/// One hop of a transitive relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPath {
    pub joins: Vec<JoinDefinition>,
    pub to_table: String,
    pub constraint_name: String,
}

/// A many-to-many relation through exactly one junction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitiveRelationDefinition {
    pub to_table: String,
    pub join_table: String,
    pub alias: String,
    pub join_from: JoinPath,
    pub join_to: JoinPath,
    pub cardinality: Cardinality,
}

/// Any relation of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Direct(RelationDefinition),
    Transitive(TransitiveRelationDefinition),
}

impl Relation {
    pub fn alias(&self) -> &str {
        match self {
            Relation::Direct(r) => &r.alias,
            Relation::Transitive(r) => &r.alias,
        }
    }

    pub fn to_table(&self) -> &str {
        match self {
            Relation::Direct(r) => &r.to_table,
            Relation::Transitive(r) => &r.to_table,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Relation::Direct(r) => r.cardinality,
            Relation::Transitive(r) => r.cardinality,
        }
    }

    pub fn as_direct(&self) -> Option<&RelationDefinition> {
        match self {
            Relation::Direct(r) => Some(r),
            Relation::Transitive(_) => None,
        }
    }

    pub fn as_transitive(&self) -> Option<&TransitiveRelationDefinition> {
        match self {
            Relation::Transitive(r) => Some(r),
            Relation::Direct(_) => None,
        }
    }
}

/// The fully resolved description of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchemaDefinition {
    pub primary_key: Option<ConstraintDefinition>,
    pub keys: Vec<ConstraintDefinition>,
    pub unique_key_combinations: Vec<Vec<String>>,
    pub columns: TableColumns,
    pub soft_delete_column: Option<ColumnDefinition>,
    pub enums: TableEnums,
    pub relations: Vec<Relation>,
}

impl TableSchemaDefinition {
    pub fn relation(&self, alias: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.alias() == alias)
    }
}

/// Connection details recorded in the document. Never includes credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub host: String,
    pub port: u16,
    pub user: String,
}

/// The complete output document of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSchema {
    pub database_name: String,
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionSummary>,
    pub generated_at: DateTime<Utc>,
    pub tables: IndexMap<String, TableSchemaDefinition>,
}
