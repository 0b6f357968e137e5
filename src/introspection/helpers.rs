//! Row shapes and row-to-definition helpers shared by both dialects.
//!
//! Each provider runs its own catalog SQL and decodes the result into the raw
//! row structs below; everything after that (grouping by table, folding
//! multi-column keys, orienting joins) is dialect independent.

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{
    ColumnDefinition, ColumnType, ConstraintDefinition, ConstraintType, EnumDefinition,
    JoinDefinition, RelationDefinition, RelationDirection, TableColumns, TableEnums, TableMap,
};

/// One column row of `information_schema.columns`.
#[derive(Debug, Clone)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    pub db_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

/// One value of an enum type used by a table.
#[derive(Debug, Clone)]
pub struct EnumRow {
    pub table_name: String,
    pub enum_name: String,
    pub value: String,
    pub id: Option<String>,
    pub source_column: Option<String>,
}

/// One column of one key constraint.
#[derive(Debug, Clone)]
pub struct KeyRow {
    pub table_name: String,
    pub column_name: String,
    pub constraint_name: String,
    /// `None` when the constraint was not found in `table_constraints`.
    pub constraint_type: Option<String>,
}

/// One column pair of a foreign key, oriented from `table_name`.
///
/// For forward edges `table_name` holds the key; for backward edges it is the
/// referenced table and `other_table` holds the key.
#[derive(Debug, Clone)]
pub struct ReferenceRow {
    pub table_name: String,
    pub constraint_name: String,
    pub column_name: String,
    pub other_table: String,
    pub other_column: String,
}

pub fn log_query(sql: &str, tables: &[String]) {
    debug!(tables = tables.len(), "executing query: {}", sql.trim());
}

/// Group rows by table, keeping first-seen table order and row order.
pub fn group_by_table<T, F>(rows: Vec<T>, table_of: F) -> TableMap<Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let mut grouped: TableMap<Vec<T>> = IndexMap::new();
    for row in rows {
        let table = table_of(&row).to_string();
        grouped.entry(table).or_default().push(row);
    }
    grouped
}

pub fn build_enums(rows: Vec<EnumRow>) -> TableMap<TableEnums> {
    group_by_table(rows, |r| &r.table_name)
        .into_iter()
        .map(|(table, rows)| {
            let mut enums = TableEnums::new();
            for row in rows {
                let definition = enums
                    .entry(row.enum_name.clone())
                    .or_insert_with(|| EnumDefinition {
                        enum_name: row.enum_name.clone(),
                        values: Default::default(),
                        source_column: row.source_column.clone(),
                        id: row.id.clone(),
                    });
                definition.values.insert(row.value);
            }
            (table, enums)
        })
        .collect()
}

/// Build column definitions, typing each column with `type_of`.
///
/// `type_of` receives the table, column, native type and the table's enums.
pub fn build_columns<F>(
    rows: Vec<ColumnRow>,
    enums: &TableMap<TableEnums>,
    type_of: F,
) -> TableMap<TableColumns>
where
    F: Fn(&str, &str, &str, Option<&TableEnums>) -> ColumnType,
{
    group_by_table(rows, |r| &r.table_name)
        .into_iter()
        .map(|(table, rows)| {
            let table_enums = enums.get(&table);
            let columns: TableColumns = rows
                .into_iter()
                .map(|row| {
                    let inferred_type =
                        type_of(&table, &row.column_name, &row.db_type, table_enums);
                    let definition = ColumnDefinition {
                        column_name: row.column_name.clone(),
                        nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
                        db_type: row.db_type,
                        column_default: row.column_default,
                        inferred_type,
                    };
                    (row.column_name, definition)
                })
                .collect();
            (table, columns)
        })
        .collect()
}

/// Fold key rows into one definition per constraint, in first-seen order.
///
/// Rows of constraint kinds without key semantics are dropped.
pub fn build_constraints(rows: Vec<KeyRow>) -> TableMap<Vec<ConstraintDefinition>> {
    group_by_table(rows, |r| &r.table_name)
        .into_iter()
        .map(|(table, rows)| {
            let mut by_name: IndexMap<String, (ConstraintType, Vec<String>)> = IndexMap::new();
            for row in rows {
                let Some(kind) = row.constraint_type.as_deref().and_then(ConstraintType::from_catalog)
                else {
                    continue;
                };
                let (_, columns) = by_name
                    .entry(row.constraint_name)
                    .or_insert_with(|| (kind, Vec::new()));
                if !columns.contains(&row.column_name) {
                    columns.push(row.column_name);
                }
            }
            let constraints = by_name
                .into_iter()
                .map(|(name, (kind, columns))| ConstraintDefinition::new(name, kind, columns))
                .collect();
            (table, constraints)
        })
        .collect()
}

/// Fold reference rows into one relation per constraint.
///
/// Rows must arrive ordered by constraint and key position so that compound
/// joins keep their column pairing. A constraint is identified by its name
/// and the table holding it, since names are only unique per table. Repeated
/// join pairs are dropped, as are rows naming a different target than the
/// first row of their constraint.
pub fn build_relations(
    rows: Vec<ReferenceRow>,
    direction: RelationDirection,
) -> TableMap<Vec<RelationDefinition>> {
    group_by_table(rows, |r| &r.table_name)
        .into_iter()
        .map(|(table, rows)| {
            let mut by_key: IndexMap<(String, String), RelationDefinition> = IndexMap::new();
            for row in rows {
                let owner = match direction {
                    RelationDirection::Forward => table.clone(),
                    RelationDirection::Backward => row.other_table.clone(),
                };
                let relation = by_key
                    .entry((row.constraint_name.clone(), owner))
                    .or_insert_with(|| match direction {
                        RelationDirection::Forward => RelationDefinition::forward(
                            row.constraint_name.clone(),
                            row.other_table.clone(),
                            Vec::new(),
                        ),
                        RelationDirection::Backward => RelationDefinition::backward(
                            row.constraint_name.clone(),
                            row.other_table.clone(),
                            Vec::new(),
                        ),
                    });
                if relation.to_table != row.other_table {
                    debug!(
                        table = %table,
                        constraint = %row.constraint_name,
                        other_table = %row.other_table,
                        "skipping reference row for another table"
                    );
                    continue;
                }
                let join = JoinDefinition::new(row.column_name, row.other_column);
                if !relation.joins.contains(&join) {
                    relation.joins.push(join);
                }
            }
            (table, by_key.into_values().collect())
        })
        .collect()
}
