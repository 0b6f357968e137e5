//! MySQL catalog provider.
//!
//! MySQL has no global enum types: every `enum(...)`/`set(...)` column gets an
//! enum named `<table>_<column>`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{info, warn};

use super::error::{IntrospectionError, IntrospectionResult};
use super::helpers::{
    build_columns, build_constraints, build_enums, build_relations, log_query, ColumnRow, EnumRow,
    KeyRow, ReferenceRow,
};
use super::provider::Introspection;
use crate::config::ConnectionConfig;
use crate::schema::{
    ColumnType, Comparable, ConnectionSummary, ConstraintDefinition, NonComparable,
    RelationDefinition, RelationDirection, TableColumns, TableEnums, TableMap,
};

static ENUM_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(enum|set)\('|'\)$").expect("enum wrapper pattern is valid")
});

const TABLES_SQL: &str = r#"
SELECT table_name AS table_name
FROM information_schema.columns
WHERE table_schema = ?
GROUP BY table_name
ORDER BY table_name
"#;

const ENUMS_SQL: &str = r#"
SELECT table_name AS table_name, column_name AS column_name, column_type AS column_type
FROM information_schema.columns
WHERE data_type IN ('enum', 'set') AND table_schema = ? AND table_name IN ({tables})
ORDER BY table_name, ordinal_position
"#;

const COLUMNS_SQL: &str = r#"
SELECT table_name AS table_name, column_name AS column_name, data_type AS data_type,
       is_nullable AS is_nullable, column_default AS column_default, extra AS extra
FROM information_schema.columns
WHERE table_schema = ? AND table_name IN ({tables})
ORDER BY table_name, ordinal_position
"#;

const CONSTRAINTS_SQL: &str = r#"
SELECT k.table_name AS table_name, k.column_name AS column_name,
       k.constraint_name AS constraint_name, c.constraint_type AS constraint_type
FROM information_schema.key_column_usage k
LEFT JOIN information_schema.table_constraints c
    ON k.constraint_name = c.constraint_name
    AND k.constraint_schema = c.constraint_schema
    AND k.table_name = c.table_name
WHERE k.table_schema = ? AND k.table_name IN ({tables})
ORDER BY k.table_name, k.constraint_name, k.ordinal_position
"#;

const FORWARD_SQL: &str = r#"
SELECT table_name AS table_name, constraint_name AS constraint_name, column_name AS column_name,
       referenced_table_name AS referenced_table_name, referenced_column_name AS referenced_column_name
FROM information_schema.key_column_usage
WHERE referenced_table_name IS NOT NULL AND table_schema = ? AND table_name IN ({tables})
ORDER BY table_name, constraint_name, ordinal_position
"#;

const BACKWARD_SQL: &str = r#"
SELECT referenced_table_name AS table_name, constraint_name AS constraint_name,
       referenced_column_name AS column_name, table_name AS referencing_table_name,
       column_name AS referencing_column_name
FROM information_schema.key_column_usage
WHERE referenced_table_name IS NOT NULL AND table_schema = ? AND referenced_table_name IN ({tables})
ORDER BY referenced_table_name, constraint_name, ordinal_position
"#;

/// Name given to the enum declared on `table.column`.
pub fn enum_name(table: &str, column: &str) -> String {
    format!("{}_{}", table, column)
}

/// Values of a `column_type` such as `enum('a','b')` or `set('x')`.
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let inner = ENUM_WRAPPER.replace_all(column_type, "");
    inner.split("','").map(str::to_string).collect()
}

/// Map a MySQL `data_type` to a column type.
pub fn column_type_for(
    table: &str,
    column: &str,
    data_type: &str,
    enums: Option<&TableEnums>,
) -> ColumnType {
    match data_type {
        "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "time"
        | "geometry" => ColumnType::STRING,
        "integer" | "int" | "smallint" | "mediumint" | "bigint" | "double" | "decimal"
        | "numeric" | "float" | "year" => ColumnType::NUMBER,
        "tinyint" => ColumnType::BOOLEAN,
        "json" => ColumnType::NonComparable(NonComparable::Object),
        "date" | "datetime" | "timestamp" => ColumnType::Comparable(Comparable::Timestamp),
        "tinyblob" | "mediumblob" | "longblob" | "blob" | "binary" | "varbinary" | "bit" => {
            ColumnType::NonComparable(NonComparable::Binary)
        }
        other => {
            let name = enum_name(table, column);
            match enums {
                Some(enums) if enums.contains_key(&name) => ColumnType::Enum(name),
                _ => {
                    warn!(table, column, db_type = other, "no type mapping found; column typed as any");
                    ColumnType::ANY
                }
            }
        }
    }
}

/// `?, ?, ?` for an IN list of `n` values.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Read a text column that MySQL may report as binary.
fn text(row: &MySqlRow, index: usize) -> IntrospectionResult<Option<String>> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value);
    }
    let bytes: Option<Vec<u8>> = row.try_get(index)?;
    Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
}

fn required_text(row: &MySqlRow, index: usize) -> IntrospectionResult<String> {
    text(row, index)?.ok_or_else(|| IntrospectionError::Decode {
        column: row
            .columns()
            .get(index)
            .map(|c| sqlx::Column::name(c).to_string())
            .unwrap_or_else(|| index.to_string()),
        message: "unexpected NULL".to_string(),
    })
}

/// Introspects one MySQL database.
pub struct MySqlIntrospection {
    pool: MySqlPool,
    database: String,
    summary: Option<ConnectionSummary>,
}

impl MySqlIntrospection {
    /// Open a single-connection pool for `config`.
    pub async fn connect(config: &ConnectionConfig) -> IntrospectionResult<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port())
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        info!(host = %config.host, database = %config.database, "connected to mysql");

        Ok(Self {
            pool,
            database: config.database.clone(),
            summary: Some(config.summary()),
        })
    }

    /// Run a query template whose `{tables}` marker is expanded to one
    /// placeholder per table.
    async fn fetch(&self, template: &str, tables: &[String]) -> IntrospectionResult<Vec<MySqlRow>> {
        if tables.is_empty() {
            return Ok(Vec::new());
        }

        let sql = template.replace("{tables}", &placeholders(tables.len()));
        log_query(&sql, tables);

        let mut query = sqlx::query(&sql).bind(&self.database);
        for table in tables {
            query = query.bind(table);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn fetch_references(
        &self,
        sql: &str,
        tables: &[String],
        direction: RelationDirection,
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        let mut rows = Vec::new();
        for row in self.fetch(sql, tables).await? {
            rows.push(ReferenceRow {
                table_name: required_text(&row, 0)?,
                constraint_name: required_text(&row, 1)?,
                column_name: required_text(&row, 2)?,
                other_table: required_text(&row, 3)?,
                other_column: required_text(&row, 4)?,
            });
        }
        Ok(build_relations(rows, direction))
    }
}

#[async_trait]
impl Introspection for MySqlIntrospection {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn schema_name(&self) -> &str {
        &self.database
    }

    fn connection_summary(&self) -> Option<ConnectionSummary> {
        self.summary.clone()
    }

    async fn list_tables(&self) -> IntrospectionResult<Vec<String>> {
        log_query(TABLES_SQL, &[]);
        let rows = sqlx::query(TABLES_SQL)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| required_text(row, 0)).collect()
    }

    async fn get_enums(&self, tables: &[String]) -> IntrospectionResult<TableMap<TableEnums>> {
        let mut rows = Vec::new();
        for row in self.fetch(ENUMS_SQL, tables).await? {
            let table_name = required_text(&row, 0)?;
            let column_name = required_text(&row, 1)?;
            let column_type = required_text(&row, 2)?;

            for value in parse_enum_values(&column_type) {
                rows.push(EnumRow {
                    table_name: table_name.clone(),
                    enum_name: enum_name(&table_name, &column_name),
                    value,
                    id: None,
                    source_column: Some(column_name.clone()),
                });
            }
        }
        Ok(build_enums(rows))
    }

    async fn get_columns(
        &self,
        tables: &[String],
        enums: &TableMap<TableEnums>,
    ) -> IntrospectionResult<TableMap<TableColumns>> {
        let mut rows = Vec::new();
        for row in self.fetch(COLUMNS_SQL, tables).await? {
            let extra = text(&row, 5)?.filter(|e| !e.is_empty());
            rows.push(ColumnRow {
                table_name: required_text(&row, 0)?,
                column_name: required_text(&row, 1)?,
                db_type: required_text(&row, 2)?,
                is_nullable: required_text(&row, 3)?,
                column_default: text(&row, 4)?.or(extra),
            });
        }
        Ok(build_columns(rows, enums, column_type_for))
    }

    async fn get_constraints(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<ConstraintDefinition>>> {
        let mut rows = Vec::new();
        for row in self.fetch(CONSTRAINTS_SQL, tables).await? {
            rows.push(KeyRow {
                table_name: required_text(&row, 0)?,
                column_name: required_text(&row, 1)?,
                constraint_name: required_text(&row, 2)?,
                constraint_type: text(&row, 3)?,
            });
        }
        Ok(build_constraints(rows))
    }

    async fn get_forward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        self.fetch_references(FORWARD_SQL, tables, RelationDirection::Forward)
            .await
    }

    async fn get_backward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        self.fetch_references(BACKWARD_SQL, tables, RelationDirection::Backward)
            .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
