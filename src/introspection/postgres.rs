//! PostgreSQL catalog provider.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{info, warn};

use super::error::IntrospectionResult;
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

const TABLES_SQL: &str = r#"
SELECT table_name::text
FROM information_schema.columns
WHERE table_schema = $1
GROUP BY table_name
ORDER BY table_name
"#;

const ENUMS_SQL: &str = r#"
SELECT c.table_name::text, t.typname::text, e.enumlabel::text, t.oid::text
FROM pg_type t
JOIN pg_enum e ON t.oid = e.enumtypid
LEFT JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
LEFT JOIN information_schema.columns c ON c.udt_name = t.typname
WHERE n.nspname = $1 AND c.table_schema = $1 AND c.table_name = ANY($2)
ORDER BY c.table_name, t.oid, e.enumsortorder
"#;

const COLUMNS_SQL: &str = r#"
SELECT table_name::text, column_name::text, udt_name::text, is_nullable::text, column_default::text
FROM information_schema.columns
WHERE table_schema = $1 AND table_name = ANY($2)
ORDER BY table_name, ordinal_position
"#;

const CONSTRAINTS_SQL: &str = r#"
SELECT k.table_name::text, k.column_name::text, k.constraint_name::text, c.constraint_type::text
FROM information_schema.key_column_usage k
LEFT JOIN information_schema.table_constraints c
    ON k.constraint_name = c.constraint_name
    AND k.constraint_schema = c.constraint_schema
    AND k.table_name = c.table_name
WHERE k.table_schema = $1 AND k.table_name = ANY($2)
ORDER BY k.table_name, k.constraint_name, k.ordinal_position
"#;

// Foreign keys are read from `pg_constraint`: constraint names are only unique
// per table, so `referential_constraints` cannot tell same-named keys apart.
const FORWARD_SQL: &str = r#"
SELECT src.relname::text, con.conname::text, a.attname::text,
       dst.relname::text, fa.attname::text
FROM pg_catalog.pg_constraint con
JOIN pg_catalog.pg_class src ON src.oid = con.conrelid
JOIN pg_catalog.pg_namespace ns ON ns.oid = src.relnamespace
JOIN pg_catalog.pg_class dst ON dst.oid = con.confrelid
CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, fattnum, position)
JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
JOIN pg_catalog.pg_attribute fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum
WHERE con.contype = 'f' AND ns.nspname = $1 AND src.relname = ANY($2)
ORDER BY src.relname, con.conname, k.position
"#;

const BACKWARD_SQL: &str = r#"
SELECT dst.relname::text, con.conname::text, fa.attname::text,
       src.relname::text, a.attname::text
FROM pg_catalog.pg_constraint con
JOIN pg_catalog.pg_class src ON src.oid = con.conrelid
JOIN pg_catalog.pg_class dst ON dst.oid = con.confrelid
JOIN pg_catalog.pg_namespace ns ON ns.oid = dst.relnamespace
CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, fattnum, position)
JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
JOIN pg_catalog.pg_attribute fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum
WHERE con.contype = 'f' AND ns.nspname = $1 AND dst.relname = ANY($2)
ORDER BY dst.relname, src.relname, con.conname, k.position
"#;

/// Map a Postgres `udt_name` to a column type.
///
/// Unknown names resolve to an enum of the table when one is declared with
/// that name, otherwise to `any`.
pub fn column_type_for(column: &str, udt_name: &str, enums: Option<&TableEnums>) -> ColumnType {
    match udt_name {
        "bpchar" | "char" | "varchar" | "text" | "citext" | "uuid" | "bytea" | "inet" | "time"
        | "timetz" | "interval" | "name" => ColumnType::STRING,
        "int2" | "int4" | "int8" | "float4" | "float8" | "numeric" | "money" | "oid" => {
            ColumnType::NUMBER
        }
        "bool" => ColumnType::BOOLEAN,
        "json" | "jsonb" => ColumnType::NonComparable(NonComparable::Object),
        "date" | "timestamp" | "timestamptz" => ColumnType::Comparable(Comparable::Timestamp),
        "_int2" | "_int4" | "_int8" | "_float4" | "_float8" | "_numeric" | "_money" => {
            ColumnType::NonComparable(NonComparable::ArrayNumber)
        }
        "_bool" => ColumnType::NonComparable(NonComparable::ArrayBoolean),
        "_varchar" | "_text" | "_citext" | "_uuid" | "_bytea" => {
            ColumnType::NonComparable(NonComparable::ArrayString)
        }
        "_json" | "_jsonb" => ColumnType::NonComparable(NonComparable::ArrayObject),
        "_timestamptz" => ColumnType::NonComparable(NonComparable::ArrayTimestamp),
        other => match enums {
            Some(enums) if enums.contains_key(other) => ColumnType::Enum(other.to_string()),
            _ => {
                warn!(column, db_type = other, "no type mapping found; column typed as any");
                ColumnType::ANY
            }
        },
    }
}

/// Introspects one schema of a Postgres database.
pub struct PostgresIntrospection {
    pool: PgPool,
    database: String,
    schema: String,
    summary: Option<ConnectionSummary>,
}

impl PostgresIntrospection {
    /// Open a single-connection pool for `config`.
    pub async fn connect(config: &ConnectionConfig) -> IntrospectionResult<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port())
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        info!(host = %config.host, database = %config.database, "connected to postgres");

        Ok(Self {
            pool,
            database: config.database.clone(),
            schema: config.schema_name(),
            summary: Some(config.summary()),
        })
    }

    async fn fetch(&self, sql: &str, tables: &[String]) -> IntrospectionResult<Vec<PgRow>> {
        log_query(sql, tables);
        let rows = sqlx::query(sql)
            .bind(&self.schema)
            .bind(tables.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_references(
        &self,
        sql: &str,
        tables: &[String],
        direction: RelationDirection,
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        let rows = self
            .fetch(sql, tables)
            .await?
            .iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(ReferenceRow {
                    table_name: row.try_get(0)?,
                    constraint_name: row.try_get(1)?,
                    column_name: row.try_get(2)?,
                    other_table: row.try_get(3)?,
                    other_column: row.try_get(4)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(build_relations(rows, direction))
    }
}

#[async_trait]
impl Introspection for PostgresIntrospection {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn schema_name(&self) -> &str {
        &self.schema
    }

    fn connection_summary(&self) -> Option<ConnectionSummary> {
        self.summary.clone()
    }

    async fn list_tables(&self) -> IntrospectionResult<Vec<String>> {
        log_query(TABLES_SQL, &[]);
        let rows = sqlx::query(TABLES_SQL)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;
        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<_, _>>()?;
        Ok(tables)
    }

    async fn get_enums(&self, tables: &[String]) -> IntrospectionResult<TableMap<TableEnums>> {
        let rows = self
            .fetch(ENUMS_SQL, tables)
            .await?
            .iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(EnumRow {
                    table_name: row.try_get(0)?,
                    enum_name: row.try_get(1)?,
                    value: row.try_get(2)?,
                    id: row.try_get(3)?,
                    source_column: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(build_enums(rows))
    }

    async fn get_columns(
        &self,
        tables: &[String],
        enums: &TableMap<TableEnums>,
    ) -> IntrospectionResult<TableMap<TableColumns>> {
        let rows = self
            .fetch(COLUMNS_SQL, tables)
            .await?
            .iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(ColumnRow {
                    table_name: row.try_get(0)?,
                    column_name: row.try_get(1)?,
                    db_type: row.try_get(2)?,
                    is_nullable: row.try_get(3)?,
                    column_default: row.try_get(4)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(build_columns(rows, enums, |_table, column, db_type, table_enums| {
            column_type_for(column, db_type, table_enums)
        }))
    }

    async fn get_constraints(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<ConstraintDefinition>>> {
        let rows = self
            .fetch(CONSTRAINTS_SQL, tables)
            .await?
            .iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(KeyRow {
                    table_name: row.try_get(0)?,
                    column_name: row.try_get(1)?,
                    constraint_name: row.try_get(2)?,
                    constraint_type: row.try_get(3)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
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
