//! In-memory catalog shared by the integration tests.
//!
//! Mirrors a small blogging/teams database:
//!
//! ```text
//! users(user_id PK, email UNIQUE, token UNIQUE, best_friend_id -> users, permissions, subscription_level)
//! posts(post_id PK, author_id -> users, co_author -> users, title, deleted)
//! teams(team_id PK, team_name)
//! team_members(PK(team_id, user_id), team_id -> teams, user_id -> users, member_post_id -> posts)
//! team_members_positions(PK(team_id, user_id), (team_id, user_id) -> team_members, UNIQUE(manager, position))
//! ```

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use relschema::inference::{BuilderOptions, BuiltTable, SchemaMaps, TableSchemaBuilder};
use relschema::introspection::{Introspection, IntrospectionError, IntrospectionResult};
use relschema::schema::{
    ColumnDefinition, ColumnType, ConstraintDefinition, EnumDefinition, JoinDefinition,
    RelationDefinition, TableColumns, TableEnums, TableMap,
};

pub const TABLES: [&str; 5] = ["posts", "team_members", "team_members_positions", "teams", "users"];

fn column(name: &str, db_type: &str, nullable: bool, ty: ColumnType) -> (String, ColumnDefinition) {
    (
        name.to_string(),
        ColumnDefinition {
            column_name: name.to_string(),
            db_type: db_type.to_string(),
            nullable,
            column_default: None,
            inferred_type: ty,
        },
    )
}

fn int(name: &str) -> (String, ColumnDefinition) {
    column(name, "int4", false, ColumnType::NUMBER)
}

fn varchar(name: &str) -> (String, ColumnDefinition) {
    column(name, "varchar", true, ColumnType::STRING)
}

fn join(from: &str, to: &str) -> JoinDefinition {
    JoinDefinition::new(from, to)
}

/// Bulk metadata of the fixture database. Backward relations are derived
/// from the forward ones, as a catalog would report them.
pub fn fixture_maps() -> SchemaMaps {
    let mut maps = SchemaMaps::default();

    let mut user_enums = TableEnums::new();
    user_enums.insert(
        "permission".to_string(),
        EnumDefinition {
            enum_name: "permission".to_string(),
            values: ["ADMIN", "USER"].iter().map(|v| v.to_string()).collect(),
            source_column: None,
            id: Some("16390".to_string()),
        },
    );
    maps.enums.insert("users".to_string(), user_enums);

    let tables: Vec<(&str, TableColumns)> = vec![
        (
            "posts",
            [
                int("post_id"),
                int("author_id"),
                column("co_author", "int4", true, ColumnType::NUMBER),
                varchar("title"),
                column("deleted", "bool", false, ColumnType::BOOLEAN),
            ]
            .into_iter()
            .collect(),
        ),
        (
            "team_members",
            [
                int("team_id"),
                int("user_id"),
                column("member_post_id", "int4", true, ColumnType::NUMBER),
            ]
            .into_iter()
            .collect(),
        ),
        (
            "team_members_positions",
            [int("team_id"), int("user_id"), varchar("position"), varchar("manager")]
                .into_iter()
                .collect(),
        ),
        ("teams", [int("team_id"), varchar("team_name")].into_iter().collect()),
        (
            "users",
            [
                int("user_id"),
                varchar("email"),
                varchar("token"),
                column("best_friend_id", "int4", true, ColumnType::NUMBER),
                column("permissions", "permission", true, ColumnType::Enum("permission".to_string())),
                varchar("subscription_level"),
            ]
            .into_iter()
            .collect(),
        ),
    ];
    for (name, columns) in tables {
        maps.columns.insert(name.to_string(), columns);
    }

    let constraints = [
        (
            "posts",
            vec![
                ConstraintDefinition::primary_key("posts_pkey", ["post_id"]),
                ConstraintDefinition::foreign_key("posts_author_id_fkey", ["author_id"]),
                ConstraintDefinition::foreign_key("posts_co_author_fkey", ["co_author"]),
            ],
        ),
        (
            "team_members",
            vec![
                ConstraintDefinition::primary_key("team_members_pkey", ["team_id", "user_id"]),
                ConstraintDefinition::foreign_key("team_members_team_id_fkey", ["team_id"]),
                ConstraintDefinition::foreign_key("team_members_user_id_fkey", ["user_id"]),
                ConstraintDefinition::foreign_key("team_members_member_post_id_fkey", ["member_post_id"]),
            ],
        ),
        (
            "team_members_positions",
            vec![
                ConstraintDefinition::primary_key("team_members_positions_pkey", ["user_id", "team_id"]),
                ConstraintDefinition::foreign_key(
                    "team_members_positions_team_id_user_id_fkey",
                    ["team_id", "user_id"],
                ),
                ConstraintDefinition::unique(
                    "team_members_positions_manager_position_key",
                    ["position", "manager"],
                ),
            ],
        ),
        ("teams", vec![ConstraintDefinition::primary_key("teams_pkey", ["team_id"])]),
        (
            "users",
            vec![
                ConstraintDefinition::primary_key("users_pkey", ["user_id"]),
                ConstraintDefinition::unique("users_email_key", ["email"]),
                ConstraintDefinition::unique("users_token_key", ["token"]),
                ConstraintDefinition::foreign_key("users_best_friend_id_fkey", ["best_friend_id"]),
            ],
        ),
    ];
    for (name, list) in constraints {
        maps.constraints.insert(name.to_string(), list);
    }

    let forward = [
        (
            "posts",
            vec![
                RelationDefinition::forward("posts_author_id_fkey", "users", vec![join("author_id", "user_id")]),
                RelationDefinition::forward("posts_co_author_fkey", "users", vec![join("co_author", "user_id")]),
            ],
        ),
        (
            "team_members",
            vec![
                RelationDefinition::forward("team_members_team_id_fkey", "teams", vec![join("team_id", "team_id")]),
                RelationDefinition::forward("team_members_user_id_fkey", "users", vec![join("user_id", "user_id")]),
                RelationDefinition::forward(
                    "team_members_member_post_id_fkey",
                    "posts",
                    vec![join("member_post_id", "post_id")],
                ),
            ],
        ),
        (
            "team_members_positions",
            vec![RelationDefinition::forward(
                "team_members_positions_team_id_user_id_fkey",
                "team_members",
                vec![join("team_id", "team_id"), join("user_id", "user_id")],
            )],
        ),
        (
            "users",
            vec![RelationDefinition::forward(
                "users_best_friend_id_fkey",
                "users",
                vec![join("best_friend_id", "user_id")],
            )],
        ),
    ];
    for (name, list) in forward {
        maps.forward_relations.insert(name.to_string(), list);
    }

    derive_backward_relations(&mut maps);
    maps
}

/// Recompute backward relations as the mirror image of the forward ones.
pub fn derive_backward_relations(maps: &mut SchemaMaps) {
    let mut backward: TableMap<Vec<RelationDefinition>> = TableMap::new();
    for (table, relations) in &maps.forward_relations {
        for rel in relations {
            let joins = rel
                .joins
                .iter()
                .map(|j| JoinDefinition::new(j.to_column.clone(), j.from_column.clone()))
                .collect();
            backward
                .entry(rel.to_table.clone())
                .or_default()
                .push(RelationDefinition::backward(rel.constraint_name.clone(), table.clone(), joins));
        }
    }
    maps.backward_relations = backward;
}

pub fn build(table: &str, options: &BuilderOptions) -> BuiltTable {
    let maps = fixture_maps();
    TableSchemaBuilder::new(table, &maps)
        .build_table_definition(options)
        .unwrap()
}

pub fn aliases(built: &BuiltTable) -> Vec<String> {
    built
        .definition
        .relations
        .iter()
        .map(|r| r.alias().to_string())
        .collect()
}

/// Which provider call should fail, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Never,
    ListTables,
    Constraints,
}

/// An [`Introspection`] provider serving [`fixture_maps`].
pub struct FixtureIntrospection {
    pub maps: SchemaMaps,
    pub tables: Vec<String>,
    pub fail_at: FailAt,
    pub close_calls: AtomicUsize,
}

impl FixtureIntrospection {
    pub fn new() -> Self {
        Self::with_maps(fixture_maps())
    }

    pub fn with_maps(maps: SchemaMaps) -> Self {
        Self {
            tables: maps.columns.keys().cloned().collect(),
            maps,
            fail_at: FailAt::Never,
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::new()
        }
    }

    pub fn closed(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn check(&self, at: FailAt) -> IntrospectionResult<()> {
        if self.fail_at == at {
            return Err(IntrospectionError::Query(sqlx::Error::Protocol(
                "connection reset by peer".to_string(),
            )));
        }
        Ok(())
    }

    fn select<T: Clone>(map: &TableMap<T>, tables: &[String]) -> TableMap<T> {
        tables
            .iter()
            .filter_map(|t| map.get(t).map(|v| (t.clone(), v.clone())))
            .collect()
    }
}

#[async_trait]
impl Introspection for FixtureIntrospection {
    fn database_name(&self) -> &str {
        "relschema_test"
    }

    fn schema_name(&self) -> &str {
        "public"
    }

    async fn list_tables(&self) -> IntrospectionResult<Vec<String>> {
        self.check(FailAt::ListTables)?;
        Ok(self.tables.clone())
    }

    async fn get_enums(&self, tables: &[String]) -> IntrospectionResult<TableMap<TableEnums>> {
        Ok(Self::select(&self.maps.enums, tables))
    }

    async fn get_columns(
        &self,
        tables: &[String],
        _enums: &TableMap<TableEnums>,
    ) -> IntrospectionResult<TableMap<TableColumns>> {
        Ok(Self::select(&self.maps.columns, tables))
    }

    async fn get_constraints(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<ConstraintDefinition>>> {
        self.check(FailAt::Constraints)?;
        Ok(Self::select(&self.maps.constraints, tables))
    }

    async fn get_forward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        Ok(Self::select(&self.maps.forward_relations, tables))
    }

    async fn get_backward_relations(
        &self,
        tables: &[String],
    ) -> IntrospectionResult<TableMap<Vec<RelationDefinition>>> {
        Ok(Self::select(&self.maps.backward_relations, tables))
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}
