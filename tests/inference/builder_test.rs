//! Table Schema Builder: aliases, cardinalities and soft-delete detection.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;

use common::{aliases, build, fixture_maps, TABLES};
use relschema::inference::{BuilderOptions, Diagnostic, TableSchemaBuilder};
use relschema::schema::{Cardinality, ColumnType, Relation, RelationDirection};

fn direct<'a>(built: &'a relschema::inference::BuiltTable, alias: &str) -> &'a relschema::schema::RelationDefinition {
    built
        .definition
        .relation(alias)
        .and_then(Relation::as_direct)
        .unwrap_or_else(|| panic!("no direct relation '{}'", alias))
}

#[test]
fn test_users_definition() {
    let built = build("users", &BuilderOptions::without_transitive_relations());
    let users = &built.definition;

    assert_eq!(users.primary_key.as_ref().unwrap().column_names, vec!["user_id"]);
    assert_eq!(users.keys.len(), 4);
    assert_eq!(
        users.unique_key_combinations,
        vec![vec!["email"], vec!["token"], vec!["user_id"]]
    );
    assert_eq!(
        users.columns["permissions"].inferred_type,
        ColumnType::Enum("permission".to_string())
    );
    assert!(users.enums.contains_key("permission"));
    assert!(users.soft_delete_column.is_none());
    assert!(built.diagnostics.is_empty());
}

#[test]
fn test_forward_single_column_alias_strips_id() {
    let built = build("users", &BuilderOptions::default());
    let best_friend = direct(&built, "best_friend");

    assert_eq!(best_friend.to_table, "users");
    assert_eq!(best_friend.cardinality, Cardinality::BelongsTo);
    assert_eq!(best_friend.direction, RelationDirection::Forward);
}

#[test]
fn test_forward_alias_column_conflict_gets_suffix() {
    let built = build("posts", &BuilderOptions::default());

    let author = direct(&built, "author");
    assert_eq!(author.joins[0].from_column, "author_id");

    let co_author = direct(&built, "co_author_relation");
    assert_eq!(co_author.joins[0].from_column, "co_author");
    assert_eq!(co_author.cardinality, Cardinality::BelongsTo);
    assert!(built.definition.relation("co_author").is_none());
}

#[test]
fn test_backward_relations_to_same_table_are_prefixed() {
    let built = build("users", &BuilderOptions::default());

    let author_posts = direct(&built, "author_posts");
    assert_eq!(author_posts.to_table, "posts");
    assert_eq!(author_posts.cardinality, Cardinality::HasMany);
    assert_eq!(author_posts.joins[0].to_column, "author_id");

    let co_author_posts = direct(&built, "co_author_posts");
    assert_eq!(co_author_posts.cardinality, Cardinality::HasMany);
    assert_eq!(co_author_posts.constraint_name, "posts_co_author_fkey");
}

#[test]
fn test_backward_relation_default_alias_is_plural() {
    let built = build("teams", &BuilderOptions::default());
    let members = direct(&built, "team_members");

    assert_eq!(members.cardinality, Cardinality::HasMany);
    assert_eq!(members.direction, RelationDirection::Backward);
    assert_eq!(members.joins[0].from_column, "team_id");
}

#[test]
fn test_compound_forward_relation_is_has_one_and_singular() {
    let built = build("team_members_positions", &BuilderOptions::default());
    let member = direct(&built, "team_member");

    assert!(member.is_compound());
    assert_eq!(member.to_table, "team_members");
    assert_eq!(member.cardinality, Cardinality::HasOne);
}

#[test]
fn test_backward_mirror_of_one_to_one_is_has_one() {
    let built = build("team_members", &BuilderOptions::default());
    let position = direct(&built, "team_members_position");

    assert_eq!(position.to_table, "team_members_positions");
    assert_eq!(position.cardinality, Cardinality::HasOne);
}

#[test]
fn test_team_members_forward_aliases() {
    let built = build("team_members", &BuilderOptions::without_transitive_relations());
    assert_eq!(
        aliases(&built),
        vec!["team", "user", "member_post", "team_members_position"]
    );
    for alias in ["team", "user", "member_post"] {
        assert_eq!(direct(&built, alias).cardinality, Cardinality::BelongsTo);
    }
}

#[test]
fn test_relation_order_forward_backward_transitive() {
    let built = build("users", &BuilderOptions::default());
    assert_eq!(
        aliases(&built),
        vec![
            "best_friend",
            "author_posts",
            "co_author_posts",
            "team_members",
            "users",
            "posts_users",
            "posts_users_2",
            "teams",
            "team_members_posts",
        ]
    );
}

#[test]
fn test_aliases_unique_and_never_shadow_columns() {
    let maps = fixture_maps();
    for table in TABLES {
        let built = TableSchemaBuilder::new(table, &maps)
            .build_table_definition(&BuilderOptions::default())
            .unwrap();
        let mut seen = HashSet::new();
        for relation in &built.definition.relations {
            assert!(seen.insert(relation.alias()), "{}: duplicate alias {}", table, relation.alias());
            assert!(
                !built.definition.columns.contains_key(relation.alias()),
                "{}: alias {} shadows a column",
                table,
                relation.alias()
            );
        }
    }
}

#[test]
fn test_soft_delete_column() {
    let built = build("posts", &BuilderOptions::default());
    let soft_delete = built.definition.soft_delete_column.unwrap();
    assert_eq!(soft_delete.column_name, "deleted");
    assert_eq!(soft_delete.inferred_type, ColumnType::BOOLEAN);
}

#[test]
fn test_relation_to_uninspected_table_is_skipped_with_diagnostic() {
    let mut maps = fixture_maps();
    maps.forward_relations
        .get_mut("posts")
        .unwrap()
        .push(relschema::schema::RelationDefinition::forward(
            "posts_category_id_fkey",
            "categories",
            vec![relschema::schema::JoinDefinition::new("category_id", "category_id")],
        ));

    let built = TableSchemaBuilder::new("posts", &maps)
        .build_table_definition(&BuilderOptions::default())
        .unwrap();

    assert!(built.definition.relations.iter().all(|r| r.to_table() != "categories"));
    assert_eq!(
        built.diagnostics,
        vec![Diagnostic::DanglingForeignKey {
            table: "posts".to_string(),
            constraint_name: "posts_category_id_fkey".to_string(),
            related_table: "categories".to_string(),
        }]
    );
}

#[test]
fn test_backward_relation_without_mirror_keeps_has_many() {
    let mut maps = fixture_maps();
    maps.forward_relations.get_mut("posts").unwrap().clear();

    let built = TableSchemaBuilder::new("users", &maps)
        .build_table_definition(&BuilderOptions::without_transitive_relations())
        .unwrap();

    let author_posts = direct(&built, "author_posts");
    assert_eq!(author_posts.cardinality, Cardinality::HasMany);
    assert_eq!(
        built
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingMirrorRelation { .. }))
            .count(),
        2
    );
}

#[test]
fn test_unknown_table_builds_empty_definition() {
    let maps = fixture_maps();
    let built = TableSchemaBuilder::new("ghosts", &maps)
        .build_table_definition(&BuilderOptions::default())
        .unwrap();

    assert!(built.definition.primary_key.is_none());
    assert!(built.definition.columns.is_empty());
    assert!(built.definition.relations.is_empty());
}
