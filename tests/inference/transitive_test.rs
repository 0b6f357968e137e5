//! Many-to-many relations through junction tables.

#[path = "../common/mod.rs"]
mod common;

use common::{build, fixture_maps, TABLES};
use relschema::inference::{BuilderOptions, Diagnostic, TableSchemaBuilder};
use relschema::schema::{Cardinality, Relation, TransitiveRelationDefinition};

fn transitive(relations: &[Relation]) -> Vec<&TransitiveRelationDefinition> {
    relations.iter().filter_map(Relation::as_transitive).collect()
}

#[test]
fn test_junction_table_alias_is_simplified() {
    let built = build("teams", &BuilderOptions::default());
    let users = built
        .definition
        .relation("users")
        .and_then(Relation::as_transitive)
        .unwrap();

    assert_eq!(users.to_table, "users");
    assert_eq!(users.join_table, "team_members");
    assert_eq!(users.cardinality, Cardinality::ManyToMany);

    assert_eq!(users.join_from.to_table, "team_members");
    assert_eq!(users.join_from.constraint_name, "team_members_team_id_fkey");
    assert_eq!(users.join_from.joins[0].from_column, "team_id");
    assert_eq!(users.join_from.joins[0].to_column, "team_id");

    assert_eq!(users.join_to.to_table, "users");
    assert_eq!(users.join_to.constraint_name, "team_members_user_id_fkey");
    assert_eq!(users.join_to.joins[0].from_column, "user_id");
    assert_eq!(users.join_to.joins[0].to_column, "user_id");
}

#[test]
fn test_hop_outside_join_table_key_keeps_full_alias() {
    let built = build("teams", &BuilderOptions::default());
    let posts = built
        .definition
        .relation("team_members_posts")
        .and_then(Relation::as_transitive)
        .unwrap();

    assert_eq!(posts.to_table, "posts");
    assert_eq!(posts.join_to.joins[0].from_column, "member_post_id");
    assert!(built.definition.relation("posts").is_none());
}

#[test]
fn test_repeated_full_alias_is_numbered() {
    let built = build("users", &BuilderOptions::default());
    let many = transitive(&built.definition.relations);

    let first = many.iter().find(|r| r.alias == "posts_users").unwrap();
    let second = many.iter().find(|r| r.alias == "posts_users_2").unwrap();

    assert_eq!(first.join_from.constraint_name, "posts_author_id_fkey");
    assert_eq!(first.join_to.constraint_name, "posts_co_author_fkey");
    assert_eq!(second.join_from.constraint_name, "posts_co_author_fkey");
    assert_eq!(second.join_to.constraint_name, "posts_author_id_fkey");
}

#[test]
fn test_never_pairs_constraint_with_itself() {
    let maps = fixture_maps();
    for table in TABLES {
        let built = TableSchemaBuilder::new(table, &maps)
            .build_table_definition(&BuilderOptions::default())
            .unwrap();
        for rel in transitive(&built.definition.relations) {
            assert_ne!(rel.join_from.constraint_name, rel.join_to.constraint_name, "{}", table);
        }
    }
}

#[test]
fn test_self_referencing_key_yields_no_transitive_relation() {
    let built = build("users", &BuilderOptions::default());
    assert!(transitive(&built.definition.relations)
        .iter()
        .all(|r| r.join_table != "users"));
}

#[test]
fn test_one_to_one_backward_hop_without_other_keys_yields_nothing() {
    let built = build("team_members", &BuilderOptions::default());
    assert!(transitive(&built.definition.relations).is_empty());
}

#[test]
fn test_disabled_transitive_relations() {
    let maps = fixture_maps();
    let options = BuilderOptions::without_transitive_relations();
    for table in TABLES {
        let built = TableSchemaBuilder::new(table, &maps)
            .build_table_definition(&options)
            .unwrap();
        assert!(built
            .definition
            .relations
            .iter()
            .all(|r| r.cardinality() != Cardinality::ManyToMany));
    }
}

#[test]
fn test_simplified_alias_yields_to_existing_column() {
    let mut maps = fixture_maps();
    let teams = maps.columns.get_mut("teams").unwrap();
    let mut users_column = teams["team_name"].clone();
    users_column.column_name = "users".to_string();
    teams.insert("users".to_string(), users_column);

    let built = TableSchemaBuilder::new("teams", &maps)
        .build_table_definition(&BuilderOptions::default())
        .unwrap();

    let many = transitive(&built.definition.relations);
    let to_users = many.iter().find(|r| r.to_table == "users").unwrap();
    assert_eq!(to_users.alias, "team_members_users");
}

#[test]
fn test_dangling_second_hop_is_skipped() {
    let mut maps = fixture_maps();
    maps.forward_relations
        .get_mut("team_members")
        .unwrap()
        .push(relschema::schema::RelationDefinition::forward(
            "team_members_role_id_fkey",
            "roles",
            vec![relschema::schema::JoinDefinition::new("role_id", "role_id")],
        ));

    let built = TableSchemaBuilder::new("teams", &maps)
        .build_table_definition(&BuilderOptions::default())
        .unwrap();

    assert!(transitive(&built.definition.relations)
        .iter()
        .all(|r| r.to_table != "roles"));
    assert!(built.diagnostics.contains(&Diagnostic::DanglingForeignKey {
        table: "teams".to_string(),
        constraint_name: "team_members_role_id_fkey".to_string(),
        related_table: "roles".to_string(),
    }));
}
