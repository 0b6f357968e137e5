//! Cardinality resolution against the fixture catalog.

#[path = "../common/mod.rs"]
mod common;

use relschema::inference::{
    is_one_to_one_relation, primary_key, unique_key_combinations, InferenceError,
};
use relschema::schema::{ConstraintDefinition, JoinDefinition, RelationDefinition};

fn constraints_of(table: &str) -> Vec<ConstraintDefinition> {
    common::fixture_maps().constraints[table].clone()
}

#[test]
fn test_unique_key_combinations_single_column_keys() {
    let combos = unique_key_combinations(&constraints_of("users"));
    assert_eq!(combos, vec![vec!["email"], vec!["token"], vec!["user_id"]]);
}

#[test]
fn test_unique_key_combinations_compound_keys() {
    let combos = unique_key_combinations(&constraints_of("team_members_positions"));
    assert_eq!(
        combos,
        vec![vec!["manager", "position"], vec!["team_id", "user_id"]]
    );
}

#[test]
fn test_unique_key_combinations_have_sorted_columns_and_no_duplicates() {
    let maps = common::fixture_maps();
    for constraints in maps.constraints.values() {
        let combos = unique_key_combinations(constraints);
        for (i, combo) in combos.iter().enumerate() {
            let mut sorted = combo.clone();
            sorted.sort();
            assert_eq!(&sorted, combo);
            assert!(!combos[i + 1..].contains(combo));
        }
        if let Some(pk) = primary_key(constraints) {
            assert!(combos.contains(&pk.column_names));
        }
    }
}

#[test]
fn test_compound_primary_key() {
    let constraints = constraints_of("team_members");
    let pk = primary_key(&constraints).unwrap();
    assert_eq!(pk.column_names, vec!["team_id", "user_id"]);
}

#[test]
fn test_single_column_fk_outside_unique_is_not_one_to_one() {
    let rel = RelationDefinition::forward(
        "users_best_friend_id_fkey",
        "users",
        vec![JoinDefinition::new("best_friend_id", "user_id")],
    );
    assert!(!is_one_to_one_relation(&rel, &constraints_of("users")).unwrap());
}

#[test]
fn test_fk_matching_unique_key_is_one_to_one() {
    let rel = RelationDefinition::forward(
        "users_email_fkey",
        "emails",
        vec![JoinDefinition::new("email", "address")],
    );
    assert!(is_one_to_one_relation(&rel, &constraints_of("users")).unwrap());
}

#[test]
fn test_compound_fk_equal_to_primary_key_is_one_to_one() {
    let rel = RelationDefinition::forward(
        "team_members_positions_team_id_user_id_fkey",
        "team_members",
        vec![
            JoinDefinition::new("user_id", "user_id"),
            JoinDefinition::new("team_id", "team_id"),
        ],
    );
    assert!(is_one_to_one_relation(&rel, &constraints_of("team_members_positions")).unwrap());
}

#[test]
fn test_subset_of_compound_key_is_not_one_to_one() {
    let rel = RelationDefinition::forward(
        "team_members_team_id_fkey",
        "teams",
        vec![JoinDefinition::new("team_id", "team_id")],
    );
    assert!(!is_one_to_one_relation(&rel, &constraints_of("team_members")).unwrap());
}

#[test]
fn test_superset_of_unique_key_is_not_one_to_one() {
    let rel = RelationDefinition::forward(
        "users_email_token_fkey",
        "credentials",
        vec![
            JoinDefinition::new("email", "email"),
            JoinDefinition::new("token", "token"),
        ],
    );
    assert!(!is_one_to_one_relation(&rel, &constraints_of("users")).unwrap());
}

#[test]
fn test_backward_edge_fails_fast() {
    let rel = RelationDefinition::backward(
        "posts_author_id_fkey",
        "posts",
        vec![JoinDefinition::new("user_id", "author_id")],
    );
    let err = is_one_to_one_relation(&rel, &constraints_of("users")).unwrap_err();
    assert_eq!(
        err,
        InferenceError::InvalidDirection {
            constraint_name: "posts_author_id_fkey".to_string(),
            to_table: "posts".to_string(),
        }
    );
}
