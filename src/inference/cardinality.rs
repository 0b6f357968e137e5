//! Cardinality resolution over a table's key constraints.
//!
//! All functions are pure and operate on one table's constraint list. Column
//! lists of [`ConstraintDefinition`]s are already sorted, so comparing key
//! combinations is plain vector equality.

use std::collections::BTreeSet;

use crate::schema::{ConstraintDefinition, ConstraintType, RelationDefinition};

use super::error::{InferenceError, InferenceResult};

/// The primary key of a table, if it has one.
///
/// Catalogs enforce at most one primary key per table; the first is returned.
pub fn primary_key(constraints: &[ConstraintDefinition]) -> Option<&ConstraintDefinition> {
    constraints
        .iter()
        .find(|c| c.constraint_type == ConstraintType::PrimaryKey)
}

/// All UNIQUE constraints of a table.
pub fn unique_constraints(constraints: &[ConstraintDefinition]) -> Vec<&ConstraintDefinition> {
    constraints
        .iter()
        .filter(|c| c.constraint_type == ConstraintType::Unique)
        .collect()
}

/// Column combinations guaranteed to identify a single row.
///
/// Every UNIQUE constraint's columns in constraint order, followed by the
/// primary key's columns. Each combination is sorted and no combination
/// appears twice (a UNIQUE constraint duplicating the primary key is folded).
pub fn unique_key_combinations(constraints: &[ConstraintDefinition]) -> Vec<Vec<String>> {
    let mut combinations: Vec<Vec<String>> = Vec::new();

    let candidates = unique_constraints(constraints)
        .into_iter()
        .chain(primary_key(constraints));

    for constraint in candidates {
        let mut columns = constraint.column_names.clone();
        columns.sort();
        if !combinations.contains(&columns) {
            combinations.push(columns);
        }
    }

    combinations
}

/// Whether a forward edge is one-to-one.
///
/// True iff the edge's local join columns, taken as a set, exactly equal one
/// of the owner's unique key combinations. A unique superset or subset of the
/// join columns does not count.
///
/// `owner_constraints` are the constraints of the table holding the key.
/// Calling this with a backward edge is an error.
pub fn is_one_to_one_relation(
    relation: &RelationDefinition,
    owner_constraints: &[ConstraintDefinition],
) -> InferenceResult<bool> {
    if !relation.is_forward() {
        return Err(InferenceError::InvalidDirection {
            constraint_name: relation.constraint_name.clone(),
            to_table: relation.to_table.clone(),
        });
    }

    let join_columns: BTreeSet<&str> = relation.local_columns().collect();

    Ok(unique_key_combinations(owner_constraints).iter().any(|key| {
        let key: BTreeSet<&str> = key.iter().map(String::as_str).collect();
        key == join_columns
    }))
}
