//! Table Schema Builder.
//!
//! Turns the bulk metadata of a whole schema into the resolved definition of a
//! single table: cardinalities, relation aliases, many-to-many relations
//! through junction tables, and the soft-delete marker column.
//!
//! # Example
//!
//! ```ignore
//! let maps = SchemaMaps { columns, constraints, forward_relations, ..Default::default() };
//! let built = TableSchemaBuilder::new("users", &maps).build_table_definition(&BuilderOptions::default())?;
//! assert!(built.definition.relation("author_posts").is_some());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schema::{
    Cardinality, ColumnDefinition, ConstraintDefinition, JoinPath, Relation, RelationDefinition,
    TableColumns, TableEnums, TableMap, TableSchemaDefinition, TransitiveRelationDefinition,
};

use super::aliases::{strip_id_suffix, AliasRegistry};
use super::cardinality::{is_one_to_one_relation, primary_key, unique_key_combinations};
use super::diagnostics::Diagnostic;
use super::error::InferenceResult;
use super::inflection::{pluralize, singularize};

/// Column names recognised as soft-delete markers.
pub const SOFT_DELETE_COLUMN_NAMES: &[&str] =
    &["deleted", "deleted_at", "deletedAt", "soft_deleted", "softDeleted"];

/// Behavioural switches of the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderOptions {
    /// Emit `manyToMany` relations through junction tables.
    pub include_transitive_relations: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            include_transitive_relations: true,
        }
    }
}

impl BuilderOptions {
    pub fn without_transitive_relations() -> Self {
        Self {
            include_transitive_relations: false,
        }
    }
}

/// Metadata of every introspected table, as returned by the bulk fetches.
#[derive(Debug, Clone, Default)]
pub struct SchemaMaps {
    pub enums: TableMap<TableEnums>,
    pub columns: TableMap<TableColumns>,
    pub constraints: TableMap<Vec<ConstraintDefinition>>,
    pub forward_relations: TableMap<Vec<RelationDefinition>>,
    pub backward_relations: TableMap<Vec<RelationDefinition>>,
}

impl SchemaMaps {
    /// Whether `table` belongs to the introspected set.
    pub fn contains_table(&self, table: &str) -> bool {
        self.columns.contains_key(table)
    }

    pub fn constraints_of(&self, table: &str) -> &[ConstraintDefinition] {
        self.constraints.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn forward_relations_of(&self, table: &str) -> &[RelationDefinition] {
        self.forward_relations
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn backward_relations_of(&self, table: &str) -> &[RelationDefinition] {
        self.backward_relations
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A built table together with the integrity problems found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTable {
    pub definition: TableSchemaDefinition,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the definition of one table from the schema-wide [`SchemaMaps`].
#[derive(Debug, Clone, Copy)]
pub struct TableSchemaBuilder<'a> {
    table_name: &'a str,
    maps: &'a SchemaMaps,
}

impl<'a> TableSchemaBuilder<'a> {
    pub fn new(table_name: &'a str, maps: &'a SchemaMaps) -> Self {
        Self { table_name, maps }
    }

    pub fn table_name(&self) -> &str {
        self.table_name
    }

    pub fn build_table_definition(&self, options: &BuilderOptions) -> InferenceResult<BuiltTable> {
        let mut diagnostics = Vec::new();

        let constraints = self.maps.constraints_of(self.table_name);
        let columns = self
            .maps
            .columns
            .get(self.table_name)
            .cloned()
            .unwrap_or_default();
        let enums = self
            .maps
            .enums
            .get(self.table_name)
            .cloned()
            .unwrap_or_default();

        let forward = self.known_relations(
            self.maps.forward_relations_of(self.table_name),
            &mut diagnostics,
        );
        let backward = self.known_relations(
            self.maps.backward_relations_of(self.table_name),
            &mut diagnostics,
        );

        let forward = self.resolve_forward(forward, constraints)?;
        let backward = self.resolve_backward(backward, &mut diagnostics)?;

        let mut aliases = AliasRegistry::new(&columns);
        let mut relations = Vec::with_capacity(forward.len() + backward.len());

        for mut rel in forward {
            rel.alias = aliases.claim(forward_alias(&rel));
            relations.push(Relation::Direct(rel));
        }

        let mut backward_targets: HashMap<&str, usize> = HashMap::new();
        for rel in &backward {
            *backward_targets.entry(rel.to_table.as_str()).or_default() += 1;
        }
        let aliased_backward: Vec<RelationDefinition> = backward
            .iter()
            .map(|rel| {
                let shared = backward_targets.get(rel.to_table.as_str()).copied().unwrap_or(0) > 1;
                let mut rel = rel.clone();
                rel.alias = aliases.claim(backward_alias(&rel, shared));
                rel
            })
            .collect();
        relations.extend(aliased_backward.into_iter().map(Relation::Direct));

        if options.include_transitive_relations {
            let transitive =
                self.transitive_relations(&backward, &columns, &mut aliases, &mut diagnostics);
            relations.extend(transitive.into_iter().map(Relation::Transitive));
        }

        let soft_delete_column = soft_delete_column(&columns);

        Ok(BuiltTable {
            definition: TableSchemaDefinition {
                primary_key: primary_key(constraints).cloned(),
                keys: constraints.to_vec(),
                unique_key_combinations: unique_key_combinations(constraints),
                columns,
                soft_delete_column,
                enums,
                relations,
            },
            diagnostics,
        })
    }

    /// Drops relations whose other side was not introspected.
    fn known_relations(
        &self,
        relations: &[RelationDefinition],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<RelationDefinition> {
        relations
            .iter()
            .filter(|rel| {
                if self.maps.contains_table(&rel.to_table) {
                    return true;
                }
                record(
                    diagnostics,
                    Diagnostic::DanglingForeignKey {
                        table: self.table_name.to_string(),
                        constraint_name: rel.constraint_name.clone(),
                        related_table: rel.to_table.clone(),
                    },
                );
                false
            })
            .cloned()
            .collect()
    }

    fn resolve_forward(
        &self,
        relations: Vec<RelationDefinition>,
        own_constraints: &[ConstraintDefinition],
    ) -> InferenceResult<Vec<RelationDefinition>> {
        relations
            .into_iter()
            .map(|mut rel| {
                rel.cardinality = if is_one_to_one_relation(&rel, own_constraints)? {
                    Cardinality::HasOne
                } else {
                    Cardinality::BelongsTo
                };
                Ok(rel)
            })
            .collect()
    }

    /// A backward edge is 1:1 iff its mirror forward edge on the referencing
    /// table is 1:1 against that table's constraints.
    fn resolve_backward(
        &self,
        relations: Vec<RelationDefinition>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> InferenceResult<Vec<RelationDefinition>> {
        let mut resolved = Vec::with_capacity(relations.len());

        for mut rel in relations {
            let mirror = self
                .maps
                .forward_relations_of(&rel.to_table)
                .iter()
                .find(|f| f.constraint_name == rel.constraint_name && f.to_table == self.table_name);

            rel.cardinality = match mirror {
                Some(forward) => {
                    let owner_constraints = self.maps.constraints_of(&rel.to_table);
                    if is_one_to_one_relation(forward, owner_constraints)? {
                        Cardinality::HasOne
                    } else {
                        Cardinality::HasMany
                    }
                }
                None => {
                    record(
                        diagnostics,
                        Diagnostic::MissingMirrorRelation {
                            table: self.table_name.to_string(),
                            constraint_name: rel.constraint_name.clone(),
                            related_table: rel.to_table.clone(),
                        },
                    );
                    Cardinality::HasMany
                }
            };
            resolved.push(rel);
        }

        Ok(resolved)
    }

    /// Two-hop relations `self -> join table -> target`.
    fn transitive_relations(
        &self,
        backward: &[RelationDefinition],
        columns: &TableColumns,
        aliases: &mut AliasRegistry<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<TransitiveRelationDefinition> {
        let mut transitive = Vec::new();

        for back in backward {
            let join_table = back.to_table.as_str();
            let join_pk = primary_key(self.maps.constraints_of(join_table));

            for hop in self.maps.forward_relations_of(join_table) {
                if hop.constraint_name == back.constraint_name {
                    continue;
                }
                if !self.maps.contains_table(&hop.to_table) {
                    record(
                        diagnostics,
                        Diagnostic::DanglingForeignKey {
                            table: self.table_name.to_string(),
                            constraint_name: hop.constraint_name.clone(),
                            related_table: hop.to_table.clone(),
                        },
                    );
                    continue;
                }

                let hop_in_join_pk = match (hop.joins.as_slice(), join_pk) {
                    ([join], Some(pk)) => pk.column_names.contains(&join.from_column),
                    _ => false,
                };
                let short = pluralize(&hop.to_table);
                let candidate = if hop_in_join_pk
                    && !columns.contains_key(&hop.to_table)
                    && aliases.is_free(&short)
                {
                    short
                } else {
                    pluralize(&format!("{}_{}", join_table, hop.to_table))
                };

                transitive.push(TransitiveRelationDefinition {
                    to_table: hop.to_table.clone(),
                    join_table: join_table.to_string(),
                    alias: aliases.claim(candidate),
                    join_from: JoinPath {
                        joins: back.joins.clone(),
                        to_table: join_table.to_string(),
                        constraint_name: back.constraint_name.clone(),
                    },
                    join_to: JoinPath {
                        joins: hop.joins.clone(),
                        to_table: hop.to_table.clone(),
                        constraint_name: hop.constraint_name.clone(),
                    },
                    cardinality: Cardinality::ManyToMany,
                });
            }
        }

        transitive
    }
}

fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}

fn forward_alias(rel: &RelationDefinition) -> String {
    match rel.joins.as_slice() {
        [join] => strip_id_suffix(&join.from_column).to_string(),
        _ => singularize(&rel.to_table),
    }
}

fn backward_alias(rel: &RelationDefinition, shared_target: bool) -> String {
    let base = match rel.joins.first() {
        Some(join) if shared_target => {
            format!("{}_{}", strip_id_suffix(&join.to_column), rel.to_table)
        }
        _ => rel.to_table.clone(),
    };
    match rel.cardinality {
        Cardinality::HasOne => singularize(&base),
        _ => pluralize(&base),
    }
}

/// The last column with a soft-delete name and a boolean or Date type.
pub fn soft_delete_column(columns: &TableColumns) -> Option<ColumnDefinition> {
    columns
        .values()
        .filter(|c| {
            SOFT_DELETE_COLUMN_NAMES.contains(&c.column_name.as_str())
                && c.inferred_type.is_soft_delete_marker()
        })
        .last()
        .cloned()
}
