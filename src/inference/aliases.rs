//! Relation alias naming and collision handling.

use std::collections::HashSet;

use crate::schema::TableColumns;

/// Appended to an alias that would shadow a column of the owning table.
pub const COLUMN_CONFLICT_SUFFIX: &str = "_relation";

/// Strip a trailing `_id` from a foreign-key column name.
///
/// `author_id` becomes `author`; `co_author` and a bare `_id` are unchanged.
pub fn strip_id_suffix(column: &str) -> &str {
    match column.strip_suffix("_id") {
        Some(stem) if !stem.is_empty() => stem,
        _ => column,
    }
}

/// Hands out relation aliases for one table.
///
/// Guarantees that every claimed alias differs from every column name of the
/// table and from every alias claimed before it.
#[derive(Debug)]
pub struct AliasRegistry<'a> {
    columns: &'a TableColumns,
    claimed: HashSet<String>,
}

impl<'a> AliasRegistry<'a> {
    pub fn new(columns: &'a TableColumns) -> Self {
        Self {
            columns,
            claimed: HashSet::new(),
        }
    }

    /// Whether `alias` is neither a column nor an already claimed alias.
    pub fn is_free(&self, alias: &str) -> bool {
        !self.columns.contains_key(alias) && !self.claimed.contains(alias)
    }

    /// Claim `candidate`, adjusting it until it is free.
    ///
    /// A column clash appends [`COLUMN_CONFLICT_SUFFIX`]; any remaining clash
    /// appends `_2`, `_3`, ... .
    pub fn claim(&mut self, candidate: impl Into<String>) -> String {
        let mut alias = candidate.into();

        if self.columns.contains_key(&alias) {
            alias.push_str(COLUMN_CONFLICT_SUFFIX);
        }

        if !self.is_free(&alias) {
            let base = alias;
            let mut n = 2;
            alias = loop {
                let next = format!("{}_{}", base, n);
                if self.is_free(&next) {
                    break next;
                }
                n += 1;
            };
        }

        self.claimed.insert(alias.clone());
        alias
    }
}
