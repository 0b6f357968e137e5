//! The normalized, language-agnostic schema model.
//!
//! Everything in here is a plain value object produced fresh on every run and
//! serialized verbatim by the output writers. Maps keep insertion order so two
//! runs against an unchanged catalog produce byte-identical documents (apart
//! from `generatedAt`).

mod column_type;
mod types;

pub use column_type::{ColumnType, Comparable, NonComparable};
pub use types::*;
