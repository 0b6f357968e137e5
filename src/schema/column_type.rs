//! Inferred (target-language) types for catalog columns.
//!
//! A column is either comparable (usable in range filters and ordering),
//! non-comparable (structured or opaque values) or typed by an enum defined on
//! the owning table. The serialized form is a bare string, e.g. `"number"`,
//! `"Array<string>"` or `"users_permissions"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Types that support ordering and range comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparable {
    String,
    Number,
    BigInt,
    Boolean,
    /// Dates and timestamps.
    Timestamp,
}

impl Comparable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparable::String => "string",
            Comparable::Number => "number",
            Comparable::BigInt => "bigint",
            Comparable::Boolean => "boolean",
            Comparable::Timestamp => "Date",
        }
    }
}

/// Structured, binary or unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonComparable {
    Object,
    Array,
    ArrayString,
    ArrayBoolean,
    ArrayNumber,
    ArrayObject,
    ArrayTimestamp,
    Binary,
    /// Catch-all for native types with no known mapping.
    Any,
}

impl NonComparable {
    pub fn as_str(&self) -> &'static str {
        match self {
            NonComparable::Object => "Object",
            NonComparable::Array => "Array",
            NonComparable::ArrayString => "Array<string>",
            NonComparable::ArrayBoolean => "Array<boolean>",
            NonComparable::ArrayNumber => "Array<number>",
            NonComparable::ArrayObject => "Array<Object>",
            NonComparable::ArrayTimestamp => "Array<Date>",
            NonComparable::Binary => "Buffer",
            NonComparable::Any => "any",
        }
    }
}

const COMPARABLES: [Comparable; 5] = [
    Comparable::String,
    Comparable::Number,
    Comparable::BigInt,
    Comparable::Boolean,
    Comparable::Timestamp,
];

const NON_COMPARABLES: [NonComparable; 9] = [
    NonComparable::Object,
    NonComparable::Array,
    NonComparable::ArrayString,
    NonComparable::ArrayBoolean,
    NonComparable::ArrayNumber,
    NonComparable::ArrayObject,
    NonComparable::ArrayTimestamp,
    NonComparable::Binary,
    NonComparable::Any,
];

/// The inferred type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Comparable(Comparable),
    NonComparable(NonComparable),
    /// Name of an enum defined on the owning table.
    Enum(String),
}

impl ColumnType {
    pub const STRING: ColumnType = ColumnType::Comparable(Comparable::String);
    pub const NUMBER: ColumnType = ColumnType::Comparable(Comparable::Number);
    pub const BOOLEAN: ColumnType = ColumnType::Comparable(Comparable::Boolean);
    pub const TIMESTAMP: ColumnType = ColumnType::Comparable(Comparable::Timestamp);
    pub const ANY: ColumnType = ColumnType::NonComparable(NonComparable::Any);

    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Comparable(c) => c.as_str(),
            ColumnType::NonComparable(n) => n.as_str(),
            ColumnType::Enum(name) => name,
        }
    }

    /// Whether a column of this type can act as a soft-delete marker.
    pub fn is_soft_delete_marker(&self) -> bool {
        matches!(
            self,
            ColumnType::Comparable(Comparable::Boolean) | ColumnType::Comparable(Comparable::Timestamp)
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ColumnType {
    /// Parses the serialized form. Anything that is not a builtin name is an enum name.
    pub fn from_name(s: &str) -> Self {
        if let Some(c) = COMPARABLES.iter().find(|c| c.as_str() == s) {
            return ColumnType::Comparable(*c);
        }
        if let Some(n) = NON_COMPARABLES.iter().find(|n| n.as_str() == s) {
            return ColumnType::NonComparable(*n);
        }
        ColumnType::Enum(s.to_string())
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ColumnType::from_name(&s))
    }
}
