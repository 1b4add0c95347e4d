use serde::{Deserialize, Serialize};
use std::fmt;

/// Host scalar types a document property can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Short,
    Integer,
    Long,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    Time,
    Binary,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::String => "string",
            ScalarType::Short => "short",
            ScalarType::Integer => "integer",
            ScalarType::Long => "long",
            ScalarType::Decimal => "decimal",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::DateTime => "date_time",
            ScalarType::Time => "time",
            ScalarType::Binary => "binary",
        };
        write!(f, "{name}")
    }
}

/// Maps a host scalar type to a SQL type name.
pub trait TypeResolver {
    fn resolve(&self, scalar: ScalarType) -> String;
}

impl<F> TypeResolver for F
where
    F: Fn(ScalarType) -> String,
{
    fn resolve(&self, scalar: ScalarType) -> String {
        self(scalar)
    }
}

/// PostgreSQL type names.
#[derive(Debug, Clone, Copy)]
pub struct PostgresTypeResolver {
    /// Use `VARCHAR(4000)` for strings instead of `TEXT`.
    pub bounded_strings: bool,
}

impl PostgresTypeResolver {
    pub fn new(bounded_strings: bool) -> Self {
        PostgresTypeResolver { bounded_strings }
    }
}

impl Default for PostgresTypeResolver {
    fn default() -> Self {
        PostgresTypeResolver::new(true)
    }
}

impl TypeResolver for PostgresTypeResolver {
    fn resolve(&self, scalar: ScalarType) -> String {
        match scalar {
            ScalarType::String if self.bounded_strings => "VARCHAR(4000)",
            ScalarType::String => "TEXT",
            ScalarType::Short => "SMALLINT",
            ScalarType::Integer => "INTEGER",
            ScalarType::Long => "BIGINT",
            ScalarType::Decimal => "NUMERIC",
            ScalarType::Float => "REAL",
            ScalarType::Double => "DOUBLE PRECISION",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Date => "DATE",
            ScalarType::DateTime => "TIMESTAMP",
            ScalarType::Time => "TIME",
            ScalarType::Binary => "BYTEA",
        }
        .to_string()
    }
}
