//! Dialect emitters.
//!
//! A [`Dialect`] knows how the payload column is stored, how a payload value is
//! bound in the insert statement, how many leading root segments to skip when
//! naming views, and how to emit one projection view. Markup paths are absolute
//! from a synthetic document root, so the markup dialect skips one more segment
//! than the JSON dialect, whose paths are relative.

mod json;
mod xml;

use crate::compiler::Accumulator;
use crate::error::Result;
use crate::namespace::NamespacePrefixResolver;
use crate::path::Path;
use crate::types::{ScalarType, TypeResolver};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The payload encoding of a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Xml,
    Json,
}

/// Input for emitting one projection view.
pub(crate) struct ViewRequest<'a> {
    /// Base identifier of the document type; the raw table is `{base}_RAW`.
    pub base: &'a str,
    /// Name of the view to create.
    pub name: &'a str,
    /// Root paths of the repeating subtree the view is built over.
    pub roots: &'a [Path],
    /// Raw columns selected as-is, in order.
    pub direct_columns: &'a [String],
    /// Properties mapped by this view, in column order.
    pub properties: &'a [(Path, ScalarType)],
    /// Resolved column name for every property of the view group.
    pub columns: &'a HashMap<Path, String>,
}

impl<'a> ViewRequest<'a> {
    fn column(&self, path: &Path) -> &'a str {
        self.columns
            .get(path)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Dialect {
    /// SQL type of the payload column.
    pub fn payload_type(&self) -> &'static str {
        match self {
            Dialect::Xml => "XML NOT NULL",
            Dialect::Json => "JSONB",
        }
    }

    /// Expression binding a payload value in the insert statement.
    pub fn payload_literal(&self) -> &'static str {
        match self {
            Dialect::Xml => "XMLPARSE(CONTENT ?)",
            Dialect::Json => "CAST(? AS JSONB)",
        }
    }

    /// Leading root segments skipped when naming a projection view.
    pub fn roots(&self) -> usize {
        match self {
            Dialect::Xml => 1,
            Dialect::Json => 0,
        }
    }

    /// Emit one projection view: append its DDL, register it and record its
    /// path to column metadata.
    pub(crate) fn emit_view(
        &self,
        request: &ViewRequest<'_>,
        acc: &mut Accumulator,
        namespaces: &dyn NamespacePrefixResolver,
        types: &dyn TypeResolver,
    ) -> Result<()> {
        match self {
            Dialect::Xml => xml::emit_view(request, acc, namespaces, types),
            Dialect::Json => json::emit_view(request, acc, types),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Xml => write!(f, "xml"),
            Dialect::Json => write!(f, "json"),
        }
    }
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_constants() {
        assert_eq!(Dialect::Xml.payload_type(), "XML NOT NULL");
        assert_eq!(Dialect::Json.payload_type(), "JSONB");
        assert_eq!(Dialect::Xml.payload_literal(), "XMLPARSE(CONTENT ?)");
        assert_eq!(Dialect::Json.payload_literal(), "CAST(? AS JSONB)");
        assert_eq!(Dialect::Xml.roots(), Dialect::Json.roots() + 1);
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("it's"), "it''s");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_dialect_from_yaml() {
        let dialect: Dialect = serde_yaml::from_str("json").unwrap();
        assert_eq!(dialect, Dialect::Json);
        assert_eq!(Dialect::Xml.to_string(), "xml");
    }
}
