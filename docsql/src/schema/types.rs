use crate::emitter::Dialect;
use crate::types::ScalarType;
use crate::vendor::ErrorCodes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level definition file, usually `documents.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentDefinition>,
}

/// Declarative description of one document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDefinition {
    pub format: Dialect,
    #[serde(default = "default_true")]
    pub meta: bool,
    #[serde(default)]
    pub synonym: bool,
    #[serde(default = "default_true")]
    pub bounded_strings: bool,
    /// Identifier length budget for the default name resolver.
    #[serde(default)]
    pub max_name_length: Option<usize>,
    /// Fixed namespace prefixes (markup only).
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    /// Additional raw table columns, in column order.
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    /// Statements run after creation; `{table}` is replaced by the raw table name.
    #[serde(default)]
    pub on_creation: Vec<String>,
    /// Statements run after dropping; `{table}` is replaced by the raw table name.
    #[serde(default)]
    pub on_drop: Vec<String>,
    #[serde(default)]
    pub views: Vec<ViewDefinition>,
    /// Vendor error code table; the legacy table when absent.
    #[serde(default)]
    pub error_codes: Option<ErrorCodes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
}

/// One projection view group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDefinition {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, ScalarType>,
}

fn default_true() -> bool {
    true
}
