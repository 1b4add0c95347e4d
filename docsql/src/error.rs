use std::fmt;
use thiserror::Error;

/// The kind of identifier that failed to resolve to a unique name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    View,
    Column,
    Index,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::View => write!(f, "View"),
            NameKind::Column => write!(f, "Column"),
            NameKind::Index => write!(f, "Index"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DocSqlError {
    #[error("{kind} name already in use: {name} (in {scope})")]
    NameCollision {
        kind: NameKind,
        name: String,
        scope: String,
    },

    #[error("PostgreSQL does not support a default namespace for {0}")]
    DefaultNamespace(String),

    #[error("Unexpected resolution of namespaces {0:?} during JSON processing")]
    UnexpectedNamespace(Vec<String>),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocSqlError {
    /// Whether this error reports two generated identifiers that could not be told apart.
    pub fn is_collision(&self) -> bool {
        matches!(self, DocSqlError::NameCollision { .. })
    }
}

pub type Result<T> = std::result::Result<T, DocSqlError>;
