pub mod compiler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod namespace;
pub mod naming;
pub mod path;
pub mod schema;
pub mod table;
pub mod types;
pub mod vendor;

pub use compiler::{compile, ObjectKind, SchemaBundle, ViewGroup, ViewMetadata, MAX_COLUMNS_VIEW};
pub use config::CompilerConfig;
pub use emitter::Dialect;
pub use error::{DocSqlError, NameKind, Result};
pub use naming::{NameResolver, SimpleNameResolver};
pub use path::{parse_path, Path, PathElement};
pub use schema::{parse_definitions, parse_definitions_str, DefinitionFile, DocumentDefinition};
pub use table::{StaticColumns, TablePolicy};
pub use types::{PostgresTypeResolver, ScalarType, TypeResolver};
pub use vendor::ErrorCodes;
