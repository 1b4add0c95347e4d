//! Declarative document definitions.
//!
//! A YAML definition file describes any number of document types. Each one is
//! turned into a [`CompilerConfig`], a list of [`ViewGroup`]s and a
//! [`StaticColumns`] table policy, and compiled with the default name resolver.

mod parser;
mod types;

pub use parser::{parse_definitions, parse_definitions_str};
pub use types::{ColumnDefinition, DefinitionFile, DocumentDefinition, ViewDefinition};

use crate::compiler::{SchemaBundle, ViewGroup};
use crate::config::CompilerConfig;
use crate::emitter::Dialect;
use crate::error::{DocSqlError, Result};
use crate::namespace::FixedPrefixes;
use crate::naming::{SimpleNameResolver, DEFAULT_MAX_LENGTH};
use crate::path::parse_path;
use crate::table::StaticColumns;
use crate::types::PostgresTypeResolver;

/// Placeholder for the raw table name in hook statements.
pub const TABLE_PLACEHOLDER: &str = "{table}";

impl DocumentDefinition {
    pub fn config(&self) -> CompilerConfig {
        let config = match self.format {
            Dialect::Xml if self.prefixes.is_empty() => CompilerConfig::xml(),
            Dialect::Xml => CompilerConfig::xml_with(FixedPrefixes::new(self.prefixes.clone())),
            Dialect::Json => CompilerConfig::json(),
        };
        let mut config = config
            .with_type_resolver(PostgresTypeResolver::new(self.bounded_strings))
            .with_meta(self.meta)
            .with_synonym(self.synonym);
        if let Some(codes) = &self.error_codes {
            config = config.with_error_codes(codes.clone());
        }
        if !self.on_creation.is_empty() {
            let statements = self.on_creation.clone();
            config = config.with_on_creation(move |table| substitute(&statements, table));
        }
        if !self.on_drop.is_empty() {
            let statements = self.on_drop.clone();
            config = config.with_on_drop(move |table| substitute(&statements, table));
        }
        config
    }

    /// Parse the view definitions into compiler input.
    pub fn view_groups(&self) -> Result<Vec<ViewGroup>> {
        let mut groups = Vec::with_capacity(self.views.len());
        for (index, view) in self.views.iter().enumerate() {
            let roots = view
                .roots
                .iter()
                .map(|root| parse_path(root))
                .collect::<Result<Vec<_>>>()?;
            let mut group = ViewGroup::new(roots);
            for (path, scalar) in &view.properties {
                group = group.property(parse_path(path)?, *scalar);
            }
            if group.properties.is_empty() {
                log::warn!("view #{index} over {:?} has no properties", view.roots);
            }
            if self.format == Dialect::Json {
                let namespaced = group
                    .roots
                    .iter()
                    .chain(group.properties.iter().map(|(path, _)| path))
                    .flatten()
                    .any(|element| element.namespace.is_some());
                if namespaced {
                    return Err(DocSqlError::Schema(format!(
                        "view #{index}: JSON paths cannot carry namespaces"
                    )));
                }
            }
            groups.push(group);
        }
        Ok(groups)
    }

    pub fn table_policy(&self) -> StaticColumns {
        StaticColumns::new(
            self.columns
                .iter()
                .map(|column| (column.name.clone(), column.sql_type.clone()))
                .collect(),
        )
    }

    pub fn name_resolver(&self) -> SimpleNameResolver {
        SimpleNameResolver::new(self.max_name_length.unwrap_or(DEFAULT_MAX_LENGTH))
    }

    /// Compile this document type under `name`.
    pub fn compile(&self, name: &str) -> Result<SchemaBundle<StaticColumns>> {
        let views = self.view_groups()?;
        self.config()
            .compile(name, &views, &self.name_resolver(), self.table_policy())
    }
}

impl DefinitionFile {
    /// Compile every document type, in name order.
    pub fn compile_all(&self) -> Result<Vec<(String, SchemaBundle<StaticColumns>)>> {
        self.documents
            .iter()
            .map(|(name, definition)| Ok((name.clone(), definition.compile(name)?)))
            .collect()
    }

    /// Compile a single document type.
    pub fn compile_document(&self, name: &str) -> Result<SchemaBundle<StaticColumns>> {
        let definition = self
            .documents
            .get(name)
            .ok_or_else(|| DocSqlError::Schema(format!("Unknown document type '{name}'")))?;
        definition.compile(name)
    }
}

fn substitute(statements: &[String], table: &str) -> Vec<String> {
    statements
        .iter()
        .map(|statement| statement.replace(TABLE_PLACEHOLDER, table))
        .collect()
}
