//! Immutable compiler configuration.
//!
//! Every `with_*` operation returns a new configuration and leaves the
//! receiver untouched. Hook operations append to the hooks already
//! registered, and hooks run in registration order.

use crate::compiler::{self, SchemaBundle, ViewGroup};
use crate::emitter::Dialect;
use crate::error::Result;
use crate::namespace::{NamespacePrefixResolver, RejectNamespaces, SyntheticPrefixes};
use crate::naming::NameResolver;
use crate::table::TablePolicy;
use crate::types::{PostgresTypeResolver, TypeResolver};
use crate::vendor::ErrorCodes;
use std::fmt;
use std::sync::Arc;

/// Produces extra statements from the raw table name.
pub type Hook = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

#[derive(Clone)]
pub struct CompilerConfig {
    pub(crate) dialect: Dialect,
    pub(crate) types: Arc<dyn TypeResolver + Send + Sync>,
    pub(crate) namespaces: Arc<dyn NamespacePrefixResolver + Send + Sync>,
    pub(crate) meta: bool,
    pub(crate) synonym: bool,
    pub(crate) on_creation: Vec<Hook>,
    pub(crate) on_drop: Vec<Hook>,
    pub(crate) error_codes: ErrorCodes,
}

impl CompilerConfig {
    /// Markup documents with synthetic, sorted namespace prefixes.
    pub fn xml() -> Self {
        Self::xml_with(SyntheticPrefixes::new(true, false))
    }

    /// Markup documents with a custom namespace prefix policy.
    pub fn xml_with<R>(namespaces: R) -> Self
    where
        R: NamespacePrefixResolver + Send + Sync + 'static,
    {
        Self::of(Dialect::Xml, Arc::new(namespaces))
    }

    /// JSON documents. Namespace resolution is an error for this preset.
    pub fn json() -> Self {
        Self::of(Dialect::Json, Arc::new(RejectNamespaces))
    }

    fn of(dialect: Dialect, namespaces: Arc<dyn NamespacePrefixResolver + Send + Sync>) -> Self {
        CompilerConfig {
            dialect,
            types: Arc::new(PostgresTypeResolver::new(true)),
            namespaces,
            meta: true,
            synonym: false,
            on_creation: Vec::new(),
            on_drop: Vec::new(),
            error_codes: ErrorCodes::LEGACY,
        }
    }

    pub fn with_type_resolver<T>(&self, types: T) -> Self
    where
        T: TypeResolver + Send + Sync + 'static,
    {
        CompilerConfig {
            types: Arc::new(types),
            ..self.clone()
        }
    }

    pub fn with_meta(&self, meta: bool) -> Self {
        CompilerConfig {
            meta,
            ..self.clone()
        }
    }

    pub fn with_synonym(&self, synonym: bool) -> Self {
        CompilerConfig {
            synonym,
            ..self.clone()
        }
    }

    /// Replace the vendor error code table used by [`CompilerConfig::is_expected_error`].
    pub fn with_error_codes(&self, error_codes: ErrorCodes) -> Self {
        CompilerConfig {
            error_codes,
            ..self.clone()
        }
    }

    /// Append a hook whose statements run after all objects are created.
    pub fn with_on_creation<F>(&self, hook: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        let mut config = self.clone();
        config.on_creation.push(Arc::new(hook));
        config
    }

    /// Append a hook whose statements run after all objects and synonyms are dropped.
    pub fn with_on_drop<F>(&self, hook: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        let mut config = self.clone();
        config.on_drop.push(Arc::new(hook));
        config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn meta(&self) -> bool {
        self.meta
    }

    pub fn synonym(&self) -> bool {
        self.synonym
    }

    pub fn error_codes(&self) -> &ErrorCodes {
        &self.error_codes
    }

    /// Compile one document type with this configuration.
    pub fn compile<N, P>(
        &self,
        name: &str,
        views: &[ViewGroup],
        names: &N,
        table: P,
    ) -> Result<SchemaBundle<P>>
    where
        N: NameResolver + ?Sized,
        P: TablePolicy,
    {
        compiler::compile(self, name, views, names, table)
    }

    /// Whether a vendor error code means the object already exists
    /// (`expecting_existence`) or does not exist, and can be ignored.
    pub fn is_expected_error(&self, expecting_existence: bool, code: i32) -> bool {
        self.error_codes.is_expected(expecting_existence, code)
    }
}

impl fmt::Debug for CompilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerConfig")
            .field("dialect", &self.dialect)
            .field("meta", &self.meta)
            .field("synonym", &self.synonym)
            .field("on_creation", &self.on_creation.len())
            .field("on_drop", &self.on_drop.len())
            .field("error_codes", &self.error_codes)
            .finish()
    }
}
