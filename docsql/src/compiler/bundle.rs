use super::{ObjectKind, ViewMetadata};
use crate::table::TablePolicy;
use serde::Serialize;
use serde_json::Value;

/// Placeholder for the grantee in grant statement templates.
pub const GRANTEE: &str = "{grantee}";

/// A database object created by a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredObject {
    pub name: String,
    pub kind: ObjectKind,
}

/// The statements that provision, populate and tear down one document type.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaBundle<P> {
    pub(crate) base: String,
    pub(crate) creation: Vec<String>,
    pub(crate) drops: Vec<String>,
    pub(crate) grants: Vec<String>,
    pub(crate) insert: String,
    pub(crate) truncate: String,
    pub(crate) objects: Vec<RegisteredObject>,
    pub(crate) metadata: Vec<ViewMetadata>,
    #[serde(skip)]
    pub(crate) table: P,
}

impl<P> SchemaBundle<P> {
    /// Base identifier of the document type.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Name of the raw table.
    pub fn raw_table(&self) -> String {
        format!("{}_RAW", self.base)
    }

    /// Creation statements, in execution order.
    pub fn creation(&self) -> &[String] {
        &self.creation
    }

    /// Drop statements: one per object, then synonyms, then custom hooks.
    pub fn drops(&self) -> &[String] {
        &self.drops
    }

    /// Grant statement templates, each containing [`GRANTEE`] once.
    pub fn grant_templates(&self) -> &[String] {
        &self.grants
    }

    /// Grant statements for one grantee.
    pub fn grants(&self, grantee: &str) -> Vec<String> {
        self.grants
            .iter()
            .map(|template| template.replace(GRANTEE, grantee))
            .collect()
    }

    /// Parameterized insert into the raw table.
    pub fn insert(&self) -> &str {
        &self.insert
    }

    pub fn truncate(&self) -> &str {
        &self.truncate
    }

    /// Registered objects in creation order.
    pub fn objects(&self) -> &[RegisteredObject] {
        &self.objects
    }

    /// Path to column mapping of every projection view.
    pub fn metadata(&self) -> &[ViewMetadata] {
        &self.metadata
    }

    pub fn table(&self) -> &P {
        &self.table
    }
}

impl<P: TablePolicy> SchemaBundle<P> {
    /// Insert parameters for one stored revision, in the column order of
    /// [`SchemaBundle::insert`].
    pub fn row(
        &self,
        id: &str,
        revision: i64,
        deleted: bool,
        payload: Option<&str>,
        document: &P::Document,
    ) -> Vec<Value> {
        let mut values = vec![
            Value::from(id),
            Value::from(revision),
            Value::from(deleted),
            payload.map(Value::from).unwrap_or(Value::Null),
        ];
        values.extend(self.table.additional_values(document));
        values
    }
}
