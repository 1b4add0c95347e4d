//! The schema compiler.
//!
//! [`compile`] turns a document type name plus its projection view groups into
//! a [`SchemaBundle`]: a revisioned raw table, the `_MIN`/`_MAX`/`_NOW`
//! temporal views, one or more projection views per view group, an optional
//! `_MTA` metadata view and optional public synonyms, together with the
//! statements that undo all of it.
//!
//! All intermediate state lives in an [`Accumulator`] owned by one call, so
//! compilations of different document types can run concurrently.

mod bundle;

pub use bundle::{RegisteredObject, SchemaBundle, GRANTEE};

use crate::config::CompilerConfig;
use crate::emitter::ViewRequest;
use crate::error::{DocSqlError, NameKind, Result};
use crate::naming::NameResolver;
use crate::path::{dense, Path};
use crate::table::TablePolicy;
use crate::types::ScalarType;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const ID: &str = "ID";
pub const REVISION: &str = "REVISION";
pub const DELETED: &str = "DELETED";
pub const PAYLOAD: &str = "PAYLOAD";

/// Maximum number of path-derived columns in one projection view.
pub const MAX_COLUMNS_VIEW: usize = 200;

/// Kind of a registered database object, as used in `DROP <kind> <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    Table,
    View,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "TABLE"),
            ObjectKind::View => write!(f, "VIEW"),
        }
    }
}

/// One root-path group and the properties projected over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewGroup {
    pub roots: Vec<Path>,
    pub properties: Vec<(Path, ScalarType)>,
}

impl ViewGroup {
    pub fn new(roots: Vec<Path>) -> Self {
        ViewGroup {
            roots,
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, path: Path, scalar: ScalarType) -> Self {
        self.properties.push((path, scalar));
        self
    }
}

/// Path to column mapping of one projection view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewMetadata {
    pub view: String,
    /// `(rendered path, column)` pairs in property order.
    pub columns: Vec<(String, String)>,
}

/// Mutable state threaded through one compilation.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    pub(crate) ddl: Vec<String>,
    objects: Vec<RegisteredObject>,
    names: HashSet<String>,
    metadata: Vec<ViewMetadata>,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Accumulator::default()
    }

    pub(crate) fn statement(&mut self, sql: String) {
        self.ddl.push(sql);
    }

    pub(crate) fn register(&mut self, name: &str, kind: ObjectKind) {
        log::debug!("registered {kind} {name}");
        self.names.insert(name.to_string());
        self.objects.push(RegisteredObject {
            name: name.to_string(),
            kind,
        });
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub(crate) fn record_metadata(&mut self, view: &str, columns: Vec<(String, String)>) {
        self.metadata.push(ViewMetadata {
            view: view.to_string(),
            columns,
        });
    }

    pub(crate) fn metadata(&self) -> &[ViewMetadata] {
        &self.metadata
    }

    fn object_names(&self) -> Vec<String> {
        self.objects.iter().map(|object| object.name.clone()).collect()
    }
}

fn collision(kind: NameKind, name: String, scope: &str) -> DocSqlError {
    DocSqlError::NameCollision {
        kind,
        name,
        scope: scope.to_string(),
    }
}

/// Compile one document type.
///
/// Fails without producing a bundle when a view, column or index name resolves
/// to an identifier that is already taken, or when the active dialect cannot
/// express a namespace.
pub fn compile<N, P>(
    config: &CompilerConfig,
    name: &str,
    views: &[ViewGroup],
    names: &N,
    table: P,
) -> Result<SchemaBundle<P>>
where
    N: NameResolver + ?Sized,
    P: TablePolicy,
{
    let dialect = config.dialect;
    let base = names.resolve(&[name.to_string()], &|_| false);
    let raw = format!("{base}_RAW");
    let additional = table.additional_columns();
    let mut acc = Accumulator::new();

    let additional_ddl: String = additional
        .iter()
        .map(|(column, sql_type)| format!("{column} {sql_type}, "))
        .collect();
    acc.statement(format!(
        "CREATE TABLE {raw} (\
         {ID} VARCHAR(250) NOT NULL, \
         {REVISION} BIGINT NOT NULL, \
         {DELETED} BOOLEAN NOT NULL, \
         {PAYLOAD} {}, \
         {additional_ddl}\
         CONSTRAINT {base}_PK PRIMARY KEY ({ID}, {REVISION}))",
        dialect.payload_type()
    ));
    acc.register(&raw, ObjectKind::Table);

    let mut indices: HashSet<String> = HashSet::from([format!("{base}_IDX")]);
    for (column, _) in &additional {
        let index = names.resolve(&[base.clone(), column.clone()], &|c| indices.contains(c));
        if !indices.insert(index.clone()) {
            return Err(collision(NameKind::Index, index, &raw));
        }
        acc.statement(format!("CREATE INDEX {index}_IDX ON {raw} ({column})"));
    }

    for suffix in ["MIN", "MAX"] {
        let view = format!("{base}_{suffix}");
        acc.statement(format!(
            "CREATE VIEW {view} AS \
             SELECT {ID}, {suffix}({REVISION}) {REVISION} FROM {raw} GROUP BY {ID}"
        ));
        acc.register(&view, ObjectKind::View);
    }

    let now = format!("{base}_NOW");
    acc.statement(format!(
        "CREATE VIEW {now} AS \
         SELECT {ID}, MAX({REVISION}) {REVISION} FROM {raw} GROUP BY {ID} \
         INTERSECT \
         SELECT {ID}, {REVISION} FROM {raw} WHERE {DELETED} = false"
    ));
    acc.register(&now, ObjectKind::View);

    let direct_columns: Vec<String> = [ID, REVISION, DELETED, PAYLOAD]
        .iter()
        .map(|column| column.to_string())
        .chain(additional.iter().map(|(column, _)| column.clone()))
        .collect();

    for group in views {
        let mut segments = vec![base.clone()];
        segments.extend(
            group
                .roots
                .iter()
                .flat_map(|path| dense(path))
                .skip(dialect.roots()),
        );
        let view = names.resolve(&segments, &|c| acc.contains(c));
        if acc.contains(&view) {
            return Err(collision(NameKind::View, view, &base));
        }

        let mut reserved: HashSet<String> = direct_columns.iter().cloned().collect();
        let mut columns: HashMap<Path, String> = HashMap::with_capacity(group.properties.len());
        for (path, _) in &group.properties {
            if columns.contains_key(path) {
                return Err(DocSqlError::Schema(format!(
                    "Property {} is mapped twice in view {view}",
                    crate::path::display(path)
                )));
            }
            let column = names.resolve(&dense(path), &|c| reserved.contains(c));
            if !reserved.insert(column.clone()) {
                return Err(collision(NameKind::Column, column, &view));
            }
            columns.insert(path.clone(), column);
        }

        if group.properties.len() > MAX_COLUMNS_VIEW {
            let mut sorted = group.properties.clone();
            sorted.sort_by(|a, b| columns[&a.0].cmp(&columns[&b.0]));
            let mut partition = 0usize;
            for chunk in sorted.chunks(MAX_COLUMNS_VIEW) {
                let alias = loop {
                    let candidate = format!("{view}_{partition}");
                    partition += 1;
                    if !acc.contains(&candidate) {
                        break candidate;
                    }
                };
                log::debug!("partition {alias} of {view} holds {} columns", chunk.len());
                let request = ViewRequest {
                    base: &base,
                    name: &alias,
                    roots: &group.roots,
                    direct_columns: &direct_columns,
                    properties: chunk,
                    columns: &columns,
                };
                dialect.emit_view(
                    &request,
                    &mut acc,
                    config.namespaces.as_ref(),
                    config.types.as_ref(),
                )?;
            }
        } else {
            let request = ViewRequest {
                base: &base,
                name: &view,
                roots: &group.roots,
                direct_columns: &direct_columns,
                properties: &group.properties,
                columns: &columns,
            };
            dialect.emit_view(
                &request,
                &mut acc,
                config.namespaces.as_ref(),
                config.types.as_ref(),
            )?;
        }
    }

    if config.meta {
        let mta = format!("{base}_MTA");
        if acc.contains(&mta) {
            return Err(collision(NameKind::View, mta, &base));
        }
        let ddl = metadata_view(&mta, acc.metadata());
        acc.statement(ddl);
        acc.register(&mta, ObjectKind::View);
    }

    if config.synonym {
        for object in acc.object_names() {
            acc.statement(format!("CREATE PUBLIC SYNONYM {object} FOR {object}"));
        }
    }

    for hook in &config.on_creation {
        acc.ddl.extend(hook(raw.as_str()));
    }

    let mut drops: Vec<String> = acc
        .objects
        .iter()
        .map(|object| format!("DROP {} {}", object.kind, object.name))
        .collect();
    if config.synonym {
        drops.extend(
            acc.objects
                .iter()
                .map(|object| format!("DROP PUBLIC SYNONYM {}", object.name)),
        );
    }
    for hook in &config.on_drop {
        drops.extend(hook(raw.as_str()));
    }

    let grants = acc
        .objects
        .iter()
        .map(|object| format!("GRANT SELECT ON {} TO {GRANTEE}", object.name))
        .collect();

    let insert_columns = direct_columns.join(", ");
    let placeholders = ["?", "?", "?", dialect.payload_literal()]
        .into_iter()
        .chain(additional.iter().map(|_| "?"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert = format!("INSERT INTO {raw} ({insert_columns}) VALUES ({placeholders})");
    let truncate = format!("TRUNCATE TABLE {raw}");

    log::info!(
        "compiled {dialect} document {name} as {base}: \
         {} objects, {} creation and {} drop statements",
        acc.objects.len(),
        acc.ddl.len(),
        drops.len()
    );

    Ok(SchemaBundle {
        base,
        creation: acc.ddl,
        drops,
        grants,
        insert,
        truncate,
        objects: acc.objects,
        metadata: acc.metadata,
        table,
    })
}

/// A union of one literal row per `(path, object, column)` triple, seeded with
/// a row that never matches so the view is valid without projection views.
fn metadata_view(name: &str, metadata: &[ViewMetadata]) -> String {
    let mut selects =
        vec!["SELECT NULL AS PATH, NULL AS OBJECT, NULL AS NAME WHERE 0 = 1".to_string()];
    for view in metadata {
        for (path, column) in &view.columns {
            selects.push(format!(
                "SELECT '{}' AS PATH, '{}' AS OBJECT, '{}' AS NAME",
                crate::emitter::escape_literal(path),
                crate::emitter::escape_literal(&view.view),
                crate::emitter::escape_literal(column)
            ));
        }
    }
    format!("CREATE VIEW {name} AS {}", selects.join(" UNION ALL "))
}
