use super::{escape_literal, ViewRequest};
use crate::compiler::{Accumulator, ObjectKind, PAYLOAD};
use crate::error::{DocSqlError, Result};
use crate::namespace::NamespacePrefixResolver;
use crate::path::{render_joined, render_prefixed, PathElement};
use crate::types::TypeResolver;
use std::collections::{BTreeMap, BTreeSet};

/// `XMLTABLE` needs at least one column; a view without properties declares
/// this one and leaves it out of the select list.
const ORDINALITY_COLUMN: &str = "XML_ORDINAL";

fn identity(segment: &str) -> String {
    segment.to_string()
}

pub(super) fn emit_view(
    request: &ViewRequest<'_>,
    acc: &mut Accumulator,
    namespaces: &dyn NamespacePrefixResolver,
    types: &dyn TypeResolver,
) -> Result<()> {
    let uris: BTreeSet<String> = request
        .roots
        .iter()
        .flatten()
        .chain(request.properties.iter().flat_map(|(path, _)| path.iter()))
        .filter_map(|element| element.namespace.clone())
        .collect();
    let prefixes = if uris.is_empty() {
        BTreeMap::new()
    } else {
        namespaces.resolve(&uris)?
    };
    for uri in &uris {
        match prefixes.get(uri) {
            Some(prefix) if !prefix.is_empty() => {}
            _ => return Err(DocSqlError::DefaultNamespace(uri.clone())),
        }
    }
    let lookup = |ns: &str| prefixes.get(ns).cloned();

    let flattened: Vec<PathElement> = request.roots.iter().flatten().cloned().collect();
    let root = format!("/{}", render_joined("/", identity, &flattened, lookup));

    let select = request
        .direct_columns
        .iter()
        .map(String::as_str)
        .chain(request.properties.iter().map(|(path, _)| request.column(path)))
        .collect::<Vec<_>>()
        .join(", ");

    let xml_columns = if request.properties.is_empty() {
        format!("{ORDINALITY_COLUMN} FOR ORDINALITY")
    } else {
        request
            .properties
            .iter()
            .map(|(path, scalar)| {
                format!(
                    "{} {} PATH '{}'",
                    request.column(path),
                    types.resolve(*scalar),
                    escape_literal(&render_prefixed(".", "/", identity, path, lookup))
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let namespace_clause = if prefixes.is_empty() {
        String::new()
    } else {
        let mut declared: Vec<(&String, &String)> = prefixes.iter().collect();
        declared.sort_by(|a, b| a.1.cmp(b.1));
        let declarations = declared
            .into_iter()
            .map(|(uri, prefix)| format!("'{}' AS \"{}\"", escape_literal(uri), prefix))
            .collect::<Vec<_>>()
            .join(", ");
        format!("XMLNAMESPACES({declarations}), ")
    };

    acc.statement(format!(
        "CREATE VIEW {} AS SELECT {} FROM {}_RAW, XMLTABLE({}'{}' PASSING {} COLUMNS {})",
        request.name,
        select,
        request.base,
        namespace_clause,
        escape_literal(&root),
        PAYLOAD,
        xml_columns
    ));
    acc.register(request.name, ObjectKind::View);

    let metadata = request
        .properties
        .iter()
        .map(|(path, _)| {
            let full: Vec<PathElement> = flattened.iter().chain(path.iter()).cloned().collect();
            (
                render_prefixed("", "/", identity, &full, lookup),
                request.column(path).to_string(),
            )
        })
        .collect();
    acc.record_metadata(request.name, metadata);

    Ok(())
}
