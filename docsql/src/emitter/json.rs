use super::{escape_literal, ViewRequest};
use crate::compiler::{Accumulator, ObjectKind, PAYLOAD};
use crate::error::Result;
use crate::path::{render_prefixed, PathElement};
use crate::types::TypeResolver;
use regex::Regex;
use std::sync::OnceLock;

const EXPLODED: &str = "EXPLODED.VALUE";

fn no_prefix(_: &str) -> Option<String> {
    None
}

/// Render a key for a JSON path expression, quoting anything that is not a
/// plain identifier.
fn json_key(segment: &str) -> String {
    static PLAIN: OnceLock<Regex> = OnceLock::new();
    let plain = PLAIN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
    if plain.is_match(segment) {
        segment.to_string()
    } else {
        format!("\"{}\"", segment.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn sql_key(segment: &str) -> String {
    format!("'{}'", escape_literal(segment))
}

/// `$.a.b[*].c[*]`: one wildcard per root path of the group.
fn json_root(roots: &[Vec<PathElement>]) -> String {
    let mut root = String::from("$");
    for path in roots {
        for element in path {
            root.push('.');
            root.push_str(&json_key(&element.name));
        }
        root.push_str("[*]");
    }
    root
}

/// Descend into the exploded value one key per segment. Leaf values are
/// single-element arrays, so the first element is read as text.
fn extraction(path: &[PathElement]) -> String {
    format!(
        "{}->>0",
        render_prefixed(EXPLODED, "->", sql_key, path, no_prefix)
    )
}

pub(super) fn emit_view(
    request: &ViewRequest<'_>,
    acc: &mut Accumulator,
    types: &dyn TypeResolver,
) -> Result<()> {
    let root = json_root(request.roots);

    let columns = request
        .direct_columns
        .iter()
        .cloned()
        .chain(request.properties.iter().map(|(path, scalar)| {
            format!(
                "CAST({} AS {}) AS {}",
                extraction(path),
                types.resolve(*scalar),
                request.column(path)
            )
        }))
        .collect::<Vec<_>>()
        .join(", ");

    acc.statement(format!(
        "CREATE VIEW {} AS SELECT {} FROM {}_RAW, JSONB_PATH_QUERY({}, '{}') AS EXPLODED(VALUE)",
        request.name,
        columns,
        request.base,
        PAYLOAD,
        escape_literal(&root)
    ));
    acc.register(request.name, ObjectKind::View);

    let flattened: Vec<PathElement> = request.roots.iter().flatten().cloned().collect();
    let metadata = request
        .properties
        .iter()
        .map(|(path, _)| {
            let full: Vec<PathElement> = flattened.iter().chain(path.iter()).cloned().collect();
            (
                render_prefixed("$", ".", json_key, &full, no_prefix),
                request.column(path).to_string(),
            )
        })
        .collect();
    acc.record_metadata(request.name, metadata);

    Ok(())
}
