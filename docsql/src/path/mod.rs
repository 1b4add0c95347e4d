//! Hierarchical document paths.
//!
//! A path is an ordered list of [`PathElement`]s. Both dialect emitters render
//! paths through the same two functions, [`render_joined`] and
//! [`render_prefixed`], and differ only in the separator, the per-segment
//! quoting and the namespace prefix lookup they pass in.
//!
//! The textual syntax accepted by [`parse_path`] is `/`-separated segments
//! with an optional namespace in Clark notation, e.g. `/return/{urn:tax}income`.

use crate::error::{DocSqlError, Result};
use std::fmt;

/// One named segment of a document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathElement {
    pub name: String,
    pub namespace: Option<String>,
}

/// A full document path.
pub type Path = Vec<PathElement>;

impl PathElement {
    pub fn new(name: impl Into<String>) -> Self {
        PathElement {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        PathElement {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Render this segment, qualifying it with `prefix:` when the lookup
    /// yields a non-empty prefix for its namespace.
    pub fn render<Q, P>(&self, quote: Q, prefixes: P) -> String
    where
        Q: Fn(&str) -> String,
        P: Fn(&str) -> Option<String>,
    {
        let name = quote(&self.name);
        match self.namespace.as_deref().and_then(|ns| prefixes(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
            _ => name,
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The bare segment names of a path, without namespaces.
pub fn dense(path: &[PathElement]) -> Vec<String> {
    path.iter().map(|element| element.name.clone()).collect()
}

/// Join rendered segments with `separator`.
pub fn render_joined<Q, P>(
    separator: &str,
    quote: Q,
    elements: &[PathElement],
    prefixes: P,
) -> String
where
    Q: Fn(&str) -> String,
    P: Fn(&str) -> Option<String>,
{
    elements
        .iter()
        .map(|element| element.render(&quote, &prefixes))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Emit `prefix`, then `separator` followed by the rendered segment for each element.
pub fn render_prefixed<Q, P>(
    prefix: &str,
    separator: &str,
    quote: Q,
    elements: &[PathElement],
    prefixes: P,
) -> String
where
    Q: Fn(&str) -> String,
    P: Fn(&str) -> Option<String>,
{
    let mut rendered = String::from(prefix);
    for element in elements {
        rendered.push_str(separator);
        rendered.push_str(&element.render(&quote, &prefixes));
    }
    rendered
}

/// Render a path back into the syntax accepted by [`parse_path`].
pub fn display(path: &[PathElement]) -> String {
    let mut rendered = String::new();
    for element in path {
        rendered.push('/');
        rendered.push_str(&element.to_string());
    }
    if rendered.is_empty() {
        rendered.push('/');
    }
    rendered
}

/// Parse a `/`-separated path. A leading `/` is optional and `""` or `"/"`
/// denote the empty path.
pub fn parse_path(text: &str) -> Result<Path> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let mut path = Vec::new();
    if body.is_empty() {
        return Ok(path);
    }

    let mut chars = body.chars().peekable();
    loop {
        let namespace = if chars.peek() == Some(&'{') {
            chars.next();
            let mut ns = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => ns.push(c),
                    None => {
                        return Err(DocSqlError::InvalidPath(format!(
                            "'{text}': unterminated namespace"
                        )))
                    }
                }
            }
            if ns.is_empty() {
                return Err(DocSqlError::InvalidPath(format!("'{text}': empty namespace")));
            }
            Some(ns)
        } else {
            None
        };

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c == '/' {
                break;
            }
            name.push(c);
            chars.next();
        }
        if name.is_empty() {
            return Err(DocSqlError::InvalidPath(format!("'{text}': empty segment")));
        }
        path.push(PathElement { name, namespace });

        match chars.next() {
            Some('/') => continue,
            _ => break,
        }
    }

    Ok(path)
}
