//! Namespace prefix policies for markup paths.

use crate::error::{DocSqlError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Assigns a prefix to every namespace URI that appears in a view. An empty
/// prefix denotes the default namespace.
pub trait NamespacePrefixResolver {
    fn resolve(&self, namespaces: &BTreeSet<String>) -> Result<BTreeMap<String, String>>;
}

impl<F> NamespacePrefixResolver for F
where
    F: Fn(&BTreeSet<String>) -> Result<BTreeMap<String, String>>,
{
    fn resolve(&self, namespaces: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        self(namespaces)
    }
}

/// Generates `ns1`, `ns2`, ... prefixes.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticPrefixes {
    /// Number namespaces in URI order. The input set is already ordered, so
    /// this only matters for callers feeding `assign` directly.
    pub sorted: bool,
    /// Map a lone namespace to the default (empty) prefix.
    pub default_namespace: bool,
}

impl SyntheticPrefixes {
    pub fn new(sorted: bool, default_namespace: bool) -> Self {
        SyntheticPrefixes {
            sorted,
            default_namespace,
        }
    }

    /// Assign prefixes to namespaces given in encounter order.
    pub fn assign<'a, I>(&self, namespaces: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut ordered: Vec<&String> = Vec::new();
        for namespace in namespaces {
            if !ordered.contains(&namespace) {
                ordered.push(namespace);
            }
        }
        if self.sorted {
            ordered.sort();
        }
        if self.default_namespace && ordered.len() == 1 {
            return ordered
                .into_iter()
                .map(|ns| (ns.clone(), String::new()))
                .collect();
        }
        ordered
            .into_iter()
            .enumerate()
            .map(|(index, ns)| (ns.clone(), format!("ns{}", index + 1)))
            .collect()
    }
}

impl NamespacePrefixResolver for SyntheticPrefixes {
    fn resolve(&self, namespaces: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        Ok(self.assign(namespaces))
    }
}

/// Explicit prefixes, with synthetic ones for namespaces not listed.
#[derive(Debug, Clone, Default)]
pub struct FixedPrefixes {
    pub prefixes: BTreeMap<String, String>,
}

impl FixedPrefixes {
    pub fn new(prefixes: BTreeMap<String, String>) -> Self {
        FixedPrefixes { prefixes }
    }
}

impl NamespacePrefixResolver for FixedPrefixes {
    fn resolve(&self, namespaces: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        let taken: BTreeSet<&String> = self.prefixes.values().collect();
        let mut resolved = BTreeMap::new();
        let mut counter = 0;
        for namespace in namespaces {
            if let Some(prefix) = self.prefixes.get(namespace) {
                resolved.insert(namespace.clone(), prefix.clone());
                continue;
            }
            let prefix = loop {
                counter += 1;
                let candidate = format!("ns{counter}");
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            resolved.insert(namespace.clone(), prefix);
        }
        Ok(resolved)
    }
}

/// Fails whenever asked to resolve any namespace; JSON paths carry none.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectNamespaces;

impl NamespacePrefixResolver for RejectNamespaces {
    fn resolve(&self, namespaces: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        if namespaces.is_empty() {
            Ok(BTreeMap::new())
        } else {
            Err(DocSqlError::UnexpectedNamespace(
                namespaces.iter().cloned().collect(),
            ))
        }
    }
}
