//! Model alias table: Ollama-visible name -> upstream model id.

use std::collections::{BTreeMap, HashMap};

/// Read-only alias table. Lookups are exact and case-sensitive.
///
/// Backed by a `BTreeMap` so that listings come out sorted without an extra
/// pass per `/api/tags` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelAliasTable {
    entries: BTreeMap<String, String>,
}

impl ModelAliasTable {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    /// Resolve an Ollama-visible name to the upstream model id.
    ///
    /// Priority: exact match > pass-through. Never fails; an unmapped name is
    /// used unchanged as the upstream id.
    pub fn resolve<'a>(&'a self, ollama_name: &'a str) -> &'a str {
        match self.entries.get(ollama_name) {
            Some(target) => {
                tracing::debug!("[Router] Exact mapping: {} -> {}", ollama_name, target);
                target
            },
            None => {
                tracing::debug!("[Router] Passthrough: {}", ollama_name);
                ollama_name
            },
        }
    }

    /// Ollama-visible names, sorted.
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(alias, upstream)` pairs, sorted by alias.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&HashMap<String, String>> for ModelAliasTable {
    fn from(mapping: &HashMap<String, String>) -> Self {
        Self::new(mapping.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}
