//! Definition registry: catalogue, name resolution, and parse orchestration
//!
//! Definitions are collected through a mutable `RegistryBuilder` and frozen
//! into an immutable `Registry` before any parsing begins. The frozen value
//! is `Send + Sync`, so concurrent lookups need no locking; there is no
//! default global instance.

pub mod definition;
pub(crate) mod split;

pub use definition::{Definition, ValidateFn, IMPLICIT_FIELD};

use split::split_marker;
use std::collections::HashMap;
use sigil_core::RegistrationError;

/// Import-alias table: local marker-name prefix → absolute origin scope.
///
/// Built by the host collaborator from the file's import declarations and
/// passed to every lookup; the registry itself stores no aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    aliases: HashMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, scope: impl Into<String>) {
        self.aliases.insert(prefix.into(), scope.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.aliases.get(prefix).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl From<HashMap<String, String>> for AliasMap {
    fn from(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }
}

/// One resolved marker: the matched definition and its effective fields
/// region inside the marker text.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'r, 'a> {
    pub definition: &'r Definition,
    /// Effective fields text; when the canonical name matched, this starts
    /// at the dropped `:`-segment so it reads `key=…`.
    pub fields: &'a str,
    /// Character offset of `fields` inside the marker text.
    pub fields_offset: usize,
}

/// Mutable registration phase. One writer collects definitions, then
/// `build` freezes them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: HashMap<(String, String), Definition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its (scope, name) key.
    ///
    /// A duplicate key fails the registration and leaves the existing
    /// entry untouched.
    pub fn register(&mut self, definition: Definition) -> Result<(), RegistrationError> {
        let key = (
            definition.scope().to_string(),
            definition.name().to_string(),
        );
        if self.definitions.contains_key(&key) {
            return Err(RegistrationError::Duplicate {
                scope: key.0,
                name: key.1,
            });
        }
        tracing::debug!(
            scope = %definition.scope(),
            name = %definition.name(),
            targets = %definition.targets(),
            "registered marker definition"
        );
        self.definitions.insert(key, definition);
        Ok(())
    }

    /// Freeze the catalogue for parsing.
    pub fn build(self) -> Registry {
        Registry {
            definitions: self.definitions,
        }
    }
}

/// Immutable definition catalogue.
#[derive(Debug)]
pub struct Registry {
    definitions: HashMap<(String, String), Definition>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Direct catalogue access by scope and name.
    pub fn get(&self, scope: &str, name: &str) -> Option<&Definition> {
        self.definitions
            .get(&(scope.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.definitions.values()
    }

    /// Resolve a raw marker to a definition.
    ///
    /// The canonical name (anonymous form minus its final `:`-segment) is
    /// tried first, then the anonymous form; each is looked up in the root
    /// scope and, when prefixed, through the alias table.
    pub fn lookup<'r, 'a>(&'r self, raw: &'a str, aliases: &AliasMap) -> Option<Resolution<'r, 'a>> {
        let split = split_marker(raw);

        for (scope, name) in scope_candidates(&split.name, aliases) {
            if let Some(definition) = self.definitions.get(&(scope, name)) {
                return Some(Resolution {
                    definition,
                    fields: split.canonical_fields.text,
                    fields_offset: split.canonical_fields.offset,
                });
            }
        }

        for (scope, name) in scope_candidates(&split.anonymous, aliases) {
            if let Some(definition) = self.definitions.get(&(scope, name)) {
                return Some(Resolution {
                    definition,
                    fields: split.anonymous_fields.text,
                    fields_offset: split.anonymous_fields.offset,
                });
            }
        }

        tracing::trace!(marker = %split.anonymous, "marker not found in registry");
        None
    }
}

/// Candidate (scope, name) keys for one written name: the root scope as
/// written, plus the alias-resolved form when the first `:`-segment is a
/// known prefix.
fn scope_candidates(name: &str, aliases: &AliasMap) -> Vec<(String, String)> {
    let mut candidates = vec![(String::new(), name.to_string())];
    if let Some((prefix, rest)) = name.split_once(':') {
        if let Some(scope) = aliases.get(prefix) {
            candidates.push((scope.to_string(), rest.to_string()));
        }
    }
    candidates
}
