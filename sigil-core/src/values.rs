//! Parsed marker instances and the per-node values container

use crate::{Position, Value};
use serde::{Deserialize, Serialize};

/// One fully parsed marker: definition name, source position, and bound
/// fields in binding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInstance {
    name: String,
    position: Position,
    fields: Vec<(String, Value)>,
}

impl MarkerInstance {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Bind a field. Duplicate detection belongs to the parser, which
    /// checks `get` before binding.
    pub fn bind(&mut self, field: impl Into<String>, value: Value) {
        self.fields.push((field.into(), value));
    }

    /// Look up a bound field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Bound fields in binding order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Ordered multimap of parsed markers for one declaration node.
///
/// Insertion order is preserved and repeated markers are allowed; a marker
/// that may appear many times on a node keeps every instance in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Values {
    instances: Vec<MarkerInstance>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: MarkerInstance) {
        self.instances.push(instance);
    }

    /// Total number of parsed instances.
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances of one marker.
    pub fn count_by_name(&self, name: &str) -> usize {
        self.instances.iter().filter(|m| m.name() == name).count()
    }

    /// Every instance of one marker, in declaration order.
    pub fn find_by_name(&self, name: &str) -> Vec<&MarkerInstance> {
        self.instances.iter().filter(|m| m.name() == name).collect()
    }

    /// The first instance of one marker.
    pub fn first(&self, name: &str) -> Option<&MarkerInstance> {
        self.instances.iter().find(|m| m.name() == name)
    }

    /// All instances in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerInstance> + '_ {
        self.instances.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl IntoIterator for Values {
    type Item = MarkerInstance;
    type IntoIter = std::vec::IntoIter<MarkerInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.into_iter()
    }
}
