//! Resolved template variables.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered mapping from variable name to resolved value.
///
/// Bindings are built by merging layers of increasing priority. Merging never mutates
/// either side; it returns a new set where the right-hand layer wins on conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableBindings(IndexMap<String, String>);

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a copy of `self` with `name` bound to `value`.
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.0.clone();
        next.insert(name.into(), value.into());
        Self(next)
    }

    /// Layers `higher` on top of `self`. Values from `higher` win; key order follows
    /// first appearance.
    pub fn merge(&self, higher: &VariableBindings) -> Self {
        let mut next = self.0.clone();
        for (name, value) in &higher.0 {
            next.insert(name.clone(), value.clone());
        }
        Self(next)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<IndexMap<String, String>> for VariableBindings {
    fn from(map: IndexMap<String, String>) -> Self {
        Self(map)
    }
}
