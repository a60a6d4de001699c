//! Engine log categories

use std::collections::BTreeMap;

/// Name used for categories the engine never registered
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Lookup from engine-defined category ids to display names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    names: BTreeMap<i32, String>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under the id after the highest one in use and return
    /// that id. Once `i32::MAX` is taken, the lowest free non-negative id is
    /// used instead; `None` if there is none.
    pub fn register(&mut self, name: impl Into<String>) -> Option<i32> {
        let id = match self.names.keys().next_back() {
            None => 0,
            Some(&last) => match last.checked_add(1) {
                Some(next) => next,
                None => (0..=i32::MAX).find(|id| !self.names.contains_key(id))?,
            },
        };
        self.names.insert(id, name.into());
        Some(id)
    }

    /// Register `name` under a fixed id, replacing any previous name
    pub fn insert(&mut self, id: i32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn name(&self, id: i32) -> &str {
        self.names.get(&id).map_or(UNKNOWN_CATEGORY, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
