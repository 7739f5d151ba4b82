//! Rendered entity cache and pending work-list
//!
//! The cache guarantees every entity is rendered once per run: renderers
//! check it before descending into a declaration, which is also what makes
//! reference cycles terminate. The work-list holds cross-file references
//! discovered while rendering; each type name is queued at most once.

use std::collections::{HashMap, VecDeque};

use crate::model::{PendingReference, PendingState, SchemaEntity};

/// A rendered entity block
#[derive(Debug, Clone)]
pub struct CachedEntity {
    pub entity: SchemaEntity,
    pub text: String,
}

/// Rendered blocks by entity name, in first-render order
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    entries: HashMap<String, usize>,
    rendered: Vec<CachedEntity>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Rendered text for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(|&idx| self.rendered[idx].text.as_str())
    }

    /// Store a rendered entity. The first entry for a name is kept; a
    /// later insert returns `false` and changes nothing.
    pub fn insert(&mut self, entity: SchemaEntity, text: String) -> bool {
        if self.entries.contains_key(&entity.name) {
            return false;
        }
        self.entries.insert(entity.name.clone(), self.rendered.len());
        self.rendered.push(CachedEntity { entity, text });
        true
    }

    /// Entries in first-render order
    pub fn iter(&self) -> impl Iterator<Item = &CachedEntity> {
        self.rendered.iter()
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

/// Cross-file references awaiting resolution, keyed by type name
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    entries: HashMap<String, PendingReference>,
    queue: VecDeque<String>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reference unless its type name was queued before
    pub fn add(&mut self, reference: PendingReference) -> bool {
        if self.entries.contains_key(&reference.type_name) {
            return false;
        }
        self.queue.push_back(reference.type_name.clone());
        self.entries.insert(reference.type_name.clone(), reference);
        true
    }

    /// Next reference that has not been drained yet
    pub fn next_undrained(&mut self) -> Option<PendingReference> {
        while let Some(name) = self.queue.pop_front() {
            match self.entries.get(&name) {
                Some(entry) if entry.state != PendingState::Drained => return Some(entry.clone()),
                _ => continue,
            }
        }
        None
    }

    pub fn mark(&mut self, type_name: &str, state: PendingState) {
        if let Some(entry) = self.entries.get_mut(type_name) {
            entry.state = state;
        }
    }

    pub fn state(&self, type_name: &str) -> Option<PendingState> {
        self.entries.get(type_name).map(|entry| entry.state)
    }

    pub fn has_undrained(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.state != PendingState::Drained)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
