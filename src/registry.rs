//! Ordered registration keyed by a caller-supplied identity.
//!
//! Used for route groups and for pre/post middleware. Registering an item
//! under an identity that is already present replaces the stored item but
//! keeps its original position, so execution order is decided by first
//! registration.

use std::sync::Arc;

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: &'static str,
    entries: Vec<(Arc<str>, T)>,
}

impl<T> Registry<T> {
    /// `kind` labels log lines ("group", "pre-processor", ...).
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Insert or replace `item` under `id`.
    ///
    /// Returns `true` if an earlier registration was replaced.
    pub fn register(&mut self, id: &str, item: T) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.as_ref() == id) {
            slot.1 = item;
            warn!(
                kind = self.kind,
                id = %id,
                "Replaced existing registration, position kept"
            );
            return true;
        }

        self.entries.push((Arc::from(id), item));
        debug!(
            kind = self.kind,
            id = %id,
            total = self.entries.len(),
            "Registered"
        );
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == id)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
