//! Unordered multiset

use crate::error::WorkshopError;

/// Unordered collection supporting insert, take-one and cardinality
///
/// `take_one` removes an unspecified member; callers must not rely on any
/// ordering between insertions and removals.
#[derive(Debug, Clone, Default)]
pub struct Multiset<T> {
    items: Vec<T>,
}

impl<T> Multiset<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a multiset with room for `slots` members
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            items: Vec::with_capacity(slots),
        }
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove and return some member
    pub fn take_one(&mut self) -> Result<T, WorkshopError> {
        if self.items.is_empty() {
            return Err(WorkshopError::EmptyPool);
        }
        // order is unspecified
        Ok(self.items.swap_remove(0))
    }

    pub fn cardinality(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every member
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
