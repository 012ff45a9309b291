//! Contract storage scope

use std::collections::HashMap;

use crate::word::{self, Word};

/// Key/value slots for one invocation scope.
///
/// Slots that were never written read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    slots: HashMap<Word, Word>,
}

impl Storage {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a slot
    pub fn put(&mut self, key: Word, value: Word) {
        self.slots.insert(key, value);
    }

    /// Read a slot, zero if absent
    pub fn get(&self, key: &Word) -> Word {
        self.slots.get(key).copied().unwrap_or(word::ZERO)
    }

    /// Number of written slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing was written
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over written slots in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.slots.iter()
    }
}
