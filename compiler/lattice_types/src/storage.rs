//! Per-variable storage descriptors.
//!
//! The storage-selection pass decides how each tensor variable is laid out;
//! this module only defines the descriptor values it produces and the
//! backend consumes.

use crate::{TensorIndex, Var};

/// How one tensor variable is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TensorStorage {
    /// Contiguous row-major buffer.
    Dense,
    /// Sparse storage addressed through an adjacency index.
    Indexed(TensorIndex),
    /// Only the diagonal is materialized.
    Diagonal,
}

impl TensorStorage {
    pub fn dense() -> Self {
        TensorStorage::Dense
    }

    pub fn indexed(index: TensorIndex) -> Self {
        TensorStorage::Indexed(index)
    }

    pub fn diagonal() -> Self {
        TensorStorage::Diagonal
    }

    /// The adjacency index, for indexed storage.
    pub fn tensor_index(&self) -> Option<&TensorIndex> {
        match self {
            TensorStorage::Indexed(index) => Some(index),
            TensorStorage::Dense | TensorStorage::Diagonal => None,
        }
    }
}

/// Storage descriptors for the variables of one function.
///
/// Insertion-ordered so iteration is deterministic; adding a descriptor for
/// a variable that already has one replaces it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    entries: Vec<(Var, TensorStorage)>,
}

impl Storage {
    pub fn new() -> Self {
        Storage::default()
    }

    /// Set the storage descriptor for `var`.
    pub fn add(&mut self, var: Var, storage: TensorStorage) {
        if let Some(entry) = self.entries.iter_mut().find(|(v, _)| *v == var) {
            entry.1 = storage;
        } else {
            self.entries.push((var, storage));
        }
    }

    /// The descriptor for `var`, if one has been set.
    pub fn get(&self, var: &Var) -> Option<&TensorStorage> {
        self.entries.iter().find(|(v, _)| v == var).map(|(_, s)| s)
    }

    pub fn has(&self, var: &Var) -> bool {
        self.get(var).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Var, &TensorStorage)> {
        self.entries.iter().map(|(v, s)| (v, s))
    }
}
