//! Adjacency indices backing sparse tensor storage.

use crate::Name;

/// A named adjacency/coordinate structure for a sparse system tensor.
///
/// Describes a CSR-style index: a coordinate array mapping each source to
/// the start of its neighbor run, and a sink array listing the neighbors
/// themselves. The IR queries it through `TensorIndexRead`; indexed tensor
/// storage carries one. The arrays are materialized by the runtime; here
/// the index is identified by name only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorIndex {
    name: Name,
}

impl TensorIndex {
    pub fn new(name: Name) -> Self {
        TensorIndex { name }
    }

    pub fn name(&self) -> Name {
        self.name
    }
}
