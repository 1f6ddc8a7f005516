//! Lattice type system and support values.
//!
//! This crate contains the vocabulary every Lattice compiler phase shares:
//! - Names for interned identifiers
//! - The type system values (tensors, elements, sets, tuples)
//! - Variables (name + type pairs)
//! - Index sets, index domains, and index variables for tensor algebra
//! - Storage descriptors and adjacency indices for system tensors
//!
//! # Design Philosophy
//!
//! - **Intern strings**: identifiers are `Name(u32)`, compared in O(1)
//! - **Types are values**: structural equality, copied freely, no pool
//! - **Dimensions are index sets**: a tensor dimension is an [`IndexDomain`]
//!   (a product of [`IndexSet`]s), not a bare number, so blocked per-node
//!   and per-edge tensors type precisely

mod index;
mod interner;
mod name;
mod storage;
mod tensor_index;
mod types;
mod var;

pub use index::{IndexDomain, IndexSet, IndexVar, ReductionOperator};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use storage::{Storage, TensorStorage};
pub use tensor_index::TensorIndex;
pub use types::{ComponentType, ElementType, Field, SetType, TensorType, TupleType, Type};
pub use var::Var;
