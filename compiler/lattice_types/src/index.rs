//! Index sets, index domains, and index variables.
//!
//! Tensor dimensions are not bare numbers: each dimension is an
//! [`IndexDomain`], a product of [`IndexSet`]s. A domain with more than one
//! set is *blocked* (an outer set of inner fixed-size blocks), which is how
//! per-node and per-edge block tensors are typed. [`IndexVar`] names a
//! dimension that a tensor-algebra expression ranges over.

use crate::Name;

/// The concrete domain an index variable or tensor dimension ranges over.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexSet {
    /// Fixed integer range `[0, n)`.
    Range(u32),
    /// The elements of a named set, bound at runtime.
    Set(Name),
    /// Cardinality unknown until runtime.
    Dynamic,
}

impl IndexSet {
    /// Cardinality if it is statically known.
    pub fn fixed_size(&self) -> Option<u64> {
        match self {
            IndexSet::Range(n) => Some(u64::from(*n)),
            IndexSet::Set(_) | IndexSet::Dynamic => None,
        }
    }

    /// Statically known cardinality.
    ///
    /// # Panics
    /// Panics if the set is not a fixed range.
    pub fn size(&self) -> u64 {
        match self.fixed_size() {
            Some(n) => n,
            None => panic!("size of non-range index set {self:?} is not static"),
        }
    }

    /// True for [`IndexSet::Range`].
    pub fn is_fixed(&self) -> bool {
        matches!(self, IndexSet::Range(_))
    }
}

/// A non-empty product of index sets forming one tensor dimension.
///
/// A single-set domain is an ordinary dimension. A multi-set domain is a
/// blocked dimension: the first set ranges over blocks, the remaining sets
/// over positions inside each block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexDomain {
    index_sets: Vec<IndexSet>,
}

impl IndexDomain {
    /// Create a domain from its index sets.
    ///
    /// # Panics
    /// Panics on an empty set list.
    pub fn new(index_sets: Vec<IndexSet>) -> Self {
        assert!(!index_sets.is_empty(), "index domain must have at least one index set");
        IndexDomain { index_sets }
    }

    /// Create a domain over a single index set.
    pub fn single(set: IndexSet) -> Self {
        IndexDomain { index_sets: vec![set] }
    }

    /// The index sets, outermost first.
    pub fn index_sets(&self) -> &[IndexSet] {
        &self.index_sets
    }

    /// True if this dimension is blocked (more than one set).
    pub fn is_blocked(&self) -> bool {
        self.index_sets.len() > 1
    }

    /// The outermost index set.
    pub fn outer(&self) -> &IndexSet {
        // new() guarantees at least one set
        &self.index_sets[0]
    }

    /// The domain of one block: this domain with the outer set stripped.
    ///
    /// # Panics
    /// Panics if the dimension is not blocked.
    pub fn block_domain(&self) -> IndexDomain {
        assert!(
            self.is_blocked(),
            "block domain of unblocked dimension {self:?}"
        );
        IndexDomain::new(self.index_sets[1..].to_vec())
    }

    /// This domain with `outer` prepended, turning it into a blocked
    /// dimension over `outer`.
    pub fn prepended(&self, outer: IndexSet) -> IndexDomain {
        let mut index_sets = Vec::with_capacity(self.index_sets.len() + 1);
        index_sets.push(outer);
        index_sets.extend(self.index_sets.iter().cloned());
        IndexDomain { index_sets }
    }

    /// Total cardinality if every set is statically sized.
    pub fn fixed_size(&self) -> Option<u64> {
        let mut product = 1u64;
        for set in &self.index_sets {
            product = product.checked_mul(set.fixed_size()?)?;
        }
        Some(product)
    }

    /// Total cardinality.
    ///
    /// # Panics
    /// Panics unless every set is a fixed range.
    pub fn size(&self) -> u64 {
        match self.fixed_size() {
            Some(n) => n,
            None => panic!("size of index domain {self:?} is not static"),
        }
    }
}

/// Combine operator for reductions: identity (no combine) or sum.
///
/// Attached to reduction index variables and to `Map` statements.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ReductionOperator {
    /// No combining; results overwrite.
    #[default]
    None,
    /// Contributions are summed.
    Sum,
}

impl ReductionOperator {
    /// Printable operator token, if any.
    pub const fn token(self) -> Option<&'static str> {
        match self {
            ReductionOperator::None => None,
            ReductionOperator::Sum => Some("+"),
        }
    }
}

/// A named dimension a tensor-algebra expression ranges over.
///
/// Free variables appear in the result of an index expression; reduction
/// variables are summed out and carry the combine operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexVar {
    name: Name,
    domain: IndexDomain,
    reduction: ReductionOperator,
}

impl IndexVar {
    /// Create an index variable with an explicit reduction operator.
    pub fn new(name: Name, domain: IndexDomain, reduction: ReductionOperator) -> Self {
        IndexVar { name, domain, reduction }
    }

    /// Create a free index variable.
    pub fn free(name: Name, domain: IndexDomain) -> Self {
        Self::new(name, domain, ReductionOperator::None)
    }

    /// Create a sum-reduction index variable.
    pub fn sum(name: Name, domain: IndexDomain) -> Self {
        Self::new(name, domain, ReductionOperator::Sum)
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn domain(&self) -> &IndexDomain {
        &self.domain
    }

    pub fn reduction(&self) -> ReductionOperator {
        self.reduction
    }

    /// True if the variable appears in the result (no reduction).
    pub fn is_free(&self) -> bool {
        self.reduction == ReductionOperator::None
    }

    /// True if the variable is summed out.
    pub fn is_reduction(&self) -> bool {
        !self.is_free()
    }
}
