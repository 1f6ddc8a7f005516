//! The Lattice type system values.
//!
//! Every value in a Lattice program is a tensor (order 0 is a scalar), an
//! element of a set, a set, or a tuple of elements. Types are structural
//! values: equality compares content, and the IR copies them freely.

use crate::{IndexDomain, Name};
use std::fmt;

/// Scalar component of a tensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentType {
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
}

impl ComponentType {
    /// Width of one component in bytes.
    pub const fn size_in_bytes(self) -> usize {
        match self {
            ComponentType::Bool => 1,
            ComponentType::Int => 4,
            ComponentType::Float => 8,
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, ComponentType::Int | ComponentType::Float)
    }

    /// The wider of two numeric component types.
    ///
    /// # Panics
    /// Panics if either side is not numeric.
    pub fn promoted(a: ComponentType, b: ComponentType) -> ComponentType {
        assert!(
            a.is_numeric() && b.is_numeric(),
            "cannot promote non-numeric components {a} and {b}"
        );
        if a == ComponentType::Float || b == ComponentType::Float {
            ComponentType::Float
        } else {
            ComponentType::Int
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::Bool => "bool",
            ComponentType::Int => "int",
            ComponentType::Float => "float",
        };
        f.write_str(name)
    }
}

/// A tensor type: a scalar component plus ordered dimensions.
///
/// Order 0 is a scalar. A dimension whose domain holds more than one index
/// set makes the tensor *blocked*: its entries are themselves fixed-size
/// tensors (see [`IndexDomain::is_blocked`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorType {
    component: ComponentType,
    dimensions: Vec<IndexDomain>,
}

impl TensorType {
    /// A scalar of the given component type.
    pub fn scalar(component: ComponentType) -> Self {
        TensorType { component, dimensions: Vec::new() }
    }

    /// A tensor with the given dimensions.
    pub fn new(component: ComponentType, dimensions: Vec<IndexDomain>) -> Self {
        TensorType { component, dimensions }
    }

    pub fn component(&self) -> ComponentType {
        self.component
    }

    pub fn dimensions(&self) -> &[IndexDomain] {
        &self.dimensions
    }

    /// Number of dimensions.
    pub fn order(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// True if any dimension is blocked.
    pub fn is_blocked(&self) -> bool {
        self.dimensions.iter().any(IndexDomain::is_blocked)
    }

    /// The type of one block.
    ///
    /// For a blocked tensor, strips the outer index set from every blocked
    /// dimension; dimensions that are not blocked contribute nothing to the
    /// block. For an unblocked tensor this is the scalar component type.
    pub fn block_type(&self) -> Type {
        if !self.is_blocked() {
            return Type::scalar(self.component);
        }
        let dimensions: Vec<IndexDomain> = self
            .dimensions
            .iter()
            .filter(|dim| dim.is_blocked())
            .map(IndexDomain::block_domain)
            .collect();
        Type::Tensor(TensorType::new(self.component, dimensions))
    }

    /// Number of scalar components, when every dimension is statically
    /// sized (fixed ranges throughout).
    pub fn element_count(&self) -> Option<u64> {
        let mut count = 1u64;
        for dim in &self.dimensions {
            count = count.checked_mul(dim.fixed_size()?)?;
        }
        Some(count)
    }

    /// Dense byte size, when statically sized.
    pub fn size_in_bytes(&self) -> Option<usize> {
        let count = usize::try_from(self.element_count()?).ok()?;
        count.checked_mul(self.component.size_in_bytes())
    }
}

/// A named field of an element: its name and per-element tensor type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Name,
    pub ty: TensorType,
}

impl Field {
    pub fn new(name: Name, ty: TensorType) -> Self {
        Field { name, ty }
    }
}

/// The type of set elements: a name and ordered fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementType {
    name: Name,
    fields: Vec<Field>,
}

impl ElementType {
    pub fn new(name: Name, fields: Vec<Field>) -> Self {
        ElementType { name, fields }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: Name) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The type of a set of elements.
///
/// `endpoints` is the number of endpoints each edge connects; 0 means a
/// plain node set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SetType {
    element: ElementType,
    endpoints: u32,
}

impl SetType {
    pub fn new(element: ElementType, endpoints: u32) -> Self {
        SetType { element, endpoints }
    }

    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn endpoints(&self) -> u32 {
        self.endpoints
    }

    pub fn is_edge_set(&self) -> bool {
        self.endpoints > 0
    }
}

/// The type of an edge's endpoint tuple: a fixed number of elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleType {
    element: ElementType,
    size: u32,
}

impl TupleType {
    pub fn new(element: ElementType, size: u32) -> Self {
        TupleType { element, size }
    }

    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

/// A Lattice type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Tensor(TensorType),
    Element(ElementType),
    Set(SetType),
    Tuple(TupleType),
}

impl Type {
    /// A scalar tensor type.
    pub fn scalar(component: ComponentType) -> Type {
        Type::Tensor(TensorType::scalar(component))
    }

    /// A tensor type with the given dimensions.
    pub fn tensor(component: ComponentType, dimensions: Vec<IndexDomain>) -> Type {
        Type::Tensor(TensorType::new(component, dimensions))
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Tensor(_) => "tensor",
            Type::Element(_) => "element",
            Type::Set(_) => "set",
            Type::Tuple(_) => "tuple",
        }
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self, Type::Tensor(_))
    }

    /// True for an order-0 tensor.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Tensor(t) if t.is_scalar())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Type::Element(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Type::Set(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            Type::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementType> {
        match self {
            Type::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetType> {
        match self {
            Type::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleType> {
        match self {
            Type::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Boundary accessor: the tensor type, or an invariant failure.
    pub fn expect_tensor(&self) -> &TensorType {
        match self {
            Type::Tensor(t) => t,
            other => panic!("expected tensor type, found {}", other.kind_name()),
        }
    }

    /// Boundary accessor: the element type, or an invariant failure.
    pub fn expect_element(&self) -> &ElementType {
        match self {
            Type::Element(e) => e,
            other => panic!("expected element type, found {}", other.kind_name()),
        }
    }

    /// Boundary accessor: the set type, or an invariant failure.
    pub fn expect_set(&self) -> &SetType {
        match self {
            Type::Set(s) => s,
            other => panic!("expected set type, found {}", other.kind_name()),
        }
    }

    /// Boundary accessor: the tuple type, or an invariant failure.
    pub fn expect_tuple(&self) -> &TupleType {
        match self {
            Type::Tuple(t) => t,
            other => panic!("expected tuple type, found {}", other.kind_name()),
        }
    }
}
