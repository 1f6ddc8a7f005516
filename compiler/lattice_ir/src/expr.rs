//! Expression node kinds.
//!
//! Every expression is a compact `Copy` kind stored in the arena alongside
//! its [`Type`](lattice_types::Type), which is computed once by the factory
//! that built the node and never changes. Non-`Copy` payloads (variables,
//! index variables, literal bytes, callee handles) live in arena side pools
//! and are referenced by id or range.

use crate::ids::{ByteRange, ExprId, ExprRange, FuncId, IndexSetId, IndexVarRange, TensorIndexId, VarId};
use lattice_types::Name;

/// Which array of a tensor index a `TensorIndexRead` queries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TensorIndexReadKind {
    /// The coordinate array: start of each source's neighbor run.
    Coordinates,
    /// The sink array: the neighbors themselves.
    Sinks,
}

/// A closed catalog of expression kinds.
///
/// Traversal is exhaustive `match`; there is no downcasting. Factories on
/// [`IrArena`](crate::IrArena) are the only way to construct these, which
/// is where arity and type invariants are enforced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Dense constant tensor; raw element bytes live in the literal pool.
    Literal { data: ByteRange },

    /// Reference to a declared variable.
    Var(VarId),

    /// Scalar read from a 1-D buffer at an integer index.
    Load { buffer: ExprId, index: ExprId },

    /// Read of a named field from an element or a set.
    FieldRead { target: ExprId, field: Name },

    /// Invocation of a function with positional actuals; the callee
    /// declares exactly one result.
    Call { callee: FuncId, args: ExprRange },

    /// Cardinality of an index set.
    Length { set: IndexSetId },

    /// Structural query against an edge set's adjacency index.
    TensorIndexRead {
        index: TensorIndexId,
        loc: ExprId,
        read: TensorIndexReadKind,
    },

    Neg(ExprId),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),

    Not(ExprId),
    And(ExprId, ExprId),
    Or(ExprId, ExprId),
    Xor(ExprId, ExprId),

    Eq(ExprId, ExprId),
    Ne(ExprId, ExprId),
    Gt(ExprId, ExprId),
    Lt(ExprId, ExprId),
    Ge(ExprId, ExprId),
    Le(ExprId, ExprId),

    /// Indexed read from an edge's endpoint tuple.
    TupleRead { tuple: ExprId, index: ExprId },

    /// Read of a block from an n-dimensional tensor; carries one
    /// (pre-flattened) index or exactly `order` indices.
    TensorRead { tensor: ExprId, indices: ExprRange },

    /// A tensor annotated with the index variables it is read through;
    /// appears only inside `IndexExpr` values.
    IndexedTensor { tensor: ExprId, vars: IndexVarRange },

    /// Tensor-algebra expression: `vars` are the free result variables,
    /// and index variables that appear only in `value` are summed out.
    IndexExpr { vars: IndexVarRange, value: ExprId },
}

impl ExprKind {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::Literal { .. } => "Literal",
            ExprKind::Var(_) => "Var",
            ExprKind::Load { .. } => "Load",
            ExprKind::FieldRead { .. } => "FieldRead",
            ExprKind::Call { .. } => "Call",
            ExprKind::Length { .. } => "Length",
            ExprKind::TensorIndexRead { .. } => "TensorIndexRead",
            ExprKind::Neg(_) => "Neg",
            ExprKind::Add(..) => "Add",
            ExprKind::Sub(..) => "Sub",
            ExprKind::Mul(..) => "Mul",
            ExprKind::Div(..) => "Div",
            ExprKind::Not(_) => "Not",
            ExprKind::And(..) => "And",
            ExprKind::Or(..) => "Or",
            ExprKind::Xor(..) => "Xor",
            ExprKind::Eq(..) => "Eq",
            ExprKind::Ne(..) => "Ne",
            ExprKind::Gt(..) => "Gt",
            ExprKind::Lt(..) => "Lt",
            ExprKind::Ge(..) => "Ge",
            ExprKind::Le(..) => "Le",
            ExprKind::TupleRead { .. } => "TupleRead",
            ExprKind::TensorRead { .. } => "TensorRead",
            ExprKind::IndexedTensor { .. } => "IndexedTensor",
            ExprKind::IndexExpr { .. } => "IndexExpr",
        }
    }
}
