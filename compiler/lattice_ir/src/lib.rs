//! Lattice IR - the tensor/graph intermediate representation.
//!
//! This crate holds the IR core of the Lattice compiler:
//! - Typed expression and statement nodes (`ExprKind`, `StmtKind`)
//! - The arena that owns them ([`IrArena`]) with id and range handles
//! - Factory methods that validate and type every node at construction
//! - Type computation for field reads, tensor reads, and index expressions
//! - The traversal contract ([`visitor`])
//! - [`Func`], [`Environment`], and the [`Intrinsics`] registry
//! - A pretty printer ([`pretty`]) for reading lowering output
//!
//! # Design Philosophy
//!
//! - **Closed catalogs**: `ExprKind` and `StmtKind` are plain enums and
//!   passes dispatch by exhaustive `match`, so adding a node form is a
//!   compile error until every traversal handles it
//! - **Flatten everything**: no `Box<Expr>`; nodes hold `ExprId(u32)`
//!   handles into the arena, and child lists are ranges into side pools
//! - **Construct well formed**: the factories are the only construction
//!   path, so a node that exists carries the type its operands imply
//!
//! Everything `lattice_types` exports is re-exported here, so consumers
//! depend on one crate.

mod arena;
mod build;
mod expr;
mod func;
mod ids;
mod intrinsics;
pub mod pretty;
mod stmt;
mod typing;
pub mod visitor;

pub use arena::IrArena;
pub use expr::{ExprKind, TensorIndexReadKind};
pub use func::{Environment, Func, FuncBuilder, FuncKind};
pub use ids::{
    ByteRange, ExprId, ExprRange, FuncId, IndexDomainId, IndexSetId, IndexVarRange, StmtId,
    TensorIndexId, VarId, VarRange,
};
pub use intrinsics::{IrContext, Intrinsics, INTRINSIC_NAMES};
pub use stmt::{CompoundOperator, ForDomain, ForDomainKind, StmtKind};
pub use typing::{block_type, field_type, index_expr_domain, index_expr_type};

pub use lattice_types::{
    ComponentType, ElementType, Field, IndexDomain, IndexSet, IndexVar, InternError, Name,
    ReductionOperator, SetType, SharedInterner, Storage, StringInterner, TensorIndex,
    TensorStorage, TensorType, TupleType, Type, Var,
};
