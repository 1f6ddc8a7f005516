//! IR visitor pattern.
//!
//! Generic traversal over the arena-allocated IR, where nodes are
//! referenced by [`ExprId`]/[`StmtId`] indices.
//!
//! # Design
//!
//! A single [`Visitor`] trait is provided. The visitor can mutate its own
//! state during traversal, but the IR remains immutable; rewrites build
//! new nodes through the factories and reconstruct parents.
//!
//! Default implementations call `walk_*` functions that traverse
//! children. Override `visit_*` methods to add custom behavior at
//! specific nodes.
//!
//! # Example
//!
//! ```text
//! struct CountLiterals {
//!     count: usize,
//! }
//!
//! impl Visitor for CountLiterals {
//!     fn visit_expr(&mut self, id: ExprId, arena: &IrArena) {
//!         if let ExprKind::Literal { .. } = arena.expr_kind(id) {
//!             self.count += 1;
//!         }
//!         walk_expr(self, id, arena);
//!     }
//! }
//! ```

use crate::arena::IrArena;
use crate::expr::ExprKind;
use crate::func::Func;
use crate::ids::{ExprId, StmtId};
use crate::stmt::StmtKind;

/// IR visitor trait.
///
/// Override `visit_*` methods to add custom behavior at specific nodes.
/// Call `walk_*` functions to continue traversal into children.
pub trait Visitor {
    /// Visit an expression.
    fn visit_expr(&mut self, id: ExprId, arena: &IrArena) {
        walk_expr(self, id, arena);
    }

    /// Visit a statement.
    fn visit_stmt(&mut self, id: StmtId, arena: &IrArena) {
        walk_stmt(self, id, arena);
    }

    /// Visit a function.
    fn visit_func(&mut self, func: &Func, arena: &IrArena) {
        walk_func(self, func, arena);
    }
}

// Walk Functions
//
// All walk functions traverse children in depth-first, left-to-right
// evaluation order. For collections (argument lists, index lists),
// elements are visited in declaration order. Undefined optional children
// are skipped.

/// Walk an expression's children.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, id: ExprId, arena: &IrArena) {
    match arena.expr_kind(id) {
        // No children
        ExprKind::Literal { .. } | ExprKind::Var(_) | ExprKind::Length { .. } => {}

        // Single child
        ExprKind::Neg(operand) | ExprKind::Not(operand) => {
            visitor.visit_expr(operand, arena);
        }
        ExprKind::FieldRead { target, .. } => {
            visitor.visit_expr(target, arena);
        }
        ExprKind::TensorIndexRead { loc, .. } => {
            visitor.visit_expr(loc, arena);
        }
        ExprKind::IndexedTensor { tensor, .. } => {
            visitor.visit_expr(tensor, arena);
        }
        ExprKind::IndexExpr { value, .. } => {
            visitor.visit_expr(value, arena);
        }

        // Two children
        ExprKind::Add(left, right)
        | ExprKind::Sub(left, right)
        | ExprKind::Mul(left, right)
        | ExprKind::Div(left, right)
        | ExprKind::And(left, right)
        | ExprKind::Or(left, right)
        | ExprKind::Xor(left, right)
        | ExprKind::Eq(left, right)
        | ExprKind::Ne(left, right)
        | ExprKind::Gt(left, right)
        | ExprKind::Lt(left, right)
        | ExprKind::Ge(left, right)
        | ExprKind::Le(left, right) => {
            visitor.visit_expr(left, arena);
            visitor.visit_expr(right, arena);
        }
        ExprKind::Load { buffer, index } => {
            visitor.visit_expr(buffer, arena);
            visitor.visit_expr(index, arena);
        }
        ExprKind::TupleRead { tuple, index } => {
            visitor.visit_expr(tuple, arena);
            visitor.visit_expr(index, arena);
        }

        // Lists
        ExprKind::Call { args, .. } => {
            for &arg in arena.get_expr_list(args) {
                visitor.visit_expr(arg, arena);
            }
        }
        ExprKind::TensorRead { tensor, indices } => {
            visitor.visit_expr(tensor, arena);
            for &index in arena.get_expr_list(indices) {
                visitor.visit_expr(index, arena);
            }
        }
    }
}

/// Walk a statement's children.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, id: StmtId, arena: &IrArena) {
    match arena.stmt_kind(id) {
        StmtKind::VarDecl { .. } | StmtKind::Pass => {}

        StmtKind::Assign { value, .. } | StmtKind::Print { expr: value } => {
            visitor.visit_expr(value, arena);
        }
        StmtKind::Store { buffer, index, value, .. } => {
            visitor.visit_expr(buffer, arena);
            visitor.visit_expr(index, arena);
            visitor.visit_expr(value, arena);
        }
        StmtKind::FieldWrite { target, value, .. } => {
            visitor.visit_expr(target, arena);
            visitor.visit_expr(value, arena);
        }
        StmtKind::TensorWrite { tensor, indices, value, .. } => {
            visitor.visit_expr(tensor, arena);
            for &index in arena.get_expr_list(indices) {
                visitor.visit_expr(index, arena);
            }
            visitor.visit_expr(value, arena);
        }
        StmtKind::CallStmt { args, .. } => {
            for &arg in arena.get_expr_list(args) {
                visitor.visit_expr(arg, arena);
            }
        }
        StmtKind::Block { first, rest, .. } => {
            visitor.visit_stmt(first, arena);
            if rest.is_defined() {
                visitor.visit_stmt(rest, arena);
            }
        }
        StmtKind::IfThenElse { cond, then_body, else_body } => {
            visitor.visit_expr(cond, arena);
            visitor.visit_stmt(then_body, arena);
            if else_body.is_defined() {
                visitor.visit_stmt(else_body, arena);
            }
        }
        StmtKind::ForRange { start, end, body, .. } => {
            visitor.visit_expr(start, arena);
            visitor.visit_expr(end, arena);
            visitor.visit_stmt(body, arena);
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr(cond, arena);
            visitor.visit_stmt(body, arena);
        }
        StmtKind::Kernel { body, .. } => {
            visitor.visit_stmt(body, arena);
        }
        StmtKind::Comment { inner, .. } => {
            if inner.is_defined() {
                visitor.visit_stmt(inner, arena);
            }
        }
        StmtKind::Map { partial_actuals, target, neighbors, .. } => {
            for &actual in arena.get_expr_list(partial_actuals) {
                visitor.visit_expr(actual, arena);
            }
            visitor.visit_expr(target, arena);
            if neighbors.is_defined() {
                visitor.visit_expr(neighbors, arena);
            }
        }
    }
}

/// Walk a function's children: global initializers, then the body.
pub fn walk_func<V: Visitor + ?Sized>(visitor: &mut V, func: &Func, arena: &IrArena) {
    for (_, init) in func.environment().iter() {
        visitor.visit_expr(init, arena);
    }
    let body = func.body();
    if body.is_defined() {
        visitor.visit_stmt(body, arena);
    }
}
