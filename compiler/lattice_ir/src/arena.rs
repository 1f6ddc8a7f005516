//! The IR arena: owner of every node and pooled value of one
//! compilation unit.
//!
//! [`IrArena`] uses struct-of-arrays layout (parallel `expr_kinds` /
//! `expr_types` arrays indexed by [`ExprId`]). Nodes are immutable once
//! allocated; an expression's type is computed by its factory and never
//! changes. Dropping the arena frees the whole unit at once.
//!
//! # Index Spaces
//!
//! - `expr_kinds`/`expr_types`: parallel arrays indexed by [`ExprId`]
//! - `stmt_kinds`: indexed by [`StmtId`]
//! - `expr_lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
//! - `vars`: indexed by [`VarId`] (singles) and [`VarRange`] (runs)
//! - `index_vars`: indexed by [`IndexVarRange`]
//! - `index_sets`/`index_domains`/`tensor_indices`/`funcs`: side pools
//!   indexed by their id types
//! - `literal_data`: raw element bytes indexed by [`ByteRange`]

use lattice_types::{IndexDomain, IndexSet, IndexVar, TensorIndex, Type, Var};

use crate::expr::ExprKind;
use crate::func::Func;
use crate::ids::{
    ByteRange, ExprId, ExprRange, FuncId, IndexDomainId, IndexSetId, IndexVarRange, StmtId,
    TensorIndexId, VarId, VarRange,
};
use crate::stmt::StmtKind;

/// Checked narrowing for pool indices; index exhaustion is fatal.
pub(crate) fn to_u32(value: usize, what: &str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| panic!("too many {what} for a u32 index ({value})"))
}

/// Checked narrowing for range lengths; list exhaustion is fatal.
pub(crate) fn to_u16(value: usize, what: &str) -> u16 {
    u16::try_from(value).unwrap_or_else(|_| panic!("{what} too long for a u16 length ({value})"))
}

/// Arena for IR expressions, statements, and the values they reference.
///
/// Construction goes through the factory methods (the `build` module);
/// they validate operands, compute the expression type, and allocate.
/// Traversal takes `&self`, so rewriting passes build new nodes and
/// thread the new ids up through parent reconstruction.
#[derive(Clone, Debug, Default)]
pub struct IrArena {
    /// Expression kinds (parallel with types).
    expr_kinds: Vec<ExprKind>,
    /// Expression types, computed at construction (parallel with kinds).
    expr_types: Vec<Type>,
    /// Statement kinds.
    stmt_kinds: Vec<StmtKind>,
    /// Flattened expression id lists (args, indices, actuals).
    expr_lists: Vec<ExprId>,
    /// Variables, referenced singly and in contiguous runs.
    vars: Vec<Var>,
    /// Index variables, referenced in contiguous runs.
    index_vars: Vec<IndexVar>,
    /// Index sets referenced by `Length` nodes.
    index_sets: Vec<IndexSet>,
    /// Index domains referenced by `Kernel` statements.
    index_domains: Vec<IndexDomain>,
    /// Tensor indices referenced by `TensorIndexRead` nodes.
    tensor_indices: Vec<TensorIndex>,
    /// Callee handles for `Call`, `CallStmt`, and `Map`.
    funcs: Vec<Func>,
    /// Raw element bytes of dense tensor literals.
    literal_data: Vec<u8>,
}

impl IrArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        IrArena::default()
    }

    /// Create an arena pre-allocated for roughly `nodes` expressions.
    pub fn with_capacity(nodes: usize) -> Self {
        IrArena {
            expr_kinds: Vec::with_capacity(nodes),
            expr_types: Vec::with_capacity(nodes),
            stmt_kinds: Vec::with_capacity(nodes / 2),
            expr_lists: Vec::with_capacity(nodes / 4),
            ..IrArena::default()
        }
    }

    /// Allocate an expression node with its computed type.
    pub(crate) fn push_expr(&mut self, kind: ExprKind, ty: Type) -> ExprId {
        let id = ExprId::new(to_u32(self.expr_kinds.len(), "expressions"));
        self.expr_kinds.push(kind);
        self.expr_types.push(ty);
        id
    }

    /// Allocate a statement node.
    pub(crate) fn push_stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(to_u32(self.stmt_kinds.len(), "statements"));
        self.stmt_kinds.push(kind);
        id
    }

    /// Get the kind of an expression.
    #[inline]
    pub fn expr_kind(&self, id: ExprId) -> ExprKind {
        assert!(id.is_defined(), "use of the undefined expression handle");
        self.expr_kinds[id.index()]
    }

    /// Get the type of an expression.
    #[inline]
    pub fn expr_type(&self, id: ExprId) -> &Type {
        assert!(id.is_defined(), "use of the undefined expression handle");
        &self.expr_types[id.index()]
    }

    /// Get the kind of a statement.
    #[inline]
    pub fn stmt_kind(&self, id: StmtId) -> StmtKind {
        assert!(id.is_defined(), "use of the undefined statement handle");
        self.stmt_kinds[id.index()]
    }

    /// Number of allocated expressions.
    pub fn expr_count(&self) -> usize {
        self.expr_kinds.len()
    }

    /// Number of allocated statements.
    pub fn stmt_count(&self) -> usize {
        self.stmt_kinds.len()
    }

    /// Allocate a contiguous run of expression ids.
    pub(crate) fn push_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        if ids.is_empty() {
            return ExprRange::EMPTY;
        }
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, to_u16(ids.len(), "expression list"))
    }

    /// Get expression ids from a range.
    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Allocate a single variable.
    pub(crate) fn push_var(&mut self, var: Var) -> VarId {
        let id = VarId::new(to_u32(self.vars.len(), "variables"));
        self.vars.push(var);
        id
    }

    /// Get a variable.
    #[inline]
    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id.index()]
    }

    /// Allocate a contiguous run of variables.
    pub(crate) fn push_var_list(&mut self, vars: &[Var]) -> VarRange {
        if vars.is_empty() {
            return VarRange::EMPTY;
        }
        let start = to_u32(self.vars.len(), "variables");
        self.vars.extend_from_slice(vars);
        VarRange::new(start, to_u16(vars.len(), "variable list"))
    }

    /// Get variables from a range.
    pub fn get_var_list(&self, range: VarRange) -> &[Var] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.vars[start..start + range.len()]
    }

    /// Allocate a contiguous run of index variables.
    pub(crate) fn push_index_var_list(&mut self, vars: &[IndexVar]) -> IndexVarRange {
        if vars.is_empty() {
            return IndexVarRange::EMPTY;
        }
        let start = to_u32(self.index_vars.len(), "index variables");
        self.index_vars.extend_from_slice(vars);
        IndexVarRange::new(start, to_u16(vars.len(), "index variable list"))
    }

    /// Get index variables from a range.
    pub fn get_index_var_list(&self, range: IndexVarRange) -> &[IndexVar] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.index_vars[start..start + range.len()]
    }

    /// Allocate an index set.
    pub(crate) fn push_index_set(&mut self, set: IndexSet) -> IndexSetId {
        let id = IndexSetId::new(to_u32(self.index_sets.len(), "index sets"));
        self.index_sets.push(set);
        id
    }

    /// Get an index set.
    #[inline]
    pub fn index_set(&self, id: IndexSetId) -> &IndexSet {
        &self.index_sets[id.index()]
    }

    /// Allocate an index domain.
    pub(crate) fn push_index_domain(&mut self, domain: IndexDomain) -> IndexDomainId {
        let id = IndexDomainId::new(to_u32(self.index_domains.len(), "index domains"));
        self.index_domains.push(domain);
        id
    }

    /// Get an index domain.
    #[inline]
    pub fn index_domain(&self, id: IndexDomainId) -> &IndexDomain {
        &self.index_domains[id.index()]
    }

    /// Allocate a tensor index.
    pub(crate) fn push_tensor_index(&mut self, index: TensorIndex) -> TensorIndexId {
        let id = TensorIndexId::new(to_u32(self.tensor_indices.len(), "tensor indices"));
        self.tensor_indices.push(index);
        id
    }

    /// Get a tensor index.
    #[inline]
    pub fn tensor_index(&self, id: TensorIndexId) -> &TensorIndex {
        &self.tensor_indices[id.index()]
    }

    /// Allocate a callee handle.
    pub(crate) fn push_func(&mut self, func: Func) -> FuncId {
        let id = FuncId::new(to_u32(self.funcs.len(), "functions"));
        self.funcs.push(func);
        id
    }

    /// Get a function.
    #[inline]
    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.index()]
    }

    /// Allocate a run of literal bytes.
    pub(crate) fn push_literal_data(&mut self, bytes: &[u8]) -> ByteRange {
        let start = to_u32(self.literal_data.len(), "literal bytes");
        self.literal_data.extend_from_slice(bytes);
        ByteRange::new(start, to_u32(bytes.len(), "literal"))
    }

    /// Get literal bytes from a range.
    pub fn get_literal_data(&self, range: ByteRange) -> &[u8] {
        let start = range.start as usize;
        &self.literal_data[start..start + range.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{ComponentType, Name};
    use pretty_assertions::assert_eq;

    #[test]
    fn expr_nodes_pair_kind_with_type() {
        let mut arena = IrArena::new();
        let var_id = arena.push_var(Var::new(
            Name::from_raw(1),
            Type::scalar(ComponentType::Int),
        ));
        let id = arena.push_expr(ExprKind::Var(var_id), Type::scalar(ComponentType::Int));

        assert_eq!(arena.expr_kind(id), ExprKind::Var(var_id));
        assert_eq!(arena.expr_type(id), &Type::scalar(ComponentType::Int));
        assert_eq!(arena.expr_count(), 1);
    }

    #[test]
    #[should_panic(expected = "undefined expression handle")]
    fn undefined_expr_handle_is_fatal() {
        let arena = IrArena::new();
        let _ = arena.expr_kind(ExprId::INVALID);
    }

    #[test]
    #[should_panic(expected = "undefined statement handle")]
    fn undefined_stmt_handle_is_fatal() {
        let arena = IrArena::new();
        let _ = arena.stmt_kind(StmtId::INVALID);
    }

    #[test]
    fn empty_list_is_the_empty_range() {
        let mut arena = IrArena::new();
        assert_eq!(arena.push_expr_list(&[]), ExprRange::EMPTY);
        assert_eq!(arena.get_expr_list(ExprRange::EMPTY), &[] as &[ExprId]);
    }

    #[test]
    fn expr_lists_round_trip() {
        let mut arena = IrArena::new();
        let ids = [ExprId::new(3), ExprId::new(1), ExprId::new(2)];
        let range = arena.push_expr_list(&ids);
        assert_eq!(arena.get_expr_list(range), &ids);
    }

    #[test]
    fn literal_bytes_round_trip() {
        let mut arena = IrArena::new();
        let range = arena.push_literal_data(&5i32.to_ne_bytes());
        assert_eq!(arena.get_literal_data(range), &5i32.to_ne_bytes());
    }

    #[test]
    #[should_panic(expected = "too long for a u16 length")]
    fn oversized_expr_list_is_fatal() {
        let mut arena = IrArena::new();
        let ids = vec![ExprId::new(0); usize::from(u16::MAX) + 1];
        let _ = arena.push_expr_list(&ids);
    }
}
