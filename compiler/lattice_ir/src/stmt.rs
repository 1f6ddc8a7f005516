//! Statement node kinds and loop domains.

use crate::ids::{ExprId, ExprRange, FuncId, IndexDomainId, StmtId, VarId, VarRange};
use lattice_types::{IndexSet, Name, ReductionOperator, Var};

/// Overwrite-vs-accumulate modifier on assignment and write statements.
///
/// `Add` means the statement accumulates into its target
/// (`target += value`) instead of overwriting it. A property of the
/// statement, not a separate kind, so accumulation works uniformly across
/// `Assign`, `Store`, `FieldWrite`, and `TensorWrite`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CompoundOperator {
    #[default]
    None,
    Add,
}

impl CompoundOperator {
    /// The assignment token this operator prints as.
    pub const fn assign_token(self) -> &'static str {
        match self {
            CompoundOperator::None => "=",
            CompoundOperator::Add => "+=",
        }
    }
}

/// A closed catalog of statement kinds.
///
/// Statements carry no type. As with expressions, construction goes
/// through the arena factories, and optional children store the undefined
/// handle (`StmtId::INVALID` / `ExprId::INVALID`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// Declares a variable without assigning it.
    VarDecl { var: VarId },

    /// `var (op=) value`.
    Assign { var: VarId, value: ExprId, op: CompoundOperator },

    /// Scalar write into a buffer at an index.
    Store {
        buffer: ExprId,
        index: ExprId,
        value: ExprId,
        op: CompoundOperator,
    },

    /// Write into a named field of an element or set.
    FieldWrite {
        target: ExprId,
        field: Name,
        value: ExprId,
        op: CompoundOperator,
    },

    /// Write of a block into an n-dimensional tensor; same index-arity
    /// rule as `TensorRead`.
    TensorWrite {
        tensor: ExprId,
        indices: ExprRange,
        value: ExprId,
        op: CompoundOperator,
    },

    /// Invoke a function, binding its results to output variables.
    CallStmt {
        results: VarRange,
        callee: FuncId,
        args: ExprRange,
    },

    /// `first` then `rest`; `rest` may be undefined. `scoped` opens a
    /// variable scope.
    Block { first: StmtId, rest: StmtId, scoped: bool },

    /// Conditional; `else_body` may be undefined (no-op).
    IfThenElse {
        cond: ExprId,
        then_body: StmtId,
        else_body: StmtId,
    },

    /// Integer loop over `[start, end)`.
    ForRange {
        var: VarId,
        start: ExprId,
        end: ExprId,
        body: StmtId,
    },

    /// Pre-tested loop.
    While { cond: ExprId, body: StmtId },

    /// Data-parallel loop over an index domain; iterations are unordered.
    Kernel {
        var: VarId,
        domain: IndexDomainId,
        body: StmtId,
    },

    /// Debug output of a value.
    Print { expr: ExprId },

    /// Non-semantic annotation, optionally wrapping a statement
    /// (undefined `inner` for a bare comment), with spacing hints for the
    /// printer.
    Comment {
        text: Name,
        inner: StmtId,
        header_space: bool,
        footer_space: bool,
    },

    /// No-op placeholder.
    Pass,

    /// Gather-apply-reduce over `target`: apply `function` once per
    /// element (optionally restricted through `neighbors`, undefined when
    /// absent), bind per-invocation results to `vars`, combine across
    /// invocations with `reduction`, and forward `partial_actuals` to
    /// every invocation. Iteration order is left to the backend.
    Map {
        vars: VarRange,
        function: FuncId,
        partial_actuals: ExprRange,
        target: ExprId,
        neighbors: ExprId,
        reduction: ReductionOperator,
    },
}

impl StmtKind {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StmtKind::VarDecl { .. } => "VarDecl",
            StmtKind::Assign { .. } => "Assign",
            StmtKind::Store { .. } => "Store",
            StmtKind::FieldWrite { .. } => "FieldWrite",
            StmtKind::TensorWrite { .. } => "TensorWrite",
            StmtKind::CallStmt { .. } => "CallStmt",
            StmtKind::Block { .. } => "Block",
            StmtKind::IfThenElse { .. } => "IfThenElse",
            StmtKind::ForRange { .. } => "ForRange",
            StmtKind::While { .. } => "While",
            StmtKind::Kernel { .. } => "Kernel",
            StmtKind::Print { .. } => "Print",
            StmtKind::Comment { .. } => "Comment",
            StmtKind::Pass => "Pass",
            StmtKind::Map { .. } => "Map",
        }
    }
}

/// Discriminant of [`ForDomain`], used by the checked boundary
/// constructor and by passes that sort domains by kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ForDomainKind {
    IndexSet,
    Endpoints,
    Edges,
    Neighbors,
    NeighborsOf,
    Diagonal,
}

/// What a lowered loop ranges over.
///
/// Either a plain index set, or a walk of an edge set's index structures:
/// its endpoints, its edges, a vertex's neighbors, the neighbors
/// restricted to one endpoint (`NeighborsOf`, which should carry the
/// restricting index set), or the diagonal. The edge-set kinds carry the
/// set expression and the loop variable.
///
/// `NeighborsOf` built through [`ForDomain::over_set`] carries no index
/// set; that is accepted (the restriction may be attached later by the
/// pass that knows it), while any other kind combined with an index set
/// is rejected by [`ForDomain::with_kind`].
#[derive(Clone, Debug, PartialEq)]
pub enum ForDomain {
    IndexSet(IndexSet),
    Endpoints { set: ExprId, var: Var },
    Edges { set: ExprId, var: Var },
    Neighbors { set: ExprId, var: Var },
    NeighborsOf {
        set: ExprId,
        var: Var,
        index_set: Option<IndexSet>,
    },
    Diagonal { set: ExprId, var: Var },
}

impl ForDomain {
    /// Domain over a plain index set.
    pub fn over_index_set(index_set: IndexSet) -> ForDomain {
        ForDomain::IndexSet(index_set)
    }

    /// Domain over an edge set's index structures.
    ///
    /// # Panics
    /// Panics for [`ForDomainKind::IndexSet`]; plain index-set domains
    /// carry no set expression and are built with
    /// [`ForDomain::over_index_set`].
    pub fn over_set(set: ExprId, var: Var, kind: ForDomainKind) -> ForDomain {
        match kind {
            ForDomainKind::IndexSet => {
                panic!("index-set domains carry no set expression; use over_index_set")
            }
            ForDomainKind::Endpoints => ForDomain::Endpoints { set, var },
            ForDomainKind::Edges => ForDomain::Edges { set, var },
            ForDomainKind::Neighbors => ForDomain::Neighbors { set, var },
            ForDomainKind::NeighborsOf => ForDomain::NeighborsOf { set, var, index_set: None },
            ForDomainKind::Diagonal => ForDomain::Diagonal { set, var },
        }
    }

    /// Neighbors restricted to one endpoint's index set.
    pub fn neighbors_of(set: ExprId, var: Var, index_set: IndexSet) -> ForDomain {
        ForDomain::NeighborsOf { set, var, index_set: Some(index_set) }
    }

    /// Checked boundary constructor for ingested kind/field tuples.
    ///
    /// # Panics
    /// Panics if `index_set` is present for any kind other than
    /// `NeighborsOf`, or if the kind is `IndexSet` (which carries no set
    /// expression).
    pub fn with_kind(
        kind: ForDomainKind,
        set: ExprId,
        var: Var,
        index_set: Option<IndexSet>,
    ) -> ForDomain {
        if let Some(index_set) = index_set {
            assert!(
                kind == ForDomainKind::NeighborsOf,
                "{kind:?} domain cannot carry an index set"
            );
            return ForDomain::neighbors_of(set, var, index_set);
        }
        ForDomain::over_set(set, var, kind)
    }

    pub fn kind(&self) -> ForDomainKind {
        match self {
            ForDomain::IndexSet(_) => ForDomainKind::IndexSet,
            ForDomain::Endpoints { .. } => ForDomainKind::Endpoints,
            ForDomain::Edges { .. } => ForDomainKind::Edges,
            ForDomain::Neighbors { .. } => ForDomainKind::Neighbors,
            ForDomain::NeighborsOf { .. } => ForDomainKind::NeighborsOf,
            ForDomain::Diagonal { .. } => ForDomainKind::Diagonal,
        }
    }

    /// The index set, for the kinds that carry one.
    pub fn index_set(&self) -> Option<&IndexSet> {
        match self {
            ForDomain::IndexSet(index_set) => Some(index_set),
            ForDomain::NeighborsOf { index_set, .. } => index_set.as_ref(),
            _ => None,
        }
    }

    /// The edge-set expression, for the edge-set kinds.
    pub fn set(&self) -> Option<ExprId> {
        match self {
            ForDomain::IndexSet(_) => None,
            ForDomain::Endpoints { set, .. }
            | ForDomain::Edges { set, .. }
            | ForDomain::Neighbors { set, .. }
            | ForDomain::NeighborsOf { set, .. }
            | ForDomain::Diagonal { set, .. } => Some(*set),
        }
    }

    /// The loop variable, for the edge-set kinds.
    pub fn var(&self) -> Option<&Var> {
        match self {
            ForDomain::IndexSet(_) => None,
            ForDomain::Endpoints { var, .. }
            | ForDomain::Edges { var, .. }
            | ForDomain::Neighbors { var, .. }
            | ForDomain::NeighborsOf { var, .. }
            | ForDomain::Diagonal { var, .. } => Some(var),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{ComponentType, Name, Type};

    fn loop_var() -> Var {
        Var::new(Name::from_raw(1), Type::scalar(ComponentType::Int))
    }

    #[test]
    fn stmt_kind_stays_compact() {
        assert!(std::mem::size_of::<StmtKind>() <= 32);
    }

    #[test]
    fn compound_operator_tokens() {
        assert_eq!(CompoundOperator::None.assign_token(), "=");
        assert_eq!(CompoundOperator::Add.assign_token(), "+=");
    }

    #[test]
    fn for_domain_kinds_round_trip() {
        let domain = ForDomain::over_set(ExprId::new(0), loop_var(), ForDomainKind::Edges);
        assert_eq!(domain.kind(), ForDomainKind::Edges);
        assert_eq!(domain.index_set(), None);
        assert_eq!(domain.set(), Some(ExprId::new(0)));

        let plain = ForDomain::over_index_set(IndexSet::Range(4));
        assert_eq!(plain.kind(), ForDomainKind::IndexSet);
        assert_eq!(plain.index_set(), Some(&IndexSet::Range(4)));
        assert_eq!(plain.set(), None);
    }

    #[test]
    fn neighbors_of_without_index_set_is_permitted() {
        let domain = ForDomain::over_set(ExprId::new(2), loop_var(), ForDomainKind::NeighborsOf);
        assert_eq!(domain.kind(), ForDomainKind::NeighborsOf);
        assert_eq!(domain.index_set(), None);

        let checked =
            ForDomain::with_kind(ForDomainKind::NeighborsOf, ExprId::new(2), loop_var(), None);
        assert_eq!(checked.index_set(), None);
    }

    #[test]
    #[should_panic(expected = "cannot carry an index set")]
    fn edges_with_index_set_panics() {
        let _ = ForDomain::with_kind(
            ForDomainKind::Edges,
            ExprId::new(0),
            loop_var(),
            Some(IndexSet::Range(3)),
        );
    }

    #[test]
    #[should_panic(expected = "use over_index_set")]
    fn over_set_rejects_index_set_kind() {
        let _ = ForDomain::over_set(ExprId::new(0), loop_var(), ForDomainKind::IndexSet);
    }
}
