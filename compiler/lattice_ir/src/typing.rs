//! Type computation for IR expressions.
//!
//! The factories apply these rules at construction, so every allocated
//! expression carries its type from the start; passes call them to
//! compute the type a rewritten node will get. Violations are fatal.

use lattice_types::{ComponentType, IndexDomain, IndexSet, IndexVar, Name, TensorType, Type};
use smallvec::SmallVec;

use crate::arena::IrArena;
use crate::expr::ExprKind;
use crate::ids::ExprId;
use crate::visitor::{walk_expr, Visitor};

/// The tensor type of `id`, or a fatal kind mismatch.
pub(crate) fn expect_tensor<'a>(arena: &'a IrArena, id: ExprId, what: &str) -> &'a TensorType {
    match arena.expr_type(id) {
        Type::Tensor(tensor) => tensor,
        other => panic!("{what} requires a tensor operand, found {} type", other.kind_name()),
    }
}

/// The type of reading `field` from an element or set expression.
///
/// For an element, the field's tensor type as declared. For a set, the
/// per-element field type lifted over the set: the set's index set is
/// prepended to every dimension, so a scalar field reads as a vector
/// over the set and a per-element vector reads as a blocked vector. The
/// set expression must be a variable reference so the lifted dimensions
/// can name their set.
#[tracing::instrument(level = "trace", skip(arena))]
pub fn field_type(arena: &IrArena, target: ExprId, field: Name) -> Type {
    match arena.expr_type(target) {
        Type::Element(element) => {
            let found = element
                .field(field)
                .unwrap_or_else(|| panic!("element {:?} has no field {field:?}", element.name()));
            Type::Tensor(found.ty.clone())
        }
        Type::Set(set) => {
            let set_name = match arena.expr_kind(target) {
                ExprKind::Var(var_id) => arena.var(var_id).name(),
                other => panic!(
                    "set field read requires a named set variable, found {}",
                    other.kind_name()
                ),
            };
            let element = set.element();
            let found = element
                .field(field)
                .unwrap_or_else(|| panic!("element {:?} has no field {field:?}", element.name()));

            let set_dim = IndexSet::Set(set_name);
            if found.ty.is_scalar() {
                Type::tensor(found.ty.component(), vec![IndexDomain::single(set_dim)])
            } else {
                let dimensions = found
                    .ty
                    .dimensions()
                    .iter()
                    .map(|dim| dim.prepended(set_dim.clone()))
                    .collect();
                Type::tensor(found.ty.component(), dimensions)
            }
        }
        other => panic!(
            "field read target must be an element or a set, found {} type",
            other.kind_name()
        ),
    }
}

/// The type of reading one block from a tensor expression.
///
/// Delegates to [`TensorType::block_type`]: the outer index set is
/// stripped from every blocked dimension, and a tensor with no blocked
/// dimension reads as its scalar component.
#[tracing::instrument(level = "trace", skip(arena))]
pub fn block_type(arena: &IrArena, tensor: ExprId) -> Type {
    expect_tensor(arena, tensor, "block type").block_type()
}

/// The type of an index expression with the given free result variables.
///
/// Dimension `i` of the result is the domain of result variable `i`;
/// the component type is the value's. Index variables that range over
/// the value without appearing in `result_vars` are summed out and leave
/// no trace in the type, regardless of their syntactic position. Zero
/// result variables yield the scalar component.
#[tracing::instrument(level = "trace", skip(arena, result_vars))]
pub fn index_expr_type(arena: &IrArena, result_vars: &[IndexVar], value: ExprId) -> Type {
    let component = expect_tensor(arena, value, "index expression value").component();
    if result_vars.is_empty() {
        return Type::scalar(component);
    }
    let dimensions = result_vars.iter().map(|var| var.domain().clone()).collect();
    Type::tensor(component, dimensions)
}

/// The index variables a value ranges over: the union of the variable
/// lists of every `IndexedTensor` in the subtree, ordered by first
/// appearance, deduplicated by name.
#[tracing::instrument(level = "trace", skip(arena))]
pub fn index_expr_domain(arena: &IrArena, value: ExprId) -> Vec<IndexVar> {
    struct Collect {
        vars: SmallVec<[IndexVar; 4]>,
    }

    impl Visitor for Collect {
        fn visit_expr(&mut self, id: ExprId, arena: &IrArena) {
            if let ExprKind::IndexedTensor { vars, .. } = arena.expr_kind(id) {
                for var in arena.get_index_var_list(vars) {
                    if self.vars.iter().all(|seen| seen.name() != var.name()) {
                        self.vars.push(var.clone());
                    }
                }
            }
            walk_expr(self, id, arena);
        }
    }

    let mut collector = Collect { vars: SmallVec::new() };
    collector.visit_expr(value, arena);
    collector.vars.into_vec()
}

/// Result type of an elementwise binary arithmetic node.
///
/// Numeric operands only. Two scalars promote to a scalar; a scalar
/// combines with a tensor of any shape (the tensor's shape wins); two
/// tensors must agree dimension for dimension.
pub(crate) fn binary_arith_type(arena: &IrArena, op: &str, left: ExprId, right: ExprId) -> Type {
    let lhs = expect_tensor(arena, left, op);
    let rhs = expect_tensor(arena, right, op);
    assert!(
        lhs.component().is_numeric() && rhs.component().is_numeric(),
        "{op} requires numeric operands, found {} and {}",
        lhs.component(),
        rhs.component()
    );
    let component = ComponentType::promoted(lhs.component(), rhs.component());
    if lhs.is_scalar() && rhs.is_scalar() {
        Type::scalar(component)
    } else if lhs.is_scalar() {
        Type::tensor(component, rhs.dimensions().to_vec())
    } else if rhs.is_scalar() {
        Type::tensor(component, lhs.dimensions().to_vec())
    } else {
        assert_eq!(
            lhs.dimensions(),
            rhs.dimensions(),
            "{op} operand shapes do not agree"
        );
        Type::tensor(component, lhs.dimensions().to_vec())
    }
}

/// Result type of an elementwise unary arithmetic node.
pub(crate) fn unary_arith_type(arena: &IrArena, op: &str, operand: ExprId) -> Type {
    let tensor = expect_tensor(arena, operand, op);
    assert!(
        tensor.component().is_numeric(),
        "{op} requires a numeric operand, found {}",
        tensor.component()
    );
    Type::Tensor(tensor.clone())
}

/// Checks that `id` is a boolean scalar (logic operands, conditions).
pub(crate) fn check_boolean_scalar(arena: &IrArena, what: &str, id: ExprId) {
    let tensor = expect_tensor(arena, id, what);
    assert!(
        tensor.is_scalar() && tensor.component() == ComponentType::Bool,
        "{what} must be a boolean scalar, found {} of order {}",
        tensor.component(),
        tensor.order()
    );
}

/// Checks that `id` is an integer scalar (buffer and loop indices).
pub(crate) fn check_int_scalar(arena: &IrArena, what: &str, id: ExprId) {
    let tensor = expect_tensor(arena, id, what);
    assert!(
        tensor.is_scalar() && tensor.component() == ComponentType::Int,
        "{what} must be an integer scalar, found {} of order {}",
        tensor.component(),
        tensor.order()
    );
}

/// Result type of a comparison node: scalar operands, both boolean or
/// both numeric.
pub(crate) fn comparison_type(arena: &IrArena, op: &str, left: ExprId, right: ExprId) -> Type {
    let lhs = expect_tensor(arena, left, op);
    let rhs = expect_tensor(arena, right, op);
    assert!(
        lhs.is_scalar() && rhs.is_scalar(),
        "{op} requires scalar operands, found orders {} and {}",
        lhs.order(),
        rhs.order()
    );
    let comparable = (lhs.component().is_numeric() && rhs.component().is_numeric())
        || (lhs.component() == ComponentType::Bool && rhs.component() == ComponentType::Bool);
    assert!(
        comparable,
        "{op} cannot compare {} with {}",
        lhs.component(),
        rhs.component()
    );
    Type::scalar(ComponentType::Bool)
}
