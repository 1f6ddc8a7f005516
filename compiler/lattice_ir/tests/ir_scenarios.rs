//! End-to-end construction scenarios over the public API.
//!
//! Exercises the factory surface the way a front end would: building typed
//! nodes into an arena, checking what the type computation infers, and
//! rendering the result. The small evaluator at the bottom executes
//! straight-line statements over scalar buffers to check that compound
//! writes mean what their expanded form means.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::collections::HashMap;

use lattice_ir::visitor::Visitor;
use lattice_ir::{
    pretty, ComponentType, CompoundOperator, ElementType, Environment, ExprId, ExprKind, Field,
    FuncBuilder, FuncKind, IndexDomain, IndexSet, IndexVar, IrArena, Name, ReductionOperator,
    SetType, StmtId, StmtKind, StringInterner, TensorIndex, TensorIndexReadKind, TensorType,
    TupleType, Type, Var,
};

fn float_scalar() -> Type {
    Type::scalar(ComponentType::Float)
}

fn float_field(dims: &[u32]) -> TensorType {
    TensorType::new(
        ComponentType::Float,
        dims.iter()
            .map(|&n| IndexDomain::single(IndexSet::Range(n)))
            .collect(),
    )
}

fn float_tensor(dims: &[u32]) -> Type {
    Type::tensor(
        ComponentType::Float,
        dims.iter()
            .map(|&n| IndexDomain::single(IndexSet::Range(n)))
            .collect(),
    )
}

// -- Handle Lifetime --

#[test]
fn handles_stay_valid_for_the_arena_that_made_them() {
    let mut arena = IrArena::new();
    let one = arena.literal_int(1);

    let snapshot = arena.clone();
    let two = arena.literal_int(2);

    assert_eq!(snapshot.expr_count(), 1);
    assert_eq!(arena.expr_count(), 2);
    assert_eq!(snapshot.literal_int_at(one, 0), 1);
    assert_eq!(arena.literal_int_at(two, 0), 2);
}

#[test]
#[should_panic(expected = "undefined expression handle")]
fn undefined_expr_handle_fails_every_access() {
    let arena = IrArena::new();
    let _ = arena.expr_type(ExprId::INVALID);
}

#[test]
#[should_panic(expected = "undefined statement handle")]
fn undefined_stmt_handle_fails_every_access() {
    let arena = IrArena::new();
    let _ = arena.stmt_kind(StmtId::INVALID);
}

// -- Downcast Soundness --

#[test]
fn every_expression_factory_yields_its_own_kind() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();

    let point = ElementType::new(
        interner.intern("Point"),
        vec![Field::new(interner.intern("mass"), float_field(&[]))],
    );
    let mat = arena.var_expr(Var::new(interner.intern("A"), float_tensor(&[3, 3])));
    let vec = arena.var_expr(Var::new(interner.intern("v"), float_tensor(&[4])));
    let elem = arena.var_expr(Var::new(interner.intern("p"), Type::Element(point.clone())));
    let tuple = arena.var_expr(Var::new(
        interner.intern("ends"),
        Type::Tuple(TupleType::new(point, 2)),
    ));

    let int_lit = arena.literal_int(5);
    let float_lit = arena.literal_float(2.5);
    let bool_lit = arena.literal_bool(true);
    assert!(matches!(arena.expr_kind(int_lit), ExprKind::Literal { .. }));
    assert!(matches!(arena.expr_kind(float_lit), ExprKind::Literal { .. }));
    assert!(matches!(arena.expr_kind(bool_lit), ExprKind::Literal { .. }));

    assert!(matches!(arena.expr_kind(mat), ExprKind::Var(_)));

    let zero = arena.literal_int(0);
    let one = arena.literal_int(1);

    let load = arena.load(vec, zero);
    assert!(matches!(arena.expr_kind(load), ExprKind::Load { .. }));

    let mass = arena.field_read(elem, interner.intern("mass"));
    assert!(matches!(arena.expr_kind(mass), ExprKind::FieldRead { .. }));

    let sqrt = FuncBuilder::new(interner.intern("sqrt"), FuncKind::Intrinsic)
        .result(Var::new(interner.intern("r"), float_scalar()))
        .build();
    let call = arena.call(sqrt, &[float_lit]);
    assert!(matches!(arena.expr_kind(call), ExprKind::Call { .. }));

    let length = arena.length(IndexSet::Set(interner.intern("points")));
    assert!(matches!(arena.expr_kind(length), ExprKind::Length { .. }));
    assert_eq!(arena.expr_type(length), &Type::scalar(ComponentType::Int));

    let nbrs = TensorIndex::new(interner.intern("nbrs"));
    let coords = arena.tensor_index_read(nbrs, zero, TensorIndexReadKind::Coordinates);
    assert!(matches!(
        arena.expr_kind(coords),
        ExprKind::TensorIndexRead { read: TensorIndexReadKind::Coordinates, .. }
    ));

    let neg = arena.neg(float_lit);
    assert!(matches!(arena.expr_kind(neg), ExprKind::Neg(_)));

    let add = arena.add(float_lit, float_lit);
    let sub = arena.sub(float_lit, float_lit);
    let mul = arena.mul(float_lit, float_lit);
    let div = arena.div(float_lit, float_lit);
    assert!(matches!(arena.expr_kind(add), ExprKind::Add(..)));
    assert!(matches!(arena.expr_kind(sub), ExprKind::Sub(..)));
    assert!(matches!(arena.expr_kind(mul), ExprKind::Mul(..)));
    assert!(matches!(arena.expr_kind(div), ExprKind::Div(..)));

    let not = arena.not(bool_lit);
    let and = arena.and(bool_lit, bool_lit);
    let or = arena.or(bool_lit, bool_lit);
    let xor = arena.xor(bool_lit, bool_lit);
    assert!(matches!(arena.expr_kind(not), ExprKind::Not(_)));
    assert!(matches!(arena.expr_kind(and), ExprKind::And(..)));
    assert!(matches!(arena.expr_kind(or), ExprKind::Or(..)));
    assert!(matches!(arena.expr_kind(xor), ExprKind::Xor(..)));

    let eq = arena.eq(zero, one);
    let ne = arena.ne(zero, one);
    let gt = arena.gt(zero, one);
    let lt = arena.lt(zero, one);
    let ge = arena.ge(zero, one);
    let le = arena.le(zero, one);
    assert!(matches!(arena.expr_kind(eq), ExprKind::Eq(..)));
    assert!(matches!(arena.expr_kind(ne), ExprKind::Ne(..)));
    assert!(matches!(arena.expr_kind(gt), ExprKind::Gt(..)));
    assert!(matches!(arena.expr_kind(lt), ExprKind::Lt(..)));
    assert!(matches!(arena.expr_kind(ge), ExprKind::Ge(..)));
    assert!(matches!(arena.expr_kind(le), ExprKind::Le(..)));
    assert_eq!(arena.expr_type(le), &Type::scalar(ComponentType::Bool));

    let first = arena.tuple_read(tuple, zero);
    assert!(matches!(arena.expr_kind(first), ExprKind::TupleRead { .. }));

    let read = arena.tensor_read(mat, &[zero, one]);
    assert!(matches!(arena.expr_kind(read), ExprKind::TensorRead { .. }));

    let i = IndexVar::free(interner.intern("i"), IndexDomain::single(IndexSet::Range(3)));
    let j = IndexVar::free(interner.intern("j"), IndexDomain::single(IndexSet::Range(3)));
    let indexed = arena.indexed_tensor(mat, &[i.clone(), j.clone()]);
    assert!(matches!(arena.expr_kind(indexed), ExprKind::IndexedTensor { .. }));

    let index_expr = arena.index_expr(&[i, j], indexed);
    assert!(matches!(arena.expr_kind(index_expr), ExprKind::IndexExpr { .. }));
    assert_eq!(arena.expr_type(index_expr), &float_tensor(&[3, 3]));
}

#[test]
fn every_statement_factory_yields_its_own_kind() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();

    let x = Var::new(interner.intern("x"), float_scalar());
    let point = ElementType::new(
        interner.intern("Point"),
        vec![Field::new(interner.intern("mass"), float_field(&[]))],
    );
    let points_ty = Type::Set(SetType::new(point.clone(), 0));

    let vec = arena.var_expr(Var::new(interner.intern("v"), float_tensor(&[4])));
    let mat = arena.var_expr(Var::new(interner.intern("A"), float_tensor(&[3, 3])));
    let elem = arena.var_expr(Var::new(interner.intern("p"), Type::Element(point)));
    let points = arena.var_expr(Var::new(interner.intern("points"), points_ty));

    let zero = arena.literal_int(0);
    let one = arena.literal_int(1);
    let value = arena.literal_float(1.5);
    let cond = arena.literal_bool(true);

    let decl = arena.var_decl(x.clone());
    assert!(matches!(arena.stmt_kind(decl), StmtKind::VarDecl { .. }));

    let assign = arena.assign(x.clone(), value, CompoundOperator::None);
    assert!(matches!(arena.stmt_kind(assign), StmtKind::Assign { .. }));

    let store = arena.store(vec, zero, value, CompoundOperator::Add);
    assert!(matches!(arena.stmt_kind(store), StmtKind::Store { .. }));

    let field_write = arena.field_write(elem, interner.intern("mass"), value, CompoundOperator::None);
    assert!(matches!(arena.stmt_kind(field_write), StmtKind::FieldWrite { .. }));

    let tensor_write = arena.tensor_write(mat, &[zero, one], value, CompoundOperator::None);
    assert!(matches!(arena.stmt_kind(tensor_write), StmtKind::TensorWrite { .. }));

    let update = FuncBuilder::new(interner.intern("update"), FuncKind::Internal).build();
    let call_stmt = arena.call_stmt(&[], update.clone(), &[value]);
    assert!(matches!(arena.stmt_kind(call_stmt), StmtKind::CallStmt { .. }));

    let pass = arena.pass();
    assert!(matches!(arena.stmt_kind(pass), StmtKind::Pass));

    let pair = arena.block2(decl, assign, false);
    assert!(matches!(arena.stmt_kind(pair), StmtKind::Block { scoped: false, .. }));
    let scoped = arena.scoped_block(&[store, pass]);
    assert!(matches!(arena.stmt_kind(scoped), StmtKind::Block { scoped: true, .. }));

    let branch = arena.if_then_else(cond, pass, pass);
    assert!(matches!(arena.stmt_kind(branch), StmtKind::IfThenElse { .. }));

    let loop_var = Var::new(interner.intern("t"), Type::scalar(ComponentType::Int));
    let for_range = arena.for_range(loop_var.clone(), zero, one, pass);
    assert!(matches!(arena.stmt_kind(for_range), StmtKind::ForRange { .. }));

    let while_loop = arena.while_loop(cond, pass);
    assert!(matches!(arena.stmt_kind(while_loop), StmtKind::While { .. }));

    let kernel = arena.kernel(
        loop_var,
        IndexDomain::single(IndexSet::Set(interner.intern("points"))),
        pass,
    );
    assert!(matches!(arena.stmt_kind(kernel), StmtKind::Kernel { .. }));

    let print = arena.print(value);
    assert!(matches!(arena.stmt_kind(print), StmtKind::Print { .. }));

    let comment = arena.comment(interner.intern("note"), pass, false, false);
    assert!(matches!(arena.stmt_kind(comment), StmtKind::Comment { .. }));

    let map = arena.map(
        &[x],
        update,
        &[],
        points,
        ExprId::INVALID,
        ReductionOperator::Sum,
    );
    assert!(matches!(arena.stmt_kind(map), StmtKind::Map { .. }));
}

// -- Tensor Write Arity --

#[test]
fn tensor_write_accepts_one_or_order_indices() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();
    let mat = arena.var_expr(Var::new(interner.intern("A"), float_tensor(&[3, 3])));
    let i = arena.literal_int(0);
    let j = arena.literal_int(1);
    let value = arena.literal_float(1.0);

    let by_pair = arena.tensor_write(mat, &[i, j], value, CompoundOperator::None);
    assert!(matches!(arena.stmt_kind(by_pair), StmtKind::TensorWrite { .. }));

    let flattened = arena.tensor_write(mat, &[i], value, CompoundOperator::None);
    assert!(matches!(arena.stmt_kind(flattened), StmtKind::TensorWrite { .. }));
}

#[test]
#[should_panic(expected = "takes 1 or 2 indices")]
fn tensor_write_rejects_other_arities() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();
    let mat = arena.var_expr(Var::new(interner.intern("A"), float_tensor(&[3, 3])));
    let i = arena.literal_int(0);
    let value = arena.literal_float(1.0);
    let _ = arena.tensor_write(mat, &[i, i, i], value, CompoundOperator::None);
}

// -- Index Expression Type Law --

#[test]
fn reduction_var_is_summed_out_regardless_of_position() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();

    let i = IndexVar::free(interner.intern("i"), IndexDomain::single(IndexSet::Range(3)));
    let j = IndexVar::free(interner.intern("j"), IndexDomain::single(IndexSet::Range(4)));
    let k = IndexVar::sum(interner.intern("k"), IndexDomain::single(IndexSet::Range(5)));

    let a = arena.var_expr(Var::new(interner.intern("A"), float_tensor(&[3, 5])));
    let b = arena.var_expr(Var::new(interner.intern("B"), float_tensor(&[5, 4])));

    let a_ik = arena.indexed_tensor(a, &[i.clone(), k.clone()]);
    let b_kj = arena.indexed_tensor(b, &[k.clone(), j.clone()]);

    let left_first = arena.mul(a_ik, b_kj);
    let matmul = arena.index_expr(&[i.clone(), j.clone()], left_first);
    assert_eq!(arena.expr_type(matmul), &float_tensor(&[3, 4]));

    // Same result vars, k appearing first syntactically.
    let right_first = arena.mul(b_kj, a_ik);
    let flipped = arena.index_expr(&[i.clone(), j.clone()], right_first);
    assert_eq!(arena.expr_type(flipped), &float_tensor(&[3, 4]));

    // The collected domain orders by first appearance; the type does not.
    let names: Vec<Name> = lattice_ir::index_expr_domain(&arena, left_first)
        .iter()
        .map(IndexVar::name)
        .collect();
    assert_eq!(
        names,
        vec![i.name(), k.name(), j.name()]
    );
    let names: Vec<Name> = lattice_ir::index_expr_domain(&arena, right_first)
        .iter()
        .map(IndexVar::name)
        .collect();
    assert_eq!(names, vec![k.name(), j.name(), i.name()]);
}

// -- Compound Writes --

#[test]
fn compound_store_equals_its_expanded_form() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();
    let forces = Var::new(interner.intern("forces"), float_tensor(&[4]));

    let buf = arena.var_expr(forces.clone());
    let idx = arena.literal_int(2);
    let bump = arena.literal_float(3.5);
    let compound = arena.store(buf, idx, bump, CompoundOperator::Add);

    let load = arena.load(buf, idx);
    let sum = arena.add(load, bump);
    let expanded = arena.store(buf, idx, sum, CompoundOperator::None);

    let start = vec![1.0, 2.0, 3.0, 4.0];
    let mut via_compound = Machine::with_buffer(forces.name(), start.clone());
    via_compound.exec(&arena, compound);

    let mut via_expanded = Machine::with_buffer(forces.name(), start);
    via_expanded.exec(&arena, expanded);

    assert_eq!(via_compound.buffer(forces.name()), &[1.0, 2.0, 6.5, 4.0]);
    assert_eq!(
        via_compound.buffer(forces.name()),
        via_expanded.buffer(forces.name())
    );
}

#[test]
fn compound_assign_accumulates() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();
    let energy = Var::new(interner.intern("energy"), float_scalar());

    let init = arena.literal_float(1.0);
    let bump = arena.literal_float(0.5);
    let stmts = [
        arena.assign(energy.clone(), init, CompoundOperator::None),
        arena.assign(energy.clone(), bump, CompoundOperator::Add),
        arena.assign(energy.clone(), bump, CompoundOperator::Add),
    ];
    let body = arena.block(&stmts);

    let mut machine = Machine::default();
    machine.exec(&arena, body);
    assert_eq!(machine.scalar(energy.name()), 2.0);
}

// -- End To End --

#[test]
fn spring_force_step_builds_and_renders() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();

    let point = ElementType::new(
        interner.intern("Point"),
        vec![Field::new(interner.intern("x"), float_field(&[3]))],
    );
    let spring = ElementType::new(interner.intern("Spring"), Vec::new());

    let points = Var::new(
        interner.intern("points"),
        Type::Set(SetType::new(point, 0)),
    );
    let springs = Var::new(
        interner.intern("springs"),
        Type::Set(SetType::new(spring, 2)),
    );

    // Per-point force blocks: one 3-vector per point.
    let force_ty = Type::tensor(
        ComponentType::Float,
        vec![IndexDomain::new(vec![
            IndexSet::Set(points.name()),
            IndexSet::Range(3),
        ])],
    );
    let force = Var::new(interner.intern("f"), force_ty);

    let distribute = FuncBuilder::new(interner.intern("distribute"), FuncKind::Internal)
        .argument(Var::new(interner.intern("s"), springs.ty().clone()))
        .result(force.clone())
        .build();

    let target = arena.var_expr(springs.clone());
    let gather = arena.map(
        &[force],
        distribute,
        &[],
        target,
        ExprId::INVALID,
        ReductionOperator::Sum,
    );
    let label = arena.comment(interner.intern("accumulate spring forces"), gather, false, false);
    let body = arena.block(&[label]);

    let step = FuncBuilder::new(interner.intern("step"), FuncKind::Internal)
        .argument(springs)
        .argument(points)
        .body(body)
        .build();

    assert_eq!(
        pretty::print_func(&arena, &interner, &step),
        "func step(springs : set{Spring}(2), points : set{Point})\n  \
         % accumulate spring forces\n  \
         f = map distribute to springs reduce +;\n\
         end\n"
    );
}

#[test]
fn environment_globals_flow_into_rendering_and_traversal() {
    let interner = StringInterner::new();
    let mut arena = IrArena::new();

    let gravity = Var::new(interner.intern("g"), float_scalar());
    let init = arena.literal_float(9.81);
    let mut environment = Environment::new();
    environment.define(gravity.clone(), init);

    let out = Var::new(interner.intern("out"), float_scalar());
    let g_ref = arena.var_expr(gravity);
    let body = arena.assign(out.clone(), g_ref, CompoundOperator::None);

    let func = FuncBuilder::new(interner.intern("weigh"), FuncKind::Internal)
        .result(out)
        .body(body)
        .environment(environment)
        .build();

    let mut counter = CountExprs::default();
    counter.visit_func(&func, &arena);
    // The initializer literal, the global reference, and nothing else.
    assert_eq!(counter.seen, 2);

    assert_eq!(
        pretty::print_func(&arena, &interner, &func),
        "func weigh() -> (out : float)\n  const g : float = 9.81;\n  out = g;\nend\n"
    );
}

#[derive(Default)]
struct CountExprs {
    seen: usize,
}

impl Visitor for CountExprs {
    fn visit_expr(&mut self, id: ExprId, arena: &IrArena) {
        self.seen += 1;
        lattice_ir::visitor::walk_expr(self, id, arena);
    }
}

// -- Scalar Machine --

/// Executes straight-line statements over named scalars and flat float
/// buffers. Supports exactly the node forms the compound-write tests
/// construct.
#[derive(Default)]
struct Machine {
    scalars: HashMap<Name, f64>,
    buffers: HashMap<Name, Vec<f64>>,
}

impl Machine {
    fn with_buffer(name: Name, values: Vec<f64>) -> Self {
        let mut machine = Machine::default();
        machine.buffers.insert(name, values);
        machine
    }

    fn scalar(&self, name: Name) -> f64 {
        self.scalars[&name]
    }

    fn buffer(&self, name: Name) -> &[f64] {
        &self.buffers[&name]
    }

    fn exec(&mut self, arena: &IrArena, id: StmtId) {
        match arena.stmt_kind(id) {
            StmtKind::Block { first, rest, .. } => {
                self.exec(arena, first);
                if rest.is_defined() {
                    self.exec(arena, rest);
                }
            }
            StmtKind::Assign { var, value, op } => {
                let name = arena.var(var).name();
                let value = self.eval(arena, value);
                let slot = self.scalars.entry(name).or_insert(0.0);
                match op {
                    CompoundOperator::None => *slot = value,
                    CompoundOperator::Add => *slot += value,
                }
            }
            StmtKind::Store { buffer, index, value, op } => {
                let name = self.buffer_name(arena, buffer);
                let index = self.eval(arena, index) as usize;
                let value = self.eval(arena, value);
                let slot = &mut self.buffers.get_mut(&name).expect("bound buffer")[index];
                match op {
                    CompoundOperator::None => *slot = value,
                    CompoundOperator::Add => *slot += value,
                }
            }
            StmtKind::Pass => {}
            other => panic!("machine does not execute {}", other.kind_name()),
        }
    }

    fn eval(&self, arena: &IrArena, id: ExprId) -> f64 {
        match arena.expr_kind(id) {
            ExprKind::Literal { .. } => match arena.expr_type(id).expect_tensor().component() {
                ComponentType::Float => arena.literal_float_at(id, 0),
                ComponentType::Int => f64::from(arena.literal_int_at(id, 0)),
                ComponentType::Bool => f64::from(arena.literal_bytes(id)[0]),
            },
            ExprKind::Var(var) => self.scalars[&arena.var(var).name()],
            ExprKind::Load { buffer, index } => {
                let name = self.buffer_name(arena, buffer);
                let index = self.eval(arena, index) as usize;
                self.buffers[&name][index]
            }
            ExprKind::Neg(operand) => -self.eval(arena, operand),
            ExprKind::Add(left, right) => self.eval(arena, left) + self.eval(arena, right),
            ExprKind::Sub(left, right) => self.eval(arena, left) - self.eval(arena, right),
            ExprKind::Mul(left, right) => self.eval(arena, left) * self.eval(arena, right),
            ExprKind::Div(left, right) => self.eval(arena, left) / self.eval(arena, right),
            other => panic!("machine does not evaluate {}", other.kind_name()),
        }
    }

    fn buffer_name(&self, arena: &IrArena, buffer: ExprId) -> Name {
        match arena.expr_kind(buffer) {
            ExprKind::Var(var) => arena.var(var).name(),
            other => panic!("machine buffers are named variables, found {}", other.kind_name()),
        }
    }
}
