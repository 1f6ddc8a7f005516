//! Factory methods, the only construction path for IR nodes.
//!
//! Each factory validates its operands, computes the node's type through
//! the `typing` rules, and allocates. A node that exists is therefore
//! well formed and typed; malformed construction panics at the call
//! site instead of producing IR that fails later.

use lattice_types::{
    ComponentType, IndexDomain, IndexSet, IndexVar, Name, ReductionOperator, TensorIndex, Type,
    Var,
};

use crate::arena::IrArena;
use crate::expr::{ExprKind, TensorIndexReadKind};
use crate::func::Func;
use crate::ids::{ExprId, StmtId};
use crate::stmt::{CompoundOperator, StmtKind};
use crate::typing;

impl IrArena {
    /// An integer scalar literal.
    pub fn literal_int(&mut self, value: i32) -> ExprId {
        let data = self.push_literal_data(&value.to_ne_bytes());
        self.push_expr(ExprKind::Literal { data }, Type::scalar(ComponentType::Int))
    }

    /// A float scalar literal.
    pub fn literal_float(&mut self, value: f64) -> ExprId {
        let data = self.push_literal_data(&value.to_ne_bytes());
        self.push_expr(ExprKind::Literal { data }, Type::scalar(ComponentType::Float))
    }

    /// A boolean scalar literal.
    pub fn literal_bool(&mut self, value: bool) -> ExprId {
        let data = self.push_literal_data(&[u8::from(value)]);
        self.push_expr(ExprKind::Literal { data }, Type::scalar(ComponentType::Bool))
    }

    /// A dense tensor literal with raw element bytes.
    ///
    /// The type's dimensions must be statically sized, and `bytes` must
    /// be exactly the type's `size_in_bytes`.
    pub fn literal(&mut self, ty: Type, bytes: &[u8]) -> ExprId {
        let size = ty
            .expect_tensor()
            .size_in_bytes()
            .unwrap_or_else(|| panic!("dense literal requires statically sized dimensions"));
        assert_eq!(size, bytes.len(), "literal byte length does not match its type");
        let data = self.push_literal_data(bytes);
        self.push_expr(ExprKind::Literal { data }, ty)
    }

    /// A variable reference.
    pub fn var_expr(&mut self, var: Var) -> ExprId {
        let ty = var.ty().clone();
        let id = self.push_var(var);
        self.push_expr(ExprKind::Var(id), ty)
    }

    /// A scalar read from a 1-D buffer at an integer index.
    pub fn load(&mut self, buffer: ExprId, index: ExprId) -> ExprId {
        let tensor = typing::expect_tensor(self, buffer, "load buffer");
        assert_eq!(tensor.order(), 1, "load buffer must be a vector");
        let component = tensor.component();
        typing::check_int_scalar(self, "load index", index);
        self.push_expr(ExprKind::Load { buffer, index }, Type::scalar(component))
    }

    /// A field read from an element or set.
    pub fn field_read(&mut self, target: ExprId, field: Name) -> ExprId {
        let ty = typing::field_type(self, target, field);
        self.push_expr(ExprKind::FieldRead { target, field }, ty)
    }

    /// A call of `func`, which must declare exactly one result.
    pub fn call(&mut self, func: Func, args: &[ExprId]) -> ExprId {
        let results = func.results();
        assert_eq!(
            results.len(),
            1,
            "call expression callee {:?} must declare exactly one result",
            func.name()
        );
        let ty = results[0].ty().clone();
        let callee = self.push_func(func);
        let args = self.push_expr_list(args);
        self.push_expr(ExprKind::Call { callee, args }, ty)
    }

    /// The cardinality of an index set.
    pub fn length(&mut self, set: IndexSet) -> ExprId {
        let set = self.push_index_set(set);
        self.push_expr(ExprKind::Length { set }, Type::scalar(ComponentType::Int))
    }

    /// A structural read against a tensor index.
    pub fn tensor_index_read(
        &mut self,
        index: TensorIndex,
        loc: ExprId,
        read: TensorIndexReadKind,
    ) -> ExprId {
        typing::check_int_scalar(self, "tensor index location", loc);
        let index = self.push_tensor_index(index);
        self.push_expr(
            ExprKind::TensorIndexRead { index, loc, read },
            Type::scalar(ComponentType::Int),
        )
    }

    /// Elementwise negation.
    pub fn neg(&mut self, operand: ExprId) -> ExprId {
        let ty = typing::unary_arith_type(self, "neg", operand);
        self.push_expr(ExprKind::Neg(operand), ty)
    }

    /// Elementwise addition.
    pub fn add(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::binary_arith_type(self, "add", left, right);
        self.push_expr(ExprKind::Add(left, right), ty)
    }

    /// Elementwise subtraction.
    pub fn sub(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::binary_arith_type(self, "sub", left, right);
        self.push_expr(ExprKind::Sub(left, right), ty)
    }

    /// Elementwise multiplication.
    pub fn mul(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::binary_arith_type(self, "mul", left, right);
        self.push_expr(ExprKind::Mul(left, right), ty)
    }

    /// Elementwise division.
    pub fn div(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::binary_arith_type(self, "div", left, right);
        self.push_expr(ExprKind::Div(left, right), ty)
    }

    /// Boolean negation.
    pub fn not(&mut self, operand: ExprId) -> ExprId {
        typing::check_boolean_scalar(self, "not operand", operand);
        self.push_expr(ExprKind::Not(operand), Type::scalar(ComponentType::Bool))
    }

    /// Boolean conjunction.
    pub fn and(&mut self, left: ExprId, right: ExprId) -> ExprId {
        typing::check_boolean_scalar(self, "and operand", left);
        typing::check_boolean_scalar(self, "and operand", right);
        self.push_expr(ExprKind::And(left, right), Type::scalar(ComponentType::Bool))
    }

    /// Boolean disjunction.
    pub fn or(&mut self, left: ExprId, right: ExprId) -> ExprId {
        typing::check_boolean_scalar(self, "or operand", left);
        typing::check_boolean_scalar(self, "or operand", right);
        self.push_expr(ExprKind::Or(left, right), Type::scalar(ComponentType::Bool))
    }

    /// Boolean exclusive or.
    pub fn xor(&mut self, left: ExprId, right: ExprId) -> ExprId {
        typing::check_boolean_scalar(self, "xor operand", left);
        typing::check_boolean_scalar(self, "xor operand", right);
        self.push_expr(ExprKind::Xor(left, right), Type::scalar(ComponentType::Bool))
    }

    /// Scalar equality comparison.
    pub fn eq(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "eq", left, right);
        self.push_expr(ExprKind::Eq(left, right), ty)
    }

    /// Scalar inequality comparison.
    pub fn ne(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "ne", left, right);
        self.push_expr(ExprKind::Ne(left, right), ty)
    }

    /// Scalar greater-than comparison.
    pub fn gt(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "gt", left, right);
        self.push_expr(ExprKind::Gt(left, right), ty)
    }

    /// Scalar less-than comparison.
    pub fn lt(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "lt", left, right);
        self.push_expr(ExprKind::Lt(left, right), ty)
    }

    /// Scalar greater-or-equal comparison.
    pub fn ge(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "ge", left, right);
        self.push_expr(ExprKind::Ge(left, right), ty)
    }

    /// Scalar less-or-equal comparison.
    pub fn le(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = typing::comparison_type(self, "le", left, right);
        self.push_expr(ExprKind::Le(left, right), ty)
    }

    /// An indexed read from an edge's endpoint tuple.
    pub fn tuple_read(&mut self, tuple: ExprId, index: ExprId) -> ExprId {
        let element = match self.expr_type(tuple) {
            Type::Tuple(tuple_ty) => tuple_ty.element().clone(),
            other => panic!(
                "tuple read requires a tuple operand, found {} type",
                other.kind_name()
            ),
        };
        typing::check_int_scalar(self, "tuple index", index);
        self.push_expr(ExprKind::TupleRead { tuple, index }, Type::Element(element))
    }

    /// A block read at the given indices.
    ///
    /// The caller provides one index or exactly `order` indices. One
    /// index means the read has already been flattened and lowers
    /// directly to a load.
    pub fn tensor_read(&mut self, tensor: ExprId, indices: &[ExprId]) -> ExprId {
        let order = typing::expect_tensor(self, tensor, "tensor read").order();
        assert!(
            indices.len() == 1 || indices.len() == order,
            "tensor read of an order-{order} tensor takes 1 or {order} indices, found {}",
            indices.len()
        );
        let ty = typing::block_type(self, tensor);
        let indices = self.push_expr_list(indices);
        self.push_expr(ExprKind::TensorRead { tensor, indices }, ty)
    }

    /// A tensor annotated with the index variables it is read through.
    pub fn indexed_tensor(&mut self, tensor: ExprId, vars: &[IndexVar]) -> ExprId {
        let tensor_ty = typing::expect_tensor(self, tensor, "indexed tensor");
        assert_eq!(
            vars.len(),
            tensor_ty.order(),
            "indexed tensor takes one index variable per dimension"
        );
        for (var, dim) in vars.iter().zip(tensor_ty.dimensions()) {
            assert_eq!(
                var.domain(),
                dim,
                "index variable {:?} does not range over the dimension it indexes",
                var.name()
            );
        }
        let component = tensor_ty.component();
        let vars = self.push_index_var_list(vars);
        self.push_expr(ExprKind::IndexedTensor { tensor, vars }, Type::scalar(component))
    }

    /// An Einstein-notation tensor expression over free `result_vars`.
    pub fn index_expr(&mut self, result_vars: &[IndexVar], value: ExprId) -> ExprId {
        for var in result_vars {
            assert!(
                var.is_free(),
                "result variable {:?} of an index expression cannot carry a reduction",
                var.name()
            );
        }
        let ty = typing::index_expr_type(self, result_vars, value);
        let vars = self.push_index_var_list(result_vars);
        self.push_expr(ExprKind::IndexExpr { vars, value }, ty)
    }

    /// The raw element bytes of a literal.
    pub fn literal_bytes(&self, id: ExprId) -> &[u8] {
        match self.expr_kind(id) {
            ExprKind::Literal { data } => self.get_literal_data(data),
            other => panic!("expected a literal, found {}", other.kind_name()),
        }
    }

    /// Value equality of two literals: same type, same bytes.
    pub fn literal_eq(&self, left: ExprId, right: ExprId) -> bool {
        self.expr_type(left) == self.expr_type(right)
            && self.literal_bytes(left) == self.literal_bytes(right)
    }

    /// A new literal of `new_type` sharing this literal's bytes.
    ///
    /// Nodes are immutable, so the re-cast allocates a new node over the
    /// same byte range. The target type must keep the component type and
    /// the element count.
    pub fn cast_literal(&mut self, id: ExprId, new_type: Type) -> ExprId {
        let data = match self.expr_kind(id) {
            ExprKind::Literal { data } => data,
            other => panic!("expected a literal, found {}", other.kind_name()),
        };
        {
            let old = self.expr_type(id).expect_tensor();
            let new = new_type.expect_tensor();
            assert_eq!(
                old.component(),
                new.component(),
                "literal cast cannot change the component type"
            );
            assert_eq!(
                old.element_count(),
                new.element_count(),
                "literal cast cannot change the element count"
            );
        }
        self.push_expr(ExprKind::Literal { data }, new_type)
    }

    /// Element `i` of a float literal.
    pub fn literal_float_at(&self, id: ExprId, i: usize) -> f64 {
        let bytes = self.literal_element(id, ComponentType::Float, i);
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        f64::from_ne_bytes(buf)
    }

    /// Element `i` of an integer literal.
    pub fn literal_int_at(&self, id: ExprId, i: usize) -> i32 {
        let bytes = self.literal_element(id, ComponentType::Int, i);
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        i32::from_ne_bytes(buf)
    }

    fn literal_element(&self, id: ExprId, component: ComponentType, i: usize) -> &[u8] {
        let found = self.expr_type(id).expect_tensor().component();
        assert_eq!(found, component, "literal element access with the wrong component type");
        let bytes = self.literal_bytes(id);
        let size = component.size_in_bytes();
        let offset = i * size;
        assert!(
            offset + size <= bytes.len(),
            "literal element {i} is out of bounds ({} elements)",
            bytes.len() / size
        );
        &bytes[offset..offset + size]
    }

    /// Declare `var` without assigning it.
    pub fn var_decl(&mut self, var: Var) -> StmtId {
        let var = self.push_var(var);
        self.push_stmt(StmtKind::VarDecl { var })
    }

    /// `var (op=) value`.
    pub fn assign(&mut self, var: Var, value: ExprId, op: CompoundOperator) -> StmtId {
        let var = self.push_var(var);
        self.push_stmt(StmtKind::Assign { var, value, op })
    }

    /// Scalar write into a buffer at an integer index.
    pub fn store(
        &mut self,
        buffer: ExprId,
        index: ExprId,
        value: ExprId,
        op: CompoundOperator,
    ) -> StmtId {
        let order = typing::expect_tensor(self, buffer, "store buffer").order();
        assert_eq!(order, 1, "store buffer must be a vector");
        typing::check_int_scalar(self, "store index", index);
        self.push_stmt(StmtKind::Store { buffer, index, value, op })
    }

    /// Write into a named field of an element or set.
    pub fn field_write(
        &mut self,
        target: ExprId,
        field: Name,
        value: ExprId,
        op: CompoundOperator,
    ) -> StmtId {
        let _ = typing::field_type(self, target, field);
        self.push_stmt(StmtKind::FieldWrite { target, field, value, op })
    }

    /// Write a block into an n-dimensional tensor; same index-arity rule
    /// as `tensor_read`.
    pub fn tensor_write(
        &mut self,
        tensor: ExprId,
        indices: &[ExprId],
        value: ExprId,
        op: CompoundOperator,
    ) -> StmtId {
        let order = typing::expect_tensor(self, tensor, "tensor write").order();
        assert!(
            indices.len() == 1 || indices.len() == order,
            "tensor write of an order-{order} tensor takes 1 or {order} indices, found {}",
            indices.len()
        );
        let indices = self.push_expr_list(indices);
        self.push_stmt(StmtKind::TensorWrite { tensor, indices, value, op })
    }

    /// Invoke `func`, binding its results to `results`.
    pub fn call_stmt(&mut self, results: &[Var], func: Func, args: &[ExprId]) -> StmtId {
        let results = self.push_var_list(results);
        let callee = self.push_func(func);
        let args = self.push_expr_list(args);
        self.push_stmt(StmtKind::CallStmt { results, callee, args })
    }

    /// `first` then `rest`; `rest` may be the undefined handle.
    pub fn block2(&mut self, first: StmtId, rest: StmtId, scoped: bool) -> StmtId {
        assert!(first.is_defined(), "the first statement of a block must be defined");
        self.push_stmt(StmtKind::Block { first, rest, scoped })
    }

    /// A balanced block tree over an ordered statement sequence.
    ///
    /// A single statement passes through unwrapped, so the tree adds no
    /// node for it; an empty sequence is fatal. Traversal order equals
    /// sequence order, and the tree depth stays logarithmic in the
    /// sequence length.
    pub fn block(&mut self, stmts: &[StmtId]) -> StmtId {
        assert!(!stmts.is_empty(), "block of zero statements");
        assert!(
            stmts.iter().all(|stmt| stmt.is_defined()),
            "every statement of a block must be defined"
        );
        self.balanced(stmts)
    }

    /// Like [`IrArena::block`], but the resulting block opens a
    /// variable scope (a single statement is wrapped to keep the scope).
    pub fn scoped_block(&mut self, stmts: &[StmtId]) -> StmtId {
        assert!(!stmts.is_empty(), "block of zero statements");
        assert!(
            stmts.iter().all(|stmt| stmt.is_defined()),
            "every statement of a block must be defined"
        );
        if let [single] = stmts {
            return self.block2(*single, StmtId::INVALID, true);
        }
        let mid = stmts.len() / 2;
        let first = self.balanced(&stmts[..mid]);
        let rest = self.balanced(&stmts[mid..]);
        self.push_stmt(StmtKind::Block { first, rest, scoped: true })
    }

    fn balanced(&mut self, stmts: &[StmtId]) -> StmtId {
        if let [single] = stmts {
            return *single;
        }
        let mid = stmts.len() / 2;
        let first = self.balanced(&stmts[..mid]);
        let rest = self.balanced(&stmts[mid..]);
        self.push_stmt(StmtKind::Block { first, rest, scoped: false })
    }

    /// Conditional without an else branch.
    pub fn if_then(&mut self, cond: ExprId, then_body: StmtId) -> StmtId {
        self.if_then_else(cond, then_body, StmtId::INVALID)
    }

    /// Conditional; `else_body` may be the undefined handle.
    pub fn if_then_else(&mut self, cond: ExprId, then_body: StmtId, else_body: StmtId) -> StmtId {
        typing::check_boolean_scalar(self, "if condition", cond);
        assert!(then_body.is_defined(), "the then branch must be defined");
        self.push_stmt(StmtKind::IfThenElse { cond, then_body, else_body })
    }

    /// Integer loop over `[start, end)`.
    pub fn for_range(&mut self, var: Var, start: ExprId, end: ExprId, body: StmtId) -> StmtId {
        typing::check_int_scalar(self, "loop start", start);
        typing::check_int_scalar(self, "loop end", end);
        let var = self.push_var(var);
        self.push_stmt(StmtKind::ForRange { var, start, end, body })
    }

    /// Pre-tested loop.
    pub fn while_loop(&mut self, cond: ExprId, body: StmtId) -> StmtId {
        typing::check_boolean_scalar(self, "while condition", cond);
        self.push_stmt(StmtKind::While { cond, body })
    }

    /// Data-parallel loop over `domain`; iterations are unordered.
    pub fn kernel(&mut self, var: Var, domain: IndexDomain, body: StmtId) -> StmtId {
        let var = self.push_var(var);
        let domain = self.push_index_domain(domain);
        self.push_stmt(StmtKind::Kernel { var, domain, body })
    }

    /// Debug output of a value.
    pub fn print(&mut self, expr: ExprId) -> StmtId {
        self.push_stmt(StmtKind::Print { expr })
    }

    /// A comment, optionally wrapping `inner` (pass the undefined handle
    /// for a bare comment).
    pub fn comment(
        &mut self,
        text: Name,
        inner: StmtId,
        header_space: bool,
        footer_space: bool,
    ) -> StmtId {
        self.push_stmt(StmtKind::Comment { text, inner, header_space, footer_space })
    }

    /// No-op placeholder.
    pub fn pass(&mut self) -> StmtId {
        self.push_stmt(StmtKind::Pass)
    }

    /// Gather-apply-reduce over `target` (`neighbors` may be the
    /// undefined handle).
    pub fn map(
        &mut self,
        vars: &[Var],
        function: Func,
        partial_actuals: &[ExprId],
        target: ExprId,
        neighbors: ExprId,
        reduction: ReductionOperator,
    ) -> StmtId {
        assert!(
            self.expr_type(target).is_set(),
            "map target must be a set, found {} type",
            self.expr_type(target).kind_name()
        );
        if neighbors.is_defined() {
            assert!(
                self.expr_type(neighbors).is_set(),
                "map neighbors must be a set, found {} type",
                self.expr_type(neighbors).kind_name()
            );
        }
        let vars = self.push_var_list(vars);
        let function = self.push_func(function);
        let partial_actuals = self.push_expr_list(partial_actuals);
        self.push_stmt(StmtKind::Map {
            vars,
            function,
            partial_actuals,
            target,
            neighbors,
            reduction,
        })
    }
}
