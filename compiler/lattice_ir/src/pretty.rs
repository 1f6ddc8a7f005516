//! IR pretty printer.
//!
//! Renders expressions, statements, and functions to text through the
//! interner. The output is a debug aid for reading lowering results and
//! test failures, not a parseable format: binary operators are always
//! parenthesized rather than tracking precedence.

use lattice_types::{
    ComponentType, IndexDomain, IndexSet, IndexVar, Name, StringInterner, TensorType, Type, Var,
};

use crate::arena::IrArena;
use crate::expr::{ExprKind, TensorIndexReadKind};
use crate::func::{Func, FuncKind};
use crate::ids::{ExprId, ExprRange, IndexVarRange, StmtId};
use crate::stmt::StmtKind;

/// Render one expression.
pub fn print_expr(arena: &IrArena, interner: &StringInterner, id: ExprId) -> String {
    Printer::new(arena, interner).expr(id)
}

/// Render one statement; every simple statement gets its own line.
pub fn print_stmt(arena: &IrArena, interner: &StringInterner, id: StmtId) -> String {
    let mut printer = Printer::new(arena, interner);
    printer.stmt(id);
    printer.output
}

/// Render a function: signature, environment globals, body.
pub fn print_func(arena: &IrArena, interner: &StringInterner, func: &Func) -> String {
    let mut printer = Printer::new(arena, interner);
    printer.func(func);
    printer.output
}

struct Printer<'a> {
    arena: &'a IrArena,
    interner: &'a StringInterner,
    indent: usize,
    output: String,
}

impl<'a> Printer<'a> {
    fn new(arena: &'a IrArena, interner: &'a StringInterner) -> Self {
        Printer {
            arena,
            interner,
            indent: 0,
            output: String::with_capacity(256),
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn writeln(&mut self, line: &str) {
        self.write_indent();
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn expr(&self, id: ExprId) -> String {
        match self.arena.expr_kind(id) {
            ExprKind::Literal { .. } => self.literal(id),
            ExprKind::Var(var) => self.name(self.arena.var(var).name()).to_string(),
            ExprKind::Load { buffer, index } => {
                format!("{}[{}]", self.expr(buffer), self.expr(index))
            }
            ExprKind::FieldRead { target, field } => {
                format!("{}.{}", self.expr(target), self.name(field))
            }
            ExprKind::Call { callee, args } => {
                let callee = self.name(self.arena.func(callee).name());
                format!("{}({})", callee, self.expr_list(args))
            }
            ExprKind::Length { set } => {
                format!("|{}|", self.index_set_text(self.arena.index_set(set)))
            }
            ExprKind::TensorIndexRead { index, loc, read } => {
                let index = self.name(self.arena.tensor_index(index).name());
                let array = match read {
                    TensorIndexReadKind::Coordinates => "coords",
                    TensorIndexReadKind::Sinks => "sinks",
                };
                format!("{index}.{array}[{}]", self.expr(loc))
            }
            ExprKind::Neg(operand) => format!("-{}", self.expr(operand)),
            ExprKind::Not(operand) => format!("not {}", self.expr(operand)),
            ExprKind::Add(left, right) => self.binary("+", left, right),
            ExprKind::Sub(left, right) => self.binary("-", left, right),
            ExprKind::Mul(left, right) => self.binary("*", left, right),
            ExprKind::Div(left, right) => self.binary("/", left, right),
            ExprKind::And(left, right) => self.binary("and", left, right),
            ExprKind::Or(left, right) => self.binary("or", left, right),
            ExprKind::Xor(left, right) => self.binary("xor", left, right),
            ExprKind::Eq(left, right) => self.binary("==", left, right),
            ExprKind::Ne(left, right) => self.binary("!=", left, right),
            ExprKind::Gt(left, right) => self.binary(">", left, right),
            ExprKind::Lt(left, right) => self.binary("<", left, right),
            ExprKind::Ge(left, right) => self.binary(">=", left, right),
            ExprKind::Le(left, right) => self.binary("<=", left, right),
            ExprKind::TupleRead { tuple, index } => {
                format!("{}({})", self.expr(tuple), self.expr(index))
            }
            ExprKind::TensorRead { tensor, indices } => {
                format!("{}({})", self.expr(tensor), self.expr_list(indices))
            }
            ExprKind::IndexedTensor { tensor, vars } => {
                format!("{}({})", self.expr(tensor), self.index_var_list_text(vars))
            }
            ExprKind::IndexExpr { vars, value } => {
                format!("({}) {}", self.index_var_list_text(vars), self.expr(value))
            }
        }
    }

    fn binary(&self, token: &str, left: ExprId, right: ExprId) -> String {
        format!("({} {token} {})", self.expr(left), self.expr(right))
    }

    fn expr_list(&self, range: ExprRange) -> String {
        let parts: Vec<String> = self
            .arena
            .get_expr_list(range)
            .iter()
            .map(|&id| self.expr(id))
            .collect();
        parts.join(", ")
    }

    fn index_var_list_text(&self, range: IndexVarRange) -> String {
        let parts: Vec<String> = self
            .arena
            .get_index_var_list(range)
            .iter()
            .map(|var| self.index_var_text(var))
            .collect();
        parts.join(", ")
    }

    fn index_var_text(&self, var: &IndexVar) -> String {
        match var.reduction().token() {
            Some(token) => format!("{token}{}", self.name(var.name())),
            None => self.name(var.name()).to_string(),
        }
    }

    fn literal(&self, id: ExprId) -> String {
        let ty = self.arena.expr_type(id).expect_tensor();
        let component = ty.component();
        let scalar = ty.is_scalar();
        let elements: Vec<String> = match component {
            ComponentType::Bool => self
                .arena
                .literal_bytes(id)
                .iter()
                .map(|byte| if *byte == 0 { "false" } else { "true" }.to_string())
                .collect(),
            ComponentType::Int => {
                let count = self.arena.literal_bytes(id).len() / component.size_in_bytes();
                (0..count)
                    .map(|i| self.arena.literal_int_at(id, i).to_string())
                    .collect()
            }
            ComponentType::Float => {
                let count = self.arena.literal_bytes(id).len() / component.size_in_bytes();
                (0..count)
                    .map(|i| format!("{:?}", self.arena.literal_float_at(id, i)))
                    .collect()
            }
        };
        if scalar {
            elements.join(", ")
        } else {
            format!("[{}]", elements.join(", "))
        }
    }

    fn stmt(&mut self, id: StmtId) {
        match self.arena.stmt_kind(id) {
            StmtKind::VarDecl { var } => {
                let var = self.arena.var(var);
                let line = format!("var {} : {};", self.name(var.name()), self.type_text(var.ty()));
                self.writeln(&line);
            }
            StmtKind::Assign { var, value, op } => {
                let target = self.name(self.arena.var(var).name());
                let line = format!("{target} {} {};", op.assign_token(), self.expr(value));
                self.writeln(&line);
            }
            StmtKind::Store { buffer, index, value, op } => {
                let line = format!(
                    "{}[{}] {} {};",
                    self.expr(buffer),
                    self.expr(index),
                    op.assign_token(),
                    self.expr(value)
                );
                self.writeln(&line);
            }
            StmtKind::FieldWrite { target, field, value, op } => {
                let line = format!(
                    "{}.{} {} {};",
                    self.expr(target),
                    self.name(field),
                    op.assign_token(),
                    self.expr(value)
                );
                self.writeln(&line);
            }
            StmtKind::TensorWrite { tensor, indices, value, op } => {
                let line = format!(
                    "{}({}) {} {};",
                    self.expr(tensor),
                    self.expr_list(indices),
                    op.assign_token(),
                    self.expr(value)
                );
                self.writeln(&line);
            }
            StmtKind::CallStmt { results, callee, args } => {
                let results: Vec<&str> = self
                    .arena
                    .get_var_list(results)
                    .iter()
                    .map(|var| self.name(var.name()))
                    .collect();
                let callee = self.name(self.arena.func(callee).name());
                let call = format!("{callee}({});", self.expr_list(args));
                if results.is_empty() {
                    self.writeln(&call);
                } else {
                    let line = format!("{} = {call}", results.join(", "));
                    self.writeln(&line);
                }
            }
            StmtKind::Block { first, rest, .. } => {
                self.stmt(first);
                if rest.is_defined() {
                    self.stmt(rest);
                }
            }
            StmtKind::IfThenElse { cond, then_body, else_body } => {
                let header = format!("if {}", self.expr(cond));
                self.writeln(&header);
                self.indent += 1;
                self.stmt(then_body);
                self.indent -= 1;
                if else_body.is_defined() {
                    self.writeln("else");
                    self.indent += 1;
                    self.stmt(else_body);
                    self.indent -= 1;
                }
                self.writeln("end");
            }
            StmtKind::ForRange { var, start, end, body } => {
                let var = self.name(self.arena.var(var).name());
                let header = format!("for {var} in {}:{}", self.expr(start), self.expr(end));
                self.writeln(&header);
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
                self.writeln("end");
            }
            StmtKind::While { cond, body } => {
                let header = format!("while {}", self.expr(cond));
                self.writeln(&header);
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
                self.writeln("end");
            }
            StmtKind::Kernel { var, domain, body } => {
                let var = self.name(self.arena.var(var).name());
                let domain = self.domain_text(self.arena.index_domain(domain));
                let header = format!("kernel {var} in {domain}");
                self.writeln(&header);
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
                self.writeln("end");
            }
            StmtKind::Print { expr } => {
                let line = format!("print {};", self.expr(expr));
                self.writeln(&line);
            }
            StmtKind::Comment { text, inner, header_space, footer_space } => {
                if header_space {
                    self.newline();
                }
                let line = format!("% {}", self.name(text));
                self.writeln(&line);
                if inner.is_defined() {
                    self.stmt(inner);
                }
                if footer_space {
                    self.newline();
                }
            }
            StmtKind::Pass => self.writeln("pass;"),
            StmtKind::Map { vars, function, partial_actuals, target, neighbors, reduction } => {
                let vars: Vec<&str> = self
                    .arena
                    .get_var_list(vars)
                    .iter()
                    .map(|var| self.name(var.name()))
                    .collect();
                let mut line = String::new();
                if !vars.is_empty() {
                    line.push_str(&vars.join(", "));
                    line.push_str(" = ");
                }
                line.push_str("map ");
                line.push_str(self.name(self.arena.func(function).name()));
                let actuals = self.expr_list(partial_actuals);
                if !actuals.is_empty() {
                    line.push('(');
                    line.push_str(&actuals);
                    line.push(')');
                }
                line.push_str(" to ");
                line.push_str(&self.expr(target));
                if neighbors.is_defined() {
                    line.push_str(" through ");
                    line.push_str(&self.expr(neighbors));
                }
                if let Some(token) = reduction.token() {
                    line.push_str(" reduce ");
                    line.push_str(token);
                }
                line.push(';');
                self.writeln(&line);
            }
        }
    }

    fn func(&mut self, func: &Func) {
        let mut header = String::new();
        match func.kind() {
            FuncKind::Internal => {}
            FuncKind::External => header.push_str("extern "),
            FuncKind::Intrinsic => header.push_str("intrinsic "),
        }
        header.push_str("func ");
        header.push_str(self.name(func.name()));
        header.push('(');
        header.push_str(&self.var_list_text(func.arguments()));
        header.push(')');
        if !func.results().is_empty() {
            header.push_str(" -> (");
            header.push_str(&self.var_list_text(func.results()));
            header.push(')');
        }
        if func.is_declaration() {
            header.push(';');
            self.writeln(&header);
            return;
        }
        self.writeln(&header);
        self.indent += 1;
        let globals: Vec<String> = func
            .environment()
            .iter()
            .map(|(var, init)| {
                format!(
                    "const {} : {} = {};",
                    self.name(var.name()),
                    self.type_text(var.ty()),
                    self.expr(init)
                )
            })
            .collect();
        for line in globals {
            self.writeln(&line);
        }
        self.stmt(func.body());
        self.indent -= 1;
        self.writeln("end");
    }

    fn var_list_text(&self, vars: &[Var]) -> String {
        let parts: Vec<String> = vars
            .iter()
            .map(|var| format!("{} : {}", self.name(var.name()), self.type_text(var.ty())))
            .collect();
        parts.join(", ")
    }

    fn type_text(&self, ty: &Type) -> String {
        match ty {
            Type::Tensor(tensor) => self.tensor_type_text(tensor),
            Type::Element(element) => self.name(element.name()).to_string(),
            Type::Set(set) => {
                let element = self.name(set.element().name());
                if set.is_edge_set() {
                    format!("set{{{element}}}({})", set.endpoints())
                } else {
                    format!("set{{{element}}}")
                }
            }
            Type::Tuple(tuple) => {
                format!("({}*{})", self.name(tuple.element().name()), tuple.size())
            }
        }
    }

    fn tensor_type_text(&self, tensor: &TensorType) -> String {
        if tensor.is_scalar() {
            return tensor.component().to_string();
        }
        let outers: Vec<String> = tensor
            .dimensions()
            .iter()
            .map(|dim| self.index_set_text(dim.outer()))
            .collect();
        let inner = if tensor.is_blocked() {
            self.type_text(&tensor.block_type())
        } else {
            tensor.component().to_string()
        };
        format!("tensor[{}]({inner})", outers.join(","))
    }

    fn domain_text(&self, domain: &IndexDomain) -> String {
        let parts: Vec<String> = domain
            .index_sets()
            .iter()
            .map(|set| self.index_set_text(set))
            .collect();
        parts.join(",")
    }

    fn index_set_text(&self, set: &IndexSet) -> String {
        match set {
            IndexSet::Range(size) => size.to_string(),
            IndexSet::Set(name) => self.name(*name).to_string(),
            IndexSet::Dynamic => "*".to_string(),
        }
    }
}
