//! Function entities.
//!
//! A [`Func`] is an immutable, shared entity: construction goes through
//! [`FuncBuilder`], and the `with_*` methods derive updated functions
//! instead of mutating in place. Cloning a `Func` shares it; equality is
//! identity, so two independently built functions are never equal even
//! with identical contents.

use std::fmt;
use std::sync::Arc;

use lattice_types::{Name, Storage, Var};

use crate::ids::{ExprId, StmtId};

/// The linkage/origin of a function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum FuncKind {
    /// Defined in this compilation unit; carries a body.
    Internal,
    /// Declared here, defined elsewhere; never carries a body.
    External,
    /// Built-in declaration from the intrinsics registry; never carries
    /// a body.
    Intrinsic,
}

/// The global bindings of a function.
///
/// An insertion-ordered map from global variable to its initializer
/// expression. Defining a name that is already bound replaces the
/// binding in place, keeping iteration order stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    globals: Vec<(Var, ExprId)>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Bind `var` to its initializer.
    pub fn define(&mut self, var: Var, init: ExprId) {
        if let Some(entry) = self.globals.iter_mut().find(|(v, _)| v.name() == var.name()) {
            *entry = (var, init);
        } else {
            self.globals.push((var, init));
        }
    }

    /// The binding for `name`, if one exists.
    pub fn get(&self, name: Name) -> Option<(&Var, ExprId)> {
        self.globals
            .iter()
            .find(|(v, _)| v.name() == name)
            .map(|(v, init)| (v, *init))
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Var, ExprId)> {
        self.globals.iter().map(|(v, init)| (v, *init))
    }
}

#[derive(Clone, Debug)]
struct FuncData {
    name: Name,
    kind: FuncKind,
    arguments: Vec<Var>,
    results: Vec<Var>,
    body: StmtId,
    environment: Environment,
    storage: Storage,
}

/// An immutable function entity.
///
/// `External` and `Intrinsic` functions are declarations: their `body` is
/// the undefined handle. Signatures live in `arguments`/`results`; the
/// body statement itself lives in the arena that built it.
#[derive(Clone)]
pub struct Func(Arc<FuncData>);

impl Func {
    pub fn name(&self) -> Name {
        self.0.name
    }

    pub fn kind(&self) -> FuncKind {
        self.0.kind
    }

    pub fn arguments(&self) -> &[Var] {
        &self.0.arguments
    }

    pub fn results(&self) -> &[Var] {
        &self.0.results
    }

    /// The body statement, or the undefined handle for declarations.
    pub fn body(&self) -> StmtId {
        self.0.body
    }

    pub fn is_declaration(&self) -> bool {
        !self.0.body.is_defined()
    }

    pub fn environment(&self) -> &Environment {
        &self.0.environment
    }

    pub fn storage(&self) -> &Storage {
        &self.0.storage
    }

    /// A function equal to this one with its body replaced.
    ///
    /// # Panics
    /// Panics when attaching a body to a declaration kind.
    pub fn with_body(&self, body: StmtId) -> Func {
        assert_declaration_bodyless(self.0.kind, self.0.name, body);
        let mut data = (*self.0).clone();
        data.body = body;
        Func(Arc::new(data))
    }

    /// A function equal to this one with its environment replaced.
    pub fn with_environment(&self, environment: Environment) -> Func {
        let mut data = (*self.0).clone();
        data.environment = environment;
        Func(Arc::new(data))
    }

    /// A function equal to this one with its storage descriptors
    /// replaced.
    pub fn with_storage(&self, storage: Storage) -> Func {
        let mut data = (*self.0).clone();
        data.storage = storage;
        Func(Arc::new(data))
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Func {}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field("arguments", &self.0.arguments)
            .field("results", &self.0.results)
            .field("body", &self.0.body)
            .finish_non_exhaustive()
    }
}

fn assert_declaration_bodyless(kind: FuncKind, name: Name, body: StmtId) {
    assert!(
        kind == FuncKind::Internal || !body.is_defined(),
        "{kind:?} function {name:?} cannot carry a body"
    );
}

/// Accumulates the parts of a [`Func`] and finalizes it with
/// [`FuncBuilder::build`]. No half-initialized function is observable.
#[derive(Debug)]
pub struct FuncBuilder {
    name: Name,
    kind: FuncKind,
    arguments: Vec<Var>,
    results: Vec<Var>,
    body: StmtId,
    environment: Environment,
    storage: Storage,
}

impl FuncBuilder {
    pub fn new(name: Name, kind: FuncKind) -> Self {
        FuncBuilder {
            name,
            kind,
            arguments: Vec::new(),
            results: Vec::new(),
            body: StmtId::INVALID,
            environment: Environment::new(),
            storage: Storage::new(),
        }
    }

    pub fn argument(mut self, var: Var) -> Self {
        self.arguments.push(var);
        self
    }

    pub fn arguments(mut self, vars: impl IntoIterator<Item = Var>) -> Self {
        self.arguments.extend(vars);
        self
    }

    pub fn result(mut self, var: Var) -> Self {
        self.results.push(var);
        self
    }

    pub fn results(mut self, vars: impl IntoIterator<Item = Var>) -> Self {
        self.results.extend(vars);
        self
    }

    pub fn body(mut self, body: StmtId) -> Self {
        self.body = body;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Finalize the function.
    ///
    /// # Panics
    /// Panics when a declaration kind was given a body.
    pub fn build(self) -> Func {
        assert_declaration_bodyless(self.kind, self.name, self.body);
        tracing::debug!(
            name = ?self.name,
            kind = ?self.kind,
            arguments = self.arguments.len(),
            results = self.results.len(),
            "finalized func"
        );
        Func(Arc::new(FuncData {
            name: self.name,
            kind: self.kind,
            arguments: self.arguments,
            results: self.results,
            body: self.body,
            environment: self.environment,
            storage: self.storage,
        }))
    }
}
