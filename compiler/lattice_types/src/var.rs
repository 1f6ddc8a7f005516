//! Named, typed variables.

use crate::{Name, Type};

/// A variable: a name paired with its type.
///
/// Used for function arguments and results, declarations, loop variables,
/// and as the key of environment and storage maps. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Var {
    name: Name,
    ty: Type,
}

impl Var {
    pub fn new(name: Name, ty: Type) -> Self {
        Var { name, ty }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}
