//! Intrinsic function declarations and the per-compilation context.

use lattice_types::{Name, SharedInterner};
use rustc_hash::FxHashMap;

use crate::func::{Func, FuncBuilder, FuncKind};

/// Names of the built-in functions, in registration order.
pub const INTRINSIC_NAMES: &[&str] = &[
    "mod", "sin", "cos", "tan", "asin", "acos", "atan2", "sqrt", "log", "exp", "pow", "norm",
    "dot", "det", "inv", "solve", "loc",
];

/// Registry of intrinsic declarations.
///
/// Built once per compilation context; no process-wide table exists, so two
/// contexts never share declarations. Intrinsic signatures are shape-generic
/// (`norm` accepts a vector over any set), so the front end checks call
/// sites and each declaration carries empty argument and result lists.
#[derive(Clone)]
pub struct Intrinsics {
    by_name: FxHashMap<Name, Func>,
}

impl Intrinsics {
    /// Register every intrinsic against `interner`.
    pub fn new(interner: &SharedInterner) -> Self {
        let mut by_name = FxHashMap::default();
        for raw in INTRINSIC_NAMES {
            let name = interner.intern(raw);
            by_name.insert(name, FuncBuilder::new(name, FuncKind::Intrinsic).build());
        }
        tracing::debug!(count = by_name.len(), "registered intrinsics");
        Self { by_name }
    }

    /// The declaration for `name`, if `name` names an intrinsic.
    ///
    /// Repeated lookups return the same declaration entity.
    pub fn lookup(&self, name: Name) -> Option<&Func> {
        self.by_name.get(&name)
    }

    /// True if `name` names an intrinsic.
    pub fn contains(&self, name: Name) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Number of registered intrinsics.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Per-compilation context: the shared interner and the intrinsics
/// registered against it.
///
/// Consumers receive this value explicitly; nothing here lives in process
/// globals, so independent compilations cannot observe each other.
#[derive(Clone)]
pub struct IrContext {
    interner: SharedInterner,
    intrinsics: Intrinsics,
}

impl IrContext {
    /// A context with a fresh interner and its intrinsics.
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// A context over an existing interner.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let intrinsics = Intrinsics::new(&interner);
        Self { interner, intrinsics }
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }
}

impl Default for IrContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_declares_every_intrinsic() {
        let context = IrContext::new();
        assert_eq!(context.intrinsics().len(), INTRINSIC_NAMES.len());
        for raw in INTRINSIC_NAMES {
            let name = context.interner().intern(raw);
            let func = context
                .intrinsics()
                .lookup(name)
                .unwrap_or_else(|| panic!("{raw} is not registered"));
            assert_eq!(func.kind(), FuncKind::Intrinsic);
            assert_eq!(func.name(), name);
            assert!(func.arguments().is_empty());
            assert!(func.results().is_empty());
            assert!(func.is_declaration());
        }
    }

    #[test]
    fn repeated_lookup_returns_the_same_declaration() {
        let context = IrContext::new();
        let norm = context.interner().intern("norm");
        let first = context.intrinsics().lookup(norm).cloned();
        let second = context.intrinsics().lookup(norm).cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_names_are_not_intrinsics() {
        let context = IrContext::new();
        let gravity = context.interner().intern("gravity");
        assert!(context.intrinsics().lookup(gravity).is_none());
        assert!(!context.intrinsics().contains(gravity));
    }

    #[test]
    fn contexts_do_not_share_declarations() {
        let a = IrContext::new();
        let b = IrContext::new();
        let func_a = a.intrinsics().lookup(a.interner().intern("sqrt")).cloned();
        let func_b = b.intrinsics().lookup(b.interner().intern("sqrt")).cloned();
        assert_ne!(func_a, func_b);
    }
}
