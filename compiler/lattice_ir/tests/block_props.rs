//! Property tests for block construction, literal pooling, and interning.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use lattice_ir::visitor::{walk_stmt, Visitor};
use lattice_ir::{IrArena, StmtId, StmtKind, StringInterner};
use proptest::prelude::*;

/// Collects the integer payloads of `Print` statements in visit order.
#[derive(Default)]
struct PrintOrder {
    seen: Vec<i32>,
}

impl Visitor for PrintOrder {
    fn visit_stmt(&mut self, id: StmtId, arena: &IrArena) {
        if let StmtKind::Print { expr } = arena.stmt_kind(id) {
            self.seen.push(arena.literal_int_at(expr, 0));
        }
        walk_stmt(self, id, arena);
    }
}

fn numbered_prints(arena: &mut IrArena, len: i32) -> Vec<StmtId> {
    (0..len)
        .map(|i| {
            let value = arena.literal_int(i);
            arena.print(value)
        })
        .collect()
}

fn visit_order(arena: &IrArena, root: StmtId) -> Vec<i32> {
    let mut order = PrintOrder::default();
    order.visit_stmt(root, arena);
    order.seen
}

#[test]
fn chained_blocks_traverse_front_to_back() {
    let mut arena = IrArena::new();
    let prints = numbered_prints(&mut arena, 3);
    let tail = arena.block2(prints[1], prints[2], false);
    let root = arena.block2(prints[0], tail, false);
    assert_eq!(visit_order(&arena, root), vec![0, 1, 2]);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    // -- Block Trees --

    #[test]
    fn balanced_blocks_preserve_statement_order(len in 1i32..48) {
        let mut arena = IrArena::new();
        let stmts = numbered_prints(&mut arena, len);
        let root = arena.block(&stmts);

        let expected: Vec<i32> = (0..len).collect();
        prop_assert_eq!(visit_order(&arena, root), expected);
    }

    #[test]
    fn scoped_blocks_preserve_statement_order(len in 1i32..48) {
        let mut arena = IrArena::new();
        let stmts = numbered_prints(&mut arena, len);
        let root = arena.scoped_block(&stmts);

        prop_assert!(
            matches!(
                arena.stmt_kind(root),
                StmtKind::Block { scoped: true, .. }
            ),
            "expected a scoped block"
        );
        let expected: Vec<i32> = (0..len).collect();
        prop_assert_eq!(visit_order(&arena, root), expected);
    }

    // -- Literal Pool --

    #[test]
    fn int_literals_round_trip(value in any::<i32>()) {
        let mut arena = IrArena::new();
        let id = arena.literal_int(value);
        prop_assert_eq!(arena.literal_int_at(id, 0), value);
    }

    #[test]
    fn float_literals_round_trip(value in -1e300f64..1e300) {
        let mut arena = IrArena::new();
        let id = arena.literal_float(value);
        prop_assert_eq!(arena.literal_float_at(id, 0).to_bits(), value.to_bits());
    }

    #[test]
    fn literal_equality_follows_value_equality(a in any::<i32>(), b in any::<i32>()) {
        let mut arena = IrArena::new();
        let left = arena.literal_int(a);
        let right = arena.literal_int(b);
        prop_assert_eq!(arena.literal_eq(left, right), a == b);
        prop_assert!(arena.literal_eq(left, left));
    }

    // -- Interning --

    #[test]
    fn interned_names_round_trip(text in "[a-z][a-z0-9_]{0,12}") {
        let interner = StringInterner::new();
        let name = interner.intern(&text);
        prop_assert_eq!(interner.lookup(name), text.as_str());
        prop_assert_eq!(interner.intern(&text), name);
    }
}
