//! Canonical quartz ordering
//!
//! Within a linear run of slots, interchangeable quartz produce the same
//! elemental totals regardless of order. Placing candidates in one
//! deterministic order and forbidding "backwards" picks turns the
//! permutation search into a combination search.
//!
//! The constraint applies only to nodes whose parent is not a branching
//! (shared) node: each line past a branch keeps an independent cursor, and
//! cursors are copied (never mutated in place) when recursing into a
//! sibling candidate, so sibling branches cannot observe each other's
//! ordering progress. That copy-on-branch semantics is what makes
//! backtracking correct without an explicit undo step.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;

use crate::domain::catalog::Catalog;
use crate::domain::tree::{OrbmentTree, SlotNode};

/// Total order over quartz names. The two policies are interchangeable for
/// correctness; the choice is configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// Prioritized names first (alphabetical within), then the rest
    /// alphabetically.
    Priority { prioritized: BTreeSet<String> },
    /// Descending total element contribution, ties broken alphabetically.
    #[default]
    ElementWeight,
}

impl OrderingPolicy {
    /// Sort the available pool into the canonical candidate order.
    pub fn sort<'a>(&self, available: &'a BTreeSet<String>, catalog: &Catalog) -> Vec<&'a str> {
        match self {
            OrderingPolicy::Priority { prioritized } => {
                // BTreeSet iteration is already alphabetical.
                let (first, rest): (Vec<&str>, Vec<&str>) = available
                    .iter()
                    .map(String::as_str)
                    .partition(|name| prioritized.contains(*name));
                first.into_iter().chain(rest).collect()
            }
            OrderingPolicy::ElementWeight => available
                .iter()
                .map(String::as_str)
                .sorted_by_key(|name| {
                    let weight = catalog
                        .quartz(name)
                        .map(|q| q.element_weight())
                        .unwrap_or(0);
                    (std::cmp::Reverse(weight), *name)
                })
                .collect(),
        }
    }
}

/// Per-line "last accepted index" cursors.
///
/// Cloned on every branch; see the module docs.
#[derive(Debug, Clone, Default)]
pub struct CanonicalOrdering {
    last_index_per_line: HashMap<usize, usize>,
}

impl CanonicalOrdering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordering applies only within a line's linear run: the node must have
    /// a parent and that parent must not be a branching node.
    pub fn applies(tree: &OrbmentTree, node: &SlotNode) -> bool {
        node.parent.is_some() && !tree.parent_is_shared(node)
    }

    /// Whether the candidate at `index` in the canonical order violates the
    /// ordering constraint for this node's line.
    pub fn should_skip(&self, tree: &OrbmentTree, node: &SlotNode, index: usize) -> bool {
        if !Self::applies(tree, node) {
            return false;
        }
        match node.line.and_then(|l| self.last_index_per_line.get(&l)) {
            Some(last) => index <= *last,
            None => false,
        }
    }

    /// Record an accepted candidate index for this node's line.
    ///
    /// Recording is unconditional for any node that belongs to a line, even
    /// the line's first slot (where `should_skip` never rejects): without
    /// it, the first two slots of a line would enumerate both orders of
    /// every pair. The shared root belongs to no line and records nothing.
    pub fn record(&mut self, node: &SlotNode, index: usize) {
        if let Some(line) = node.line {
            self.last_index_per_line.insert(line, index);
        }
    }
}
