//! Sequential backtracking search engine
//!
//! Depth-first search over the tree's fixed traversal order. The whole pool
//! is sorted into canonical order once per search; at each node the still
//! available candidates are visited in that fixed order, and the ordering
//! cursors compare positions in it (a stable frame of reference, so a
//! cursor recorded at one depth stays meaningful at the next). Each legal
//! candidate is placed, the pool is reduced (the placed item plus its whole
//! family), and the search recurses with a branch-local copy of the
//! cursors. Placement state lives in a plain vector indexed by traversal
//! position, so backtracking is a single slot reset.
//!
//! The search is fully deterministic for a given catalog, pool and
//! ordering policy. The only cancellation mechanism is the result cap,
//! checked on entry to every node step.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::domain::catalog::Catalog;
use crate::domain::entities::{Build, Character, Placement, Quartz, QuartzType};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ordering::{CanonicalOrdering, OrderingPolicy};
use crate::domain::tree::{OrbmentTree, SlotNode};
use crate::solver::rank::rank_builds;

/// Which quartz must appear in a build for it to be accepted.
///
/// The two policies are distinct modes, selected per search; they are never
/// merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gating {
    /// Every member must appear somewhere in the placements.
    RequiredQuartz(BTreeSet<String>),
    /// Every member must appear, but only when the filter is enabled.
    PrioritizedFilter {
        prioritized: BTreeSet<String>,
        enabled: bool,
    },
}

impl Default for Gating {
    fn default() -> Self {
        Gating::RequiredQuartz(BTreeSet::new())
    }
}

/// Running counters reported to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    pub combinations_checked: u64,
    pub builds_found: usize,
}

/// Fire the progress callback every this many leaf evaluations.
const PROGRESS_INTERVAL: u64 = 100;

/// Exhaustive (capped) search for valid quartz builds.
pub struct BuildFinder<'a> {
    catalog: &'a Catalog,
    tree: OrbmentTree,
    pool: BTreeSet<String>,
    desired_arts: BTreeSet<String>,
    max_builds: usize,
    gating: Gating,
    policy: OrderingPolicy,
    progress: Option<Box<dyn FnMut(&SearchProgress) + 'a>>,
    combinations_checked: u64,
}

impl<'a> BuildFinder<'a> {
    /// Validate inputs and set up a search.
    ///
    /// Rejects an empty pool or desired-art set, and any quartz/art name
    /// absent from the catalog (including gating members): callers must
    /// only pass names the catalog knows.
    #[instrument(level = "debug", skip_all, fields(character = %character.name))]
    pub fn new(
        catalog: &'a Catalog,
        character: &Character,
        pool: BTreeSet<String>,
        desired_arts: BTreeSet<String>,
        max_builds: usize,
        gating: Gating,
        policy: OrderingPolicy,
    ) -> DomainResult<Self> {
        if pool.is_empty() {
            return Err(DomainError::EmptyQuartzPool);
        }
        if desired_arts.is_empty() {
            return Err(DomainError::EmptyDesiredArts);
        }
        for name in &pool {
            catalog.quartz(name)?;
        }
        for name in &desired_arts {
            catalog.art(name)?;
        }
        let gating_names = match &gating {
            Gating::RequiredQuartz(set) => set,
            Gating::PrioritizedFilter { prioritized, .. } => prioritized,
        };
        for name in gating_names {
            catalog.quartz(name)?;
        }

        let tree = OrbmentTree::build(character);
        debug!(
            slots = tree.len(),
            pool = pool.len(),
            arts = desired_arts.len(),
            max_builds,
            "build finder initialized"
        );

        Ok(Self {
            catalog,
            tree,
            pool,
            desired_arts,
            max_builds,
            gating,
            policy,
            progress: None,
            combinations_checked: 0,
        })
    }

    /// Install a progress callback, fired every 100 leaf evaluations.
    /// Only the sequential search reports progress.
    pub fn set_progress(&mut self, callback: impl FnMut(&SearchProgress) + 'a) {
        self.progress = Some(Box::new(callback));
    }

    /// Leaf evaluations performed by the last search.
    pub fn combinations_checked(&self) -> u64 {
        self.combinations_checked
    }

    pub fn tree(&self) -> &OrbmentTree {
        &self.tree
    }

    pub(crate) fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub(crate) fn pool(&self) -> &BTreeSet<String> {
        &self.pool
    }

    pub(crate) fn max_builds(&self) -> usize {
        self.max_builds
    }

    /// The whole pool in canonical candidate order. Cursor indices are
    /// positions in this sequence.
    pub(crate) fn canonical_pool(&self) -> Vec<&str> {
        self.policy.sort(&self.pool, self.catalog)
    }

    pub(crate) fn parts(&self) -> SearchParts<'_> {
        SearchParts {
            catalog: self.catalog,
            desired_arts: &self.desired_arts,
            gating: &self.gating,
        }
    }

    /// Run the sequential search and return the ranked builds, at most
    /// `max_builds` of them.
    #[instrument(level = "debug", skip(self))]
    pub fn find_builds(&mut self) -> Vec<Build> {
        if self.tree.is_empty() {
            return Vec::new();
        }

        let mut placements: Vec<Option<String>> = vec![None; self.tree.len()];
        let parts = SearchParts {
            catalog: self.catalog,
            desired_arts: &self.desired_arts,
            gating: &self.gating,
        };
        let canonical = self.policy.sort(&self.pool, self.catalog);
        let mut searcher = Searcher {
            parts,
            tree: &self.tree,
            canonical,
            cap: self.max_builds,
            builds: Vec::new(),
            combinations_checked: 0,
            progress: self
                .progress
                .as_mut()
                .map(|cb| &mut **cb as &mut dyn FnMut(&SearchProgress)),
        };

        searcher.explore(0, &self.pool, &CanonicalOrdering::new(), &mut placements);

        self.combinations_checked = searcher.combinations_checked;
        let mut builds = searcher.builds;
        debug!(
            builds = builds.len(),
            combinations = self.combinations_checked,
            "sequential search finished"
        );
        rank_builds(self.catalog, &mut builds);
        builds
    }

    /// The canonically ordered, restriction-legal candidates for the very
    /// first node, exactly as the sequential engine would compute them.
    /// Indices are positions in the canonical pool order.
    pub(crate) fn legal_first_candidates(&self) -> Vec<(usize, String)> {
        if self.tree.is_empty() {
            return Vec::new();
        }
        let node = self.tree.node_at(0);
        self.canonical_pool()
            .into_iter()
            .enumerate()
            .filter(|(_, name)| match self.catalog.quartz(name) {
                Ok(quartz) => restriction_ok(node, quartz),
                Err(_) => false,
            })
            .map(|(idx, name)| (idx, name.to_string()))
            .collect()
    }
}

/// The read-only pieces of a search, shared between the sequential engine
/// and the parallel workers.
#[derive(Clone, Copy)]
pub(crate) struct SearchParts<'a> {
    pub catalog: &'a Catalog,
    pub desired_arts: &'a BTreeSet<String>,
    pub gating: &'a Gating,
}

/// One search run: recursion state plus collected results.
pub(crate) struct Searcher<'a> {
    pub parts: SearchParts<'a>,
    pub tree: &'a OrbmentTree,
    /// Pool in canonical order; cursor indices point into this.
    pub canonical: Vec<&'a str>,
    pub cap: usize,
    pub builds: Vec<Build>,
    pub combinations_checked: u64,
    pub progress: Option<&'a mut dyn FnMut(&SearchProgress)>,
}

impl Searcher<'_> {
    /// Place candidates at `pos` and recurse; explicit backtrack on return.
    pub fn explore(
        &mut self,
        pos: usize,
        available: &BTreeSet<String>,
        ordering: &CanonicalOrdering,
        placements: &mut Vec<Option<String>>,
    ) {
        // Hard global cutoff, polled at entry to every node step.
        if self.builds.len() >= self.cap {
            return;
        }
        if pos == self.tree.len() {
            self.evaluate_leaf(placements);
            return;
        }
        if available.is_empty() {
            // Pool exhausted: the remaining slots can only stay empty, so
            // evaluate the partial assignment as-is.
            self.evaluate_leaf(placements);
            return;
        }

        let node = self.tree.node_at(pos);
        let candidates: Vec<(usize, &str)> = self
            .canonical
            .iter()
            .enumerate()
            .filter(|(_, name)| available.contains(**name))
            .map(|(idx, &name)| (idx, name))
            .collect();

        for (idx, name) in candidates {
            if self.builds.len() >= self.cap {
                break;
            }
            if ordering.should_skip(self.tree, node, idx) {
                continue;
            }
            let Ok(quartz) = self.parts.catalog.quartz(name) else {
                continue;
            };
            if !restriction_ok(node, quartz) {
                continue;
            }
            if !line_type_ok(self.parts.catalog, self.tree, node, quartz, placements) {
                continue;
            }

            placements[pos] = Some(name.to_string());
            let reduced = reduce_pool(available, self.parts.catalog, quartz);
            let mut branch_ordering = ordering.clone();
            branch_ordering.record(node, idx);

            self.explore(pos + 1, &reduced, &branch_ordering, placements);

            placements[pos] = None;
        }
    }

    /// Traversal complete: count the combination and accept it if every
    /// desired art is unlocked and the gating policy is satisfied.
    fn evaluate_leaf(&mut self, placements: &[Option<String>]) {
        self.combinations_checked += 1;
        if self.combinations_checked % PROGRESS_INTERVAL == 0 {
            let report = SearchProgress {
                combinations_checked: self.combinations_checked,
                builds_found: self.builds.len(),
            };
            if let Some(progress) = self.progress.as_mut() {
                progress(&report);
            }
        }

        let unlocked = unlocked_arts(self.parts.catalog, self.tree, placements);
        if !self
            .parts
            .desired_arts
            .iter()
            .all(|art| unlocked.contains(art))
        {
            return;
        }
        if !gating_satisfied(self.parts.gating, placements) {
            return;
        }

        let build = Build {
            placements: to_placements(self.tree, placements),
            total_arts: unlocked.len(),
            unlocked_arts: unlocked,
        };
        self.builds.push(build);
    }
}

/// Restriction check: no restriction always passes; otherwise the quartz
/// must match it (designated element, or positive contribution).
fn restriction_ok(node: &SlotNode, quartz: &Quartz) -> bool {
    match &node.restriction {
        Some(restriction) => quartz.matches_restriction(restriction),
        None => true,
    }
}

/// Per-line Blade/Shield exclusivity: reject a Blade or Shield when an
/// earlier slot on the same line already holds one of the same type. The
/// shared root never counts toward this rule.
fn line_type_ok(
    catalog: &Catalog,
    tree: &OrbmentTree,
    node: &SlotNode,
    quartz: &Quartz,
    placements: &[Option<String>],
) -> bool {
    if quartz.typ == QuartzType::Regular {
        return true;
    }
    let Some(line) = node.line else {
        // Shared root placement, exempt from the per-line rule.
        return true;
    };

    for pos in 0..node.position {
        if tree.node_at(pos).line != Some(line) {
            continue;
        }
        let Some(placed_name) = placements[pos].as_deref() else {
            continue;
        };
        if catalog.quartz(placed_name).map(|q| q.typ).ok() == Some(quartz.typ) {
            return false;
        }
    }
    true
}

/// Next-available pool after placing `quartz`: remove the placed item and
/// every remaining member of its family (family exclusivity is global,
/// at most one member per family across a whole build).
pub(crate) fn reduce_pool(
    available: &BTreeSet<String>,
    catalog: &Catalog,
    quartz: &Quartz,
) -> BTreeSet<String> {
    available
        .iter()
        .filter(|name| {
            catalog
                .quartz(name)
                .map(|q| q.family != quartz.family)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Arts unlocked by the completed tree: per root-to-leaf path, sum the
/// elements of the quartz placed along it; an art unlocks when one path
/// meets all of its requirements.
pub(crate) fn unlocked_arts(
    catalog: &Catalog,
    tree: &OrbmentTree,
    placements: &[Option<String>],
) -> BTreeSet<String> {
    let mut unlocked = BTreeSet::new();
    for path in tree.paths() {
        let names = path
            .iter()
            .filter_map(|&idx| placements[tree.node(idx).position].as_deref());
        if let Ok(arts) = catalog.unlocked_by_line(names) {
            unlocked.extend(arts);
        }
    }
    unlocked
}

pub(crate) fn gating_satisfied(gating: &Gating, placements: &[Option<String>]) -> bool {
    let contains = |name: &String| {
        placements
            .iter()
            .any(|p| p.as_deref() == Some(name.as_str()))
    };
    match gating {
        Gating::RequiredQuartz(required) => required.iter().all(contains),
        Gating::PrioritizedFilter {
            prioritized,
            enabled,
        } => !enabled || prioritized.iter().all(contains),
    }
}

/// Convert the placement vector into build records, in traversal order.
pub(crate) fn to_placements(tree: &OrbmentTree, placements: &[Option<String>]) -> Vec<Placement> {
    (0..tree.len())
        .filter_map(|pos| {
            let node = tree.node_at(pos);
            placements[pos].as_ref().map(|name| Placement {
                line_index: node.line,
                slot_index: node.slot_index,
                quartz: name.clone(),
                is_shared: node.line.is_none(),
            })
        })
        .collect()
}
