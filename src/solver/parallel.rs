//! Parallel decomposition of the search
//!
//! Splits only on the first node's legal candidates: one shared-nothing
//! worker per first choice, each owning its own tree clone, reduced pool
//! and fresh ordering cursors, running the full sequential recursion from
//! the second traversal index with its own result cap. Work assignment is
//! static; wall-clock time is bounded by the slowest branch, which the
//! per-worker cap headroom partially offsets.
//!
//! Every failure mode here (too few candidates, thread-pool construction
//! failure, a worker panic) degrades transparently to the sequential
//! engine; the caller never sees an error from this path.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::domain::entities::Build;
use crate::domain::ordering::CanonicalOrdering;
use crate::solver::engine::{reduce_pool, BuildFinder, Searcher};
use crate::solver::rank::rank_builds;

/// Extra results each worker may collect beyond its proportional share of
/// the global cap, to absorb uneven yield between branches.
const WORKER_HEADROOM: usize = 10;

impl BuildFinder<'_> {
    /// Run the search split across workers, one per legal first-node
    /// candidate. Same output contract as [`BuildFinder::find_builds`].
    #[instrument(level = "debug", skip(self))]
    pub fn find_builds_parallel(&mut self) -> Vec<Build> {
        if self.max_builds() == 0 || self.tree().is_empty() {
            return Vec::new();
        }

        let candidates = self.legal_first_candidates();
        if candidates.len() < 2 {
            debug!(
                candidates = candidates.len(),
                "too few first-node candidates, falling back to sequential"
            );
            return self.find_builds();
        }

        let thread_pool = match rayon::ThreadPoolBuilder::new().build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "thread pool unavailable, falling back to sequential");
                return self.find_builds();
            }
        };

        let worker_cap = self
            .max_builds()
            .saturating_mul(2)
            .div_ceil(candidates.len())
            .saturating_add(WORKER_HEADROOM);
        debug!(
            workers = candidates.len(),
            worker_cap, "dispatching parallel search"
        );

        let catalog = self.catalog();
        let parts = self.parts();
        let tree = self.tree();
        let pool = self.pool();
        let canonical = self.canonical_pool();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            thread_pool.install(|| {
                candidates
                    .par_iter()
                    .map(|(first_idx, first_name)| {
                        let Ok(first_quartz) = catalog.quartz(first_name) else {
                            return Vec::new();
                        };
                        // Exclusive per-worker state: own tree, own pool
                        // copy, own cursors with the first pick recorded.
                        let worker_tree = tree.clone();
                        let available = reduce_pool(pool, catalog, first_quartz);
                        let mut ordering = CanonicalOrdering::new();
                        ordering.record(worker_tree.node_at(0), *first_idx);

                        let mut placements: Vec<Option<String>> =
                            vec![None; worker_tree.len()];
                        placements[0] = Some(first_name.clone());

                        let mut searcher = Searcher {
                            parts,
                            tree: &worker_tree,
                            canonical: canonical.clone(),
                            cap: worker_cap,
                            builds: Vec::new(),
                            combinations_checked: 0,
                            progress: None,
                        };
                        searcher.explore(1, &available, &ordering, &mut placements);
                        searcher.builds
                    })
                    .collect::<Vec<Vec<Build>>>()
            })
        }));

        match outcome {
            Ok(per_worker) => {
                let mut builds: Vec<Build> = per_worker.into_iter().flatten().collect();
                builds.truncate(self.max_builds());
                rank_builds(self.catalog(), &mut builds);
                builds
            }
            Err(_) => {
                warn!("parallel dispatch panicked, falling back to sequential");
                self.find_builds()
            }
        }
    }
}
