//! Post-search ranking
//!
//! Ability coverage is recomputed for every collected build from its
//! recorded placements, independent of the incremental result at discovery
//! time, before sorting. Ranking an already-ranked list is a no-op.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::domain::catalog::Catalog;
use crate::domain::entities::Build;

/// Recompute unlocked arts for each build and sort: unlocked-art count
/// descending, then the lexicographic sequence of placed quartz names
/// (explicit secondary key so equal counts stay deterministic); remaining
/// ties keep discovery order (stable sort).
pub fn rank_builds(catalog: &Catalog, builds: &mut [Build]) {
    for build in builds.iter_mut() {
        recompute_arts(catalog, build);
    }
    builds.sort_by(|a, b| {
        b.total_arts.cmp(&a.total_arts).then_with(|| {
            a.placements
                .iter()
                .map(|p| p.quartz.as_str())
                .cmp(b.placements.iter().map(|p| p.quartz.as_str()))
        })
    });
}

/// Recompute a build's unlocked arts from its placements.
///
/// Arts unlock per line: the shared-root quartz counts toward every line,
/// and each line's totals must meet an art's requirements on their own.
pub fn recompute_arts(catalog: &Catalog, build: &mut Build) {
    let shared = build.shared_quartz();
    let lines: Vec<usize> = build
        .placements
        .iter()
        .filter_map(|p| p.line_index)
        .unique()
        .collect();

    let mut unlocked = BTreeSet::new();
    if lines.is_empty() {
        // Degenerate build with only the shared slot filled.
        if let Ok(arts) = catalog.unlocked_by_line(shared.into_iter()) {
            unlocked.extend(arts);
        }
    } else {
        for line in lines {
            let names = shared.into_iter().chain(build.quartz_on_line(line));
            if let Ok(arts) = catalog.unlocked_by_line(names) {
                unlocked.extend(arts);
            }
        }
    }

    build.total_arts = unlocked.len();
    build.unlocked_arts = unlocked;
}
