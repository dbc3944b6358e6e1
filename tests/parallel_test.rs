//! Tests for the parallel search path

use std::collections::BTreeSet;

use orbment::domain::{Art, Build, Catalog, Character, Line, OrderingPolicy, Quartz, QuartzType, Slot};
use orbment::solver::{BuildFinder, Gating};

fn quartz(name: &str, elements: &[(&str, u32)]) -> Quartz {
    Quartz {
        name: name.to_string(),
        family: name.to_string(),
        typ: QuartzType::Regular,
        elements: elements.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        quartz_element: None,
        effects: None,
        description: None,
    }
}

fn art(name: &str, requirements: &[(&str, u32)]) -> Art {
    Art {
        name: name.to_string(),
        element: requirements
            .first()
            .map(|(e, _)| *e)
            .unwrap_or("")
            .to_string(),
        requirements: requirements
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
        ep_cost: None,
        effect: None,
        range: None,
        description: None,
    }
}

fn chain(len: usize) -> Character {
    Character {
        name: "Test".to_string(),
        description: String::new(),
        lines: vec![Line {
            name: "Line 1".to_string(),
            color: "orange".to_string(),
            slots: (0..len)
                .map(|index| Slot {
                    index,
                    restriction: None,
                    shared: false,
                })
                .collect(),
        }],
    }
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fire_catalog(count: usize) -> (Catalog, Vec<String>) {
    let all: Vec<String> = (0..count).map(|i| format!("Fire {i}")).collect();
    let catalog = Catalog::from_parts(
        all.iter().map(|n| quartz(n, &[("Fire", 1)])).collect(),
        vec![art("Spark", &[("Fire", 1)])],
        vec![],
    );
    (catalog, all)
}

/// Builds compared as order-independent sets of placement sequences.
fn as_sets(builds: &[Build]) -> BTreeSet<Vec<String>> {
    builds
        .iter()
        .map(|b| b.placements.iter().map(|p| p.quartz.clone()).collect())
        .collect()
}

#[test]
fn given_uncapped_search_then_parallel_finds_same_builds_as_sequential() {
    // Arrange
    let (catalog, all) = fire_catalog(6);
    let character = chain(3);
    let pool: BTreeSet<String> = all.iter().cloned().collect();
    let arts = names(&["Spark"]);

    let run = |parallel: bool| {
        let mut finder = BuildFinder::new(
            &catalog,
            &character,
            pool.clone(),
            arts.clone(),
            1000,
            Gating::default(),
            OrderingPolicy::default(),
        )
        .unwrap();
        if parallel {
            finder.find_builds_parallel()
        } else {
            finder.find_builds()
        }
    };

    // Act
    let sequential = run(false);
    let parallel = run(true);

    // Assert: C(6, 3) = 20 builds either way, identical as sets.
    assert_eq!(sequential.len(), 20);
    assert_eq!(as_sets(&parallel), as_sets(&sequential));
}

#[test]
fn given_parallel_results_then_they_are_ranked() {
    let (catalog, all) = fire_catalog(5);
    let character = chain(2);

    let mut finder = BuildFinder::new(
        &catalog,
        &character,
        all.iter().cloned().collect(),
        names(&["Spark"]),
        1000,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();
    let builds = finder.find_builds_parallel();

    assert_eq!(builds.len(), 10);
    for pair in builds.windows(2) {
        assert!(pair[0].total_arts >= pair[1].total_arts);
    }
}

#[test]
fn given_capped_parallel_search_then_cap_is_respected() {
    let (catalog, all) = fire_catalog(6);
    let character = chain(3);

    let mut finder = BuildFinder::new(
        &catalog,
        &character,
        all.iter().cloned().collect(),
        names(&["Spark"]),
        5,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();
    let builds = finder.find_builds_parallel();

    assert_eq!(builds.len(), 5);
}

#[test]
fn given_enormous_cap_then_parallel_search_completes() {
    let (catalog, all) = fire_catalog(4);
    let character = chain(2);

    let mut finder = BuildFinder::new(
        &catalog,
        &character,
        all.iter().cloned().collect(),
        names(&["Spark"]),
        usize::MAX,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();

    assert_eq!(finder.find_builds_parallel().len(), 6);
}

#[test]
fn given_cap_of_zero_then_parallel_returns_nothing() {
    let (catalog, all) = fire_catalog(4);
    let character = chain(2);

    let mut finder = BuildFinder::new(
        &catalog,
        &character,
        all.iter().cloned().collect(),
        names(&["Spark"]),
        0,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();

    assert!(finder.find_builds_parallel().is_empty());
}

#[test]
fn given_single_legal_first_candidate_then_falls_back_to_sequential() {
    // Arrange: the first slot is Time-restricted and only Cast 1 fits, so
    // there is nothing to split on.
    let catalog = Catalog::from_parts(
        vec![
            quartz("Cast 1", &[("Time", 1)]),
            quartz("Mind 1", &[("Water", 1)]),
            quartz("EP 1", &[("Water", 1)]),
        ],
        vec![art("Tear", &[("Water", 1)])],
        vec![],
    );
    let character = Character {
        name: "Test".to_string(),
        description: String::new(),
        lines: vec![Line {
            name: "Line 1".to_string(),
            color: "orange".to_string(),
            slots: vec![
                Slot {
                    index: 0,
                    restriction: Some("Time".to_string()),
                    shared: false,
                },
                Slot {
                    index: 1,
                    restriction: None,
                    shared: false,
                },
                Slot {
                    index: 2,
                    restriction: None,
                    shared: false,
                },
            ],
        }],
    };
    let pool = names(&["Cast 1", "Mind 1", "EP 1"]);

    let run = |parallel: bool| {
        let mut finder = BuildFinder::new(
            &catalog,
            &character,
            pool.clone(),
            names(&["Tear"]),
            100,
            Gating::default(),
            OrderingPolicy::default(),
        )
        .unwrap();
        if parallel {
            finder.find_builds_parallel()
        } else {
            finder.find_builds()
        }
    };

    // Act / Assert: identical output, including order.
    assert_eq!(run(true), run(false));
}
