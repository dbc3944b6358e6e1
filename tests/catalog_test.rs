//! Tests against the shipped game data files

use std::collections::BTreeSet;
use std::path::Path;

use orbment::domain::{Catalog, OrbmentTree, OrderingPolicy, QuartzType};
use orbment::solver::{BuildFinder, Gating};
use orbment::util::testing;

fn load_catalog() -> Catalog {
    testing::init_test_setup();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    Catalog::load(&dir).expect("shipped data files parse")
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn given_shipped_data_then_catalog_loads_with_lookups() {
    let catalog = load_catalog();

    let ruby = catalog.quartz("Ruby Blade").unwrap();
    assert_eq!(ruby.typ, QuartzType::Blade);
    assert_eq!(ruby.quartz_element.as_deref(), Some("Fire"));

    let teara = catalog.art("Teara").unwrap();
    assert_eq!(teara.requirements.get("Water"), Some(&4));

    assert!(catalog.character("Estelle").is_ok());
    assert!(catalog.character("Nobody").is_err());
}

#[test]
fn given_estelle_then_tree_has_shared_root_and_two_lines() {
    let catalog = load_catalog();
    let estelle = catalog.character("Estelle").unwrap();

    let tree = OrbmentTree::build(estelle);

    // Shared root + 3 remaining on line 1 + 2 remaining on line 2.
    assert_eq!(tree.len(), 6);
    let root = tree.node(tree.root().unwrap());
    assert!(root.is_shared());
    assert_eq!(tree.paths().len(), 2);
}

#[test]
fn given_scherazard_then_tree_is_a_single_chain() {
    let catalog = load_catalog();
    let schera = catalog.character("Scherazard").unwrap();

    let tree = OrbmentTree::build(schera);

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.paths().len(), 1);
    assert_eq!(tree.node_at(2).restriction.as_deref(), Some("Water"));
}

#[test]
fn given_joshua_and_time_restriction_then_only_time_quartz_fits_it() {
    // Arrange: a pool with exactly one Time quartz; Clock Up needs Time 2,
    // reachable only through the restricted slot plus EP Cut 1 elsewhere.
    let catalog = load_catalog();
    let joshua = catalog.character("Joshua").unwrap();

    // Act
    let mut finder = BuildFinder::new(
        &catalog,
        joshua,
        names(&["Cast 2", "EP 1", "Mind 1"]),
        names(&["Clock Up"]),
        100,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();
    let builds = finder.find_builds();

    // Assert: every build routes Cast 2 through line 1 slot 1.
    assert!(!builds.is_empty());
    for build in &builds {
        let on_restricted = build
            .placements
            .iter()
            .find(|p| p.line_index == Some(0) && p.slot_index == 1)
            .map(|p| p.quartz.as_str());
        assert_eq!(on_restricted, Some("Cast 2"));
    }
}

#[test]
fn given_estelle_with_water_pool_then_healing_arts_unlock() {
    // Arrange
    let catalog = load_catalog();
    let estelle = catalog.character("Estelle").unwrap();

    // Act
    let mut finder = BuildFinder::new(
        &catalog,
        estelle,
        names(&["Mind 2", "EP 2", "Sapphire Shield"]),
        names(&["Tear"]),
        50,
        Gating::default(),
        OrderingPolicy::default(),
    )
    .unwrap();
    let builds = finder.find_builds();

    // Assert
    assert!(!builds.is_empty());
    for build in &builds {
        assert!(build.unlocked_arts.contains("Tear"));
        assert!(build.unlocked_arts.contains("Aqua Bleed"));
    }
}
