//! Game catalog: quartz, arts and character topology loaded from JSON
//!
//! The catalog is read-only after loading; the solver only ever borrows it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::entities::{Art, Character, Quartz};
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Deserialize)]
struct QuartzFile {
    quartz: Vec<Quartz>,
}

#[derive(Debug, Deserialize)]
struct ArtsFile {
    arts: Vec<Art>,
}

#[derive(Debug, Deserialize)]
struct CharactersFile {
    characters: Vec<Character>,
}

/// Read-only lookup tables for quartz, arts and characters.
#[derive(Debug, Default)]
pub struct Catalog {
    quartz_map: BTreeMap<String, Quartz>,
    arts_map: BTreeMap<String, Art>,
    characters: Vec<Character>,
}

impl Catalog {
    /// Load the catalog from `quartz.json`, `arts.json` and
    /// `characters.json` in `data_dir`.
    #[instrument(level = "debug")]
    pub fn load(data_dir: &Path) -> DomainResult<Self> {
        let quartz_file: QuartzFile = read_json(&data_dir.join("quartz.json"))?;
        let arts_file: ArtsFile = read_json(&data_dir.join("arts.json"))?;
        let chars_file: CharactersFile = read_json(&data_dir.join("characters.json"))?;

        let catalog = Self::from_parts(quartz_file.quartz, arts_file.arts, chars_file.characters);
        debug!(
            quartz = catalog.quartz_map.len(),
            arts = catalog.arts_map.len(),
            characters = catalog.characters.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog directly from records (tests and embedding callers).
    pub fn from_parts(quartz: Vec<Quartz>, arts: Vec<Art>, characters: Vec<Character>) -> Self {
        Self {
            quartz_map: quartz.into_iter().map(|q| (q.name.clone(), q)).collect(),
            arts_map: arts.into_iter().map(|a| (a.name.clone(), a)).collect(),
            characters,
        }
    }

    pub fn quartz(&self, name: &str) -> DomainResult<&Quartz> {
        self.quartz_map
            .get(name)
            .ok_or_else(|| DomainError::UnknownQuartz(name.to_string()))
    }

    pub fn art(&self, name: &str) -> DomainResult<&Art> {
        self.arts_map
            .get(name)
            .ok_or_else(|| DomainError::UnknownArt(name.to_string()))
    }

    pub fn character(&self, name: &str) -> DomainResult<&Character> {
        self.characters
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DomainError::UnknownCharacter(name.to_string()))
    }

    pub fn quartz_names(&self) -> impl Iterator<Item = &str> {
        self.quartz_map.keys().map(String::as_str)
    }

    pub fn art_names(&self) -> impl Iterator<Item = &str> {
        self.arts_map.keys().map(String::as_str)
    }

    pub fn arts(&self) -> impl Iterator<Item = &Art> {
        self.arts_map.values()
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Sum the elemental contributions of a set of quartz.
    pub fn element_totals<'a, I>(&self, names: I) -> DomainResult<BTreeMap<String, u32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut totals: BTreeMap<String, u32> = BTreeMap::new();
        for name in names {
            let quartz = self.quartz(name)?;
            for (elem, value) in &quartz.elements {
                *totals.entry(elem.clone()).or_insert(0) += value;
            }
        }
        Ok(totals)
    }

    /// Combined requirements for a set of arts: the per-element maximum.
    pub fn required_elements<'a, I>(&self, art_names: I) -> DomainResult<BTreeMap<String, u32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut required: BTreeMap<String, u32> = BTreeMap::new();
        for name in art_names {
            let art = self.art(name)?;
            for (elem, value) in &art.requirements {
                let entry = required.entry(elem.clone()).or_insert(0);
                *entry = (*entry).max(*value);
            }
        }
        Ok(required)
    }

    /// Arts unlocked by one line holding exactly these quartz.
    ///
    /// Arts are unlocked per line: a line's summed elements must meet every
    /// requirement of the art on its own.
    pub fn unlocked_by_line<'a, I>(&self, names: I) -> DomainResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let totals = self.element_totals(names)?;
        if totals.is_empty() {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .arts_map
            .values()
            .filter(|art| art.is_unlocked_by(&totals))
            .map(|art| art.name.clone())
            .collect())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> DomainResult<T> {
    let content = fs::read_to_string(path).map_err(|e| DomainError::DataFile {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| DomainError::InvalidData {
        path: path.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::QuartzType;

    fn quartz(name: &str, family: &str, elements: &[(&str, u32)]) -> Quartz {
        Quartz {
            name: name.to_string(),
            family: family.to_string(),
            typ: QuartzType::Regular,
            elements: elements
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            quartz_element: None,
            effects: None,
            description: None,
        }
    }

    fn art(name: &str, requirements: &[(&str, u32)]) -> Art {
        Art {
            name: name.to_string(),
            element: requirements.first().map(|(e, _)| *e).unwrap_or("").to_string(),
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

    fn catalog() -> Catalog {
        Catalog::from_parts(
            vec![
                quartz("Attack 1", "Attack", &[("Fire", 1)]),
                quartz("Attack 2", "Attack", &[("Fire", 2)]),
                quartz("Mind 1", "Mind", &[("Water", 1)]),
            ],
            vec![art("Fire Bolt", &[("Fire", 1)]), art("Flare Arrow", &[("Fire", 3)])],
            vec![],
        )
    }

    #[test]
    fn given_quartz_set_when_summing_then_totals_add_up() {
        let cat = catalog();
        let totals = cat.element_totals(["Attack 1", "Attack 2"]).unwrap();
        assert_eq!(totals.get("Fire"), Some(&3));
    }

    #[test]
    fn given_arts_when_combining_requirements_then_takes_maximum() {
        let cat = catalog();
        let required = cat.required_elements(["Fire Bolt", "Flare Arrow"]).unwrap();
        assert_eq!(required.get("Fire"), Some(&3));
    }

    #[test]
    fn given_line_quartz_when_unlocking_then_only_met_requirements_count() {
        let cat = catalog();
        let unlocked = cat.unlocked_by_line(["Attack 2"]).unwrap();
        assert!(unlocked.contains("Fire Bolt"));
        assert!(!unlocked.contains("Flare Arrow"));
    }

    #[test]
    fn given_empty_line_then_nothing_unlocks() {
        let cat = catalog();
        let unlocked = cat.unlocked_by_line([]).unwrap();
        assert!(unlocked.is_empty());
    }

    #[test]
    fn given_unknown_name_when_looking_up_then_errors() {
        let cat = catalog();
        assert!(matches!(
            cat.quartz("Nonexistent"),
            Err(DomainError::UnknownQuartz(_))
        ));
        assert!(matches!(cat.art("Nonexistent"), Err(DomainError::UnknownArt(_))));
    }
}
