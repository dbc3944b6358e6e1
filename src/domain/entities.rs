//! Domain entities: core data structures

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Quartz category. At most one Blade and one Shield may sit on a single
/// line; everything else carries no per-line limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuartzType {
    Blade,
    Shield,
    Regular,
}

impl From<String> for QuartzType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Blade" => QuartzType::Blade,
            "Shield" => QuartzType::Shield,
            _ => QuartzType::Regular,
        }
    }
}

impl From<QuartzType> for String {
    fn from(t: QuartzType) -> Self {
        match t {
            QuartzType::Blade => "Blade".to_string(),
            QuartzType::Shield => "Shield".to_string(),
            QuartzType::Regular => "Regular".to_string(),
        }
    }
}

/// A placeable quartz with elemental contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quartz {
    /// Unique name, the lookup key everywhere
    pub name: String,
    /// Exclusivity tag: at most one member per family in a whole build
    pub family: String,
    #[serde(rename = "type")]
    pub typ: QuartzType,
    /// Element name -> contribution value
    pub elements: BTreeMap<String, u32>,
    /// Single designated element used for slot restriction matching.
    /// When set it overrides the element-contribution fallback.
    #[serde(default)]
    pub quartz_element: Option<String>,
    #[serde(default)]
    pub effects: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Quartz {
    /// Whether this quartz contributes a strictly positive amount of `element`.
    pub fn has_element(&self, element: &str) -> bool {
        self.elements.get(element).is_some_and(|v| *v > 0)
    }

    /// Whether this quartz may sit in a slot restricted to `restriction`.
    ///
    /// A declared `quartz_element` must equal the restriction; only quartz
    /// without a declaration fall back to the positive-contribution test.
    pub fn matches_restriction(&self, restriction: &str) -> bool {
        match &self.quartz_element {
            Some(designated) => designated == restriction,
            None => self.has_element(restriction),
        }
    }

    /// Sum of all element contributions, used by the element-weight ordering.
    pub fn element_weight(&self) -> u32 {
        self.elements.values().sum()
    }
}

/// An unlockable art with minimum elemental requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Art {
    pub name: String,
    pub element: String,
    /// Element name -> required minimum value along a single line
    pub requirements: BTreeMap<String, u32>,
    #[serde(default)]
    pub ep_cost: Option<u32>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Art {
    /// Whether `totals` (one line's summed elements) meets every requirement.
    pub fn is_unlocked_by(&self, totals: &BTreeMap<String, u32>) -> bool {
        self.requirements
            .iter()
            .all(|(elem, req)| totals.get(elem).copied().unwrap_or(0) >= *req)
    }
}

/// A single slot in an orbment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    /// Element restriction, e.g. "Time"
    #[serde(default)]
    pub restriction: Option<String>,
    /// Whether this slot is shared between lines
    #[serde(default)]
    pub shared: bool,
}

/// One linear sequence of slots in the orbment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub color: String,
    pub slots: Vec<Slot>,
}

impl Line {
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }
}

/// A character with an ordered set of orbment lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
    pub lines: Vec<Line>,
}

/// One quartz assigned to one slot in a finished build.
///
/// `line_index` is `None` for the shared root slot, which contributes to
/// every line simultaneously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub line_index: Option<usize>,
    pub slot_index: usize,
    pub quartz: String,
    pub is_shared: bool,
}

/// A validated assignment of quartz to slots. Slots beyond an exhausted
/// pool stay empty and carry no placement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Placements in traversal order
    pub placements: Vec<Placement>,
    /// Number of arts unlocked by this build
    pub total_arts: usize,
    /// Names of all unlocked arts
    pub unlocked_arts: BTreeSet<String>,
}

impl Build {
    /// Quartz names placed on `line` (shared-root placements excluded).
    pub fn quartz_on_line(&self, line: usize) -> impl Iterator<Item = &str> {
        self.placements
            .iter()
            .filter(move |p| p.line_index == Some(line))
            .map(|p| p.quartz.as_str())
    }

    /// Quartz name placed on the shared root, if any.
    pub fn shared_quartz(&self) -> Option<&str> {
        self.placements
            .iter()
            .find(|p| p.line_index.is_none())
            .map(|p| p.quartz.as_str())
    }

    /// Whether `name` was placed anywhere in this build.
    pub fn contains_quartz(&self, name: &str) -> bool {
        self.placements.iter().any(|p| p.quartz == name)
    }
}
