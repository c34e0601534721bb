use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CardRole: Coarse role used for candidate matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardRole {
    Creature,
    Support,
    Resource,
}

impl CardRole {
    /// Lowercase name as stored in catalog tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardRole::Creature => "creature",
            CardRole::Support => "support",
            CardRole::Resource => "resource",
        }
    }
}

impl std::fmt::Display for CardRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    #[serde(default)]
    pub energy_cost: u32,
    #[serde(default)]
    pub damage: u32,
}

impl Attack {
    pub fn new(energy_cost: u32, damage: u32) -> Self {
        Self { energy_cost, damage }
    }
}

// ---------------------------------------------------------------------------
// CardKind: Role-specific fields
// ---------------------------------------------------------------------------

/// Role-specific card data.
///
/// Only creatures carry combat stats. A creature record with missing `hp` or
/// `attacks` deserializes to zero HP / no attacks, which floors the related
/// sub-scores instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum CardKind {
    Creature {
        #[serde(default)]
        hp: u32,
        #[serde(default)]
        attacks: Vec<Attack>,
    },
    Support,
    Resource,
}

// ---------------------------------------------------------------------------
// Card: Immutable catalog record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: CardKind,
    #[serde(default)]
    pub subtypes: BTreeSet<String>,
    #[serde(default)]
    pub element_types: BTreeSet<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    pub rarity: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl Card {
    fn with_kind(id: &str, name: &str, kind: CardKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            subtypes: BTreeSet::new(),
            element_types: BTreeSet::new(),
            abilities: Vec::new(),
            rarity: None,
            text: String::new(),
        }
    }

    pub fn creature(id: &str, name: &str, hp: u32, attacks: Vec<Attack>) -> Self {
        Self::with_kind(id, name, CardKind::Creature { hp, attacks })
    }

    pub fn support(id: &str, name: &str) -> Self {
        Self::with_kind(id, name, CardKind::Support)
    }

    pub fn resource(id: &str, name: &str) -> Self {
        Self::with_kind(id, name, CardKind::Resource)
    }

    pub fn with_element_types(mut self, types: &[&str]) -> Self {
        self.element_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.abilities = abilities.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    // -- Role accessors ----------------------------------------------------

    pub fn role(&self) -> CardRole {
        match self.kind {
            CardKind::Creature { .. } => CardRole::Creature,
            CardKind::Support => CardRole::Support,
            CardKind::Resource => CardRole::Resource,
        }
    }

    pub fn is_creature(&self) -> bool {
        matches!(self.kind, CardKind::Creature { .. })
    }

    pub fn is_support(&self) -> bool {
        matches!(self.kind, CardKind::Support)
    }

    pub fn is_resource(&self) -> bool {
        matches!(self.kind, CardKind::Resource)
    }

    /// HP for creatures, `0` for every other role.
    pub fn hp(&self) -> u32 {
        match self.kind {
            CardKind::Creature { hp, .. } => hp,
            _ => 0,
        }
    }

    pub fn attacks(&self) -> &[Attack] {
        match &self.kind {
            CardKind::Creature { attacks, .. } => attacks,
            _ => &[],
        }
    }

    // -- Derived stats -----------------------------------------------------

    /// Best damage-per-energy over all attacks, normalized by 100.
    ///
    /// A zero energy cost counts as one. Cards without attacks score `0.0`.
    pub fn damage_efficiency(&self) -> f64 {
        self.attacks()
            .iter()
            .map(|a| f64::from(a.damage) / f64::from(a.energy_cost.max(1)))
            .fold(0.0, f64::max)
            / 100.0
    }

    pub fn best_damage(&self) -> u32 {
        self.attacks().iter().map(|a| a.damage).max().unwrap_or(0)
    }

    /// Leading word of the card name, used to group evolutions and reprints.
    pub fn family(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// `hp + subtype bonus + best attack damage / 10`.
    pub fn power_level(&self, subtype_bonus: &BTreeMap<String, f64>) -> f64 {
        let bonus: f64 = self
            .subtypes
            .iter()
            .filter_map(|s| subtype_bonus.get(s))
            .sum();
        f64::from(self.hp()) + bonus + f64::from(self.best_damage()) / 10.0
    }

    pub fn shares_element_type(&self, other: &Card) -> bool {
        !self.element_types.is_disjoint(&other.element_types)
    }

    pub fn has_abilities(&self) -> bool {
        !self.abilities.is_empty()
    }
}
