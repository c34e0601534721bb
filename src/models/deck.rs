use serde::{Deserialize, Serialize};

use super::card::Card;

// ---------------------------------------------------------------------------
// Archetype: Primary strategy label of a deck
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Aggro,
    Control,
    Combo,
    Midrange,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Aggro,
        Archetype::Control,
        Archetype::Combo,
        Archetype::Midrange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Aggro => "Aggro",
            Archetype::Control => "Control",
            Archetype::Combo => "Combo",
            Archetype::Midrange => "Midrange",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeckCard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub card: Card,
    pub quantity: u32,
}

impl DeckCard {
    pub fn new(card: Card, quantity: u32) -> Self {
        Self {
            card,
            quantity: quantity.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

/// A deck as handed to the engine. The engine only ever reads it and
/// simulates changes on clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub name: String,
    pub format: Option<String>,
    pub archetype: Archetype,
    #[serde(default)]
    pub cards: Vec<DeckCard>,
}

impl Deck {
    pub fn new(name: &str, archetype: Archetype) -> Self {
        Self {
            name: name.to_string(),
            format: None,
            archetype,
            cards: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_card(mut self, card: Card, quantity: u32) -> Self {
        self.cards.push(DeckCard::new(card, quantity));
        self
    }

    pub fn total_cards(&self) -> u32 {
        self.cards.iter().map(|dc| dc.quantity).sum()
    }

    /// Total copies of a card id across all entries.
    pub fn quantity_of(&self, card_id: &str) -> u32 {
        self.cards
            .iter()
            .filter(|dc| dc.card.id == card_id)
            .map(|dc| dc.quantity)
            .sum()
    }

    pub fn contains(&self, card_id: &str) -> bool {
        self.cards.iter().any(|dc| dc.card.id == card_id)
    }

    /// Every entry except those holding `card_id`.
    pub fn others<'a>(&'a self, card_id: &'a str) -> impl Iterator<Item = &'a DeckCard> + 'a {
        self.cards.iter().filter(move |dc| dc.card.id != card_id)
    }
}
