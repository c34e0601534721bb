//! Cost of change sets and decks, priced through the request oracle.

use crate::catalog::CardCatalog;
use crate::error::Result;
use crate::models::{Card, CardChange, ChangeAction, CostBreakdown, Deck, PerCardCost};
use crate::oracle::CardOracle;

/// Deck value with the ids whose price is unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckValue {
    pub total: f64,
    pub unpriced_cards: Vec<String>,
}

pub struct CostCalculator<'o, 'c, C: CardCatalog + ?Sized> {
    oracle: &'o CardOracle<'c, C>,
}

impl<'o, 'c, C: CardCatalog + ?Sized> CostCalculator<'o, 'c, C> {
    pub fn new(oracle: &'o CardOracle<'c, C>) -> Self {
        Self { oracle }
    }

    fn line(&self, card: &Card, quantity: u32, added: bool) -> Result<PerCardCost> {
        let unit_price = self.oracle.price(&card.id)?;
        Ok(PerCardCost {
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            quantity,
            unit_price,
            total_price: unit_price.unwrap_or(0.0) * f64::from(quantity),
            trend: self.oracle.trend(&card.id)?,
            added,
        })
    }

    /// Aggregate and per-card cost of `changes`.
    ///
    /// `total_cost` and `added_cost` are the spend on incoming cards,
    /// `removed_value` the value of displaced cards. Unknown prices add
    /// nothing and are listed in `unpriced_cards`.
    pub fn cost(&self, changes: &[CardChange]) -> Result<CostBreakdown> {
        let mut breakdown = CostBreakdown::default();

        for change in changes {
            match change.action {
                ChangeAction::Add => {
                    breakdown
                        .per_card_cost
                        .push(self.line(&change.card, change.quantity, true)?);
                }
                ChangeAction::Remove => {
                    breakdown
                        .per_card_cost
                        .push(self.line(&change.card, change.quantity, false)?);
                }
                ChangeAction::Replace => {
                    breakdown
                        .per_card_cost
                        .push(self.line(&change.card, change.quantity, true)?);
                    if let Some(ref current) = change.current_card {
                        breakdown
                            .per_card_cost
                            .push(self.line(current, change.quantity, false)?);
                    }
                }
            }
        }

        for line in &breakdown.per_card_cost {
            if line.added {
                breakdown.added_cost += line.total_price;
            } else {
                breakdown.removed_value += line.total_price;
            }
            if line.unit_price.is_none() && !breakdown.unpriced_cards.contains(&line.card_id) {
                breakdown.unpriced_cards.push(line.card_id.clone());
            }
        }
        breakdown.total_cost = breakdown.added_cost;
        breakdown.net_cost = breakdown.added_cost - breakdown.removed_value;
        Ok(breakdown)
    }

    /// Spend this change alone adds: `unit price * quantity` of the incoming
    /// card, zero for removals and unknown prices.
    pub fn change_cost(&self, change: &CardChange) -> Result<f64> {
        if change.action == ChangeAction::Remove {
            return Ok(0.0);
        }
        Ok(self.oracle.price(&change.card.id)?.unwrap_or(0.0) * f64::from(change.quantity))
    }

    /// Market value of every card in `deck`.
    pub fn deck_value(&self, deck: &Deck) -> Result<DeckValue> {
        let mut value = DeckValue::default();
        for entry in &deck.cards {
            match self.oracle.price(&entry.card.id)? {
                Some(price) => value.total += price * f64::from(entry.quantity),
                None => {
                    if !value.unpriced_cards.contains(&entry.card.id) {
                        value.unpriced_cards.push(entry.card.id.clone());
                    }
                }
            }
        }
        Ok(value)
    }
}
