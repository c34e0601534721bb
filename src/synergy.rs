//! Pairwise card synergy.
//!
//! Scores start neutral at 0.5 and gain points for shared element types,
//! resource/creature type matches, support text that names a creature's
//! type, and both cards having abilities. The keyword matching is plain
//! case-insensitive substring search; the evaluator and selector thresholds
//! assume exactly this behavior.

use crate::models::Card;

pub const NEUTRAL_SYNERGY: f64 = 0.5;

const SHARED_TYPE_BONUS: f64 = 0.2;
const RESOURCE_MATCH_BONUS: f64 = 0.3;
const SUPPORT_TEXT_BONUS: f64 = 0.2;
const ABILITY_BONUS: f64 = 0.1;

/// Compatibility of two cards in `[0, 1]`.
///
/// The shared-type term is symmetric. The resource and support terms apply
/// whichever order the pair is given in.
pub fn synergy(a: &Card, b: &Card) -> f64 {
    let mut score = NEUTRAL_SYNERGY;

    if a.shares_element_type(b) {
        score += SHARED_TYPE_BONUS;
    }

    if resource_feeds(a, b) || resource_feeds(b, a) {
        score += RESOURCE_MATCH_BONUS;
    }

    if support_mentions(a, b) || support_mentions(b, a) {
        score += SUPPORT_TEXT_BONUS;
    }

    if a.has_abilities() && b.has_abilities() {
        score += ABILITY_BONUS;
    }

    score.clamp(0.0, 1.0)
}

/// `resource` is a resource card whose name contains one of the creature's
/// element types.
fn resource_feeds(resource: &Card, creature: &Card) -> bool {
    if !resource.is_resource() || !creature.is_creature() {
        return false;
    }
    let name = resource.name.to_lowercase();
    creature
        .element_types
        .iter()
        .any(|t| !t.is_empty() && name.contains(&t.to_lowercase()))
}

/// `support` is a support card whose text mentions one of the creature's
/// element types.
fn support_mentions(support: &Card, creature: &Card) -> bool {
    if !support.is_support() || !creature.is_creature() {
        return false;
    }
    let text = support.text.to_lowercase();
    creature
        .element_types
        .iter()
        .any(|t| !t.is_empty() && text.contains(&t.to_lowercase()))
}

/// Mean synergy of `card` against each of `peers`, `None` for no peers.
pub fn average_synergy<'a, I>(card: &Card, peers: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Card>,
{
    let values: Vec<f64> = peers.into_iter().map(|p| synergy(card, p)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
