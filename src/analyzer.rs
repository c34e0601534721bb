//! External whole-deck analyzer interface.

use crate::error::AnalyzerError;
use crate::models::{Deck, DeckAnalysis};

/// Full-deck evaluation service (consistency, speed, synergy, archetype and
/// meta scores). The engine only consumes it.
pub trait DeckAnalyzer {
    fn analyze(&self, deck: &Deck) -> std::result::Result<DeckAnalysis, AnalyzerError>;
}

impl<F> DeckAnalyzer for F
where
    F: Fn(&Deck) -> std::result::Result<DeckAnalysis, AnalyzerError>,
{
    fn analyze(&self, deck: &Deck) -> std::result::Result<DeckAnalysis, AnalyzerError> {
        self(deck)
    }
}
