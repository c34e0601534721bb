use serde::{Deserialize, Serialize};

use super::deck::Archetype;

// ---------------------------------------------------------------------------
// DeckAnalysis: Output shape of the external deck analyzer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckScores {
    pub overall: f64,
    pub consistency: f64,
    pub power: f64,
    pub speed: f64,
    pub versatility: f64,
    pub meta_relevance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub resource_ratio: f64,
    pub mulligan_probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyReport {
    pub score: f64,
    #[serde(default)]
    pub key_pairs: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeReport {
    pub primary: Archetype,
    pub confidence: f64,
}

impl Default for ArchetypeReport {
    fn default() -> Self {
        Self {
            primary: Archetype::Midrange,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub archetype: Archetype,
    /// Win rate in percentage points (0-100).
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaReport {
    pub tier: Option<String>,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
}

impl MetaReport {
    pub fn win_rate(&self, archetype: Archetype) -> Option<f64> {
        self.matchups
            .iter()
            .find(|m| m.archetype == archetype)
            .map(|m| m.win_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckAnalysis {
    pub scores: DeckScores,
    #[serde(default)]
    pub consistency: ConsistencyReport,
    #[serde(default)]
    pub synergy: SynergyReport,
    #[serde(default)]
    pub archetype: ArchetypeReport,
    #[serde(default)]
    pub meta: MetaReport,
}

// ---------------------------------------------------------------------------
// ImpactAnalysis: Before/after deltas for a change set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupChange {
    pub archetype: Archetype,
    pub previous_win_rate: f64,
    pub new_win_rate: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub overall_delta: f64,
    pub consistency_delta: f64,
    pub power_delta: f64,
    pub speed_delta: f64,
    pub versatility_delta: f64,
    pub meta_relevance_delta: f64,
    #[serde(default)]
    pub matchup_changes: Vec<MatchupChange>,
}
