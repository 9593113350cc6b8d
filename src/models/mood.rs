use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::MoodLabel;

/// Energy level before any lexicon adjustment.
pub const BASELINE_ENERGY: u8 = 5;
pub const MAX_LEVEL: u8 = 10;

/// Stress above this marks a profile as significant for the mood badge.
pub const SIGNIFICANT_STRESS: u8 = 6;
/// Absolute sentiment above this marks a profile as significant.
pub const SIGNIFICANT_SENTIMENT: f64 = 0.5;

/// The analyzer's verdict on one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodProfile {
    /// Clamped to [-1, 1].
    pub sentiment: f64,
    pub mood: MoodLabel,
    /// Matched lexicon entries. Diagnostics only.
    pub keywords: BTreeSet<String>,
    /// Clamped to [0, 10].
    pub stress_level: u8,
    /// Clamped to [0, 10].
    pub energy_level: u8,
}

impl MoodProfile {
    /// Profile of an empty or unremarkable input.
    pub fn baseline() -> Self {
        Self {
            sentiment: 0.0,
            mood: MoodLabel::Neutral,
            keywords: BTreeSet::new(),
            stress_level: 0,
            energy_level: BASELINE_ENERGY,
        }
    }

    /// Baseline numbers carrying a known label, e.g. the conversation's
    /// last mood when greeting or answering a button press.
    pub fn for_label(mood: MoodLabel) -> Self {
        Self {
            mood,
            ..Self::baseline()
        }
    }

    /// Strong enough to overwrite the conversation's mood badge.
    pub fn is_significant(&self) -> bool {
        self.stress_level > SIGNIFICANT_STRESS || self.sentiment.abs() > SIGNIFICANT_SENTIMENT
    }
}

impl Default for MoodProfile {
    fn default() -> Self {
        Self::baseline()
    }
}

/// A stored analysis, as listed in a participant's mood log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRecord {
    #[serde(flatten)]
    pub profile: MoodProfile,
    pub recorded_at: DateTime<Utc>,
}
