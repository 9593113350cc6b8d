use std::collections::BTreeSet;

use crate::models::enums::MoodLabel;
use crate::models::{MoodProfile, BASELINE_ENERGY, MAX_LEVEL};

/// Stress at or above this forces the stressed label.
pub const STRESS_DOMINANCE: i32 = 4;

// Lexicons are disjoint and none is a substring of another entry,
// so a single phrase never scores twice.

pub const STRESS_WORDS: &[&str] = &[
    "estresado",
    "estresada",
    "estrés",
    "agotado",
    "agotada",
    "ansioso",
    "ansiosa",
    "ansiedad",
    "abrumado",
    "abrumada",
    "presionado",
    "presionada",
    "nervioso",
    "nerviosa",
    "no puedo con",
    "demasiado trabajo",
];

pub const SAD_WORDS: &[&str] = &[
    "triste",
    "deprimido",
    "deprimida",
    "desanimado",
    "desanimada",
    "decaído",
    "decaída",
    "llorar",
    "sin ganas",
    "me siento solo",
    "me siento sola",
    "vacío",
];

pub const HAPPY_WORDS: &[&str] = &[
    "feliz",
    "contento",
    "contenta",
    "alegre",
    "genial",
    "excelente",
    "maravilloso",
    "maravillosa",
    "encantado",
    "encantada",
    "me siento bien",
];

pub const MOTIVATED_WORDS: &[&str] = &[
    "motivado",
    "motivada",
    "listo",
    "lista",
    "con ganas",
    "vamos",
    "a por todas",
    "puedo lograrlo",
    "enfocado",
    "enfocada",
    "inspirado",
    "inspirada",
    "determinado",
    "determinada",
];

/// What one matched entry of a lexicon does to the running scores.
struct LexiconEffect {
    sentiment: f64,
    stress: i32,
    energy: i32,
    /// Tentative label; a later match overwrites an earlier one.
    mood: Option<MoodLabel>,
}

/// Evaluation order is part of the contract: stress, sad, happy, motivated.
const LEXICONS: [(&[&str], LexiconEffect); 4] = [
    (
        STRESS_WORDS,
        LexiconEffect {
            sentiment: -0.3,
            stress: 2,
            energy: 0,
            mood: None,
        },
    ),
    (
        SAD_WORDS,
        LexiconEffect {
            sentiment: -0.4,
            stress: 0,
            energy: -2,
            mood: Some(MoodLabel::Sad),
        },
    ),
    (
        HAPPY_WORDS,
        LexiconEffect {
            sentiment: 0.4,
            stress: 0,
            energy: 2,
            mood: Some(MoodLabel::Happy),
        },
    ),
    (
        MOTIVATED_WORDS,
        LexiconEffect {
            sentiment: 0.5,
            stress: 0,
            energy: 3,
            mood: Some(MoodLabel::Motivated),
        },
    ),
];

/// Keyword scorer turning free text into a bounded mood profile.
///
/// Total over all inputs: blank text yields the baseline profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodAnalyzer;

impl MoodAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> MoodProfile {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return MoodProfile::baseline();
        }

        let mut sentiment = 0.0_f64;
        let mut stress = 0_i32;
        let mut energy = i32::from(BASELINE_ENERGY);
        let mut mood = MoodLabel::Neutral;
        let mut keywords = BTreeSet::new();

        for (words, effect) in &LEXICONS {
            for word in words.iter().filter(|w| normalized.contains(**w)) {
                sentiment += effect.sentiment;
                stress += effect.stress;
                energy += effect.energy;
                if let Some(label) = effect.mood {
                    mood = label;
                }
                keywords.insert((*word).to_string());
            }
        }

        if stress >= STRESS_DOMINANCE {
            mood = MoodLabel::Stressed;
        }

        MoodProfile {
            sentiment: sentiment.clamp(-1.0, 1.0),
            mood,
            keywords,
            stress_level: clamp_level(stress),
            energy_level: clamp_level(energy),
        }
    }
}

fn clamp_level(value: i32) -> u8 {
    value.clamp(0, i32::from(MAX_LEVEL)) as u8
}
