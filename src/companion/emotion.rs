//! Keyword-based emotion classification

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Words that always read as an insult
const INSULT_WORDS: &[&str] = &[
    "idiota", "estúpido", "cállate", "feo", "odio", "asco", "malo", "tonto",
];

const ROMANTIC_WORDS: &[&str] = &[
    "te amo", "te quiero", "mi amor", "cariño", "hermosa", "linda", "preciosa", "novia",
];

const SHY_WORDS: &[&str] = &[
    "tímido", "sonrojo", "me gustas", "nervioso", "enamorado", "beso", "abrazo",
];

const HAPPY_WORDS: &[&str] = &[
    "feliz", "genial", "me alegra", "contento", "fantástico", "increíble", "divertido",
];

const ANGRY_WORDS: &[&str] = &["enojo", "enojado", "molesto", "rabia", "furioso"];

/// Annoyance above which an insult escalates from `annoyed` to `angry`
const ANGER_THRESHOLD: u8 = 50;

/// Coarse emotional tone of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Annoyed,
    Love,
    Blush,
    Happy,
    #[default]
    Neutral,
}

impl Emotion {
    /// Label used on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Annoyed => "annoyed",
            Self::Love => "love",
            Self::Blush => "blush",
            Self::Happy => "happy",
            Self::Neutral => "neutral",
        }
    }

    /// Parse a wire label, treating anything unrecognized as neutral
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "angry" => Self::Angry,
            "annoyed" => Self::Annoyed,
            "love" => Self::Love,
            "blush" => Self::Blush,
            "happy" => Self::Happy,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a message into exactly one emotion
///
/// Keyword groups are checked in priority order and the first match wins:
/// insult or repetition, romantic, shy, happy, angry, then neutral.
#[must_use]
pub fn classify(text: &str, annoyance_level: u8) -> Emotion {
    let text = text.to_lowercase();

    if contains_any(&text, INSULT_WORDS) || is_repetitive(&text) {
        return if annoyance_level > ANGER_THRESHOLD {
            Emotion::Angry
        } else {
            Emotion::Annoyed
        };
    }

    if contains_any(&text, ROMANTIC_WORDS) {
        Emotion::Love
    } else if contains_any(&text, SHY_WORDS) {
        Emotion::Blush
    } else if contains_any(&text, HAPPY_WORDS) {
        Emotion::Happy
    } else if contains_any(&text, ANGRY_WORDS) {
        Emotion::Angry
    } else {
        Emotion::Neutral
    }
}

/// Whether `text` contains any of the given keywords as a substring
pub(crate) fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Low lexical diversity: fewer unique tokens than half the token count
fn is_repetitive(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    unique.len() * 2 < tokens.len()
}
