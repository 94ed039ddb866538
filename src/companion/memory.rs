//! Caller-owned conversational memory
//!
//! The service never stores memory. Clients send the record with every chat
//! turn and receive the updated copy back. Levels are validated on the way in
//! so malformed client input cannot push thresholds out of range.

use serde::{Deserialize, Deserializer, Serialize};

use super::emotion::{self, Emotion, contains_any};
use super::names;

/// Upper bound for relationship and annoyance levels
pub const MAX_LEVEL: u8 = 100;

/// Maximum number of remembered topics
pub const MAX_TOPICS: usize = 10;

/// Bonus for telling the companion your name
const NAME_BONUS: i16 = 10;

const AFFECTION_WORDS: &[&str] = &["te amo", "te quiero", "hermosa", "linda", "preciosa", "amor"];
const AFFECTION_RELATIONSHIP: i16 = 5;
const AFFECTION_ANNOYANCE: i16 = -10;

const INSULT_WORDS: &[&str] = &["idiota", "estúpido", "cállate", "feo", "odio", "asco"];
const INSULT_RELATIONSHIP: i16 = -5;
const INSULT_ANNOYANCE: i16 = 20;

/// Topics the companion keeps track of
const TOPIC_VOCABULARY: &[&str] = &[
    "trabajo", "familia", "hobby", "música", "anime", "juegos", "comida", "viaje", "película",
    "libro",
];

/// Accumulated relationship signals for one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Memory {
    /// Name the user introduced themselves with
    pub user_name: Option<String>,

    /// Affinity score, 0 to 100
    #[serde(deserialize_with = "clamped_level")]
    pub relationship_level: u8,

    /// Annoyance score, 0 to 100
    #[serde(deserialize_with = "clamped_level")]
    pub annoyance_level: u8,

    /// Mentioned topics, most recent last
    #[serde(deserialize_with = "recent_topics")]
    pub topics: Vec<String>,

    /// Emotion detected on the last message
    #[serde(deserialize_with = "lenient_emotion")]
    pub last_emotion: Emotion,
}

impl Memory {
    /// Fold one user message into the memory
    ///
    /// Applies name extraction, affection/insult deltas, topic tracking and
    /// emotion classification, in that order.
    #[must_use]
    pub fn update(mut self, message: &str) -> Self {
        if let Some(name) = names::extract_name(message) {
            tracing::debug!(name = %name, "user introduced themselves");
            self.user_name = Some(name);
            self.relationship_level = adjust(self.relationship_level, NAME_BONUS);
        }

        let lower = message.to_lowercase();

        if contains_any(&lower, AFFECTION_WORDS) {
            self.relationship_level = adjust(self.relationship_level, AFFECTION_RELATIONSHIP);
            self.annoyance_level = adjust(self.annoyance_level, AFFECTION_ANNOYANCE);
        } else if contains_any(&lower, INSULT_WORDS) {
            self.annoyance_level = adjust(self.annoyance_level, INSULT_ANNOYANCE);
            self.relationship_level = adjust(self.relationship_level, INSULT_RELATIONSHIP);
        }

        for topic in TOPIC_VOCABULARY {
            if lower.contains(topic) && !self.topics.iter().any(|t| t == topic) {
                self.topics.push((*topic).to_string());
            }
        }
        keep_recent(&mut self.topics);

        self.last_emotion = emotion::classify(message, self.annoyance_level);
        self
    }

    /// Name to address the user by
    #[must_use]
    pub fn display_name<'a>(&'a self, default: &'a str) -> &'a str {
        self.user_name.as_deref().unwrap_or(default)
    }
}

/// Apply a signed delta and clamp into `0..=MAX_LEVEL`
fn adjust(level: u8, delta: i16) -> u8 {
    let clamped = (i16::from(level) + delta).clamp(0, i16::from(MAX_LEVEL));
    u8::try_from(clamped).unwrap_or(MAX_LEVEL)
}

fn keep_recent(topics: &mut Vec<String>) {
    if topics.len() > MAX_TOPICS {
        topics.drain(..topics.len() - MAX_TOPICS);
    }
}

/// Accept any JSON number and clamp it into a valid level
fn clamped_level<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(0);
    };
    if raw.is_nan() {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let level = raw.clamp(0.0, f64::from(MAX_LEVEL)) as u8;
    Ok(level)
}

fn recent_topics<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut topics = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    keep_recent(&mut topics);
    Ok(topics)
}

/// Unknown or null labels read as neutral; the field is recomputed every turn
fn lenient_emotion<'de, D>(deserializer: D) -> std::result::Result<Emotion, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.as_deref().map_or(Emotion::Neutral, Emotion::from_label))
}
