//! In-character canned content for when a backend is unavailable

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::prompt::Mood;

/// Placeholder replaced with the user's name in reply templates
const NAME_SLOT: &str = "{name}";

const FURIOUS_REPLIES: &[&str] = &[
    "¡{name}! ¡Ya me tienes harta! ¡Deja de ser tan molesto! 😤💢",
    "¡Mou! ¡Estoy súper enojada contigo, {name}! ¡Compórtate mejor! 😡",
    "¡No me hables así! ¡Soy tu novia, no tu enemiga! 💢😤",
];

const IRRITATED_REPLIES: &[&str] = &[
    "Ehh... {name}, me estás molestando un poquito... 😒",
    "Mou~ No seas así conmigo, {name}-kun... 😕",
    "¿Por qué eres así? Yo solo quiero que seamos felices... 😔",
];

const SMITTEN_REPLIES: &[&str] = &[
    "¡{name}-kun! ¡Te amo tanto! ¡Eres el mejor novio del mundo! 😍💖",
    "¡Kyaa! ¡Mi corazón late súper rápido cuando hablas conmigo, {name}! 💕✨",
    "¡Ehehe~ Mi {name} es tan lindo! ¡Quiero estar siempre contigo! 🥰💗",
];

const DEFAULT_REPLIES: &[&str] = &[
    "¡Hola {name}-kun! ¡Me alegra hablar contigo! 😊💕",
    "¡Kyaa! ¡Qué lindo eres, {name}! ¡Me haces sonreír! ✨",
    "Ehehe~ ¡Me gusta cuando hablamos, {name}-kun! 😊🌸",
];

/// Transcripts handed back when speech recognition is unavailable
pub const FALLBACK_TRANSCRIPTS: &[&str] = &[
    "Hola, ¿cómo estás?",
    "Me siento genial hoy",
    "¿Puedes ayudarme?",
    "Estoy un poco nervioso",
    "Me gustas mucho",
    "Estoy enojado",
    "Me alegra hablar contigo",
];

/// Reply templates for a mood tier
///
/// Fond and shy tiers share the default table.
#[must_use]
pub const fn reply_table(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Furious => FURIOUS_REPLIES,
        Mood::Irritated => IRRITATED_REPLIES,
        Mood::Smitten => SMITTEN_REPLIES,
        Mood::Fond | Mood::Shy => DEFAULT_REPLIES,
    }
}

/// Fill a reply template with the user's name
#[must_use]
pub fn render_reply(template: &str, user_name: &str) -> String {
    template.replace(NAME_SLOT, user_name)
}

/// Source of randomness for fallback selection
///
/// Production uses the thread-local generator; tests inject a seeded one so
/// the chosen fallback is reproducible.
#[derive(Debug, Default)]
pub enum Randomness {
    #[default]
    Thread,
    Seeded(Mutex<StdRng>),
}

impl Randomness {
    /// Deterministic source for tests and reproducible runs
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    /// Pick one item uniformly at random
    ///
    /// Returns `None` only for an empty slice.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        match self {
            Self::Thread => items.choose(&mut rand::thread_rng()),
            Self::Seeded(rng) => match rng.lock() {
                Ok(mut rng) => items.choose(&mut *rng),
                Err(poisoned) => items.choose(&mut *poisoned.into_inner()),
            },
        }
    }

    /// Pick an in-character reply for the given mood
    #[must_use]
    pub fn fallback_reply(&self, mood: Mood, user_name: &str) -> String {
        let table = reply_table(mood);
        let template = self.pick(table).copied().unwrap_or(DEFAULT_REPLIES[0]);
        render_reply(template, user_name)
    }

    /// Pick a canned transcript
    #[must_use]
    pub fn fallback_transcript(&self) -> &'static str {
        self.pick(FALLBACK_TRANSCRIPTS)
            .copied()
            .unwrap_or(FALLBACK_TRANSCRIPTS[0])
    }
}
