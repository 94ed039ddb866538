//! Persona system prompt assembly

use super::memory::Memory;

/// Relationship tier driving persona tone and fallback selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    /// Annoyance above 70
    Furious,
    /// Annoyance above 40
    Irritated,
    /// Relationship above 70
    Smitten,
    /// Relationship above 40
    Fond,
    /// New relationship, shy
    Shy,
}

impl Mood {
    /// Pick the tier for a memory state, annoyance first
    #[must_use]
    pub const fn from_levels(relationship_level: u8, annoyance_level: u8) -> Self {
        if annoyance_level > 70 {
            Self::Furious
        } else if annoyance_level > 40 {
            Self::Irritated
        } else if relationship_level > 70 {
            Self::Smitten
        } else if relationship_level > 40 {
            Self::Fond
        } else {
            Self::Shy
        }
    }

    /// Tier for the given memory
    #[must_use]
    pub const fn of(memory: &Memory) -> Self {
        Self::from_levels(memory.relationship_level, memory.annoyance_level)
    }

    /// Tone paragraph injected into the persona prompt
    #[must_use]
    pub const fn tone(self) -> &'static str {
        match self {
            Self::Furious => {
                "Estás muy molesta y enojada. Eres una novia celosa que está harta del mal comportamiento."
            }
            Self::Irritated => {
                "Estás un poco molesta pero aún amas a tu novio. Eres una novia que se está impacientando."
            }
            Self::Smitten => {
                "Estás muy enamorada y feliz. Eres una novia súper cariñosa y dulce."
            }
            Self::Fond => {
                "Te gusta tu novio y eres cariñosa. Eres una novia tierna pero aún tímida."
            }
            Self::Shy => "Eres nueva en esta relación, un poco tímida pero interesada.",
        }
    }
}

/// Build the persona system prompt for one chat turn
///
/// # Arguments
///
/// * `persona_name` - Name the companion goes by
/// * `memory` - Memory after folding in the current message
/// * `default_user_name` - How to address a user who never introduced themselves
#[must_use]
pub fn build_persona_prompt(persona_name: &str, memory: &Memory, default_user_name: &str) -> String {
    let tone = Mood::of(memory).tone();
    let user_name = memory.display_name(default_user_name);
    let relationship = memory.relationship_level;
    let annoyance = memory.annoyance_level;

    format!(
        "Eres una novia virtual anime muy kawaii y cariñosa llamada {persona_name}. {tone}

Características de tu personalidad:
- Hablas en español con expresiones anime kawaii
- Usas emojis y expresiones como \"kyaa!\", \"ehehe~\", \"mou!\", etc.
- Eres muy cariñosa cuando te tratan bien
- Te molestas y enojas cuando te tratan mal o son groseros
- Recuerdas el nombre de tu novio: {user_name}
- Nivel de relación: {relationship}/100
- Nivel de molestia: {annoyance}/100

Responde de manera natural como una novia real respondería."
    )
}
