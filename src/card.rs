//! Card data model
//!
//! `CardData` is the single record shared by the form, the generation client
//! and the card view. It is replaced wholesale while the form is being filled
//! and frozen once it has been finalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CardError, Result};
use crate::photo::EmbeddedPhoto;

/// Who the card is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    #[serde(rename = "Boyfriend")]
    Boyfriend,
    #[serde(rename = "Girlfriend")]
    Girlfriend,
    #[serde(rename = "Best Friend")]
    BestFriend,
    #[serde(rename = "Spouse")]
    Spouse,
    #[serde(rename = "Family Member")]
    FamilyMember,
    #[serde(rename = "Secret Crush")]
    SecretCrush,
}

static ALL_RELATIONS: [Relation; 6] = [
    Relation::Boyfriend,
    Relation::Girlfriend,
    Relation::BestFriend,
    Relation::Spouse,
    Relation::FamilyMember,
    Relation::SecretCrush,
];

impl Relation {
    pub fn name(&self) -> &'static str {
        match self {
            Relation::Boyfriend => "Boyfriend",
            Relation::Girlfriend => "Girlfriend",
            Relation::BestFriend => "Best Friend",
            Relation::Spouse => "Spouse",
            Relation::FamilyMember => "Family Member",
            Relation::SecretCrush => "Secret Crush",
        }
    }

    pub fn all() -> &'static [Relation] {
        &ALL_RELATIONS[..]
    }

    /// Partners get terms of endearment, everyone else a platonic message.
    pub fn is_romantic(&self) -> bool {
        match self {
            Relation::Boyfriend | Relation::Girlfriend | Relation::Spouse => true,
            Relation::BestFriend | Relation::FamilyMember | Relation::SecretCrush => false,
        }
    }

    pub fn next(&self) -> Self {
        cycle(Self::all(), self, 1)
    }

    pub fn prev(&self) -> Self {
        cycle(Self::all(), self, Self::all().len() - 1)
    }
}

/// Visual theme of the finished card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Vibe {
    #[serde(rename = "Cyberpunk Neon")]
    CyberpunkNeon,
    #[serde(rename = "Royal Gold")]
    RoyalGold,
    #[serde(rename = "Soft Pastel")]
    SoftPastel,
    #[default]
    #[serde(rename = "Vibrant Party")]
    VibrantParty,
}

static ALL_VIBES: [Vibe; 4] = [
    Vibe::CyberpunkNeon,
    Vibe::RoyalGold,
    Vibe::SoftPastel,
    Vibe::VibrantParty,
];

impl Vibe {
    pub fn name(&self) -> &'static str {
        match self {
            Vibe::CyberpunkNeon => "Cyberpunk Neon",
            Vibe::RoyalGold => "Royal Gold",
            Vibe::SoftPastel => "Soft Pastel",
            Vibe::VibrantParty => "Vibrant Party",
        }
    }

    pub fn all() -> &'static [Vibe] {
        &ALL_VIBES[..]
    }

    pub fn next(&self) -> Self {
        cycle(Self::all(), self, 1)
    }

    pub fn prev(&self) -> Self {
        cycle(Self::all(), self, Self::all().len() - 1)
    }
}

/// Register of the generated message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "Hype & Energetic")]
    Hype,
    #[serde(rename = "Deeply Emotional")]
    Deep,
    #[serde(rename = "Witty & Sarcastic")]
    Funny,
    #[serde(rename = "Classic Poetic")]
    Poetic,
}

static ALL_TONES: [Tone; 4] = [Tone::Hype, Tone::Deep, Tone::Funny, Tone::Poetic];

impl Tone {
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Hype => "Hype & Energetic",
            Tone::Deep => "Deeply Emotional",
            Tone::Funny => "Witty & Sarcastic",
            Tone::Poetic => "Classic Poetic",
        }
    }

    pub fn all() -> &'static [Tone] {
        &ALL_TONES[..]
    }

    pub fn next(&self) -> Self {
        cycle(Self::all(), self, 1)
    }

    pub fn prev(&self) -> Self {
        cycle(Self::all(), self, Self::all().len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: &T, step: usize) -> T {
    let idx = all.iter().position(|v| v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

/// A birthday card, from first keystroke to the finished artifact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender_name: String,
    pub recipient_name: String,
    pub relation: Relation,
    pub vibe: Vibe,
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    pub fav_memory: String,
    #[serde(default, rename = "photoUrl")]
    pub photo: Option<EmbeddedPhoto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CardData {
    pub fn with_sender_name(self, sender_name: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            ..self
        }
    }

    pub fn with_recipient_name(self, recipient_name: impl Into<String>) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            ..self
        }
    }

    pub fn with_relation(self, relation: Relation) -> Self {
        Self { relation, ..self }
    }

    pub fn with_vibe(self, vibe: Vibe) -> Self {
        Self { vibe, ..self }
    }

    pub fn with_tone(self, tone: Tone) -> Self {
        Self { tone, ..self }
    }

    /// Blank input clears the age.
    pub fn with_age(self, age: impl Into<String>) -> Self {
        let age = age.into();
        Self {
            age: if age.trim().is_empty() { None } else { Some(age) },
            ..self
        }
    }

    pub fn with_fav_memory(self, fav_memory: impl Into<String>) -> Self {
        Self {
            fav_memory: fav_memory.into(),
            ..self
        }
    }

    pub fn with_photo(self, photo: Option<EmbeddedPhoto>) -> Self {
        Self { photo, ..self }
    }

    /// Both names are filled in (whitespace does not count).
    pub fn has_names(&self) -> bool {
        !self.sender_name.trim().is_empty() && !self.recipient_name.trim().is_empty()
    }

    pub fn has_memory(&self) -> bool {
        !self.fav_memory.trim().is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.id.is_some()
    }

    /// Attach the generated message and bookkeeping.
    pub fn finalize(self, ai_message: String) -> Result<Self> {
        if self.is_finalized() {
            return Err(CardError::AlreadyFinalized);
        }

        Ok(Self {
            id: Some(Uuid::new_v4().to_string()),
            ai_message: Some(ai_message),
            created_at: Some(Utc::now()),
            ..self
        })
    }

    /// Name of the exported PNG for this card.
    pub fn export_file_name(&self) -> String {
        let safe: String = self
            .recipient_name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        let stem = if safe.is_empty() { "Card" } else { safe.as_str() };
        format!("{}-BirthdayCard.png", stem)
    }
}
