//! Message generation
//!
//! One best-effort request per card. [`MessageClient::generate`] cannot fail:
//! service errors are logged and replaced by a fixed fallback line, so the
//! card always has something to say.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::card::{CardData, Relation, Tone};
use crate::config::GenerationPreferences;
use crate::error::GenerationError;

/// Used when the service answers without any text
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "Happy Birthday! You make the world a brighter place just by being in it.";

/// Used when the request itself fails
pub const SERVICE_FAILURE_FALLBACK: &str =
    "Another year of greatness! May your day be as special as the memories we share.";

/// A text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Text shown on the back of the card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub text: String,
}

/// Wraps a [`TextGenerator`] with prompt building and fallbacks
#[derive(Clone)]
pub struct MessageClient {
    generator: Arc<dyn TextGenerator>,
}

impl MessageClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Single attempt, no retries.
    pub async fn generate(&self, card: &CardData) -> GeneratedMessage {
        let prompt = build_prompt(card);
        tracing::debug!(
            recipient = %card.recipient_name,
            tone = card.tone.name(),
            "requesting birthday message"
        );

        let text = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("generation returned no text, using fallback");
                EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(GenerationError::Decode(reason)) => {
                tracing::warn!(%reason, "malformed generation response, using fallback");
                EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(error) => {
                tracing::error!(%error, "message generation failed");
                SERVICE_FAILURE_FALLBACK.to_string()
            }
        };

        GeneratedMessage { text }
    }
}

/// Build the instruction text sent to the service.
pub fn build_prompt(card: &CardData) -> String {
    let mut lines = vec![
        "Task: Write a heartfelt birthday card message.".to_string(),
        format!("From: {}", card.sender_name.trim()),
        format!(
            "To: {} ({})",
            card.recipient_name.trim(),
            card.relation.name()
        ),
        format!("Vibe: {}", card.vibe.name()),
        format!("Tone: {}", card.tone.name()),
        format!("Romance: {}", romance_level(card.relation)),
        format!("Special memory to include: \"{}\"", card.fav_memory.trim()),
    ];

    if let Some(age) = card.age.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        lines.push(format!("Turning: {}", age));
    }

    lines.push(String::new());
    lines.push("Instructions:".to_string());

    let instructions = [
        tone_rule(card.tone).to_string(),
        format!(
            "Weave the special memory \"{}\" in naturally.",
            card.fav_memory.trim()
        ),
        "Keep it between 50 and 80 words.".to_string(),
        format!("Match the {} aesthetic.", card.vibe.name()),
        relation_rule(card.relation).to_string(),
        "Finish with a unique \"Happy Birthday\" sign-off.".to_string(),
    ];

    for (i, instruction) in instructions.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, instruction));
    }

    lines.join("\n")
}

fn romance_level(relation: Relation) -> &'static str {
    if relation.is_romantic() {
        "Very high (terms of endearment, heartfelt love)"
    } else {
        "Platonic (focus on the bond and friendship)"
    }
}

fn tone_rule(tone: Tone) -> &'static str {
    match tone {
        Tone::Hype => "Write with explosive energy and use CAPS for the most exciting words.",
        Tone::Deep => "Focus on the soul of the relationship and the strength of the bond.",
        Tone::Funny => "Include a clever, affectionate birthday roast or joke.",
        Tone::Poetic => "Use lyrical, classic imagery with a gentle rhythm.",
    }
}

fn relation_rule(relation: Relation) -> &'static str {
    match relation {
        Relation::Boyfriend | Relation::Girlfriend => "Write as a partner who adores them.",
        Relation::Spouse => "Write as a life partner celebrating another year together.",
        Relation::BestFriend => "Write as a best friend who knows all their secrets.",
        Relation::FamilyMember => "Keep it warm and suitable for family.",
        Relation::SecretCrush => "Keep it sweet and a little shy, without declaring love outright.",
    }
}

/// Google Gemini `generateContent` backend
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(prefs: &GenerationPreferences) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(prefs.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: prefs.base_url.trim_end_matches('/').to_string(),
            model: prefs.model.clone(),
            temperature: prefs.temperature,
            api_key: prefs.resolve_api_key(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Vibe;

    struct Scripted(fn() -> Result<String, GenerationError>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            (self.0)()
        }
    }

    fn alex_and_sam() -> CardData {
        CardData::default()
            .with_sender_name("Alex")
            .with_recipient_name("Sam")
            .with_relation(Relation::Girlfriend)
            .with_vibe(Vibe::SoftPastel)
            .with_tone(Tone::Hype)
            .with_fav_memory("beach trip")
    }

    fn run(generator: Scripted) -> GeneratedMessage {
        let client = MessageClient::new(Arc::new(generator));
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(client.generate(&alex_and_sam()))
    }

    #[test]
    fn test_success_is_trimmed() {
        let message = run(Scripted(|| Ok("  Happy birthday Sam!\n".to_string())));
        assert_eq!(message.text, "Happy birthday Sam!");
    }

    #[test]
    fn test_empty_response_fallback() {
        let message = run(Scripted(|| Ok("   ".to_string())));
        assert_eq!(message.text, EMPTY_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_malformed_response_fallback() {
        let message = run(Scripted(|| Err(GenerationError::Decode("eof".to_string()))));
        assert_eq!(message.text, EMPTY_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_failure_fallback() {
        let message = run(Scripted(|| Err(GenerationError::MissingApiKey)));
        assert_eq!(message.text, SERVICE_FAILURE_FALLBACK);
        assert_ne!(EMPTY_RESPONSE_FALLBACK, SERVICE_FAILURE_FALLBACK);
    }

    #[test]
    fn test_prompt_snapshot() {
        insta::assert_snapshot!("prompt_for_alex_and_sam", build_prompt(&alex_and_sam()));
    }

    #[test]
    fn test_prompt_includes_age_only_when_set() {
        let card = alex_and_sam();
        assert!(!build_prompt(&card).contains("Turning:"));

        let card = card.with_age("30");
        assert!(build_prompt(&card).contains("Turning: 30"));
    }

    #[test]
    fn test_prompt_platonic_for_friends() {
        let card = alex_and_sam().with_relation(Relation::BestFriend);
        let prompt = build_prompt(&card);
        assert!(prompt.contains("Platonic"));
        assert!(prompt.contains("(Best Friend)"));
    }

    #[test]
    fn test_prompt_tone_rules_differ() {
        let prompts: Vec<String> = Tone::all()
            .iter()
            .map(|tone| build_prompt(&alex_and_sam().with_tone(*tone)))
            .collect();
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_response_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Happy " }, { "text": "day" }] } }]
        }))
        .unwrap();
        assert_eq!(parsed.text(), "Happy day");

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }
}
