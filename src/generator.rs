//! The external language-generation service.
//!
//! Creative work (grammar, phonetics, vocabulary, letter shapes) is
//! delegated to a chat-completion model behind the [`LanguageGenerator`]
//! trait; [`OpenAiGenerator`] is the production implementation. One request
//! in, one completion out — no retries, no streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    language::{self, LanguageResult},
    GlossforgeError,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

const SYSTEM_PROMPT: &str = r#"You are an expert conlanger (constructed language designer) and linguist. Your task is to generate a complete, logically consistent constructed language (conlang) based on the user's description and vibe.

You MUST respond with a single valid JSON object (no markdown, no code fence). The JSON must have exactly this structure:

{
  "grammar": {
    "word_order": "string (e.g. SOV, SVO)",
    "noun_cases": ["list", "of", "cases"],
    "verb_conjugation": "short description",
    "phonotactics": "rules for syllable structure (e.g. (C)V(C))",
    "pluralization": "how plurals are formed",
    "other_rules": "any other key grammatical rules"
  },
  "phonetics": {
    "vowels": "list or description of vowels",
    "consonants": "list or description of consonants",
    "stress": "stress pattern description",
    "allophony": "brief allophony notes if relevant"
  },
  "dictionary": {
    "word_1": "translation_1",
    "word_2": "translation_2"
  },
  "alphabet_mapping": {
    "A": "glyph_description",
    "B": "glyph_description"
  }
}

CRITICAL RULES for alphabet_mapping:
- Include mappings for A-Z (Latin uppercase). You may also include a-z if the language uses distinct lowercase.
- Each value (glyph_description) MUST be exactly one of these keywords: "circle", "line", "loop", "angle", "curve", "dot", "cross", "wave".
- Use these keywords to describe the visual style of each letter in the new script (e.g. "elvish" might use many "curve" and "wave", "dwarven" might use "angle" and "line").
- Do not use any other words - only the keywords above.

For dictionary: generate at least 15-25 basic vocabulary items (nouns, verbs, adjectives, numbers, common words) that fit the vibe and phonotactics. Keys are words in the new language, values are English translations.

Be creative but consistent. The language must feel coherent and match the requested vibe."#;

/// What the user asked for, as handed to the generation service.
#[derive(Debug, Clone)]
pub struct ConlangPrompt {
    pub name: String,
    pub vibe: String,
    pub description: String,
    pub complexity: u8,
}

#[async_trait]
pub trait LanguageGenerator: Send + Sync {
    async fn generate(&self, prompt: &ConlangPrompt) -> Result<LanguageResult, GlossforgeError>;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// The API key is read from `OPENAI_API_KEY` at request time, so the server
/// can start without credentials and fail per request instead.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    model: String,
    api_base: String,
}

impl OpenAiGenerator {
    pub fn from_env() -> Self {
        OpenAiGenerator {
            client: reqwest::Client::new(),
            model: std::env::var("GLOSSFORGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_base: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        }
    }

    fn api_key() -> Result<String, GlossforgeError> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GlossforgeError::MissingApiKey),
        }
    }

    fn user_prompt(prompt: &ConlangPrompt) -> String {
        format!(
            "Create a conlang with these specifications:\n\n\
             Name: {}\n\
             Vibe / aesthetic: {}\n\
             Phonetic / style description: {}\n\
             Complexity (1-10): {}\n\n\
             Generate the full JSON object with grammar, phonetics, dictionary (15-25 words), \
             and alphabet_mapping for A-Z using only the allowed glyph_description keywords: \
             circle, line, loop, angle, curve, dot, cross, wave.",
            prompt.name, prompt.vibe, prompt.description, prompt.complexity
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LanguageGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &ConlangPrompt) -> Result<LanguageResult, GlossforgeError> {
        let key = Self::api_key()?;
        let url = format!(
            "{}/v1/chat/completions",
            self.api_base.trim_end_matches('/')
        );
        let user_prompt = Self::user_prompt(prompt);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: 0.8,
        };

        log::info!(
            "Requesting conlang '{}' from model {}",
            prompt.name,
            self.model
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Generation service returned {status}");
            return Err(GlossforgeError::Generation(format!(
                "generation service returned {status}: {body}"
            )));
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GlossforgeError::EmptyResponse)?;

        language::parse_language_result(&content)
    }
}
