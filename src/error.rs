use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlossforgeError {
    #[error("OPENAI_API_KEY is not set. Add it to your .env file or environment")]
    MissingApiKey,

    #[error("Empty response from the generation service")]
    EmptyResponse,

    #[error("Generation service error: {0}")]
    Generation(String),

    #[cfg(feature = "server")]
    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generated language failed schema validation: {0}")]
    SchemaViolation(#[from] serde_json::Error),

    #[error("Ill-constructed outline for glyph {glyph}: {reason}")]
    BadOutline { glyph: String, reason: String },

    #[error("Error building font: {0}")]
    FontBuild(String),

    #[error("IO Error: {0}")]
    IO(#[from] io::Error),
}
