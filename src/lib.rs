#![deny(clippy::unwrap_used, clippy::expect_used)]

mod compile;
mod error;
mod font;
mod glyph;
mod language;
mod outline;

#[cfg(feature = "server")]
pub mod generator;
#[cfg(feature = "server")]
pub mod server;

pub use crate::{
    error::GlossforgeError,
    font::{build_font, sanitize_family_name, ScriptFont},
    glyph::Glyph,
    language::{parse_language_result, strip_code_fence, Grammar, LanguageResult, Phonetics},
    outline::{outline_for, ShapeKeyword, GLYPH_SIZE, UNITS_PER_EM},
};
