use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::GlossforgeError;

/// Grammatical sketch of a generated language. Only the word order is
/// guaranteed; everything else is at the generation service's discretion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    pub word_order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noun_cases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb_conjugation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonotactics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pluralization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_rules: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phonetics {
    pub vowels: String,
    pub consonants: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allophony: Option<String>,
}

/// Everything the generation service returns for one conlang.
///
/// The dictionary and alphabet mapping keep the generator's own ordering;
/// the mapping values are raw shape descriptions, normalized only when the
/// font is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageResult {
    pub grammar: Grammar,
    pub phonetics: Phonetics,
    pub dictionary: IndexMap<String, String>,
    pub alphabet_mapping: IndexMap<String, String>,
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // static pattern
    let re = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap();
    re
});

/// Strip one markdown code fence, if present.
///
/// Models are told not to fence their JSON but do anyway; treat the fence
/// as transport noise rather than an error.
pub fn strip_code_fence(content: &str) -> &str {
    match CODE_FENCE.captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => content.trim(),
    }
}

/// Parse untrusted generator output into a [`LanguageResult`].
pub fn parse_language_result(content: &str) -> Result<LanguageResult, GlossforgeError> {
    let json = strip_code_fence(content);
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"{
        "grammar": {"word_order": "SOV"},
        "phonetics": {"vowels": "a e i", "consonants": "k t n"},
        "dictionary": {"kala": "water", "tane": "fire"},
        "alphabet_mapping": {"A": "circle", "B": "line"}
    }"#;

    #[test]
    fn parses_plain_json() {
        let result = parse_language_result(MINIMAL).unwrap();
        assert_eq!(result.grammar.word_order, "SOV");
        assert_eq!(result.grammar.noun_cases, None);
        assert_eq!(result.dictionary.len(), 2);
        assert_eq!(result.alphabet_mapping["A"], "circle");
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{MINIMAL}\n```");
        let result = parse_language_result(&fenced).unwrap();
        assert_eq!(result.phonetics.vowels, "a e i");

        let bare_fence = format!("```\n{MINIMAL}\n```");
        assert!(parse_language_result(&bare_fence).is_ok());

        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn missing_required_fields_are_a_schema_error() {
        let err = parse_language_result(r#"{"grammar": {}, "phonetics": {}}"#).unwrap_err();
        assert!(matches!(err, GlossforgeError::SchemaViolation(_)));

        let err = parse_language_result("not json at all").unwrap_err();
        assert!(matches!(err, GlossforgeError::SchemaViolation(_)));
    }

    #[test]
    fn dictionary_order_is_preserved() {
        let result = parse_language_result(MINIMAL).unwrap();
        let words: Vec<&String> = result.dictionary.keys().collect();
        assert_eq!(words, vec!["kala", "tane"]);
    }
}
