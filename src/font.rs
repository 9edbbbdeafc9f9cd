use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    compile,
    glyph::Glyph,
    outline::{ShapeKeyword, ASCENDER, DESCENDER, UNITS_PER_EM},
    GlossforgeError,
};

/// Family name used when sanitization leaves nothing behind.
const FALLBACK_FAMILY_NAME: &str = "Conlang";
/// OpenType family names get unwieldy beyond this.
const MAX_FAMILY_NAME_LEN: usize = 50;

/// An assembled font, ready for binary compilation.
///
/// Built once per request from a fresh alphabet mapping, serialized
/// immediately, then discarded. The glyph list invariant: the codepoint-less
/// fallback first, then character glyphs in ascending codepoint order.
#[derive(Debug, Clone)]
pub struct ScriptFont {
    pub family_name: String,
    pub style_name: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub glyphs: Vec<Glyph>,
}

impl ScriptFont {
    /// Assemble the glyph set for `mapping`.
    ///
    /// Every Latin letter A–Z/a–z gets a glyph whether or not the mapping
    /// covers it; characters the mapping introduces beyond that range are
    /// included too. Ordering is fixed by ascending codepoint so identical
    /// input always produces an identical font.
    pub fn new(display_name: &str, mapping: &IndexMap<String, String>) -> Self {
        let mut characters: BTreeSet<char> = ('A'..='Z').chain('a'..='z').collect();
        // Only a key's first character is meaningful; the set dedups any
        // collision with the Latin range.
        characters.extend(mapping.keys().filter_map(|key| key.chars().next()));

        let mut glyphs = vec![Glyph::notdef()];
        glyphs.extend(
            characters
                .iter()
                .map(|&ch| Glyph::for_char(ch, resolve_shape(mapping, ch))),
        );

        ScriptFont {
            family_name: sanitize_family_name(display_name),
            style_name: "Regular".to_string(),
            units_per_em: UNITS_PER_EM,
            ascender: ASCENDER,
            descender: DESCENDER,
            glyphs,
        }
    }

    /// Serialize to a binary TrueType font.
    pub fn compile(&self) -> Result<Vec<u8>, GlossforgeError> {
        compile::compile(self)
    }
}

/// Build a font for `mapping` and return the raw bytes.
pub fn build_font(
    display_name: &str,
    mapping: &IndexMap<String, String>,
) -> Result<Vec<u8>, GlossforgeError> {
    let font = ScriptFont::new(display_name, mapping);
    log::info!(
        "Compiling font '{}' with {} glyphs",
        font.family_name,
        font.glyphs.len()
    );
    font.compile()
}

/// Strip whitespace, cap the length, and never return an empty name.
pub fn sanitize_family_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_FAMILY_NAME_LEN)
        .collect();
    if stripped.is_empty() {
        FALLBACK_FAMILY_NAME.to_string()
    } else {
        stripped
    }
}

// Mapping lookup order: the exact character, its uppercase form, its
// lowercase form, then the default shape.
fn resolve_shape(mapping: &IndexMap<String, String>, ch: char) -> ShapeKeyword {
    mapping
        .get(&ch.to_string())
        .or_else(|| mapping.get(&ch.to_uppercase().to_string()))
        .or_else(|| mapping.get(&ch.to_lowercase().to_string()))
        .map(|shape| ShapeKeyword::from(shape.as_str()))
        .unwrap_or_default()
}
