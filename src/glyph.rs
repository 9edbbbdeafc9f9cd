use kurbo::BezPath;
use smol_str::SmolStr;

use crate::outline::{ShapeKeyword, GLYPH_SIZE, ORIGIN};

/// Advance width for every glyph except the space.
pub const ADVANCE_WIDTH: u16 = 600;
/// The space gets a narrower advance.
pub const SPACE_ADVANCE_WIDTH: u16 = 300;

/// A single letterform: metrics plus outline.
///
/// Exactly one glyph per font has no codepoint: the `.notdef` fallback,
/// which renderers substitute for any unmapped character. It must sit at
/// index 0 of the glyph list.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub name: SmolStr,
    pub codepoint: Option<u32>,
    pub advance_width: u16,
    pub outline: BezPath,
}

impl Glyph {
    /// The mandatory fallback glyph: a rectangle filling the glyph box.
    pub fn notdef() -> Self {
        let o = ORIGIN;
        let s = GLYPH_SIZE;
        let mut outline = BezPath::new();
        outline.move_to((o, o));
        outline.line_to((o + s, o));
        outline.line_to((o + s, o + s));
        outline.line_to((o, o + s));
        outline.close_path();
        Glyph {
            name: SmolStr::new(".notdef"),
            codepoint: None,
            advance_width: ADVANCE_WIDTH,
            outline,
        }
    }

    /// Build the glyph for one character with its resolved shape.
    ///
    /// Names are derived from the codepoint (`char_66` for 'B') so they stay
    /// valid PostScript identifiers whatever the mapping throws at us.
    pub fn for_char(ch: char, shape: ShapeKeyword) -> Self {
        let codepoint = ch as u32;
        let (name, advance_width) = if ch == ' ' {
            (SmolStr::new("space"), SPACE_ADVANCE_WIDTH)
        } else {
            (SmolStr::new(format!("char_{codepoint}")), ADVANCE_WIDTH)
        };
        Glyph {
            name,
            codepoint: Some(codepoint),
            advance_width,
            outline: shape.outline(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.codepoint.is_none()
    }
}
