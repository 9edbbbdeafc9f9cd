//! Binary font compilation.
//!
//! Turns a [`ScriptFont`](crate::ScriptFont) into TrueType bytes: outlines
//! are converted from cubic to quadratic splines, packed into glyf/loca, and
//! joined by the metric, mapping, and naming tables. Everything here is pure
//! and deterministic; `head` timestamps stay at zero so identical input
//! yields byte-identical output.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, Glyph as RawGlyph, SimpleGlyph},
        head::{Flags, Head},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::{FWord, GlyphId, NameId, Tag, UfWord},
    FontBuilder,
};

use crate::{font::ScriptFont, GlossforgeError};

// Maximum deviation, in font units, when approximating cubics with
// quadratic splines. glyf stores quadratics only.
const CUBIC_TO_QUAD_TOLERANCE: f64 = 1.0;

const VENDOR_ID: &[u8; 4] = b"GLSF";

/// Serialize `font` to its binary TrueType representation.
pub fn compile(font: &ScriptFont) -> Result<Vec<u8>, GlossforgeError> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut metrics: Vec<LongMetric> = Vec::with_capacity(font.glyphs.len());
    let mut mappings: Vec<(char, GlyphId)> = Vec::with_capacity(font.glyphs.len());
    let mut glyph_names: Vec<&str> = Vec::with_capacity(font.glyphs.len());

    let mut font_bbox: Option<Bbox> = None;
    let mut advance_width_max: u16 = 0;
    let mut min_lsb = i16::MAX;
    let mut min_rsb = i16::MAX;
    let mut x_max_extent = i16::MIN;
    let mut max_points: u16 = 0;
    let mut max_contours: u16 = 0;

    for (index, glyph) in font.glyphs.iter().enumerate() {
        let quadratic = to_quadratic(&glyph.outline, CUBIC_TO_QUAD_TOLERANCE).map_err(
            |reason| GlossforgeError::BadOutline {
                glyph: glyph.name.to_string(),
                reason,
            },
        )?;
        let simple = SimpleGlyph::from_bezpath(&quadratic).map_err(|e| {
            GlossforgeError::FontBuild(format!(
                "Error building outline for glyph {}: {:?}",
                glyph.name, e
            ))
        })?;

        let bbox = simple.bbox;
        let contours = simple.contours.len();
        let points: usize = simple.contours.iter().map(|c| c.iter().count()).sum();
        max_contours = max_contours.max(contours as u16);
        max_points = max_points.max(points as u16);

        advance_width_max = advance_width_max.max(glyph.advance_width);
        min_lsb = min_lsb.min(bbox.x_min);
        min_rsb = min_rsb.min(glyph.advance_width as i16 - bbox.x_max);
        x_max_extent = x_max_extent.max(bbox.x_max);
        font_bbox = Some(match font_bbox {
            None => bbox,
            Some(existing) => Bbox {
                x_min: existing.x_min.min(bbox.x_min),
                y_min: existing.y_min.min(bbox.y_min),
                x_max: existing.x_max.max(bbox.x_max),
                y_max: existing.y_max.max(bbox.y_max),
            },
        });

        glyf_builder
            .add_glyph(&RawGlyph::Simple(simple))
            .map_err(|e| {
                GlossforgeError::FontBuild(format!(
                    "Error adding glyph {} to font: {:?}",
                    glyph.name, e
                ))
            })?;
        metrics.push(LongMetric::new(glyph.advance_width, bbox.x_min));
        glyph_names.push(glyph.name.as_str());

        if let Some(codepoint) = glyph.codepoint {
            let ch = char::from_u32(codepoint).ok_or_else(|| {
                GlossforgeError::FontBuild(format!(
                    "Glyph {} has invalid codepoint {codepoint}",
                    glyph.name
                ))
            })?;
            mappings.push((ch, GlyphId::new(index as u32)));
        }
    }

    let (glyf, loca, loca_format) = glyf_builder.build();
    // The fallback glyph is always present, so the box is always Some
    let bbox = font_bbox.unwrap_or(Bbox {
        x_min: 0,
        y_min: 0,
        x_max: 0,
        y_max: 0,
    });
    let num_glyphs = font.glyphs.len() as u16;

    let first_char = mappings.iter().map(|(ch, _)| *ch as u32).min().unwrap_or(0);
    let last_char = mappings.iter().map(|(ch, _)| *ch as u32).max().unwrap_or(0);

    let cmap = Cmap::from_mappings(mappings)
        .map_err(|e| GlossforgeError::FontBuild(format!("Error building cmap table: {e:?}")))?;

    let head = Head {
        units_per_em: font.units_per_em,
        // Baseline at y=0, left sidebearing at x=0
        flags: Flags::from_bits_truncate(0x0003),
        x_min: bbox.x_min,
        y_min: bbox.y_min,
        x_max: bbox.x_max,
        y_max: bbox.y_max,
        lowest_rec_ppem: 6,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };

    let hhea = Hhea {
        ascender: FWord::new(font.ascender),
        descender: FWord::new(font.descender),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(advance_width_max),
        min_left_side_bearing: FWord::new(min_lsb),
        min_right_side_bearing: FWord::new(min_rsb),
        x_max_extent: FWord::new(x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
        ..Default::default()
    };

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(max_points),
        max_contours: Some(max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let os2 = Os2 {
        us_weight_class: 400,
        us_width_class: 5,
        s_typo_ascender: font.ascender,
        s_typo_descender: font.descender,
        s_typo_line_gap: 0,
        us_win_ascent: font.ascender.max(0) as u16,
        us_win_descent: font.descender.unsigned_abs(),
        fs_selection: SelectionFlags::REGULAR,
        ach_vend_id: Tag::new(VENDOR_ID),
        us_first_char_index: first_char.min(0xFFFF) as u16,
        us_last_char_index: last_char.min(0xFFFF) as u16,
        ..Default::default()
    };

    let hmtx = Hmtx::new(metrics, vec![]);

    let postscript_name = format!("{}-{}", font.family_name, font.style_name);
    let full_name = format!("{} {}", font.family_name, font.style_name);
    let name = Name::new(vec![
        name_record(NameId::FAMILY_NAME, &font.family_name),
        name_record(NameId::SUBFAMILY_NAME, &font.style_name),
        name_record(NameId::UNIQUE_ID, &format!("1.000;GLSF;{postscript_name}")),
        name_record(NameId::FULL_NAME, &full_name),
        name_record(NameId::VERSION_STRING, "Version 1.000"),
        name_record(NameId::POSTSCRIPT_NAME, &postscript_name),
    ]);

    let post = Post::new_v2(glyph_names);

    let mut builder = FontBuilder::new();
    builder.add_table(&head).map_err(table_error)?;
    builder.add_table(&hhea).map_err(table_error)?;
    builder.add_table(&maxp).map_err(table_error)?;
    builder.add_table(&os2).map_err(table_error)?;
    builder.add_table(&hmtx).map_err(table_error)?;
    builder.add_table(&cmap).map_err(table_error)?;
    builder.add_table(&loca).map_err(table_error)?;
    builder.add_table(&glyf).map_err(table_error)?;
    builder.add_table(&name).map_err(table_error)?;
    builder.add_table(&post).map_err(table_error)?;
    Ok(builder.build())
}

fn table_error(e: impl std::fmt::Debug) -> GlossforgeError {
    GlossforgeError::FontBuild(format!("Error adding table to font: {e:?}"))
}

fn name_record(name_id: NameId, value: &str) -> NameRecord {
    // Windows, Unicode BMP, US English
    NameRecord::new(3, 1, 0x409, name_id, value.to_string().into())
}

// glyf stores quadratic Béziers only; rewrite any cubic segments as
// quadratic splines within `tolerance` font units.
fn to_quadratic(path: &BezPath, tolerance: f64) -> Result<BezPath, String> {
    let mut converted = BezPath::new();
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => {
                converted.move_to(p);
                current = p;
                subpath_start = p;
            }
            PathEl::LineTo(p) => {
                converted.line_to(p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                converted.quad_to(p1, p2);
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let cubic = CubicBez::new(current, p1, p2, p3);
                let splines = kurbo::cubics_to_quadratic_splines(&[cubic], tolerance)
                    .ok_or_else(|| format!("Could not approximate cubic segment {cubic:?}"))?;
                for spline in &splines {
                    for quad in spline.to_quads() {
                        converted.quad_to(quad.p1, quad.p2);
                    }
                }
                current = p3;
            }
            PathEl::ClosePath => {
                converted.close_path();
                current = subpath_start;
            }
        }
    }
    Ok(converted)
}
