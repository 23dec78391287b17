//! Box-drawing rune algebra.
//!
//! Every supported glyph in the U+2500 block decomposes into a *quad*: the
//! stroke strength towards each of the four directions plus a style. Lines
//! are stamped into a cell by merging new strokes into the cell's current
//! quad and mapping the result back to a rune, which is how junctions (tees,
//! crosses, mixed-strength corners) come out right without any special
//! casing.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::cell::Char;

/// Stroke decomposition of a box-drawing rune:
/// `[north, south, west, east, style]`.
///
/// Directions take `0` (none), `1` (light) or `2` (heavy). Style is `0`
/// (normal), `1` (rounded) or a dash variant in `2..=4`.
pub type Quad = [u8; 5];

/// Smallest dash style value.
pub const MIN_DASH: u8 = 2;
/// Largest dash style value.
pub const MAX_DASH: u8 = 4;

#[rustfmt::skip]
const QUADS: &[(char, Quad)] = &[
    ('─', [0, 0, 1, 1, 0]),
    ('━', [0, 0, 2, 2, 0]),
    ('│', [1, 1, 0, 0, 0]),
    ('┃', [2, 2, 0, 0, 0]),
    ('┄', [0, 0, 1, 1, 3]),
    ('┅', [0, 0, 2, 2, 3]),
    ('┆', [1, 1, 0, 0, 3]),
    ('┇', [2, 2, 0, 0, 3]),
    ('┈', [0, 0, 1, 1, 4]),
    ('┉', [0, 0, 2, 2, 4]),
    ('┊', [1, 1, 0, 0, 4]),
    ('┋', [2, 2, 0, 0, 4]),
    ('┌', [0, 1, 0, 1, 0]),
    ('┍', [0, 1, 0, 2, 0]),
    ('┎', [0, 2, 0, 1, 0]),
    ('┏', [0, 2, 0, 2, 0]),
    ('┐', [0, 1, 1, 0, 0]),
    ('┑', [0, 1, 2, 0, 0]),
    ('┒', [0, 2, 1, 0, 0]),
    ('┓', [0, 2, 2, 0, 0]),
    ('└', [1, 0, 0, 1, 0]),
    ('┕', [1, 0, 0, 2, 0]),
    ('┖', [2, 0, 0, 1, 0]),
    ('┗', [2, 0, 0, 2, 0]),
    ('┘', [1, 0, 1, 0, 0]),
    ('┙', [1, 0, 2, 0, 0]),
    ('┚', [2, 0, 1, 0, 0]),
    ('┛', [2, 0, 2, 0, 0]),
    ('├', [1, 1, 0, 1, 0]),
    ('┝', [1, 1, 0, 2, 0]),
    ('┞', [2, 1, 0, 1, 0]),
    ('┟', [1, 2, 0, 1, 0]),
    ('┠', [2, 2, 0, 1, 0]),
    ('┡', [2, 1, 0, 2, 0]),
    ('┢', [1, 2, 0, 2, 0]),
    ('┣', [2, 2, 0, 2, 0]),
    ('┤', [1, 1, 1, 0, 0]),
    ('┥', [1, 1, 2, 0, 0]),
    ('┦', [2, 1, 1, 0, 0]),
    ('┧', [1, 2, 1, 0, 0]),
    ('┨', [2, 2, 1, 0, 0]),
    ('┩', [2, 1, 2, 0, 0]),
    ('┪', [1, 2, 2, 0, 0]),
    ('┫', [2, 2, 2, 0, 0]),
    ('┬', [0, 1, 1, 1, 0]),
    ('┭', [0, 1, 2, 1, 0]),
    ('┮', [0, 1, 1, 2, 0]),
    ('┯', [0, 1, 2, 2, 0]),
    ('┰', [0, 2, 1, 1, 0]),
    ('┱', [0, 2, 2, 1, 0]),
    ('┲', [0, 2, 1, 2, 0]),
    ('┳', [0, 2, 2, 2, 0]),
    ('┴', [1, 0, 1, 1, 0]),
    ('┵', [1, 0, 2, 1, 0]),
    ('┶', [1, 0, 1, 2, 0]),
    ('┷', [1, 0, 2, 2, 0]),
    ('┸', [2, 0, 1, 1, 0]),
    ('┹', [2, 0, 2, 1, 0]),
    ('┺', [2, 0, 1, 2, 0]),
    ('┻', [2, 0, 2, 2, 0]),
    ('┼', [1, 1, 1, 1, 0]),
    ('┽', [1, 1, 2, 1, 0]),
    ('┾', [1, 1, 1, 2, 0]),
    ('┿', [1, 1, 2, 2, 0]),
    ('╀', [2, 1, 1, 1, 0]),
    ('╁', [1, 2, 1, 1, 0]),
    ('╂', [2, 2, 1, 1, 0]),
    ('╃', [2, 1, 2, 1, 0]),
    ('╄', [2, 1, 1, 2, 0]),
    ('╅', [1, 2, 2, 1, 0]),
    ('╆', [1, 2, 1, 2, 0]),
    ('╇', [2, 1, 2, 2, 0]),
    ('╈', [1, 2, 2, 2, 0]),
    ('╉', [2, 2, 2, 1, 0]),
    ('╊', [2, 2, 1, 2, 0]),
    ('╋', [2, 2, 2, 2, 0]),
    ('╌', [0, 0, 1, 1, 2]),
    ('╍', [0, 0, 2, 2, 2]),
    ('╎', [1, 1, 0, 0, 2]),
    ('╏', [2, 2, 0, 0, 2]),
    ('╭', [0, 1, 0, 1, 1]),
    ('╮', [0, 1, 1, 0, 1]),
    ('╯', [1, 0, 1, 0, 1]),
    ('╰', [1, 0, 0, 1, 1]),
    ('╴', [0, 0, 1, 0, 0]),
    ('╵', [1, 0, 0, 0, 0]),
    ('╶', [0, 0, 0, 1, 0]),
    ('╷', [0, 1, 0, 0, 0]),
    ('╸', [0, 0, 2, 0, 0]),
    ('╹', [2, 0, 0, 0, 0]),
    ('╺', [0, 0, 0, 2, 0]),
    ('╻', [0, 2, 0, 0, 0]),
    ('╼', [0, 0, 1, 2, 0]),
    ('╽', [1, 2, 0, 0, 0]),
    ('╾', [0, 0, 2, 1, 0]),
    ('╿', [2, 1, 0, 0, 0]),
];

fn pack(quad: Quad) -> u16 {
    (quad[0] as u16) << 12
        | (quad[1] as u16) << 9
        | (quad[2] as u16) << 6
        | (quad[3] as u16) << 3
        | quad[4] as u16
}

static RUNE_TO_QUAD: LazyLock<HashMap<u32, Quad>> =
    LazyLock::new(|| QUADS.iter().map(|&(rune, quad)| (rune as u32, quad)).collect());

static QUAD_TO_RUNE: LazyLock<HashMap<u16, u32>> =
    LazyLock::new(|| QUADS.iter().map(|&(rune, quad)| (pack(quad), rune as u32)).collect());

/// The quad of a box-drawing rune, `None` for anything else.
pub fn rune_to_quad(rune: u32) -> Option<Quad> {
    RUNE_TO_QUAD.get(&rune).copied()
}

/// The rune for a quad, `None` if no glyph exists for it.
pub fn quad_to_rune(quad: Quad) -> Option<u32> {
    QUAD_TO_RUNE.get(&pack(quad)).copied()
}

// Exactly one light stroke vertically and one horizontally: the four shapes
// that have rounded forms.
fn is_light_corner(quad: &Quad) -> bool {
    let [n, s, w, e, _] = *quad;
    (n == 1 && s == 0 || n == 0 && s == 1) && (w == 1 && e == 0 || w == 0 && e == 1)
}

// Only horizontal or only vertical strokes, of one strength.
fn is_straight(quad: &Quad) -> bool {
    let [n, s, w, e, _] = *quad;
    n == s && w == e && (n != 0) != (w != 0)
}

impl Char {
    /// Stamps line strokes into this cell.
    ///
    /// `segments` is the strength towards `[north, south, west, east]`; zero
    /// entries leave the cell's current stroke in that direction alone. The
    /// style rules apply afterwards: light corners become rounded when
    /// requested, straight runs take a requested dash style. If the merged
    /// quad has no glyph the rune is left unchanged.
    pub fn stamp_segments(&mut self, segments: [u8; 4], dash: u8, rounded: bool) {
        let mut quad = rune_to_quad(self.rune).unwrap_or([0; 5]);
        for (slot, segment) in quad.iter_mut().zip(segments) {
            if segment != 0 {
                *slot = segment;
            }
        }
        if rounded && is_light_corner(&quad) {
            quad[4] = 1;
        } else if is_straight(&quad) && (MIN_DASH..=MAX_DASH).contains(&dash) {
            quad[4] = dash;
        }
        if let Some(rune) = quad_to_rune(quad) {
            self.rune = rune;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::SPACE;

    fn stamped(ch: char, segments: [u8; 4], dash: u8, rounded: bool) -> char {
        let mut cell = Char::new(ch, SPACE.attrs);
        cell.stamp_segments(segments, dash, rounded);
        cell.as_char().unwrap()
    }

    #[test]
    fn every_table_rune_round_trips() {
        for &(rune, quad) in QUADS {
            assert_eq!(rune_to_quad(rune as u32), Some(quad), "{rune}");
            assert_eq!(quad_to_rune(quad), Some(rune as u32), "{rune}");
        }
    }

    #[test]
    fn quads_are_unique() {
        assert_eq!(QUAD_TO_RUNE.len(), QUADS.len());
        assert_eq!(RUNE_TO_QUAD.len(), QUADS.len());
    }

    #[test]
    fn stamp_on_blank_makes_plain_strokes() {
        assert_eq!(stamped(' ', [0, 0, 1, 1], 0, false), '─');
        assert_eq!(stamped(' ', [2, 2, 0, 0], 0, false), '┃');
        assert_eq!(stamped(' ', [0, 0, 0, 1], 0, false), '╶');
    }

    #[test]
    fn stamp_merges_into_junctions() {
        // Horizontal light over vertical heavy makes a mixed cross.
        assert_eq!(stamped('┃', [0, 0, 1, 1], 0, false), '╂');
        // East stub into a heavy vertical makes a tee.
        assert_eq!(stamped('┃', [0, 0, 0, 1], 0, false), '┠');
        assert_eq!(stamped('┃', [0, 0, 1, 0], 0, false), '┨');
    }

    #[test]
    fn stronger_stroke_overrides_weaker() {
        assert_eq!(stamped('─', [0, 0, 2, 2], 0, false), '━');
        assert_eq!(stamped('━', [0, 0, 1, 1], 0, false), '─');
    }

    #[test]
    fn rounded_applies_to_light_corners_only() {
        assert_eq!(stamped(' ', [0, 1, 0, 1], 0, true), '╭');
        assert_eq!(stamped(' ', [1, 0, 1, 0], 0, true), '╯');
        // A heavy corner has no rounded form.
        assert_eq!(stamped(' ', [0, 2, 0, 2], 0, true), '┏');
        // A tee is not a corner.
        assert_eq!(stamped('│', [0, 0, 0, 1], 0, true), '├');
    }

    #[test]
    fn dash_applies_to_straight_runs_only() {
        assert_eq!(stamped(' ', [0, 0, 1, 1], 2, false), '╌');
        assert_eq!(stamped(' ', [1, 1, 0, 0], 3, false), '┆');
        assert_eq!(stamped(' ', [0, 0, 2, 2], 4, false), '┉');
        // Corners take no dash.
        assert_eq!(stamped(' ', [0, 1, 0, 1], 2, false), '┌');
    }

    #[test]
    fn unknown_quad_leaves_rune_unchanged() {
        // Stamping over a non-box rune with no strokes to add resolves to
        // the all-zero quad, which has no glyph.
        assert_eq!(stamped('x', [0, 0, 0, 0], 0, false), 'x');
    }
}
