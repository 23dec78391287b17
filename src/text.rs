//! A rectangle of styled cells.
//!
//! [`Text`] is the unit of content everywhere: window buffers, update
//! payloads and the display back-buffer are all `Text`s. The invariant is
//! that every row has the same width.
//!
//! Mutating operations clip against the receiver; [`patch`](Text::patch)
//! accepts negative positions and overhanging sources. Line and box drawing
//! goes through the quad algebra in [`glyph`](crate::glyph), so crossing
//! lines form proper junction glyphs.

use std::fmt;

use crate::cell::{AttributeMode, Attributes, Char, CharAttributes, NONE_RUNE, SPACE};
use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::geometry::{DIM_HIGH, DIM_LOW, Dim, RECT_MAX, Rectangle, Vector};

/// Direction of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A horizontal or vertical line run.
///
/// `end` is the exclusive end coordinate along the orientation axis;
/// [`DIM_HIGH`] means "to the far edge" and a negative value counts from the
/// right or bottom. `extend_begin`/`extend_end` keep the outward-facing
/// stroke on the first/last cell, for lines meant to join up with
/// neighbouring cells.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    pub position: Vector,
    pub end: Dim,
    pub orientation: Orientation,
    pub extend_begin: bool,
    pub extend_end: bool,
}

impl Line {
    pub const fn horizontal(position: Vector, end: Dim) -> Self {
        Self {
            position,
            end,
            orientation: Orientation::Horizontal,
            extend_begin: false,
            extend_end: false,
        }
    }

    pub const fn vertical(position: Vector, end: Dim) -> Self {
        Self {
            position,
            end,
            orientation: Orientation::Vertical,
            extend_begin: false,
            extend_end: false,
        }
    }

    pub const fn extended(mut self, begin: bool, end: bool) -> Self {
        self.extend_begin = begin;
        self.extend_end = end;
        self
    }
}

/// A rectangular grid of [`Char`] cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    pub(crate) data: Vec<Vec<Char>>,
}

impl Text {
    /// Builds a text from a string, splitting on line feeds.
    ///
    /// The grid width is the widest line; shorter lines are right-padded
    /// with spaces carrying the same attributes. An empty string makes an
    /// empty text, and a trailing line feed adds an empty line.
    pub fn new(s: &str, fg: Rgb, bg: Rgb, attr: Attributes, mix: AttributeMode) -> Self {
        if s.is_empty() {
            return Self::default();
        }
        let lines: Vec<&str> = s.split('\n').collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let attrs = CharAttributes::new(fg, bg, attr, mix);
        let data = lines
            .iter()
            .map(|line| {
                let mut row: Vec<Char> = line.chars().map(|ch| Char::new(ch, attrs)).collect();
                row.resize(width, Char::new(' ', attrs));
                row
            })
            .collect();
        Self { data }
    }

    /// A `size` rectangle of `ch`.
    ///
    /// The cell's combining mode is replaced by `mix_default` when it is
    /// `Default`. The size is clamped to at least one cell.
    pub fn filled(ch: Char, size: Vector, mix_default: AttributeMode) -> Self {
        let mix = if ch.attrs.mix == AttributeMode::Default { mix_default } else { ch.attrs.mix };
        let cell = Char {
            rune: ch.rune,
            attrs: CharAttributes { mix, ..ch.attrs },
        };
        let width = size.x.max(1) as usize;
        let height = size.y.max(1) as usize;
        Self {
            data: vec![vec![cell; width]; height],
        }
    }

    pub fn height(&self) -> Dim {
        self.data.len() as Dim
    }

    pub fn width(&self) -> Dim {
        self.data.first().map_or(0, |row| row.len() as Dim)
    }

    pub fn size(&self) -> Vector {
        Vector::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The rectangle `(0, 0)`..`size`.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::between(Vector::default(), self.size())
    }

    /// The cell at a non-negative position.
    pub fn cell(&self, position: Vector) -> Option<&Char> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        self.data.get(position.y as usize)?.get(position.x as usize)
    }

    pub(crate) fn cell_mut(&mut self, position: Vector) -> Option<&mut Char> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        self.data.get_mut(position.y as usize)?.get_mut(position.x as usize)
    }

    /// The cell at a possibly negative position (negative counts from the
    /// far edge), `None` outside the text.
    pub fn get(&self, position: Vector) -> Option<Char> {
        self.cell(self.size().position(position)).copied()
    }

    /// Like [`get`](Self::get) but out-of-bounds access is an error.
    pub fn at(&self, position: Vector) -> Result<Char> {
        self.get(position).ok_or(Error::IndexOutOfBounds {
            position,
            size: self.size(),
        })
    }

    /// Grows the grid to at least `size`, filling new cells with `fill`.
    /// Never shrinks.
    pub fn extend(&mut self, size: Vector, fill: Char) {
        let width = self.width().max(size.x).max(0);
        if size.x > self.width() {
            for row in &mut self.data {
                row.resize(width as usize, fill);
            }
        }
        if size.y > self.height() {
            self.data.resize(size.y as usize, vec![fill; width as usize]);
        }
    }

    /// Grows or truncates the grid to exactly `size`.
    pub fn resize(&mut self, size: Vector, fill: Char) {
        if size.y < self.height() {
            self.data.truncate(size.y.max(0) as usize);
        }
        if size.x < self.width() {
            for row in &mut self.data {
                row.truncate(size.x.max(0) as usize);
            }
        }
        self.extend(size, fill);
    }

    /// Fills `area` with `ch`, extending the grid first when the area
    /// reaches past the current size. [`RECT_MAX`] means the whole text.
    ///
    /// Returns the filled area.
    pub fn fill(&mut self, ch: Char, area: Rectangle) -> Rectangle {
        let area = if area == RECT_MAX {
            self.bounds()
        } else {
            self.extend(Vector::new(area.x2, area.y2), ch);
            area
        };
        for line in area.y1.max(0)..area.y2 {
            for column in area.x1.max(0)..area.x2 {
                self.data[line as usize][column as usize] = ch;
            }
        }
        area
    }

    /// Overlays `other` at `position`, combining cell by cell.
    ///
    /// Clips at all edges; the position may be negative.
    pub fn patch(
        &mut self,
        other: &Text,
        position: Vector,
        mix_default: AttributeMode,
        override_mix: AttributeMode,
        reset_mix: AttributeMode,
    ) -> Result<()> {
        let xdest = position.x.max(0);
        let xbegin = xdest - position.x;
        let ydest = position.y.max(0);
        let ybegin = ydest - position.y;
        let width = (self.width() - xdest).min(other.width() - xbegin);
        let height = (self.height() - ydest).min(other.height() - ybegin);
        for line in 0..height.max(0) {
            for column in 0..width.max(0) {
                let source = other.data[(ybegin + line) as usize][(xbegin + column) as usize];
                let target = &mut self.data[(ydest + line) as usize][(xdest + column) as usize];
                *target = target.combine(&source, mix_default, override_mix, reset_mix)?;
            }
        }
        Ok(())
    }

    /// Overlays `other` into `area`, which must lie within the text.
    pub fn patch_area(
        &mut self,
        other: &Text,
        area: Rectangle,
        mix_default: AttributeMode,
        override_mix: AttributeMode,
        reset_mix: AttributeMode,
    ) -> Result<()> {
        let bounds = self.bounds();
        let area = area.default_to(bounds);
        if area.intersection(&bounds) != Some(area) {
            return Err(Error::IndexOutOfBounds {
                position: area.position(),
                size: self.size(),
            });
        }
        let width = area.width().min(other.width());
        for line in 0..area.height().min(other.height()) {
            for column in 0..width {
                let source = other.data[line as usize][column as usize];
                let target = &mut self.data[(area.y1 + line) as usize][(area.x1 + column) as usize];
                *target = target.combine(&source, mix_default, override_mix, reset_mix)?;
            }
        }
        Ok(())
    }

    /// Rewrites the combining mode over `area` (clipped to the text).
    ///
    /// Cell content and colors stay untouched; when `set_mix` is not
    /// `Default` it becomes the stored mode of every cell in the area.
    pub fn set_attr(&mut self, attrs: &CharAttributes, area: Rectangle, set_mix: AttributeMode) -> Result<()> {
        let bounds = self.bounds();
        let Some(area) = area.default_to(bounds).intersection(&bounds) else {
            return Ok(());
        };
        let marker = Char { rune: NONE_RUNE, attrs: *attrs };
        for line in area.y1..area.y2 {
            for column in area.x1..area.x2 {
                let target = &mut self.data[line as usize][column as usize];
                *target = target.combine(&marker, AttributeMode::Default, AttributeMode::Ignore, set_mix)?;
            }
        }
        Ok(())
    }

    /// Copy of the sub-rectangle `area`; empty when disjoint from the text.
    pub fn slice(&self, area: Rectangle) -> Text {
        let Some(area) = area.intersection(&self.bounds()) else {
            return Text::default();
        };
        let data = (area.y1..area.y2)
            .map(|line| self.data[line as usize][area.x1 as usize..area.x2 as usize].to_vec())
            .collect();
        Text { data }
    }

    fn stamp(&mut self, position: Vector, segments: [u8; 4], dash: u8, rounded: bool) -> Result<()> {
        let size = self.size();
        match self.cell_mut(position) {
            Some(cell) => {
                cell.stamp_segments(segments, dash, rounded);
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { position, size }),
        }
    }

    /// Draws a line, merging strokes into existing box-drawing glyphs.
    ///
    /// `strength` must be 1 (light) or 2 (heavy). Returns the bounding
    /// rectangle of the affected cells.
    pub fn line(&mut self, line: &Line, strength: u8, dash: u8, rounded: bool) -> Result<Rectangle> {
        if !(1..=2).contains(&strength) {
            return Err(Error::BadArgument(format!("invalid line strength: {strength}")));
        }
        let Vector { x, y } = line.position;
        match line.orientation {
            Orientation::Horizontal => {
                let end = match line.end {
                    DIM_HIGH => self.width(),
                    e if e < 0 => e + self.width(),
                    e => e,
                };
                for p in x..end {
                    let segments = if p == x && !line.extend_begin {
                        [0, 0, 0, strength]
                    } else if p == end - 1 && !line.extend_end {
                        [0, 0, strength, 0]
                    } else {
                        [0, 0, strength, strength]
                    };
                    self.stamp(Vector::new(p, y), segments, dash, rounded)?;
                }
                Ok(Rectangle::new(x, y, end.max(x), y + 1))
            }
            Orientation::Vertical => {
                let end = match line.end {
                    DIM_HIGH => self.height(),
                    e if e < 0 => e + self.height(),
                    e => e,
                };
                for p in y..end {
                    let segments = if p == y && !line.extend_begin {
                        [0, strength, 0, 0]
                    } else if p == end - 1 && !line.extend_end {
                        [strength, 0, 0, 0]
                    } else {
                        [strength, strength, 0, 0]
                    };
                    self.stamp(Vector::new(x, p), segments, dash, rounded)?;
                }
                Ok(Rectangle::new(x, y, x + 1, end.max(y)))
            }
        }
    }

    /// Draws a box outline: top, bottom, left and right lines in that
    /// order. `area` is defaulted against the text bounds.
    ///
    /// Returns the four bounding rectangles of the lines.
    pub fn draw_box(&mut self, area: Rectangle, strength: u8, dash: u8, rounded: bool) -> Result<[Rectangle; 4]> {
        let area = area.default_to(self.bounds());
        Ok([
            self.line(
                &Line::horizontal(Vector::new(area.x1, area.y1), area.x2),
                strength,
                dash,
                rounded,
            )?,
            self.line(
                &Line::horizontal(Vector::new(area.x1, area.y2 - 1), area.x2),
                strength,
                dash,
                rounded,
            )?,
            self.line(
                &Line::vertical(Vector::new(area.x1, area.y1), area.y2),
                strength,
                dash,
                rounded,
            )?,
            self.line(
                &Line::vertical(Vector::new(area.x2 - 1, area.y1), area.y2),
                strength,
                dash,
                rounded,
            )?,
        ])
    }

    fn trimmed_range(row: &[Char]) -> (usize, usize) {
        let space = ' ' as u32;
        let Some(begin) = row.iter().position(|c| c.rune != space) else {
            return (0, 0);
        };
        let end = row.iter().rposition(|c| c.rune != space).map_or(begin + 1, |i| i + 1);
        (begin, end)
    }

    /// This text with every line right-aligned to `width` columns
    /// ([`DIM_LOW`] keeps the current width).
    pub fn right_aligned(&self, width: Dim) -> Result<Text> {
        let width = if width == DIM_LOW { self.width() } else { width };
        if width < 0 {
            return Err(Error::BadArgument(format!("negative alignment width: {width}")));
        }
        let width = width as usize;
        let mut result = Text::default();
        for row in &self.data {
            let (_, end) = Self::trimmed_range(row);
            let fill = SPACE.with_attrs(row.first().map_or_else(CharAttributes::default, |c| c.attrs));
            let line = if end >= width {
                row[end - width..end].to_vec()
            } else {
                let mut line = vec![fill; width - end];
                line.extend_from_slice(&row[..end]);
                line
            };
            result.data.push(line);
        }
        Ok(result)
    }

    /// This text with every line centered in `width` columns ([`DIM_LOW`]
    /// keeps the current width).
    pub fn centered(&self, width: Dim) -> Result<Text> {
        let width = if width == DIM_LOW { self.width() } else { width };
        if width < 0 {
            return Err(Error::BadArgument(format!("negative alignment width: {width}")));
        }
        let width = width as usize;
        let mut result = Text::default();
        for row in &self.data {
            let (begin, end) = Self::trimmed_range(row);
            let len = end - begin;
            let fill = SPACE.with_attrs(row.first().map_or_else(CharAttributes::default, |c| c.attrs));
            let line = if len > width {
                let begin = begin + (len - 1) / 2 - (width.max(1) - 1) / 2;
                row[begin..begin + width].to_vec()
            } else {
                let mut line = vec![fill; width];
                let pos = if width == 0 { 0 } else { (width - 1) / 2 - (len.max(1) - 1) / 2 };
                line[pos..pos + len].copy_from_slice(&row[begin..end]);
                line
            };
            result.data.push(line);
        }
        Ok(result)
    }

    /// Debug form with control pictures for control characters and a `¬`
    /// end-of-line marker.
    pub fn repr(&self) -> String {
        let mut result = String::from("\"\"\"\n");
        for row in &self.data {
            for cell in row {
                let rune = if cell.rune < 0x20 { cell.rune + 0x2400 } else { cell.rune };
                result.push(char::from_u32(rune).unwrap_or('\u{FFFD}'));
            }
            result.push('¬');
            result.push('\n');
        }
        result.push_str("\"\"\"");
        result
    }
}

/// Rows joined with line feeds, runes only.
impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char().unwrap_or('\u{FFFD}'))?;
            }
        }
        Ok(())
    }
}
