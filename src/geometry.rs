//! Integer vectors and rectangles.
//!
//! All coordinates are signed 16-bit [`Dim`]s. The extreme values [`DIM_LOW`]
//! and [`DIM_HIGH`] double as "unspecified" sentinels in constructors; use
//! [`Vector::default_to`] / [`Rectangle::default_to`] to resolve them.
//!
//! Rectangles are half-open in both axes: `x1 <= x < x2`, `y1 <= y < y2`.

use std::fmt;
use std::ops::{Add, BitOr, Sub};

use crate::error::{Error, Result};

/// Coordinate dimension.
pub type Dim = i16;

/// Lowest possible value of a dimension, used as a default sentinel.
pub const DIM_LOW: Dim = Dim::MIN;
/// Highest possible value of a dimension, used as a default sentinel.
pub const DIM_HIGH: Dim = Dim::MAX;

/// Absolute difference between two [`Dim`]s.
pub const fn diff(x1: Dim, x2: Dim) -> Dim {
    if x1 < x2 { x2 - x1 } else { x1 - x2 }
}

/// An ordered pair of coordinates.
///
/// Order is lexicographic on `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vector {
    pub x: Dim,
    pub y: Dim,
}

/// The all-[`DIM_LOW`] sentinel vector.
pub const VECTOR_MIN: Vector = Vector::new(DIM_LOW, DIM_LOW);
/// The all-[`DIM_HIGH`] sentinel vector.
pub const VECTOR_MAX: Vector = Vector::new(DIM_HIGH, DIM_HIGH);

impl Vector {
    pub const fn new(x: Dim, y: Dim) -> Self {
        Self { x, y }
    }

    /// Componentwise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Componentwise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub const fn left(self, shift: Dim) -> Self {
        Self::new(self.x - shift, self.y)
    }

    pub const fn right(self, shift: Dim) -> Self {
        Self::new(self.x + shift, self.y)
    }

    pub const fn up(self, shift: Dim) -> Self {
        Self::new(self.x, self.y - shift)
    }

    pub const fn down(self, shift: Dim) -> Self {
        Self::new(self.x, self.y + shift)
    }

    /// Resolves a possibly negative position against `self` as an extent.
    ///
    /// A negative component counts from the far edge, so `-1` becomes the
    /// last column or line.
    pub fn position(self, position: Vector) -> Vector {
        Vector::new(
            if position.x < 0 { position.x + self.x } else { position.x },
            if position.y < 0 { position.y + self.y } else { position.y },
        )
    }

    /// Substitutes [`DIM_LOW`]/[`DIM_HIGH`] components with those of
    /// `default`.
    pub fn default_to(self, default: Vector) -> Vector {
        if self == VECTOR_MIN {
            return default;
        }
        Vector::new(
            if self.x == DIM_LOW || self.x == DIM_HIGH { default.x } else { self.x },
            if self.y == DIM_LOW || self.y == DIM_HIGH { default.y } else { self.y },
        )
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl Add<Dim> for Vector {
    type Output = Vector;

    fn add(self, size: Dim) -> Vector {
        Vector::new(self.x + size, self.y + size)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

impl Sub<Dim> for Vector {
    type Output = Vector;

    fn sub(self, size: Dim) -> Vector {
        Vector::new(self.x - size, self.y - size)
    }
}

/// Span of two vectors: the componentwise maximum.
impl BitOr for Vector {
    type Output = Vector;

    fn bitor(self, other: Vector) -> Vector {
        self.max(other)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A half-open rectangle.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x1: Dim,
    pub y1: Dim,
    pub x2: Dim,
    pub y2: Dim,
}

/// The all-[`DIM_LOW`] sentinel rectangle.
pub const RECT_DEFAULT: Rectangle = Rectangle::new(DIM_LOW, DIM_LOW, DIM_LOW, DIM_LOW);
/// The rectangle covering the whole coordinate space.
pub const RECT_MAX: Rectangle = Rectangle::new(DIM_LOW, DIM_LOW, DIM_HIGH, DIM_HIGH);

impl Rectangle {
    pub const fn new(x1: Dim, y1: Dim, x2: Dim, y2: Dim) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle between two corner vectors.
    pub const fn between(v1: Vector, v2: Vector) -> Self {
        Self::new(v1.x, v1.y, v2.x, v2.y)
    }

    pub const fn width(&self) -> Dim {
        diff(self.x2, self.x1)
    }

    pub const fn height(&self) -> Dim {
        diff(self.y2, self.y1)
    }

    pub const fn size(&self) -> Vector {
        Vector::new(self.width(), self.height())
    }

    /// Top-left corner.
    pub const fn position(&self) -> Vector {
        Vector::new(self.x1, self.y1)
    }

    /// One-past-the-end corner.
    pub const fn bottom_right(&self) -> Vector {
        Vector::new(self.x2, self.y2)
    }

    pub fn contains(&self, position: Vector) -> bool {
        self.x1 <= position.x && position.x < self.x2 && self.y1 <= position.y && position.y < self.y2
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x1.max(other.x1) < self.x2.min(other.x2) && self.y1.max(other.y1) < self.y2.min(other.y2)
    }

    /// Intersection of two rectangles, `None` if they do not overlap.
    ///
    /// Zero-area rectangles intersect nothing.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);
        if x1 < x2 && y1 < y2 {
            Some(Rectangle::new(x1, y1, x2, y2))
        } else {
            None
        }
    }

    /// Appends the up-to-four parts of `self` lying outside `other`, in the
    /// order top, left, right, bottom.
    fn clip_parts(&self, other: &Rectangle, result: &mut Vec<Rectangle>) {
        if self.y1 < other.y1 {
            result.push(Rectangle::new(self.x1, self.y1, self.x2, other.y1));
        }
        if self.x1 < other.x1 {
            result.push(Rectangle::new(
                self.x1,
                self.y1.max(other.y1),
                other.x1,
                self.y2.min(other.y2),
            ));
        }
        if self.x2 > other.x2 {
            result.push(Rectangle::new(
                other.x2,
                self.y1.max(other.y1),
                self.x2,
                self.y2.min(other.y2),
            ));
        }
        if self.y2 > other.y2 {
            result.push(Rectangle::new(self.x1, other.y2, self.x2, self.y2));
        }
    }

    /// The parts of `self` not covered by `other`.
    ///
    /// Empty when the rectangles are disjoint or when `other` covers `self`
    /// entirely; otherwise up to four rectangles ordered top, left, right,
    /// bottom.
    pub fn difference(&self, other: &Rectangle) -> Vec<Rectangle> {
        match self.intersection(other) {
            None => vec![],
            Some(common) if common == *self => vec![],
            Some(_) => {
                let mut result = Vec::with_capacity(4);
                self.clip_parts(other, &mut result);
                result
            }
        }
    }

    /// Like [`difference`](Self::difference), but disjoint rectangles yield
    /// `[self]` instead of nothing.
    ///
    /// This is the splitting step of fragment maintenance: masking a
    /// fragment list with another leaves untouched fragments intact.
    pub fn default_intersection(&self, other: &Rectangle) -> Vec<Rectangle> {
        match self.intersection(other) {
            None => vec![*self],
            Some(common) if common == *self => vec![],
            Some(_) => {
                let mut result = Vec::with_capacity(4);
                self.clip_parts(other, &mut result);
                result
            }
        }
    }

    /// Smallest rectangle enclosing both `self` and `other`.
    pub fn span(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    fn joined_x_ordered(&self, other: &Rectangle) -> bool {
        self.x2 == other.x1 && self.y1 == other.y1 && self.y2 == other.y2
    }

    fn joined_y_ordered(&self, other: &Rectangle) -> bool {
        self.x1 == other.x1 && self.x2 == other.x2 && self.y2 == other.y1
    }

    /// Whether `other` shares a full vertical edge with `self`.
    pub fn joined_x(&self, other: &Rectangle) -> bool {
        self.joined_x_ordered(other) || other.joined_x_ordered(self)
    }

    /// Whether `other` shares a full horizontal edge with `self`.
    pub fn joined_y(&self, other: &Rectangle) -> bool {
        self.joined_y_ordered(other) || other.joined_y_ordered(self)
    }

    pub fn joined(&self, other: &Rectangle) -> bool {
        self.joined_x(other) || self.joined_y(other)
    }

    /// Span of the two rectangles when they are joined, `None` otherwise.
    pub fn joined_with(&self, other: &Rectangle) -> Option<Rectangle> {
        self.joined(other).then(|| self.span(other))
    }

    /// Shrinks the rectangle by `size` on all sides.
    pub fn inset(&self, size: Dim) -> Result<Rectangle> {
        let result = Rectangle::new(self.x1 + size, self.y1 + size, self.x2 - size, self.y2 - size);
        if result == RECT_DEFAULT || result.x1 > result.x2 || result.y1 > result.y2 {
            return Err(Error::GeometryInvariant(result));
        }
        Ok(result)
    }

    /// Enlarges the rectangle by `size` on all sides.
    pub fn outset(&self, size: Dim) -> Result<Rectangle> {
        let result = Rectangle::new(self.x1 - size, self.y1 - size, self.x2 + size, self.y2 + size);
        if result == RECT_DEFAULT || result.x1 > result.x2 || result.y1 > result.y2 {
            return Err(Error::GeometryInvariant(result));
        }
        Ok(result)
    }

    /// Substitutes [`DIM_LOW`]/[`DIM_HIGH`] coordinates with those of
    /// `default`.
    pub fn default_to(&self, default: Rectangle) -> Rectangle {
        Rectangle::new(
            if self.x1 == DIM_LOW || self.x1 == DIM_HIGH { default.x1 } else { self.x1 },
            if self.y1 == DIM_LOW || self.y1 == DIM_HIGH { default.y1 } else { self.y1 },
            if self.x2 == DIM_LOW || self.x2 == DIM_HIGH { default.x2 } else { self.x2 },
            if self.y2 == DIM_LOW || self.y2 == DIM_HIGH { default.y2 } else { self.y2 },
        )
    }
}

impl Add<Vector> for Rectangle {
    type Output = Rectangle;

    fn add(self, v: Vector) -> Rectangle {
        Rectangle::new(self.x1 + v.x, self.y1 + v.y, self.x2 + v.x, self.y2 + v.y)
    }
}

impl Sub<Vector> for Rectangle {
    type Output = Rectangle;

    fn sub(self, v: Vector) -> Rectangle {
        Rectangle::new(self.x1 - v.x, self.y1 - v.y, self.x2 - v.x, self.y2 - v.y)
    }
}

impl BitOr for Rectangle {
    type Output = Rectangle;

    fn bitor(self, other: Rectangle) -> Rectangle {
        self.span(&other)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Rectangle obtained by centering the extent `one` within the extent
/// `other`.
pub fn centered(one: Vector, other: Vector) -> Rectangle {
    let ox = other.x / 2;
    let oy = other.y / 2;
    let tx = one.x / 2;
    let ty = one.y / 2;
    Rectangle::new(ox - tx, oy - ty, ox + tx, oy + ty)
}
