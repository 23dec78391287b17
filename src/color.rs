//! Color types and combinators.
//!
//! [`Rgb`] carries each channel in `0.0..=1.0` and reserves two sentinel
//! values: [`RGB_NONE`] means "inherit the default" and [`RGB_TRANSPARENT`]
//! lets the color underneath show through. The combinators respect the
//! sentinels:
//!
//! - `a | b` keeps `a` unless it is a sentinel, in which case `b` wins.
//! - `a + b` averages the channels after substituting sentinels.

use std::fmt;
use std::ops::{Add, BitOr};

/// An RGB color with `f32` channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Inherit/default marker.
pub const RGB_NONE: Rgb = Rgb::new(-1.0, -1.0, -1.0);
/// Transparency marker.
pub const RGB_TRANSPARENT: Rgb = Rgb::new(-2.0, -2.0, -2.0);

pub const RGB_WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
pub const RGB_BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
pub const RGB_GRAY_1: Rgb = Rgb::new(0.1, 0.1, 0.1);
pub const RGB_GRAY_2: Rgb = Rgb::new(0.2, 0.2, 0.2);
pub const RGB_GRAY_3: Rgb = Rgb::new(0.3, 0.3, 0.3);
pub const RGB_GRAY_4: Rgb = Rgb::new(0.4, 0.4, 0.4);
pub const RGB_GRAY_5: Rgb = Rgb::new(0.5, 0.5, 0.5);
pub const RGB_GRAY_6: Rgb = Rgb::new(0.6, 0.6, 0.6);
pub const RGB_GRAY_7: Rgb = Rgb::new(0.7, 0.7, 0.7);
pub const RGB_GRAY_8: Rgb = Rgb::new(0.8, 0.8, 0.8);
pub const RGB_GRAY_9: Rgb = Rgb::new(0.9, 0.9, 0.9);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Whether this color is one of the sentinel values.
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == RGB_NONE || *self == RGB_TRANSPARENT
    }
}

impl Default for Rgb {
    fn default() -> Self {
        RGB_NONE
    }
}

/// Fallback: `self` unless it is a sentinel, then `other`.
impl BitOr for Rgb {
    type Output = Rgb;

    #[inline]
    fn bitor(self, other: Rgb) -> Rgb {
        if self.is_default() { other } else { self }
    }
}

/// Mixing: the componentwise average after sentinel substitution.
///
/// If one side remains a sentinel even after substitution, the other side is
/// returned unchanged.
impl Add for Rgb {
    type Output = Rgb;

    fn add(self, other: Rgb) -> Rgb {
        let a = self | other;
        let b = other | self;
        if a.is_default() {
            return b;
        }
        if b.is_default() {
            return a;
        }
        Rgb::new((a.r + b.r) / 2.0, (a.g + b.g) / 2.0, (a.b + b.b) / 2.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == RGB_NONE {
            write!(f, "RgbNone")
        } else if *self == RGB_TRANSPARENT {
            write!(f, "RgbTransparent")
        } else {
            write!(f, "Rgb({}, {}, {})", self.r, self.g, self.b)
        }
    }
}

/// An HSV color: hue in degrees (`0.0..360.0`, negative when undefined),
/// saturation and value in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

impl From<Rgb> for Hsv {
    fn from(color: Rgb) -> Hsv {
        let Rgb { r, g, b } = color;
        let min = r.min(g).min(b);
        let max = r.max(g).max(b);
        let delta = max - min;
        if delta < f32::EPSILON || max <= 0.0 {
            // Achromatic: hue is undefined.
            return Hsv::new(-1.0, 0.0, max);
        }
        let s = delta / max;
        let mut h = if r >= max {
            (g - b) / delta
        } else if g >= max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        Hsv::new(h, s, max)
    }
}

impl From<Hsv> for Rgb {
    fn from(color: Hsv) -> Rgb {
        let Hsv { h, s, v } = color;
        if s <= 0.0 {
            return Rgb::new(v, v, v);
        }
        let hh = if h >= 360.0 { 0.0 } else { h } / 60.0;
        let sector = hh as i32;
        let f = hh - sector as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match sector {
            0 => Rgb::new(v, t, p),
            1 => Rgb::new(q, v, p),
            2 => Rgb::new(p, v, t),
            3 => Rgb::new(p, q, v),
            4 => Rgb::new(t, p, v),
            _ => Rgb::new(v, p, q),
        }
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hsv({}, {}, {})", self.h, self.s, self.v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keeps_real_color() {
        assert_eq!(RGB_WHITE | RGB_BLACK, RGB_WHITE);
    }

    #[test]
    fn fallback_replaces_none() {
        assert_eq!(RGB_NONE | RGB_WHITE, RGB_WHITE);
    }

    #[test]
    fn fallback_replaces_transparent() {
        assert_eq!(RGB_TRANSPARENT | RGB_GRAY_5, RGB_GRAY_5);
    }

    #[test]
    fn fallback_of_two_sentinels_is_the_right_one() {
        assert_eq!(RGB_NONE | RGB_TRANSPARENT, RGB_TRANSPARENT);
    }

    #[test]
    fn mix_averages_channels() {
        assert_eq!(RGB_BLACK + RGB_WHITE, RGB_GRAY_5);
    }

    #[test]
    fn mix_with_none_returns_other() {
        assert_eq!(RGB_NONE + RGB_GRAY_3, RGB_GRAY_3);
        assert_eq!(RGB_GRAY_3 + RGB_NONE, RGB_GRAY_3);
    }

    #[test]
    fn mix_of_two_sentinels_stays_sentinel() {
        assert!((RGB_NONE + RGB_TRANSPARENT).is_default());
    }

    #[test]
    fn mix_is_commutative() {
        let a = Rgb::new(0.2, 0.4, 0.8);
        let b = Rgb::new(0.6, 0.0, 0.4);
        assert_eq!(a + b, b + a);
    }

    #[test]
    fn hsv_of_primaries() {
        let red: Hsv = Rgb::new(1.0, 0.0, 0.0).into();
        assert_eq!(red.h, 0.0);
        assert_eq!(red.s, 1.0);
        assert_eq!(red.v, 1.0);
        let green: Hsv = Rgb::new(0.0, 1.0, 0.0).into();
        assert_eq!(green.h, 120.0);
        let blue: Hsv = Rgb::new(0.0, 0.0, 1.0).into();
        assert_eq!(blue.h, 240.0);
    }

    #[test]
    fn hsv_of_gray_has_no_hue() {
        let gray: Hsv = RGB_GRAY_5.into();
        assert!(gray.h < 0.0);
        assert_eq!(gray.s, 0.0);
    }

    #[test]
    fn hsv_round_trip() {
        for color in [
            Rgb::new(1.0, 0.0, 0.0),
            Rgb::new(0.0, 1.0, 0.0),
            Rgb::new(0.0, 0.0, 1.0),
            Rgb::new(1.0, 1.0, 0.0),
            Rgb::new(0.25, 0.5, 0.75),
        ] {
            let back: Rgb = Hsv::from(color).into();
            assert!((back.r - color.r).abs() < 1e-5, "{color} -> {back}");
            assert!((back.g - color.g).abs() < 1e-5, "{color} -> {back}");
            assert!((back.b - color.b).abs() < 1e-5, "{color} -> {back}");
        }
    }
}
