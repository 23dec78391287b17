//! The styled character cell and its combining rules.
//!
//! A [`Char`] is one grid cell: a rune plus [`CharAttributes`]. Cells are
//! combined when text is patched over text; the [`AttributeMode`] stored in
//! the incoming cell (or an override) selects how colors and attributes of
//! the two cells merge.

use bitflags::bitflags;

use crate::color::{RGB_NONE, RGB_TRANSPARENT, Rgb};
use crate::error::{Error, Result};

bitflags! {
    /// Attributes that can be applied to a cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const BOLD      = 0b_0001;
        const UNDERLINE = 0b_0010;
        const REVERSE   = 0b_0100;
        const BLINK     = 0b_1000;
    }
}

/// How two cells combine when one is written over the other.
///
/// `Default` is a programming-time marker meaning "no opinion"; it must be
/// resolved to one of the other modes before a combine happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributeMode {
    #[default]
    Default,
    /// Colors fall back (`|`), attributes are or-ed.
    Merge,
    /// Colors are averaged (`+`), attributes are or-ed.
    Mix,
    /// The incoming cell wins wholesale.
    Replace,
    /// The existing cell keeps everything but the rune.
    Ignore,
}

/// The style of a cell: colors, attribute bits and combining mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharAttributes {
    pub fg: Rgb,
    pub bg: Rgb,
    pub attr: Attributes,
    pub mix: AttributeMode,
}

impl CharAttributes {
    pub const fn new(fg: Rgb, bg: Rgb, attr: Attributes, mix: AttributeMode) -> Self {
        Self { fg, bg, attr, mix }
    }
}

impl Default for CharAttributes {
    fn default() -> Self {
        Self::new(RGB_NONE, RGB_NONE, Attributes::empty(), AttributeMode::Merge)
    }
}

/// Rune marker meaning "keep the existing rune" when combining.
pub const NONE_RUNE: u32 = 0xFFFF_FFFF;

/// One grid cell: a rune and its attributes.
///
/// The rune is stored as a raw `u32` so that [`NONE_RUNE`] is representable;
/// [`Char::as_char`] converts for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Char {
    pub rune: u32,
    pub attrs: CharAttributes,
}

/// A plain space with unspecified colors.
pub const SPACE: Char = Char {
    rune: ' ' as u32,
    attrs: CharAttributes::new(RGB_NONE, RGB_NONE, Attributes::empty(), AttributeMode::Default),
};

/// The null cell, used as the display back-buffer sentinel.
pub const NULL_CHAR: Char = Char {
    rune: 0,
    attrs: CharAttributes::new(RGB_NONE, RGB_NONE, Attributes::empty(), AttributeMode::Default),
};

/// A space that lets both colors underneath show through.
pub const TRANSPARENT: Char = Char {
    rune: ' ' as u32,
    attrs: CharAttributes::new(RGB_TRANSPARENT, RGB_TRANSPARENT, Attributes::empty(), AttributeMode::Default),
};

impl Char {
    pub const fn new(rune: char, attrs: CharAttributes) -> Self {
        Self { rune: rune as u32, attrs }
    }

    pub const fn styled(rune: char, fg: Rgb, bg: Rgb, attr: Attributes, mix: AttributeMode) -> Self {
        Self {
            rune: rune as u32,
            attrs: CharAttributes::new(fg, bg, attr, mix),
        }
    }

    /// The cell's rune as a `char`, if it is a valid scalar value.
    #[inline]
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.rune)
    }

    /// This cell with different attributes.
    pub fn with_attrs(&self, attrs: CharAttributes) -> Char {
        Char { rune: self.rune, attrs }
    }

    /// Combines `other` over `self`.
    ///
    /// The effective mode is `override_mix` when given, otherwise the
    /// incoming cell's own mode, otherwise `mix_default`. The resulting rune
    /// is the incoming one unless it is [`NONE_RUNE`]. A `reset_mix` other
    /// than `Default` overwrites the mode stored in the result.
    ///
    /// Resolving to `Default` is a [`BadArgument`](Error::BadArgument)
    /// error.
    pub fn combine(
        &self,
        other: &Char,
        mix_default: AttributeMode,
        override_mix: AttributeMode,
        reset_mix: AttributeMode,
    ) -> Result<Char> {
        use AttributeMode::*;

        let mode = if override_mix != Default {
            override_mix
        } else if other.attrs.mix != Default {
            other.attrs.mix
        } else {
            mix_default
        };
        let rune = if other.rune == NONE_RUNE { self.rune } else { other.rune };
        let mut result = match mode {
            Merge => Char {
                rune,
                attrs: CharAttributes::new(
                    self.attrs.fg | other.attrs.fg,
                    self.attrs.bg | other.attrs.bg,
                    self.attrs.attr | other.attrs.attr,
                    Merge,
                ),
            },
            Mix => Char {
                rune,
                attrs: CharAttributes::new(
                    self.attrs.fg + other.attrs.fg,
                    self.attrs.bg + other.attrs.bg,
                    self.attrs.attr | other.attrs.attr,
                    Mix,
                ),
            },
            Replace => *other,
            Ignore => Char { rune, attrs: self.attrs },
            Default => {
                return Err(Error::BadArgument("resolved combining mode must not be Default".into()));
            }
        };
        if reset_mix != Default {
            result.attrs.mix = reset_mix;
        }
        Ok(result)
    }
}

impl Default for Char {
    fn default() -> Self {
        NULL_CHAR
    }
}
