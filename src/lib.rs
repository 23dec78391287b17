#![doc = include_str!("./../README.md")]

pub use crossterm;

pub mod cell;
pub mod color;
pub mod device;
pub mod display;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod keyboard;
pub mod surface;
pub mod terminal;
pub mod text;

pub use error::{Error, Result};
