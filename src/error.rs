//! Error types shared across the crate.

use std::io;

use thiserror::Error;

use crate::geometry::{Rectangle, Vector};

/// Errors reported by geometry, text, surface and display operations.
///
/// Geometry, text and surface operations report errors at the call site and
/// never panic. Terminal I/O errors propagate to the surface owner.
#[derive(Debug, Error)]
pub enum Error {
    /// A text access or patch fell outside the bounds of the receiver.
    #[error("position {position} is outside text dimensions {size}")]
    IndexOutOfBounds { position: Vector, size: Vector },

    /// An operation was called with a value outside its domain.
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// A rectangle operation collapsed to the default sentinel where that is
    /// not legal.
    #[error("rectangle collapsed to the default sentinel: {0}")]
    GeometryInvariant(Rectangle),

    /// An element was missing where it was required to exist. This indicates
    /// a programming error, not a user error.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The terminal could not be written to.
    #[error("terminal I/O: {0}")]
    TerminalIo(#[from] io::Error),

    /// The terminal did not answer a cursor position query.
    #[error("terminal did not report cursor position")]
    NoCursorReport,
}

pub type Result<T> = std::result::Result<T, Error>;
