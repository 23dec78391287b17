//! The sink side of the compositor.

use std::fmt;

use crate::error::Result;
use crate::geometry::Vector;
use crate::text::Text;

/// One cell-region write: put `text` with its top-left corner at
/// `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub position: Vector,
    pub text: Text,
}

impl Update {
    pub fn new(position: Vector, text: Text) -> Self {
        Self { position, text }
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.text.repr())
    }
}

/// Anything that consumes an ordered stream of [`Update`]s: a display, a
/// test recorder, a nested surface.
pub trait Device {
    fn update(&mut self, updates: &[Update]) -> Result<()>;
}

/// A device that keeps every update it receives. Useful as a test double
/// and for replaying a session onto another device.
#[derive(Debug, Default)]
pub struct Recorder {
    pub updates: Vec<Update>,
}

impl Device for Recorder {
    fn update(&mut self, updates: &[Update]) -> Result<()> {
        self.updates.extend_from_slice(updates);
        Ok(())
    }
}
