//! The composition layer tying keyboard, display and surface together.
//!
//! A [`Terminal`] owns a [`Surface`] whose bottom element is an unbounded
//! backdrop of spaces and whose second element is the *desktop*, a window
//! tracking the display size. Windows added on top draw through their
//! fragments; the display grows to fit new windows (up to the terminal
//! size) and shrinks back when they go away.

use std::io::Write;

use log::debug;

use crate::cell::{AttributeMode, Char, SPACE};
use crate::device::Device;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::geometry::{DIM_HIGH, Rectangle, VECTOR_MAX, VECTOR_MIN, Vector};
use crate::keyboard::{Event, Keyboard};
use crate::surface::{Element, ElementId, Surface};
use crate::text::{Line, Text};

/// A rectangular pane of owned text on the surface.
pub struct Window {
    position: Vector,
    background: Char,
    content: Text,
}

impl Window {
    pub fn new(area: Rectangle, background: Char) -> Self {
        let mut content = Text::default();
        content.extend(area.size(), background);
        Self {
            position: area.position(),
            background,
            content,
        }
    }

    pub fn area(&self) -> Rectangle {
        Rectangle::between(self.position, self.position + self.content.size())
    }

    pub fn size(&self) -> Vector {
        self.content.size()
    }

    pub fn content(&self) -> &Text {
        &self.content
    }

    /// Patches `text` into the window at a window-local position.
    pub fn write(&mut self, position: Vector, text: &Text) -> Result<()> {
        self.content
            .patch(text, position, AttributeMode::Merge, AttributeMode::Default, AttributeMode::Default)
    }

    /// Fills a window-local area, returning the area actually filled.
    pub fn fill(&mut self, ch: Char, area: Rectangle) -> Rectangle {
        self.content.fill(ch, area)
    }

    pub fn line(&mut self, line: &Line, strength: u8, dash: u8, rounded: bool) -> Result<Rectangle> {
        self.content.line(line, strength, dash, rounded)
    }

    pub fn draw_box(&mut self, area: Rectangle, strength: u8, dash: u8, rounded: bool) -> Result<[Rectangle; 4]> {
        self.content.draw_box(area, strength, dash, rounded)
    }
}

/// The element stack of a terminal: the backdrop or a window.
pub enum Pane {
    /// A virtually infinite blank under everything, representing the
    /// display in a cleared state.
    Backdrop,
    Window(Window),
}

impl Pane {
    fn window(&self) -> Result<&Window> {
        match self {
            Pane::Window(window) => Ok(window),
            Pane::Backdrop => Err(Error::BadArgument("the backdrop is not a window".into())),
        }
    }

    fn window_mut(&mut self) -> Result<&mut Window> {
        match self {
            Pane::Window(window) => Ok(window),
            Pane::Backdrop => Err(Error::BadArgument("the backdrop is not a window".into())),
        }
    }
}

impl Element for Pane {
    fn area(&self) -> Rectangle {
        match self {
            Pane::Backdrop => Rectangle::new(0, 0, DIM_HIGH, DIM_HIGH),
            Pane::Window(window) => window.area(),
        }
    }

    fn text(&self, area: Rectangle) -> Text {
        match self {
            Pane::Backdrop => Text::filled(SPACE, area.size(), AttributeMode::Merge),
            Pane::Window(window) => window.content.slice(area),
        }
    }

    fn reshape(&mut self, area: Rectangle) {
        match self {
            Pane::Backdrop => {}
            Pane::Window(window) => {
                window.position = area.position();
                let background = window.background;
                window.content.resize(area.size(), background);
            }
        }
    }
}

/// Handle to a window owned by a [`Terminal`].
pub type WindowId = ElementId;

/// Construction options for [`Terminal`].
///
/// The geometry fields default to sentinels meaning: origin = the current
/// cursor position, size = one cell, maximum size = the measured terminal
/// size.
pub struct TerminalOptions {
    pub background: Char,
    pub position: Vector,
    pub size: Vector,
    pub max_size: Vector,
    /// Allow the drawing region to grow when windows need room.
    pub expand: bool,
    /// Allow the drawing region to shrink when windows go away.
    pub contract: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            background: SPACE,
            position: VECTOR_MIN,
            size: VECTOR_MIN,
            max_size: VECTOR_MAX,
            expand: true,
            contract: true,
        }
    }
}

/// A composed terminal: keyboard, diffing display, and window surface.
pub struct Terminal<W: Write> {
    keyboard: Keyboard,
    display: Display<W>,
    surface: Surface<Pane>,
    desktop: WindowId,
    expand: bool,
    contract: bool,
    minimum_size: Vector,
    raw: bool,
}

impl<W: Write> Terminal<W> {
    /// Builds a terminal over the given keyboard and sink.
    ///
    /// Geometry sentinels in `options` are resolved by querying the
    /// terminal (which blocks on its reply). No terminal modes are touched
    /// until [`init`](Self::init).
    pub fn new(keyboard: Keyboard, out: W, options: TerminalOptions) -> Result<Self> {
        let mut keyboard = keyboard;
        let size = if options.size == VECTOR_MIN { Vector::new(1, 1) } else { options.size };
        let mut display = Display::new(out, Vector::default(), size, options.max_size);
        if options.position == VECTOR_MIN {
            let position = display.cursor(&mut keyboard)?;
            display.set_position(position);
        } else {
            display.set_position(options.position);
        }
        if options.max_size == VECTOR_MAX {
            let max = display.terminal_size(&mut keyboard)?;
            display.set_max_size(max);
        }

        let mut surface = Surface::with_base(Pane::Backdrop);
        let desktop_area = Rectangle::between(Vector::default(), display.size());
        let (desktop, updates) =
            surface.add_element(Pane::Window(Window::new(desktop_area, options.background)), None)?;
        display.update(&updates)?;

        Ok(Self {
            keyboard,
            display,
            surface,
            desktop,
            expand: options.expand,
            contract: options.contract,
            minimum_size: size,
            raw: false,
        })
    }

    /// Puts the terminal into raw mode with a hidden cursor. Undone by
    /// [`restore`](Self::restore) or on drop.
    pub fn init(&mut self) -> Result<()> {
        self.display.init()?;
        self.raw = true;
        Ok(())
    }

    /// Restores the terminal state acquired by [`init`](Self::init).
    pub fn restore(&mut self) -> Result<()> {
        if self.raw {
            self.raw = false;
            self.display.restore()?;
        }
        Ok(())
    }

    pub fn display(&mut self) -> &mut Display<W> {
        &mut self.display
    }

    pub fn keyboard(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn surface(&self) -> &Surface<Pane> {
        &self.surface
    }

    /// The desktop window filling the drawing region.
    pub fn desktop(&self) -> WindowId {
        self.desktop
    }

    /// The next input event.
    pub fn event(&mut self) -> Result<Event> {
        self.keyboard.event()
    }

    /// Adds a window, growing the drawing region to fit it first.
    pub fn add_window(&mut self, area: Rectangle, background: Char, below: Option<WindowId>) -> Result<WindowId> {
        self.grow_to(area.bottom_right())?;
        let (id, updates) = self.surface.add_element(Pane::Window(Window::new(area, background)), below)?;
        self.display.update(&updates)?;
        debug!("window {id:?} added at {area}");
        Ok(id)
    }

    /// Removes a window and shrinks the drawing region around what is
    /// left.
    pub fn remove_window(&mut self, id: WindowId) -> Result<()> {
        if id == self.desktop {
            return Err(Error::BadArgument("the desktop cannot be removed".into()));
        }
        self.window(id)?;
        let (_, updates) = self.surface.remove_element(id)?;
        self.display.update(&updates)?;
        self.shrink()?;
        Ok(())
    }

    /// Moves or resizes a window, adjusting the drawing region on both
    /// ends.
    pub fn move_window(&mut self, id: WindowId, area: Rectangle) -> Result<()> {
        self.window(id)?;
        self.grow_to(area.bottom_right())?;
        let updates = self.surface.reshape_element(id, area)?;
        self.display.update(&updates)?;
        self.shrink()?;
        Ok(())
    }

    /// Raises a window directly above `target` (or to the top).
    pub fn raise_window(&mut self, id: WindowId, target: Option<WindowId>) -> Result<()> {
        self.window(id)?;
        let updates = self.surface.above(id, target)?;
        self.display.update(&updates)
    }

    /// Lowers a window directly below `target` (or to just above the
    /// backdrop).
    pub fn lower_window(&mut self, id: WindowId, target: Option<WindowId>) -> Result<()> {
        self.window(id)?;
        let updates = match target {
            Some(target) => self.surface.below(id, Some(target))?,
            // Never below the backdrop itself.
            None => {
                let above_backdrop = self.surface.zorder().get(1).copied();
                match above_backdrop {
                    Some(anchor) if anchor != id => self.surface.below(id, Some(anchor))?,
                    _ => vec![],
                }
            }
        };
        self.display.update(&updates)
    }

    /// Shared read access to a window.
    pub fn window(&self, id: WindowId) -> Result<&Window> {
        self.surface.element(id).ok_or_else(|| missing_window(id))?.window()
    }

    /// Patches text into a window and repaints the touched region.
    pub fn write(&mut self, id: WindowId, position: Vector, text: &Text) -> Result<()> {
        let window = self.window_mut(id)?;
        window.write(position, text)?;
        let damage = Rectangle::between(position, position + text.size()) + window.position;
        self.repaint(id, &[damage])
    }

    /// Fills a window-local area and repaints it.
    pub fn fill(&mut self, id: WindowId, ch: Char, area: Rectangle) -> Result<()> {
        let window = self.window_mut(id)?;
        let filled = window.fill(ch, area) + window.position;
        self.repaint(id, &[filled])
    }

    /// Draws a line in a window and repaints its bounding rectangle.
    pub fn line(&mut self, id: WindowId, line: &Line, strength: u8, dash: u8, rounded: bool) -> Result<()> {
        let window = self.window_mut(id)?;
        let damage = window.line(line, strength, dash, rounded)? + window.position;
        self.repaint(id, &[damage])
    }

    /// Draws a box in a window and repaints the four line rectangles.
    pub fn draw_box(&mut self, id: WindowId, area: Rectangle, strength: u8, dash: u8, rounded: bool) -> Result<()> {
        let window = self.window_mut(id)?;
        let position = window.position;
        let damage = window.draw_box(area, strength, dash, rounded)?.map(|r| r + position);
        self.repaint(id, &damage)
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut Window> {
        self.surface.element_mut(id).ok_or_else(|| missing_window(id))?.window_mut()
    }

    fn repaint(&mut self, id: WindowId, areas: &[Rectangle]) -> Result<()> {
        let updates = self.surface.updates_for(id, areas)?;
        self.display.update(&updates)
    }

    /// Grows the display and desktop so that `size` fits, bounded by the
    /// display's maximum size. Returns whether anything changed.
    pub fn grow_to(&mut self, size: Vector) -> Result<bool> {
        if !self.expand {
            return Ok(false);
        }
        let target = self.display.max_size().min(size).max(self.display.size());
        if target == self.display.size() {
            return Ok(false);
        }
        debug!("expand display to {target}");
        self.display.resize(target);
        let updates = self
            .surface
            .reshape_element(self.desktop, Rectangle::between(Vector::default(), target))?;
        self.display.update(&updates)?;
        Ok(true)
    }

    /// Shrinks the display and desktop down to the tightest extent around
    /// the remaining windows. Returns whether anything changed.
    pub fn shrink(&mut self) -> Result<bool> {
        if !self.contract {
            return Ok(false);
        }
        let target = self
            .surface
            .min_size(Some(self.desktop))
            .max(self.minimum_size)
            .max(Vector::new(1, 1));
        if target == self.display.size() {
            return Ok(false);
        }
        debug!("contract display to {target}");
        let updates = self
            .surface
            .reshape_element(self.desktop, Rectangle::between(Vector::default(), target))?;
        self.display.update(&updates)?;
        self.display.resize(target);
        Ok(true)
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// A stale window handle is a programming error, not a user error: fatal
// under debug assertions, a typed error otherwise.
fn missing_window(id: WindowId) -> Error {
    debug_assert!(false, "no such window: {id:?}");
    Error::InvariantViolation(format!("no such window: {id:?}"))
}
