//! The display: a diffing back-buffer in front of a VT-style terminal.
//!
//! [`Display`] owns a byte sink and a shadow of what is believed to be on
//! the terminal. Incoming updates are compared cell by cell against the
//! shadow; only differing cells produce output, as the minimal mix of
//! cursor moves, SGR deltas and UTF-8 payload. Escape emission goes through
//! crossterm's command queue.
//!
//! The only blocking entry points of the whole crate live here:
//! [`Display::cursor`] and [`Display::terminal_size`] write a query and
//! then read the terminal's reply through the keyboard.

use std::fmt;
use std::io::Write;

use crossterm::{
    Command, cursor,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use crossterm::queue;
use log::{debug, trace};

use crate::cell::{Attributes, NULL_CHAR};
use crate::color::Rgb;
use crate::device::{Device, Update};
use crate::error::{Error, Result};
use crate::geometry::{Dim, Vector};
use crate::keyboard::{Keyboard, KeyCode};
use crate::text::Text;

/// Terminal mouse reporting mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseMode {
    #[default]
    Off,
    /// Presses only, no modifiers (`?9`).
    X10,
    /// Presses and releases (`?1000`).
    Normal,
    /// Presses, releases and drag motion (`?1002`).
    Buttons,
    /// All motion (`?1003`).
    Anything,
}

/// Switches the terminal's mouse reporting. All active modes pair with SGR
/// encoding (`?1006`) so coordinates are not byte-limited.
struct SetMouseMode(MouseMode);

impl Command for SetMouseMode {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self.0 {
            MouseMode::Off => f.write_str("\x1b[?9l\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1006l"),
            MouseMode::X10 => f.write_str("\x1b[?9h"),
            MouseMode::Normal => f.write_str("\x1b[?1000h\x1b[?1006h"),
            MouseMode::Buttons => f.write_str("\x1b[?1002h\x1b[?1006h"),
            MouseMode::Anything => f.write_str("\x1b[?1003h\x1b[?1006h"),
        }
    }
}

fn channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// A diffing renderer over any byte sink.
///
/// `position` is the origin of the drawing region on the physical terminal;
/// `max_size` bounds how far the back-buffer may grow.
pub struct Display<W: Write> {
    out: W,
    back: Text,
    cursor: Vector,
    foreground: Rgb,
    background: Rgb,
    attributes: Attributes,
    position: Vector,
    max_size: Vector,
}

impl<W: Write> Display<W> {
    /// Creates a display over `out` with a back-buffer of `size` null
    /// cells, so the first write of every cell always differs.
    pub fn new(out: W, position: Vector, size: Vector, max_size: Vector) -> Self {
        Self {
            out,
            back: Text::filled(NULL_CHAR, size, crate::cell::AttributeMode::Merge),
            // Unknown until the first move or query.
            cursor: Vector::new(-1, -1),
            foreground: crate::color::RGB_NONE,
            background: crate::color::RGB_NONE,
            attributes: Attributes::empty(),
            position,
            max_size,
        }
    }

    pub fn size(&self) -> Vector {
        self.back.size()
    }

    pub fn max_size(&self) -> Vector {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: Vector) {
        self.max_size = max_size;
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    /// The underlying sink.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// The back-buffer cell believed to be on the terminal at `position`.
    pub fn cell(&self, position: Vector) -> Option<&crate::cell::Char> {
        self.back.cell(position)
    }

    /// Puts the terminal into raw mode and hides the cursor.
    pub fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        queue!(self.out, cursor::Hide)?;
        self.out.flush()?;
        Ok(())
    }

    /// Restores colors, cursor, mouse reporting and cooked mode.
    pub fn restore(&mut self) -> Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Color::Reset),
            SetBackgroundColor(Color::Reset),
            SetMouseMode(MouseMode::Off),
            cursor::Show,
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Moves the terminal cursor, emitting only when the tracked position
    /// differs.
    fn move_to(&mut self, x: Dim, y: Dim) -> Result<()> {
        if self.cursor != Vector::new(x, y) {
            self.cursor = Vector::new(x, y);
            queue!(self.out, cursor::MoveTo(x as u16, y as u16))?;
        }
        Ok(())
    }

    /// Sets the foreground, emitting only the delta.
    fn set_foreground(&mut self, color: Rgb) -> Result<()> {
        if self.foreground != color {
            self.foreground = color;
            if color.is_default() {
                queue!(self.out, SetForegroundColor(Color::Reset))?;
            } else {
                queue!(
                    self.out,
                    SetForegroundColor(Color::Rgb {
                        r: channel(color.r),
                        g: channel(color.g),
                        b: channel(color.b),
                    })
                )?;
            }
        }
        Ok(())
    }

    /// Sets the background, emitting only the delta.
    fn set_background(&mut self, color: Rgb) -> Result<()> {
        if self.background != color {
            self.background = color;
            if color.is_default() {
                queue!(self.out, SetBackgroundColor(Color::Reset))?;
            } else {
                queue!(
                    self.out,
                    SetBackgroundColor(Color::Rgb {
                        r: channel(color.r),
                        g: channel(color.g),
                        b: channel(color.b),
                    })
                )?;
            }
        }
        Ok(())
    }

    /// Sets the attribute bits, emitting an on or off code per changed
    /// flag.
    fn set_attributes(&mut self, attributes: Attributes) -> Result<()> {
        const FLAGS: [(Attributes, Attribute, Attribute); 4] = [
            (Attributes::BOLD, Attribute::Bold, Attribute::NormalIntensity),
            (Attributes::UNDERLINE, Attribute::Underlined, Attribute::NoUnderline),
            (Attributes::REVERSE, Attribute::Reverse, Attribute::NoReverse),
            (Attributes::BLINK, Attribute::SlowBlink, Attribute::NoBlink),
        ];
        for (flag, on, off) in FLAGS {
            if attributes.contains(flag) != self.attributes.contains(flag) {
                queue!(self.out, SetAttribute(if attributes.contains(flag) { on } else { off }))?;
            }
        }
        self.attributes = attributes;
        Ok(())
    }

    /// Writes `text` at `position`, emitting only cells that differ from
    /// the back-buffer. Clipped to `max_size`; the back-buffer grows as
    /// needed.
    pub fn render(&mut self, position: Vector, text: &Text) -> Result<()> {
        let needed = (position + text.size()).min(self.max_size);
        self.back.extend(needed, NULL_CHAR);
        let lines = text.height().min(self.max_size.y - position.y).max(0);
        let columns = text.width().min(self.max_size.x - position.x).max(0);
        for line in 0..lines {
            for column in 0..columns {
                let target = Vector::new(column + position.x, line + position.y);
                if target.x < 0 || target.y < 0 {
                    continue;
                }
                let Some(&ch) = text.cell(Vector::new(column, line)) else {
                    continue;
                };
                if self.back.cell(target) == Some(&ch) {
                    continue;
                }
                self.move_to(target.x + self.position.x, target.y + self.position.y)?;
                self.set_foreground(ch.attrs.fg)?;
                self.set_background(ch.attrs.bg)?;
                self.set_attributes(ch.attrs.attr)?;
                queue!(self.out, Print(ch.as_char().unwrap_or('\u{FFFD}')))?;
                // Printing advances the terminal cursor by one cell.
                self.cursor.x += 1;
                if let Some(cell) = self.back.cell_mut(target) {
                    *cell = ch;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Grows or shrinks the back-buffer to `size`, filling with null cells
    /// so the next write of any grown cell always differs.
    pub fn resize(&mut self, size: Vector) {
        debug!("display resize {} -> {}", self.back.size(), size);
        self.back.resize(size, NULL_CHAR);
    }

    /// Turns cursor visibility on or off.
    pub fn show_cursor(&mut self, visible: bool) -> Result<()> {
        if visible {
            queue!(self.out, cursor::Show)?;
        } else {
            queue!(self.out, cursor::Hide)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Selects the mouse reporting mode.
    pub fn mouse_mode(&mut self, mode: MouseMode) -> Result<()> {
        queue!(self.out, SetMouseMode(mode))?;
        self.out.flush()?;
        Ok(())
    }

    /// Queries the terminal for the cursor position.
    ///
    /// Writes `CSI 6n` and drains the keyboard until the `CSI row ; col R`
    /// reply arrives. Blocks on terminal I/O.
    pub fn cursor(&mut self, keyboard: &mut Keyboard) -> Result<Vector> {
        for _ in 0..10 {
            self.out.write_all(b"\x1b[6n")?;
            self.out.flush()?;
            let mut report = String::with_capacity(10);
            loop {
                let key = keyboard.key()?;
                if let KeyCode::Char(c) = key.code {
                    report.push(c);
                    if c == 'R' {
                        break;
                    }
                }
            }
            if let Some(position) = parse_cursor_report(&report) {
                trace!("cursor report {position}");
                self.cursor = position;
                return Ok(position);
            }
        }
        Err(Error::NoCursorReport)
    }

    /// Measures the terminal by parking the cursor at the far corner and
    /// asking where it ended up. The cursor is restored afterwards.
    pub fn terminal_size(&mut self, keyboard: &mut Keyboard) -> Result<Vector> {
        let current = self.cursor(keyboard)?;
        self.move_to(9999, 9999)?;
        self.out.flush()?;
        let probe = self.cursor(keyboard)?;
        self.move_to(current.x, current.y)?;
        self.out.flush()?;
        Ok(probe + 1)
    }
}

impl<W: Write> Device for Display<W> {
    fn update(&mut self, updates: &[Update]) -> Result<()> {
        for update in updates {
            self.render(update.position, &update.text)?;
        }
        Ok(())
    }
}

/// Parses a `CSI row ; col R` cursor report into a 0-based position.
fn parse_cursor_report(report: &str) -> Option<Vector> {
    // Any pending input may precede the reply; parse from the last escape.
    let tail = &report[report.rfind('\x1b')?..];
    let body = tail.strip_prefix("\x1b[")?.strip_suffix('R')?;
    let (row, column) = body.split_once(';')?;
    let row: Dim = row.parse().ok()?;
    let column: Dim = column.parse().ok()?;
    Some(Vector::new(column - 1, row - 1))
}
