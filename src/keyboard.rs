//! The keyboard: a byte-stream decoder for terminal input.
//!
//! Bytes come in through a [`ByteSource`] and are matched against a prefix
//! tree of escape sequences. Reads below the tree root use a short
//! quiet-time window to tell a lone ESC press from the prefix of a
//! function key. Anything the tree does not know is replayed as its
//! constituent code points.
//!
//! The decoder also parses SGR mouse reports (`CSI < b;col;row M|m`),
//! arriving after the [`KeyCode::Mouse`] introducer.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::fd::RawFd;
use std::sync::LazyLock;
use std::time::Duration;

use bitflags::bitflags;

use crate::error::{Error, Result};

/// How long a continuation byte may lag before an escape sequence is
/// considered finished.
const QUIET_TIME: Duration = Duration::from_millis(2);

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const SHIFT   = 0b001;
        const CONTROL = 0b010;
        const ALT     = 0b100;
    }
}

/// A named key or a plain character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Enter,
    Tab,
    /// Function key `F1`..`F12`.
    F(u8),
    /// Introducer of a mouse report; followed by [`Keyboard::mouse_report`]
    /// data on the wire.
    Mouse,
}

/// A decoded key press: code plus modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Mouse press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseAction {
    Press,
    Release,
}

/// A parsed mouse report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseReport {
    /// Button index 1..=4.
    pub button: u8,
    pub modifiers: KeyModifiers,
    /// 0-based column.
    pub column: u16,
    /// 0-based line.
    pub line: u16,
    pub action: MouseAction,
    /// Motion report rather than a button event.
    pub motion: bool,
}

/// A decoded input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    MouseMove {
        column: u16,
        line: u16,
    },
    MouseButton {
        button: u8,
        modifiers: KeyModifiers,
        column: u16,
        line: u16,
        action: MouseAction,
    },
}

/// Source of raw input bytes.
///
/// Two read flavours: a blocking read, and a bounded wait used while in the
/// middle of a possible escape sequence. `Ok(None)` means end of input for
/// the blocking read and "nothing arrived in time" for the bounded one.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>>;

    fn read_byte_within(&mut self, timeout: Duration) -> Result<Option<u8>>;
}

/// A terminal file descriptor, read with `poll(2)` for the bounded waits.
pub struct TtySource {
    fd: RawFd,
}

impl TtySource {
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn stdin() -> Self {
        Self::new(0)
    }
}

impl ByteSource for TtySource {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, 1) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err.into());
            }
            return Ok((n > 0).then_some(buf[0]));
        }
    }

    fn read_byte_within(&mut self, timeout: Duration) -> Result<Option<u8>> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            let n = unsafe { libc::poll(&mut pfd, 1, timeout.as_millis() as libc::c_int) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err.into());
            }
            if n == 0 {
                return Ok(None);
            }
            return self.read_byte();
        }
    }
}

/// A scripted byte source for tests and replays.
///
/// Pauses in the script answer a bounded-wait read with "nothing arrived",
/// driving the decoder's quiet-time rule deterministically.
#[derive(Default)]
pub struct ScriptSource {
    steps: VecDeque<ScriptStep>,
}

enum ScriptStep {
    Byte(u8),
    Pause,
}

impl ScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        let mut source = Self::new();
        source.push_bytes(bytes);
        source
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.steps.extend(bytes.iter().map(|&b| ScriptStep::Byte(b)));
    }

    pub fn push_pause(&mut self) {
        self.steps.push_back(ScriptStep::Pause);
    }
}

impl ByteSource for ScriptSource {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        while let Some(step) = self.steps.pop_front() {
            if let ScriptStep::Byte(b) = step {
                return Ok(Some(b));
            }
        }
        Ok(None)
    }

    fn read_byte_within(&mut self, _timeout: Duration) -> Result<Option<u8>> {
        match self.steps.pop_front() {
            Some(ScriptStep::Byte(b)) => Ok(Some(b)),
            Some(ScriptStep::Pause) | None => Ok(None),
        }
    }
}

#[derive(Default)]
struct PrefixNode {
    key: Option<Key>,
    children: HashMap<u8, PrefixNode>,
}

fn seq(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn translations() -> Vec<(Vec<u8>, Key)> {
    use KeyCode::*;
    let mods = [
        (b'2', KeyModifiers::SHIFT),
        (b'5', KeyModifiers::CONTROL),
        (b'6', KeyModifiers::SHIFT.union(KeyModifiers::CONTROL)),
    ];
    let mut result: Vec<(Vec<u8>, Key)> = vec![];

    // CSI letter keys.
    let letters = [
        (b'A', Up),
        (b'B', Down),
        (b'C', Right),
        (b'D', Left),
        (b'H', Home),
        (b'F', End),
    ];
    for (byte, code) in letters {
        result.push((seq(&[b"\x1b[", &[byte]]), Key::plain(code)));
        for (m, modifier) in mods {
            result.push((seq(&[b"\x1b[1;", &[m, byte]]), Key::new(code, modifier)));
        }
    }

    // CSI tilde keys.
    let tilde: [(&[u8], KeyCode); 12] = [
        (b"2", Insert),
        (b"3", Delete),
        (b"5", PageUp),
        (b"6", PageDown),
        (b"15", F(5)),
        (b"17", F(6)),
        (b"18", F(7)),
        (b"19", F(8)),
        (b"20", F(9)),
        (b"21", F(10)),
        (b"23", F(11)),
        (b"24", F(12)),
    ];
    for (digits, code) in tilde {
        result.push((seq(&[b"\x1b[", digits, b"~"]), Key::plain(code)));
        for (m, modifier) in mods {
            result.push((seq(&[b"\x1b[", digits, b";", &[m], b"~"]), Key::new(code, modifier)));
        }
    }

    // SS3 function keys F1..F4.
    for (i, byte) in [b'P', b'Q', b'R', b'S'].into_iter().enumerate() {
        let code = F(i as u8 + 1);
        result.push((seq(&[b"\x1bO", &[byte]]), Key::plain(code)));
        for (m, modifier) in mods {
            result.push((seq(&[b"\x1bO", &[m, byte]]), Key::new(code, modifier)));
        }
    }

    // Single-byte and odd sequences.
    result.push((vec![0x7f], Key::plain(Backspace)));
    result.push((vec![b'\r'], Key::plain(Enter)));
    result.push((vec![b'\t'], Key::plain(Tab)));
    result.push((b"\x1b[Z".to_vec(), Key::new(Tab, KeyModifiers::SHIFT)));
    result.push((b"\x1bOM".to_vec(), Key::new(Enter, KeyModifiers::SHIFT)));

    // Alt is an ESC prefix over every unmodified sequence.
    let alted: Vec<(Vec<u8>, Key)> = result
        .iter()
        .filter(|(_, key)| key.mods.is_empty())
        .map(|(bytes, key)| {
            let mut sequence = vec![0x1b];
            sequence.extend_from_slice(bytes);
            (sequence, Key::new(key.code, KeyModifiers::ALT))
        })
        .collect();
    result.extend(alted);

    // Mouse report introducer.
    result.push((b"\x1b[<".to_vec(), Key::plain(Mouse)));

    result
}

static KEY_TREE: LazyLock<PrefixNode> = LazyLock::new(|| {
    let mut tree = PrefixNode::default();
    for (bytes, key) in translations() {
        let mut node = &mut tree;
        for byte in bytes {
            node = node.children.entry(byte).or_default();
        }
        node.key = Some(key);
    }
    tree
});

/// Decoder over a byte source, with a pushback buffer for replayed input.
pub struct Keyboard {
    source: Box<dyn ByteSource>,
    pending: VecDeque<Key>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    /// A keyboard reading the standard input file descriptor.
    pub fn new() -> Self {
        Self::from_source(Box::new(TtySource::stdin()))
    }

    pub fn from_source(source: Box<dyn ByteSource>) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    fn replay(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().map(|&b| Key::char(b as char)));
    }

    // Assembles a multi-byte UTF-8 scalar starting with `first`.
    fn read_utf8(&mut self, first: u8) -> Result<char> {
        let len = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        let mut buf = vec![first];
        for _ in 1..len {
            match self.source.read_byte()? {
                Some(byte) => buf.push(byte),
                None => break,
            }
        }
        Ok(String::from_utf8_lossy(&buf).chars().next().unwrap_or('\u{FFFD}'))
    }

    /// The next key.
    ///
    /// Walks the prefix tree; below the root, reads wait at most the
    /// quiet time before the collected bytes are replayed as characters.
    pub fn key(&mut self) -> Result<Key> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(key);
        }
        let mut node: &PrefixNode = &KEY_TREE;
        let mut consumed: Vec<u8> = vec![];
        loop {
            let sublevel = !consumed.is_empty();
            let byte = if sublevel {
                self.source.read_byte_within(QUIET_TIME)?
            } else {
                self.source.read_byte()?
            };
            let Some(byte) = byte else {
                if consumed.is_empty() {
                    return Err(Error::TerminalIo(io::ErrorKind::UnexpectedEof.into()));
                }
                // Quiet time ran out: this was no (known) escape sequence.
                let bytes = std::mem::take(&mut consumed);
                self.replay(&bytes);
                break;
            };
            if !sublevel && byte >= 0x80 {
                let ch = self.read_utf8(byte)?;
                self.pending.push_back(Key::char(ch));
                break;
            }
            consumed.push(byte);
            match node.children.get(&byte) {
                Some(child) => {
                    node = child;
                    if let Some(key) = node.key {
                        self.pending.push_back(key);
                        break;
                    }
                }
                None => {
                    let bytes = std::mem::take(&mut consumed);
                    self.replay(&bytes);
                    break;
                }
            }
        }
        self.pending.pop_front().ok_or_else(|| {
            debug_assert!(false, "key buffer drained unexpectedly");
            Error::InvariantViolation("key buffer drained unexpectedly".into())
        })
    }

    /// Parses the mouse report data following a [`KeyCode::Mouse`] key.
    pub fn mouse_report(&mut self) -> Result<MouseReport> {
        let mut report = String::with_capacity(16);
        loop {
            let key = self.key()?;
            let KeyCode::Char(c) = key.code else {
                return Err(Error::BadArgument(format!("unexpected key in mouse report: {key:?}")));
            };
            report.push(c);
            if c == 'M' || c == 'm' {
                break;
            }
            if report.len() > 16 {
                return Err(Error::BadArgument(format!("malformed mouse report: {report}")));
            }
        }
        let action = if report.ends_with('M') { MouseAction::Press } else { MouseAction::Release };
        let body = &report[..report.len() - 1];
        let fields: Vec<&str> = body.split(';').collect();
        let [b, column, line] = fields[..] else {
            return Err(Error::BadArgument(format!("malformed mouse report: {report}")));
        };
        let parse = |s: &str| -> Result<u16> {
            s.parse()
                .map_err(|_| Error::BadArgument(format!("malformed mouse report: {report}")))
        };
        let b = parse(b)?;
        let mut modifiers = KeyModifiers::empty();
        if b & 4 != 0 {
            modifiers |= KeyModifiers::SHIFT;
        }
        if b & 8 != 0 {
            modifiers |= KeyModifiers::ALT;
        }
        if b & 16 != 0 {
            modifiers |= KeyModifiers::CONTROL;
        }
        Ok(MouseReport {
            button: (b & 3) as u8 + 1,
            modifiers,
            column: parse(column)?.saturating_sub(1),
            line: parse(line)?.saturating_sub(1),
            action,
            motion: b == 35,
        })
    }

    /// The next input event: a key, or a decoded mouse report.
    pub fn event(&mut self) -> Result<Event> {
        let key = self.key()?;
        if key.code == KeyCode::Mouse {
            let report = self.mouse_report()?;
            if report.motion {
                return Ok(Event::MouseMove {
                    column: report.column,
                    line: report.line,
                });
            }
            return Ok(Event::MouseButton {
                button: report.button,
                modifiers: report.modifiers,
                column: report.column,
                line: report.line,
                action: report.action,
            });
        }
        Ok(Event::Key(key))
    }
}
