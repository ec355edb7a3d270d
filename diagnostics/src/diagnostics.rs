//! The diagnostics object controls the output of errors and notes generated
//! while type checking expressions. It also tracks the number of messages
//! per level so callers can decide whether to proceed.
//!
//! This implementation is NOT thread-safe.

use failure::Fail;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    io::{self, Write},
    rc::Rc,
};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Instead of writing type errors directly to stderr, they are collected in
/// this object.
///
/// This has several advantages:
/// - callers can count and inspect what was reported.
/// - we have a single source responsible for formatting checker messages.
pub struct Diagnostics {
    message_count: RefCell<HashMap<MessageLevel, usize>>,
    writer: RefCell<Box<dyn WriteColor>>,
}

impl Diagnostics {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            writer: RefCell::new(writer),
            message_count: RefCell::new(HashMap::new()),
        }
    }

    /// True when an error message was emitted, false
    /// if only notes were emitted.
    pub fn errored(&self) -> bool {
        self.count(MessageLevel::Error) > 0
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.message_count
            .borrow()
            .get(&level)
            .cloned()
            .unwrap_or(0)
    }

    pub fn write_statistics(&self) {
        let mut writer = self.writer.borrow_mut();
        let mut output = ColorOutput::new(&mut **writer);

        output.set_bold(true);

        if self.errored() {
            output.set_color(MessageLevel::Error.color());
            writeln!(
                output.writer(),
                "Type checking aborted due to {}",
                match self.count(MessageLevel::Error) {
                    1 => "an error".to_string(),
                    n => format!("{} errors", n),
                }
            )
            .ok();
        } else {
            output.set_color(Some(Color::Green));
            writeln!(output.writer(), "Type checking finished successfully").ok();
        }
    }

    /// Write a message of the given level to the writer passed to `new`.
    /// Most of the time this will be stderr.
    pub fn emit(&self, level: MessageLevel, message: &dyn fmt::Display) {
        let msg = Message { level, message };

        let mut writer = self.writer.borrow_mut();
        msg.write_colored(&mut **writer);
        self.increment_level_count(level);
    }

    pub fn error<F: Fail>(&self, error: &F) {
        self.emit(MessageLevel::Error, error)
    }

    pub fn note(&self, note: &dyn fmt::Display) {
        self.emit(MessageLevel::Note, note)
    }

    fn increment_level_count(&self, level: MessageLevel) {
        let mut message_count = self.message_count.borrow_mut();
        let counter = message_count.entry(level).or_insert(0);
        *counter += 1;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageLevel {
    Error,
    Note,
}

impl MessageLevel {
    fn color(self) -> Option<Color> {
        // Don't be confused by the return type. `None` means default color!
        match self {
            MessageLevel::Error => Some(Color::Red),
            MessageLevel::Note => Some(Color::Cyan),
        }
    }

    fn name(self) -> &'static str {
        match self {
            MessageLevel::Error => "error",
            MessageLevel::Note => "note",
        }
    }
}

struct Message<'a> {
    level: MessageLevel,
    message: &'a dyn fmt::Display,
}

impl Message<'_> {
    fn write_colored(&self, writer: &mut dyn WriteColor) {
        let mut output = ColorOutput::new(writer);
        output.set_color(self.level.color());
        output.set_bold(true);
        write!(output.writer(), "{}: ", self.level.name()).ok();

        output.set_color(None);
        output.set_bold(false);
        writeln!(output.writer(), "{}", self.message).ok();
    }
}

/// Calls to functions should pass the raw writer, each function should
/// create its own `ColorOutput` object that is dropped on return. This
/// gurantees correct coloring in nested calls.
struct ColorOutput<'a> {
    writer: &'a mut dyn WriteColor,
    spec: ColorSpec,
}

impl<'a> ColorOutput<'a> {
    fn new(writer: &'a mut dyn WriteColor) -> Self {
        writer.reset().ok();

        Self {
            writer,
            spec: ColorSpec::new(),
        }
    }

    fn set_color(&mut self, color: Option<Color>) {
        // ignore coloring failures using ok()
        self.spec.set_fg(color);
        self.writer.set_color(&self.spec).ok();
    }

    fn set_bold(&mut self, yes: bool) {
        self.spec.set_bold(yes);
        self.writer.set_color(&self.spec).ok();
    }

    fn writer(&mut self) -> &mut dyn WriteColor {
        self.writer
    }
}

/// reset to no color by default. Otherwise code that
/// is not color aware will print everything in the
/// color last used.
impl<'a> Drop for ColorOutput<'a> {
    fn drop(&mut self) {
        self.writer.reset().ok();
    }
}

/// An uncolored in-memory writer whose contents stay readable after it was
/// handed to a `Diagnostics` object. Meant for use in tests.
#[derive(Clone)]
pub struct SharedBuffer(Rc<RefCell<Buffer>>);

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer(Rc::new(RefCell::new(Buffer::no_color())))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.0.borrow().as_slice()).into_owned()
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

impl WriteColor for SharedBuffer {
    fn supports_color(&self) -> bool {
        self.0.borrow().supports_color()
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.0.borrow_mut().set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.0.borrow_mut().reset()
    }
}
