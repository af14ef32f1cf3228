//! Coloured console output
//!
//! Bold coloured text through crossterm commands, a `log_with_color!` macro
//! for ad-hoc status lines, and [`ColorLogger`], a `log` backend that
//! colours each line by level.

use std::fmt;
use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::time::ts_now;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Reset,
}

impl TermColor {
    /// Numeric codes 1..=8 in the order of the variants. Anything else is `Reset`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => TermColor::Red,
            2 => TermColor::Green,
            3 => TermColor::Yellow,
            4 => TermColor::Blue,
            5 => TermColor::Magenta,
            6 => TermColor::Cyan,
            7 => TermColor::White,
            _ => TermColor::Reset,
        }
    }

    fn foreground(self) -> Option<Color> {
        match self {
            TermColor::Red => Some(Color::Red),
            TermColor::Green => Some(Color::Green),
            TermColor::Yellow => Some(Color::Yellow),
            TermColor::Blue => Some(Color::Blue),
            TermColor::Magenta => Some(Color::Magenta),
            TermColor::Cyan => Some(Color::Cyan),
            TermColor::White => Some(Color::White),
            TermColor::Reset => None,
        }
    }
}

/// Write `args` in bold `color`, then restore default attributes.
pub fn write_colored<W: Write>(out: &mut W, color: TermColor, args: fmt::Arguments) -> io::Result<()> {
    if let Some(fg) = color.foreground() {
        queue!(out, SetAttribute(Attribute::Bold), SetForegroundColor(fg))?;
    }
    queue!(out, Print(args), SetAttribute(Attribute::Reset), ResetColor)?;
    out.flush()
}

pub fn print_colored(color: TermColor, args: fmt::Arguments) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_colored(&mut handle, color, args)
}

/// `printf`-style coloured line on stdout. Write errors are ignored.
///
/// ```
/// use rd_kits::console::TermColor;
/// rd_kits::log_with_color!(TermColor::Green, "state -> {}\n", "ACTIVE");
/// ```
#[macro_export]
macro_rules! log_with_color {
    ($color:expr, $($arg:tt)*) => {{
        let _ = $crate::console::print_colored($color, format_args!($($arg)*));
    }};
}

pub fn level_color(level: Level) -> TermColor {
    match level {
        Level::Error => TermColor::Red,
        Level::Warn => TermColor::Yellow,
        Level::Info => TermColor::Green,
        Level::Debug => TermColor::Cyan,
        Level::Trace => TermColor::Magenta,
    }
}

/// `log` backend writing `[HH:MM:SS.mmm] LEVEL target: message` to stderr.
///
/// Lines end in `\r\n` so they stay aligned while the terminal is in raw mode.
pub struct ColorLogger {
    level: LevelFilter,
}

impl ColorLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Install as the global logger. Fails if another logger is already set.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn write_record<W: Write>(&self, out: &mut W, record: &Record) -> io::Result<()> {
        write_colored(
            out,
            level_color(record.level()),
            format_args!(
                "[{}] {:<5} {}: {}\r\n",
                ts_now(),
                record.level(),
                record.target(),
                record.args()
            ),
        )
    }
}

impl Log for ColorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = self.write_record(&mut handle, record);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
