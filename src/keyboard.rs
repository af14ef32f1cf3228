//! Non-blocking keyboard polling
//!
//! [`KeyboardPoller`] puts the terminal in raw mode for as long as it lives
//! so single key presses arrive without waiting for Enter. Raw mode is
//! process-wide, so only one poller may exist at a time.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use log::debug;

/// Set while a live `KeyboardPoller` owns raw mode
static RAW_MODE_HELD: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
pub struct KeyboardPoller {
    _private: (),
}

impl KeyboardPoller {
    /// Enable raw mode. Fails with `AlreadyExists` while another poller is alive.
    pub fn new() -> io::Result<Self> {
        if RAW_MODE_HELD
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a keyboard poller already owns the terminal",
            ));
        }
        if let Err(e) = terminal::enable_raw_mode() {
            RAW_MODE_HELD.store(false, Ordering::Release);
            return Err(e);
        }
        debug!("terminal raw mode enabled");
        Ok(Self { _private: () })
    }

    /// True if an input event is waiting. Never blocks.
    pub fn key_pending(&self) -> io::Result<bool> {
        event::poll(Duration::ZERO)
    }

    /// Next key press as a character, or `None` if nothing usable is queued.
    /// Non-key events that are pending get consumed.
    pub fn try_read_char(&self) -> io::Result<Option<char>> {
        while self.key_pending()? {
            if let Some(c) = key_char(&event::read()?) {
                return Ok(Some(c));
            }
        }
        Ok(None)
    }
}

impl Drop for KeyboardPoller {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("failed to restore terminal mode: {}", e);
        }
        RAW_MODE_HELD.store(false, Ordering::Release);
    }
}

/// Character produced by a key press. Enter is `'\n'`, Esc is `'\x1b'`.
pub fn key_char(ev: &Event) -> Option<char> {
    match ev {
        Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Char(c) => Some(*c),
            KeyCode::Enter => Some('\n'),
            KeyCode::Esc => Some('\x1b'),
            _ => None,
        },
        _ => None,
    }
}
