#![forbid(unsafe_code)]

//! Frame composition and the render/read dispatch loop.
//!
//! The loop has exactly two states, rendering and reading, and alternates
//! between them unconditionally. There is no idle state: the cycle is gated
//! only by the key reader's one-second read timeout. It ends on the quit key
//! or on the first fatal error, whichever comes first.

use rawpad_core::{Frame, Result, ScreenGeometry, ansi};
use rawpad_tty::TtySession;

/// Control-key encoding: the key byte with the top three bits cleared.
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1f
}

/// Ctrl+Q ends the program.
pub const QUIT_KEY: u8 = ctrl(b'q');

/// What the dispatch switch decided for one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep looping.
    Continue,
    /// Leave the loop; the session guard resets the screen on the way out.
    Quit,
}

/// The full-screen pad: owns the resolved geometry and drives the loop.
#[derive(Debug)]
pub struct App {
    geometry: ScreenGeometry,
}

impl App {
    /// Build an app for a screen of the given size.
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }

    /// Compose one full frame: clear the display, home the cursor, draw one
    /// placeholder row per screen row, home the cursor again.
    ///
    /// Rows are separated by `\r\n`; the last row gets no separator, since a
    /// trailing newline would scroll the screen. The caller flushes the
    /// result in a single write.
    pub fn compose_frame(&self) -> Result<Frame> {
        let rows = self.geometry.rows;
        let mut frame = Frame::with_capacity(rows as usize * 3 + 16);

        frame.append(ansi::CLEAR_SCREEN)?;
        frame.append(ansi::CURSOR_HOME)?;
        for row in 0..rows {
            frame.append(b"~")?;
            if row + 1 < rows {
                frame.append(b"\r\n")?;
            }
        }
        frame.append(ansi::CURSOR_HOME)?;

        Ok(frame)
    }

    /// Decide what one keystroke means. The byte is consumed here and never
    /// stored.
    pub fn dispatch(&mut self, key: u8) -> Action {
        match key {
            QUIT_KEY => Action::Quit,
            _ => Action::Continue,
        }
    }

    /// Alternate rendering and reading until the quit key or a fatal error.
    pub fn run(&mut self, session: &mut TtySession) -> Result<()> {
        loop {
            let frame = self.compose_frame()?;
            session.present(&frame)?;

            let key = session.read_key()?;
            if self.dispatch(key) == Action::Quit {
                return Ok(());
            }
        }
    }
}
