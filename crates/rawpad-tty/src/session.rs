#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! # Lifecycle guarantees
//!
//! 1. **Attributes are captured before anything is changed.** The snapshot is
//!    taken with `tcgetattr` before the raw set is applied and is never
//!    mutated afterwards; it exists only as the restoration target.
//!
//! 2. **Drop restores the captured attributes.** Dropping the session writes
//!    the screen reset (clear + home), flushes, and reapplies the snapshot
//!    with `TCSAFLUSH`. This runs on normal return, on `?` propagation, and
//!    during panic unwinding (unless `panic = "abort"`).
//!
//! 3. **Panics restore even without unwinding the guard.** [`TtySession::open`]
//!    installs a hook that re-opens `/dev/tty` and makes a best-effort
//!    restore before the default panic output runs, so the backtrace lands on
//!    a readable screen.
//!
//! Restoration after an external kill signal is not guaranteed — a stated
//! limitation of the single-threaded design, not something this module papers
//! over with a signal thread.
//!
//! # Raw attribute set
//!
//! Relative to the captured attributes: local `ECHO`, `ICANON`, `ISIG` and
//! `IEXTEN` are cleared; input `BRKINT`, `ICRNL`, `INPCK`, `ISTRIP` and
//! `IXON` are cleared; output `OPOST` is cleared; `CS8` is set; `VMIN = 0`
//! and `VTIME = 10` give every read a one-second timeout. Applying the set
//! uses `TCSAFLUSH`, which discards any input typed before raw mode began.
//!
//! # Contract
//!
//! Only one session should exist at a time; the process owns exactly one
//! controlling terminal and the attribute snapshot must be unique.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::OnceLock;

use nix::libc;
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};

use rawpad_core::{Error, Frame, Result, ScreenGeometry, ansi};

/// Inter-byte read timeout applied in raw mode, in tenths of a second.
pub const READ_TIMEOUT_DECISECONDS: u8 = 10;

/// RAII guard for a raw-mode terminal session.
///
/// Owns the terminal device (read and write) for its whole lifetime. See the
/// module docs for the lifecycle guarantees.
pub struct TtySession {
    tty: File,
    original: Termios,
}

impl TtySession {
    /// Open the controlling terminal and enter raw mode.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalConfig`] if `/dev/tty` cannot be opened or the
    /// attribute read/apply fails. Nothing is left half-configured: the
    /// attributes are only changed after the snapshot has been captured.
    pub fn open() -> Result<Self> {
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(Error::TerminalConfig)?;
        let session = Self::from_tty(tty)?;
        install_panic_hook(libc::termios::from(session.original.clone()));
        Ok(session)
    }

    /// Enter raw mode on a caller-supplied terminal device.
    ///
    /// Used by tests that drive a pseudoterminal instead of the controlling
    /// terminal. Does not install the panic hook; the caller keeps the device
    /// and its cleanup in scope.
    pub fn from_tty(tty: File) -> Result<Self> {
        let original = termios::tcgetattr(&tty)
            .map_err(|errno| Error::TerminalConfig(io::Error::from(errno)))?;

        let raw = raw_attributes(&original);
        termios::tcsetattr(&tty, SetArg::TCSAFLUSH, &raw)
            .map_err(|errno| Error::TerminalConfig(io::Error::from(errno)))?;

        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        Ok(Self { tty, original })
    }

    /// Determine the screen geometry, via the kernel query or the cursor
    /// probe fallback.
    pub fn resolve_geometry(&mut self) -> Result<ScreenGeometry> {
        crate::winsize::resolve_geometry(&self.tty)
    }

    /// Block until the next key byte arrives.
    pub fn read_key(&mut self) -> Result<u8> {
        crate::input::read_key_from(&mut &self.tty)
    }

    /// Flush one composed frame to the terminal.
    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        present_to(&mut &self.tty, frame)
    }
}

impl Drop for TtySession {
    fn drop(&mut self) {
        // Reset the screen first so the restored shell prompt starts at a
        // known position, then put the attributes back.
        let _ = write_reset_sequence(&mut &self.tty);
        let _ = (&self.tty).flush();
        let _ = termios::tcsetattr(&self.tty, SetArg::TCSAFLUSH, &self.original);

        #[cfg(feature = "tracing")]
        tracing::info!("terminal attributes restored");
    }
}

/// Write one composed frame with a single write call, then flush.
///
/// The frame must never be split across writes: interleaved partial writes
/// are exactly the tearing this crate exists to avoid.
pub fn present_to<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    writer
        .write_all(frame.as_bytes())
        .map_err(Error::TerminalIo)?;
    writer.flush().map_err(Error::TerminalIo)
}

/// Clear the display and home the cursor: the reset emitted on every exit
/// path, quit and fatal alike. One write, like every other screen update.
pub fn write_reset_sequence<W: Write>(writer: &mut W) -> io::Result<()> {
    let mut reset = Vec::with_capacity(ansi::CLEAR_SCREEN.len() + ansi::CURSOR_HOME.len());
    reset.extend_from_slice(ansi::CLEAR_SCREEN);
    reset.extend_from_slice(ansi::CURSOR_HOME);
    writer.write_all(&reset)
}

fn raw_attributes(original: &Termios) -> Termios {
    let mut raw = original.clone();
    raw.local_flags &=
        !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::ISIG | LocalFlags::IEXTEN);
    raw.input_flags &= !(InputFlags::BRKINT
        | InputFlags::ICRNL
        | InputFlags::INPCK
        | InputFlags::ISTRIP
        | InputFlags::IXON);
    raw.output_flags &= !OutputFlags::OPOST;
    raw.control_flags |= ControlFlags::CS8;
    raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
    raw.control_chars[SpecialCharacterIndices::VTIME as usize] = READ_TIMEOUT_DECISECONDS;
    raw
}

// The attribute snapshot for the panic hook is a plain `libc::termios` copy:
// it has to cross the hook's Send + Sync bound, which the nix wrapper does
// not satisfy.
static SAVED_ATTRIBUTES: OnceLock<libc::termios> = OnceLock::new();

fn install_panic_hook(saved: libc::termios) {
    if SAVED_ATTRIBUTES.set(saved).is_err() {
        // A session in this process already installed the hook.
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(saved) = SAVED_ATTRIBUTES.get() {
            emergency_restore(*saved);
        }
        previous(info);
    }));
}

// Best-effort restore for unwind paths. Ignores every error: a panic is
// already in flight and there is nobody left to report to.
fn emergency_restore(saved: libc::termios) {
    if let Ok(mut tty) = OpenOptions::new().write(true).open("/dev/tty") {
        let _ = write_reset_sequence(&mut tty);
        let _ = tty.flush();
        let _ = termios::tcsetattr(&tty, SetArg::TCSAFLUSH, &Termios::from(saved));
    }
}
