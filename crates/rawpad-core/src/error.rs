#![forbid(unsafe_code)]

//! Error taxonomy for the terminal-control core.
//!
//! Every fatal error unwinds to the top-level driver. The session guard
//! resets the screen on the way out, and the driver prints a one-line
//! diagnostic naming the failed operation plus the underlying OS error text.
//! The only retried conditions are the benign read timeout and interrupts;
//! nothing here is retried.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Why the terminal geometry could not be determined.
#[derive(Debug)]
pub enum GeometryQueryError {
    /// Writing the probe sequences or reading the reply failed.
    Io(io::Error),
    /// The reply lacked the `ESC [` prefix or did not parse as exactly two
    /// positive decimal integers.
    MalformedReport,
}

impl fmt::Display for GeometryQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::MalformedReport => write!(f, "cursor position report was malformed"),
        }
    }
}

impl std::error::Error for GeometryQueryError {}

/// Top-level error type for rawpad.
#[derive(Debug)]
pub enum Error {
    /// Reading or applying terminal attributes failed. The terminal state is
    /// unknown at this point, so the program cannot safely continue.
    TerminalConfig(io::Error),
    /// Neither the direct window-size query nor the cursor probe produced a
    /// usable geometry. Fatal at startup: without a size there is nothing
    /// sensible to draw.
    GeometryQuery(GeometryQueryError),
    /// A terminal read or write failed outside the benign timeout/retry path.
    TerminalIo(io::Error),
    /// The frame buffer could not grow. The frame in progress is abandoned
    /// rather than flushed half-built.
    FrameAlloc(TryReserveError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TerminalConfig(err) => write!(f, "cannot configure terminal attributes: {err}"),
            Self::GeometryQuery(err) => write!(f, "cannot determine terminal size: {err}"),
            Self::TerminalIo(err) => write!(f, "terminal i/o failed: {err}"),
            Self::FrameAlloc(err) => write!(f, "cannot grow frame buffer: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<GeometryQueryError> for Error {
    fn from(err: GeometryQueryError) -> Self {
        Self::GeometryQuery(err)
    }
}

/// Standard result type for rawpad APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failed_operation() {
        let err = Error::TerminalConfig(io::Error::other("boom"));
        assert_eq!(
            err.to_string(),
            "cannot configure terminal attributes: boom"
        );

        let err = Error::GeometryQuery(GeometryQueryError::MalformedReport);
        assert_eq!(
            err.to_string(),
            "cannot determine terminal size: cursor position report was malformed"
        );
    }
}
