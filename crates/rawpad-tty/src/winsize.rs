#![forbid(unsafe_code)]

//! Terminal geometry discovery.
//!
//! The kernel is asked first (`TIOCGWINSZ` via `tcgetwinsize`). When the
//! query fails or reports a zero column count — some terminal emulators and
//! serial links do — the resolver falls back to asking the terminal itself:
//! park the cursor at the bottom-right extreme, request a cursor position
//! report, and parse the reply. Both probe sides are generic over
//! `Read`/`Write` so the fallback is testable with plain pipes.

use std::fs::File;
use std::io::{self, Read, Write};

use rawpad_core::geometry::{self, ScreenGeometry};
use rawpad_core::{Error, GeometryQueryError, Result, ansi};

/// Upper bound on the bytes a cursor report may occupy, terminator included.
const REPORT_CAPACITY: usize = 32;

/// Determine the terminal size in rows and columns.
pub fn resolve_geometry(tty: &File) -> Result<ScreenGeometry> {
    match rustix::termios::tcgetwinsize(tty) {
        Ok(size) if size.ws_col > 0 => {
            #[cfg(feature = "tracing")]
            tracing::debug!(rows = size.ws_row, cols = size.ws_col, "geometry from kernel query");
            Ok(ScreenGeometry::new(size.ws_row, size.ws_col))
        }
        _ => {
            #[cfg(feature = "tracing")]
            tracing::debug!("kernel size query unusable, probing cursor position");
            let (mut reader, mut writer) = (tty, tty);
            probe_cursor_position(&mut reader, &mut writer)
        }
    }
}

/// Measure the screen by parking the cursor at the bottom-right extreme and
/// asking the terminal where it ended up.
///
/// # Errors
///
/// [`Error::GeometryQuery`] when the probe cannot be written or the reply is
/// missing, malformed, or not `ESC [ <rows> ; <cols> R`.
pub fn probe_cursor_position<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Result<ScreenGeometry> {
    writer
        .write_all(ansi::CURSOR_FORCE_BOTTOM_RIGHT)
        .map_err(probe_io)?;
    writer
        .write_all(ansi::CURSOR_POSITION_QUERY)
        .map_err(probe_io)?;
    writer.flush().map_err(probe_io)?;

    let report = read_report(reader)?;
    geometry::parse_cursor_report(&report)
        .ok_or(Error::GeometryQuery(GeometryQueryError::MalformedReport))
}

/// Collect the reply byte by byte into a bounded buffer.
///
/// The terminator `R` ends the reply and is not stored. A zero-length read is
/// a legitimate end of the reply (the raw-mode read timeout), not an error;
/// whatever arrived by then goes to the parser.
fn read_report<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut report = Vec::with_capacity(REPORT_CAPACITY);
    let mut byte = [0u8; 1];

    while report.len() < REPORT_CAPACITY - 1 {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) if byte[0] == b'R' => break,
            Ok(_) => report.push(byte[0]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(probe_io(err)),
        }
    }

    Ok(report)
}

fn probe_io(err: io::Error) -> Error {
    Error::GeometryQuery(GeometryQueryError::Io(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use nix::pty::{Winsize, openpty};
    use nix::sys::termios::Termios;

    #[test]
    fn probe_writes_the_query_and_parses_the_reply() {
        let mut reader = Cursor::new(b"\x1b[24;80R".to_vec());
        let mut writer = Vec::new();

        let geometry = probe_cursor_position(&mut reader, &mut writer).unwrap();
        assert_eq!(geometry, ScreenGeometry::new(24, 80));
        assert_eq!(writer, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn probe_accepts_a_reply_ended_by_the_read_timeout() {
        // No terminator: the stream just stops, as it does when VTIME fires.
        let mut reader = Cursor::new(b"\x1b[12;40".to_vec());
        let mut writer = Vec::new();

        let geometry = probe_cursor_position(&mut reader, &mut writer).unwrap();
        assert_eq!(geometry, ScreenGeometry::new(12, 40));
    }

    #[test]
    fn probe_rejects_a_reply_without_the_prefix() {
        let mut reader = Cursor::new(b"24;80R".to_vec());
        let mut writer = Vec::new();

        let err = probe_cursor_position(&mut reader, &mut writer).unwrap_err();
        assert!(matches!(
            err,
            Error::GeometryQuery(GeometryQueryError::MalformedReport)
        ));
    }

    #[test]
    fn probe_rejects_an_empty_reply() {
        let mut reader = Cursor::new(Vec::new());
        let mut writer = Vec::new();

        let err = probe_cursor_position(&mut reader, &mut writer).unwrap_err();
        assert!(matches!(
            err,
            Error::GeometryQuery(GeometryQueryError::MalformedReport)
        ));
    }

    /// An endless stream that counts how many bytes were taken from it.
    struct EndlessReader {
        consumed: usize,
    }

    impl Read for EndlessReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf[0] = b'x';
            self.consumed += 1;
            Ok(1)
        }
    }

    #[test]
    fn probe_read_is_bounded_without_a_terminator() {
        let mut reader = EndlessReader { consumed: 0 };
        let mut writer = Vec::new();

        let err = probe_cursor_position(&mut reader, &mut writer).unwrap_err();
        assert!(matches!(
            err,
            Error::GeometryQuery(GeometryQueryError::MalformedReport)
        ));
        assert!(
            reader.consumed <= REPORT_CAPACITY,
            "probe consumed {} bytes",
            reader.consumed
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no terminal"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn probe_surfaces_write_failures() {
        let mut reader = Cursor::new(Vec::new());
        let err = probe_cursor_position(&mut reader, &mut FailingWriter).unwrap_err();
        assert!(matches!(
            err,
            Error::GeometryQuery(GeometryQueryError::Io(_))
        ));
    }

    #[test]
    fn kernel_query_reports_the_pty_size() {
        let size = Winsize {
            ws_row: 40,
            ws_col: 100,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let pty = openpty(&size, None::<&Termios>).expect("openpty");
        let _master = File::from(pty.master);
        let slave = File::from(pty.slave);

        let geometry = resolve_geometry(&slave).unwrap();
        assert_eq!(geometry, ScreenGeometry::new(40, 100));
    }
}
