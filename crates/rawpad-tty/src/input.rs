#![forbid(unsafe_code)]

//! Blocking single-key input, bounded by the raw-mode read timeout.

use std::io::{ErrorKind, Read};

use rawpad_core::{Error, Result};

/// Read the next key byte from the terminal.
///
/// Raw mode configures the device with `VMIN = 0` and a nonzero `VTIME`, so a
/// zero-length read means the inter-byte timeout expired with nothing typed;
/// the read is simply retried. Interrupted and would-block reads are retried
/// for the same reason. Every other failure is fatal.
pub fn read_key_from<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => continue,
            Ok(_) => return Ok(byte[0]),
            Err(err) if is_benign(&err) => continue,
            Err(err) => return Err(Error::TerminalIo(err)),
        }
    }
}

fn is_benign(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
