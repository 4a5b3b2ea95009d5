#![forbid(unsafe_code)]

//! VT100 escape sequences used for screen control.
//!
//! | Action                     | Bytes               |
//! |----------------------------|---------------------|
//! | Clear entire display       | `CSI 2 J`           |
//! | Cursor to home (1,1)       | `CSI H`             |
//! | Force cursor bottom-right  | `CSI 999 C CSI 999 B` |
//! | Request cursor position    | `CSI 6 n`           |
//!
//! The cursor position reply has the form `CSI <rows> ; <cols> R`.

/// Control Sequence Introducer; also the prefix of every cursor report.
pub const CSI: &[u8] = b"\x1b[";

/// Erase the whole display.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// Move the cursor to row 1, column 1.
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Move the cursor far right, then far down. Terminals clamp both moves to
/// the screen edge, which parks the cursor at the true bottom-right corner.
pub const CURSOR_FORCE_BOTTOM_RIGHT: &[u8] = b"\x1b[999C\x1b[999B";

/// Device Status Report query for the current cursor position.
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";
