#![forbid(unsafe_code)]

//! Unix terminal backend for rawpad.
//!
//! Owns the terminal device for the life of the process: raw-mode entry and
//! restoration, geometry discovery, blocking key input, and single-write
//! frame presentation. The pure pieces (frame buffer, escape bytes, report
//! parsing) live in `rawpad-core`; this crate is the only one that touches
//! file descriptors.
//!
//! # Lifecycle
//!
//! [`TtySession`] is an RAII guard. Creating one enters raw mode; dropping it
//! clears the screen, homes the cursor, and reapplies the attributes captured
//! before entry — on normal return, on `?` propagation, and (via the panic
//! hook plus unwinding drop) on panic. Restoration after an external kill
//! signal is not guaranteed; that is a documented limitation, and this crate
//! deliberately runs no second thread of control to paper over it.

#[cfg(not(unix))]
compile_error!("rawpad-tty drives a termios terminal and only builds on Unix");

pub mod input;
pub mod session;
pub mod winsize;

pub use session::TtySession;
