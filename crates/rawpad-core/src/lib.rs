#![forbid(unsafe_code)]

//! Core: frame buffering, screen geometry, and the error taxonomy for rawpad.
//!
//! This crate is pure and platform-independent. Everything that touches the
//! terminal device lives in `rawpad-tty`; everything here can be exercised
//! with plain byte buffers.

pub mod ansi;
pub mod error;
pub mod frame;
pub mod geometry;

pub use error::{Error, GeometryQueryError, Result};
pub use frame::Frame;
pub use geometry::ScreenGeometry;
