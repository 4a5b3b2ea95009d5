#![forbid(unsafe_code)]

//! rawpad: a minimal full-screen terminal pad.
//!
//! The binary wires three layers together: `rawpad-core` (pure frame and
//! geometry types), `rawpad-tty` (the raw-mode session guard), and the
//! dispatch loop in [`app`].

pub mod app;
