// net/mod.rs
//! Networking layer: framing buffers shared by every connection.
//! Everything in here is transport-agnostic.

pub mod line_buffer;

pub use line_buffer::{DEFAULT_MAX_LINE_BYTES, Line, LineBuffer};
