//! Terminal renderer - the "blind" output layer.
//!
//! The renderer knows only about cells. It doesn't understand inputs,
//! focus, or reactivity. It simply takes a filled FrameBuffer and outputs
//! optimized ANSI escape sequences to the terminal, inline below the
//! shell prompt.

pub mod ansi;
pub mod buffer;
pub mod inline;
pub mod output;

// Re-exports for convenience
pub use buffer::{char_width, string_width, FrameBuffer};
pub use inline::InlineRenderer;
pub use output::{OutputBuffer, StatefulCellRenderer};
