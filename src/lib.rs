//! # spark-otp
//!
//! Reactive one-time-code input for terminal UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A code is a row of single-digit cells, each cell a focusable unit.
//! Keystrokes flow through a pure controller that returns the next code
//! and a focus command. The widget commits the result to signals, and a
//! single render effect writes changed frames inline:
//!
//! ```text
//! Key/Paste event → controller step → Code signal + focus → render effect
//! ```
//!
//! ## Modules
//!
//! - [`code`] - The Code value type (per-cell digits)
//! - [`controller`] - Pure edit rules (digit entry, backspace)
//! - [`widget`] - The otp_input component
//! - [`state`] - Focus, keyboard, and event routing
//! - [`render`] - Inline terminal renderer
//! - [`pipeline`] - Mount, tick, run, unmount

pub mod code;
pub mod controller;
pub mod pipeline;
pub mod render;
pub mod state;
pub mod types;
pub mod widget;

// Re-export commonly used items
pub use types::*;

pub use code::Code;

pub use controller::{cell_change, key_down, sanitize_digits, FocusCommand, Step};

pub use render::{FrameBuffer, InlineRenderer, OutputBuffer};

pub use pipeline::{mount, run, tick, unmount, MountHandle};

pub use widget::{build_frame, otp_input, Cleanup, OtpInputProps};

pub use state::{
    // Focus
    allocate_cells, blur, focus, focus_first, focus_last, focus_next, focus_previous,
    get_focusable_indices, get_focused_index, has_focus, is_focused, register_callbacks,
    release_cells, reset_focus_state, FocusCallbacks,
    // Keyboard
    cleanup_index, dispatch as dispatch_keyboard, dispatch_focused, last_event, last_key,
    on as on_keyboard, on_focused, on_key, on_keys, reset_keyboard_state, KeyHandler, KeyState,
    KeyboardEvent, Modifiers,
    // Input
    poll_event, read_event, route_event, InputEvent,
    // Global keys
    setup_global_keys, GlobalKeysHandle,
};
