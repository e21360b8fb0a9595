//! State Module - Runtime state management systems
//!
//! The reactive state systems that power the code input:
//!
//! - **Focus** - Cell allocation, Tab cycling, callbacks
//! - **Keyboard** - Event types, dispatch priority chain, handler registry
//! - **Input** - crossterm event conversion, polling, routing
//! - **Global keys** - Ctrl+C shutdown, Tab/Shift+Tab cycling

pub mod focus;
pub mod global_keys;
pub mod input;
pub mod keyboard;

pub use focus::*;
pub use global_keys::*;
pub use input::*;
pub use keyboard::*;
