//! Mount API - application lifecycle and render effect.
//!
//! This module provides the entry point for mounting code inputs in the
//! terminal. It sets up the render effect that watches the reactive
//! widget state and writes frames inline.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::pipeline;
//!
//! // Mount after creating inputs
//! let handle = pipeline::mount()?;
//!
//! // Option 1: Run blocking event loop
//! pipeline::run(&handle)?;
//!
//! // Option 2: Tick manually in your own loop
//! while pipeline::tick(&handle)? {
//!     // Your logic here
//! }
//!
//! // Clean up
//! handle.unmount();
//! ```

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use spark_signals::effect;

use crate::render::{ansi, InlineRenderer, OutputBuffer};
use crate::state::{global_keys, input};
use crate::widget;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by mount() that allows unmounting.
///
/// Holds references to:
/// - The render effect stop function
/// - The running flag (set to false on Ctrl+C or unmount)
/// - The global keys handle (for cleanup)
/// - The shared renderer (for erasing the frame on unmount)
pub struct MountHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    running: Arc<AtomicBool>,
    global_keys: Option<global_keys::GlobalKeysHandle>,
    renderer: Rc<RefCell<InlineRenderer>>,
}

impl MountHandle {
    /// Stop the render effect and clean up.
    ///
    /// This will:
    /// 1. Set running to false
    /// 2. Clean up global key handlers
    /// 3. Stop the render effect
    /// 4. Erase the rendered frame and restore the terminal
    pub fn unmount(mut self) {
        self.running.store(false, Ordering::SeqCst);

        // Clean up global keys
        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }

        // Stop render effect
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }

        // Erase the frame and restore the terminal
        let _ = self.renderer.borrow_mut().clear();
        let _ = restore_terminal();
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the application (sets running to false).
    /// Use this to trigger graceful shutdown from custom code.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        // Restore the terminal on drop (best effort)
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        let _ = restore_terminal();
    }
}

// =============================================================================
// Terminal Setup
// =============================================================================

/// Raw input, hidden cursor, bracketed paste on.
fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;

    let mut out = OutputBuffer::new();
    ansi::cursor_hide(&mut out)?;
    ansi::enable_bracketed_paste(&mut out)?;
    out.flush_stdout()
}

/// Undo setup_terminal. Safe to call more than once.
fn restore_terminal() -> io::Result<()> {
    let mut out = OutputBuffer::new();
    ansi::disable_bracketed_paste(&mut out)?;
    ansi::reset(&mut out)?;
    ansi::cursor_show(&mut out)?;
    out.flush_stdout()?;

    disable_raw_mode()
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount the code inputs.
///
/// This sets up:
/// 1. Terminal raw mode, hidden cursor, bracketed paste
/// 2. The reactive render effect (widget state -> frame -> terminal)
/// 3. Global key handlers (Ctrl+C for shutdown, Tab/Shift+Tab for focus)
///
/// Create inputs with [`widget::otp_input`] before or after mounting;
/// the render effect picks up changes either way.
///
/// Returns a MountHandle for cleanup.
pub fn mount() -> io::Result<MountHandle> {
    setup_terminal()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_for_effect = running.clone();

    let renderer = Rc::new(RefCell::new(InlineRenderer::new()));
    renderer.borrow_mut().reset();

    // The ONE render effect
    let renderer_for_effect = renderer.clone();
    let stop_fn = effect(move || {
        if !running_for_effect.load(Ordering::SeqCst) {
            return;
        }

        // Read widget and focus signals (creates dependencies)
        let frame = widget::build_frame();

        // Render to terminal (side effect!)
        let _ = renderer_for_effect.borrow_mut().render(&frame);
    });

    // Set up global key handlers (Ctrl+C, Tab, Shift+Tab)
    let global_keys_handle = global_keys::setup_global_keys(running.clone());

    Ok(MountHandle {
        stop_effect: Some(Box::new(stop_fn)),
        running,
        global_keys: Some(global_keys_handle),
        renderer,
    })
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Event Loop
// =============================================================================

/// Run the event loop once (non-blocking).
///
/// Call this in your main loop to process input events.
///
/// # Returns
///
/// * `Ok(true)` - Continue running
/// * `Ok(false)` - Stop requested (Ctrl+C pressed or `handle.stop()` called)
/// * `Err(e)` - I/O error while polling
pub fn tick(handle: &MountHandle) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    // Poll with short timeout (~60fps)
    if let Some(event) = input::poll_event(Duration::from_millis(16))? {
        input::route_event(event);
    }

    Ok(handle.is_running())
}

/// Run the event loop (blocking until stopped).
///
/// This function blocks until:
/// - Ctrl+C is pressed (sets running to false)
/// - `handle.stop()` is called from a key handler or callback
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle)? {
        // Continue processing events
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
