//! OTP input - multi-cell one-time-code entry component.
//!
//! A row of single-digit cells for verification codes and PINs.
//!
//! # Features
//!
//! - Two-way code binding via Signal
//! - One focusable cell per digit, auto-advance on entry
//! - Backspace steps back through empty cells
//! - Paste fills the focused cell with the first pasted digit
//! - Mask mode for PIN entry, placeholder glyph for empty cells
//! - Arrow/Home/End navigation inside the row
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::widget::{otp_input, OtpInputProps};
//! use std::rc::Rc;
//!
//! let cleanup = otp_input(OtpInputProps {
//!     label: Some("Enter code".to_string()),
//!     auto_focus: true,
//!     on_complete: Some(Rc::new(|code| println!("got {}", code))),
//!     ..OtpInputProps::new(6)
//! });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{effect, signal, Signal};

use crate::code::Code;
use crate::controller::{self, FocusCommand};
use crate::render::buffer::{string_width, FrameBuffer};
use crate::state::{focus, keyboard};
use crate::types::{Attr, BorderStyle, Rgba};

// =============================================================================
// Callback Types
// =============================================================================

/// Cleanup function returned by component constructors.
pub type Cleanup = Box<dyn FnOnce()>;

/// Called with the joined code after every accepted edit.
pub type CodeChangeCallback = Rc<dyn Fn(&str)>;

/// Called with the joined code when an edit leaves every cell filled.
pub type CodeCompleteCallback = Rc<dyn Fn(&str)>;

/// Called with the joined code on Enter.
pub type CodeSubmitCallback = Rc<dyn Fn(&str)>;

/// Called on Escape.
pub type CodeCancelCallback = Rc<dyn Fn()>;

/// Called when focus enters the input.
pub type FocusCallback = Rc<dyn Fn()>;

/// Called when focus leaves the input.
pub type BlurCallback = Rc<dyn Fn()>;

// =============================================================================
// Props
// =============================================================================

/// Properties for the OTP input component.
pub struct OtpInputProps {
    // =========================================================================
    // Shape (Required)
    // =========================================================================
    /// Number of digit cells.
    pub length: usize,

    /// Current code (two-way bound signal).
    pub code: Signal<Code>,

    // =========================================================================
    // Display
    // =========================================================================
    /// Label line shown above the cells.
    pub label: Option<String>,

    /// Mask character for PIN entry (digits are hidden when set).
    pub mask_char: Option<char>,

    /// Glyph shown in empty cells.
    pub placeholder: Option<char>,

    /// Border style for each cell box.
    pub border: BorderStyle,

    /// Digit color.
    pub fg: Rgba,

    /// Cell background color.
    pub bg: Rgba,

    /// Border color for unfocused cells.
    pub border_color: Rgba,

    /// Border color for the focused cell.
    pub focused_border_color: Rgba,

    // =========================================================================
    // Behavior
    // =========================================================================
    /// Focus the first cell on mount.
    pub auto_focus: bool,

    // =========================================================================
    // Callbacks
    // =========================================================================
    /// Called after every accepted edit with the joined code.
    pub on_change: Option<CodeChangeCallback>,

    /// Called when an edit fills the last empty cell.
    pub on_complete: Option<CodeCompleteCallback>,

    /// Called on Enter with the joined code.
    pub on_submit: Option<CodeSubmitCallback>,

    /// Called on Escape.
    pub on_cancel: Option<CodeCancelCallback>,

    /// Called when focus enters any cell from outside the input.
    pub on_focus: Option<FocusCallback>,

    /// Called when focus leaves the input entirely.
    pub on_blur: Option<BlurCallback>,
}

impl OtpInputProps {
    /// Create props for a code of the given length.
    ///
    /// This is the recommended way to create OtpInputProps since the
    /// length shapes the code signal.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            code: signal(Code::empty(length)),
            label: None,
            mask_char: None,
            placeholder: None,
            border: BorderStyle::Rounded,
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            border_color: Rgba::GRAY,
            focused_border_color: Rgba::CYAN,
            auto_focus: false,
            on_change: None,
            on_complete: None,
            on_submit: None,
            on_cancel: None,
            on_focus: None,
            on_blur: None,
        }
    }
}

// =============================================================================
// Widget Registry
// =============================================================================

/// Interior cell width (one digit plus a space each side).
const CELL_INNER_WIDTH: u16 = 3;

/// Columns between neighboring cell boxes.
const CELL_GAP: u16 = 1;

/// Everything build_frame needs to draw one mounted input.
struct WidgetRecord {
    first_cell: usize,
    length: usize,
    code: Signal<Code>,
    label: Option<String>,
    mask_char: Option<char>,
    placeholder: Option<char>,
    border: BorderStyle,
    fg: Rgba,
    bg: Rgba,
    border_color: Rgba,
    focused_border_color: Rgba,
}

thread_local! {
    // Mounted inputs in creation order, stacked top to bottom.
    static WIDGETS: RefCell<Vec<Option<WidgetRecord>>> = const { RefCell::new(Vec::new()) };
}

fn register_widget(record: WidgetRecord) -> usize {
    WIDGETS.with(|widgets| {
        let mut widgets = widgets.borrow_mut();
        if let Some(slot) = widgets.iter().position(|w| w.is_none()) {
            widgets[slot] = Some(record);
            slot
        } else {
            widgets.push(Some(record));
            widgets.len() - 1
        }
    })
}

/// Remove all registered widgets (test helper).
pub fn reset_widgets() {
    WIDGETS.with(|widgets| widgets.borrow_mut().clear());
}

impl WidgetRecord {
    fn cell_width(&self) -> u16 {
        CELL_INNER_WIDTH + 2 * self.border.size()
    }

    fn cell_height(&self) -> u16 {
        1 + 2 * self.border.size()
    }

    fn frame_width(&self) -> u16 {
        let boxes = if self.length == 0 {
            0
        } else {
            self.length as u16 * self.cell_width() + (self.length as u16 - 1) * CELL_GAP
        };
        let label = self.label.as_deref().map_or(0, |l| string_width(l) as u16);
        boxes.max(label)
    }

    fn frame_height(&self) -> u16 {
        let label = u16::from(self.label.is_some());
        let boxes = if self.length == 0 { 0 } else { self.cell_height() };
        label + boxes
    }

    fn draw(&self, frame: &mut FrameBuffer, top: u16) {
        let mut y = top;

        if let Some(ref label) = self.label {
            frame.draw_text(0, y, label, self.fg, None, Attr::NONE);
            y += 1;
        }

        if self.length == 0 {
            return;
        }

        let code = self.code.get();
        let focused = focus::get_focused_index();
        let border_size = self.border.size();
        let cell_width = self.cell_width();
        let cell_height = self.cell_height();

        for cell in 0..self.length {
            let x = cell as u16 * (cell_width + CELL_GAP);
            let is_focused = focused >= 0 && focused as usize == self.first_cell + cell;

            let border_color = if is_focused {
                self.focused_border_color
            } else {
                self.border_color
            };

            frame.fill_rect(x, y, cell_width, cell_height, self.bg);
            frame.draw_border(x, y, cell_width, cell_height, self.border, border_color, Some(self.bg));

            let glyph_x = x + border_size + 1;
            let glyph_y = y + border_size;

            match code.digit(cell) {
                Some(digit) => {
                    let shown = self.mask_char.unwrap_or(digit);
                    let attrs = if is_focused { Attr::BOLD } else { Attr::NONE };
                    frame.draw_char(glyph_x, glyph_y, shown, self.fg, None, attrs);
                }
                None => {
                    if let Some(placeholder) = self.placeholder {
                        frame.draw_char(glyph_x, glyph_y, placeholder, self.fg, None, Attr::DIM);
                    }
                }
            }
        }
    }
}

// =============================================================================
// Frame Building
// =============================================================================

/// Compose all mounted inputs into one frame.
///
/// Reads the code and focus signals, so calling this inside an effect
/// re-renders on every edit and focus move.
pub fn build_frame() -> FrameBuffer {
    WIDGETS.with(|widgets| {
        let widgets = widgets.borrow();
        let live: Vec<&WidgetRecord> = widgets.iter().flatten().collect();

        let mut width = 0u16;
        let mut height = 0u16;
        for record in &live {
            width = width.max(record.frame_width());
            height += record.frame_height();
        }

        let mut frame = FrameBuffer::new(width, height);
        let mut y = 0u16;
        for record in &live {
            record.draw(&mut frame, y);
            y += record.frame_height();
        }
        frame
    })
}

// =============================================================================
// Step Application
// =============================================================================

/// Commit an edit: update the signal, report, then move focus.
fn apply_step(
    first_cell: usize,
    code: &Signal<Code>,
    step: &controller::Step,
    on_change: &Option<CodeChangeCallback>,
    on_complete: &Option<CodeCompleteCallback>,
) {
    code.set(step.code.clone());

    if let Some(cb) = on_change {
        cb(&step.report);
    }

    if let Some(FocusCommand::MoveTo(cell)) = step.focus {
        focus::focus(first_cell + cell);
    }

    if step.code.is_complete() {
        if let Some(cb) = on_complete {
            cb(&step.report);
        }
    }
}

// =============================================================================
// Component
// =============================================================================

/// Create an OTP input. Returns a cleanup function that releases its
/// cells, handlers, and registry slot.
pub fn otp_input(props: OtpInputProps) -> Cleanup {
    let length = props.length;

    // Mount owns the signal shape: a mismatched code is reset
    if props.code.get().len() != length {
        props.code.set(Code::empty(length));
    }

    // 1. ALLOCATE FOCUS CELLS
    let first_cell = focus::allocate_cells(length);

    // 2. REGISTER FOR RENDERING
    let slot = register_widget(WidgetRecord {
        first_cell,
        length,
        code: props.code.clone(),
        label: props.label.clone(),
        mask_char: props.mask_char,
        placeholder: props.placeholder,
        border: props.border,
        fg: props.fg,
        bg: props.bg,
        border_color: props.border_color,
        focused_border_color: props.focused_border_color,
    });

    // ==========================================================================
    // KEYBOARD HANDLERS - one per cell
    // ==========================================================================

    let mut key_cleanups: Vec<Box<dyn FnOnce()>> = Vec::with_capacity(length);

    for cell_pos in 0..length {
        let cell_index = first_cell + cell_pos;

        let code_for_key = props.code.clone();
        let on_change = props.on_change.clone();
        let on_complete = props.on_complete.clone();
        let on_submit = props.on_submit.clone();
        let on_cancel = props.on_cancel.clone();

        let key_cleanup = keyboard::on_focused(cell_index, move |event| {
            // Ctrl shortcuts belong to the application
            if event.modifiers.ctrl {
                return false;
            }

            match event.key.as_str() {
                "Backspace" => {
                    if let Some(step) =
                        controller::key_down(&code_for_key.get(), cell_pos, "Backspace")
                    {
                        apply_step(first_cell, &code_for_key, &step, &on_change, &on_complete);
                    }
                    true
                }
                "Enter" => {
                    if let Some(ref cb) = on_submit {
                        cb(&code_for_key.get().joined());
                        true
                    } else {
                        false
                    }
                }
                "Escape" => {
                    if let Some(ref cb) = on_cancel {
                        cb();
                        true
                    } else {
                        false
                    }
                }
                "ArrowLeft" => {
                    if cell_pos > 0 {
                        focus::focus(first_cell + cell_pos - 1);
                    }
                    true
                }
                "ArrowRight" => {
                    if cell_pos + 1 < length {
                        focus::focus(first_cell + cell_pos + 1);
                    }
                    true
                }
                "Home" => {
                    focus::focus(first_cell);
                    true
                }
                "End" => {
                    focus::focus(first_cell + length - 1);
                    true
                }
                "Paste" => {
                    let text = event.raw.clone().unwrap_or_default();
                    if let Some(step) = controller::cell_change(&code_for_key.get(), cell_pos, &text)
                    {
                        apply_step(first_cell, &code_for_key, &step, &on_change, &on_complete);
                    }
                    true
                }
                // Printable keys are owned by the input, digit or not
                key if key.len() == 1 && !event.modifiers.alt && !event.modifiers.meta => {
                    if let Some(step) = controller::cell_change(&code_for_key.get(), cell_pos, key) {
                        apply_step(first_cell, &code_for_key, &step, &on_change, &on_complete);
                    }
                    true
                }
                _ => false,
            }
        });
        key_cleanups.push(Box::new(key_cleanup));
    }

    // ==========================================================================
    // FOCUS ENTER/LEAVE
    // ==========================================================================

    // Cell-to-cell moves inside the row stay silent; only crossing the
    // input boundary fires the callbacks.
    let stop_focus_effect: Option<Box<dyn FnOnce()>> =
        if props.on_focus.is_some() || props.on_blur.is_some() {
            let on_focus = props.on_focus.clone();
            let on_blur = props.on_blur.clone();
            let inside = std::cell::Cell::new(false);

            Some(Box::new(effect(move || {
                let focused = focus::get_focused_index();
                let now_inside = focused >= 0
                    && (focused as usize) >= first_cell
                    && (focused as usize) < first_cell + length;

                if now_inside != inside.get() {
                    inside.set(now_inside);
                    if now_inside {
                        if let Some(ref cb) = on_focus {
                            cb();
                        }
                    } else if let Some(ref cb) = on_blur {
                        cb();
                    }
                }
            })))
        } else {
            None
        };

    // ==========================================================================
    // AUTO FOCUS
    // ==========================================================================

    if props.auto_focus {
        focus::focus(first_cell);
    }

    // ==========================================================================
    // CLEANUP
    // ==========================================================================

    Box::new(move || {
        for cleanup in key_cleanups {
            cleanup();
        }

        if let Some(stop) = stop_focus_effect {
            stop();
        }

        focus::release_cells(first_cell, length);

        WIDGETS.with(|widgets| {
            let mut widgets = widgets.borrow_mut();
            if let Some(entry) = widgets.get_mut(slot) {
                *entry = None;
            }
        });
    })
}

// =============================================================================
// Tests
// =============================================================================
