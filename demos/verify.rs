//! Verify - two-step code entry demo.
//!
//! A 6-digit verification code followed by a masked 4-digit PIN:
//! - Typing a digit fills the cell and advances
//! - Backspace steps back through empty cells
//! - Paste drops its first digit into the focused cell
//! - Tab/Shift+Tab and arrows move between cells
//! - Enter submits the PIN as-is, Escape or Ctrl+C aborts
//!
//! Run with: cargo run --example verify

use std::cell::Cell;
use std::rc::Rc;

use spark_otp::{focus, mount, otp_input, pipeline, unmount, BorderStyle, OtpInputProps, Rgba};

fn main() {
    println!("Two-step sign-in");
    println!("Enter the texted code, then your PIN. Ctrl+C quits.");
    println!();

    // Accent for whichever cell owns the keyboard
    let accent = Rgba::from_hex("#5fd7ff").unwrap_or(Rgba::CYAN);

    let done = Rc::new(Cell::new(false));
    let cancelled = Rc::new(Cell::new(false));

    let abort = {
        let done = done.clone();
        let cancelled = cancelled.clone();
        Rc::new(move || {
            cancelled.set(true);
            done.set(true);
        })
    };

    // Verification code: 6 digits, visible
    let code_props = OtpInputProps {
        label: Some("Verification code".to_string()),
        placeholder: Some('·'),
        focused_border_color: accent,
        auto_focus: true,
        on_complete: Some(Rc::new(|_code| {
            // Jump to the PIN row (its cells follow the code cells)
            focus(6);
        })),
        on_cancel: Some(abort.clone()),
        ..OtpInputProps::new(6)
    };
    let code_value = code_props.code.clone();
    let _cleanup_code = otp_input(code_props);

    // PIN: 4 digits, masked
    let pin_props = OtpInputProps {
        label: Some("PIN".to_string()),
        mask_char: Some('•'),
        border: BorderStyle::Single,
        focused_border_color: accent,
        on_complete: Some(Rc::new({
            let done = done.clone();
            move |_pin| done.set(true)
        })),
        on_submit: Some(Rc::new({
            let done = done.clone();
            move |_pin| done.set(true)
        })),
        on_cancel: Some(abort.clone()),
        ..OtpInputProps::new(4)
    };
    let pin_value = pin_props.code.clone();
    let _cleanup_pin = otp_input(pin_props);

    // Mount and tick until the PIN is in
    match mount() {
        Ok(handle) => {
            loop {
                if done.get() {
                    break;
                }
                match pipeline::tick(&handle) {
                    Ok(true) => {}
                    Ok(false) => {
                        // Ctrl+C
                        cancelled.set(true);
                        break;
                    }
                    Err(_) => break,
                }
            }
            unmount(handle);
        }
        Err(e) => {
            eprintln!("Failed to mount: {}", e);
            return;
        }
    }

    if cancelled.get() {
        println!("Cancelled.");
    } else {
        println!("Code: {}", code_value.get().joined());
        println!("PIN:  {} digits accepted", pin_value.get().filled());
    }
}
