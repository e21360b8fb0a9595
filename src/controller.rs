//! Transitions - Pure state transitions for the code input
//!
//! Every user action on a cell becomes a pure function call: current code in,
//! `Step` out. A step carries the next code snapshot, the joined string to
//! report, and an optional focus command for the host to execute. The
//! transitions never touch focus or terminal state themselves, so they can be
//! tested without any runtime.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::{cell_change, Code, FocusCommand};
//!
//! let code = Code::empty(6);
//! let step = cell_change(&code, 0, "4").unwrap();
//! assert_eq!(step.report, "4");
//! assert_eq!(step.focus, Some(FocusCommand::MoveTo(1)));
//! ```

use crate::code::Code;

// =============================================================================
// STEP
// =============================================================================

/// Focus movement requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCommand {
    /// Move focus to the given cell.
    MoveTo(usize),
}

/// Result of one applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Next code snapshot.
    pub code: Code,
    /// Focus movement for the host to execute, if any.
    pub focus: Option<FocusCommand>,
    /// Joined code to report to observers.
    pub report: String,
}

// =============================================================================
// SANITIZING
// =============================================================================

/// Strip everything but ASCII digits from raw input.
pub fn sanitize_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Apply raw text input to the cell at `index`.
///
/// The input is sanitized to digits first and only the first digit is kept,
/// so a multi-character paste fills exactly one cell. Returns None when the
/// input carries no digit or the index is out of range: nothing changed,
/// nothing to report.
pub fn cell_change(code: &Code, index: usize, input: &str) -> Option<Step> {
    if index >= code.len() {
        return None;
    }

    let digit = sanitize_digits(input).chars().next()?;
    let next = code.with_digit(index, digit);
    let report = next.joined();

    // Advance focus unless this is the last cell
    let focus = if index + 1 < code.len() {
        Some(FocusCommand::MoveTo(index + 1))
    } else {
        None
    };

    Some(Step {
        code: next,
        focus,
        report,
    })
}

/// Apply a key press to the cell at `index`.
///
/// Only "Backspace" transitions state. On an empty cell it clears the cell
/// before it and asks for focus there; on a filled cell it clears in place
/// and leaves focus alone. Backspace always yields a step, even when nothing
/// changed (empty first cell), so observers stay in sync.
pub fn key_down(code: &Code, index: usize, key: &str) -> Option<Step> {
    if index >= code.len() || key != "Backspace" {
        return None;
    }

    if code.digit(index).is_none() && index > 0 {
        let next = code.with_cleared(index - 1);
        let report = next.joined();
        Some(Step {
            code: next,
            focus: Some(FocusCommand::MoveTo(index - 1)),
            report,
        })
    } else {
        let next = code.with_cleared(index);
        let report = next.joined();
        Some(Step {
            code: next,
            focus: None,
            report,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_digits() {
        assert_eq!(sanitize_digits("123"), "123");
        assert_eq!(sanitize_digits("a1b2"), "12");
        assert_eq!(sanitize_digits("!@#"), "");
        // Only ASCII digits pass
        assert_eq!(sanitize_digits("١٢٣"), "");
    }

    #[test]
    fn test_digit_advances_focus() {
        let code = Code::empty(6);
        let step = cell_change(&code, 0, "9").unwrap();

        assert_eq!(step.code.digit(0), Some('9'));
        assert_eq!(step.focus, Some(FocusCommand::MoveTo(1)));
        assert_eq!(step.report, "9");
    }

    #[test]
    fn test_last_cell_keeps_focus() {
        let code = Code::from_digits(6, "12345");
        let step = cell_change(&code, 5, "6").unwrap();

        assert_eq!(step.focus, None);
        assert_eq!(step.report, "123456");
        assert!(step.code.is_complete());
    }

    #[test]
    fn test_overwrite_filled_cell() {
        let code = Code::from_digits(6, "123456");
        let step = cell_change(&code, 2, "9").unwrap();

        assert_eq!(step.code.digit(2), Some('9'));
        assert_eq!(step.report, "129456");
        assert_eq!(step.focus, Some(FocusCommand::MoveTo(3)));
    }

    #[test]
    fn test_paste_keeps_first_digit() {
        let code = Code::empty(6);
        let step = cell_change(&code, 2, "45").unwrap();

        assert_eq!(step.code.digit(2), Some('4'));
        assert_eq!(step.code.digit(3), None);
        assert_eq!(step.report, "4");
        assert_eq!(step.focus, Some(FocusCommand::MoveTo(3)));
    }

    #[test]
    fn test_mixed_input_keeps_first_digit() {
        let code = Code::empty(4);
        let step = cell_change(&code, 0, "a7b9").unwrap();
        assert_eq!(step.code.digit(0), Some('7'));
    }

    #[test]
    fn test_non_digit_input_is_a_no_op() {
        let code = Code::empty(6);
        assert_eq!(cell_change(&code, 0, "abc"), None);
        assert_eq!(cell_change(&code, 0, ""), None);
        assert_eq!(cell_change(&code, 0, " "), None);
    }

    #[test]
    fn test_out_of_range_index() {
        let code = Code::empty(4);
        assert_eq!(cell_change(&code, 4, "1"), None);
        assert_eq!(key_down(&code, 7, "Backspace"), None);

        let none = Code::empty(0);
        assert_eq!(cell_change(&none, 0, "1"), None);
        assert_eq!(key_down(&none, 0, "Backspace"), None);
    }

    #[test]
    fn test_backspace_clears_in_place() {
        let code = Code::from_digits(6, "123");
        let step = key_down(&code, 2, "Backspace").unwrap();

        assert_eq!(step.code.digit(2), None);
        assert_eq!(step.focus, None);
        assert_eq!(step.report, "12");
    }

    #[test]
    fn test_backspace_moves_back_through_empty_cell() {
        // Cells 0 and 1 filled, focus sits on the empty cell 2
        let code = Code::from_digits(6, "12");
        let step = key_down(&code, 2, "Backspace").unwrap();

        assert_eq!(step.code.digit(1), None);
        assert_eq!(step.code.digit(0), Some('1'));
        assert_eq!(step.focus, Some(FocusCommand::MoveTo(1)));
        assert_eq!(step.report, "1");
    }

    #[test]
    fn test_backspace_on_empty_first_cell_still_reports() {
        let code = Code::empty(6);
        let step = key_down(&code, 0, "Backspace").unwrap();

        assert_eq!(step.code, code);
        assert_eq!(step.focus, None);
        assert_eq!(step.report, "");
    }

    #[test]
    fn test_other_keys_ignored() {
        let code = Code::from_digits(6, "123");
        assert_eq!(key_down(&code, 2, "Delete"), None);
        assert_eq!(key_down(&code, 2, "Enter"), None);
        assert_eq!(key_down(&code, 2, "ArrowLeft"), None);
    }

    #[test]
    fn test_source_code_untouched() {
        let code = Code::from_digits(6, "123");
        let _ = cell_change(&code, 3, "4");
        let _ = key_down(&code, 2, "Backspace");
        assert_eq!(code.joined(), "123");
    }

    #[test]
    fn test_typing_full_code() {
        let mut code = Code::empty(6);
        let mut focused = 0usize;
        let mut last_report = String::new();

        for digit in ["9", "8", "7", "6", "5", "4"] {
            let step = cell_change(&code, focused, digit).unwrap();
            code = step.code;
            last_report = step.report;
            if let Some(FocusCommand::MoveTo(next)) = step.focus {
                focused = next;
            }
        }

        assert_eq!(last_report, "987654");
        assert_eq!(focused, 5);
        assert!(code.is_complete());
    }

    #[test]
    fn test_backspace_walks_code_back_to_empty() {
        let mut code = Code::from_digits(4, "1234");
        let mut focused = 3usize;

        loop {
            let step = key_down(&code, focused, "Backspace").unwrap();
            code = step.code;
            if let Some(FocusCommand::MoveTo(next)) = step.focus {
                focused = next;
            }
            if code.filled() == 0 && focused == 0 {
                break;
            }
        }

        assert_eq!(code.joined(), "");
    }
}
