//! Code Model - Immutable multi-cell code value
//!
//! A `Code` is a fixed-length row of single-digit cells, each either empty or
//! holding one ASCII digit. Updates never mutate in place: `with_digit` and
//! `with_cleared` return a fresh copy, so every transition step gets its own
//! snapshot of the value.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::Code;
//!
//! let code = Code::empty(6).with_digit(0, '4').with_digit(1, '2');
//! assert_eq!(code.joined(), "42");
//! assert!(!code.is_complete());
//! ```

// =============================================================================
// CODE
// =============================================================================

/// Fixed-length row of single-digit cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    cells: Vec<Option<char>>,
}

impl Code {
    /// Create a code with `len` empty cells.
    pub fn empty(len: usize) -> Self {
        Self {
            cells: vec![None; len],
        }
    }

    /// Create a code pre-filled from `digits`, starting at cell 0.
    /// Non-digit characters are skipped and extra digits are dropped.
    pub fn from_digits(len: usize, digits: &str) -> Self {
        let mut code = Self::empty(len);
        let filled = digits.chars().filter(|c| c.is_ascii_digit()).take(len);
        for (i, digit) in filled.enumerate() {
            code.cells[i] = Some(digit);
        }
        code
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the code has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Digit at `index`, or None when the cell is empty or out of range.
    pub fn digit(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    /// Copy with `digit` written into cell `index`.
    /// Out of range indices return an unchanged copy.
    pub fn with_digit(&self, index: usize, digit: char) -> Self {
        let mut next = self.clone();
        if let Some(cell) = next.cells.get_mut(index) {
            *cell = Some(digit);
        }
        next
    }

    /// Copy with cell `index` cleared.
    pub fn with_cleared(&self, index: usize) -> Self {
        let mut next = self.clone();
        if let Some(cell) = next.cells.get_mut(index) {
            *cell = None;
        }
        next
    }

    /// Digits joined in cell order. Empty cells contribute nothing, so
    /// `[1, _, 3]` joins to "13".
    pub fn joined(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// True when every cell holds a digit.
    pub fn is_complete(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| c.is_some())
    }
}

// =============================================================================
// TESTS
// =============================================================================
