//! FrameBuffer and drawing primitives.
//!
//! The FrameBuffer is a 2D grid of Cells that represents what should be
//! displayed for the mounted inputs. All drawing operations work on this
//! buffer before it is written to the terminal in one pass.
//!
//! # Design Decisions
//!
//! - **Flat storage**: Uses `Vec<Cell>` with row-major indexing for cache efficiency.
//! - **Alpha blending**: Transparent backgrounds blend with existing cells.
//! - **Wide characters**: Emoji and CJK characters use continuation markers.

use unicode_width::UnicodeWidthChar;

use crate::types::{Attr, BorderStyle, Cell, Rgba};

// =============================================================================
// FrameBuffer
// =============================================================================

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    /// Get buffer width.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get buffer height.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Convert (x, y) to flat index.
    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Check if coordinates are in bounds.
    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Get a cell reference (returns None if out of bounds).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get a mutable cell reference (returns None if out of bounds).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell.
    ///
    /// Returns true if the cell was set.
    pub fn set_cell(&mut self, x: u16, y: u16, char: u32, fg: Rgba, bg: Rgba, attrs: Attr) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }

        let idx = self.index(x, y);
        let cell = &mut self.cells[idx];

        // Alpha blend background if not opaque
        let blended_bg = if bg.is_opaque() || bg.is_terminal_default() || bg.is_ansi() {
            bg
        } else {
            Rgba::blend(bg, cell.bg)
        };

        cell.char = char;
        cell.fg = fg;
        cell.bg = blended_bg;
        cell.attrs = attrs;

        true
    }

    /// Fill a rectangle with a background color, blanking its content.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, bg: Rgba) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);

        if x2 <= x || y2 <= y {
            return;
        }

        // Fast path for opaque fill
        let is_opaque = bg.is_opaque() || bg.is_terminal_default() || bg.is_ansi();

        for row in y..y2 {
            let row_start = self.index(x, row);
            let row_end = self.index(x2, row);
            for cell in &mut self.cells[row_start..row_end] {
                if is_opaque {
                    cell.bg = bg;
                } else {
                    cell.bg = Rgba::blend(bg, cell.bg);
                }
                cell.char = b' ' as u32;
                cell.attrs = Attr::NONE;
            }
        }
    }

    /// Draw a single character.
    pub fn draw_char(
        &mut self,
        x: u16,
        y: u16,
        char: char,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
    ) -> bool {
        let bg = bg.unwrap_or(Rgba::TRANSPARENT);
        self.set_cell(x, y, char as u32, fg, bg, attrs)
    }

    /// Draw text at a position.
    ///
    /// Returns the number of cells used (handles wide characters).
    pub fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
    ) -> u16 {
        let bg = bg.unwrap_or(Rgba::TRANSPARENT);
        let mut col = x;

        for ch in text.chars() {
            if col >= self.width {
                break;
            }

            let char_width = char_width(ch);

            if char_width == 0 {
                continue; // Skip zero-width characters
            }

            // Draw main character
            if self.set_cell(col, y, ch as u32, fg, bg, attrs) {
                // Handle wide characters (emoji, CJK)
                if char_width == 2 && col + 1 < self.width {
                    // Mark next cell as continuation (char = 0)
                    if let Some(next) = self.get_mut(col + 1, y) {
                        next.char = 0;
                        next.fg = fg;
                        if !bg.is_transparent() {
                            next.bg = Rgba::blend(bg, next.bg);
                        }
                        next.attrs = attrs;
                    }
                }
            }

            col += char_width as u16;
        }

        col.saturating_sub(x)
    }

    /// Draw a border around a rectangle.
    pub fn draw_border(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        style: BorderStyle,
        color: Rgba,
        bg: Option<Rgba>,
    ) {
        if width < 2 || height < 2 || style == BorderStyle::None {
            return;
        }

        let (horiz, vert, tl, tr, br, bl) = style.chars();
        let bg = bg.unwrap_or(Rgba::TRANSPARENT);

        let x2 = x + width - 1;
        let y2 = y + height - 1;

        // Draw corners
        self.draw_char(x, y, first_char(tl), color, Some(bg), Attr::NONE);
        self.draw_char(x2, y, first_char(tr), color, Some(bg), Attr::NONE);
        self.draw_char(x2, y2, first_char(br), color, Some(bg), Attr::NONE);
        self.draw_char(x, y2, first_char(bl), color, Some(bg), Attr::NONE);

        let horiz_char = first_char(horiz);
        let vert_char = first_char(vert);

        // Draw horizontal edges
        for col in (x + 1)..x2 {
            self.draw_char(col, y, horiz_char, color, Some(bg), Attr::NONE);
            self.draw_char(col, y2, horiz_char, color, Some(bg), Attr::NONE);
        }

        // Draw vertical edges
        for row in (y + 1)..y2 {
            self.draw_char(x, row, vert_char, color, Some(bg), Attr::NONE);
            self.draw_char(x2, row, vert_char, color, Some(bg), Attr::NONE);
        }
    }
}

/// First character of a border glyph literal.
#[inline]
fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}

// =============================================================================
// Character Width
// =============================================================================

/// Display width of a character in terminal cells.
///
/// - `0` for control characters and zero-width characters
/// - `1` for normal-width characters
/// - `2` for wide characters (CJK ideographs, most emoji)
#[inline]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// =============================================================================
// Tests
// =============================================================================
