//! Inline renderer for normal terminal mode.
//!
//! The frame is written below the shell prompt in the normal buffer,
//! not on the alternate screen. Each render:
//!
//! - Erases the previously written rows in place
//! - Rewrites the whole frame in a single flush
//! - Respects terminal scrollback
//!
//! Frames that are identical to the previous one are skipped entirely,
//! so idle ticks cost nothing.

use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use super::output::{OutputBuffer, StatefulCellRenderer};

/// Inline renderer for normal terminal mode.
///
/// Renders content inline (not fullscreen). Each render clears
/// the previous content and writes new content.
pub struct InlineRenderer {
    output: OutputBuffer,
    cell_renderer: StatefulCellRenderer,
    previous_height: u16,
    previous: Option<FrameBuffer>,
}

impl InlineRenderer {
    /// Create a new inline renderer.
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            cell_renderer: StatefulCellRenderer::new(),
            previous_height: 0,
            previous: None,
        }
    }

    /// Render a frame inline to stdout.
    ///
    /// Erases previous content and writes the new frame. A frame equal
    /// to the previous one is a no-op.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        if self.previous.as_ref() == Some(buffer) {
            return Ok(());
        }
        self.compose(buffer)?;
        self.output.flush_stdout()
    }

    /// Render a frame to a specific writer instead of stdout.
    pub fn render_to<W: Write>(&mut self, buffer: &FrameBuffer, writer: &mut W) -> io::Result<()> {
        if self.previous.as_ref() == Some(buffer) {
            return Ok(());
        }
        self.compose(buffer)?;
        self.output.flush_to(writer)
    }

    /// Build the escape stream for a frame into the internal buffer.
    fn compose(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        // Begin synchronized output
        ansi::begin_sync(&mut self.output)?;

        // Erase previous content by moving up and clearing
        self.erase_previous()?;

        // Reset renderer state
        self.cell_renderer.reset();

        // Render all cells line by line
        let width = buffer.width();
        let height = buffer.height();

        for y in 0..height {
            for x in 0..width {
                if let Some(cell) = buffer.get(x, y) {
                    self.cell_renderer.render_cell(&mut self.output, cell);
                }
            }
            // Raw mode: LF alone does not return the carriage
            if y < height - 1 {
                self.output.write_str("\r\n");
            }
        }

        // Reset attributes at end
        ansi::reset(&mut self.output)?;

        // End synchronized output
        ansi::end_sync(&mut self.output)?;

        // Track the frame for the next erase and the unchanged check
        self.previous_height = height;
        self.previous = Some(buffer.clone());

        Ok(())
    }

    /// Move back to the frame's first row and erase downward.
    ///
    /// The cursor rests at the last rendered row, so the move is one
    /// short of the frame height.
    fn erase_previous(&mut self) -> io::Result<()> {
        if self.previous_height > 0 {
            ansi::cursor_up(&mut self.output, self.previous_height - 1)?;
            ansi::cursor_column_zero(&mut self.output)?;
            ansi::erase_down(&mut self.output)?;
        }
        Ok(())
    }

    /// Clear any rendered content and reset state.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.previous_height > 0 {
            self.erase_previous()?;
            self.output.flush_stdout()?;
            self.previous_height = 0;
        }
        self.previous = None;
        Ok(())
    }

    /// Get the height of the previously rendered content.
    pub fn previous_height(&self) -> u16 {
        self.previous_height
    }

    /// Reset the renderer state without touching the terminal.
    pub fn reset(&mut self) {
        self.previous_height = 0;
        self.previous = None;
        self.cell_renderer.reset();
    }
}

impl Default for InlineRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
