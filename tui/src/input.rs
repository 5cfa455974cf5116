//! Single-line text field editing.
//!
//! `InputLine` backs the baud rate and value fields of the form: a text
//! buffer with cursor movement and the usual editing operations.

/// A line editor with cursor movement.
///
/// The buffer is maintained as a `Vec<char>` so that cursor-based
/// operations work correctly with multi-byte characters.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    buffer: Vec<char>,
    cursor: usize,
}


impl InputLine {
    /// Create a new empty input line.
    pub fn new() -> Self {
        InputLine {
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    /// Create an input line holding `text`, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        let mut input = InputLine::new();
        input.set_text(text);
        input
    }

    /// Replace the contents and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    /// Delete the character at the cursor position (forward delete).
    pub fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Delete the word before the cursor (Ctrl-W).
    pub fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let end = self.cursor;
        while self.cursor > 0 && !self.buffer[self.cursor - 1].is_alphanumeric() {
            self.cursor -= 1;
        }
        while self.cursor > 0 && self.buffer[self.cursor - 1].is_alphanumeric() {
            self.cursor -= 1;
        }
        self.buffer.drain(self.cursor..end);
    }

    /// Clear the entire buffer and reset the cursor.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Return the current buffer contents as a String.
    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The slice of text visible in a field `width` columns wide, and the
    /// cursor column within it.
    ///
    /// When the text is wider than the field, the window scrolls so the
    /// cursor stays visible.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        // One column is reserved for the cursor past the last character.
        let start = if self.cursor >= width {
            self.cursor + 1 - width
        } else {
            0
        };
        let end = (start + width).min(self.buffer.len());
        let shown: String = self.buffer[start..end].iter().collect();
        (shown, self.cursor - start)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
