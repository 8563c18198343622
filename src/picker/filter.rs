//! Single-line text input backing the picker's filter mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of processing a key in the filter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKeyResult {
    /// No visual change needed
    Continue,
    /// Query text changed -- re-filter and reset selection
    QueryChanged,
}

/// Text buffer with a cursor, counted in characters.
#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    text: String,
    cursor: usize,
}

impl FilterInput {
    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text and put the cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    /// Clear text and cursor
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Handle an editing key. Keys the input does not understand are ignored.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterKeyResult {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
                FilterKeyResult::QueryChanged
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                FilterKeyResult::Continue
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                FilterKeyResult::Continue
            }
            KeyCode::Home => {
                self.cursor = 0;
                FilterKeyResult::Continue
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                FilterKeyResult::Continue
            }
            _ => FilterKeyResult::Continue,
        }
    }
}

/// Case-insensitive substring match used by the filter.
pub fn label_matches(label: &str, query: &str) -> bool {
    label.to_lowercase().contains(&query.to_lowercase())
}
