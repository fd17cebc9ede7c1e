//! Single-line text input shared by the prompt, the palette and forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable line with a cursor measured in characters.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input state holding `value`, cursor at the end.
    pub fn with_initial(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Replace the contents, moving the cursor to the end.
    pub fn set(&mut self, value: &str) {
        *self = Self::with_initial(value);
    }

    /// Split the buffer around the cursor for rendering: text before the
    /// cursor, the character under it, and the rest.
    pub fn split_at_cursor(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_index(self.cursor);
        let (before, rest) = self.buffer.split_at(at);
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) => (before, Some(c), chars.as_str()),
            None => (before, None, ""),
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Submit(self.buffer.clone()),

            (KeyCode::Esc, _) => InputResult::Cancel,

            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                    InputResult::Changed
                } else {
                    InputResult::Continue
                }
            }

            (KeyCode::Delete, _) => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                    InputResult::Changed
                } else {
                    InputResult::Continue
                }
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                InputResult::Continue
            }

            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                InputResult::Continue
            }

            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputResult::Continue
            }

            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_len();
                InputResult::Continue
            }

            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputResult::Changed
            }

            (KeyCode::Char('k'), KeyModifiers::CONTROL) => {
                let at = self.byte_index(self.cursor);
                self.buffer.truncate(at);
                InputResult::Changed
            }

            // Delete word before cursor
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                if self.cursor == 0 {
                    return InputResult::Continue;
                }
                let end = self.byte_index(self.cursor);
                let before = self.buffer[..end].trim_end();
                let start = before
                    .rfind(char::is_whitespace)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.buffer.replace_range(start..end, "");
                self.cursor = self.buffer[..start].chars().count();
                InputResult::Changed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                InputResult::Changed
            }

            _ => InputResult::Continue,
        }
    }
}

/// Result of handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Nothing to report; the cursor may have moved.
    Continue,
    /// The buffer contents changed.
    Changed,
    /// User cancelled the input.
    Cancel,
    /// User submitted the input with this value.
    Submit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_a_command() {
        let mut input = InputState::new();
        for c in "e events".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(input.buffer(), "e events");
        assert_eq!(input.cursor(), 8);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputState::with_initial("héllo");
        for _ in 0..3 {
            input.handle_key(key(KeyCode::Left));
        }
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.buffer(), "hllo");
        assert_eq!(input.split_at_cursor(), ("h", Some('l'), "lo"));
    }

    #[test]
    fn test_ctrl_w_deletes_previous_word() {
        let mut input = InputState::with_initial("rsvp maybe ");
        assert_eq!(input.handle_key(ctrl('w')), InputResult::Changed);
        assert_eq!(input.buffer(), "rsvp ");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_backspace_on_empty_is_not_a_change() {
        let mut input = InputState::new();
        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputResult::Continue);
    }

    #[test]
    fn test_enter_submits_and_escape_cancels() {
        let mut filter = InputState::with_initial("quarterly");
        assert_eq!(
            filter.handle_key(key(KeyCode::Enter)),
            InputResult::Submit("quarterly".into())
        );
        assert_eq!(filter.handle_key(key(KeyCode::Esc)), InputResult::Cancel);
    }
}
