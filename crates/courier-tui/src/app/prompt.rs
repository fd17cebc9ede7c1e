//! Command and filter prompt line.

use crossterm::event::KeyEvent;

use super::input::{InputResult, InputState};

/// What the prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptKind {
    #[default]
    Command,
    Filter,
}

impl PromptKind {
    /// Prefix drawn before the input.
    pub fn symbol(self) -> char {
        match self {
            Self::Command => ':',
            Self::Filter => '/',
        }
    }
}

/// Result of a key press in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Continue,
    /// The prompt closed with this text. Escape commits an empty string.
    Commit(String),
}

/// Single-line prompt for `:` commands and `/` filters.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    kind: PromptKind,
    input: InputState,
}

impl Prompt {
    /// Start a fresh prompt of the given kind.
    pub fn open(&mut self, kind: PromptKind) {
        self.kind = kind;
        self.input.clear();
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptResult {
        let was_empty = self.input.is_empty();
        match self.input.handle_key(key) {
            InputResult::Submit(text) => {
                self.input.clear();
                PromptResult::Commit(text.trim().to_string())
            }
            InputResult::Cancel => {
                self.input.clear();
                PromptResult::Commit(String::new())
            }
            // Backspace on an empty line closes the prompt
            InputResult::Continue
                if was_empty && key.code == crossterm::event::KeyCode::Backspace =>
            {
                PromptResult::Commit(String::new())
            }
            InputResult::Continue | InputResult::Changed => PromptResult::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_commits_trimmed_text() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::Command);
        for c in " m ".chars() {
            prompt.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(prompt.handle_key(key(KeyCode::Enter)), PromptResult::Commit("m".into()));
        assert!(prompt.input().is_empty());
    }

    #[test]
    fn test_escape_commits_empty() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::Filter);
        prompt.handle_key(key(KeyCode::Char('x')));
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PromptResult::Commit(String::new()));
    }

    #[test]
    fn test_backspace_on_empty_closes() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::Command);
        prompt.handle_key(key(KeyCode::Char('a')));
        assert_eq!(prompt.handle_key(key(KeyCode::Backspace)), PromptResult::Continue);
        assert_eq!(
            prompt.handle_key(key(KeyCode::Backspace)),
            PromptResult::Commit(String::new())
        );
    }
}
