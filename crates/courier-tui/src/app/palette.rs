//! Autocomplete command palette.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use courier_core::{Command, CommandRegistry, resolves};

use super::input::{InputResult, InputState};

/// One row of the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Full command string committed when chosen.
    pub command: String,
    /// Name shown in the list.
    pub label: String,
    pub aliases: String,
    pub description: String,
    pub has_sub_commands: bool,
}

impl Suggestion {
    fn from_command(command: &Command, registry: &CommandRegistry) -> Self {
        Self {
            command: command.name.clone(),
            label: command.leaf_name().to_string(),
            aliases: command
                .aliases
                .iter()
                .map(|alias| alias.rsplit(' ').next().unwrap_or(alias))
                .collect::<Vec<_>>()
                .join(", "),
            description: command.description.clone(),
            has_sub_commands: registry.has_sub_commands(&command.name),
        }
    }
}

/// Result of a key press in the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteResult {
    Continue,
    /// Close without committing.
    Close,
    /// Close and run this command string.
    Commit(String),
}

/// Palette state: input line, ranked suggestions and highlight.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    input: InputState,
    suggestions: Vec<Suggestion>,
    selected: usize,
    /// Whether the highlight was moved with the arrow keys since the last edit.
    moved: bool,
    /// Parent command while listing its sub-commands.
    parent: Option<String>,
}

impl Palette {
    /// Reset and show every top-level command.
    pub fn open(&mut self, registry: &CommandRegistry) {
        self.input.clear();
        self.update(registry);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent, registry: &CommandRegistry) -> PaletteResult {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => PaletteResult::Close,
            (KeyCode::Enter, _) => self.commit(registry),
            (KeyCode::Tab, _) => {
                self.complete(registry);
                PaletteResult::Continue
            }
            (KeyCode::Up, _) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.move_selection(-1);
                PaletteResult::Continue
            }
            (KeyCode::Down, _) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.move_selection(1);
                PaletteResult::Continue
            }
            (KeyCode::Backspace, _) if self.input.is_empty() => PaletteResult::Close,
            _ => {
                if self.input.handle_key(key) == InputResult::Changed {
                    self.update(registry);
                }
                PaletteResult::Continue
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len as isize) as usize;
        self.moved = true;
    }

    /// Fill the input with the highlighted suggestion.
    fn complete(&mut self, registry: &CommandRegistry) {
        let Some(suggestion) = self.suggestions.get(self.selected) else {
            return;
        };
        let mut text = suggestion.command.clone();
        if suggestion.has_sub_commands {
            text.push(' ');
        }
        self.input.set(&text);
        self.update(registry);
    }

    fn commit(&mut self, registry: &CommandRegistry) -> PaletteResult {
        let typed = self.input.buffer().trim().to_string();
        if typed.is_empty() && !self.moved {
            return PaletteResult::Close;
        }
        let highlighted = self.suggestions.get(self.selected);

        let chosen = match highlighted {
            Some(suggestion) if self.moved => suggestion,
            _ if resolves(registry, &typed) => return PaletteResult::Commit(typed),
            Some(suggestion) => suggestion,
            None => return PaletteResult::Commit(typed),
        };

        // A bare parent opens its sub-commands instead of running nothing.
        if chosen.has_sub_commands {
            self.complete(registry);
            return PaletteResult::Continue;
        }
        PaletteResult::Commit(chosen.command.clone())
    }

    fn update(&mut self, registry: &CommandRegistry) {
        let text = self.input.buffer();
        let sub_mode = text
            .split_once(' ')
            .and_then(|(head, rest)| {
                registry
                    .get(head)
                    .filter(|command| registry.has_sub_commands(&command.name))
                    .map(|command| (command.name.clone(), rest.to_string()))
            });

        let commands = match &sub_mode {
            Some((parent, rest)) => registry.search_sub_commands(parent, rest),
            None => registry.search(text),
        };
        self.suggestions = commands
            .into_iter()
            .map(|command| Suggestion::from_command(command, registry))
            .collect();
        self.parent = sub_mode.map(|(parent, _)| parent);
        self.selected = 0;
        self.moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(palette: &mut Palette, registry: &CommandRegistry, text: &str) {
        for c in text.chars() {
            palette.handle_key(key(KeyCode::Char(c)), registry);
        }
    }

    #[test]
    fn test_open_lists_commands() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        assert!(!palette.suggestions().is_empty());
        assert_eq!(palette.suggestions()[0].command, "archive");
    }

    #[test]
    fn test_enter_on_empty_input_closes() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        assert_eq!(palette.handle_key(key(KeyCode::Enter), &registry), PaletteResult::Close);

        // Choosing from the list still works without typing
        palette.open(&registry);
        palette.handle_key(key(KeyCode::Down), &registry);
        palette.handle_key(key(KeyCode::Up), &registry);
        assert_eq!(
            palette.handle_key(key(KeyCode::Enter), &registry),
            PaletteResult::Commit("archive".into())
        );
    }

    #[test]
    fn test_typed_alias_wins_over_highlight() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "m");
        assert_eq!(
            palette.handle_key(key(KeyCode::Enter), &registry),
            PaletteResult::Commit("m".into())
        );
    }

    #[test]
    fn test_moved_highlight_wins() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "mes");
        palette.handle_key(key(KeyCode::Down), &registry);
        palette.handle_key(key(KeyCode::Up), &registry);
        assert_eq!(
            palette.handle_key(key(KeyCode::Enter), &registry),
            PaletteResult::Commit("messages".into())
        );
    }

    #[test]
    fn test_partial_text_commits_highlight() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "webhook-s");
        assert_eq!(
            palette.handle_key(key(KeyCode::Enter), &registry),
            PaletteResult::Commit("webhook-server".into())
        );
    }

    #[test]
    fn test_enter_on_parent_lists_sub_commands() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "contac");
        // "contact" sorts before "contacts" and has sub-commands
        assert_eq!(palette.handle_key(key(KeyCode::Enter), &registry), PaletteResult::Continue);
        assert_eq!(palette.input().buffer(), "contact ");
    }

    #[test]
    fn test_sub_command_mode() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "rsvp ");
        assert_eq!(palette.parent(), Some("rsvp"));
        let labels: Vec<&str> = palette.suggestions().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["yes", "no", "maybe"]);

        type_str(&mut palette, &registry, "ma");
        assert_eq!(
            palette.handle_key(key(KeyCode::Enter), &registry),
            PaletteResult::Commit("rsvp maybe".into())
        );
    }

    #[test]
    fn test_tab_completes_parent_with_space() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "webho");
        // "webhook" (prefix) sorts before "webhook-server" and "webhooks"
        palette.handle_key(key(KeyCode::Tab), &registry);
        assert_eq!(palette.input().buffer(), "webhook ");
        assert_eq!(palette.parent(), Some("webhook"));
    }

    #[test]
    fn test_wraparound_and_close() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        palette.handle_key(key(KeyCode::Up), &registry);
        assert_eq!(palette.selected(), palette.suggestions().len() - 1);
        assert_eq!(palette.handle_key(key(KeyCode::Backspace), &registry), PaletteResult::Close);
    }

    #[test]
    fn test_ctrl_u_clears() {
        let registry = CommandRegistry::with_defaults();
        let mut palette = Palette::default();
        palette.open(&registry);
        type_str(&mut palette, &registry, "help");
        palette.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), &registry);
        assert!(palette.input().is_empty());
        assert_eq!(palette.handle_key(key(KeyCode::Esc), &registry), PaletteResult::Close);
    }
}
