//! Global key bindings handled by the dispatcher in normal mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key the dispatcher handles before the focused view sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKey {
    /// Ctrl-C, always available.
    Quit,
    /// Clear filter or pop one level.
    Escape,

    // Paging
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,

    // Input modes
    Command,
    Filter,
    Help,

    Refresh,
    /// First or second key of a two-key chord (`gg`, `dd`).
    Chord(char),
    JumpToBottom,
    Archive,

    /// Not global; forward to the view.
    None,
}

impl GlobalKey {
    /// Classify a key event.
    pub fn from_key_event(event: KeyEvent) -> Self {
        match (event.code, event.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => GlobalKey::Quit,
            (KeyCode::Esc, _) => GlobalKey::Escape,

            (KeyCode::Char('d'), KeyModifiers::CONTROL) => GlobalKey::HalfPageDown,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => GlobalKey::HalfPageUp,
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => GlobalKey::PageDown,
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => GlobalKey::PageUp,

            // ':' and '?' arrive with SHIFT on some terminals
            (KeyCode::Char(':'), KeyModifiers::NONE | KeyModifiers::SHIFT) => GlobalKey::Command,
            (KeyCode::Char('/'), KeyModifiers::NONE) => GlobalKey::Filter,
            (KeyCode::Char('?'), KeyModifiers::NONE | KeyModifiers::SHIFT) => GlobalKey::Help,

            (KeyCode::Char('r'), KeyModifiers::NONE) => GlobalKey::Refresh,
            (KeyCode::Char(c @ ('g' | 'd')), KeyModifiers::NONE) => GlobalKey::Chord(c),
            (KeyCode::Char('G'), KeyModifiers::NONE | KeyModifiers::SHIFT) => GlobalKey::JumpToBottom,
            (KeyCode::Char('x'), KeyModifiers::NONE) => GlobalKey::Archive,

            _ => GlobalKey::None,
        }
    }
}

/// A section of key bindings for the help display.
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: &'static str,
    pub bindings: Vec<KeyBinding>,
}

/// Key binding for display in help.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const fn binding(keys: &'static str, description: &'static str) -> KeyBinding {
    KeyBinding { keys, description }
}

/// Global key bindings organized by section.
pub fn get_help_sections() -> Vec<HelpSection> {
    vec![
        HelpSection {
            title: "Navigation",
            bindings: vec![
                binding("j/k ↑/↓", "Move down/up"),
                binding("gg / G", "Jump to top/bottom"),
                binding("Ctrl-d/u", "Half page down/up"),
                binding("Ctrl-f/b", "Page down/up"),
                binding("Enter", "Open selected item"),
                binding("Esc", "Clear filter or go back"),
            ],
        },
        HelpSection {
            title: "Commands",
            bindings: vec![
                binding(":", "Command palette"),
                binding("/", "Filter current view"),
                binding("r", "Refresh"),
                binding("?", "This help"),
                binding("Ctrl-c", "Quit"),
            ],
        },
        HelpSection {
            title: "Records",
            bindings: vec![
                binding("dd", "Delete (asks first)"),
                binding("x", "Archive message"),
                binding("s / u", "Toggle star/unread"),
                binding("n", "Compose or create"),
                binding("e", "Edit"),
                binding("R / A / F", "Reply/all/forward"),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> GlobalKey {
        GlobalKey::from_key_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_global_keys() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), GlobalKey::Quit);
        assert_eq!(key(KeyCode::Char(':'), KeyModifiers::SHIFT), GlobalKey::Command);
        assert_eq!(key(KeyCode::Char('g'), KeyModifiers::NONE), GlobalKey::Chord('g'));
        assert_eq!(key(KeyCode::Char('d'), KeyModifiers::CONTROL), GlobalKey::HalfPageDown);
        assert_eq!(key(KeyCode::Char('G'), KeyModifiers::SHIFT), GlobalKey::JumpToBottom);
    }

    #[test]
    fn test_q_is_not_global() {
        assert_eq!(key(KeyCode::Char('q'), KeyModifiers::NONE), GlobalKey::None);
        assert_eq!(key(KeyCode::Char('j'), KeyModifiers::NONE), GlobalKey::None);
    }
}
