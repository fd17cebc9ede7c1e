//! Resolution of command-line input into actions.

use crate::action::Action;
use crate::commands::CommandRegistry;

/// Outcome of resolving a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Perform an action.
    Action(Action),
    /// Nothing matched; the input is silently ignored.
    Ignored,
}

/// Resolve a command line against the registry.
///
/// In order: an all-digit string selects that row (1-indexed, clamped by the
/// receiving view), an exact alias runs its command, and `e <name>` navigates
/// when `<name>` is a navigation command. Anything else is ignored.
pub fn resolve(registry: &CommandRegistry, input: &str) -> Resolution {
    let input = input.trim();
    if input.is_empty() {
        return Resolution::Ignored;
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let row = input.parse().unwrap_or(usize::MAX);
        return Resolution::Action(Action::SelectRow(row));
    }

    if let Some(action) = registry.get(input).and_then(|command| command.action.clone()) {
        return Resolution::Action(action);
    }

    if let Some(rest) = input.strip_prefix("e ") {
        if let Some(action @ Action::Navigate(_)) =
            registry.get(rest.trim()).and_then(|command| command.action.clone())
        {
            return Resolution::Action(action);
        }
    }

    tracing::debug!(input, "Ignoring unknown command");
    Resolution::Ignored
}

/// Whether `input` resolves to an action by itself.
pub fn resolves(registry: &CommandRegistry, input: &str) -> bool {
    matches!(resolve(registry, input), Resolution::Action(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewName;

    #[test]
    fn test_digits_select_row() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(resolve(&registry, "42"), Resolution::Action(Action::SelectRow(42)));
        assert_eq!(resolve(&registry, " 7 "), Resolution::Action(Action::SelectRow(7)));
        assert_eq!(resolve(&registry, "0"), Resolution::Action(Action::SelectRow(0)));
    }

    #[test]
    fn test_huge_row_number_saturates() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            resolve(&registry, "99999999999999999999999999"),
            Resolution::Action(Action::SelectRow(usize::MAX))
        );
    }

    #[test]
    fn test_e_prefix_only_navigates() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            resolve(&registry, "e contacts"),
            Resolution::Action(Action::Navigate(ViewName::Contacts))
        );
        assert_eq!(resolve(&registry, "e quit"), Resolution::Ignored);
        assert_eq!(resolve(&registry, "e nothing"), Resolution::Ignored);
    }

    #[test]
    fn test_parent_without_action_is_ignored() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(resolve(&registry, "event"), Resolution::Ignored);
        assert!(resolves(&registry, "event new"));
    }

    #[test]
    fn test_blank_is_ignored() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(resolve(&registry, "   "), Resolution::Ignored);
        assert!(!resolves(&registry, "bogus-command"));
    }
}
