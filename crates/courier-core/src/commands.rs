//! Command registry used by the resolver, the palette and the help overlay.

use std::collections::HashMap;

use nucleo::{Config, Matcher, Utf32Str};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::action::Action;
use crate::model::{Rsvp, ViewName};

/// Grouping used by help and the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Category {
    Navigation,
    Messages,
    Calendar,
    Contacts,
    Webhooks,
    Folders,
    #[strum(to_string = "Vim Commands")]
    Vim,
    System,
}

/// A registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Primary name, `"<parent> <sub>"` for sub-commands.
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub category: Category,
    /// Direct key binding, for display.
    pub shortcut: Option<&'static str>,
    /// View the command applies to, `None` for all views.
    pub context_view: Option<ViewName>,
    /// Action performed when the command is executed.
    pub action: Option<Action>,
    pub sub_commands: Vec<Command>,
}

impl Command {
    pub fn new(name: &str, description: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: description.to_string(),
            category,
            shortcut: None,
            context_view: None,
            action: None,
            sub_commands: Vec::new(),
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|alias| alias.to_string()).collect();
        self
    }

    pub fn shortcut(mut self, shortcut: &'static str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn context(mut self, view: ViewName) -> Self {
        self.context_view = Some(view);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn sub(mut self, sub: Command) -> Self {
        self.sub_commands.push(sub);
        self
    }

    /// Name without the parent prefix.
    pub fn leaf_name(&self) -> &str {
        self.name.rsplit(' ').next().unwrap_or(&self.name)
    }

    /// Whether this is a flattened `"<parent> <sub>"` entry.
    pub fn is_sub_command(&self) -> bool {
        self.name.contains(' ')
    }

    /// Aliases joined for display.
    pub fn display_aliases(&self) -> String {
        self.aliases.join(", ")
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Commands grouped under one category.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub commands: Vec<&'a Command>,
}

/// Maximum number of results returned by [`CommandRegistry::search`].
pub const MAX_SUGGESTIONS: usize = 10;

/// Immutable-after-init set of commands with exact name and alias lookup.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    by_name: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in command.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for command in default_commands() {
            registry.register(command);
        }
        registry
    }

    /// Register a command and its sub-commands.
    ///
    /// A name or alias already taken keeps pointing at the earlier command.
    pub fn register(&mut self, command: Command) {
        let flattened: Vec<Command> = command
            .sub_commands
            .iter()
            .map(|sub| Command {
                name: format!("{} {}", command.name, sub.name),
                aliases: sub
                    .aliases
                    .iter()
                    .map(|alias| format!("{} {}", command.name, alias))
                    .collect(),
                description: sub.description.clone(),
                category: command.category,
                shortcut: sub.shortcut,
                context_view: sub.context_view.or(command.context_view),
                action: sub.action.clone(),
                sub_commands: Vec::new(),
            })
            .collect();

        self.insert(command);
        for sub in flattened {
            self.insert(sub);
        }
    }

    fn insert(&mut self, command: Command) {
        let index = self.commands.len();
        for name in command.names() {
            if self.by_name.contains_key(name) {
                tracing::warn!(name, command = %command.name, "Duplicate command name ignored");
                continue;
            }
            self.by_name.insert(name.to_string(), index);
        }
        self.commands.push(command);
    }

    /// Look up a command by exact, case-sensitive name or alias.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name).map(|&index| &self.commands[index])
    }

    /// All top-level commands sorted by name.
    pub fn all(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self
            .commands
            .iter()
            .filter(|command| !command.is_sub_command())
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Top-level commands grouped by category, in category display order.
    pub fn by_category(&self) -> Vec<CategoryGroup<'_>> {
        Category::iter()
            .filter_map(|category| {
                let commands: Vec<&Command> = self
                    .commands
                    .iter()
                    .filter(|command| command.category == category && !command.is_sub_command())
                    .collect();
                (!commands.is_empty()).then_some(CategoryGroup { category, commands })
            })
            .collect()
    }

    /// Direct sub-commands of `parent`, in registration order.
    pub fn sub_commands(&self, parent: &str) -> Vec<&Command> {
        let Some(parent) = self.get(parent.trim()) else {
            return Vec::new();
        };
        let prefix = format!("{} ", parent.name);
        self.commands
            .iter()
            .filter(|command| {
                command
                    .name
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains(' '))
            })
            .collect()
    }

    pub fn has_sub_commands(&self, name: &str) -> bool {
        !self.sub_commands(name).is_empty()
    }

    /// Rank top-level commands against `query`.
    ///
    /// Exact matches sort before prefix matches, then substring matches, then
    /// fuzzy subsequence matches; ties sort by name. Matching ignores case.
    /// An empty query lists every top-level command.
    pub fn search(&self, query: &str) -> Vec<&Command> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.all().into_iter().take(MAX_SUGGESTIONS).collect();
        }
        let candidates = self
            .commands
            .iter()
            .filter(|command| !command.is_sub_command());
        rank(candidates, &query)
    }

    /// Rank the sub-commands of `parent` against `query`, matching on the
    /// part after the parent name.
    pub fn search_sub_commands(&self, parent: &str, query: &str) -> Vec<&Command> {
        let subs = self.sub_commands(parent);
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return subs.into_iter().take(MAX_SUGGESTIONS).collect();
        }
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut ranked: Vec<(u8, &Command)> = subs
            .into_iter()
            .filter_map(|command| {
                command
                    .names()
                    .filter_map(|name| name.rsplit(' ').next())
                    .filter_map(|leaf| match_score(&mut matcher, leaf, &query))
                    .min()
                    .map(|score| (score, command))
            })
            .collect();
        ranked.sort_by_key(|(score, _)| *score);
        ranked
            .into_iter()
            .map(|(_, command)| command)
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

fn rank<'a>(candidates: impl Iterator<Item = &'a Command>, query: &str) -> Vec<&'a Command> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut ranked: Vec<(u8, &Command)> = candidates
        .filter_map(|command| {
            command
                .names()
                .filter_map(|name| match_score(&mut matcher, name, query))
                .min()
                .map(|score| (score, command))
        })
        .collect();
    ranked.sort_by(|(a_score, a), (b_score, b)| a_score.cmp(b_score).then_with(|| a.name.cmp(&b.name)));
    ranked
        .into_iter()
        .map(|(_, command)| command)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Score `target` against a lowercase `query`: 0 exact, 1 prefix, 2 substring,
/// 3 fuzzy, `None` for no match.
fn match_score(matcher: &mut Matcher, target: &str, query: &str) -> Option<u8> {
    let target = target.to_lowercase();
    if target == query {
        return Some(0);
    }
    if target.starts_with(query) {
        return Some(1);
    }
    if target.contains(query) {
        return Some(2);
    }

    let mut haystack_buf = Vec::new();
    let mut needle_buf = Vec::new();
    let haystack = Utf32Str::new(&target, &mut haystack_buf);
    let needle = Utf32Str::new(query, &mut needle_buf);
    matcher.fuzzy_match(haystack, needle).map(|_| 3)
}

fn nav(name: &str, aliases: &[&str], description: &str, view: ViewName) -> Command {
    Command::new(name, description, Category::Navigation)
        .aliases(aliases)
        .action(Action::Navigate(view))
}

fn record(name: &str, category: Category, description: &str, action: Action) -> Command {
    Command::new(name, description, category).action(action)
}

/// Create/edit/delete sub-commands shared by the record groups.
fn crud(parent: &str, noun: &str, category: Category, view: ViewName) -> Command {
    Command::new(parent, &format!("{} management", capitalize(noun)), category)
        .context(view)
        .sub(
            record("new", category, &format!("Create new {noun}"), Action::Create)
                .aliases(&["create"]),
        )
        .sub(
            record("edit", category, &format!("Edit current {noun}"), Action::Edit)
                .aliases(&["update"]),
        )
        .sub(
            record("delete", category, &format!("Delete current {noun}"), Action::Delete)
                .aliases(&["del"]),
        )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn default_commands() -> Vec<Command> {
    use Category::*;

    vec![
        // Navigation
        nav("messages", &["m", "msg"], "Go to messages view", ViewName::Messages),
        nav("drafts", &["dr"], "Go to drafts", ViewName::Drafts),
        nav("events", &["e", "ev", "cal", "calendar"], "Go to calendar events view", ViewName::Events),
        nav(
            "availability",
            &["av", "avail", "find-time", "findtime"],
            "Find a free meeting time",
            ViewName::Availability,
        ),
        nav("contacts", &["c", "ct"], "Go to contacts view", ViewName::Contacts),
        nav("webhooks", &["w", "wh"], "Go to webhooks view", ViewName::Webhooks),
        nav(
            "webhook-server",
            &["ws", "whs", "server"],
            "Go to webhook server view",
            ViewName::WebhookServer,
        ),
        nav("grants", &["g", "gr"], "Go to grants/accounts view", ViewName::Grants),
        nav("inbound", &["i", "in"], "Go to inbound inboxes view", ViewName::Inbound),
        nav("dashboard", &["d", "dash", "home"], "Go to dashboard", ViewName::Dashboard),
        // Messages
        record("compose", Messages, "Compose new email", Action::Compose)
            .aliases(&["n", "new"])
            .shortcut("n"),
        record("reply", Messages, "Reply to current message", Action::Reply)
            .aliases(&["r"])
            .shortcut("R")
            .context(ViewName::Messages),
        record("replyall", Messages, "Reply all to message", Action::ReplyAll)
            .aliases(&["ra", "reply-all"])
            .shortcut("A")
            .context(ViewName::Messages),
        record("forward", Messages, "Forward message", Action::Forward)
            .aliases(&["f", "fwd"])
            .shortcut("F")
            .context(ViewName::Messages),
        record("star", Messages, "Star message", Action::Star)
            .aliases(&["s"])
            .shortcut("s")
            .context(ViewName::Messages),
        record("unstar", Messages, "Remove star from message", Action::Unstar)
            .context(ViewName::Messages),
        record("read", Messages, "Mark as read", Action::MarkRead)
            .aliases(&["mr"])
            .context(ViewName::Messages),
        record("unread", Messages, "Mark as unread", Action::MarkUnread)
            .aliases(&["mu"])
            .shortcut("u")
            .context(ViewName::Messages),
        record("delete", Messages, "Delete current item", Action::Delete)
            .aliases(&["del", "rm"])
            .shortcut("dd"),
        record("archive", Messages, "Archive message", Action::Archive)
            .shortcut("x")
            .context(ViewName::Messages),
        // Calendar
        crud("event", "event", Calendar, ViewName::Events),
        Command::new("rsvp", "RSVP to event", Calendar)
            .context(ViewName::Events)
            .sub(record("yes", Calendar, "RSVP yes to event", Action::Rsvp(Rsvp::Yes)))
            .sub(record("no", Calendar, "RSVP no to event", Action::Rsvp(Rsvp::No)))
            .sub(record("maybe", Calendar, "RSVP maybe to event", Action::Rsvp(Rsvp::Maybe))),
        // Contacts
        crud("contact", "contact", Contacts, ViewName::Contacts),
        // Webhooks
        crud("webhook", "webhook", Webhooks, ViewName::Webhooks).sub(record(
            "test",
            Webhooks,
            "Test current webhook",
            Action::TestWebhook,
        )),
        // Folders
        record("inbox", Folders, "Go to inbox folder", Action::OpenFolder("INBOX".into())),
        record("sent", Folders, "Go to sent folder", Action::OpenFolder("SENT".into())),
        record("trash", Folders, "Go to trash folder", Action::OpenFolder("TRASH".into())),
        // Vim
        record("quit", Vim, "Quit application", Action::Quit).aliases(&["q", "exit"]),
        record("quit!", Vim, "Force quit", Action::Quit).aliases(&["q!"]),
        record("wq", Vim, "Save and quit", Action::Quit).aliases(&["x"]),
        record("help", Vim, "Show help", Action::ShowHelp)
            .aliases(&["h"])
            .shortcut("?"),
        record("top", Vim, "Go to first row", Action::JumpToTop)
            .aliases(&["first", "gg"])
            .shortcut("gg"),
        record("bottom", Vim, "Go to last row", Action::JumpToBottom)
            .aliases(&["last", "G"])
            .shortcut("G"),
        // System
        record("refresh", System, "Refresh current view", Action::Refresh)
            .aliases(&["reload"])
            .shortcut("r"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_primary() {
        let registry = CommandRegistry::with_defaults();
        for alias in ["messages", "m", "msg"] {
            assert_eq!(registry.get(alias).map(|c| c.name.as_str()), Some("messages"));
        }
        assert_eq!(
            registry.get("find-time").and_then(|c| c.action.clone()),
            Some(Action::Navigate(ViewName::Availability))
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(registry.get("G").map(|c| c.name.as_str()), Some("bottom"));
        assert_eq!(registry.get("g").map(|c| c.name.as_str()), Some("grants"));
        assert!(registry.get("MESSAGES").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("one", "first", Category::System).aliases(&["x"]));
        registry.register(Command::new("two", "second", Category::System).aliases(&["x"]));
        assert_eq!(registry.get("x").map(|c| c.name.as_str()), Some("one"));
        assert_eq!(registry.get("two").map(|c| c.name.as_str()), Some("two"));
    }

    #[test]
    fn test_sub_commands_are_flattened() {
        let registry = CommandRegistry::with_defaults();
        let subs: Vec<&str> = registry
            .sub_commands("webhook")
            .iter()
            .map(|c| c.leaf_name())
            .collect();
        assert_eq!(subs, vec!["new", "edit", "delete", "test"]);
        assert_eq!(
            registry.get("event create").and_then(|c| c.action.clone()),
            Some(Action::Create)
        );
        assert!(registry.has_sub_commands("rsvp"));
        assert!(!registry.has_sub_commands("messages"));
    }

    #[test]
    fn test_search_ranking() {
        let registry = CommandRegistry::with_defaults();
        let results = registry.search("mes");
        assert_eq!(results.first().map(|c| c.name.as_str()), Some("messages"));

        // "star" is exact, "unstar" only contains it.
        let names: Vec<&str> = registry.search("star").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"star"));
        assert!(names.contains(&"unstar"));
        let star = names.iter().position(|n| *n == "star");
        let unstar = names.iter().position(|n| *n == "unstar");
        assert!(star < unstar);
    }

    #[test]
    fn test_search_is_case_insensitive_and_capped() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            registry.search("MESSAGES").first().map(|c| c.name.as_str()),
            Some("messages")
        );
        assert!(registry.search("e").len() <= MAX_SUGGESTIONS);
        assert_eq!(registry.search("").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_fuzzy_subsequence_matches() {
        let registry = CommandRegistry::with_defaults();
        let names: Vec<&str> = registry.search("wbsrv").iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"webhook-server"));
        assert!(registry.search("zzzz").is_empty());
    }

    #[test]
    fn test_by_category_follows_display_order() {
        let registry = CommandRegistry::with_defaults();
        let groups = registry.by_category();
        assert_eq!(groups[0].category, Category::Navigation);
        assert_eq!(groups.last().map(|g| g.category), Some(Category::System));
        assert!(groups.iter().all(|g| g.commands.iter().all(|c| !c.is_sub_command())));
    }
}
