//! Domain types shared by the kernel, the views and API clients.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Name of a top-level, registry-cached view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ViewName {
    #[default]
    Dashboard,
    Messages,
    Drafts,
    Events,
    Availability,
    Contacts,
    Webhooks,
    WebhookServer,
    Grants,
    Inbound,
}

impl ViewName {
    /// Resolve a view name, falling back to the dashboard for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Canonical name as used on the page stack.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Title shown in breadcrumbs.
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Messages => "Messages",
            Self::Drafts => "Drafts",
            Self::Events => "Events",
            Self::Availability => "Availability",
            Self::Contacts => "Contacts",
            Self::Webhooks => "Webhooks",
            Self::WebhookServer => "Webhook Server",
            Self::Grants => "Grants",
            Self::Inbound => "Inbound",
        }
    }
}

/// A key hint shown in the menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub key: &'static str,
    pub description: &'static str,
}

impl Hint {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self { key, description }
    }
}

/// Identity of the grant the API client operates under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantIdentity {
    pub id: String,
    pub email: String,
    pub provider: String,
}

impl GrantIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            provider: provider.into(),
        }
    }
}

/// A generic record as displayed by table views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Stable identifier used for mutations.
    pub id: String,
    /// Cell values, one per column.
    pub cells: Vec<String>,
    /// Labelled fields shown in the detail overlay.
    pub details: Vec<(String, String)>,
    pub starred: bool,
    pub unread: bool,
}

impl Row {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: id.into(),
            cells,
            ..Default::default()
        }
    }

    /// Attach detail fields.
    pub fn with_details(mut self, details: Vec<(String, String)>) -> Self {
        self.details = details;
        self
    }

    /// Look up a detail field by label.
    pub fn detail(&self, label: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }

    /// Case-insensitive substring match against every cell.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.cells
            .iter()
            .any(|cell| cell.to_lowercase().contains(&needle))
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub unread_messages: usize,
    pub total_messages: usize,
    pub upcoming_events: usize,
    pub contacts: usize,
    pub webhooks: usize,
}

/// Parameters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Free-text filter applied server side.
    pub filter: String,
    /// Folder to list, for resources that have folders.
    pub folder: Option<String>,
}

/// RSVP answer for an event invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Rsvp {
    Yes,
    No,
    Maybe,
}

/// A state change applied to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Delete,
    Star(bool),
    Read(bool),
    Archive,
    Rsvp(Rsvp),
    /// Send a test payload to a webhook.
    Test,
}

impl Mutation {
    /// Past-tense description used in flash messages.
    pub fn done_label(&self) -> &'static str {
        match self {
            Self::Delete => "Deleted",
            Self::Star(true) => "Starred",
            Self::Star(false) => "Unstarred",
            Self::Read(true) => "Marked read",
            Self::Read(false) => "Marked unread",
            Self::Archive => "Archived",
            Self::Rsvp(_) => "Responded to",
            Self::Test => "Sent test to",
        }
    }
}

/// Kind of form submitted from a form overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FormKind {
    #[strum(to_string = "message")]
    Message,
    #[strum(to_string = "event")]
    Event,
    #[strum(to_string = "contact")]
    Contact,
    #[strum(to_string = "webhook")]
    Webhook,
}

impl FormKind {
    /// Resource whose records a submitted form changes.
    pub fn resource(self) -> ViewName {
        match self {
            Self::Message => ViewName::Messages,
            Self::Event => ViewName::Events,
            Self::Contact => ViewName::Contacts,
            Self::Webhook => ViewName::Webhooks,
        }
    }
}

/// A filled-in form ready to send to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub kind: FormKind,
    /// Record being edited, or `None` when creating.
    pub id: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// Look up a submitted field by label.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_name_round_trips_kebab_case() {
        assert_eq!(ViewName::WebhookServer.as_str(), "webhook-server");
        assert_eq!(ViewName::from_name("webhook-server"), ViewName::WebhookServer);
        assert_eq!(ViewName::from_name("messages"), ViewName::Messages);
    }

    #[test]
    fn test_unknown_view_falls_back_to_dashboard() {
        assert_eq!(ViewName::from_name("nope"), ViewName::Dashboard);
        assert_eq!(ViewName::from_name(""), ViewName::Dashboard);
    }

    #[test]
    fn test_row_matches_any_cell() {
        let row = Row::new("1", vec!["Alice".into(), "Quarterly report".into()]);
        assert!(row.matches("report"));
        assert!(row.matches("ALICE"));
        assert!(row.matches(""));
        assert!(!row.matches("bob"));
    }
}
