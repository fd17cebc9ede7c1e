//! Actions shared by key bindings and typed commands.

use crate::model::{Rsvp, ViewName};

/// A canonical operation produced by the resolver or a key binding.
///
/// Navigation and kernel-level variants are handled by the dispatcher; the
/// rest are forwarded to the focused view's `perform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Switch the page stack to a registered view.
    Navigate(ViewName),
    /// Select a row, 1-indexed.
    SelectRow(usize),
    JumpToTop,
    JumpToBottom,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    Refresh,
    ShowHelp,
    /// Leave the application.
    Quit,

    // Record actions
    Delete,
    Star,
    Unstar,
    MarkRead,
    MarkUnread,
    Archive,
    Compose,
    Reply,
    ReplyAll,
    Forward,
    Create,
    Edit,
    Rsvp(Rsvp),
    TestWebhook,
    /// Open a mail folder in the messages view.
    OpenFolder(String),
}

impl Action {
    /// Whether the dispatcher handles this action itself rather than the view.
    pub fn is_kernel(&self) -> bool {
        matches!(
            self,
            Self::Navigate(_) | Self::Refresh | Self::ShowHelp | Self::Quit | Self::OpenFolder(_)
        )
    }

    /// Short verb used in messages about this action.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Star => "star",
            Self::Unstar => "unstar",
            Self::MarkRead => "mark read",
            Self::MarkUnread => "mark unread",
            Self::Archive => "archive",
            Self::Reply => "reply to",
            Self::ReplyAll => "reply to",
            Self::Forward => "forward",
            Self::Edit => "edit",
            Self::Rsvp(_) => "respond to",
            Self::TestWebhook => "test",
            Self::Compose | Self::Create => "create",
            _ => "use",
        }
    }
}
