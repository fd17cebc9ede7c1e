//! Views: the surfaces that can sit on the page stack.
//!
//! Registered views are created lazily by [`ViewRegistry`], one per
//! [`ViewName`], and live for the whole session. Overlays (detail, forms,
//! confirmations, help) are owned by the page-stack entry that shows them.
//!
//! Views never touch the page stack or the mode directly. They record
//! [`Request`]s on their [`ViewContext`], which the dispatcher applies once
//! the view call returns.

mod confirm;
mod dashboard;
mod detail;
mod form;
mod help;
mod table;

use std::collections::HashMap;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use courier_core::{Action, GrantIdentity, Hint, ViewName};

use crate::app::{FlashLevel, Job, Payload, Target, Work};
use crate::theme::Theme;

pub use confirm::ConfirmView;
pub use dashboard::DashboardView;
pub use detail::DetailView;
pub use form::FormView;
pub use help::HelpView;
pub use table::ResourceView;

/// Whether a view used a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Passthrough,
}

/// A stateful, drawable surface.
pub trait View {
    /// Name shown in the breadcrumbs and used on the page stack.
    fn name(&self) -> &str;

    /// Title drawn on the content border.
    fn title(&self) -> String;

    /// Key hints for the menu bar.
    fn hints(&self) -> Vec<Hint>;

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Index of the selected item, for views that have one.
    fn selection(&self) -> Option<usize> {
        None
    }

    /// Fetch data. Called whenever the view is displayed.
    fn load(&mut self, _ctx: &mut ViewContext) {}

    /// Re-fetch data on demand.
    fn refresh(&mut self, ctx: &mut ViewContext) {
        self.load(ctx);
    }

    /// Apply a filter string; empty clears it.
    fn filter(&mut self, _text: &str) {}

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome;

    /// Perform a resolved action. Returns false when the view does not support it.
    fn perform(&mut self, _action: &Action, _ctx: &mut ViewContext) -> bool {
        false
    }

    /// Handle Escape at top level. Returns true when the view used it.
    fn escape(&mut self, _ctx: &mut ViewContext) -> bool {
        false
    }

    /// Deliver the result of a job this view scheduled.
    fn apply(&mut self, _job: &Job, _payload: Payload, _ctx: &mut ViewContext) {}

    /// Notified after a job this view scheduled failed. The dispatcher has
    /// already flashed the error.
    fn on_error(&mut self, _job: &Job, _ctx: &mut ViewContext) {}
}

/// Kernel effects requested by a view.
pub enum Request {
    /// Push an overlay on top of the stack.
    Push(Box<dyn View>),
    /// Pop the requesting overlay if it is on top.
    Pop(Target),
    Navigate(ViewName),
    /// Run a command string as if typed at the prompt.
    Execute(String),
    Flash(FlashLevel, String),
    SwitchGrant(GrantIdentity),
    /// Refresh a registered view.
    Refresh(ViewName),
    Spawn {
        target: Target,
        label: String,
        work: Work,
    },
    Quit,
}

/// Handle through which a view asks the kernel for effects.
pub struct ViewContext {
    target: Target,
    grant: GrantIdentity,
    requests: Vec<Request>,
}

impl ViewContext {
    pub fn new(target: Target, grant: GrantIdentity) -> Self {
        Self {
            target,
            grant,
            requests: Vec::new(),
        }
    }

    /// The surface this context was created for.
    pub fn target(&self) -> Target {
        self.target
    }

    /// The active grant.
    pub fn grant(&self) -> &GrantIdentity {
        &self.grant
    }

    pub fn push(&mut self, view: impl View + 'static) {
        self.requests.push(Request::Push(Box::new(view)));
    }

    /// Close the calling overlay.
    pub fn pop(&mut self) {
        self.requests.push(Request::Pop(self.target));
    }

    pub fn navigate(&mut self, view: ViewName) {
        self.requests.push(Request::Navigate(view));
    }

    pub fn execute(&mut self, command: impl Into<String>) {
        self.requests.push(Request::Execute(command.into()));
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.requests.push(Request::Flash(level, message.into()));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.flash(FlashLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.flash(FlashLevel::Warn, message);
    }

    pub fn switch_grant(&mut self, grant: GrantIdentity) {
        self.requests.push(Request::SwitchGrant(grant));
    }

    pub fn refresh_view(&mut self, view: ViewName) {
        self.requests.push(Request::Refresh(view));
    }

    /// Schedule `work` with results delivered back to this surface.
    pub fn spawn(&mut self, label: impl Into<String>, work: Work) {
        self.spawn_for(self.target, label, work);
    }

    /// Schedule `work` with results delivered to `target`.
    pub fn spawn_for(&mut self, target: Target, label: impl Into<String>, work: Work) {
        self.requests.push(Request::Spawn {
            target,
            label: label.into(),
            work,
        });
    }

    pub fn quit(&mut self) {
        self.requests.push(Request::Quit);
    }

    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }

    /// Requested effects so far.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

/// What a page-stack entry shows.
pub enum Surface {
    /// A view owned by the registry.
    Registered(ViewName),
    /// An overlay owned by the entry itself.
    Overlay { id: u64, view: Box<dyn View> },
}

impl Surface {
    pub fn target(&self) -> Target {
        match self {
            Self::Registered(name) => Target::View(*name),
            Self::Overlay { id, .. } => Target::Overlay(*id),
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Overlay { .. })
    }
}

/// Lazily created, session-long registered views.
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<ViewName, Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached view, creating it on first request. Performs no I/O.
    pub fn get_or_create(&mut self, name: ViewName) -> &mut dyn View {
        self.views
            .entry(name)
            .or_insert_with(|| create_view(name))
            .as_mut()
    }

    /// Resolve `name` (unknown names fall back to the dashboard) and return
    /// the view.
    pub fn get_or_create_by_name(&mut self, name: &str) -> &mut dyn View {
        self.get_or_create(ViewName::from_name(name))
    }

    /// The view if it has been created.
    pub fn get(&self, name: ViewName) -> Option<&dyn View> {
        self.views.get(&name).map(|view| view.as_ref())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

fn create_view(name: ViewName) -> Box<dyn View> {
    match name {
        ViewName::Dashboard => Box::new(DashboardView::new()),
        resource => Box::new(ResourceView::new(resource)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_caches_views() {
        let mut registry = ViewRegistry::new();
        assert_eq!(registry.get_or_create(ViewName::Messages).name(), "messages");
        assert_eq!(registry.get_or_create(ViewName::Messages).name(), "messages");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_name_falls_back_to_dashboard() {
        let mut registry = ViewRegistry::new();
        assert_eq!(registry.get_or_create_by_name("nope").name(), "dashboard");
        assert!(registry.get(ViewName::Dashboard).is_some());
    }
}
