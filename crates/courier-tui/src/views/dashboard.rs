//! Home view: account summary and resource shortcuts.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use strum::IntoEnumIterator;

use courier_core::{Action, Hint, Summary, ViewName};

use super::{FormView, KeyOutcome, View, ViewContext};
use crate::app::{Job, Payload, Work};
use crate::theme::Theme;

/// Summary tiles above a list of resources to jump to.
#[derive(Debug)]
pub struct DashboardView {
    summary: Option<Summary>,
    entries: Vec<ViewName>,
    selected: usize,
    loading: bool,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            summary: None,
            entries: ViewName::iter().filter(|name| *name != ViewName::Dashboard).collect(),
            selected: 0,
            loading: false,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Resource under the cursor.
    pub fn selected_entry(&self) -> Option<ViewName> {
        self.entries.get(self.selected).copied()
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.entries.len().saturating_sub(1));
    }

    fn tiles(&self) -> [(&'static str, String); 4] {
        let count = |value: Option<usize>| value.map_or_else(|| "…".to_string(), |n| n.to_string());
        let summary = self.summary.as_ref();
        [
            (
                "Inbox",
                match summary {
                    Some(s) => format!("{} unread / {}", s.unread_messages, s.total_messages),
                    None => "…".to_string(),
                },
            ),
            ("Events", count(summary.map(|s| s.upcoming_events))),
            ("Contacts", count(summary.map(|s| s.contacts))),
            ("Webhooks", count(summary.map(|s| s.webhooks))),
        ]
    }
}

impl View for DashboardView {
    fn name(&self) -> &str {
        ViewName::Dashboard.as_str()
    }

    fn title(&self) -> String {
        ViewName::Dashboard.title().to_string()
    }

    fn hints(&self) -> Vec<Hint> {
        vec![
            Hint::new("j/k", "Move"),
            Hint::new("enter", "Open"),
            Hint::new("n", "Compose"),
            Hint::new("r", "Refresh"),
            Hint::new(":", "Command"),
            Hint::new("?", "Help"),
        ]
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [tiles_area, list_area] =
            Layout::vertical([Constraint::Length(4), Constraint::Min(3)]).areas(area);

        let tiles = self.tiles();
        let columns = Layout::horizontal(tiles.iter().map(|_| Constraint::Ratio(1, tiles.len() as u32)))
            .split(tiles_area);
        for ((label, value), column) in tiles.iter().zip(columns.iter()) {
            let block = Block::default()
                .title(format!(" {label} "))
                .title_style(theme.title)
                .borders(Borders::ALL)
                .border_style(theme.border);
            let style = if self.loading { theme.hint_desc } else { theme.header };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(value.as_str(), style))).block(block),
                *column,
            );
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|name| ListItem::new(Line::from(Span::raw(name.title()))))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Resources ")
                    .title_style(theme.title)
                    .borders(Borders::ALL)
                    .border_style(theme.border),
            )
            .highlight_style(theme.selected.add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    fn selection(&self) -> Option<usize> {
        Some(self.selected)
    }

    fn load(&mut self, ctx: &mut ViewContext) {
        self.loading = true;
        ctx.spawn("load dashboard", Work::Summary);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select(self.selected + 1),
            KeyCode::Char('k') | KeyCode::Up => self.select(self.selected.saturating_sub(1)),
            KeyCode::Enter => {
                if let Some(name) = self.selected_entry() {
                    ctx.navigate(name);
                }
            }
            KeyCode::Char('n') => {
                self.perform(&Action::Compose, ctx);
            }
            _ => return KeyOutcome::Passthrough,
        }
        KeyOutcome::Consumed
    }

    fn perform(&mut self, action: &Action, ctx: &mut ViewContext) -> bool {
        match action {
            Action::SelectRow(row) => self.select(row.saturating_sub(1)),
            Action::JumpToTop => self.select(0),
            Action::JumpToBottom => self.select(usize::MAX),
            Action::Compose => ctx.push(FormView::compose()),
            _ => return false,
        }
        true
    }

    fn apply(&mut self, _job: &Job, payload: Payload, _ctx: &mut ViewContext) {
        if let Payload::Summary(summary) = payload {
            self.summary = Some(summary);
            self.loading = false;
        }
    }

    fn on_error(&mut self, _job: &Job, _ctx: &mut ViewContext) {
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{JobKind, Target};
    use crate::views::Request;
    use courier_core::GrantIdentity;
    use crossterm::event::KeyModifiers;

    fn ctx() -> ViewContext {
        ViewContext::new(Target::View(ViewName::Dashboard), GrantIdentity::default())
    }

    #[test]
    fn test_enter_navigates_to_selected_resource() {
        let mut view = DashboardView::new();
        let mut ctx = ctx();
        view.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE), &mut ctx);
        view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut ctx);
        assert!(matches!(ctx.requests(), [Request::Navigate(ViewName::Drafts)]));
    }

    #[test]
    fn test_summary_applies() {
        let mut view = DashboardView::new();
        let mut ctx = ctx();
        view.load(&mut ctx);
        let job = Job {
            target: Target::View(ViewName::Dashboard),
            kind: JobKind::Load,
            label: "load dashboard".into(),
            request: 1,
            affects: None,
        };
        let summary = Summary {
            unread_messages: 3,
            ..Summary::default()
        };
        view.apply(&job, Payload::Summary(summary.clone()), &mut ctx);
        assert_eq!(view.summary(), Some(&summary));
        assert_eq!(view.tiles()[0].1, "3 unread / 0");
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut view = DashboardView::new();
        let mut ctx = ctx();
        view.perform(&Action::JumpToBottom, &mut ctx);
        assert_eq!(view.selected_entry(), Some(ViewName::Inbound));
        view.perform(&Action::SelectRow(1), &mut ctx);
        assert_eq!(view.selected_entry(), Some(ViewName::Messages));
    }
}
