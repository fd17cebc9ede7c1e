//! Generic table view used for every resource.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table, TableState};

use courier_core::{
    Action, FormKind, GrantIdentity, Hint, KernelError, Mutation, Query, Row, ViewName,
};

use super::{ConfirmView, DetailView, FormView, KeyOutcome, View, ViewContext};
use crate::app::{HALF_PAGE_SIZE, Job, JobKind, PAGE_SIZE, Payload, Work};
use crate::theme::Theme;

/// Column headers and percentage widths for a resource.
fn columns(resource: ViewName) -> &'static [(&'static str, u16)] {
    match resource {
        ViewName::Messages => &[("From", 25), ("Subject", 55), ("Received", 20)],
        ViewName::Drafts => &[("To", 35), ("Subject", 45), ("Updated", 20)],
        ViewName::Events => &[("Title", 40), ("When", 35), ("Location", 25)],
        ViewName::Availability => &[("Slot", 50), ("Duration", 25), ("Status", 25)],
        ViewName::Contacts => &[("Name", 35), ("Email", 40), ("Company", 25)],
        ViewName::Webhooks => &[("URL", 50), ("Triggers", 30), ("Status", 20)],
        ViewName::WebhookServer => &[("Received", 30), ("Trigger", 40), ("Object", 30)],
        ViewName::Grants => &[("Email", 45), ("Provider", 20), ("Grant ID", 35)],
        ViewName::Inbound => &[("Inbox", 30), ("Address", 50), ("Messages", 20)],
        ViewName::Dashboard => &[],
    }
}

/// Form used to create and edit records of a resource.
fn form_kind(resource: ViewName) -> Option<FormKind> {
    match resource {
        ViewName::Events => Some(FormKind::Event),
        ViewName::Contacts => Some(FormKind::Contact),
        ViewName::Webhooks => Some(FormKind::Webhook),
        _ => None,
    }
}

fn deletable(resource: ViewName) -> bool {
    matches!(
        resource,
        ViewName::Messages
            | ViewName::Drafts
            | ViewName::Events
            | ViewName::Contacts
            | ViewName::Webhooks
    )
}

/// A selectable table of [`Row`]s for one resource.
#[derive(Debug)]
pub struct ResourceView {
    resource: ViewName,
    rows: Vec<Row>,
    selected: usize,
    filter: String,
    /// Mail folder, messages only.
    folder: Option<String>,
    loading: bool,
    active_grant: String,
}

impl ResourceView {
    pub fn new(resource: ViewName) -> Self {
        Self {
            resource,
            rows: Vec::new(),
            selected: 0,
            filter: String::new(),
            folder: None,
            loading: false,
            active_grant: String::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Index of the selected row.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.rows.len().saturating_sub(1));
    }

    fn move_by(&mut self, delta: isize) {
        let index = self.selected.saturating_add_signed(delta);
        self.select(index);
    }

    /// The selected row, or a warning flash when there is none.
    fn require_selection(&self, action: &Action, ctx: &mut ViewContext) -> Option<Row> {
        let row = self.selected_row().cloned();
        if row.is_none() {
            ctx.warn(KernelError::no_selection(action.verb()).to_string());
        }
        row
    }

    fn mutate(&self, action: &Action, mutation: Mutation, ctx: &mut ViewContext) {
        if let Some(row) = self.require_selection(action, ctx) {
            let label = format!("{} {}", action.verb(), self.resource);
            ctx.spawn(
                label,
                Work::Mutate {
                    resource: self.resource,
                    id: row.id,
                    mutation,
                },
            );
        }
    }

    fn open_detail(&self, ctx: &mut ViewContext) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if self.resource == ViewName::Grants {
            ctx.switch_grant(grant_from_row(row));
            return;
        }
        let labels: Vec<&str> = columns(self.resource).iter().map(|(label, _)| *label).collect();
        ctx.push(DetailView::new(self.resource, row.clone(), &labels));
    }

    fn confirm_delete(&self, ctx: &mut ViewContext) {
        let Some(row) = self.require_selection(&Action::Delete, ctx) else {
            return;
        };
        let subject = row.cells.first().cloned().unwrap_or_else(|| row.id.clone());
        ctx.push(ConfirmView::new(
            format!("Delete {subject}?"),
            ctx.target(),
            format!("delete {}", self.resource),
            Work::Mutate {
                resource: self.resource,
                id: row.id,
                mutation: Mutation::Delete,
            },
        ));
    }

    fn resource_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> Option<Action> {
        let action = match (self.resource, key.code) {
            (ViewName::Messages, KeyCode::Char('s')) => {
                if self.selected_row().is_some_and(|row| row.starred) {
                    Action::Unstar
                } else {
                    Action::Star
                }
            }
            (ViewName::Messages, KeyCode::Char('u')) => {
                if self.selected_row().is_some_and(|row| row.unread) {
                    Action::MarkRead
                } else {
                    Action::MarkUnread
                }
            }
            (ViewName::Messages | ViewName::Drafts, KeyCode::Char('n')) => Action::Compose,
            (ViewName::Messages, KeyCode::Char('R')) => Action::Reply,
            (ViewName::Messages, KeyCode::Char('A')) => Action::ReplyAll,
            (ViewName::Messages, KeyCode::Char('F')) => Action::Forward,
            (ViewName::Events | ViewName::Contacts | ViewName::Webhooks, KeyCode::Char('n')) => {
                Action::Create
            }
            (ViewName::Events | ViewName::Contacts | ViewName::Webhooks, KeyCode::Char('e')) => {
                Action::Edit
            }
            (ViewName::Webhooks, KeyCode::Char('t')) => Action::TestWebhook,
            _ => return None,
        };
        self.perform(&action, ctx);
        Some(action)
    }
}

fn grant_from_row(row: &Row) -> GrantIdentity {
    let cell = |index: usize| row.cells.get(index).cloned().unwrap_or_default();
    GrantIdentity::new(row.id.clone(), cell(0), cell(1))
}

impl View for ResourceView {
    fn name(&self) -> &str {
        self.resource.as_str()
    }

    fn title(&self) -> String {
        let mut title = self.resource.title().to_string();
        if let Some(folder) = &self.folder {
            title.push_str(&format!(" [{folder}]"));
        }
        title.push_str(&format!(" ({})", self.rows.len()));
        if !self.filter.is_empty() {
            title.push_str(&format!(" /{}", self.filter));
        }
        title
    }

    fn hints(&self) -> Vec<Hint> {
        let mut hints = vec![Hint::new("j/k", "Move")];
        match self.resource {
            ViewName::Grants => hints.push(Hint::new("enter", "Switch")),
            _ => hints.push(Hint::new("enter", "Open")),
        }
        match self.resource {
            ViewName::Messages => hints.extend([
                Hint::new("n", "Compose"),
                Hint::new("R", "Reply"),
                Hint::new("s", "Star"),
                Hint::new("u", "Read/Unread"),
                Hint::new("x", "Archive"),
            ]),
            ViewName::Events | ViewName::Contacts => {
                hints.extend([Hint::new("n", "New"), Hint::new("e", "Edit")]);
            }
            ViewName::Webhooks => hints.extend([
                Hint::new("n", "New"),
                Hint::new("e", "Edit"),
                Hint::new("t", "Test"),
            ]),
            _ => {}
        }
        if deletable(self.resource) {
            hints.push(Hint::new("dd", "Delete"));
        }
        hints.extend([
            Hint::new("/", "Filter"),
            Hint::new("r", "Refresh"),
            Hint::new(":", "Command"),
            Hint::new("?", "Help"),
        ]);
        hints
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(format!(" {} ", self.title()))
            .title_style(theme.title)
            .borders(Borders::ALL)
            .border_style(theme.border);

        if self.rows.is_empty() {
            let text = if self.loading {
                "Loading…".to_string()
            } else {
                format!("No {}", self.resource.title().to_lowercase())
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(text, theme.hint_desc)))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let cols = columns(self.resource);
        let flagged = matches!(self.resource, ViewName::Messages | ViewName::Grants);

        let mut widths = Vec::with_capacity(cols.len() + 1);
        let mut header = Vec::with_capacity(cols.len() + 1);
        if flagged {
            widths.push(Constraint::Length(3));
            header.push(Cell::from(""));
        }
        widths.extend(cols.iter().map(|(_, pct)| Constraint::Percentage(*pct)));
        header.extend(cols.iter().map(|(label, _)| Cell::from(*label)));

        let rows = self.rows.iter().map(|row| {
            let mut cells = Vec::with_capacity(row.cells.len() + 1);
            match self.resource {
                ViewName::Messages => {
                    let star = if row.starred { "★" } else { " " };
                    let dot = if row.unread { "●" } else { " " };
                    cells.push(Cell::from(Span::styled(format!("{star}{dot}"), theme.starred)));
                }
                ViewName::Grants => {
                    let marker = if row.id == self.active_grant { "●" } else { " " };
                    cells.push(Cell::from(Span::styled(marker, theme.starred)));
                }
                _ => {}
            }
            cells.extend(row.cells.iter().map(|cell| Cell::from(cell.as_str())));
            let table_row = TableRow::new(cells);
            if row.unread {
                table_row.style(theme.unread)
            } else {
                table_row
            }
        });

        let table = Table::new(rows, widths)
            .header(TableRow::new(header).style(theme.table_header))
            .block(block)
            .row_highlight_style(theme.selected);

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn selection(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.selected)
    }

    fn load(&mut self, ctx: &mut ViewContext) {
        self.loading = true;
        self.active_grant = ctx.grant().id.clone();
        let query = Query {
            filter: self.filter.clone(),
            folder: self.folder.clone(),
        };
        ctx.spawn(
            format!("load {}", self.resource),
            Work::List {
                resource: self.resource,
                query,
            },
        );
    }

    fn filter(&mut self, text: &str) {
        let text = text.trim();
        if text != self.filter {
            self.filter = text.to_string();
            self.selected = 0;
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j') | KeyCode::Down, _) => self.move_by(1),
            (KeyCode::Char('k') | KeyCode::Up, _) => self.move_by(-1),
            (KeyCode::Home, _) => self.select(0),
            (KeyCode::End, _) => self.select(usize::MAX),
            (KeyCode::PageDown, _) => self.move_by(PAGE_SIZE as isize),
            (KeyCode::PageUp, _) => self.move_by(-(PAGE_SIZE as isize)),
            (KeyCode::Enter, _) => self.open_detail(ctx),
            (_, modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyOutcome::Passthrough;
            }
            _ => {
                if self.resource_key(key, ctx).is_none() {
                    return KeyOutcome::Passthrough;
                }
            }
        }
        KeyOutcome::Consumed
    }

    fn perform(&mut self, action: &Action, ctx: &mut ViewContext) -> bool {
        let messages = self.resource == ViewName::Messages;
        match action {
            Action::SelectRow(row) => {
                if !self.rows.is_empty() {
                    self.select(row.saturating_sub(1));
                }
            }
            Action::JumpToTop => self.select(0),
            Action::JumpToBottom => self.select(usize::MAX),
            Action::HalfPageDown => self.move_by(HALF_PAGE_SIZE as isize),
            Action::HalfPageUp => self.move_by(-(HALF_PAGE_SIZE as isize)),
            Action::PageDown => self.move_by(PAGE_SIZE as isize),
            Action::PageUp => self.move_by(-(PAGE_SIZE as isize)),

            Action::Delete if deletable(self.resource) => self.confirm_delete(ctx),
            Action::Star if messages => self.mutate(action, Mutation::Star(true), ctx),
            Action::Unstar if messages => self.mutate(action, Mutation::Star(false), ctx),
            Action::MarkRead if messages => self.mutate(action, Mutation::Read(true), ctx),
            Action::MarkUnread if messages => self.mutate(action, Mutation::Read(false), ctx),
            Action::Archive if messages => self.mutate(action, Mutation::Archive, ctx),
            Action::Rsvp(answer) if self.resource == ViewName::Events => {
                self.mutate(action, Mutation::Rsvp(*answer), ctx);
            }
            Action::TestWebhook if self.resource == ViewName::Webhooks => {
                self.mutate(action, Mutation::Test, ctx);
            }

            Action::Compose => ctx.push(FormView::compose()),
            Action::Reply | Action::ReplyAll | Action::Forward if messages => {
                if let Some(row) = self.require_selection(action, ctx) {
                    let form = match action {
                        Action::Forward => FormView::forward(&row),
                        _ => FormView::reply(&row, *action == Action::ReplyAll),
                    };
                    ctx.push(form);
                }
            }
            Action::Create => match form_kind(self.resource) {
                Some(kind) => ctx.push(FormView::create(kind)),
                None if messages => ctx.push(FormView::compose()),
                None => return false,
            },
            Action::Edit => {
                let Some(kind) = form_kind(self.resource) else {
                    return false;
                };
                if let Some(row) = self.require_selection(action, ctx) {
                    ctx.push(FormView::edit(kind, &row));
                }
            }
            Action::OpenFolder(folder) if messages => {
                self.folder = Some(folder.clone());
                self.selected = 0;
                self.load(ctx);
            }
            _ => return false,
        }
        true
    }

    fn escape(&mut self, ctx: &mut ViewContext) -> bool {
        if self.filter.is_empty() {
            return false;
        }
        self.filter.clear();
        self.refresh(ctx);
        true
    }

    fn apply(&mut self, job: &Job, payload: Payload, ctx: &mut ViewContext) {
        match payload {
            Payload::Rows(rows) => {
                self.rows = rows;
                self.loading = false;
                self.select(self.selected);
            }
            Payload::Done(message) => {
                ctx.info(message);
                if job.kind != JobKind::Load {
                    self.load(ctx);
                }
            }
            Payload::Summary(_) => {}
        }
    }

    fn on_error(&mut self, job: &Job, _ctx: &mut ViewContext) {
        if job.kind == JobKind::Load {
            self.loading = false;
        }
    }
}

impl ResourceView {
    /// Deliver rows directly, as a completed load would.
    #[cfg(test)]
    pub(crate) fn with_rows(resource: ViewName, rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::new(resource)
        }
    }
}
