//! Multi-field form overlay for composing messages and editing records.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use courier_core::{FormKind, FormSubmission, Hint, Row};

use super::{KeyOutcome, View, ViewContext};
use crate::app::{InputResult, InputState, Job, Payload, Work};
use crate::theme::Theme;
use crate::ui::popup_area;

fn labels(kind: FormKind) -> &'static [&'static str] {
    match kind {
        FormKind::Message => &["To", "Cc", "Subject", "Body"],
        FormKind::Event => &["Title", "When", "Location", "Description"],
        FormKind::Contact => &["Name", "Email", "Company", "Phone"],
        FormKind::Webhook => &["URL", "Triggers", "Description"],
    }
}

/// A stack of labelled single-line inputs.
#[derive(Debug)]
pub struct FormView {
    kind: FormKind,
    title: String,
    /// Record being edited.
    id: Option<String>,
    fields: Vec<(&'static str, InputState)>,
    focus: usize,
    submitting: bool,
}

impl FormView {
    fn blank(kind: FormKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            id: None,
            fields: labels(kind)
                .iter()
                .map(|label| (*label, InputState::new()))
                .collect(),
            focus: 0,
            submitting: false,
        }
    }

    fn with_value(mut self, label: &str, value: &str) -> Self {
        if let Some((_, input)) = self.fields.iter_mut().find(|(name, _)| *name == label) {
            input.set(value);
        }
        self
    }

    /// A new, empty message.
    pub fn compose() -> Self {
        Self::blank(FormKind::Message, "Compose")
    }

    /// A reply to `row`, optionally copying the other recipients.
    pub fn reply(row: &Row, all: bool) -> Self {
        let from = row
            .detail("From")
            .or_else(|| row.cells.first().map(String::as_str))
            .unwrap_or_default();
        let form = Self::blank(FormKind::Message, if all { "Reply all" } else { "Reply" })
            .with_value("To", from)
            .with_value("Subject", &prefixed("Re: ", subject(row)))
            .with_value("Body", &quote(row));
        match (all, row.detail("To")) {
            (true, Some(others)) => form.with_value("Cc", others),
            _ => form,
        }
    }

    /// A forward of `row` with an empty recipient.
    pub fn forward(row: &Row) -> Self {
        Self::blank(FormKind::Message, "Forward")
            .with_value("Subject", &prefixed("Fwd: ", subject(row)))
            .with_value("Body", &quote(row))
    }

    /// A new record of `kind`.
    pub fn create(kind: FormKind) -> Self {
        Self::blank(kind, format!("New {kind}"))
    }

    /// Edit `row`, prefilled from its detail fields or cells.
    pub fn edit(kind: FormKind, row: &Row) -> Self {
        let mut form = Self::blank(kind, format!("Edit {kind}"));
        for (index, label) in labels(kind).iter().enumerate() {
            let value = row
                .detail(label)
                .or_else(|| row.cells.get(index).map(String::as_str))
                .unwrap_or_default();
            form = form.with_value(label, value);
        }
        form.id = Some(row.id.clone());
        form
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Current value of a field.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, input)| input.buffer())
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn submission(&self) -> FormSubmission {
        FormSubmission {
            kind: self.kind,
            id: self.id.clone(),
            fields: self
                .fields
                .iter()
                .map(|(label, input)| (label.to_string(), input.buffer().trim().to_string()))
                .collect(),
        }
    }

    fn submit(&mut self, ctx: &mut ViewContext) {
        if self.submitting {
            return;
        }
        let Some((label, first)) = self.fields.first() else {
            return;
        };
        if first.buffer().trim().is_empty() {
            ctx.warn(format!("{label} is required"));
            self.focus = 0;
            return;
        }
        self.submitting = true;
        let verb = match self.kind {
            FormKind::Message => "send message".to_string(),
            kind if self.id.is_some() => format!("update {kind}"),
            kind => format!("create {kind}"),
        };
        ctx.spawn(verb, Work::Submit(self.submission()));
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }
}

fn subject(row: &Row) -> &str {
    row.detail("Subject")
        .or_else(|| row.cells.get(1).map(String::as_str))
        .unwrap_or_default()
}

fn prefixed(prefix: &str, subject: &str) -> String {
    if subject.starts_with(prefix) {
        subject.to_string()
    } else {
        format!("{prefix}{subject}")
    }
}

/// Single-line quote of the original body.
fn quote(row: &Row) -> String {
    match row.detail("Body") {
        Some(body) if !body.is_empty() => {
            let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("> {flat}")
        }
        _ => String::new(),
    }
}

impl View for FormView {
    fn name(&self) -> &str {
        "form"
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn hints(&self) -> Vec<Hint> {
        vec![
            Hint::new("tab", "Next field"),
            Hint::new("shift-tab", "Previous"),
            Hint::new("ctrl-s", "Submit"),
            Hint::new("esc", "Cancel"),
        ]
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let height = self.fields.len() as u16 * 2 + 3;
        let popup = popup_area(area, 72, height);
        frame.render_widget(Clear, popup);

        let title = if self.submitting {
            format!(" {} (sending…) ", self.title)
        } else {
            format!(" {} ", self.title)
        };
        let block = Block::default()
            .title(title)
            .title_style(theme.title)
            .borders(Borders::ALL)
            .border_style(theme.border);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let width = labels(self.kind).iter().map(|l| l.len()).max().unwrap_or(0);
        let rows = Layout::vertical(self.fields.iter().map(|_| Constraint::Length(2))).split(inner);

        for (index, ((label, input), row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            let focused = index == self.focus;
            let label_style = if focused {
                theme.hint_key.add_modifier(Modifier::BOLD)
            } else {
                theme.hint_desc
            };
            let mut spans = vec![Span::styled(format!("{label:>width$}: "), label_style)];
            if focused {
                let (before, at, after) = input.split_at_cursor();
                spans.push(Span::styled(before.to_string(), theme.prompt_input));
                spans.push(Span::styled(at.unwrap_or(' ').to_string(), theme.cursor));
                spans.push(Span::styled(after.to_string(), theme.prompt_input));
            } else {
                spans.push(Span::raw(input.buffer().to_string()));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), *row);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match (key.code, key.modifiers) {
            (KeyCode::Tab, _) | (KeyCode::Down, _) => self.move_focus(1),
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => self.move_focus(-1),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.submit(ctx),
            (KeyCode::Esc, _) => return KeyOutcome::Passthrough,
            _ => {
                let Some((_, input)) = self.fields.get_mut(self.focus) else {
                    return KeyOutcome::Passthrough;
                };
                match input.handle_key(key) {
                    InputResult::Submit(_) if self.focus + 1 == self.fields.len() => self.submit(ctx),
                    InputResult::Submit(_) => self.move_focus(1),
                    InputResult::Cancel => return KeyOutcome::Passthrough,
                    InputResult::Continue | InputResult::Changed => {}
                }
            }
        }
        KeyOutcome::Consumed
    }

    fn apply(&mut self, _job: &Job, payload: Payload, ctx: &mut ViewContext) {
        if let Payload::Done(message) = payload {
            ctx.info(message);
            ctx.pop();
            ctx.refresh_view(self.kind.resource());
        }
    }

    fn on_error(&mut self, _job: &Job, _ctx: &mut ViewContext) {
        // Keep the input for a retry
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{JobKind, Target};
    use crate::views::Request;
    use courier_core::{GrantIdentity, ViewName};

    fn ctx() -> ViewContext {
        ViewContext::new(Target::Overlay(3), GrantIdentity::default())
    }

    fn type_str(form: &mut FormView, ctx: &mut ViewContext, text: &str) {
        for c in text.chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), ctx);
        }
    }

    fn message() -> Row {
        Row::new("msg-1", vec!["ada@example.com".into(), "Lunch".into()]).with_details(vec![
            ("From".into(), "ada@example.com".into()),
            ("To".into(), "me@example.com, bob@example.com".into()),
            ("Subject".into(), "Lunch".into()),
            ("Body".into(), "Are we\nstill on?".into()),
        ])
    }

    #[test]
    fn test_reply_prefills() {
        let form = FormView::reply(&message(), false);
        assert_eq!(form.value("To"), Some("ada@example.com"));
        assert_eq!(form.value("Subject"), Some("Re: Lunch"));
        assert_eq!(form.value("Body"), Some("> Are we still on?"));
        assert_eq!(form.value("Cc"), Some(""));

        let all = FormView::reply(&message(), true);
        assert_eq!(all.value("Cc"), Some("me@example.com, bob@example.com"));
    }

    #[test]
    fn test_forward_keeps_existing_prefix() {
        let mut row = message();
        row.details[2].1 = "Fwd: Lunch".into();
        let form = FormView::forward(&row);
        assert_eq!(form.value("Subject"), Some("Fwd: Lunch"));
        assert_eq!(form.value("To"), Some(""));
    }

    #[test]
    fn test_edit_prefills_from_cells() {
        let row = Row::new("ct-2", vec!["Ada".into(), "ada@example.com".into(), "ACME".into()]);
        let form = FormView::edit(FormKind::Contact, &row);
        assert_eq!(form.value("Company"), Some("ACME"));
        assert_eq!(form.submission().id.as_deref(), Some("ct-2"));
    }

    #[test]
    fn test_required_first_field() {
        let mut form = FormView::create(FormKind::Contact);
        let mut ctx = ctx();
        form.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut ctx);
        assert!(!form.is_submitting());
        assert!(matches!(
            ctx.requests(),
            [Request::Flash(crate::app::FlashLevel::Warn, message)] if message == "Name is required"
        ));
    }

    #[test]
    fn test_enter_advances_then_submits_once() {
        let mut form = FormView::create(FormKind::Webhook);
        let mut ctx = ctx();
        type_str(&mut form, &mut ctx, "https://example.com/hook");
        form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut ctx);
        assert_eq!(form.focus(), 1);
        form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut ctx);
        form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut ctx);
        assert!(form.is_submitting());
        form.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut ctx);

        let spawns = ctx
            .requests()
            .iter()
            .filter(|request| matches!(request, Request::Spawn { .. }))
            .count();
        assert_eq!(spawns, 1);
    }

    #[test]
    fn test_success_pops_and_refreshes_origin() {
        let mut form = FormView::create(FormKind::Event);
        let mut ctx = ctx();
        let job = Job {
            target: Target::Overlay(3),
            kind: JobKind::Submit,
            label: "create event".into(),
            request: 1,
            affects: Some(ViewName::Events),
        };
        form.apply(&job, Payload::Done("Created event".into()), &mut ctx);
        assert!(matches!(
            ctx.requests(),
            [Request::Flash(..), Request::Pop(_), Request::Refresh(ViewName::Events)]
        ));
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut form = FormView::create(FormKind::Event);
        let mut ctx = ctx();
        type_str(&mut form, &mut ctx, "Standup");
        form.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut ctx);
        assert!(form.is_submitting());
        let job = Job {
            target: Target::Overlay(3),
            kind: JobKind::Submit,
            label: "create event".into(),
            request: 1,
            affects: Some(ViewName::Events),
        };
        form.on_error(&job, &mut ctx);
        assert!(!form.is_submitting());
        assert_eq!(form.value("Title"), Some("Standup"));
    }
}
