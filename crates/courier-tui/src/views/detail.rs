//! Read-only detail overlay for a single record.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use courier_core::{Action, Hint, Row, ViewName};

use super::{FormView, KeyOutcome, View, ViewContext};
use crate::theme::Theme;

/// Labelled fields of one [`Row`].
#[derive(Debug)]
pub struct DetailView {
    resource: ViewName,
    row: Row,
    fields: Vec<(String, String)>,
    scroll: u16,
}

impl DetailView {
    /// Show `row`. Falls back to pairing `columns` with the row's cells when
    /// the row carries no detail fields.
    pub fn new(resource: ViewName, row: Row, columns: &[&str]) -> Self {
        let fields = if row.details.is_empty() {
            columns
                .iter()
                .zip(&row.cells)
                .map(|(label, value)| (label.to_string(), value.clone()))
                .collect()
        } else {
            row.details.clone()
        };
        Self {
            resource,
            row,
            fields,
            scroll: 0,
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl View for DetailView {
    fn name(&self) -> &str {
        "detail"
    }

    fn title(&self) -> String {
        let heading = match self.resource {
            ViewName::Messages | ViewName::Drafts => self.row.detail("Subject"),
            _ => None,
        };
        heading
            .or_else(|| self.row.cells.first().map(String::as_str))
            .unwrap_or(self.row.id.as_str())
            .to_string()
    }

    fn hints(&self) -> Vec<Hint> {
        let mut hints = vec![Hint::new("j/k", "Scroll")];
        if self.resource == ViewName::Messages {
            hints.extend([
                Hint::new("R", "Reply"),
                Hint::new("A", "Reply all"),
                Hint::new("F", "Forward"),
            ]);
        }
        hints.push(Hint::new("esc", "Back"));
        hints
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = self
            .fields
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(self.fields.len());
        for (label, value) in &self.fields {
            let mut values = value.lines();
            let first = values.next().unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(format!("{label:>width$}  "), theme.hint_key),
                Span::raw(first.to_string()),
            ]));
            // Continuation lines of multi-line values (message bodies)
            for rest in values {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(width + 2)),
                    Span::raw(rest.to_string()),
                ]));
            }
        }

        let block = Block::default()
            .title(format!(" {} ", self.title()))
            .title_style(theme.title)
            .borders(Borders::ALL)
            .border_style(theme.border);

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('R') => return outcome(self.perform(&Action::Reply, ctx)),
            KeyCode::Char('A') => return outcome(self.perform(&Action::ReplyAll, ctx)),
            KeyCode::Char('F') => return outcome(self.perform(&Action::Forward, ctx)),
            _ => return KeyOutcome::Passthrough,
        }
        KeyOutcome::Consumed
    }

    fn perform(&mut self, action: &Action, ctx: &mut ViewContext) -> bool {
        match action {
            Action::JumpToTop => self.scroll = 0,
            Action::Reply | Action::ReplyAll if self.resource == ViewName::Messages => {
                ctx.push(FormView::reply(&self.row, *action == Action::ReplyAll));
            }
            Action::Forward if self.resource == ViewName::Messages => {
                ctx.push(FormView::forward(&self.row));
            }
            _ => return false,
        }
        true
    }
}

fn outcome(performed: bool) -> KeyOutcome {
    if performed {
        KeyOutcome::Consumed
    } else {
        KeyOutcome::Passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Target;
    use crate::views::Request;
    use courier_core::GrantIdentity;

    #[test]
    fn test_fields_fall_back_to_columns() {
        let row = Row::new("ct-1", vec!["Ada".into(), "ada@example.com".into()]);
        let view = DetailView::new(ViewName::Contacts, row, &["Name", "Email", "Company"]);
        assert_eq!(
            view.fields(),
            &[
                ("Name".to_string(), "Ada".to_string()),
                ("Email".to_string(), "ada@example.com".to_string()),
            ]
        );
        assert_eq!(view.title(), "Ada");
    }

    #[test]
    fn test_reply_only_for_messages() {
        let row = Row::new("ct-1", vec!["Ada".into()]);
        let mut view = DetailView::new(ViewName::Contacts, row, &["Name"]);
        let mut ctx = ViewContext::new(Target::Overlay(1), GrantIdentity::default());
        assert!(!view.perform(&Action::Reply, &mut ctx));

        let message = Row::new("msg-1", vec!["bob@example.com".into(), "Hi".into()]);
        let mut view = DetailView::new(ViewName::Messages, message, &["From", "Subject"]);
        assert!(view.perform(&Action::Reply, &mut ctx));
        assert!(matches!(ctx.requests(), [Request::Push(_)]));
    }
}
