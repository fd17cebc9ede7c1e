//! Yes/no confirmation overlay for destructive actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use courier_core::Hint;

use super::{KeyOutcome, View, ViewContext};
use crate::app::{Target, Work};
use crate::theme::Theme;
use crate::ui::popup_area;

/// Asks before running `work`; the result is delivered to `origin`.
#[derive(Debug)]
pub struct ConfirmView {
    prompt: String,
    origin: Target,
    label: String,
    work: Option<Work>,
}

impl ConfirmView {
    pub fn new(prompt: impl Into<String>, origin: Target, label: impl Into<String>, work: Work) -> Self {
        Self {
            prompt: prompt.into(),
            origin,
            label: label.into(),
            work: Some(work),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl View for ConfirmView {
    fn name(&self) -> &str {
        "confirm"
    }

    fn title(&self) -> String {
        "Confirm".to_string()
    }

    fn hints(&self) -> Vec<Hint> {
        vec![Hint::new("y", "Yes"), Hint::new("n", "No")]
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = (self.prompt.chars().count() as u16 + 6).max(30);
        let popup = popup_area(area, width, 5);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme.title)
            .borders(Borders::ALL)
            .border_style(theme.border);

        let text = vec![
            Line::from(self.prompt.as_str()),
            Line::from(vec![
                Span::styled("y", theme.hint_key),
                Span::styled(" yes  ", theme.hint_desc),
                Span::styled("n", theme.hint_key),
                Span::styled(" no", theme.hint_desc),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).alignment(Alignment::Center),
            popup,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                // Runs at most once
                if let Some(work) = self.work.take() {
                    ctx.spawn_for(self.origin, self.label.clone(), work);
                }
                ctx.pop();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                ctx.info("Cancelled");
                ctx.pop();
            }
            _ => return KeyOutcome::Passthrough,
        }
        KeyOutcome::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::Request;
    use courier_core::{GrantIdentity, Mutation, ViewName};
    use crossterm::event::KeyModifiers;

    fn view() -> ConfirmView {
        ConfirmView::new(
            "Delete Ada?",
            Target::View(ViewName::Contacts),
            "delete contacts",
            Work::Mutate {
                resource: ViewName::Contacts,
                id: "ct-1".into(),
                mutation: Mutation::Delete,
            },
        )
    }

    fn press(view: &mut ConfirmView, c: char) -> Vec<Request> {
        let mut ctx = ViewContext::new(Target::Overlay(7), GrantIdentity::default());
        view.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), &mut ctx);
        ctx.into_requests()
    }

    #[test]
    fn test_yes_spawns_for_origin_then_pops() {
        let mut confirm = view();
        let requests = press(&mut confirm, 'y');
        assert!(matches!(
            requests.as_slice(),
            [
                Request::Spawn { target: Target::View(ViewName::Contacts), .. },
                Request::Pop(Target::Overlay(7)),
            ]
        ));

        // A second press cannot run the mutation twice
        let again = press(&mut confirm, 'y');
        assert!(matches!(again.as_slice(), [Request::Pop(_)]));
    }

    #[test]
    fn test_no_cancels() {
        let mut confirm = view();
        let requests = press(&mut confirm, 'n');
        assert!(matches!(requests.as_slice(), [Request::Flash(..), Request::Pop(_)]));
    }
}
