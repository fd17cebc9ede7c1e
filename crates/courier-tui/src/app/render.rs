//! Application rendering.

use itertools::Itertools;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use courier_core::Hint;

use super::App;
use super::input::InputState;
use super::state::Mode;
use crate::theme::Theme;
use crate::ui::{AppLayout, truncate};

impl App {
    /// Height of the prompt or palette area.
    fn input_height(&self) -> u16 {
        match self.state.mode {
            Mode::Normal => 0,
            Mode::CommandPrompt | Mode::FilterPrompt => 1,
            // Border, input line and one line per suggestion
            Mode::Palette => self.palette.suggestions().len() as u16 + 3,
        }
    }

    pub(super) fn render(&self, frame: &mut Frame) {
        let layout = AppLayout::new(frame.area(), self.input_height());

        self.render_header(frame, layout.header);
        self.render_crumbs(frame, layout.crumbs);
        self.render_content(frame, layout.content);
        if let Some(area) = layout.input {
            match self.state.mode {
                Mode::Palette => self.render_palette(frame, area),
                _ => self.render_prompt(frame, area),
            }
        }
        self.render_flash(frame, layout.flash);
        self.render_hints(frame, layout.hints);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let status = &self.state.status;

        let mut spans = vec![
            Span::styled(" courier ", theme.title.add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {} ", status.grant), theme.header),
            Span::styled(format!(" {} ", status.clock), theme.hint_desc),
            Span::styled(format!(" {} ", status.refresh_label()), theme.hint_desc),
        ];
        let in_flight = self.scheduler.in_flight();
        if in_flight > 0 {
            spans.push(Span::styled(
                format!(" ⟳ {in_flight} "),
                Style::default().fg(theme.info),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_crumbs(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let names = self.stack.names();
        let last = names.len().saturating_sub(1);

        let mut spans: Vec<Span> = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let style = if index == last {
                    theme.crumb_active
                } else {
                    theme.crumb
                };
                Span::styled(format!(" <{name}> "), style)
            })
            .collect();

        if let Some(row) = self.top_view().and_then(|view| view.selection()) {
            spans.push(Span::styled(format!(" #{} ", row + 1), theme.hint_desc));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        // The home surface stays visible under popup overlays
        if let Some(base) = self.stack.base() {
            if let Some(view) = self.surface_view(&base.surface) {
                view.render(frame, area, &self.theme);
            }
        }
        if self.stack.len() > 1 {
            if let Some(view) = self.top_view() {
                view.render(frame, area, &self.theme);
            }
        }
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let symbol = self.prompt.kind().symbol();
        let mut spans = vec![Span::styled(symbol.to_string(), self.theme.prompt)];
        spans.extend(input_spans(self.prompt.input(), &self.theme));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_palette(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let title = match self.palette.parent() {
            Some(parent) => format!(" {parent} "),
            None => " Commands ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme.title)
            .borders(Borders::TOP)
            .border_style(theme.border);
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let mut input = vec![Span::styled(":", theme.prompt)];
        input.extend(input_spans(self.palette.input(), theme));
        let input_area = Rect { height: 1, ..inner };
        frame.render_widget(Paragraph::new(Line::from(input)), input_area);

        let width = inner.width as usize;
        let items: Vec<ListItem> = self
            .palette
            .suggestions()
            .iter()
            .enumerate()
            .map(|(index, suggestion)| {
                let style = if index == self.palette.selected() {
                    theme.suggestion_selected
                } else {
                    theme.suggestion
                };
                let mut label = suggestion.label.clone();
                if suggestion.has_sub_commands {
                    label.push('…');
                }
                let aliases = if suggestion.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", suggestion.aliases)
                };
                let text = format!("{label:<18}{aliases:<22} {}", suggestion.description);
                ListItem::new(Line::from(Span::styled(truncate(&text, width), style)))
            })
            .collect();
        let list_area = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        frame.render_widget(List::new(items), list_area);
    }

    fn render_flash(&self, frame: &mut Frame, area: Rect) {
        let Some(flash) = &self.state.flash else {
            return;
        };
        let style = Style::default().fg(self.theme.flash_color(flash.level));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {}", flash.message), style))),
            area,
        );
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.state.mode {
            Mode::Normal => self.hints(),
            Mode::Palette => vec![
                Hint::new("enter", "Run"),
                Hint::new("tab", "Complete"),
                Hint::new("↑/↓", "Select"),
                Hint::new("esc", "Cancel"),
            ],
            Mode::CommandPrompt | Mode::FilterPrompt => {
                vec![Hint::new("enter", "Apply"), Hint::new("esc", "Cancel")]
            }
        };
        let spans = hints
            .iter()
            .flat_map(|hint| {
                [
                    Span::styled(format!(" {} ", hint.key), self.theme.hint_key),
                    Span::styled(format!("{}  ", hint.description), self.theme.hint_desc),
                ]
            })
            .collect_vec();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn input_spans<'a>(input: &'a InputState, theme: &Theme) -> Vec<Span<'a>> {
    let (before, at, after) = input.split_at_cursor();
    vec![
        Span::styled(before, theme.prompt_input),
        Span::styled(at.unwrap_or(' ').to_string(), theme.cursor),
        Span::styled(after, theme.prompt_input),
    ]
}
