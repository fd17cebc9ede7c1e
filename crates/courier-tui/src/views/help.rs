//! Help overlay: global key bindings and the command reference.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};

use courier_core::{CommandRegistry, Hint, resolves};

use super::{KeyOutcome, View, ViewContext};
use crate::event::get_help_sections;
use crate::theme::Theme;
use crate::ui::{popup_area, truncate};

#[derive(Debug, Clone)]
struct HelpEntry {
    keys: String,
    description: String,
    /// Command run on Enter.
    command: Option<String>,
}

#[derive(Debug, Clone)]
struct HelpPage {
    title: String,
    /// Section headings interleaved with entries.
    lines: Vec<HelpLine>,
}

#[derive(Debug, Clone)]
enum HelpLine {
    Heading(&'static str),
    Entry(HelpEntry),
}

/// Tabbed help. The first page lists key bindings, the rest list commands
/// by category.
#[derive(Debug)]
pub struct HelpView {
    pages: Vec<HelpPage>,
    page: usize,
    selected: usize,
}

impl HelpView {
    pub fn new(registry: &CommandRegistry) -> Self {
        let keys = HelpPage {
            title: "Keys".to_string(),
            lines: get_help_sections()
                .into_iter()
                .flat_map(|section| {
                    std::iter::once(HelpLine::Heading(section.title)).chain(
                        section.bindings.into_iter().map(|binding| {
                            HelpLine::Entry(HelpEntry {
                                keys: binding.keys.to_string(),
                                description: binding.description.to_string(),
                                command: None,
                            })
                        }),
                    )
                })
                .collect(),
        };

        let commands = registry.by_category().into_iter().map(|group| {
            let mut lines = Vec::new();
            for command in group.commands {
                let mut keys = command.name.clone();
                if !command.aliases.is_empty() {
                    keys.push_str(&format!(" ({})", command.display_aliases()));
                }
                let runnable = resolves(registry, &command.name);
                let description = match command.shortcut {
                    Some(shortcut) => format!("{} [{shortcut}]", command.description),
                    None => command.description.clone(),
                };
                lines.push(HelpLine::Entry(HelpEntry {
                    keys,
                    description,
                    command: runnable.then(|| command.name.clone()),
                }));
                for sub in registry.sub_commands(&command.name) {
                    lines.push(HelpLine::Entry(HelpEntry {
                        keys: format!("  {}", sub.name),
                        description: sub.description.clone(),
                        command: Some(sub.name.clone()),
                    }));
                }
            }
            HelpPage {
                title: group.category.to_string(),
                lines,
            }
        });

        let mut view = Self {
            pages: std::iter::once(keys).chain(commands).collect(),
            page: 0,
            selected: 0,
        };
        view.selected = view.first_entry();
        view
    }

    pub fn page_titles(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.title.as_str()).collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    fn lines(&self) -> &[HelpLine] {
        self.pages
            .get(self.page)
            .map(|page| page.lines.as_slice())
            .unwrap_or_default()
    }

    fn first_entry(&self) -> usize {
        self.lines()
            .iter()
            .position(|line| matches!(line, HelpLine::Entry(_)))
            .unwrap_or(0)
    }

    fn switch_page(&mut self, delta: isize) {
        let len = self.pages.len() as isize;
        if len == 0 {
            return;
        }
        self.page = (self.page as isize + delta).rem_euclid(len) as usize;
        self.selected = self.first_entry();
    }

    /// Move to the next entry in `delta`'s direction, skipping headings.
    fn move_selection(&mut self, delta: isize) {
        let lines = self.lines();
        let mut index = self.selected as isize;
        loop {
            index += delta;
            if index < 0 || index >= lines.len() as isize {
                return;
            }
            if matches!(lines[index as usize], HelpLine::Entry(_)) {
                self.selected = index as usize;
                return;
            }
        }
    }

    /// Command behind the selected entry, if it can be run.
    pub fn selected_command(&self) -> Option<&str> {
        match self.lines().get(self.selected) {
            Some(HelpLine::Entry(entry)) => entry.command.as_deref(),
            _ => None,
        }
    }
}

impl View for HelpView {
    fn name(&self) -> &str {
        "help"
    }

    fn title(&self) -> String {
        "Help".to_string()
    }

    fn hints(&self) -> Vec<Hint> {
        vec![
            Hint::new("tab", "Next page"),
            Hint::new("j/k", "Move"),
            Hint::new("enter", "Run command"),
            Hint::new("esc", "Close"),
        ]
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = popup_area(area, 80, 30);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Help ")
            .title_style(theme.title)
            .borders(Borders::ALL)
            .border_style(theme.border);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [tabs_area, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);

        let tabs = Tabs::new(self.page_titles())
            .select(self.page)
            .style(theme.hint_desc)
            .highlight_style(theme.crumb_active);
        frame.render_widget(tabs, tabs_area);

        let key_width = 28usize.min(body.width as usize / 2);
        let lines: Vec<Line> = self
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| match line {
                HelpLine::Heading(title) => Line::from(Span::styled(
                    *title,
                    Style::default().fg(theme.info).add_modifier(Modifier::BOLD),
                )),
                HelpLine::Entry(entry) => {
                    let keys = truncate(&entry.keys, key_width);
                    let line = Line::from(vec![
                        Span::styled(format!("{keys:>key_width$}"), theme.hint_key),
                        Span::styled(format!("  {}", entry.description), theme.hint_desc),
                    ]);
                    if index == self.selected {
                        line.style(theme.selected)
                    } else {
                        line
                    }
                }
            })
            .collect();

        // Keep the selection in view
        let visible = body.height as usize;
        let offset = self.selected.saturating_sub(visible.saturating_sub(1));
        frame.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), body);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext) -> KeyOutcome {
        match key.code {
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => self.switch_page(1),
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => self.switch_page(-1),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Enter => {
                if let Some(command) = self.selected_command().map(str::to_string) {
                    ctx.pop();
                    ctx.execute(command);
                }
            }
            KeyCode::Char('q') | KeyCode::Char('?') => ctx.pop(),
            _ => return KeyOutcome::Passthrough,
        }
        KeyOutcome::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Target;
    use crate::views::Request;
    use courier_core::GrantIdentity;
    use crossterm::event::KeyModifiers;

    fn press(view: &mut HelpView, code: KeyCode) -> Vec<Request> {
        let mut ctx = ViewContext::new(Target::Overlay(1), GrantIdentity::default());
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &mut ctx);
        ctx.into_requests()
    }

    #[test]
    fn test_pages_follow_categories() {
        let view = HelpView::new(&CommandRegistry::with_defaults());
        let titles = view.page_titles();
        assert_eq!(titles[0], "Keys");
        assert_eq!(titles[1], "Navigation");
        assert!(titles.contains(&"Vim Commands"));
    }

    #[test]
    fn test_key_page_has_no_commands() {
        let mut view = HelpView::new(&CommandRegistry::with_defaults());
        assert_eq!(view.selected_command(), None);
        assert!(press(&mut view, KeyCode::Enter).is_empty());
    }

    #[test]
    fn test_enter_runs_selected_command() {
        let mut view = HelpView::new(&CommandRegistry::with_defaults());
        press(&mut view, KeyCode::Tab);
        assert_eq!(view.page(), 1);
        let command = view.selected_command().map(str::to_string);
        assert!(command.is_some());

        let requests = press(&mut view, KeyCode::Enter);
        assert!(matches!(
            requests.as_slice(),
            [Request::Pop(_), Request::Execute(run)] if Some(run) == command.as_ref()
        ));
    }

    #[test]
    fn test_back_tab_wraps() {
        let mut view = HelpView::new(&CommandRegistry::with_defaults());
        press(&mut view, KeyCode::BackTab);
        assert_eq!(view.page(), view.page_titles().len() - 1);
    }
}
