//! Layout helpers shared by the chrome and the views.

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas, top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub crumbs: Rect,
    pub content: Rect,
    /// Prompt line or palette, when one is open.
    pub input: Option<Rect>,
    pub flash: Rect,
    pub hints: Rect,
}

impl AppLayout {
    /// Compute layout from the terminal area. `input_height` is zero when no
    /// prompt or palette is open.
    pub fn new(area: Rect, input_height: u16) -> Self {
        let [header, crumbs, content, input, flash, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(input_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Self {
            header,
            crumbs,
            content,
            input: (input_height > 0).then_some(input),
            flash,
            hints,
        }
    }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Truncate `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_without_input() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24), 0);
        assert!(layout.input.is_none());
        assert_eq!(layout.content.height, 20);
    }

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = popup_area(area, 100, 4);
        assert_eq!(popup.width, 36);
        assert_eq!(popup.x, 2);
        assert_eq!(popup.y, 3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
    }
}
