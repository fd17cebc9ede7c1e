//! Color palettes for the dashboard.
//!
//! Two built-in palettes, dark and light, drawn from Tailwind CSS colors.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::app::FlashLevel;

/// Palette variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a theme name, falling back to dark for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

/// Styles used across every surface.
#[derive(Debug, Clone)]
pub struct Theme {
    pub variant: ThemeVariant,

    pub foreground: Color,
    pub muted: Color,

    pub selected: Style,
    pub border: Style,
    pub title: Style,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Chrome
    pub header: Style,
    pub crumb: Style,
    pub crumb_active: Style,
    pub hint_key: Style,
    pub hint_desc: Style,

    // Tables
    pub table_header: Style,
    pub unread: Style,
    pub starred: Style,

    // Prompt and palette
    pub prompt: Style,
    pub prompt_input: Style,
    pub cursor: Style,
    pub suggestion: Style,
    pub suggestion_selected: Style,
}

impl Theme {
    /// Dark palette on slate.
    pub fn dark() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);

        let blue_400 = Color::Rgb(96, 165, 250);
        let green_500 = Color::Rgb(34, 197, 94);
        let yellow_500 = Color::Rgb(234, 179, 8);
        let red_500 = Color::Rgb(239, 68, 68);
        let cyan_400 = Color::Rgb(34, 211, 238);
        let amber_500 = Color::Rgb(245, 158, 11);

        Self {
            variant: ThemeVariant::Dark,
            foreground: slate_100,
            muted: slate_500,

            selected: Style::new().bg(slate_700).fg(slate_50).add_modifier(Modifier::BOLD),
            border: Style::new().fg(slate_600),
            title: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),

            success: green_500,
            warning: yellow_500,
            error: red_500,
            info: blue_400,

            header: Style::new().bg(slate_800).fg(slate_100),
            crumb: Style::new().fg(slate_400),
            crumb_active: Style::new().fg(cyan_400).add_modifier(Modifier::BOLD),
            hint_key: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            hint_desc: Style::new().fg(slate_400),

            table_header: Style::new().fg(slate_400).add_modifier(Modifier::BOLD),
            unread: Style::new().fg(slate_50).add_modifier(Modifier::BOLD),
            starred: Style::new().fg(amber_500),

            prompt: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            prompt_input: Style::new().fg(slate_100),
            cursor: Style::new().add_modifier(Modifier::REVERSED),
            suggestion: Style::new().fg(slate_400),
            suggestion_selected: Style::new().bg(slate_700).fg(slate_50),
        }
    }

    /// Light palette on slate.
    pub fn light() -> Self {
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_200 = Color::Rgb(226, 232, 240);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        let blue_600 = Color::Rgb(37, 99, 235);
        let blue_700 = Color::Rgb(29, 78, 216);
        let green_600 = Color::Rgb(22, 163, 74);
        let yellow_600 = Color::Rgb(202, 138, 4);
        let red_600 = Color::Rgb(220, 38, 38);
        let cyan_600 = Color::Rgb(8, 145, 178);
        let amber_600 = Color::Rgb(217, 119, 6);

        Self {
            variant: ThemeVariant::Light,
            foreground: slate_900,
            muted: slate_500,

            selected: Style::new().bg(slate_200).fg(slate_900).add_modifier(Modifier::BOLD),
            border: Style::new().fg(slate_400),
            title: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),

            success: green_600,
            warning: yellow_600,
            error: red_600,
            info: blue_600,

            header: Style::new().bg(slate_100).fg(slate_800),
            crumb: Style::new().fg(slate_600),
            crumb_active: Style::new().fg(cyan_600).add_modifier(Modifier::BOLD),
            hint_key: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            hint_desc: Style::new().fg(slate_600),

            table_header: Style::new().fg(slate_600).add_modifier(Modifier::BOLD),
            unread: Style::new().fg(slate_900).add_modifier(Modifier::BOLD),
            starred: Style::new().fg(amber_600),

            prompt: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            prompt_input: Style::new().fg(slate_900),
            cursor: Style::new().add_modifier(Modifier::REVERSED),
            suggestion: Style::new().fg(slate_600),
            suggestion_selected: Style::new().bg(slate_200).fg(slate_900),
        }
    }

    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Color for a flash message of the given level.
    pub fn flash_color(&self, level: FlashLevel) -> Color {
        match level {
            FlashLevel::Info => self.info,
            FlashLevel::Warn => self.warning,
            FlashLevel::Error => self.error,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_name() {
        assert_eq!(ThemeVariant::from_name("light"), ThemeVariant::Light);
        assert_eq!(ThemeVariant::from_name("LIGHT"), ThemeVariant::Light);
        assert_eq!(ThemeVariant::from_name("solarized"), ThemeVariant::Dark);
        assert_eq!(Theme::from_variant(ThemeVariant::Light).variant, ThemeVariant::Light);
    }
}
