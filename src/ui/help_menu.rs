//! Help overlay toggled by `?` while browsing.
//!
//! Lists the keybindings and explains where projects are read from and how to
//! point the picker somewhere else.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::config::{Config, ROOT_ENV_VAR};

/// A single keybinding entry for display
struct HelpEntry {
    key: &'static str,
    label: &'static str,
}

/// Widget that renders the help overlay
pub struct HelpMenuWidget<'a> {
    config: &'a Config,
}

impl<'a> HelpMenuWidget<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Centered popup, 70% wide, tall enough for the content when possible
    pub fn calculate_area(screen: Rect) -> Rect {
        let width = (screen.width / 10 * 7)
            .max(50)
            .min(screen.width.saturating_sub(4));
        let height = 22u16.min(screen.height.saturating_sub(2));

        let x = screen.width.saturating_sub(width) / 2;
        let y = screen.height.saturating_sub(height) / 2;

        Rect::new(x, y, width, height)
    }

    fn entries() -> Vec<HelpEntry> {
        vec![
            HelpEntry { key: "↑/k", label: "Move selection up" },
            HelpEntry { key: "↓/j", label: "Move selection down" },
            HelpEntry { key: "/", label: "Search projects" },
            HelpEntry { key: "Enter", label: "Open selected project" },
            HelpEntry { key: "Esc", label: "Exit, or leave search" },
            HelpEntry { key: "?", label: "Show this help" },
        ]
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(format!(
                "Currently using Git Repository Path: {}",
                self.config.root_display()
            )),
            Line::default(),
            Line::from(Span::styled("Navigation", heading)),
        ];

        for entry in Self::entries() {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<6}", entry.key), key_style),
                Span::raw(entry.label),
            ]));
        }

        lines.extend([
            Line::default(),
            Line::from(Span::styled("Configuration", heading)),
            Line::from(format!(
                "Set {} to change where projects are loaded from:",
                ROOT_ENV_VAR
            )),
            Line::from(Span::styled(
                format!("  export {}=$HOME/workspace/git", ROOT_ENV_VAR),
                Style::default().fg(Color::Green),
            )),
            Line::from(format!(
                "Diagnostics are written to {}",
                self.config.log_path.display()
            )),
            Line::default(),
            Line::from(Span::styled(
                "Press any key to close",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        ]);

        lines
    }
}

impl Widget for HelpMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area first (overlay effect)
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " ? | Git Opener Help ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));

        Paragraph::new(self.build_lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn calculate_area_is_centered() {
        let screen = Rect::new(0, 0, 100, 30);
        let area = HelpMenuWidget::calculate_area(screen);
        assert_eq!(area.width, 70);
        assert_eq!(area.height, 22);
        assert_eq!(area.x, 15);
        assert_eq!(area.y, 4);
    }

    #[test]
    fn calculate_area_fits_small_screens() {
        let screen = Rect::new(0, 0, 40, 10);
        let area = HelpMenuWidget::calculate_area(screen);
        assert!(area.right() <= screen.right());
        assert!(area.bottom() <= screen.bottom());
    }

    #[test]
    fn calculate_area_handles_very_wide_screens() {
        for width in [1000, 1600] {
            let screen = Rect::new(0, 0, width, 40);
            let area = HelpMenuWidget::calculate_area(screen);
            assert!(area.width >= width / 2);
            assert!(area.right() <= screen.right());
        }
    }

    #[test]
    fn help_names_root_and_env_var() {
        let config = Config::resolve(Some(OsString::from("/srv/code")), None);
        let text: Vec<String> = HelpMenuWidget::new(&config)
            .build_lines()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(text[0].ends_with("/srv/code"));
        assert!(text.iter().any(|l| l.contains("GIT_REPOS_PATH")));
    }
}
