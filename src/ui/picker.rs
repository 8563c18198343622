//! Project list widget, search row, and the status and key-hint bars.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::config::Config;
use crate::picker::{Mode, SelectionList};

/// Bordered list of the visible entries with the highlighted row marked.
pub struct ProjectList<'a> {
    list: &'a SelectionList,
}

impl<'a> ProjectList<'a> {
    pub fn new(list: &'a SelectionList) -> Self {
        Self { list }
    }

    fn title(&self) -> String {
        match self.list.mode() {
            Mode::Browse => " Projects ".to_string(),
            Mode::Filter => format!(
                " Projects ({}/{}) ",
                self.list.len(),
                self.list.all_labels().len()
            ),
        }
    }
}

impl StatefulWidget for ProjectList<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.list.is_empty() {
            let message = match self.list.mode() {
                Mode::Browse => "No projects found",
                Mode::Filter => "No matches",
            };
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .list
            .labels()
            .into_iter()
            .map(|label| ListItem::new(Line::from(label.to_string()).centered()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Render the search input row with a block cursor
pub fn render_search_row(area: Rect, buf: &mut Buffer, query: &str, cursor_pos: usize) {
    let prefix = "Search: ";
    let mut spans = vec![Span::styled(prefix, Style::default().fg(Color::Yellow))];

    let chars: Vec<char> = query.chars().collect();
    let available_width = (area.width as usize).saturating_sub(prefix.len()).max(1);
    let start = if cursor_pos >= available_width {
        cursor_pos - available_width + 1
    } else {
        0
    };
    let end = (start + available_width).min(chars.len());

    for (i, c) in chars[start..end].iter().enumerate() {
        if start + i == cursor_pos {
            spans.push(Span::styled(
                c.to_string(),
                Style::default().bg(Color::White).fg(Color::Black),
            ));
        } else {
            spans.push(Span::raw(c.to_string()));
        }
    }
    // Block cursor at end of text
    if cursor_pos >= chars.len() {
        spans.push(Span::styled(" ", Style::default().bg(Color::White)));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}

/// Status line naming the project root
pub fn status_line(config: &Config) -> Line<'static> {
    let mut text = format!("Git folder: {}", config.root_display());
    if config.root_is_default {
        text.push_str(" (default)");
    }
    Line::from(Span::styled(text, Style::default().fg(Color::Yellow))).centered()
}

/// Key hints for the current mode
pub fn help_line(mode: Mode) -> Line<'static> {
    let hints: &[(&str, &str)] = match mode {
        Mode::Browse => &[
            ("↑/k", "up"),
            ("↓/j", "down"),
            ("/", "search"),
            ("Enter", "select"),
            ("?", "help"),
            ("Esc", "exit"),
        ],
        Mode::Filter => &[
            ("↑/↓", "move"),
            ("Enter", "open"),
            ("Esc", "cancel search"),
        ],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {} ", key), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{} ", label)),
            ]
        })
        .collect();

    Line::from(spans).centered()
}
