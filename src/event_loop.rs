use std::time::Duration;

use anyhow::Result;
use crossterm::event::{poll, read, Event};
use ratatui::{widgets::Paragraph, Frame};

use crate::app::App;
use crate::picker::Mode;
use crate::terminal::Tui;
use crate::ui::layout::picker_layout;
use crate::ui::picker::{help_line, render_search_row, status_line};
use crate::ui::{HelpMenuWidget, ProjectList};

/// Draw and dispatch key events until something asks to quit.
pub fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    loop {
        app.sync_list_state();
        terminal.draw(|f| draw_ui(f, app))?;

        if poll(Duration::from_millis(50))? {
            if let Event::Key(key) = read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn draw_ui(f: &mut Frame, app: &mut App) {
    let mode = app.list.mode();
    let layout = picker_layout(f.area(), mode == Mode::Filter);

    f.render_stateful_widget(ProjectList::new(&app.list), layout.list, &mut app.list_state);

    if let Some(search_area) = layout.search {
        render_search_row(
            search_area,
            f.buffer_mut(),
            app.list.filter_text(),
            app.list.filter_cursor(),
        );
    }

    f.render_widget(Paragraph::new(status_line(&app.config)), layout.status);
    f.render_widget(Paragraph::new(help_line(mode)), layout.help);

    // Help overlay last (highest z-index)
    if app.show_help {
        let area = HelpMenuWidget::calculate_area(f.area());
        f.render_widget(HelpMenuWidget::new(&app.config), area);
    }
}
