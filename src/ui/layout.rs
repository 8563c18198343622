use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions of the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerLayout {
    /// Bordered project list
    pub list: Rect,
    /// Search input row, only while filtering
    pub search: Option<Rect>,
    /// Project root status line
    pub status: Rect,
    /// Key hints
    pub help: Rect,
}

/// Split the screen into list, optional search row, status bar and help bar
pub fn picker_layout(area: Rect, show_search: bool) -> PickerLayout {
    let search_height = if show_search { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(search_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    PickerLayout {
        list: chunks[0],
        search: show_search.then_some(chunks[1]),
        status: chunks[2],
        help: chunks[3],
    }
}
