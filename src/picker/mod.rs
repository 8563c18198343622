//! Filterable selection list driven by raw key events.
//!
//! The list owns every entry it was given and derives the visible view from
//! the current filter, so entries added at any time show up correctly. It
//! tracks which row is highlighted but does no drawing; see `ui::picker`.

mod filter;

use std::fmt;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use filter::{label_matches, FilterInput, FilterKeyResult};

/// Callback bound to an entry
pub type Action = Rc<dyn Fn()>;

/// One selectable row: a label and the action run when it is chosen.
#[derive(Clone)]
pub struct Entry {
    label: String,
    action: Action,
}

impl Entry {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("label", &self.label).finish()
    }
}

/// An activated entry, handed back to the host to run.
///
/// The list has already returned to unfiltered browse mode by the time this
/// exists, so an action that inspects the list sees the settled state.
#[derive(Debug, Clone)]
pub struct Activation {
    entry: Entry,
}

impl Activation {
    pub fn label(&self) -> &str {
        &self.entry.label
    }

    /// Invoke the entry's action
    pub fn run(self) {
        (self.entry.action)();
    }
}

/// Input mode of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Filter,
}

/// Which surface receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    FilterInput,
}

/// What the list did with a key
#[derive(Debug)]
pub enum KeyOutcome {
    /// Handled, nothing else to do
    Consumed,
    /// Not a key the list understands in its current mode
    Ignored,
    /// An entry was chosen; the host should run it
    Activated(Activation),
    /// Esc while browsing: the host should stop
    Quit,
}

/// Selection list state
#[derive(Debug, Default)]
pub struct SelectionList {
    /// Every entry, in insertion order
    entries: Vec<Entry>,
    /// Indices into `entries` that are currently visible
    view: Vec<usize>,
    /// Highlighted position within `view`
    highlighted: Option<usize>,
    mode: Mode,
    focus: Focus,
    /// Focus owner before filter mode was entered
    prior_focus: Option<Focus>,
    input: FilterInput,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. It is visible immediately if it matches the active filter.
    pub fn add_entry(&mut self, label: impl Into<String>, action: Action) {
        let entry = Entry::new(label, action);
        let index = self.entries.len();
        let visible = self.mode == Mode::Browse || label_matches(&entry.label, self.input.text());
        self.entries.push(entry);

        if visible {
            self.view.push(index);
            if self.highlighted.is_none() {
                self.highlighted = Some(0);
            }
        }
    }

    /// Labels in the visible view
    pub fn labels(&self) -> Vec<&str> {
        self.view.iter().map(|&i| self.entries[i].label()).collect()
    }

    /// Labels of every entry regardless of filter
    pub fn all_labels(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::label).collect()
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_label(&self) -> Option<&str> {
        self.highlighted_entry().map(Entry::label)
    }

    fn highlighted_entry(&self) -> Option<&Entry> {
        let pos = self.highlighted?;
        self.view.get(pos).map(|&i| &self.entries[i])
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn filter_text(&self) -> &str {
        self.input.text()
    }

    /// Cursor position inside the filter text, in characters
    pub fn filter_cursor(&self) -> usize {
        self.input.cursor()
    }

    /// Move the highlight up one row, stopping at the top
    pub fn move_up(&mut self) {
        if let Some(pos) = self.highlighted {
            self.highlighted = Some(pos.saturating_sub(1));
        }
    }

    /// Move the highlight down one row, stopping at the bottom
    pub fn move_down(&mut self) {
        if let Some(pos) = self.highlighted {
            if pos + 1 < self.view.len() {
                self.highlighted = Some(pos + 1);
            }
        }
    }

    /// Set the filter text and recompute the view.
    ///
    /// The highlight always returns to the first row, even when the previously
    /// highlighted entry still matches.
    pub fn set_filter_text(&mut self, text: &str) {
        if self.mode == Mode::Browse && !text.is_empty() {
            self.enter_filter_mode();
        }
        self.input.set_text(text);
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let query = self.input.text();
        self.view = if self.mode == Mode::Browse || query.is_empty() {
            (0..self.entries.len()).collect()
        } else {
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, e)| label_matches(&e.label, query))
                .map(|(i, _)| i)
                .collect()
        };
        self.reset_highlight();
    }

    fn reset_highlight(&mut self) {
        self.highlighted = if self.view.is_empty() { None } else { Some(0) };
    }

    fn enter_filter_mode(&mut self) {
        self.prior_focus = Some(self.focus);
        self.mode = Mode::Filter;
        self.focus = Focus::FilterInput;
        self.input.clear();
        self.apply_filter();
    }

    fn exit_filter_mode(&mut self) {
        if self.mode != Mode::Filter {
            return;
        }
        self.mode = Mode::Browse;
        self.input.clear();
        self.focus = self.prior_focus.take().unwrap_or_default();
        self.apply_filter();
    }

    /// Activate the highlighted entry.
    ///
    /// The entry is captured from the current (possibly filtered) view, then
    /// filter mode is unwound before the activation is returned.
    pub fn activate(&mut self) -> Option<Activation> {
        let entry = self.highlighted_entry().cloned();
        self.exit_filter_mode();
        entry.map(|entry| Activation { entry })
    }

    /// Route a key event according to the current mode
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Filter => self.handle_filter_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Char('k') if plain => self.move_up(),
            KeyCode::Char('j') if plain => self.move_down(),
            KeyCode::Char('/') if plain => self.enter_filter_mode(),
            KeyCode::Enter => {
                return match self.activate() {
                    Some(activation) => KeyOutcome::Activated(activation),
                    None => KeyOutcome::Consumed,
                };
            }
            KeyCode::Esc => return KeyOutcome::Quit,
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Consumed
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Esc => self.exit_filter_mode(),
            KeyCode::Enter => {
                return match self.activate() {
                    Some(activation) => KeyOutcome::Activated(activation),
                    None => KeyOutcome::Consumed,
                };
            }
            _ => {
                if self.input.handle_key(key) == FilterKeyResult::QueryChanged {
                    self.apply_filter();
                }
            }
        }
        KeyOutcome::Consumed
    }
}
