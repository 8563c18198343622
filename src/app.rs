//! Application state and key routing for the picker.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;
use tracing::{error, info};

use crate::config::Config;
use crate::picker::{KeyOutcome, SelectionList};
use crate::provision::Provisioner;
use crate::tmux::SessionDriver;

/// Label of the trailing entry that just exits
pub const EXIT_LABEL: &str = "Exit";

/// Main application state
pub struct App {
    /// Shared, read-only configuration
    pub config: Rc<Config>,
    /// Project entries plus the exit entry
    pub list: SelectionList,
    /// Ratatui list state, mirrored from the picker's highlight before drawing
    pub list_state: ListState,
    /// Whether the help overlay is visible
    pub show_help: bool,
    /// Set by entry actions and quit keys; checked by the event loop
    quit: Rc<Cell<bool>>,
}

impl App {
    pub fn new(config: Rc<Config>) -> Self {
        Self {
            config,
            list: SelectionList::new(),
            list_state: ListState::default(),
            show_help: false,
            quit: Rc::new(Cell::new(false)),
        }
    }

    /// Add one entry per project, each opening its session, then an exit entry.
    ///
    /// `before_provision` runs first inside each project action; the binary uses
    /// it to hand the terminal back before tmux takes it over.
    pub fn populate<D: SessionDriver + 'static>(
        &mut self,
        projects: Vec<String>,
        provisioner: &Rc<Provisioner<D>>,
        before_provision: &Rc<dyn Fn()>,
    ) {
        for project in projects {
            let provisioner = Rc::clone(provisioner);
            let before = Rc::clone(before_provision);
            let quit = Rc::clone(&self.quit);
            let name = project.clone();
            self.list.add_entry(
                project,
                Rc::new(move || {
                    info!(project = %name, "Opening session");
                    before();
                    match provisioner.provision(&name) {
                        Ok(outcome) => info!(project = %name, ?outcome, "Session ready"),
                        Err(e) => error!(project = %name, error = %e, "Failed to open session"),
                    }
                    quit.set(true);
                }),
            );
        }

        let quit = Rc::clone(&self.quit);
        self.list.add_entry(EXIT_LABEL, Rc::new(move || quit.set(true)));
    }

    pub fn should_quit(&self) -> bool {
        self.quit.get()
    }

    pub fn request_quit(&self) {
        self.quit.set(true);
    }

    /// Copy the picker's highlight into the ratatui list state
    pub fn sync_list_state(&mut self) {
        self.list_state.select(self.list.highlighted());
    }

    /// Route a key: Ctrl-C, then the help overlay, then the list, then `?`.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.request_quit();
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.list.handle_key(key) {
            KeyOutcome::Consumed => {}
            KeyOutcome::Ignored => {
                if key.code == KeyCode::Char('?') {
                    self.show_help = true;
                }
            }
            KeyOutcome::Activated(activation) => activation.run(),
            KeyOutcome::Quit => self.request_quit(),
        }
    }
}
