use std::io::IsTerminal;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::info;

use git_opener::app::App;
use git_opener::config::Config;
use git_opener::event_loop::run_app;
use git_opener::provision::Provisioner;
use git_opener::tmux::TmuxDriver;
use git_opener::{logging, projects, terminal};

fn main() -> Result<()> {
    let config = Rc::new(Config::from_env());
    logging::init(&config.log_path)?;

    // Check if we're in a proper terminal
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("git-opener must be run in an interactive terminal");
    }

    info!(
        root = %config.root_display(),
        default = config.root_is_default,
        "Starting git-opener"
    );

    let projects = projects::list_directories(&config.root);
    let provisioner = Rc::new(Provisioner::new(
        TmuxDriver::new(config.command_timeout),
        Rc::clone(&config),
    ));
    // Attaching hands the terminal to tmux, so give it back before provisioning
    let release_terminal: Rc<dyn Fn()> = Rc::new(terminal::restore);

    let mut app = App::new(Rc::clone(&config));
    app.populate(projects, &provisioner, &release_terminal);

    let mut tui = terminal::enter().context("Failed to initialize terminal")?;

    let result = run_app(&mut tui, &mut app);

    // Restore terminal (always try to restore even on error)
    terminal::restore();
    let _ = tui.show_cursor();

    result
}
