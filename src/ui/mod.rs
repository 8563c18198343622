//! Terminal UI components: project list, search row, bars, and help overlay.

pub mod help_menu;
pub mod layout;
pub mod picker;

pub use help_menu::HelpMenuWidget;
pub use picker::ProjectList;
