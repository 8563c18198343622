//! tmux session driver.
//!
//! [`SessionDriver`] is the seam between the provisioning workflow and the
//! multiplexer. [`TmuxDriver`] implements it by running the `tmux` binary.

mod command;

use std::fmt;
use std::time::Duration;

pub use command::TmuxDriver;

/// Index of a window within a session, as tmux numbers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowIndex(pub u32);

impl fmt::Display for WindowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from a single driver call.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The tmux process could not be started or waited on
    #[error("failed to run `tmux {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// tmux ran and reported failure
    #[error("`tmux {command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    /// tmux did not finish within the configured bound and was killed
    #[error("`tmux {command}` did not respond within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    /// tmux succeeded but printed something we could not interpret
    #[error("unexpected output from `tmux {command}`: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}

impl DriverError {
    /// Whether the external tool stopped responding
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// Operations the provisioner needs from a terminal multiplexer.
///
/// Implementations hold no session state of their own; every query goes to
/// the multiplexer, which other clients may be changing concurrently.
pub trait SessionDriver {
    /// Whether a session with exactly this name exists
    fn has_session(&self, name: &str) -> Result<bool, DriverError>;

    /// Create a session and return the index of its initial window.
    ///
    /// With `detached` false the call takes over the terminal until the user
    /// detaches.
    fn create_session(&self, name: &str, detached: bool) -> Result<WindowIndex, DriverError>;

    /// Number of windows in a session
    fn count_windows(&self, session: &str) -> Result<usize, DriverError>;

    /// Create a named window and return its index
    fn create_window(&self, session: &str, name: &str) -> Result<WindowIndex, DriverError>;

    fn rename_window(
        &self,
        session: &str,
        window: WindowIndex,
        name: &str,
    ) -> Result<(), DriverError>;

    /// Type a line into a window, followed by Enter
    fn send_input(&self, session: &str, window: WindowIndex, text: &str)
        -> Result<(), DriverError>;

    fn select_window(&self, session: &str, window: WindowIndex) -> Result<(), DriverError>;

    /// Whether this process is itself running inside a multiplexer client
    fn is_inside_session(&self) -> bool;

    /// Attach the current terminal to a session
    fn attach_session(&self, name: &str) -> Result<(), DriverError>;

    /// Move the current client to another session
    fn switch_client(&self, name: &str) -> Result<(), DriverError>;
}
