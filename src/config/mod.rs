//! Configuration for git-opener.
//!
//! Everything is resolved once at startup from the environment and then shared
//! read-only with the host loop and the provisioner.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the project root
pub const ROOT_ENV_VAR: &str = "GIT_REPOS_PATH";

/// Environment variable holding the tracing filter directive
pub const LOG_ENV_VAR: &str = "GIT_OPENER_LOG";

/// File name of the log inside the system temp directory
const LOG_FILE_NAME: &str = "git-opener.log";

/// Directory under the home directory used when no root is configured
const DEFAULT_ROOT_DIR: &str = "git";

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose subdirectories are offered as projects
    pub root: PathBuf,
    /// True when `root` came from the built-in default rather than the environment
    pub root_is_default: bool,
    /// Append-only diagnostic log
    pub log_path: PathBuf,
    /// Line sent to the editor window after changing directory
    pub editor_command: String,
    /// Line sent to the scratch window after changing directory
    pub clear_command: String,
    /// Name given to the scratch shell window
    pub scratch_window_name: String,
    /// Upper bound on each non-interactive tmux call
    pub command_timeout: Duration,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var_os(ROOT_ENV_VAR), dirs::home_dir())
    }

    /// Resolve the configuration from an optional root override and home directory.
    ///
    /// An unset or empty override falls back to `~/git`. Without a home directory
    /// the literal `~/git` is used, which will simply fail to list.
    pub fn resolve(root_var: Option<OsString>, home: Option<PathBuf>) -> Self {
        let (root, root_is_default) = match root_var.filter(|v| !v.is_empty()) {
            Some(value) => (PathBuf::from(value), false),
            None => {
                let root = home
                    .map(|h| h.join(DEFAULT_ROOT_DIR))
                    .unwrap_or_else(|| PathBuf::from("~").join(DEFAULT_ROOT_DIR));
                (root, true)
            }
        };

        Self {
            root,
            root_is_default,
            log_path: std::env::temp_dir().join(LOG_FILE_NAME),
            editor_command: "vim .".to_string(),
            clear_command: "clear".to_string(),
            scratch_window_name: "terminal".to_string(),
            command_timeout: Duration::from_secs(5),
        }
    }

    /// Absolute path of a project under the root
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Root directory for display
    pub fn root_display(&self) -> std::path::Display<'_> {
        self.root.display()
    }
}
