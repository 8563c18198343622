//! [`SessionDriver`] backed by the `tmux` command line.

use std::ffi::OsString;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use super::{DriverError, SessionDriver, WindowIndex};

/// Format string making tmux print the index of the window it just created
const WINDOW_INDEX_FORMAT: &str = "#{window_index}";

/// Captured result of a finished tmux call
struct CallOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Drives tmux by spawning one process per operation.
#[derive(Debug, Clone)]
pub struct TmuxDriver {
    program: OsString,
    timeout: Duration,
}

impl TmuxDriver {
    /// Driver for the `tmux` on `PATH`
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("tmux", timeout)
    }

    /// Driver for a specific tmux binary
    pub fn with_program(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Run tmux with captured output, bounded by the timeout.
    fn call(&self, args: &[&str]) -> Result<CallOutput, DriverError> {
        let command = args.join(" ");
        debug!(%command, "tmux");

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DriverError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain while waiting so a chatty tmux cannot stall on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DriverError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
            Err(source) => {
                let _ = child.kill();
                return Err(DriverError::Spawn { command, source });
            }
        };

        Ok(CallOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }

    /// Run tmux and require a zero exit status, returning stdout.
    fn run(&self, args: &[&str]) -> Result<String, DriverError> {
        let output = self.call(args)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(DriverError::Failed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Run tmux attached to this terminal. Not bounded: it returns when the
    /// user detaches.
    fn run_interactive(&self, args: &[&str]) -> Result<(), DriverError> {
        let command = args.join(" ");
        debug!(%command, "tmux (interactive)");

        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| DriverError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DriverError::Failed {
                command,
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }

    fn first_window(&self, session: &str) -> Result<WindowIndex, DriverError> {
        let target = session_target(session);
        let args = ["list-windows", "-t", target.as_str(), "-F", WINDOW_INDEX_FORMAT];
        let stdout = self.run(&args)?;
        let first = stdout.lines().next().unwrap_or_default();
        parse_window_index(&args, first)
    }
}

impl SessionDriver for TmuxDriver {
    fn has_session(&self, name: &str) -> Result<bool, DriverError> {
        let target = session_target(name);
        let output = self.call(&["has-session", "-t", target.as_str()])?;
        Ok(output.status.success())
    }

    fn create_session(&self, name: &str, detached: bool) -> Result<WindowIndex, DriverError> {
        if !detached {
            self.run_interactive(&["new-session", "-s", name])?;
            return self.first_window(name);
        }

        let args = ["new-session", "-d", "-s", name, "-P", "-F", WINDOW_INDEX_FORMAT];
        let stdout = self.run(&args)?;
        parse_window_index(&args, &stdout)
    }

    fn count_windows(&self, session: &str) -> Result<usize, DriverError> {
        let target = session_target(session);
        let args = ["list-windows", "-t", target.as_str(), "-F", WINDOW_INDEX_FORMAT];
        let stdout = self.run(&args)?;
        Ok(stdout.lines().filter(|l| !l.trim().is_empty()).count())
    }

    fn create_window(&self, session: &str, name: &str) -> Result<WindowIndex, DriverError> {
        // Trailing colon: next free index in the session
        let target = format!("{}:", session_target(session));
        let args = [
            "new-window",
            "-t",
            target.as_str(),
            "-n",
            name,
            "-P",
            "-F",
            WINDOW_INDEX_FORMAT,
        ];
        let stdout = self.run(&args)?;
        parse_window_index(&args, &stdout)
    }

    fn rename_window(
        &self,
        session: &str,
        window: WindowIndex,
        name: &str,
    ) -> Result<(), DriverError> {
        let target = window_target(session, window);
        self.run(&["rename-window", "-t", target.as_str(), name])?;
        Ok(())
    }

    fn send_input(
        &self,
        session: &str,
        window: WindowIndex,
        text: &str,
    ) -> Result<(), DriverError> {
        let target = window_target(session, window);
        self.run(&["send-keys", "-t", target.as_str(), text, "C-m"])?;
        Ok(())
    }

    fn select_window(&self, session: &str, window: WindowIndex) -> Result<(), DriverError> {
        let target = window_target(session, window);
        self.run(&["select-window", "-t", target.as_str()])?;
        Ok(())
    }

    fn is_inside_session(&self) -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }

    fn attach_session(&self, name: &str) -> Result<(), DriverError> {
        let target = session_target(name);
        self.run_interactive(&["attach-session", "-t", target.as_str()])
    }

    fn switch_client(&self, name: &str) -> Result<(), DriverError> {
        let target = session_target(name);
        self.run(&["switch-client", "-t", target.as_str()])?;
        Ok(())
    }
}

/// Exact-match session target, so `alpha` never resolves to `alpha-2`
fn session_target(session: &str) -> String {
    format!("={}", session)
}

fn window_target(session: &str, window: WindowIndex) -> String {
    format!("={}:{}", session, window)
}

fn parse_window_index(args: &[&str], output: &str) -> Result<WindowIndex, DriverError> {
    output
        .trim()
        .parse()
        .map(WindowIndex)
        .map_err(|_| DriverError::UnexpectedOutput {
            command: args.join(" "),
            output: output.to_string(),
        })
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn collect(reader: JoinHandle<String>) -> String {
    reader.join().unwrap_or_default()
}
