//! Create-or-attach workflow turning a project name into a focused tmux session.
//!
//! A new session gets the editor in its first window and a scratch shell in a
//! second one. An existing session is never touched beyond switching to it.
//! Steps run strictly in order and the first failure ends the workflow.
//! Nothing already created is torn down.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::tmux::{DriverError, SessionDriver, WindowIndex};

/// The workflow step a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ExistenceCheck,
    CreateSession,
    CountWindows,
    CreateWindow,
    RenameWindow,
    SendInput,
    SelectWindow,
    Attach,
    SwitchClient,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ExistenceCheck => "existence check",
            Step::CreateSession => "session creation",
            Step::CountWindows => "window count",
            Step::CreateWindow => "window creation",
            Step::RenameWindow => "window rename",
            Step::SendInput => "sending input",
            Step::SelectWindow => "window selection",
            Step::Attach => "attach",
            Step::SwitchClient => "client switch",
        };
        f.write_str(name)
    }
}

/// Errors that end a provisioning run
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("{step} failed for session '{session}': {source}")]
    Step {
        session: String,
        step: Step,
        #[source]
        source: DriverError,
    },
    /// The session was created but has no windows by the time we look
    #[error("session '{0}' has no windows after creation")]
    SessionVanished(String),
}

impl ProvisionError {
    /// Which step failed, if a driver call was involved
    pub fn step(&self) -> Option<Step> {
        match self {
            ProvisionError::Step { step, .. } => Some(*step),
            ProvisionError::SessionVanished(_) => None,
        }
    }

    /// Whether tmux stopped responding rather than refusing the request
    pub fn is_unresponsive(&self) -> bool {
        matches!(self, ProvisionError::Step { source, .. } if source.is_timeout())
    }

    /// Whether the session was fully set up and only attaching failed
    pub fn session_left_intact(&self) -> bool {
        matches!(self.step(), Some(Step::Attach | Step::SwitchClient))
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The session already existed; we only moved to it
    Attached,
    /// The session was created, laid out, and attached
    Created,
}

/// Map a project name to the session name tmux will actually use.
///
/// tmux replaces `.` and `:` in session names with `_`; doing it up front keeps
/// the existence check and later targets pointing at the same session.
/// Projects differing only in those characters (`a.b` and `a_b`) share one
/// session, so opening the second attaches to the first.
pub fn session_name(project: &str) -> String {
    project.replace(['.', ':'], "_")
}

/// Quote a path for a POSIX shell command line
fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Runs the provisioning workflow against a [`SessionDriver`].
pub struct Provisioner<D> {
    driver: D,
    config: Rc<Config>,
}

impl<D: SessionDriver> Provisioner<D> {
    pub fn new(driver: D, config: Rc<Config>) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Open the session for `project`, creating and laying it out if needed.
    pub fn provision(&self, project: &str) -> Result<ProvisionOutcome, ProvisionError> {
        let session = session_name(project);
        let fail = |step: Step| {
            let session = session.clone();
            move |source: DriverError| ProvisionError::Step {
                session,
                step,
                source,
            }
        };

        let exists = self
            .driver
            .has_session(&session)
            .map_err(fail(Step::ExistenceCheck))?;
        if exists {
            info!(%session, %project, "Session already exists, switching");
            self.attach_or_switch(&session)?;
            return Ok(ProvisionOutcome::Attached);
        }

        let project_path = self.config.project_path(project);
        info!(%session, path = %project_path.display(), "Creating session");

        let editor = self
            .driver
            .create_session(&session, true)
            .map_err(fail(Step::CreateSession))?;
        debug!(%session, %editor, "Session created");

        let scratch = self.create_scratch_window(&session)?;

        let cd = format!("cd {}", shell_quote(&project_path));
        for (window, command) in [
            (editor, cd.as_str()),
            (editor, self.config.editor_command.as_str()),
            (scratch, cd.as_str()),
            (scratch, self.config.clear_command.as_str()),
        ] {
            self.driver
                .send_input(&session, window, command)
                .map_err(fail(Step::SendInput))?;
        }
        debug!(%session, "Windows populated");

        self.driver
            .select_window(&session, editor)
            .map_err(fail(Step::SelectWindow))?;

        if let Err(e) = self.attach_or_switch(&session) {
            warn!(
                %session,
                "Session is ready but could not be attached; run `tmux attach -t {}`",
                session
            );
            return Err(e);
        }
        Ok(ProvisionOutcome::Created)
    }

    fn create_scratch_window(&self, session: &str) -> Result<WindowIndex, ProvisionError> {
        let wrap = |step: Step| {
            move |source: DriverError| ProvisionError::Step {
                session: session.to_string(),
                step,
                source,
            }
        };

        let windows = self
            .driver
            .count_windows(session)
            .map_err(wrap(Step::CountWindows))?;
        if windows == 0 {
            return Err(ProvisionError::SessionVanished(session.to_string()));
        }

        let name = &self.config.scratch_window_name;
        let index = self
            .driver
            .create_window(session, name)
            .map_err(wrap(Step::CreateWindow))?;
        self.driver
            .rename_window(session, index, name)
            .map_err(wrap(Step::RenameWindow))?;
        debug!(%session, %index, "Scratch window created");
        Ok(index)
    }

    /// Switch the current client when already inside tmux, attach otherwise.
    fn attach_or_switch(&self, session: &str) -> Result<(), ProvisionError> {
        let (step, result) = if self.driver.is_inside_session() {
            (Step::SwitchClient, self.driver.switch_client(session))
        } else {
            (Step::Attach, self.driver.attach_session(session))
        };
        result.map_err(|source| ProvisionError::Step {
            session: session.to_string(),
            step,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::time::Duration;

    use super::*;

    /// Recorded driver call
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        HasSession(String),
        CreateSession(String, bool),
        CountWindows(String),
        CreateWindow(String, String),
        RenameWindow(String, u32, String),
        SendInput(String, u32, String),
        SelectWindow(String, u32),
        IsInside,
        Attach(String),
        Switch(String),
    }

    /// In-memory driver that records calls and fails on request.
    #[derive(Default)]
    struct FakeDriver {
        calls: RefCell<Vec<Call>>,
        existing: bool,
        inside: bool,
        window_count: usize,
        fail_on: Option<&'static str>,
        timeout_on: Option<&'static str>,
    }

    impl FakeDriver {
        fn new() -> Self {
            Self {
                window_count: 1,
                ..Default::default()
            }
        }

        fn record(&self, call: Call, op: &'static str) -> Result<(), DriverError> {
            self.calls.borrow_mut().push(call);
            if self.timeout_on == Some(op) {
                return Err(DriverError::Timeout {
                    command: op.to_string(),
                    timeout: Duration::from_secs(5),
                });
            }
            if self.fail_on == Some(op) {
                return Err(DriverError::Failed {
                    command: op.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn op_names(&self) -> Vec<&'static str> {
            self.calls()
                .iter()
                .map(|c| match c {
                    Call::HasSession(_) => "has_session",
                    Call::CreateSession(..) => "create_session",
                    Call::CountWindows(_) => "count_windows",
                    Call::CreateWindow(..) => "create_window",
                    Call::RenameWindow(..) => "rename_window",
                    Call::SendInput(..) => "send_input",
                    Call::SelectWindow(..) => "select_window",
                    Call::IsInside => "is_inside_session",
                    Call::Attach(_) => "attach_session",
                    Call::Switch(_) => "switch_client",
                })
                .collect()
        }
    }

    impl SessionDriver for FakeDriver {
        fn has_session(&self, name: &str) -> Result<bool, DriverError> {
            self.record(Call::HasSession(name.into()), "has_session")?;
            Ok(self.existing)
        }

        fn create_session(&self, name: &str, detached: bool) -> Result<WindowIndex, DriverError> {
            self.record(Call::CreateSession(name.into(), detached), "create_session")?;
            Ok(WindowIndex(1))
        }

        fn count_windows(&self, session: &str) -> Result<usize, DriverError> {
            self.record(Call::CountWindows(session.into()), "count_windows")?;
            Ok(self.window_count)
        }

        fn create_window(&self, session: &str, name: &str) -> Result<WindowIndex, DriverError> {
            self.record(Call::CreateWindow(session.into(), name.into()), "create_window")?;
            Ok(WindowIndex(2))
        }

        fn rename_window(
            &self,
            session: &str,
            window: WindowIndex,
            name: &str,
        ) -> Result<(), DriverError> {
            self.record(
                Call::RenameWindow(session.into(), window.0, name.into()),
                "rename_window",
            )
        }

        fn send_input(
            &self,
            session: &str,
            window: WindowIndex,
            text: &str,
        ) -> Result<(), DriverError> {
            self.record(
                Call::SendInput(session.into(), window.0, text.into()),
                "send_input",
            )
        }

        fn select_window(&self, session: &str, window: WindowIndex) -> Result<(), DriverError> {
            self.record(Call::SelectWindow(session.into(), window.0), "select_window")
        }

        fn is_inside_session(&self) -> bool {
            self.calls.borrow_mut().push(Call::IsInside);
            self.inside
        }

        fn attach_session(&self, name: &str) -> Result<(), DriverError> {
            self.record(Call::Attach(name.into()), "attach_session")
        }

        fn switch_client(&self, name: &str) -> Result<(), DriverError> {
            self.record(Call::Switch(name.into()), "switch_client")
        }
    }

    fn config() -> Rc<Config> {
        Rc::new(Config::resolve(Some(OsString::from("/srv/code")), None))
    }

    fn provisioner(driver: FakeDriver) -> Provisioner<FakeDriver> {
        Provisioner::new(driver, config())
    }

    #[test]
    fn existing_session_only_attaches() {
        let p = provisioner(FakeDriver {
            existing: true,
            ..FakeDriver::new()
        });

        assert_eq!(p.provision("demo").unwrap(), ProvisionOutcome::Attached);
        assert_eq!(
            p.driver().calls(),
            vec![
                Call::HasSession("demo".into()),
                Call::IsInside,
                Call::Attach("demo".into()),
            ]
        );
    }

    #[test]
    fn existing_session_switches_when_inside_tmux() {
        let p = provisioner(FakeDriver {
            existing: true,
            inside: true,
            ..FakeDriver::new()
        });

        p.provision("demo").unwrap();
        assert_eq!(
            p.driver().op_names(),
            vec!["has_session", "is_inside_session", "switch_client"]
        );
    }

    #[test]
    fn new_session_runs_every_step_in_order() {
        let p = provisioner(FakeDriver::new());

        assert_eq!(p.provision("demo").unwrap(), ProvisionOutcome::Created);
        assert_eq!(
            p.driver().calls(),
            vec![
                Call::HasSession("demo".into()),
                Call::CreateSession("demo".into(), true),
                Call::CountWindows("demo".into()),
                Call::CreateWindow("demo".into(), "terminal".into()),
                Call::RenameWindow("demo".into(), 2, "terminal".into()),
                Call::SendInput("demo".into(), 1, "cd '/srv/code/demo'".into()),
                Call::SendInput("demo".into(), 1, "vim .".into()),
                Call::SendInput("demo".into(), 2, "cd '/srv/code/demo'".into()),
                Call::SendInput("demo".into(), 2, "clear".into()),
                Call::SelectWindow("demo".into(), 1),
                Call::IsInside,
                Call::Attach("demo".into()),
            ]
        );
    }

    #[test]
    fn window_creation_failure_stops_before_population() {
        let p = provisioner(FakeDriver {
            fail_on: Some("create_window"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::CreateWindow));
        assert!(!err.session_left_intact());

        let ops = p.driver().op_names();
        assert_eq!(
            ops,
            vec!["has_session", "create_session", "count_windows", "create_window"]
        );
        assert!(!ops.contains(&"select_window"));
        assert!(!ops.contains(&"attach_session"));
    }

    #[test]
    fn window_count_failure_stops_before_window_creation() {
        let p = provisioner(FakeDriver {
            fail_on: Some("count_windows"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::CountWindows));
        assert!(!err.session_left_intact());
        assert_eq!(
            p.driver().op_names(),
            vec!["has_session", "create_session", "count_windows"]
        );
    }

    #[test]
    fn rename_failure_stops_before_input() {
        let p = provisioner(FakeDriver {
            fail_on: Some("rename_window"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::RenameWindow));
        let ops = p.driver().op_names();
        assert_eq!(ops.last(), Some(&"rename_window"));
        assert!(!ops.contains(&"send_input"));
    }

    #[test]
    fn select_failure_never_attaches() {
        let p = provisioner(FakeDriver {
            fail_on: Some("select_window"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::SelectWindow));
        assert!(!err.session_left_intact());
        let ops = p.driver().op_names();
        assert_eq!(ops.last(), Some(&"select_window"));
        assert!(!ops.contains(&"is_inside_session"));
        assert!(!ops.contains(&"attach_session"));
        assert!(!ops.contains(&"switch_client"));
    }

    #[test]
    fn switch_failure_inside_tmux_keeps_provisioned_session() {
        let p = provisioner(FakeDriver {
            inside: true,
            fail_on: Some("switch_client"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::SwitchClient));
        assert!(err.session_left_intact());
        let ops = p.driver().op_names();
        assert!(ops.contains(&"select_window"));
        assert!(!ops.contains(&"attach_session"));
    }

    #[test]
    fn session_creation_failure_is_fatal() {
        let p = provisioner(FakeDriver {
            fail_on: Some("create_session"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::CreateSession));
        assert_eq!(p.driver().op_names(), vec!["has_session", "create_session"]);
    }

    #[test]
    fn send_input_failure_is_fatal() {
        let p = provisioner(FakeDriver {
            fail_on: Some("send_input"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::SendInput));
        let sends = p
            .driver()
            .op_names()
            .into_iter()
            .filter(|op| *op == "send_input")
            .count();
        assert_eq!(sends, 1);
    }

    #[test]
    fn empty_session_is_reported() {
        let p = provisioner(FakeDriver {
            window_count: 0,
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert!(matches!(err, ProvisionError::SessionVanished(ref s) if s == "demo"));
        assert!(!p.driver().op_names().contains(&"create_window"));
    }

    #[test]
    fn attach_failure_keeps_provisioned_session() {
        let p = provisioner(FakeDriver {
            fail_on: Some("attach_session"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert_eq!(err.step(), Some(Step::Attach));
        assert!(err.session_left_intact());
        // Everything up to selecting the editor window still happened
        assert!(p.driver().op_names().contains(&"select_window"));
    }

    #[test]
    fn timeouts_are_reported_as_unresponsive() {
        let p = provisioner(FakeDriver {
            timeout_on: Some("has_session"),
            ..FakeDriver::new()
        });

        let err = p.provision("demo").unwrap_err();
        assert!(err.is_unresponsive());
        assert_eq!(err.step(), Some(Step::ExistenceCheck));
        assert_eq!(p.driver().op_names(), vec!["has_session"]);
    }

    #[test]
    fn dotted_project_names_use_tmux_session_names() {
        let p = provisioner(FakeDriver::new());
        p.provision("my.site").unwrap();

        let calls = p.driver().calls();
        assert_eq!(calls[0], Call::HasSession("my_site".into()));
        assert!(calls.contains(&Call::SendInput(
            "my_site".into(),
            1,
            "cd '/srv/code/my.site'".into()
        )));
    }

    #[test]
    fn dotted_and_underscored_projects_share_a_session() {
        assert_eq!(session_name("a.b"), session_name("a_b"));
        assert_eq!(session_name("host:8080"), "host_8080");
    }

    #[test]
    fn paths_with_quotes_are_escaped() {
        assert_eq!(shell_quote(Path::new("/a/it's")), r"'/a/it'\''s'");
        assert_eq!(shell_quote(Path::new("/a/b c")), "'/a/b c'");
    }

    #[test]
    fn error_messages_name_the_step() {
        let err = ProvisionError::Step {
            session: "demo".into(),
            step: Step::SelectWindow,
            source: DriverError::Failed {
                command: "select-window -t =demo:1".into(),
                status: "exit status: 1".into(),
                stderr: "can't find window".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("window selection failed for session 'demo'"));
        assert!(msg.contains("can't find window"));
    }
}
