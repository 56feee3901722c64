use crate::config::HandoffMode;
use crate::core::error::{LauncherError, Result};
use crate::launcher::LaunchPlan;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Hands control to the Python entry point described by a [`LaunchPlan`].
pub struct EntryPointExecutor<'a> {
    plan: &'a LaunchPlan,
}

impl<'a> EntryPointExecutor<'a> {
    pub fn new(plan: &'a LaunchPlan) -> Self {
        Self { plan }
    }

    fn interpreter(&self) -> Result<&Path> {
        self.plan
            .resolved_interpreter
            .as_deref()
            .ok_or_else(|| LauncherError::InterpreterNotFound(self.plan.interpreter.clone()))
    }

    fn spawn_error(&self, program: &Path, e: std::io::Error) -> LauncherError {
        match e.kind() {
            ErrorKind::NotFound => {
                LauncherError::InterpreterNotFound(program.display().to_string())
            }
            ErrorKind::PermissionDenied => LauncherError::NotExecutable(program.to_path_buf()),
            _ => LauncherError::Handoff(format!("{}: {}", program.display(), e)),
        }
    }

    /// Run the entry point according to the plan's hand-off mode.
    ///
    /// In exec mode this only returns on failure.
    pub async fn hand_off(&self) -> Result<i32> {
        match self.plan.handoff {
            HandoffMode::Spawn => self.run_spawned().await,
            #[cfg(unix)]
            HandoffMode::Exec => Err(self.exec_replace()),
            #[cfg(not(unix))]
            HandoffMode::Exec => {
                tracing::debug!("process replacement unavailable; spawning entry point");
                self.run_spawned().await
            }
        }
    }

    /// Replace the current process image with the interpreter.
    #[cfg(unix)]
    pub fn exec_replace(&self) -> LauncherError {
        use std::os::unix::process::CommandExt;

        let program = match self.interpreter() {
            Ok(program) => program.to_path_buf(),
            Err(e) => return e,
        };

        tracing::info!(
            interpreter = %program.display(),
            entry_point = %self.plan.entry_point.display(),
            "replacing launcher with entry point"
        );

        let err = std::process::Command::new(&program)
            .arg(&self.plan.entry_point)
            .env_clear()
            .envs(&self.plan.env)
            .current_dir(&self.plan.working_dir)
            .exec();

        self.spawn_error(&program, err)
    }

    /// Run the interpreter as a child with inherited stdio and forward its
    /// exit code. Ctrl-C is left to the child.
    pub async fn run_spawned(&self) -> Result<i32> {
        let program: PathBuf = self.interpreter()?.to_path_buf();

        tracing::info!(
            interpreter = %program.display(),
            entry_point = %self.plan.entry_point.display(),
            "spawning entry point"
        );

        let mut child = Command::new(&program)
            .arg(&self.plan.entry_point)
            .env_clear()
            .envs(&self.plan.env)
            .current_dir(&self.plan.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(&program, e))?;

        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("interrupt received; waiting for entry point to exit");
                }
            }
        };

        let code = exit_code_of(status);
        tracing::debug!(code, "entry point exited");
        Ok(code)
    }
}

/// Exit code as a shell would report it: signals map to `128 + signo`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::python::ActivationOutcome;
    use std::collections::BTreeMap;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn plan(dir: &Path, interpreter: Option<PathBuf>) -> LaunchPlan {
        LaunchPlan {
            working_dir: dir.to_path_buf(),
            venv_dir: dir.join("venv"),
            activation: ActivationOutcome::Skipped {
                artifact: dir.join("venv/bin/activate"),
                reason: "test".to_string(),
            },
            interpreter: "python3".to_string(),
            resolved_interpreter: interpreter,
            entry_point: PathBuf::from("main_launcher.py"),
            handoff: HandoffMode::Spawn,
            env: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn spawned_exit_code_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        write_script(&python, "exit 3");

        let plan = plan(dir.path(), Some(python));
        assert_eq!(EntryPointExecutor::new(&plan).hand_off().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn entry_point_is_passed_as_only_argument() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        write_script(
            &python,
            "[ \"$#\" -eq 1 ] && [ \"$1\" = main_launcher.py ] && exit 0\nexit 9",
        );

        let plan = plan(dir.path(), Some(python));
        assert_eq!(EntryPointExecutor::new(&plan).run_spawned().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn signal_death_maps_to_128_plus_signo() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        write_script(&python, "kill -TERM $$");

        let plan = plan(dir.path(), Some(python));
        assert_eq!(
            EntryPointExecutor::new(&plan).run_spawned().await.unwrap(),
            128 + 15
        );
    }

    #[tokio::test]
    async fn unresolved_interpreter_is_127() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path(), None);

        let err = EntryPointExecutor::new(&plan).hand_off().await.unwrap_err();
        assert_eq!(err.exit_code(), 127);
    }

    #[tokio::test]
    async fn non_executable_interpreter_is_126() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        std::fs::write(&python, "#!/bin/sh\nexit 0\n").unwrap();

        let plan = plan(dir.path(), Some(python));
        let err = EntryPointExecutor::new(&plan).run_spawned().await.unwrap_err();
        assert_eq!(err.exit_code(), 126);
    }
}
