use crate::core::error::{LauncherError, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Run `cmd` to completion with exactly `env` as its environment.
    pub async fn execute(
        cmd: &Path,
        args: &[&str],
        env: &BTreeMap<OsString, OsString>,
        cwd: &Path,
    ) -> Result<Output> {
        let output = Command::new(cmd)
            .args(args)
            .env_clear()
            .envs(env)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| LauncherError::CommandFailed(format!("{}: {}", cmd.display(), e)))?;

        Ok(output)
    }

    pub async fn execute_with_output(
        cmd: &Path,
        args: &[&str],
        env: &BTreeMap<OsString, OsString>,
        cwd: &Path,
    ) -> Result<String> {
        let output = Self::execute(cmd, args, env, cwd).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LauncherError::CommandFailed(format!(
                "{} failed: {}",
                cmd.display(),
                stderr.trim()
            )));
        }

        // Python 2 and early 3.x print `--version` to stderr.
        let text = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(String::from_utf8_lossy(text).trim().to_string())
    }

    /// Resolve `name` the way a shell resolves a command word.
    ///
    /// Names containing a separator are taken as paths (relative to `cwd`);
    /// otherwise each entry of `path_var` is searched in order, empty entries
    /// meaning the current directory. The first executable match wins. A
    /// non-executable file is returned only when nothing executable exists,
    /// so the hand-off can report it as such.
    pub fn find_in_path(name: &str, path_var: Option<&OsStr>, cwd: &Path) -> Option<PathBuf> {
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            let candidate = cwd.join(name);
            return candidate.exists().then_some(candidate);
        }

        let path_var = path_var?;
        let mut first_file = None;
        for dir in std::env::split_paths(path_var) {
            let candidate = if dir.as_os_str().is_empty() {
                cwd.join(name)
            } else {
                cwd.join(dir).join(name)
            };

            if Self::is_executable(&candidate) {
                return Some(candidate);
            }
            if first_file.is_none() && candidate.is_file() {
                first_file = Some(candidate);
            }
        }

        first_file
    }

    #[cfg(unix)]
    pub fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    pub fn is_executable(path: &Path) -> bool {
        path.is_file()
    }
}
