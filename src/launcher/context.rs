use crate::core::error::{LauncherError, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Process-wide state the launch sequence reads and mutates, held as a value.
///
/// Nothing here touches the real working directory or environment; the
/// hand-off applies the context to the entry point's process explicitly.
/// Variables are kept as raw OS strings so nothing is lost on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub user: Option<OsString>,
    pub working_dir: PathBuf,
    pub env: BTreeMap<OsString, OsString>,
}

impl ExecutionContext {
    pub fn new(working_dir: PathBuf, env: BTreeMap<OsString, OsString>) -> Self {
        let user = env
            .get(OsStr::new("USER"))
            .filter(|u| !u.is_empty())
            .cloned();
        Self {
            user,
            working_dir,
            env,
        }
    }

    /// Snapshot the current process.
    pub fn from_process() -> Result<Self> {
        let working_dir = std::env::current_dir()?;
        Ok(Self::new(working_dir, std::env::vars_os().collect()))
    }

    pub fn var(&self, key: &str) -> Option<&OsStr> {
        self.env.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// UTF-8 view of a variable; `None` when unset or not valid UTF-8.
    pub fn var_str(&self, key: &str) -> Option<&str> {
        self.var(key).and_then(OsStr::to_str)
    }

    pub fn set_var(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.env.insert(key.into(), value.into());
    }

    pub fn remove_var(&mut self, key: &str) -> Option<OsString> {
        self.env.remove(OsStr::new(key))
    }

    /// `cd` into `target`: it must be an existing, searchable directory.
    ///
    /// Updates `PWD`/`OLDPWD` and keeps the logical (non-canonical) path.
    pub fn change_dir(&mut self, target: &Path) -> Result<()> {
        let target = self.working_dir.join(target);

        let metadata = std::fs::metadata(&target).map_err(|e| LauncherError::ChangeDir {
            path: target.clone(),
            reason: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(LauncherError::ChangeDir {
                path: target,
                reason: "Not a directory".to_string(),
            });
        }

        // Resolving `dir/.` needs search permission on `dir`, same as chdir(2).
        target
            .join(".")
            .canonicalize()
            .map_err(|e| LauncherError::ChangeDir {
                path: target.clone(),
                reason: e.to_string(),
            })?;

        let pwd = target.clone().into_os_string();
        let previous = std::mem::replace(&mut self.working_dir, target);
        self.set_var("OLDPWD", previous.into_os_string());
        self.set_var("PWD", pwd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_in(dir: &Path) -> ExecutionContext {
        let mut env = BTreeMap::new();
        env.insert(OsString::from("USER"), OsString::from("alice"));
        ExecutionContext::new(dir.to_path_buf(), env)
    }

    #[test]
    fn user_comes_from_env() {
        let ctx = ctx_in(Path::new("/"));
        assert_eq!(ctx.user.as_deref(), Some(OsStr::new("alice")));
        assert_eq!(ctx.var_str("USER"), Some("alice"));

        let ctx = ExecutionContext::new(PathBuf::from("/"), BTreeMap::new());
        assert_eq!(ctx.user, None);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_user_is_kept() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"caf\xe9".to_vec());
        let mut env = BTreeMap::new();
        env.insert(OsString::from("USER"), raw.clone());

        let ctx = ExecutionContext::new(PathBuf::from("/"), env);
        assert_eq!(ctx.user, Some(raw.clone()));
        assert_eq!(ctx.var("USER"), Some(raw.as_os_str()));
        assert_eq!(ctx.var_str("USER"), None);
    }

    #[test]
    fn change_dir_updates_pwd_and_oldpwd() {
        let start = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(start.path());

        ctx.change_dir(target.path()).unwrap();

        assert_eq!(ctx.working_dir, target.path());
        assert_eq!(ctx.var("PWD"), Some(target.path().as_os_str()));
        assert_eq!(ctx.var("OLDPWD"), Some(start.path().as_os_str()));
    }

    #[test]
    fn relative_target_resolves_against_working_dir() {
        let start = tempfile::tempdir().unwrap();
        std::fs::create_dir(start.path().join("sounding_app")).unwrap();
        let mut ctx = ctx_in(start.path());

        ctx.change_dir(Path::new("sounding_app")).unwrap();
        assert_eq!(ctx.working_dir, start.path().join("sounding_app"));
    }

    #[test]
    fn missing_dir_leaves_context_untouched() {
        let start = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(start.path());
        let before = ctx.clone();

        let err = ctx
            .change_dir(&start.path().join("does-not-exist"))
            .unwrap_err();

        assert!(matches!(err, LauncherError::ChangeDir { .. }));
        assert_eq!(ctx, before);
    }

    #[test]
    fn regular_file_is_not_a_directory() {
        let start = tempfile::tempdir().unwrap();
        let file = start.path().join("main_launcher.py");
        std::fs::write(&file, "print('hi')\n").unwrap();
        let mut ctx = ctx_in(start.path());

        let msg = ctx.change_dir(&file).unwrap_err().to_string();
        assert!(msg.contains("Not a directory"), "unexpected error: {}", msg);
    }

    #[cfg(unix)]
    #[test]
    fn unsearchable_dir_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let start = tempfile::tempdir().unwrap();
        let locked = start.path().join("sounding_app");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut ctx = ctx_in(start.path());
        let before = ctx.clone();
        let result = ctx.change_dir(&locked);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, LauncherError::ChangeDir { .. }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(ctx, before);
    }
}
