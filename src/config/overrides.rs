use crate::config::schema::{ActivationPolicy, HandoffMode, LauncherConfig};
use crate::core::error::{LauncherError, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

pub const PROJECT_DIR_VAR: &str = "SOUNDING_LAUNCHER_PROJECT_DIR";
pub const ACTIVATION_VAR: &str = "SOUNDING_LAUNCHER_ACTIVATION";
pub const HANDOFF_VAR: &str = "SOUNDING_LAUNCHER_HANDOFF";

/// Settings taken from the launcher's environment, layered over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub project_dir: Option<String>,
    pub activation: Option<ActivationPolicy>,
    pub handoff: Option<HandoffMode>,
}

impl EnvOverrides {
    pub fn from_env(env: &BTreeMap<OsString, OsString>) -> Result<Self> {
        let project_dir = Self::utf8(env, PROJECT_DIR_VAR)?
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string);

        let activation = match Self::utf8(env, ACTIVATION_VAR)? {
            Some(value) => Some(ActivationPolicy::parse(value).ok_or_else(|| {
                LauncherError::Config(format!(
                    "{} must be 'lenient' or 'strict', got '{}'",
                    ACTIVATION_VAR, value
                ))
            })?),
            None => None,
        };

        let handoff = match Self::utf8(env, HANDOFF_VAR)? {
            Some(value) => Some(HandoffMode::parse(value).ok_or_else(|| {
                LauncherError::Config(format!(
                    "{} must be 'exec' or 'spawn', got '{}'",
                    HANDOFF_VAR, value
                ))
            })?),
            None => None,
        };

        Ok(Self {
            project_dir,
            activation,
            handoff,
        })
    }

    fn utf8<'a>(env: &'a BTreeMap<OsString, OsString>, key: &str) -> Result<Option<&'a str>> {
        match env.get(OsStr::new(key)) {
            Some(value) => value
                .to_str()
                .map(Some)
                .ok_or_else(|| LauncherError::Config(format!("{} is not valid UTF-8", key))),
            None => Ok(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, config: &mut LauncherConfig) {
        if let Some(dir) = &self.project_dir {
            config.project.dir = dir.clone();
        }
        if let Some(policy) = self.activation {
            config.activation.policy = policy;
        }
        if let Some(mode) = self.handoff {
            config.handoff.mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<OsString, OsString> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn no_vars_means_no_overrides() {
        let overrides = EnvOverrides::from_env(&env(&[("USER", "alice")])).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn overrides_replace_file_values() {
        let overrides = EnvOverrides::from_env(&env(&[
            (PROJECT_DIR_VAR, "/srv/sounding"),
            (ACTIVATION_VAR, "strict"),
            (HANDOFF_VAR, "spawn"),
        ]))
        .unwrap();

        let mut config = LauncherConfig::default();
        overrides.apply(&mut config);

        assert_eq!(config.project.dir, "/srv/sounding");
        assert_eq!(config.activation.policy, ActivationPolicy::Strict);
        assert_eq!(config.handoff.mode, HandoffMode::Spawn);
        assert_eq!(config.project.entry_point, "main_launcher.py");
    }

    #[test]
    fn blank_project_dir_is_ignored() {
        let overrides = EnvOverrides::from_env(&env(&[(PROJECT_DIR_VAR, " ")])).unwrap();
        assert_eq!(overrides.project_dir, None);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let msg = EnvOverrides::from_env(&env(&[(HANDOFF_VAR, "fork")]))
            .unwrap_err()
            .to_string();
        assert!(msg.contains(HANDOFF_VAR), "unexpected error: {}", msg);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_override_is_a_config_error() {
        use std::os::unix::ffi::OsStringExt;

        let mut env = BTreeMap::new();
        env.insert(
            OsString::from(PROJECT_DIR_VAR),
            OsString::from_vec(b"/srv/caf\xe9".to_vec()),
        );

        let err = EnvOverrides::from_env(&env).unwrap_err();
        assert!(matches!(err, LauncherError::Config(_)));
        assert!(err.to_string().contains(PROJECT_DIR_VAR));
    }
}
