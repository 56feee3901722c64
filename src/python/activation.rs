use crate::core::error::{LauncherError, Result};
use crate::launcher::ExecutionContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Static assignments recovered from an `activate` script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationScript {
    pub virtual_env: Option<String>,
    pub prompt: Option<String>,
}

impl ActivationScript {
    /// Pick out the first literal `VIRTUAL_ENV=` / `VIRTUAL_ENV_PROMPT=`
    /// assignments. Values built from expansions or command substitution are
    /// ignored; the caller falls back to the directory itself.
    pub fn parse(content: &str) -> Self {
        let mut script = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

            if let Some(value) = line.strip_prefix("VIRTUAL_ENV=") {
                if script.virtual_env.is_none() {
                    script.virtual_env = literal_value(value);
                }
            } else if let Some(value) = line.strip_prefix("VIRTUAL_ENV_PROMPT=") {
                if script.prompt.is_none() {
                    script.prompt = literal_value(value);
                }
            }
        }

        script
    }
}

fn literal_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let value = if let Some(inner) = raw.strip_prefix('\'') {
        inner.strip_suffix('\'')?.to_string()
    } else if let Some(inner) = raw.strip_prefix('"') {
        let inner = inner.strip_suffix('"')?;
        if inner.contains('$') || inner.contains('`') || inner.contains('\\') {
            return None;
        }
        inner.to_string()
    } else {
        if raw.contains('$') || raw.contains('`') || raw.contains(char::is_whitespace) {
            return None;
        }
        raw.to_string()
    };

    (!value.is_empty()).then_some(value)
}

/// `key = value` pairs from `pyvenv.cfg`.
pub fn parse_pyvenv_cfg(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActivationOutcome {
    Activated {
        virtual_env: PathBuf,
        prompt: String,
    },
    Skipped {
        artifact: PathBuf,
        reason: String,
    },
}

pub struct VenvActivator {
    venv_path: PathBuf,
}

impl VenvActivator {
    pub fn new(venv_path: PathBuf) -> Self {
        Self { venv_path }
    }

    pub fn venv_path(&self) -> &Path {
        &self.venv_path
    }

    pub fn bin_dir_name() -> &'static str {
        if cfg!(windows) {
            "Scripts"
        } else {
            "bin"
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.venv_path.join(Self::bin_dir_name()).join("activate")
    }

    pub fn pyvenv_cfg_path(&self) -> PathBuf {
        self.venv_path.join("pyvenv.cfg")
    }

    pub fn read_pyvenv_cfg(&self) -> Option<BTreeMap<String, String>> {
        std::fs::read_to_string(self.pyvenv_cfg_path())
            .ok()
            .map(|content| parse_pyvenv_cfg(&content))
    }

    /// Apply the exported effects of sourcing the activation artifact to `ctx`.
    ///
    /// Fails only when the artifact cannot be read; `ctx` is untouched then.
    pub fn activate(&self, ctx: &mut ExecutionContext) -> Result<ActivationOutcome> {
        let content = std::fs::read_to_string(self.artifact_path())?;
        let script = ActivationScript::parse(&content);

        let virtual_env = script
            .virtual_env
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or_else(|| self.venv_path.clone());

        let prompt = script
            .prompt
            .or_else(|| {
                self.read_pyvenv_cfg()
                    .and_then(|cfg| cfg.get("prompt").cloned())
                    .filter(|p| !p.is_empty())
            })
            .unwrap_or_else(|| {
                virtual_env
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

        let bin_dir = virtual_env.join(Self::bin_dir_name());
        let new_path = match ctx.var("PATH").filter(|p| !p.is_empty()) {
            Some(old) => {
                let entries = std::iter::once(bin_dir).chain(std::env::split_paths(old));
                std::env::join_paths(entries)
                    .map_err(|e| LauncherError::Activation(e.to_string()))?
            }
            None => bin_dir.into_os_string(),
        };

        ctx.set_var("VIRTUAL_ENV", virtual_env.clone().into_os_string());
        ctx.set_var("VIRTUAL_ENV_PROMPT", prompt.clone());
        ctx.set_var("PATH", new_path);
        ctx.remove_var("PYTHONHOME");

        tracing::debug!(virtual_env = %virtual_env.display(), "virtual environment activated");

        Ok(ActivationOutcome::Activated {
            virtual_env,
            prompt,
        })
    }
}
