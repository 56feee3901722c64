use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PROJECT_DIR: &str = "/Users/${USER}/Desktop/sounding_app";
pub const DEFAULT_ENTRY_POINT: &str = "main_launcher.py";
pub const DEFAULT_VENV_DIR: &str = "venv";
pub const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LauncherConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub activation: ActivationConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProjectConfig {
    /// Directory template; `$VAR`, `${VAR}` and `~` are expanded.
    #[serde(default = "default_project_dir")]
    pub dir: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PythonConfig {
    #[serde(default = "default_venv_dir")]
    pub venv_dir: String,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ActivationConfig {
    #[serde(default)]
    pub policy: ActivationPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct HandoffConfig {
    #[serde(default)]
    pub mode: HandoffMode,
}

/// What to do when the activation artifact is missing or unreadable.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivationPolicy {
    /// Warn and continue with the environment unmodified.
    #[default]
    Lenient,
    /// Abort before the hand-off.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// Replace the launcher's process image.
    #[default]
    Exec,
    /// Run the entry point as a child and forward its exit code.
    Spawn,
}

impl ActivationPolicy {
    pub fn to_str(&self) -> &str {
        match self {
            ActivationPolicy::Lenient => "lenient",
            ActivationPolicy::Strict => "strict",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(ActivationPolicy::Lenient),
            "strict" => Some(ActivationPolicy::Strict),
            _ => None,
        }
    }
}

impl HandoffMode {
    pub fn to_str(&self) -> &str {
        match self {
            HandoffMode::Exec => "exec",
            HandoffMode::Spawn => "spawn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exec" => Some(HandoffMode::Exec),
            "spawn" => Some(HandoffMode::Spawn),
            _ => None,
        }
    }
}

fn default_project_dir() -> String {
    DEFAULT_PROJECT_DIR.to_string()
}

fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

fn default_venv_dir() -> String {
    DEFAULT_VENV_DIR.to_string()
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dir: default_project_dir(),
            entry_point: default_entry_point(),
        }
    }
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            venv_dir: default_venv_dir(),
            interpreter: default_interpreter(),
        }
    }
}
