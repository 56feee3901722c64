use crate::config::schema::LauncherConfig;
use crate::config::validate_launcher_config;
use crate::core::error::{LauncherError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::fs;

const CONFIG_FILE: &str = "launcher.toml";
pub const CONFIG_ENV_VAR: &str = "SOUNDING_LAUNCHER_CONFIG";

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Pick the config file: explicit path, then `SOUNDING_LAUNCHER_CONFIG`,
    /// then `launcher.toml` in the platform config directory.
    pub fn locate(explicit: Option<&Path>, env: &BTreeMap<OsString, OsString>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path.to_path_buf()));
        }

        if let Some(path) = env.get(OsStr::new(CONFIG_ENV_VAR)).filter(|p| !p.is_empty()) {
            return Ok(Self::new(PathBuf::from(path)));
        }

        Ok(Self::new(Self::get_config_dir(env)?.join(CONFIG_FILE)))
    }

    fn get_config_dir(env: &BTreeMap<OsString, OsString>) -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "sounding", "sounding-launcher") {
            Ok(proj_dirs.config_dir().to_path_buf())
        } else {
            let home = env.get(OsStr::new("HOME")).ok_or_else(|| {
                LauncherError::Config("cannot determine a config directory".to_string())
            })?;
            Ok(PathBuf::from(home).join(".sounding-launcher"))
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub async fn load(&self) -> Result<LauncherConfig> {
        if !self.exists() {
            return Ok(LauncherConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("failed to read {}", self.config_path.display()))?;
        let config: LauncherConfig = toml::from_str(&content).map_err(|e| {
            LauncherError::Config(format!("{}: {}", self.config_path.display(), e))
        })?;
        validate_launcher_config(&config)?;
        Ok(config)
    }

    pub async fn save(&self, config: &LauncherConfig) -> Result<()> {
        validate_launcher_config(config)?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await?;
        Ok(())
    }

    /// Write the default config unless a file already exists (or `force`).
    /// Returns whether a file was written.
    pub async fn init(&self, force: bool) -> Result<bool> {
        if self.exists() && !force {
            return Ok(false);
        }
        self.save(&LauncherConfig::default()).await?;
        Ok(true)
    }
}
