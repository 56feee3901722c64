use crate::config::schema::LauncherConfig;
use crate::core::error::{LauncherError, Result};
use std::path::Path;

fn require_relative(field: &str, value: &str) -> Result<()> {
    if Path::new(value).is_absolute() {
        return Err(LauncherError::Config(format!(
            "{} must be relative to the project directory",
            field
        )));
    }
    Ok(())
}

pub fn validate_environment_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LauncherError::Config(
            "environment keys cannot be empty".to_string(),
        ));
    }

    if key.contains('=') || key.contains('\0') {
        return Err(LauncherError::Config(format!(
            "environment key '{}' may not contain '=' or NUL",
            key.escape_default()
        )));
    }

    Ok(())
}

pub fn validate_launcher_config(config: &LauncherConfig) -> Result<()> {
    if config.project.dir.trim().is_empty() {
        return Err(LauncherError::Config(
            "project.dir cannot be empty".to_string(),
        ));
    }

    if config.project.entry_point.trim().is_empty() {
        return Err(LauncherError::Config(
            "project.entry_point cannot be empty".to_string(),
        ));
    }
    require_relative("project.entry_point", &config.project.entry_point)?;

    if config.python.venv_dir.trim().is_empty() {
        return Err(LauncherError::Config(
            "python.venv_dir cannot be empty".to_string(),
        ));
    }
    require_relative("python.venv_dir", &config.python.venv_dir)?;

    if config.python.interpreter.trim().is_empty() {
        return Err(LauncherError::Config(
            "python.interpreter cannot be empty".to_string(),
        ));
    }

    for (key, value) in &config.environment {
        validate_environment_key(key)?;
        if value.contains('\0') {
            return Err(LauncherError::Config(format!(
                "environment value for '{}' may not contain NUL",
                key
            )));
        }
    }

    Ok(())
}
