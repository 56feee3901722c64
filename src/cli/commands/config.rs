use crate::config::{load_effective, ConfigManager};
use crate::core::error::Result;
use crate::launcher::ExecutionContext;
use colored::Colorize;
use std::path::Path;

pub async fn path(config_path: Option<&Path>) -> Result<i32> {
    let ctx = ExecutionContext::from_process()?;
    let manager = ConfigManager::locate(config_path, &ctx.env)?;

    println!("{}", manager.config_path().display());
    Ok(0)
}

pub async fn show(config_path: Option<&Path>) -> Result<i32> {
    let ctx = ExecutionContext::from_process()?;
    let (manager, config) = load_effective(config_path, &ctx.env).await?;

    let source = if manager.exists() {
        manager.config_path().display().to_string()
    } else {
        "defaults (no config file)".to_string()
    };
    println!("{} {}", "#".dimmed(), source.dimmed());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(0)
}

pub async fn init(config_path: Option<&Path>, force: bool) -> Result<i32> {
    let ctx = ExecutionContext::from_process()?;
    let manager = ConfigManager::locate(config_path, &ctx.env)?;

    if manager.init(force).await? {
        println!(
            "{} Wrote {}",
            "✓".green().bold(),
            manager.config_path().display().to_string().yellow()
        );
    } else {
        println!(
            "{} {} already exists (use {} to overwrite)",
            "ℹ".blue().bold(),
            manager.config_path().display(),
            "--force".cyan()
        );
    }
    Ok(0)
}
