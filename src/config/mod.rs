pub mod global;
pub mod overrides;
pub mod schema;
pub mod validation;

use crate::core::error::Result;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

pub use global::ConfigManager;
pub use overrides::EnvOverrides;
pub use schema::{
    ActivationPolicy, HandoffMode, LauncherConfig, DEFAULT_ENTRY_POINT, DEFAULT_INTERPRETER,
    DEFAULT_PROJECT_DIR, DEFAULT_VENV_DIR,
};
pub use validation::{validate_environment_key, validate_launcher_config};

/// The config file (or defaults) with environment overrides applied.
pub async fn load_effective(
    explicit: Option<&Path>,
    env: &BTreeMap<OsString, OsString>,
) -> Result<(ConfigManager, LauncherConfig)> {
    let manager = ConfigManager::locate(explicit, env)?;
    let mut config = manager.load().await?;

    let overrides = EnvOverrides::from_env(env)?;
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "applying environment overrides");
        overrides.apply(&mut config);
        validate_launcher_config(&config)?;
    }

    Ok((manager, config))
}
