use crate::config::load_effective;
use crate::core::error::Result;
use crate::launcher::{ExecutionContext, Launcher};
use std::path::Path;

pub async fn execute(config_path: Option<&Path>) -> Result<i32> {
    let ctx = ExecutionContext::from_process()?;
    let (_, config) = load_effective(config_path, &ctx.env).await?;

    Launcher::new(config).launch(ctx).await
}
