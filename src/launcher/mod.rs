//! The launch sequence: `ChangeDir → Activate → Exec`.
//!
//! Only `ChangeDir` can stop the sequence on its own. Activation failures are
//! governed by [`ActivationPolicy`]; everything after the hand-off belongs to
//! the entry point.

pub mod context;

use crate::config::{ActivationPolicy, HandoffMode, LauncherConfig};
use crate::core::error::{LauncherError, Result};
use crate::core::{expand_vars, resolve_path, ProcessExecutor};
use crate::python::{ActivationOutcome, EntryPointExecutor, VenvActivator};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

pub use context::ExecutionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ChangeDir,
    Activate,
    Exec,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ChangeDir => "change-dir",
            Stage::Activate => "activate",
            Stage::Exec => "exec",
        };
        f.write_str(name)
    }
}

/// Everything the hand-off needs, resolved from config and context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchPlan {
    pub working_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub activation: ActivationOutcome,
    pub interpreter: String,
    pub resolved_interpreter: Option<PathBuf>,
    pub entry_point: PathBuf,
    pub handoff: HandoffMode,
    #[serde(serialize_with = "serialize_env")]
    pub env: BTreeMap<OsString, OsString>,
}

fn serialize_env<S>(
    env: &BTreeMap<OsString, OsString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        env.iter()
            .map(|(k, v)| (k.to_string_lossy(), v.to_string_lossy())),
    )
}

pub struct Launcher {
    config: LauncherConfig,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// The project directory for the user described by `ctx`.
    pub fn target_dir(&self, ctx: &ExecutionContext) -> PathBuf {
        resolve_path(&ctx.working_dir, expand_vars(&self.config.project.dir, &ctx.env))
    }

    /// Run `ChangeDir` and `Activate` against `ctx` and resolve the interpreter.
    pub fn prepare(&self, ctx: &mut ExecutionContext) -> Result<LaunchPlan> {
        let target = self.target_dir(ctx);
        tracing::debug!(stage = %Stage::ChangeDir, target = %target.display());
        ctx.change_dir(&target)?;

        let venv_dir = ctx.working_dir.join(&self.config.python.venv_dir);
        let activator = VenvActivator::new(venv_dir.clone());
        tracing::debug!(stage = %Stage::Activate, artifact = %activator.artifact_path().display());
        let activation = match activator.activate(ctx) {
            Ok(outcome) => outcome,
            Err(e) => self.activation_failed(activator.artifact_path(), e)?,
        };

        for (key, value) in &self.config.environment {
            ctx.set_var(key.clone(), value.clone());
        }

        let interpreter = self.config.python.interpreter.clone();
        let resolved_interpreter =
            ProcessExecutor::find_in_path(&interpreter, ctx.var("PATH"), &ctx.working_dir);
        tracing::debug!(
            stage = %Stage::Exec,
            interpreter = %interpreter,
            resolved = ?resolved_interpreter
        );

        Ok(LaunchPlan {
            working_dir: ctx.working_dir.clone(),
            venv_dir,
            activation,
            interpreter,
            resolved_interpreter,
            entry_point: PathBuf::from(&self.config.project.entry_point),
            handoff: self.config.handoff.mode,
            env: ctx.env.clone(),
        })
    }

    fn activation_failed(
        &self,
        artifact: PathBuf,
        err: LauncherError,
    ) -> Result<ActivationOutcome> {
        let reason = match &err {
            LauncherError::Io(io) => io.to_string(),
            other => other.to_string(),
        };

        match self.config.activation.policy {
            ActivationPolicy::Strict => Err(LauncherError::Activation(format!(
                "{}: {}",
                artifact.display(),
                reason
            ))),
            ActivationPolicy::Lenient => {
                tracing::warn!(
                    artifact = %artifact.display(),
                    %reason,
                    "activation skipped; continuing with the inherited environment"
                );
                Ok(ActivationOutcome::Skipped { artifact, reason })
            }
        }
    }

    /// Full sequence. Returns the entry point's exit code in spawn mode; in
    /// exec mode a successful hand-off never returns.
    pub async fn launch(&self, mut ctx: ExecutionContext) -> Result<i32> {
        let plan = self.prepare(&mut ctx)?;
        EntryPointExecutor::new(&plan).hand_off().await
    }
}
