use crate::config::load_effective;
use crate::core::error::Result;
use crate::launcher::{ExecutionContext, Launcher};
use crate::python::ActivationOutcome;
use colored::Colorize;
use std::path::Path;

pub async fn execute(config_path: Option<&Path>, json: bool) -> Result<i32> {
    let mut ctx = ExecutionContext::from_process()?;
    let (_, config) = load_effective(config_path, &ctx.env).await?;
    let plan = Launcher::new(config).prepare(&mut ctx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(0);
    }

    println!("{}", "Launch plan".bold());
    println!("  Directory:   {}", plan.working_dir.display().to_string().cyan());

    match &plan.activation {
        ActivationOutcome::Activated {
            virtual_env,
            prompt,
        } => println!(
            "  Virtualenv:  {} {}",
            virtual_env.display().to_string().cyan(),
            format!("[{}]", prompt.trim()).dimmed()
        ),
        ActivationOutcome::Skipped { artifact, reason } => println!(
            "  Virtualenv:  {} ({}: {})",
            "not activated".yellow(),
            artifact.display(),
            reason
        ),
    }

    match &plan.resolved_interpreter {
        Some(path) => println!("  Interpreter: {}", path.display().to_string().cyan()),
        None => println!(
            "  Interpreter: {} ({})",
            plan.interpreter.red(),
            "not found on PATH".red()
        ),
    }
    println!("  Entry point: {}", plan.entry_point.display().to_string().cyan());
    println!("  Hand-off:    {}", plan.handoff.to_str().yellow());

    Ok(0)
}
