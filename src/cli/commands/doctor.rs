use crate::config::load_effective;
use crate::core::error::{LauncherError, Result};
use crate::core::ProcessExecutor;
use crate::launcher::{ExecutionContext, Launcher};
use crate::python::{ActivationOutcome, VenvActivator};
use colored::Colorize;
use std::path::Path;

pub async fn execute(config_path: Option<&Path>) -> Result<i32> {
    println!("{}", "Running launch checks...".bold());
    println!();

    let mut ctx = ExecutionContext::from_process()?;
    let mut all_ok = true;

    // Config
    print!("Checking config... ");
    let (manager, config) = match load_effective(config_path, &ctx.env).await {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{}", "✗ Invalid".red());
            println!("  {}", e);
            return Ok(1);
        }
    };
    if manager.exists() {
        println!(
            "{} ({})",
            "✓".green(),
            manager.config_path().display().to_string().yellow()
        );
    } else {
        println!("{}", "○ Using defaults".yellow());
    }

    let launcher = Launcher::new(config);

    // Project directory
    print!("Checking project directory... ");
    let plan = match launcher.prepare(&mut ctx) {
        Ok(plan) => {
            println!("{} ({})", "✓".green(), plan.working_dir.display().to_string().cyan());
            plan
        }
        Err(LauncherError::Activation(reason)) => {
            println!("{} ({})", "✓".green(), ctx.working_dir.display().to_string().cyan());
            println!("Checking virtualenv... {}", "✗ Not found".red());
            println!("  {}", reason);
            println!();
            println!("{}", "Launch would exit with status 1 (strict activation).".yellow().bold());
            return Ok(1);
        }
        Err(e) => {
            println!("{}", "✗ Unavailable".red());
            println!("  {}", e);
            if ctx.user.is_none() {
                println!("  {} is not set", "USER".cyan());
            }
            println!();
            println!("{}", "Launch would exit with status 1.".yellow().bold());
            return Ok(1);
        }
    };

    // Virtualenv
    print!("Checking virtualenv... ");
    let activator = VenvActivator::new(plan.venv_dir.clone());
    match &plan.activation {
        ActivationOutcome::Activated { virtual_env, .. } => {
            let version = activator
                .read_pyvenv_cfg()
                .and_then(|cfg| cfg.get("version").or_else(|| cfg.get("version_info")).cloned());
            match version {
                Some(v) => println!("{} (Python {})", "✓".green(), v.yellow()),
                None => println!("{}", "✓".green()),
            }
            println!("  VIRTUAL_ENV: {}", virtual_env.display().to_string().cyan());
        }
        ActivationOutcome::Skipped { artifact, reason } => {
            // Strict policy never gets here: prepare() already failed.
            println!("{}", "○ Not activated (lenient policy)".yellow());
            println!("  {}: {}", artifact.display(), reason);
        }
    }

    // Interpreter
    print!("Checking interpreter... ");
    match &plan.resolved_interpreter {
        Some(python) if ProcessExecutor::is_executable(python) => {
            let version = ProcessExecutor::execute_with_output(
                python,
                &["--version"],
                &plan.env,
                &plan.working_dir,
            )
            .await;
            match version {
                Ok(v) => println!("{} ({})", "✓".green(), v.trim().yellow()),
                Err(_) => println!("{} ({})", "✓".green(), python.display()),
            }
        }
        Some(python) => {
            println!("{}", "✗ Not executable".red());
            println!("  {}", python.display());
            all_ok = false;
        }
        None => {
            println!("{}", "✗ Not found".red());
            println!("  {} is not on PATH", plan.interpreter.cyan());
            all_ok = false;
        }
    }

    // Entry point
    print!("Checking entry point... ");
    let entry_point = plan.working_dir.join(&plan.entry_point);
    if entry_point.is_file() {
        println!("{} ({})", "✓".green(), plan.entry_point.display().to_string().cyan());
    } else {
        println!("{}", "✗ Not found".red());
        println!("  {}", entry_point.display());
        all_ok = false;
    }

    println!();
    if all_ok {
        println!("{}", "All checks passed!".green().bold());
        Ok(0)
    } else {
        println!(
            "{}",
            "Some checks failed. Please fix the issues above."
                .yellow()
                .bold()
        );
        Ok(1)
    }
}
