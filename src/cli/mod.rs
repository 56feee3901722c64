pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sounding-launcher",
    version,
    about = "Enter the sounding app directory, activate its virtualenv and start the Python launcher",
    long_about = "Run without arguments to launch: change into the project directory, \
                  activate venv/bin/activate and replace this process with \
                  `python3 main_launcher.py`."
)]
pub struct Cli {
    /// Config file (default: $SOUNDING_LAUNCHER_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,

    /// Print the effective configuration (file, defaults and env overrides)
    Show,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the launch without handing off, and print the result
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the project directory, virtualenv, interpreter and entry point
    Doctor,

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Dispatch the parsed command line. The returned value is the process exit code.
pub async fn run(cli: Cli) -> crate::core::error::Result<i32> {
    let config = cli.config.as_deref();

    match cli.command {
        None => commands::launch::execute(config).await,

        Some(Commands::Plan { json }) => commands::plan::execute(config, json).await,

        Some(Commands::Doctor) => commands::doctor::execute(config).await,

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => commands::config::path(config).await,
            ConfigCommands::Show => commands::config::show(config).await,
            ConfigCommands::Init { force } => commands::config::init(config, force).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_launches() {
        let cli = Cli::try_parse_from(["sounding-launcher"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["sounding-launcher", "plan", "--json", "--config", "/tmp/l.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/l.toml")));
        assert!(matches!(cli.command, Some(Commands::Plan { json: true })));
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["sounding-launcher", "main_launcher.py"]).is_err());
    }
}
