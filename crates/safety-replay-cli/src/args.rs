//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use safety_replay_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "safety-replay")]
#[command(about = "Replay recorded drives through CAN safety models")]
#[command(
    long_about = r#"Safety Replay - replay recorded drives through CAN safety models

USAGE:
  safety-replay                            # Download missing routes, then replay all cases
  safety-replay --case ROUTE,MODE,PARAM    # Replay specific cases instead of the configured ones
  safety-replay fetch                      # Download pass only
  safety-replay modes                      # List safety modes

UTILITY COMMANDS:
  safety-replay config init                # Create config file
  safety-replay config show                # Show effective config"#
)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to configuration file (JSON, or TOML by extension)
    #[arg(long = "config", global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Test case as ROUTE,MODE,PARAM; repeatable, replaces the configured cases
    #[arg(long = "case", global = true, value_name = "ROUTE,MODE,PARAM")]
    pub cases: Vec<String>,

    /// Base URL route identifiers are appended to
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory route files are read from and downloaded to
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Stop at the first failing case
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Per-request download timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download missing routes, then replay every case (default)
    Run,

    /// Download missing routes without replaying
    Fetch,

    /// List the safety mode table
    Modes,

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Display the effective configuration
    Show,

    /// Create a new configuration file with defaults
    Init {
        /// Overwrite existing file without prompting
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_run() {
        let cli = Cli::try_parse_from(["safety-replay"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.options.config_file, DEFAULT_CONFIG_FILE);
        assert!(cli.options.cases.is_empty());
    }

    #[test]
    fn test_repeated_cases_and_global_flags() {
        let cli = Cli::try_parse_from([
            "safety-replay",
            "run",
            "--case",
            "a,SUBARU,0",
            "--case",
            "b,NOOUTPUT,0",
            "--fail-fast",
            "--data-dir",
            "/tmp/routes",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.options.cases, vec!["a,SUBARU,0", "b,NOOUTPUT,0"]);
        assert!(cli.options.fail_fast);
        assert_eq!(cli.options.data_dir, Some(PathBuf::from("/tmp/routes")));
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::try_parse_from([
            "safety-replay",
            "config",
            "init",
            "--force",
            "--config",
            "replay.toml",
        ])
        .unwrap();
        assert_eq!(cli.options.config_file, "replay.toml");
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
