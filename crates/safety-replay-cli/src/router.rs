//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, GlobalOptions};
use crate::commands;
use crate::logging;
use safety_replay_core::config::{ConfigOverrides, LoggingConfig, ReplayConfig};
use safety_replay_core::error::ReplayResult;
use safety_replay_core::{ConfigLoader, TestCase};

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> ReplayResult<()> {
    let options = cli.options;

    match cli.command {
        // Must work even when the existing file is broken
        Some(Commands::Config {
            action: ConfigAction::Init { force },
        }) => {
            logging::init(&LoggingConfig::default(), options.verbose);
            commands::config::init(&options.config_file, force).await
        }
        command => {
            let config = load_config(&options)?;
            logging::init(&config.logging, options.verbose);
            tracing::debug!(
                "Loaded configuration from {} with {} case(s)",
                options.config_file,
                config.cases.len()
            );

            match command {
                Some(Commands::Fetch) => commands::fetch::execute(config, &options).await,
                Some(Commands::Modes) => commands::modes::execute(&config).await,
                Some(Commands::Config { .. }) => {
                    commands::config::show(&config, &options.config_file).await
                }
                None | Some(Commands::Run) => commands::run::execute(config, &options).await,
            }
        }
    }
}

/// Layer defaults, the config file, `REPLAY_*` variables and flags
fn load_config(options: &GlobalOptions) -> ReplayResult<ReplayConfig> {
    ConfigLoader::new()
        .with_defaults()
        .with_file(&options.config_file)
        .with_env()
        .with_args(overrides_from_options(options)?)
        .load()
}

fn overrides_from_options(options: &GlobalOptions) -> ReplayResult<ConfigOverrides> {
    let cases = options
        .cases
        .iter()
        .map(|spec| TestCase::parse_spec(spec))
        .collect::<ReplayResult<Vec<_>>>()?;

    Ok(ConfigOverrides {
        base_url: options.base_url.clone(),
        data_dir: options.data_dir.clone(),
        cases,
        fail_fast: options.fail_fast.then_some(true),
        request_timeout_secs: options.timeout_secs,
        log_level: None,
        log_format: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn options() -> GlobalOptions {
        GlobalOptions {
            config_file: "missing.json".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_overrides_parse_cases() {
        let opts = GlobalOptions {
            cases: vec!["route-a, SUBARU ,0".to_string()],
            data_dir: Some(PathBuf::from("/data")),
            ..options()
        };
        let overrides = overrides_from_options(&opts).unwrap();
        assert_eq!(overrides.cases, vec![TestCase::new("route-a", "SUBARU", "0")]);
        assert_eq!(overrides.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(overrides.fail_fast, None);
    }

    #[test]
    fn test_overrides_reject_malformed_case() {
        let opts = GlobalOptions {
            cases: vec!["only-a-route".to_string()],
            ..options()
        };
        assert!(overrides_from_options(&opts).is_err());
    }

    #[test]
    fn test_fail_fast_flag_only_overrides_when_set() {
        let opts = GlobalOptions {
            fail_fast: true,
            ..options()
        };
        assert_eq!(overrides_from_options(&opts).unwrap().fail_fast, Some(true));
    }

    #[test]
    fn test_load_config_from_toml_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://localhost:9000/ci"
cases = [{ route = "from-file", mode = "SUBARU", param = "0" }]
"#,
        )
        .unwrap();

        let opts = GlobalOptions {
            config_file: path.to_string_lossy().into_owned(),
            cases: vec!["from-flag,NOOUTPUT,0".to_string()],
            ..Default::default()
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/ci/");
        assert_eq!(config.cases.len(), 1);
        assert_eq!(config.cases[0].route, "from-flag");
    }
}
