//! Configuration management commands

use crate::console::CliConsole;
use safety_replay_core::ReplayConfig;
use safety_replay_core::error::{ReplayError, ReplayResult};
use std::path::Path;

/// Show the effective configuration after all layers were applied
pub async fn show(config: &ReplayConfig, config_file: &str) -> ReplayResult<()> {
    let console = CliConsole::new(true);
    console.print_header("Configuration");

    if Path::new(config_file).exists() {
        console.success(&format!("Loaded configuration from: {}", config_file));
    } else {
        console.warn(&format!("Configuration file not found: {}", config_file));
        console.info("Using defaults, environment and flags");
    }

    println!("{}", render(config, config_file)?);
    Ok(())
}

/// Write a starter configuration file
pub async fn init(config_file: &str, force: bool) -> ReplayResult<()> {
    let console = CliConsole::new(true);
    let path = Path::new(config_file);

    if path.exists() && !force {
        return Err(ReplayError::config_with_context(
            format!("Configuration file already exists: {}", config_file),
            "use --force to overwrite",
        ));
    }

    let content = render(&ReplayConfig::default(), config_file)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| ReplayError::io_with_path(e.to_string(), config_file))?;

    console.success(&format!("Created configuration file: {}", config_file));
    Ok(())
}

/// Serialize in the format the file extension selects
fn render(config: &ReplayConfig, config_file: &str) -> ReplayResult<String> {
    let is_toml = Path::new(config_file)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::to_string_pretty(config)
            .map_err(|e| ReplayError::config(format!("Failed to serialize config: {}", e)))
    } else {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_replay_core::config::load_from_file;

    #[tokio::test]
    async fn test_init_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay_config.json");
        let file = path.to_string_lossy().into_owned();

        init(&file, false).await.unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded, ReplayConfig::default());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay_config.toml");
        std::fs::write(&path, "fail_fast = true\n").unwrap();
        let file = path.to_string_lossy().into_owned();

        assert!(init(&file, false).await.is_err());
        init(&file, true).await.unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert!(!loaded.fail_fast);
    }
}
