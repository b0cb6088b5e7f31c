use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Per-checkout environment file, read before the config file
pub const LOCAL_ENV_PATH: &str = "config/local.env";

/// Export `KEY=value` lines of `config/local.env` unless already set
pub fn load_local_env_overrides() {
    load_env_file(Path::new(LOCAL_ENV_PATH));
}

/// Returns how many variables were exported
fn load_env_file(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            let mut exported = 0;
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    warn!(line = idx + 1, "invalid local.env entry; skipping");
                    continue;
                };
                let key = key.trim();
                if key.is_empty() || env::var(key).is_ok() {
                    continue;
                }
                env::set_var(key, unescape_value(value.trim()));
                exported += 1;
            }
            info!(
                path = %path.display(),
                exported,
                "Loaded environment overrides from local.env"
            );
            exported
        }
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
            0
        }
    }
}

/// Logs go to stderr; stdout carries command output only
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // Priority: ./config/config.yaml > ~/.config/soulscript/config.yaml
            let local_config = PathBuf::from("config/config.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("soulscript");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;

        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content).context("Failed to parse config file")?
        };

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        })
    }
}

fn unescape_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_PREFLIGHT, ENV_RETRY_DELAY_MS};
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn unescapes_quoted_values() {
        assert_eq!(unescape_value("\"a\\tb\""), "a\tb");
        assert_eq!(unescape_value("plain"), "plain");
        assert_eq!(unescape_value("\""), "\"");
    }

    #[test]
    #[serial]
    fn local_env_feeds_config_overrides() {
        env::remove_var(ENV_RETRY_DELAY_MS);
        env::set_var(ENV_PREFLIGHT, "false");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "# local tweaks\n\n{}=15\nnot an assignment\n{}=true",
            ENV_RETRY_DELAY_MS, ENV_PREFLIGHT
        )
        .unwrap();

        let exported = load_env_file(file.path());
        let mut config = Config::default();
        let outcome = config.apply_env_overrides();

        env::remove_var(ENV_RETRY_DELAY_MS);
        env::remove_var(ENV_PREFLIGHT);

        assert_eq!(exported, 1);
        outcome.unwrap();
        assert_eq!(config.runner.retry_delay_ms, 15);
        assert!(!config.runner.preflight);
    }

    #[test]
    fn missing_local_env_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_env_file(&dir.path().join("local.env")), 0);
    }

    #[tokio::test]
    async fn explicit_config_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runner:\n  default_max_retry: 7").unwrap();

        let loaded = load_config(Some(&file.path().to_path_buf())).await.unwrap();
        assert_eq!(loaded.config.runner.default_max_retry, 7);
        assert_eq!(loaded.path, file.path());
    }

    #[tokio::test]
    async fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config, Config::default());
    }

    #[tokio::test]
    async fn malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runner: [not, a, map]").unwrap();

        assert!(load_config(Some(&file.path().to_path_buf())).await.is_err());
    }
}
