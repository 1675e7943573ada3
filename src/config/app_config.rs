use std::env;
use std::io::ErrorKind;

use crate::error::ConfigError;

use super::model::CheckerConfig;

const DEFAULT_CONFIG_FILE: &str = "config.yml";

pub const TIMEOUT_ENV: &str = "GEOPROBE_TIMEOUT_SECS";
pub const WORK_DIR_ENV: &str = "GEOPROBE_WORK_DIR";
pub const WORKERS_ENV: &str = "GEOPROBE_WORKERS";

/// Load the checker configuration from a YAML file and environment variables.
///
/// The file location comes from `CONFIG_FILE` (default `config.yml`). When the
/// default file does not exist the built-in defaults are used; an explicitly
/// named file must exist. `GEOPROBE_TIMEOUT_SECS`, `GEOPROBE_WORK_DIR` and
/// `GEOPROBE_WORKERS` override the corresponding file values.
pub fn load_config() -> Result<CheckerConfig, ConfigError> {
    let explicit = env::var("CONFIG_FILE").ok();
    let path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    let mut config = read_config_file(&path, explicit.is_some())?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    validate(&config)?;

    log::info!(
        "Using timeout {}s, {} workers, work dir {}",
        config.timeout_secs,
        config.workers,
        config.work_dir
    );
    Ok(config)
}

fn read_config_file(path: &str, required: bool) -> Result<CheckerConfig, ConfigError> {
    let config_str = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            log::debug!("No config file at {path}, using defaults");
            return Ok(CheckerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_string(),
                source,
            });
        }
    };

    if config_str.trim().is_empty() {
        return Ok(CheckerConfig::default());
    }

    serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn apply_env_overrides(
    config: &mut CheckerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(TIMEOUT_ENV) {
        config.timeout_secs = parse_number(TIMEOUT_ENV, &raw)?;
    }
    if let Some(dir) = lookup(WORK_DIR_ENV) {
        config.work_dir = dir.trim().to_string();
    }
    if let Some(raw) = lookup(WORKERS_ENV) {
        config.workers = parse_number(WORKERS_ENV, &raw)?;
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got {raw:?}")))
}

fn validate(config: &CheckerConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
    }
    if config.workers == 0 {
        return Err(ConfigError::Invalid("workers must be positive".into()));
    }
    if config.work_dir.is_empty() {
        return Err(ConfigError::Invalid("work_dir must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let config = read_config_file("/nonexistent/geoprobe.yml", false).expect("defaults");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = read_config_file("/nonexistent/geoprobe.yml", true);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "timeout_secs: 9\nworkers: 3").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let config = read_config_file(&path, true).expect("config");
        assert_eq!(config.timeout_secs, 9);
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "timeout_secs: [not, a, number").expect("write");
        let path = file.path().to_string_lossy().to_string();

        assert!(matches!(
            read_config_file(&path, true),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = CheckerConfig::default();
        let env = env_of(&[
            (TIMEOUT_ENV, "12"),
            (WORK_DIR_ENV, " /data/snapshots "),
            (WORKERS_ENV, "8"),
        ]);
        apply_env_overrides(&mut config, env).expect("overrides");
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.work_dir, "/data/snapshots");
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn non_numeric_override_is_rejected() {
        let mut config = CheckerConfig::default();
        let result = apply_env_overrides(&mut config, env_of(&[(TIMEOUT_ENV, "soon")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_workers_is_invalid() {
        let config = CheckerConfig {
            workers: 0,
            ..CheckerConfig::default()
        };
        assert!(validate(&config).is_err());
        assert!(validate(&CheckerConfig::default()).is_ok());
    }
}
