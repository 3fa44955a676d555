mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/park-score/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("park-score"))
}

/// Get the default config file path (~/.config/park-score/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration.
///
/// With an explicit `path` the file must exist. Without one, the default path
/// is tried and built-in defaults are used when it is absent.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)
        }
        None => match get_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(Config::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_explicit_config() {
        let path = env::temp_dir().join("park_score_test_config.yaml");
        fs::write(
            &path,
            r#"
ruleset:
  base_score: 3
  valid_modes: [CW]
logs:
  - "logs/*.adi"
"#,
        )
        .unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        let ruleset = config.ruleset.unwrap();
        assert_eq!(ruleset.base_score, Some(3.0));
        assert_eq!(ruleset.valid_modes, Some(vec!["CW".to_string()]));
        assert_eq!(config.logs, vec!["logs/*.adi".to_string()]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let path = env::temp_dir().join("park_score_test_missing_config.yaml");
        let _ = fs::remove_file(&path);
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = env::temp_dir().join("park_score_test_bad_config.yaml");
        fs::write(&path, "ruleset:\n  bonus: [").unwrap();
        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_document_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []");
        assert!(result.is_err());
    }
}
