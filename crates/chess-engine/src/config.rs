//! Game configuration loaded from TOML.
//!
//! Every field has a default, so an empty file or a missing file both yield
//! [`GameConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What happens when the fifty-move rule or threefold repetition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    /// The draw becomes claimable and the game continues until claimed.
    #[default]
    Claim,
    /// The game ends as soon as the condition is detected.
    Automatic,
}

/// Rules policy for a [`Game`](crate::Game).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Handling of fifty-move and threefold repetition draws.
    #[serde(default)]
    pub draw_policy: DrawPolicy,
    /// Whether the seventy-five-move rule and fivefold repetition end the
    /// game on their own. Defaults to true.
    #[serde(default = "default_automatic_draws")]
    pub automatic_draws: bool,
}

fn default_automatic_draws() -> bool {
    true
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            draw_policy: DrawPolicy::default(),
            automatic_draws: default_automatic_draws(),
        }
    }
}

impl GameConfig {
    /// Default file name looked up by the command-line tool.
    pub const DEFAULT_FILE: &'static str = "chess.toml";

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read,
    /// or [`ConfigError::Parse`] if it is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = GameConfig::default();
        assert_eq!(config.draw_policy, DrawPolicy::Claim);
        assert!(config.automatic_draws);
        assert_eq!(GameConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn parse_all_fields() {
        let config = GameConfig::from_toml_str(
            r#"
            draw_policy = "automatic"
            automatic_draws = false
            "#,
        )
        .unwrap();
        assert_eq!(config.draw_policy, DrawPolicy::Automatic);
        assert!(!config.automatic_draws);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = GameConfig::from_toml_str("automatic_draws = false").unwrap();
        assert_eq!(config.draw_policy, DrawPolicy::Claim);
        assert!(!config.automatic_draws);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str("draw_policy = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("draw_policy = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "draw_policy = \"automatic\"").unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.draw_policy, DrawPolicy::Automatic);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = GameConfig {
            draw_policy: DrawPolicy::Automatic,
            automatic_draws: true,
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_toml_str(&text).unwrap(), config);
    }
}
