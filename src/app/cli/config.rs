//! TOML configuration file loading
//!
//! Handles default config file discovery and applying config values to
//! [`Args`]. Config values only fill settings the command line left unset.

use crate::core::validation::{validate_topic_list, ValidationError};
use std::path::{Path, PathBuf};

use super::args::Args;

/// Default configuration path, `<config dir>/topicq/topicq.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("topicq").join("topicq.toml"))
}

impl Args {
    /// Load the config file and apply it to `args`
    ///
    /// An explicitly named file must exist; the default file is optional.
    /// Returns the raw table that was applied, if any.
    pub async fn load_config_file(
        args: &mut Self,
        config_file: Option<PathBuf>,
    ) -> Result<Option<toml::Table>, ValidationError> {
        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ValidationError::new(format!(
                        "The specified configuration file does not exist: {}",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => default_config_path().filter(|path| path.exists()),
        };

        let Some(path) = config_path else {
            return Ok(None);
        };

        log::debug!("Loading configuration from {}", path.display());
        let config = read_config(&path).await?;
        Self::apply_toml_values(args, &config).map_err(|e| {
            ValidationError::new(format!(
                "Error in configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Some(config))
    }

    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        if args.topics.is_empty() {
            if let Some(value) = config.get("topics") {
                let mut topics = Vec::new();
                if let Some(topic) = value.as_str() {
                    topics.push(topic.to_string());
                } else if let Some(array) = value.as_array() {
                    for item in array {
                        let topic = item.as_str().ok_or_else(|| {
                            ValidationError::new("'topics' entries must be strings")
                        })?;
                        topics.push(topic.to_string());
                    }
                } else {
                    return Err(ValidationError::new(
                        "'topics' must be a string or an array of strings",
                    ));
                }
                args.topics = validate_topic_list(&topics)?;
            }
        }

        Self::apply_count_field(config, "producers", &mut args.producers)?;
        Self::apply_count_field(config, "consumers", &mut args.consumers)?;
        Self::apply_count_field(config, "messages", &mut args.messages)?;
        Self::apply_count_field(config, "capacity", &mut args.capacity)?;

        if !args.color && !args.no_color {
            if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
                args.color = color;
                args.no_color = !color;
            }
        }
        if args.log_level.is_none() {
            if let Some(log_level) = config.get("log-level").and_then(|v| v.as_str()) {
                args.log_level = Some(log_level.to_string());
            }
        }
        if args.log_format.is_none() {
            if let Some(log_format) = config.get("log-format").and_then(|v| v.as_str()) {
                args.log_format = Some(log_format.to_string());
            }
        }
        if args.log_file.is_none() {
            if let Some(log_file) = config.get("log-file").and_then(|v| v.as_str()) {
                args.log_file = Some(PathBuf::from(log_file));
            }
        }

        Ok(())
    }

    fn apply_count_field(
        config: &toml::Table,
        key: &str,
        target: &mut Option<usize>,
    ) -> Result<(), ValidationError> {
        if target.is_some() {
            return Ok(());
        }
        if let Some(value) = config.get(key) {
            let count = value
                .as_integer()
                .filter(|n| *n > 0)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    ValidationError::new(format!("'{}' must be a positive integer", key))
                })?;
            *target = Some(count);
        }
        Ok(())
    }
}

async fn read_config(path: &Path) -> Result<toml::Table, ValidationError> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        ValidationError::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ValidationError::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(source: &str) -> toml::Table {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_default_config_path_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("topicq/topicq.toml"));
        }
    }

    #[test]
    fn test_count_fields_reject_non_positive() {
        let mut args = Args::new();
        let error = Args::apply_toml_values(&mut args, &table("producers = 0")).unwrap_err();
        assert!(error.message().contains("producers"));

        let error = Args::apply_toml_values(&mut args, &table("messages = \"ten\"")).unwrap_err();
        assert!(error.message().contains("messages"));
    }

    #[test]
    fn test_color_from_config_only_when_unset() {
        let mut args = Args::new();
        Args::apply_toml_values(&mut args, &table("color = false")).unwrap();
        assert!(args.no_color);
        assert!(!args.use_color());

        let mut args = Args::new();
        args.color = true;
        Args::apply_toml_values(&mut args, &table("color = false")).unwrap();
        assert!(args.color);
        assert!(!args.no_color);
    }

    #[tokio::test]
    async fn test_missing_explicit_config_file_is_an_error() {
        let mut args = Args::new();
        let missing = PathBuf::from("/definitely/not/here/topicq.toml");
        let error = Args::load_config_file(&mut args, Some(missing))
            .await
            .unwrap_err();
        assert!(error.message().contains("does not exist"));
    }
}
