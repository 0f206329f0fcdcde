// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MkrepoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &MkrepoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let prefix = &config.credential.token_prefix;
    if prefix.is_empty() {
        errors.push(ConfigError::Validation {
            message: "credential.token_prefix must not be empty".to_string(),
        });
    } else if !prefix.is_ascii() || prefix.chars().any(char::is_whitespace) {
        errors.push(ConfigError::Validation {
            message: format!(
                "credential.token_prefix `{prefix}` must be ASCII without whitespace"
            ),
        });
    }

    if config.credential.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "credential.max_attempts must be at least 1".to_string(),
        });
    }

    if config.credential.env_var.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "credential.env_var must not be empty".to_string(),
        });
    }

    if let Some(path) = &config.credential.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "credential.path must not be empty when set".to_string(),
        });
    }

    for (key, value) in [
        ("repo.git_binary", &config.repo.git_binary),
        ("repo.gh_binary", &config.repo.gh_binary),
        ("repo.default_branch", &config.repo.default_branch),
        ("repo.commit_message", &config.repo.commit_message),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&MkrepoConfig::default()).is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = MkrepoConfig::default();
        config.credential.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("max_attempts"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = MkrepoConfig::default();
        config.log.level = "loud".into();
        config.credential.token_prefix = String::new();
        config.repo.gh_binary = " ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn non_ascii_prefix_rejected() {
        let mut config = MkrepoConfig::default();
        config.credential.token_prefix = "tök_".into();
        assert!(validate_config(&config).is_err());
    }
}
