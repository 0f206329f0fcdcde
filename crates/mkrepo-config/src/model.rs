// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for mkrepo.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the encrypted token under the home directory.
pub const DEFAULT_TOKEN_FILE: &str = ".mr_token";

/// Top-level mkrepo configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MkrepoConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Stored access token settings.
    #[serde(default)]
    pub credential: CredentialConfig,

    /// External binaries and initial commit settings.
    #[serde(default)]
    pub repo: RepoConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for mkrepo's own targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Access token storage and acquisition configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialConfig {
    /// Location of the encrypted token file. `None` means `~/.mr_token`.
    /// A leading `~/` is expanded to the home directory.
    #[serde(default)]
    pub path: Option<String>,

    /// Literal prefix every token must start with.
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    /// Interactive attempts before acquisition gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Read the token without echoing it to the terminal.
    #[serde(default)]
    pub mask_input: bool,

    /// Environment variable consulted before the stored token.
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            path: None,
            token_prefix: default_token_prefix(),
            max_attempts: default_max_attempts(),
            mask_input: false,
            env_var: default_env_var(),
        }
    }
}

impl CredentialConfig {
    /// Resolve the token file location, expanding `~/`.
    ///
    /// Returns `None` when the home directory is needed but unknown.
    pub fn token_path(&self) -> Option<PathBuf> {
        match self.path.as_deref() {
            None => dirs::home_dir().map(|home| home.join(DEFAULT_TOKEN_FILE)),
            Some(raw) => match raw.strip_prefix("~/") {
                Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
                None => Some(PathBuf::from(raw)),
            },
        }
    }
}

fn default_token_prefix() -> String {
    "ghp_".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_env_var() -> String {
    "MKREPO_GITHUB_TOKEN".to_string()
}

/// Repository creation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Version-control binary.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Repository-hosting CLI.
    #[serde(default = "default_gh_binary")]
    pub gh_binary: String,

    /// Branch created by `git init`.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Message of the initial commit.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            gh_binary: default_gh_binary(),
            default_branch: default_branch(),
            commit_message: default_commit_message(),
        }
    }
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_gh_binary() -> String {
    "gh".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_commit_message() -> String {
    "Initial commit".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_path_is_under_home() {
        let config = CredentialConfig::default();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.token_path(), Some(home.join(".mr_token")));
        }
    }

    #[test]
    fn tilde_path_is_expanded() {
        let config = CredentialConfig {
            path: Some("~/secrets/token".into()),
            ..Default::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.token_path(), Some(home.join("secrets/token")));
        }
    }

    #[test]
    fn absolute_path_is_used_verbatim() {
        let config = CredentialConfig {
            path: Some("/tmp/mkrepo/token".into()),
            ..Default::default()
        };
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/mkrepo/token")));
    }
}
