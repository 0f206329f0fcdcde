// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./mkrepo.toml` > `~/.config/mkrepo/mkrepo.toml` > `/etc/mkrepo/mkrepo.toml`,
//! with `MKREPO_` environment variable overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MkrepoConfig;

/// Config sections addressable through environment variables.
const ENV_SECTIONS: &[&str] = &["log", "credential", "repo"];

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mkrepo/mkrepo.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "mkrepo.toml";

/// Per-user configuration file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mkrepo/mkrepo.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mkrepo/mkrepo.toml`
/// 3. `~/.config/mkrepo/mkrepo.toml`
/// 4. `./mkrepo.toml`
/// 5. `MKREPO_*` environment variables
pub fn load_config() -> Result<MkrepoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only.
pub fn load_config_from_str(toml_content: &str) -> Result<MkrepoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MkrepoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<MkrepoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MkrepoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MkrepoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `MKREPO_<SECTION>_<KEY>` to `section.key`.
///
/// Only variables naming a known section are considered, so unrelated
/// variables such as `MKREPO_GITHUB_TOKEN` never reach deserialization.
/// Uses `map` rather than `split("_")` because keys themselves contain
/// underscores (`MKREPO_CREDENTIAL_MAX_ATTEMPTS` -> `credential.max_attempts`).
fn env_provider() -> Env {
    Env::prefixed("MKREPO_")
        .filter(|key| {
            ENV_SECTIONS
                .iter()
                .any(|section| key.as_str().starts_with(&format!("{section}_")))
        })
        .map(|key| {
            let key_str = key.as_str();
            let mapped = ENV_SECTIONS
                .iter()
                .find_map(|section| {
                    key_str
                        .strip_prefix(&format!("{section}_"))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or_else(|| key_str.to_string());
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MKREPO_CREDENTIAL_MAX_ATTEMPTS", "5");
            jail.set_env("MKREPO_REPO_DEFAULT_BRANCH", "trunk");
            jail.set_env("MKREPO_LOG_LEVEL", "debug");
            let config: MkrepoConfig = Figment::new()
                .merge(Serialized::defaults(MkrepoConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.credential.max_attempts, 5);
            assert_eq!(config.repo.default_branch, "trunk");
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn token_env_var_is_not_treated_as_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MKREPO_GITHUB_TOKEN", "ghp_abc123");
            let config: MkrepoConfig = Figment::new()
                .merge(Serialized::defaults(MkrepoConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.credential.env_var, "MKREPO_GITHUB_TOKEN");
            Ok(())
        });
    }

    #[test]
    fn explicit_file_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [repo]
                gh_binary = "/opt/gh/bin/gh"
                "#,
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.repo.gh_binary, "/opt/gh/bin/gh");
            assert_eq!(config.repo.git_binary, "git");
            Ok(())
        });
    }
}
