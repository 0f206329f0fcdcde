// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for mkrepo.
//!
//! TOML files in an XDG-style hierarchy, `MKREPO_` environment overrides,
//! strict unknown-key rejection and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! let config = mkrepo_config::load_and_validate(None).expect("config errors");
//! println!("token prefix: {}", config.credential.token_prefix);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MkrepoConfig;

/// Load configuration and validate it.
///
/// With `explicit` set, only that file (plus env overrides) is read; otherwise
/// the standard hierarchy is merged.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<MkrepoConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an inline TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<MkrepoConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read the TOML files that may have contributed to an error, for source spans.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let candidates: Vec<std::path::PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => {
            let mut paths = vec![std::path::PathBuf::from(loader::SYSTEM_CONFIG_PATH)];
            paths.extend(loader::user_config_path());
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd.join(loader::LOCAL_CONFIG_FILE));
            }
            paths
        }
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
