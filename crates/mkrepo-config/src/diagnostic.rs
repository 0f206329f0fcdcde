// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with enough context for miette to render it.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(mkrepo::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(mkrepo::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A semantic check on a deserialized value failed.
    #[error("validation error: {message}")]
    #[diagnostic(code(mkrepo::config::validation))]
    Validation { message: String },

    /// Anything else figment reports (unreadable file, TOML syntax).
    #[error("configuration error: {0}")]
    #[diagnostic(code(mkrepo::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs a file path with its content and is used to attach
/// source spans to unknown-key errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error
                    .path
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source_path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let source = match source_path {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        // Inline strings carry no file metadata; use the only source if there is one.
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    if let Some((path, content)) = source {
        let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
        if let Some(offset) = find_key_offset(content, &section, field) {
            return (
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            );
        }
    }

    (None, None)
}

/// Byte offset of `field` inside the `[path[0]]` table of a TOML document.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
    };

    let mut offset = search_start;
    for line in content[search_start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && after.starts_with([' ', '\t', '='])
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Best Jaro-Winkler match for an unknown key, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_max_attempts_for_typo() {
        let valid = &["path", "token_prefix", "max_attempts", "mask_input", "env_var"];
        assert_eq!(
            suggest_key("max_atempts", valid),
            Some("max_attempts".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        let valid = &["git_binary", "gh_binary", "default_branch"];
        assert_eq!(suggest_key("zzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_section() {
        let content = "[log]\nlevel = \"info\"\n[repo]\ngh_binray = \"gh\"\n";
        let path = vec!["repo".to_string()];
        let offset = find_key_offset(content, &path, "gh_binray").unwrap();
        assert_eq!(&content[offset..offset + 9], "gh_binray");
    }

    #[test]
    fn missing_section_yields_none() {
        let content = "[log]\nlevel = \"info\"\n";
        let path = vec!["repo".to_string()];
        assert_eq!(find_key_offset(content, &path, "level"), None);
    }
}
