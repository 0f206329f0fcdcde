// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural validation of personal access tokens.

use mkrepo_core::FormatViolation;

/// The shape a token must have: a literal prefix followed by letters and digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFormat {
    prefix: String,
}

impl Default for TokenFormat {
    fn default() -> Self {
        Self::new("ghp_")
    }
}

impl TokenFormat {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check `candidate` against the format, reporting the first rule it breaks.
    ///
    /// A bare prefix passes: there is no character after it to reject.
    pub fn validate(&self, candidate: &str) -> Result<(), FormatViolation> {
        let suffix =
            candidate
                .strip_prefix(self.prefix.as_str())
                .ok_or_else(|| FormatViolation::MissingPrefix {
                    expected: self.prefix.clone(),
                })?;

        let offset = self.prefix.chars().count();
        match suffix
            .chars()
            .enumerate()
            .find(|(_, ch)| !ch.is_ascii_alphanumeric())
        {
            Some((index, ch)) => Err(FormatViolation::InvalidCharacter {
                ch,
                position: offset + index,
            }),
            None => Ok(()),
        }
    }
}

/// Mask a token for display: `"ghp_...wxyz"`.
///
/// Shows up to 4 leading and 4 trailing characters. Values shorter than 10
/// characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_token() {
        assert_eq!(TokenFormat::default().validate("ghp_abc123"), Ok(()));
    }

    #[test]
    fn reports_missing_prefix() {
        assert_eq!(
            TokenFormat::default().validate("xyz_abc"),
            Err(FormatViolation::MissingPrefix {
                expected: "ghp_".to_string()
            })
        );
    }

    #[test]
    fn reports_invalid_character() {
        assert_eq!(
            TokenFormat::default().validate("ghp_abc!23"),
            Err(FormatViolation::InvalidCharacter {
                ch: '!',
                position: 7
            })
        );
    }

    #[test]
    fn bare_prefix_is_accepted() {
        assert_eq!(TokenFormat::default().validate("ghp_"), Ok(()));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert!(TokenFormat::default().validate("GHP_abc123").is_err());
    }

    #[test]
    fn non_ascii_letters_are_rejected() {
        let err = TokenFormat::default().validate("ghp_abcé1").unwrap_err();
        assert_eq!(
            err,
            FormatViolation::InvalidCharacter {
                ch: 'é',
                position: 7
            }
        );
    }

    #[test]
    fn custom_prefix() {
        let format = TokenFormat::new("github_pat_");
        assert!(format.validate("github_pat_11ABCDEF0123456789").is_ok());
        assert!(format.validate("ghp_abc123").is_err());
    }

    #[test]
    fn mask_secret_shows_ends() {
        assert_eq!(mask_secret("ghp_0123456789wxyz"), "ghp_...wxyz");
        assert_eq!(mask_secret("ghp_abc"), "****");
    }
}
