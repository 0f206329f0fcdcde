// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every mkrepo crate.

use thiserror::Error;

use crate::types::FormatViolation;

/// The primary error type used across credential handling and the repo workflow.
#[derive(Debug, Error)]
pub enum MkrepoError {
    /// No persistent machine identifier could be obtained.
    ///
    /// Without a stable identity there is no consistent key, so callers must
    /// treat this as fatal rather than retrying or degrading.
    #[error("machine identity unavailable: {0}")]
    Identity(String),

    /// Authenticated decryption rejected the record (wrong key or tampered data).
    #[error("credential record failed authentication")]
    AuthenticationFailure,

    /// The stored record is not decodable as nonce, ciphertext and tag.
    #[error("malformed credential record: {0}")]
    MalformedRecord(String),

    /// Key construction or random number generation failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A token did not match the required structure.
    #[error("invalid token format: {0}")]
    InvalidFormat(FormatViolation),

    /// Interactive acquisition gave up after the configured number of attempts.
    #[error("no valid token after {attempts} attempts")]
    MaxAttemptsExceeded { attempts: u32 },

    /// An external program exited unsuccessfully or could not be spawned.
    #[error("`{program}` failed{}: {stderr}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ExternalCommand {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Filesystem errors outside the load path of the credential store.
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),
}

impl MkrepoError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error leaves no safe way to continue the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Identity(_))
    }
}

impl From<FormatViolation> for MkrepoError {
    fn from(violation: FormatViolation) -> Self {
        Self::InvalidFormat(violation)
    }
}
