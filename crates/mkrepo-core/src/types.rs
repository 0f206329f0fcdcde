// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the mkrepo crates.

use std::fmt;

/// The specific structural rule a candidate token broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatViolation {
    /// The token does not begin with the required literal prefix.
    MissingPrefix { expected: String },
    /// A character after the prefix is not an ASCII letter or digit.
    ///
    /// `position` is the zero-based character index within the whole token.
    InvalidCharacter { ch: char, position: usize },
}

impl fmt::Display for FormatViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix { expected } => {
                write!(f, "token must start with `{expected}`")
            }
            Self::InvalidCharacter { ch, position } => write!(
                f,
                "token may only contain letters and digits after the prefix, found {ch:?} at position {position}"
            ),
        }
    }
}
