// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for mkrepo.
//!
//! Provides the error taxonomy shared by the credential vault, the
//! configuration layer and the command-line binary.

pub mod error;
pub mod types;

pub use error::MkrepoError;
pub use types::FormatViolation;
