// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Machine-bound encrypted storage for the GitHub access token.
//!
//! The token is encrypted with AES-256-GCM under a key derived from a
//! persistent machine identifier, so the token file is useless on any other
//! host. [`CredentialAcquirer`] ties the pieces together: environment
//! override, stored token, then a bounded interactive prompt.

pub mod acquire;
pub mod crypto;
pub mod identity;
pub mod kdf;
pub mod prompt;
pub mod store;
pub mod token;

pub use acquire::{CredentialAcquirer, TokenSource};
pub use identity::{IdentityProbe, MachineId, MachineIdentityResolver};
pub use kdf::{derive_key, DerivedKey};
pub use prompt::{console_prompt, LinePrompt, Prompt};
pub use store::CredentialStore;
pub use token::{mask_secret, TokenFormat};
