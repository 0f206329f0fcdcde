// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Obtaining a usable token: environment, then the encrypted store, then the user.

use mkrepo_core::MkrepoError;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::prompt::{self, Prompt};
use crate::store::CredentialStore;
use crate::token::TokenFormat;

/// Default number of interactive attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Where an acquired token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The override environment variable. Never persisted.
    Env,
    /// The encrypted token file.
    Store,
    /// Typed by the user and just saved to the store.
    Prompt,
}

impl TokenSource {
    /// Whether the token is the one held in the credential store.
    pub fn is_persisted(self) -> bool {
        matches!(self, Self::Store | Self::Prompt)
    }
}

/// Resolves a structurally valid token, prompting and persisting when needed.
pub struct CredentialAcquirer<'a> {
    store: &'a CredentialStore,
    format: TokenFormat,
    max_attempts: u32,
    env_var: Option<String>,
}

impl<'a> CredentialAcquirer<'a> {
    pub fn new(store: &'a CredentialStore, format: TokenFormat) -> Self {
        Self {
            store,
            format,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            env_var: None,
        }
    }

    /// Number of interactive attempts before giving up (at least one).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Consult this environment variable before the stored token.
    pub fn env_override(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Return a valid token from the environment or the store, or prompt for one.
    ///
    /// A token from the environment is used as-is and never persisted. A stored
    /// token that no longer matches the format is deleted and replaced through
    /// the prompt.
    pub fn acquire(
        &self,
        prompt: &mut dyn Prompt,
    ) -> Result<(SecretString, TokenSource), MkrepoError> {
        if let Some(token) = self.from_env() {
            return Ok((token, TokenSource::Env));
        }

        if let Some(stored) = self.store.load()? {
            match self.format.validate(stored.expose_secret()) {
                Ok(()) => {
                    debug!("using stored token");
                    return Ok((stored, TokenSource::Store));
                }
                Err(violation) => {
                    warn!(%violation, "stored token no longer matches the expected format; discarding it");
                    self.store.clear()?;
                }
            }
        }

        self.prompt_loop(prompt)
            .map(|token| (token, TokenSource::Prompt))
    }

    /// Ignore the environment and the store and ask the user for a new token.
    pub fn acquire_fresh(&self, prompt: &mut dyn Prompt) -> Result<SecretString, MkrepoError> {
        self.prompt_loop(prompt)
    }

    fn from_env(&self) -> Option<SecretString> {
        let name = self.env_var.as_deref()?;
        let token = prompt::token_from_env(name)?;
        match self.format.validate(token.expose_secret()) {
            Ok(()) => {
                debug!(var = name, "using token from environment");
                Some(token)
            }
            Err(violation) => {
                warn!(var = name, %violation, "ignoring malformed token from environment");
                None
            }
        }
    }

    fn prompt_loop(&self, prompt: &mut dyn Prompt) -> Result<SecretString, MkrepoError> {
        let max = self.max_attempts;
        for attempt in 1..=max {
            let message = format!(
                "GitHub personal access token ({}...) [{attempt}/{max}]: ",
                self.format.prefix()
            );
            let line = Zeroizing::new(
                prompt
                    .read_token(&message)
                    .map_err(|e| MkrepoError::io("reading token", e))?
                    .unwrap_or_default(),
            );
            let candidate = line.trim();

            if candidate.is_empty() {
                prompt.notify("Token must not be empty.");
                debug!(attempt, "empty token input");
                continue;
            }

            match self.format.validate(candidate) {
                Ok(()) => {
                    let token = SecretString::from(candidate.to_string());
                    self.store.save(&token)?;
                    info!(attempt, "token accepted");
                    return Ok(token);
                }
                Err(violation) => {
                    let err = MkrepoError::from(violation);
                    prompt.notify(&format!("{err}."));
                    debug!(attempt, error = %err, "token input rejected");
                }
            }
        }

        warn!(attempts = max, "giving up on token input");
        Err(MkrepoError::MaxAttemptsExceeded { attempts: max })
    }
}
