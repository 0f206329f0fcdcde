// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mkrepo token status|set|clear` command implementations.

use colored::Colorize;
use mkrepo_core::MkrepoError;
use mkrepo_vault::{mask_secret, CredentialAcquirer, CredentialStore, Prompt};
use secrecy::ExposeSecret;

/// What `mkrepo token status` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    /// Present but not decryptable here (another machine, or corrupt).
    Unusable,
    /// Decrypted; carries the masked preview.
    Stored(String),
}

/// Inspect the stored token without prompting.
pub fn token_state(store: &CredentialStore) -> Result<TokenState, MkrepoError> {
    if !store.exists() {
        return Ok(TokenState::Absent);
    }
    Ok(match store.load()? {
        Some(token) => TokenState::Stored(mask_secret(token.expose_secret())),
        None => TokenState::Unusable,
    })
}

pub fn run_status(store: &CredentialStore) -> Result<(), MkrepoError> {
    let state = token_state(store)?;
    println!("  token file: {}", store.path().display());
    match state {
        TokenState::Absent => println!("  status:     {}", "not stored".yellow()),
        TokenState::Unusable => println!(
            "  status:     {} (run `mkrepo token set` to replace it)",
            "cannot be decrypted on this machine".red()
        ),
        TokenState::Stored(masked) => {
            println!("  status:     {} ({masked})", "stored".green())
        }
    }
    Ok(())
}

pub fn run_set(
    acquirer: &CredentialAcquirer<'_>,
    prompt: &mut dyn Prompt,
) -> Result<(), MkrepoError> {
    let token = acquirer.acquire_fresh(prompt)?;
    println!(
        "{} token {} saved",
        "done:".green().bold(),
        mask_secret(token.expose_secret())
    );
    Ok(())
}

pub fn run_clear(store: &CredentialStore) -> Result<(), MkrepoError> {
    let existed = store.exists();
    store.clear()?;
    if existed {
        println!("{} removed {}", "done:".green().bold(), store.path().display());
    } else {
        println!("no token stored at {}", store.path().display());
    }
    Ok(())
}
