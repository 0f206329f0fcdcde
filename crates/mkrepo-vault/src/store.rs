// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted token file: load, save and clear.
//!
//! The file holds a single base64 record (see [`crate::crypto`]) encrypted
//! under the key derived from this machine's identity. A record that cannot
//! be read or decrypted is reported as absent so the caller can prompt
//! again; only a missing machine identity is propagated.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use mkrepo_core::MkrepoError;
use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::crypto;
use crate::identity::MachineIdentityResolver;
use crate::kdf::{self, DerivedKey};

/// Permission bits of the token file.
pub const FILE_MODE: u32 = 0o600;

/// Permission bits of a parent directory created for the token file.
pub const DIR_MODE: u32 = 0o700;

/// The token file at a fixed location, bound to this machine's identity.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    resolver: MachineIdentityResolver,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, resolver: MachineIdentityResolver) -> Self {
        Self {
            path: path.into(),
            resolver,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a token file is present, decryptable or not.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn key(&self) -> Result<DerivedKey, MkrepoError> {
        let id = self.resolver.resolve()?;
        Ok(kdf::derive_key(&id))
    }

    /// Load and decrypt the stored token.
    ///
    /// Returns `Ok(None)` when the file is missing or unreadable, or when its
    /// content is malformed or fails authentication (for example a file copied
    /// from another machine). Fails only if the machine identity is unavailable.
    pub fn load(&self) -> Result<Option<SecretString>, MkrepoError> {
        let record = match fs::read_to_string(&self.path) {
            Ok(record) => record,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored token");
                return Ok(None);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stored token is unreadable");
                return Ok(None);
            }
        };

        let key = self.key()?;
        match crypto::decrypt(&record, &key) {
            Ok(token) => {
                debug!(path = %self.path.display(), "stored token decrypted");
                Ok(Some(token))
            }
            Err(MkrepoError::AuthenticationFailure) => {
                warn!(
                    path = %self.path.display(),
                    "stored token was encrypted on another machine or has been modified"
                );
                Ok(None)
            }
            Err(MkrepoError::MalformedRecord(reason)) => {
                warn!(path = %self.path.display(), %reason, "stored token is corrupt");
                Ok(None)
            }
            Err(MkrepoError::Crypto(reason)) => {
                warn!(%reason, "stored token could not be decrypted");
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// Encrypt and persist `token`, replacing any previous file atomically.
    pub fn save(&self, token: &SecretString) -> Result<(), MkrepoError> {
        let key = self.key()?;
        let record = crypto::encrypt(token.expose_secret(), &key)?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        ensure_private_dir(parent)?;

        // Write beside the target so the final rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(parent)
            .map_err(|e| MkrepoError::io(format!("creating temp file in {}", parent.display()), e))?;
        set_mode(tmp.path(), FILE_MODE)?;
        writeln!(tmp, "{record}")
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| MkrepoError::io("writing token file", e))?;
        tmp.persist(&self.path).map_err(|e| {
            MkrepoError::io(format!("replacing {}", self.path.display()), e.error)
        })?;
        set_mode(&self.path, FILE_MODE)?;

        info!(path = %self.path.display(), "token saved");
        Ok(())
    }

    /// Delete the token file. Succeeds if it is already gone.
    pub fn clear(&self) -> Result<(), MkrepoError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "stored token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MkrepoError::io(
                format!("removing {}", self.path.display()),
                e,
            )),
        }
    }
}

/// Create `dir` (and missing ancestors) owner-only. Existing directories are left as-is.
fn ensure_private_dir(dir: &Path) -> Result<(), MkrepoError> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(dir)
        .map_err(|e| MkrepoError::io(format!("creating {}", dir.display()), e))?;
    set_mode(dir, DIR_MODE)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), MkrepoError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| MkrepoError::io(format!("restricting permissions of {}", path.display()), e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), MkrepoError> {
    Ok(())
}
