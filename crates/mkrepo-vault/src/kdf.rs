// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key derivation from the machine identity.
//!
//! The key is the SHA-256 digest of the identifier's UTF-8 bytes. No salt or
//! work factor: the input is a high-entropy host identifier rather than a
//! user-chosen passphrase.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::identity::MachineId;

/// Length in bytes of an AES-256 key.
pub const KEY_LEN: usize = 32;

/// A 256-bit symmetric key, zeroed on drop and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the token encryption key for a machine identity.
pub fn derive_key(id: &MachineId) -> DerivedKey {
    let digest = Sha256::digest(id.as_str().as_bytes());
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest);
    DerivedKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> MachineId {
        MachineId::new(raw).unwrap()
    }

    #[test]
    fn derive_key_is_deterministic() {
        let a = derive_key(&id("0123456789abcdef0123456789abcdef"));
        let b = derive_key(&id("0123456789abcdef0123456789abcdef"));
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_identities_produce_different_keys() {
        let a = derive_key(&id("host-a"));
        let b = derive_key(&id("host-b"));
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn key_matches_sha256_of_identifier() {
        // SHA-256("abc")
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap();
        assert_eq!(derive_key(&id("abc")).as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn debug_output_hides_key_material() {
        let key = derive_key(&id("host-a"));
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
