// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM token encryption with a text-safe record format.
//!
//! A record is `base64(nonce ‖ ciphertext ‖ tag)`. Every call to [`encrypt`]
//! draws a fresh random 96-bit nonce from the system CSPRNG. Nonce reuse would
//! be catastrophic for GCM security.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mkrepo_core::MkrepoError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::kdf::DerivedKey;

/// Length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &DerivedKey) -> Result<LessSafeKey, MkrepoError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| MkrepoError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with a random nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), MkrepoError> {
    let sealing_key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| MkrepoError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| MkrepoError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext produced by [`seal`].
///
/// Fails with [`MkrepoError::AuthenticationFailure`] when the key is wrong or
/// the data was modified.
pub fn open(
    key: &DerivedKey,
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, MkrepoError> {
    let opening_key = aead_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| MkrepoError::AuthenticationFailure)?
        .len();
    in_out.truncate(len);

    Ok(in_out)
}

/// Encrypt a token into a base64 record.
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<String, MkrepoError> {
    let (ciphertext, nonce) = seal(key, plaintext.as_bytes())?;

    let mut record = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    record.extend_from_slice(&nonce);
    record.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(record))
}

/// Decrypt a base64 record produced by [`encrypt`].
///
/// Surrounding whitespace (such as the trailing newline of the token file) is
/// ignored. Undecodable records fail with [`MkrepoError::MalformedRecord`];
/// a failed tag check fails with [`MkrepoError::AuthenticationFailure`].
pub fn decrypt(record: &str, key: &DerivedKey) -> Result<SecretString, MkrepoError> {
    let bytes = STANDARD
        .decode(record.trim())
        .map_err(|e| MkrepoError::MalformedRecord(format!("not valid base64: {e}")))?;

    if bytes.len() < NONCE_LEN + TAG_LEN {
        return Err(MkrepoError::MalformedRecord(format!(
            "record is {} bytes, shorter than nonce and tag",
            bytes.len()
        )));
    }

    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce
        .try_into()
        .map_err(|_| MkrepoError::MalformedRecord("corrupted nonce".to_string()))?;

    let plaintext = open(key, &nonce, ciphertext)?;
    let value = String::from_utf8(plaintext.to_vec()).map_err(|_| {
        MkrepoError::MalformedRecord("decrypted token is not valid UTF-8".to_string())
    })?;

    Ok(SecretString::from(value))
}
