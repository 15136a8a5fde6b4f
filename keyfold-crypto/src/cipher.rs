//! Versioned envelope encryption.
//!
//! Wire format: `base64url_nopad( u16_be(version) ‖ nonce[12] ‖ ciphertext‖tag )`.
//! Version 1 is ChaCha20-Poly1305 with a 96-bit nonce and 128-bit tag.
//!
//! The version field is the sole forward-compatibility mechanism: a new
//! cipher or key size must be introduced as a new version value with its
//! own decode path, never by overloading an existing version's layout.

use crate::error::{CryptoError, CryptoResult};
use crate::subkeys::EncryptionKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, KeyInit, Nonce};

/// Current blob version.
pub const BLOB_VERSION: u16 = 1;

/// ChaCha20-Poly1305 nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = 2 + NONCE_SIZE;

/// Encrypts a payload under the given key.
///
/// Draws a fresh random nonce for every call: encrypting the same
/// plaintext twice yields two different blobs.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> CryptoResult<String> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut packed = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    packed.extend_from_slice(&BLOB_VERSION.to_be_bytes());
    packed.extend_from_slice(nonce.as_slice());
    packed.extend_from_slice(&ciphertext);

    Ok(URL_SAFE_NO_PAD.encode(packed))
}

/// Decrypts a blob produced by [`encrypt`].
///
/// The version field is parsed first; an unsupported version is refused
/// without attempting decryption. Tag mismatch (wrong key or tampering)
/// fails with [`CryptoError::Authentication`] and returns no partial
/// plaintext.
pub fn decrypt(key: &EncryptionKey, blob: &str) -> CryptoResult<Vec<u8>> {
    let packed = URL_SAFE_NO_PAD
        .decode(blob)
        .map_err(|e| CryptoError::Malformed(format!("invalid base64url: {e}")))?;

    if packed.len() < 2 {
        return Err(CryptoError::Malformed(
            "blob shorter than version header".into(),
        ));
    }

    let version = u16::from_be_bytes([packed[0], packed[1]]);
    if version != BLOB_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }

    if packed.len() < HEADER_SIZE + TAG_SIZE {
        return Err(CryptoError::Malformed(
            "blob shorter than nonce and tag".into(),
        ));
    }

    let nonce = Nonce::from_slice(&packed[2..HEADER_SIZE]);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .decrypt(nonce, &packed[HEADER_SIZE..])
        .map_err(|_| CryptoError::Authentication)
}
