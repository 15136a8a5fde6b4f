//! Domain-separated subkey derivation.
//!
//! HKDF-SHA256 expands the master key into two independent-looking
//! subkeys: one driving the envelope cipher, one backing the explicit
//! metadata integrity check. Distinct fixed info labels and salts keep
//! either key unusable in the other's role even if one use is later
//! weakened.

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{MasterKey, KEY_SIZE};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HKDF info labels. Part of the format contract: changing either silently
/// breaks decryption of everything derived before, so a change requires a
/// new blob version.
const ENCRYPTION_INFO: &[u8] = b"keyfold/v1/encryption";
const MAC_INFO: &[u8] = b"keyfold/v1/mac";

/// Distinct fixed HKDF salts for the two derivations.
const ENCRYPTION_SALT: &[u8] = b"keyfold-hkdf-salt-enc";
const MAC_SALT: &[u8] = b"keyfold-hkdf-salt-mac";

/// HMAC-SHA256 tag size in bytes.
pub const MAC_TAG_SIZE: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Symmetric key feeding the envelope cipher.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// Key for the explicit integrity check over plaintext metadata.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacKey([u8; KEY_SIZE]);

impl MacKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MacKey(..)")
    }
}

/// Both subkeys derived from one master key.
#[derive(Clone, Debug)]
pub struct SubkeyPair {
    pub encryption: EncryptionKey,
    pub mac: MacKey,
}

/// Expands the master key into the two domain-separated subkeys.
///
/// Deterministic: the same master key always yields the same pair, and the
/// two outputs are byte-distinct.
pub fn derive_subkeys(master: &MasterKey) -> SubkeyPair {
    SubkeyPair {
        encryption: EncryptionKey(expand(master, ENCRYPTION_SALT, ENCRYPTION_INFO)),
        mac: MacKey(expand(master, MAC_SALT, MAC_INFO)),
    }
}

fn expand(master: &MasterKey, salt: &[u8], info: &[u8]) -> [u8; KEY_SIZE] {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), master.as_bytes());
    let mut out = [0u8; KEY_SIZE];
    let Ok(()) = hkdf.expand(info, &mut out) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    out
}

/// Tags plaintext metadata that travels outside any AEAD envelope.
///
/// This is the secondary integrity check, separate from the Poly1305 tag:
/// it covers data the cipher never sees (record metadata, manifests).
pub fn tag_metadata(key: &MacKey, data: &[u8]) -> [u8; MAC_TAG_SIZE] {
    let mut mac = hmac_for(key);
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verifies a metadata tag in constant time.
pub fn verify_metadata(key: &MacKey, data: &[u8], tag: &[u8]) -> CryptoResult<()> {
    let mut mac = hmac_for(key);
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| CryptoError::Authentication)
}

fn hmac_for(key: &MacKey) -> HmacSha256 {
    let Ok(mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        unreachable!("HMAC-SHA256 accepts 32-byte keys");
    };
    mac
}
