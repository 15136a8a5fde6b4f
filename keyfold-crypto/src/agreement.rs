//! Pairwise key agreement for record sharing.
//!
//! X25519 static-static Diffie–Hellman between two accounts. The raw DH
//! output is run through HKDF-SHA256 before it touches the envelope
//! cipher, so curve output never doubles as an AEAD key directly.
//!
//! Sharing is strictly pairwise: each recipient receives an independently
//! re-encrypted copy of a record; there is no group key and one
//! recipient's ciphertext is useless to another. An observer holding only
//! exported public keys and blobs (the server's view) can derive neither
//! the shared key nor any plaintext.

use crate::cipher;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::KEY_SIZE;
use crate::subkeys::EncryptionKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::OsRng;
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use x25519_dalek::{PublicKey, StaticSecret};

/// HKDF info label for shared-key derivation. Format contract.
const SHARED_INFO: &[u8] = b"keyfold/v1/shared";

/// X25519 keypair, generated once at account creation.
///
/// The secret half never leaves the device unencrypted; see
/// [`encrypt_private_key`] for the storable form.
pub struct KeyPair {
    pub secret: StaticSecret,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generates a fresh keypair from the OS random source.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Reconstructs a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }
}

/// Encodes a public key as canonical base64url text (raw 32 bytes).
///
/// Public keys carry no confidentiality requirement; this form is safe to
/// store server-side and transmit.
pub fn export_public_key(public: &PublicKey) -> String {
    URL_SAFE_NO_PAD.encode(public.as_bytes())
}

/// Decodes a public key from its canonical base64url text form.
pub fn import_public_key(encoded: &str) -> CryptoResult<PublicKey> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| CryptoError::KeyFormat(format!("invalid base64url: {e}")))?;

    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|v: Vec<u8>| CryptoError::KeyFormat(format!("expected 32 bytes, got {}", v.len())))?;

    Ok(PublicKey::from(bytes))
}

/// Wraps the private key with the account's own encryption key.
///
/// The result is an ordinary envelope blob — opaque to the server and safe
/// to persist there.
pub fn encrypt_private_key(secret: &StaticSecret, key: &EncryptionKey) -> CryptoResult<String> {
    let mut bytes = secret.to_bytes();
    let wrapped = cipher::encrypt(key, &bytes);
    bytes.zeroize();
    wrapped
}

/// Unwraps a stored private key.
///
/// A wrong encryption key fails with [`CryptoError::Authentication`] —
/// indirectly the same check as a wrong master password.
pub fn decrypt_private_key(wrapped: &str, key: &EncryptionKey) -> CryptoResult<StaticSecret> {
    let mut plaintext = cipher::decrypt(key, wrapped)?;

    if plaintext.len() != 32 {
        plaintext.zeroize();
        return Err(CryptoError::InvalidKeyLength {
            expected: 32,
            actual: plaintext.len(),
        });
    }

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&plaintext);
    plaintext.zeroize();

    let secret = StaticSecret::from(bytes);
    bytes.zeroize();
    Ok(secret)
}

/// Symmetric key both parties derive independently.
///
/// Recomputed per sharing operation, never persisted; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; KEY_SIZE]);

impl SharedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Views the shared key as an envelope-cipher key.
    pub fn to_encryption_key(&self) -> EncryptionKey {
        EncryptionKey::from_bytes(self.0)
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey(..)")
    }
}

/// Derives the pairwise shared key.
///
/// For any two parties A and B, `derive_shared_key(a_secret, b_public)`
/// and `derive_shared_key(b_secret, a_public)` are bit-identical, without
/// either party transmitting anything secret.
pub fn derive_shared_key(own_secret: &StaticSecret, their_public: &PublicKey) -> SharedKey {
    let dh = own_secret.diffie_hellman(their_public);

    let hkdf = Hkdf::<Sha256>::new(None, dh.as_bytes());
    let mut out = [0u8; KEY_SIZE];
    let Ok(()) = hkdf.expand(SHARED_INFO, &mut out) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    SharedKey(out)
}

/// Re-encrypts a record for one specific recipient.
pub fn encrypt_for_recipient(
    plaintext: &[u8],
    own_secret: &StaticSecret,
    their_public: &PublicKey,
) -> CryptoResult<String> {
    let shared = derive_shared_key(own_secret, their_public);
    cipher::encrypt(&shared.to_encryption_key(), plaintext)
}

/// Decrypts a record shared by the counterpart holding `their_public`.
pub fn decrypt_shared(
    blob: &str,
    own_secret: &StaticSecret,
    their_public: &PublicKey,
) -> CryptoResult<Vec<u8>> {
    let shared = derive_shared_key(own_secret, their_public);
    cipher::decrypt(&shared.to_encryption_key(), blob)
}
