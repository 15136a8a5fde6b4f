//! Cryptographic core for Keyfold.
//!
//! Provides the zero-knowledge building blocks of the password manager:
//! - Argon2id master-key derivation with domain-separated HKDF subkeys
//! - ChaCha20-Poly1305 envelope encryption under a versioned wire format
//! - X25519 pairwise key agreement for sharing records between accounts
//! - Unbiased random credential generation
//!
//! # Architecture
//!
//! One master key is derived per unlock from {password, salt, params} and
//! split into an encryption key (drives the envelope cipher and wraps the
//! account's X25519 private key) and a MAC key (explicit integrity check
//! for plaintext metadata). Everything that crosses the trust boundary is
//! a self-describing base64url blob whose leading version field gates
//! decoding.
//!
//! This crate is pure and synchronous; the only long-lived key state in
//! the system lives in `keyfold-session`.

pub mod agreement;
pub mod cipher;
mod error;
pub mod generator;
pub mod kdf;
pub mod subkeys;

pub use agreement::{
    decrypt_private_key, decrypt_shared, derive_shared_key, encrypt_for_recipient,
    encrypt_private_key, export_public_key, import_public_key, KeyPair, PublicKey, SharedKey,
    StaticSecret,
};
pub use cipher::{decrypt, encrypt, BLOB_VERSION, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use generator::{estimate_entropy, generate_password, GeneratorOptions};
pub use kdf::{
    derive_master_key, install_kdf_backend, KdfAlgorithm, KdfBackend, KdfParams, MasterKey, Salt,
    KEY_SIZE, SALT_SIZE,
};
pub use subkeys::{
    derive_subkeys, tag_metadata, verify_metadata, EncryptionKey, MacKey, SubkeyPair,
    MAC_TAG_SIZE,
};
