//! Master key derivation from passwords.
//!
//! Argon2id turns a password + per-account salt into a 32-byte master key.
//! The derivation is deterministic and deliberately expensive (hundreds of
//! milliseconds at default costs) to throttle offline guessing. The hash
//! backend is pluggable and resolved once per process; the built-in
//! Argon2id backend is used unless a host installs its own.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Derived key length in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Minimum Argon2 memory cost in KiB.
const MIN_MEMORY_KIB: u32 = 8192;

/// Per-account random salt.
///
/// Not secret, persisted alongside the account, but must be unique per
/// account and never reused across accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Draws a fresh salt from the OS random source.
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        getrandom::fill(&mut bytes).map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Password-hashing algorithm tag, persisted with [`KdfParams`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    #[default]
    Argon2id,
}

/// Argon2id cost parameters.
///
/// Frozen once any account has been created under them: the same
/// {password, salt, params} triple must keep producing the same key, so
/// changing costs requires an explicit migration, never a silent bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iteration count (time cost).
    pub iterations: u32,
    /// Lane count.
    pub parallelism: u32,
    /// Output length in bytes. Fixed at [`KEY_SIZE`].
    pub output_len: usize,
    /// Algorithm tag.
    pub algorithm: KdfAlgorithm,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 4,
            output_len: KEY_SIZE,
            algorithm: KdfAlgorithm::Argon2id,
        }
    }
}

impl KdfParams {
    /// Rejects parameter sets below the safety floor.
    pub fn validate(&self) -> CryptoResult<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(CryptoError::Config(format!(
                "memory cost {} KiB below floor of {MIN_MEMORY_KIB} KiB",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(CryptoError::Config("iteration count must be >= 1".into()));
        }
        if self.parallelism < 1 {
            return Err(CryptoError::Config("parallelism must be >= 1".into()));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(CryptoError::Config(
                "memory cost must be at least 8 KiB per lane".into(),
            ));
        }
        if self.output_len != KEY_SIZE {
            return Err(CryptoError::Config(format!(
                "output length must be {KEY_SIZE} bytes"
            )));
        }
        Ok(())
    }
}

/// Raw 32-byte master key.
///
/// Exists only in process memory between unlock and lock; zeroized on
/// drop, never persisted or transmitted in raw form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Pluggable password-hashing backend.
///
/// Hosts with a faster native Argon2 (or a hardware-backed one) install
/// theirs once at process start via [`install_kdf_backend`]; everyone else
/// gets the built-in pure-Rust backend on first use.
pub trait KdfBackend: Send + Sync {
    /// Derives the master key. Must be deterministic for fixed inputs.
    fn derive(&self, password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<MasterKey>;
}

struct Argon2Backend;

impl KdfBackend for Argon2Backend {
    fn derive(&self, password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<MasterKey> {
        let argon_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(params.output_len),
        )
        .map_err(|e| CryptoError::Config(format!("argon2 rejected parameters: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

        let mut key = [0u8; KEY_SIZE];
        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        Ok(MasterKey::from_bytes(key))
    }
}

static BACKEND: OnceLock<Box<dyn KdfBackend>> = OnceLock::new();

/// Installs a process-wide hashing backend.
///
/// Must run before the first derivation; once a backend has been resolved
/// the installation fails and the rejected backend is handed back.
pub fn install_kdf_backend(backend: Box<dyn KdfBackend>) -> Result<(), Box<dyn KdfBackend>> {
    BACKEND.set(backend)
}

fn backend() -> &'static dyn KdfBackend {
    BACKEND.get_or_init(|| Box::new(Argon2Backend)).as_ref()
}

/// Derives the master key from a password and per-account salt.
///
/// A wrong password is not an error here — it yields a different, equally
/// valid-looking key, and only becomes observable downstream when an AEAD
/// tag refuses to verify. Blocking and CPU/memory-intensive: callers on a
/// latency-sensitive path must run this on a blocking worker, and once
/// started it runs to completion (an abandoned unlock attempt just
/// discards the result).
pub fn derive_master_key(
    password: &str,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<MasterKey> {
    params.validate()?;
    backend().derive(password, salt, params)
}
