//! Unlocked-session key state for Keyfold.
//!
//! The one piece of long-lived shared state in the system: the subkeys
//! derived from the master password between unlock and lock. Record
//! encryption and private-key wrapping route through here so raw key
//! bytes never leave the session.
//!
//! Locking takes the keys out of the shared slot and drops them — the
//! subkey types zeroize on drop, so lock means zeroed, not merely
//! dereferenced. Operations already in flight finish with the clone they
//! captured; anything starting after lock sees [`SessionError::Locked`].
//!
//! Unlock runs the memory-hard KDF inline and therefore blocks for
//! hundreds of milliseconds at production costs; async callers should
//! wrap it in their runtime's blocking facility.

use keyfold_crypto::{
    agreement, cipher, derive_master_key, derive_subkeys, subkeys, CryptoError, KdfParams,
    KeyPair, Salt, StaticSecret, SubkeyPair, MAC_TAG_SIZE,
};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Known plaintext for offline password verification. Frozen: changing it
/// invalidates every stored verifier blob.
const VERIFIER_PLAINTEXT: &[u8] = b"keyfold-password-verifier-v1";

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No keys held — the session is locked or was never unlocked.
    #[error("session is locked")]
    Locked,

    /// The password failed offline verification against the stored marker.
    #[error("invalid password")]
    InvalidPassword,

    /// Underlying crypto failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Holds the derived subkeys between unlock and lock.
///
/// Clone-cheap handle: clones share the same key slot, so locking through
/// any handle locks them all.
#[derive(Clone, Default)]
pub struct Session {
    keys: Arc<RwLock<Option<SubkeyPair>>>,
}

impl Session {
    /// Creates a locked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives keys from the password and installs them atomically.
    ///
    /// Performs no password verification — a wrong password installs a
    /// wrong key that only fails once something refuses to decrypt. Use
    /// [`Session::unlock_verified`] when a verifier blob is available.
    pub fn unlock(&self, password: &str, salt: &Salt, params: &KdfParams) -> SessionResult<()> {
        let master = derive_master_key(password, salt, params)?;
        let pair = derive_subkeys(&master);

        *self.keys.write().unwrap() = Some(pair);
        debug!("session unlocked");
        Ok(())
    }

    /// Unlocks and checks the password against a stored verifier blob in
    /// one step. On mismatch the session stays locked.
    pub fn unlock_verified(
        &self,
        password: &str,
        salt: &Salt,
        params: &KdfParams,
        verifier: &str,
    ) -> SessionResult<()> {
        let master = derive_master_key(password, salt, params)?;
        let pair = derive_subkeys(&master);

        match cipher::decrypt(&pair.encryption, verifier) {
            Ok(plaintext) if plaintext == VERIFIER_PLAINTEXT => {}
            Ok(_) | Err(CryptoError::Authentication) => return Err(SessionError::InvalidPassword),
            Err(e) => return Err(e.into()),
        }

        *self.keys.write().unwrap() = Some(pair);
        debug!("session unlocked (password verified)");
        Ok(())
    }

    /// Discards the held keys. Safe to call while operations are in
    /// flight and safe to call on an already-locked session.
    pub fn lock(&self) {
        let taken = self.keys.write().unwrap().take();
        if taken.is_some() {
            // Dropped here; subkeys zeroize on drop
            debug!("session locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.keys.read().unwrap().is_some()
    }

    /// Clones the held subkeys for one operation.
    fn subkeys(&self) -> SessionResult<SubkeyPair> {
        self.keys
            .read()
            .unwrap()
            .clone()
            .ok_or(SessionError::Locked)
    }

    /// Encrypts a record under the session's encryption key.
    pub fn encrypt_record(&self, plaintext: &[u8]) -> SessionResult<String> {
        let keys = self.subkeys()?;
        Ok(cipher::encrypt(&keys.encryption, plaintext)?)
    }

    /// Decrypts a record. Tag mismatch surfaces as
    /// [`CryptoError::Authentication`] inside [`SessionError::Crypto`].
    pub fn decrypt_record(&self, blob: &str) -> SessionResult<Vec<u8>> {
        let keys = self.subkeys()?;
        Ok(cipher::decrypt(&keys.encryption, blob)?)
    }

    /// Produces the verifier blob persisted at account creation so later
    /// unlocks can check the password offline.
    pub fn create_verifier(&self) -> SessionResult<String> {
        self.encrypt_record(VERIFIER_PLAINTEXT)
    }

    /// Wraps an X25519 private key under the session's encryption key for
    /// server-side storage.
    pub fn wrap_private_key(&self, secret: &StaticSecret) -> SessionResult<String> {
        let keys = self.subkeys()?;
        Ok(agreement::encrypt_private_key(secret, &keys.encryption)?)
    }

    /// Unwraps a stored private key. A wrong master password surfaces as
    /// an authentication failure.
    pub fn unwrap_private_key(&self, wrapped: &str) -> SessionResult<StaticSecret> {
        let keys = self.subkeys()?;
        Ok(agreement::decrypt_private_key(wrapped, &keys.encryption)?)
    }

    /// Tags plaintext metadata with the session's MAC key.
    pub fn tag_metadata(&self, data: &[u8]) -> SessionResult<[u8; MAC_TAG_SIZE]> {
        let keys = self.subkeys()?;
        Ok(subkeys::tag_metadata(&keys.mac, data))
    }

    /// Verifies a metadata tag produced by [`Session::tag_metadata`].
    pub fn verify_metadata(&self, data: &[u8], tag: &[u8]) -> SessionResult<()> {
        let keys = self.subkeys()?;
        Ok(subkeys::verify_metadata(&keys.mac, data, tag)?)
    }
}

/// Checks a candidate password against a stored verifier without touching
/// any session state. Works fully offline.
pub fn verify_password(
    password: &str,
    salt: &Salt,
    params: &KdfParams,
    verifier: &str,
) -> SessionResult<bool> {
    let master = derive_master_key(password, salt, params)?;
    let pair = derive_subkeys(&master);

    match cipher::decrypt(&pair.encryption, verifier) {
        Ok(plaintext) => Ok(plaintext == VERIFIER_PLAINTEXT),
        Err(CryptoError::Authentication) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Account key material handed to the persistence collaborator at account
/// creation. The core treats storage as opaque: these values come back
/// verbatim at unlock time.
#[derive(Clone, Debug)]
pub struct AccountKeys {
    pub salt: Salt,
    pub params: KdfParams,
    /// Envelope blob over the fixed verification marker.
    pub verifier: String,
    /// Canonical base64url public key, shareable.
    pub public_key: String,
    /// The account's X25519 private key, wrapped under its own encryption
    /// key — opaque to the server.
    pub wrapped_private_key: String,
}

/// Bootstraps a new account: fresh salt, default KDF costs, verifier blob
/// and sharing keypair. Returns the bundle to persist plus an already
/// unlocked session.
pub fn create_account(password: &str) -> SessionResult<(AccountKeys, Session)> {
    let salt = Salt::random()?;
    let params = KdfParams::default();

    let session = Session::new();
    session.unlock(password, &salt, &params)?;

    let verifier = session.create_verifier()?;
    let keypair = KeyPair::generate();
    let wrapped_private_key = session.wrap_private_key(&keypair.secret)?;
    let public_key = agreement::export_public_key(&keypair.public);

    debug!("account key material created");
    Ok((
        AccountKeys {
            salt,
            params,
            verifier,
            public_key,
            wrapped_private_key,
        },
        session,
    ))
}
