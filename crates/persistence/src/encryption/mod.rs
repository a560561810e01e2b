//! Encryption for locally stored session tokens
//!
//! The JWT never touches disk in plaintext: it is sealed with AES-256-GCM
//! under a key derived from a machine fingerprint, so a copied database
//! file is useless on another host.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use habitleague_core::{Error, Result};
use rand::RngCore;

const KDF_SALT: &[u8] = b"habitleague-session-kdf-v1";

/// AES-GCM output plus the nonce needed to open it again
#[derive(Debug, Clone)]
pub struct SealedToken {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 12],
}

/// Seals and opens session tokens with AES-256-GCM
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// Build a cipher from a raw 32-byte key
    pub fn from_key(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(&(*key).into()),
        }
    }

    /// The usual constructor: a cipher keyed to this machine
    pub fn machine_bound() -> Result<Self> {
        Ok(Self::from_key(&machine_key()?))
    }

    /// Encrypt a token under a fresh random nonce
    pub fn seal(&self, token: &str) -> Result<SealedToken> {
        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), token.as_bytes())
            .map_err(|e| Error::EncryptionError(e.to_string()))?;

        Ok(SealedToken { ciphertext, nonce })
    }

    /// Decrypt a previously sealed token.
    ///
    /// Fails for tokens sealed on another machine and for tampered
    /// ciphertext (GCM authenticates both).
    pub fn open(&self, sealed: &SealedToken) -> Result<String> {
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
            .map_err(|_| {
                Error::EncryptionError(
                    "Stored token cannot be decrypted with this machine's key".to_string(),
                )
            })?;

        String::from_utf8(plaintext).map_err(|e| Error::EncryptionError(e.to_string()))
    }
}

/// Derive the 32-byte session key for this machine.
///
/// Argon2id over a fingerprint of machine id + hostname with a fixed
/// application salt: stable across calls on one host, different on another.
pub fn machine_key() -> Result<[u8; 32]> {
    let machine_id = machine_uid::get().unwrap_or_else(|_| "no-machine-id".to_string());
    let hostname = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string());
    let fingerprint = format!("habitleague:{}:{}", machine_id, hostname);

    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(fingerprint.as_bytes(), KDF_SALT, &mut key)
        .map_err(|e| Error::EncryptionError(format!("Key derivation failed: {}", e)))?;
    Ok(key)
}
