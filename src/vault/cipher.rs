//! Symmetric encryption of private keys at rest.
//!
//! Ciphertext layout: hex(`nonce[12] || AES-256-GCM(ciphertext || tag)`).
//! A fresh random nonce is drawn for every encryption, so sealing the same
//! key twice yields different ciphertexts.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use alloy::primitives::Address;
use rand::{thread_rng, Rng};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{BankError, BankResult};
use crate::vault::keys::{self, RawPrivateKey};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// The 256-bit key-encryption key, loaded once at startup.
#[derive(Clone)]
pub struct VaultKey([u8; 32]);

impl VaultKey {
    /// Parse a 64-character hex secret (optional 0x prefix).
    pub fn from_hex(secret: &str) -> BankResult<Self> {
        let secret = secret.trim();
        let secret = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(secret).map_err(|_| {
            BankError::Configuration("key encryption secret must be hex encoded".to_string())
        })?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            BankError::Configuration("key encryption secret must be 32 bytes".to_string())
        })?;
        Ok(Self(key))
    }

    /// Random key, for tests and for bootstrapping a new deployment.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        thread_rng().fill(&mut key);
        Self(key)
    }
}

impl Drop for VaultKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}

/// Generates keypairs and seals/unseals private keys.
pub struct KeyVault {
    cipher: Aes256Gcm,
}

impl KeyVault {
    pub fn new(key: &VaultKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(&key.0.into()),
        }
    }

    /// Generate a fresh keypair.
    pub fn generate_keypair(&self) -> (Address, RawPrivateKey) {
        keys::generate_keypair()
    }

    /// Seal a raw private key.
    pub fn encrypt(&self, key: &RawPrivateKey) -> BankResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, key.as_bytes())
            .map_err(|e| BankError::Encryption(format!("{:?}", e)))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    /// Unseal a ciphertext produced by [`KeyVault::encrypt`].
    pub fn decrypt(&self, sealed: &str) -> BankResult<RawPrivateKey> {
        let blob = hex::decode(sealed)
            .map_err(|_| BankError::Decryption("ciphertext is not hex".to_string()))?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(BankError::Decryption("ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| {
                BankError::Decryption("authentication failed (corrupt or foreign key)".to_string())
            })?;

        RawPrivateKey::from_slice(&plaintext)
            .ok_or_else(|| BankError::Decryption("unexpected plaintext length".to_string()))
    }
}

impl std::fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVault").finish_non_exhaustive()
    }
}
