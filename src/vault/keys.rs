//! Raw private keys and keypair generation.
//!
//! # Security
//! - Key bytes never appear in `Debug` output
//! - Bytes are cleared when the key is dropped
//! - Hex export exists only for the one-time disclosure at account creation

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use zeroize::{Zeroize, Zeroizing};

/// A raw secp256k1 private key held in process memory.
pub struct RawPrivateKey([u8; 32]);

impl RawPrivateKey {
    /// Parse a hex-encoded key (with or without 0x prefix).
    pub fn from_hex(key_hex: &str) -> Option<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let bytes = Zeroizing::new(hex::decode(key_hex).ok()?);
        Self::from_slice(&bytes)
    }

    /// Build a key from exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let key: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(key))
    }

    /// Signer for this key. Fails for values outside the curve order.
    pub fn signer(&self) -> Result<PrivateKeySigner, String> {
        PrivateKeySigner::from_slice(&self.0).map_err(|e| format!("invalid secp256k1 key: {}", e))
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Result<Address, String> {
        self.signer().map(|s| s.address())
    }

    /// `0x`-prefixed lowercase hex. Only for one-time disclosure.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for RawPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawPrivateKey(<redacted>)")
    }
}

impl Drop for RawPrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Generate a fresh random keypair.
pub fn generate_keypair() -> (Address, RawPrivateKey) {
    let signer = PrivateKeySigner::random();
    let key = RawPrivateKey(signer.to_bytes().0);
    (signer.address(), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_key_from_hex() {
        let key = RawPrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            key.address().unwrap().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let prefixed = RawPrivateKey::from_hex(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(prefixed.address().unwrap(), key.address().unwrap());
    }

    #[test]
    fn test_invalid_key_material() {
        assert!(RawPrivateKey::from_hex("invalid_key").is_none());
        assert!(RawPrivateKey::from_hex("0xabcd").is_none());
        // Zero is not a valid scalar
        let zero = RawPrivateKey::from_slice(&[0u8; 32]).unwrap();
        assert!(zero.signer().is_err());
    }

    #[test]
    fn test_generated_keypair_format() {
        let (address, key) = generate_keypair();
        assert_eq!(key.address().unwrap(), address);

        let address = address.to_string();
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 42);

        let key_hex = key.to_hex();
        assert!(key_hex.starts_with("0x"));
        assert_eq!(key_hex.len(), 66);
        assert!(key_hex[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = RawPrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains(TEST_PRIVATE_KEY));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_drop_clears_bytes() {
        let mut key = RawPrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        key.0.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_generated_keys_differ() {
        let (a, _) = generate_keypair();
        let (b, _) = generate_keypair();
        assert_ne!(a, b);
    }
}
