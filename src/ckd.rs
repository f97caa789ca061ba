//! The elliptic-curve step functions behind HD derivation.
//!
//! [`HdNode`](crate::hdnode::HdNode) only walks paths; the arithmetic is
//! delegated to a [`ChildKeyDerivation`] implementation so the walker can be
//! exercised with a fake curve in tests.

use crate::error::{Error, Result};
use crate::utils;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use std::fmt;

/// Private key and chain code produced by a derivation step
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub private_key: [u8; 32],
    pub chain_code: [u8; 32],
}

/// BIP-32 private derivation primitives
pub trait ChildKeyDerivation {
    /// Root key and chain code from a seed
    fn master_key_from_seed(&self, seed: &[u8]) -> Result<KeyMaterial>;

    /// CKDpriv for `index` (unfolded, below 2^31)
    fn derive_child(
        &self,
        parent: &KeyMaterial,
        index: u32,
        hardened: bool,
    ) -> Result<KeyMaterial>;

    /// Compressed public key for a private key
    fn public_key(&self, private_key: &[u8; 32]) -> Result<[u8; 33]>;
}

/// BIP-32 over secp256k1
#[derive(Clone)]
pub struct Secp256k1Derivation {
    secp: Secp256k1<All>,
}

impl Secp256k1Derivation {
    pub fn new() -> Self {
        Secp256k1Derivation {
            secp: Secp256k1::new(),
        }
    }
}

impl Default for Secp256k1Derivation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Secp256k1Derivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Secp256k1Derivation")
    }
}

fn split(hmac_result: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut i_l = [0u8; 32];
    let mut i_r = [0u8; 32];
    i_l.copy_from_slice(&hmac_result[0..32]);
    i_r.copy_from_slice(&hmac_result[32..64]);
    (i_l, i_r)
}

impl ChildKeyDerivation for Secp256k1Derivation {
    fn master_key_from_seed(&self, seed: &[u8]) -> Result<KeyMaterial> {
        if seed.len() < 16 {
            return Err(Error::InvalidSeed(
                "Seed must be at least 16 bytes".to_string(),
            ));
        }

        let (secret_key, chain_code) = split(&utils::hmac_sha512(b"Bitcoin seed", seed));

        SecretKey::from_slice(&secret_key)
            .map_err(|_| Error::DerivationError("Invalid master key from seed".to_string()))?;

        Ok(KeyMaterial {
            private_key: secret_key,
            chain_code,
        })
    }

    fn derive_child(
        &self,
        parent: &KeyMaterial,
        index: u32,
        hardened: bool,
    ) -> Result<KeyMaterial> {
        let parent_key = SecretKey::from_slice(&parent.private_key)
            .map_err(|_| Error::DerivationError("Invalid parent private key".to_string()))?;

        let mut hmac_input = Vec::with_capacity(37);
        let raw_index = if hardened {
            // Hardened derivation: data = 0x00 || private_key || index
            hmac_input.push(0);
            hmac_input.extend_from_slice(&parent.private_key);
            index | crate::bip32::HARDENED_OFFSET
        } else {
            // Normal derivation: data = public_key || index
            let public_key = PublicKey::from_secret_key(&self.secp, &parent_key);
            hmac_input.extend_from_slice(&public_key.serialize());
            index
        };
        hmac_input.extend_from_slice(&raw_index.to_be_bytes());

        let (i_l, i_r) = split(&utils::hmac_sha512(&parent.chain_code, &hmac_input));

        // child key = (I_L + parent key) mod n; an out of range I_L or a zero
        // result makes this index unusable
        let child_key = SecretKey::from_slice(&i_l)
            .map_err(|_| {
                Error::DerivationError(format!("I_L out of range for index {raw_index}"))
            })?
            .add_tweak(&parent_key.into())
            .map_err(|_| {
                Error::DerivationError(format!("Invalid child private key at index {raw_index}"))
            })?;

        Ok(KeyMaterial {
            private_key: child_key.secret_bytes(),
            chain_code: i_r,
        })
    }

    fn public_key(&self, private_key: &[u8; 32]) -> Result<[u8; 33]> {
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|_| Error::DerivationError("Invalid private key".to_string()))?;
        Ok(PublicKey::from_secret_key(&self.secp, &secret_key).serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_master_key_from_seed() {
        let deriver = Secp256k1Derivation::new();
        let master = deriver
            .master_key_from_seed(&hex!("000102030405060708090a0b0c0d0e0f"))
            .unwrap();
        assert_eq!(
            master.private_key,
            hex!("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35")
        );
        assert_eq!(
            master.chain_code,
            hex!("873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508")
        );
    }

    #[test]
    fn test_short_seed_rejected() {
        let deriver = Secp256k1Derivation::new();
        assert!(matches!(
            deriver.master_key_from_seed(&[0u8; 15]),
            Err(Error::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_invalid_parent_key_is_reported() {
        let deriver = Secp256k1Derivation::new();
        let parent = KeyMaterial {
            private_key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        assert!(matches!(
            deriver.derive_child(&parent, 0, true),
            Err(Error::DerivationError(_))
        ));
        assert!(matches!(
            deriver.public_key(&[0xff; 32]),
            Err(Error::DerivationError(_))
        ));
    }
}
