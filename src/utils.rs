use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{Error, Result};

pub type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    let result = mac.finalize().into_bytes();
    let mut hash = [0u8; 64];
    hash.copy_from_slice(&result[..]);
    hash
}

/// Compute SHA256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// RIPEMD160(SHA256(data)), used for BIP-32 key fingerprints
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    let result = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&result);
    hash
}

/// First 4 bytes of double-SHA256
fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = sha256(&sha256(data));
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&hash[0..4]);
    checksum
}

/// Encode a base58 string with a checksum
pub fn base58check_encode(data: &[u8]) -> String {
    let mut check_data = Vec::with_capacity(data.len() + 4);
    check_data.extend_from_slice(data);
    check_data.extend_from_slice(&checksum(data));
    bs58::encode(check_data).into_string()
}

/// Decode a base58 string and verify its checksum
pub fn base58check_decode(data: &str) -> Result<Vec<u8>> {
    let decoded = bs58::decode(data)
        .into_vec()
        .map_err(|e| Error::MalformedExtendedKey(format!("invalid base58 string: {e}")))?;

    if decoded.len() < 4 {
        return Err(Error::MalformedExtendedKey("payload too short".to_string()));
    }

    let (data_part, checksum_part) = decoded.split_at(decoded.len() - 4);
    if checksum_part != checksum(data_part) {
        return Err(Error::MalformedExtendedKey("checksum mismatch".to_string()));
    }

    Ok(data_part.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58check_rejects_tampered_payload() {
        let encoded = base58check_encode(b"radix");
        assert_eq!(base58check_decode(&encoded).unwrap(), b"radix");

        let mut tampered = encoded.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'1' { b'2' } else { b'1' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(matches!(
            base58check_decode(&tampered),
            Err(Error::MalformedExtendedKey(_))
        ));
    }

    #[test]
    fn test_base58check_rejects_invalid_alphabet() {
        assert!(matches!(
            base58check_decode("0OIl"),
            Err(Error::MalformedExtendedKey(_))
        ));
    }

    #[test]
    fn test_hash160_of_empty_input() {
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }
}
