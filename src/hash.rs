use anyhow::{bail, Result};
use sha1::{Digest, Sha1};

pub type Hash = [u8; 20];

#[must_use]
pub fn hash_bytes(data: &[u8]) -> Hash {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

pub fn hex_to_hash(s: &str) -> Result<Hash> {
    if s.len() != 40 {
        bail!("expected a 40-character hex SHA-1, got {} characters", s.len());
    }
    let bytes = hex::decode(s)?;
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

#[must_use]
pub fn short_hex(hash: &Hash) -> String {
    hash_to_hex(hash)[..7].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = hash_bytes(b"blob 6\0hello\n");
        let hex = hash_to_hex(&h);
        assert_eq!(hex.len(), 40);
        assert_eq!(hex_to_hash(&hex).unwrap(), h);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(hex_to_hash("abc").is_err());
    }

    #[test]
    fn short_hex_is_seven_chars() {
        let h = hash_bytes(b"x");
        assert_eq!(short_hex(&h).len(), 7);
    }
}
