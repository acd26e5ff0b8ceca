//! Blake3 hashing utilities for archive integrity.

use crate::error::{NupinError, NupinResult};

/// Compute Blake3 hash of data
pub fn blake3_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex().to_string()
}

/// Verify data integrity against expected hash
pub fn verify_integrity(package: &str, data: &[u8], expected_hash: &str) -> NupinResult<()> {
    let actual_hash = blake3_hash(data);
    if actual_hash == expected_hash {
        Ok(())
    } else {
        Err(NupinError::IntegrityFailure {
            package: package.to_string(),
            expected: expected_hash.to_string(),
            actual: actual_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_hash() {
        let hash = blake3_hash(b"hello world");

        assert_eq!(hash.len(), 64); // 32 bytes = 64 hex chars
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, blake3_hash(b"hello world"));
    }

    #[test]
    fn test_verify_integrity() {
        let data = b"package archive";
        let hash = blake3_hash(data);

        assert!(verify_integrity("jQuery 1.9.1", data, &hash).is_ok());

        let err = verify_integrity("jQuery 1.9.1", b"tampered", &hash).unwrap_err();
        assert!(matches!(err, NupinError::IntegrityFailure { ref package, .. } if package == "jQuery 1.9.1"));
    }
}
