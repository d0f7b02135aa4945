use sha2::{Digest, Sha256};

/// Compute the content id for a document: the SHA-256 hex digest of its raw
/// bytes. Identical bytes always produce the same id, so the id doubles as the
/// cache key for the on-disk index.
pub fn content_id(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_bytes_same_id() {
        assert_eq!(content_id(b"hello world"), content_id(b"hello world"));
    }

    #[test]
    fn test_different_bytes_different_id() {
        assert_ne!(content_id(b"hello world"), content_id(b"hello worlds"));
        assert_ne!(content_id(b""), content_id(b"\0"));
    }

    #[test]
    fn test_id_is_hex_sha256() {
        let id = content_id(b"");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        // SHA-256 of the empty input is a fixed constant
        assert_eq!(
            id,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
