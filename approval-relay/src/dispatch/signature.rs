//! Dispatch signatures for in-flight deduplication.

use sha2::{Digest, Sha256};

/// Compute the dedup key for a request.
///
/// The key is the SHA-256 hex digest of `destination + "_" + body`, where
/// `body` is the canonical JSON serialization of the payload.
pub fn dispatch_signature(destination: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(destination.as_bytes());
    hasher.update(b"_");
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable() {
        let a = dispatch_signature("https://hooks.example.com/a", r#"{"action":"approve"}"#);
        let b = dispatch_signature("https://hooks.example.com/a", r#"{"action":"approve"}"#);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_destination_and_body() {
        let base = dispatch_signature("https://hooks.example.com/a", "{}");

        assert_ne!(base, dispatch_signature("https://hooks.example.com/b", "{}"));
        assert_ne!(base, dispatch_signature("https://hooks.example.com/a", "{ }"));
    }
}
