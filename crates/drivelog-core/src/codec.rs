use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

/// Reversible obfuscation of numeric database ids for use in URLs.
///
/// A token is base64url (no padding) of `"{id}|{tag}"` where `tag` is the hex
/// HMAC-SHA256 of the decimal id under the secret. Clients cannot forge or
/// increment tokens, but this is obfuscation, not access control.
pub struct IdCodec {
    key: Vec<u8>,
}

impl IdCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, id: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(id.to_string().as_bytes());
        mac
    }

    /// Encode an id into an opaque URL-safe token.
    pub fn encode(&self, id: i64) -> String {
        let tag = hex::encode(self.mac(id).finalize().into_bytes());
        URL_SAFE_NO_PAD.encode(format!("{}|{}", id, tag))
    }

    /// Decode a token back to its id, or `None` for anything malformed or
    /// tampered. Tag comparison is constant-time.
    pub fn decode(&self, token: &str) -> Option<i64> {
        let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
        let text = std::str::from_utf8(&raw).ok()?;

        let (id_part, tag_part) = text.split_once('|')?;
        let id: i64 = id_part.parse().ok()?;
        let tag = hex::decode(tag_part).ok()?;

        self.mac(id).verify_slice(&tag).ok()?;
        Some(id)
    }
}

/// Per-session memory of issued tokens, so repeated renders of the same page
/// resolve without recomputing; unknown tokens fall back to the codec.
///
/// Encoding is deterministic per key, so the map holds at most one entry per
/// row ever listed: growth is bounded by the row count, and entries are
/// dropped when their row is deleted.
#[derive(Clone, Default)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, i64>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode an id and remember the issued token.
    pub async fn issue(&self, codec: &IdCodec, id: i64) -> String {
        let token = codec.encode(id);
        let mut entries = self.entries.write().await;
        entries.insert(token.clone(), id);
        token
    }

    /// Resolve a token to its id, preferring the cache over decoding.
    pub async fn resolve(&self, codec: &IdCodec, token: &str) -> Result<i64> {
        {
            let entries = self.entries.read().await;
            if let Some(id) = entries.get(token) {
                return Ok(*id);
            }
        }
        codec.decode(token).ok_or(Error::InvalidToken)
    }

    /// Forget a token once its row is gone.
    pub async fn forget(&self, token: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> IdCodec {
        IdCodec::new("test-secret-key")
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = codec();

        for id in [1, 42, 999_999, i64::MAX] {
            let token = codec.encode(id);
            assert_eq!(codec.decode(&token), Some(id));
        }
    }

    #[test]
    fn test_token_is_url_safe() {
        let codec = codec();
        let token = codec.encode(12345);

        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = codec();
        let token = codec.encode(7);

        // Flip a character somewhere in the token.
        let mut tampered: Vec<char> = token.chars().collect();
        tampered[0] = if tampered[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = tampered.into_iter().collect();

        assert_eq!(codec.decode(&tampered), None);
    }

    #[test]
    fn test_id_swap_rejected() {
        let codec = codec();

        // Splice the tag of one id onto another id's payload.
        let tag = hex::encode(codec.mac(1).finalize().into_bytes());
        let forged = URL_SAFE_NO_PAD.encode(format!("2|{}", tag));

        assert_eq!(codec.decode(&forged), None);
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        let codec = codec();

        assert_eq!(codec.decode(""), None);
        assert_eq!(codec.decode("not base64 !!!"), None);
        assert_eq!(codec.decode(&URL_SAFE_NO_PAD.encode("no-separator")), None);
        assert_eq!(codec.decode(&URL_SAFE_NO_PAD.encode("abc|deadbeef")), None);
    }

    #[test]
    fn test_different_keys_do_not_verify() {
        let a = IdCodec::new("key-a");
        let b = IdCodec::new("key-b");

        let token = a.encode(10);
        assert_eq!(b.decode(&token), None);
    }

    #[tokio::test]
    async fn test_cache_resolves_issued_tokens() {
        let codec = codec();
        let cache = TokenCache::new();

        let token = cache.issue(&codec, 55).await;
        assert_eq!(cache.resolve(&codec, &token).await.unwrap(), 55);

        cache.forget(&token).await;
        // Still resolvable through the codec itself.
        assert_eq!(cache.resolve(&codec, &token).await.unwrap(), 55);
    }

    #[tokio::test]
    async fn test_cache_falls_back_to_decode() {
        let codec = codec();
        let cache = TokenCache::new();

        // Token never issued through the cache.
        let token = codec.encode(3);
        assert_eq!(cache.resolve(&codec, &token).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let codec = codec();
        let cache = TokenCache::new();

        let result = cache.resolve(&codec, "bogus").await;
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[tokio::test]
    async fn test_reissuing_same_id_does_not_grow_cache() {
        let codec = codec();
        let cache = TokenCache::new();

        let first = cache.issue(&codec, 9).await;
        let second = cache.issue(&codec, 9).await;

        // Deterministic encoding: one entry per id, however often it's listed.
        assert_eq!(first, second);
        assert_eq!(cache.entries.read().await.len(), 1);
    }
}
