use sha2::{Digest, Sha256};

/// Generates a cryptographically random opaque token (64 hex chars = 32 bytes).
pub fn generate_token() -> String {
    let buf: [u8; 32] = rand::random();
    hex::encode(buf)
}

/// Returns the SHA-256 hex digest of the given token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
