use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

use zeroize::Zeroizing;

/// Bearer credentials issued by the identity provider, forwarded as-is to
/// the remote API on every authenticated call.
#[derive(Clone)]
pub struct AccessToken {
    token_type: String,
    secret: Zeroizing<String>,
}

impl AccessToken {
    pub fn new(token_type: impl Into<String>, secret: impl Into<String>) -> Self {
        AccessToken {
            token_type: token_type.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn bearer(secret: impl Into<String>) -> Self {
        Self::new("Bearer", secret)
    }

    /// Parses an `Authorization` header value of the form `<type> <token>`.
    pub fn from_header(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        match parts.as_slice() {
            [token_type, secret] if !secret.is_empty() => Some(Self::new(*token_type, *secret)),
            _ => None,
        }
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.secret.as_str())
    }

    /// Process-local key for per-caller bookkeeping; the secret itself is
    /// never stored outside the token.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.token_type.hash(&mut hasher);
        self.secret.as_str().hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
