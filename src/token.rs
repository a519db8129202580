use {
    crate::BoxError,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// A credential pair: a public key identifier and the shared secret used as the HMAC key.
///
/// The secret is never transmitted and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// The key identifier, sent as `auth_key`.
    key: String,

    /// The shared secret.
    secret: Vec<u8>,
}

impl Token {
    /// Create a new token from a key identifier and a secret.
    pub fn new<K, S>(key: K, secret: S) -> Self
    where
        K: Into<String>,
        S: AsRef<[u8]>,
    {
        Self {
            key: key.into(),
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Retrieve the key identifier.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Retrieve the shared secret.
    #[inline]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Indicates whether this token carries a usable (non-empty) secret.
    #[inline]
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Token").field("key", &self.key).field("secret", &"<redacted>").finish()
    }
}

/// Looks up the [`Token`] for an `auth_key`.
///
/// Returning `Ok(None)` means the key is unknown; this is an ordinary authentication failure.
/// Returning `Err` means the lookup itself failed (for example, the credential store was
/// unreachable).
pub trait TokenResolver {
    /// Resolve the token for `key`.
    fn resolve_token(&self, key: &str) -> Result<Option<Token>, BoxError>;
}

impl<F> TokenResolver for F
where
    F: Fn(&str) -> Option<Token>,
{
    fn resolve_token(&self, key: &str) -> Result<Option<Token>, BoxError> {
        Ok(self(key))
    }
}

/// A [`TokenResolver`] wrapping a fallible lookup function. See [`resolver_fn`].
#[derive(Clone, Copy)]
pub struct ResolverFn<F> {
    f: F,
}

impl<F> Debug for ResolverFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("ResolverFn")
    }
}

impl<F> TokenResolver for ResolverFn<F>
where
    F: Fn(&str) -> Result<Option<Token>, BoxError>,
{
    fn resolve_token(&self, key: &str) -> Result<Option<Token>, BoxError> {
        (self.f)(key)
    }
}

/// Create a [`TokenResolver`] from a function that may fail.
///
/// Infallible lookups (`Fn(&str) -> Option<Token>`) implement [`TokenResolver`] directly and do
/// not need this wrapper.
pub fn resolver_fn<F>(f: F) -> ResolverFn<F>
where
    F: Fn(&str) -> Result<Option<Token>, BoxError>,
{
    ResolverFn {
        f,
    }
}
