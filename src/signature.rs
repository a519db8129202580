use {
    crate::{
        canonical::{Canonicalizer, QueryStringCanonicalizer},
        chronoutil::{Clock, SystemClock},
        constants::DEFAULT_TIMESTAMP_GRACE_SECONDS,
        AuthParameters, Request, SignatureError, Token, TokenResolver,
    },
    chrono::{DateTime, Duration, Utc},
    derive_builder::Builder,
    http::uri::{PathAndQuery, Uri},
    log::trace,
    std::sync::Arc,
};

/// Options that can be used to configure signing and verification.
///
/// Signer and verifier must agree on the canonicalizer. The default options use a grace window of
/// 600 seconds, the system clock, and [`QueryStringCanonicalizer`].
#[derive(Builder, Clone, Debug)]
#[builder(derive(Debug))]
pub struct SignatureOptions {
    /// Maximum allowed difference between the request timestamp and the server clock. `None`
    /// disables the freshness check.
    #[builder(setter(into), default = "Some(Duration::seconds(DEFAULT_TIMESTAMP_GRACE_SECONDS))")]
    timestamp_grace: Option<Duration>,

    /// The time source used to stamp and check requests.
    #[builder(setter(custom), default = "Arc::new(SystemClock)")]
    clock: Arc<dyn Clock>,

    /// The canonicalizer for ordinary query parameters.
    #[builder(setter(custom), default = "Arc::new(QueryStringCanonicalizer)")]
    canonicalizer: Arc<dyn Canonicalizer>,
}

impl SignatureOptions {
    /// Create a [`SignatureOptionsBuilder`] to construct a [`SignatureOptions`].
    #[inline]
    pub fn builder() -> SignatureOptionsBuilder {
        SignatureOptionsBuilder::default()
    }

    /// Create a `SignatureOptions` that skips the timestamp freshness check.
    ///
    /// Use this only when replay protection is provided elsewhere.
    pub fn without_timestamp_check() -> Self {
        Self {
            timestamp_grace: None,
            ..Self::default()
        }
    }

    /// Retrieve the grace window, if freshness checking is enabled.
    #[inline]
    pub fn timestamp_grace(&self) -> Option<Duration> {
        self.timestamp_grace
    }

    /// Retrieve the clock.
    #[inline]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Retrieve the current time from the clock.
    #[inline]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Retrieve the canonicalizer.
    #[inline]
    pub fn canonicalizer(&self) -> &dyn Canonicalizer {
        self.canonicalizer.as_ref()
    }
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            timestamp_grace: Some(Duration::seconds(DEFAULT_TIMESTAMP_GRACE_SECONDS)),
            clock: Arc::new(SystemClock),
            canonicalizer: Arc::new(QueryStringCanonicalizer),
        }
    }
}

impl SignatureOptionsBuilder {
    /// Use the specified clock. A fixed `DateTime<Utc>` is itself a clock.
    pub fn clock<C: Clock + 'static>(&mut self, clock: C) -> &mut Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Use the specified canonicalizer.
    pub fn canonicalizer<Z: Canonicalizer + 'static>(&mut self, canonicalizer: Z) -> &mut Self {
        self.canonicalizer = Some(Arc::new(canonicalizer));
        self
    }
}

/// Validate a signed HTTP request.
///
/// This extracts the method, path, and query string from `request`, requires the query string to
/// carry a non-empty `auth_signature`, resolves the token for `auth_key` through `resolver`, and
/// runs the validation pipeline. The body is not examined.
///
/// On success, returns the resolved [`Token`].
///
/// # Errors
/// [`SignatureError::InvalidInput`] if the query string cannot be decoded,
/// [`SignatureError::NotSigned`] if there is no signature, or any error from
/// [`Request::authenticate`].
pub fn validate_http_request<B, R>(
    request: &http::Request<B>,
    resolver: &R,
    options: &SignatureOptions,
) -> Result<Token, SignatureError>
where
    R: TokenResolver + ?Sized,
{
    let request = Request::from_http_request(request)?;
    trace!("Created request: {:?}", request);
    let request = request.into_signed()?;
    request.authenticate(resolver, options)
}

/// Sign an outgoing HTTP request in place.
///
/// The request's query string is replaced with the ordinary parameters (keys lowercased) plus the
/// new auth block; any `auth_` parameters already present are discarded. Returns the auth block.
///
/// # Errors
/// [`SignatureError::InvalidInput`] if the existing query string cannot be decoded or the signed
/// URI cannot be assembled.
pub fn sign_http_request<B>(
    request: &mut http::Request<B>,
    token: &Token,
    options: &SignatureOptions,
) -> Result<AuthParameters, SignatureError> {
    let signed = Request::from_http_request(request)?.sign(token, options);
    let path_and_query = format!("{}?{}", signed.path(), signed.to_query_string());
    let path_and_query = PathAndQuery::try_from(path_and_query)
        .map_err(|e| SignatureError::InvalidInput(format!("Invalid signed path: {}", e)))?;

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    *request.uri_mut() =
        Uri::from_parts(parts).map_err(|e| SignatureError::InvalidInput(format!("Invalid signed URI: {}", e)))?;

    Ok(signed.auth_parameters().clone())
}
