//! Request signature verification.
//!
//! Verification runs three stages in order, stopping at the first failure:
//! 1. [`validate_version`][Request::validate_version]
//! 2. [`validate_timestamp`][Request::validate_timestamp]
//! 3. [`validate_signature`][Request::validate_signature]

use {
    crate::{
        canonical::Canonicalizer, constants::*, crypto::constant_time_eq, AuthParameters, Request, SignatureError,
        SignatureOptions, Token, TokenResolver,
    },
    chrono::{DateTime, Duration, Utc},
    log::{debug, trace},
};

impl Request<AuthParameters> {
    /// Verify that the request carries the supported protocol version.
    ///
    /// # Errors
    /// [`SignatureError::MissingVersion`] if `auth_version` is absent or empty;
    /// [`SignatureError::UnsupportedVersion`] if it is anything other than `"1.0"`.
    pub fn validate_version(&self) -> Result<(), SignatureError> {
        match self.auth_parameters().version() {
            None | Some("") => Err(SignatureError::MissingVersion),
            Some(SUPPORTED_VERSION) => Ok(()),
            Some(version) => {
                trace!("validate_version: unsupported version {:?}", version);
                Err(SignatureError::UnsupportedVersion(version.to_string()))
            }
        }
    }

    /// Verify that the request timestamp is within `grace` of `server_time`.
    ///
    /// If `grace` is `None`, freshness is not checked. Otherwise the request fails when
    /// `|auth_timestamp - server_time| >= grace`. The timestamps are whole seconds; `grace` keeps its
    /// full precision, and a zero or negative `grace` rejects every request.
    pub fn validate_timestamp(
        &self,
        grace: Option<Duration>,
        server_time: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let Some(grace) = grace else {
            return Ok(());
        };

        let raw = match self.auth_parameters().timestamp() {
            None | Some("") => return Err(SignatureError::MissingTimestamp),
            Some(raw) => raw,
        };

        let timestamp: i64 = raw.parse().map_err(|_| SignatureError::InvalidTimestamp(raw.to_string()))?;
        let server_time = server_time.timestamp();
        let difference = timestamp.abs_diff(server_time);

        // A difference too large to represent as a Duration is outside any grace window.
        let expired = i64::try_from(difference)
            .ok()
            .and_then(Duration::try_seconds)
            .map_or(true, |difference| grace <= Duration::zero() || difference >= grace);

        if expired {
            trace!(
                "validate_timestamp: request timestamp {} differs from server time {} by {}s; allowed < {}ms",
                timestamp,
                server_time,
                difference,
                grace.num_milliseconds()
            );
            return Err(SignatureError::TimestampExpired {
                timestamp,
                server_time,
                grace,
            });
        }

        Ok(())
    }

    /// Verify the request signature against the one computed with `token`.
    pub fn validate_signature(&self, token: &Token, canonicalizer: &dyn Canonicalizer) -> Result<(), SignatureError> {
        let expected = self.signature(token, canonicalizer);
        let provided = self.auth_parameters().signature();

        if constant_time_eq(expected.as_bytes(), provided.as_bytes()) {
            Ok(())
        } else {
            trace!("Signature mismatch: expected '{}', got '{}'", expected, provided);
            Err(SignatureError::SignatureMismatch {
                expected,
                provided: provided.to_string(),
            })
        }
    }

    /// Run the full validation pipeline with a known token.
    ///
    /// # Errors
    /// Returns the first failure from [`validate_version`][Self::validate_version],
    /// [`validate_timestamp`][Self::validate_timestamp], or
    /// [`validate_signature`][Self::validate_signature].
    pub fn try_authenticate_by_token(&self, token: &Token, options: &SignatureOptions) -> Result<(), SignatureError> {
        self.validate_version()?;
        self.validate_timestamp(options.timestamp_grace(), options.now())?;
        self.validate_signature(token, options.canonicalizer())?;
        trace!("try_authenticate_by_token: request authenticated for key {}", token.key());
        Ok(())
    }

    /// Run the full validation pipeline with a known token, reporting only success or failure.
    ///
    /// Use [`try_authenticate_by_token`][Self::try_authenticate_by_token] to learn why a request
    /// was rejected.
    pub fn authenticate_by_token(&self, token: &Token, options: &SignatureOptions) -> bool {
        match self.try_authenticate_by_token(token, options) {
            Ok(()) => true,
            Err(e) => {
                debug!("authenticate_by_token: rejected: {}", e);
                false
            }
        }
    }

    /// Look up the token for this request's `auth_key` and run the full validation pipeline.
    ///
    /// On success, returns the resolved token.
    ///
    /// # Errors
    /// * [`SignatureError::MissingKey`] if `auth_key` is absent or empty.
    /// * [`SignatureError::InvalidKey`] if the resolver knows no token for the key, or the token
    ///   has no secret.
    /// * Any error the resolver returns, converted with `SignatureError::from`.
    /// * Any failure from [`try_authenticate_by_token`][Self::try_authenticate_by_token].
    pub fn authenticate<R>(&self, resolver: &R, options: &SignatureOptions) -> Result<Token, SignatureError>
    where
        R: TokenResolver + ?Sized,
    {
        let key = match self.auth_parameters().key() {
            None | Some("") => return Err(SignatureError::MissingKey),
            Some(key) => key,
        };

        let token = match resolver.resolve_token(key) {
            Ok(Some(token)) if token.has_secret() => token,
            Ok(_) => {
                debug!("authenticate: no usable token for key {}", key);
                return Err(SignatureError::InvalidKey(MSG_INVALID_KEY.to_string()));
            }
            Err(e) => {
                debug!("authenticate: error resolving token for key {}: {}", key, e);
                return Err(SignatureError::from(e));
            }
        };

        self.try_authenticate_by_token(&token, options)?;
        Ok(token)
    }
}
