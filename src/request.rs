//! Requests and their authentication state.
//!
//! A [`Request`] is tagged with its authentication state. A freshly constructed request is a
//! `Request<Unsigned>`: any `auth_` parameters it arrived with are held, but their values cannot be
//! read. [`Request::sign`] or [`Request::into_signed`] produce a `Request<AuthParameters>`, whose
//! auth block always carries a non-empty `auth_signature`.

use {
    crate::{
        canonical::{encode_query_string, parse_query_string, Canonicalizer},
        constants::*,
        crypto::hmac_sha256_hex,
        SignatureError, SignatureOptions, Token,
    },
    http::{request::Parts, uri::Uri},
    log::{debug, trace},
    std::collections::{btree_map::Iter, BTreeMap},
};

/// An HTTP-like request: method, path, and query parameters partitioned into ordinary parameters
/// and reserved `auth_` parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request<A = Unsigned> {
    /// The request method, uppercased.
    method: String,

    /// The request path, verbatim.
    path: String,

    /// Query parameters whose (lowercased) names do not start with `auth_`.
    parameters: BTreeMap<String, String>,

    /// The authentication state.
    auth: A,
}

/// Authentication state of a request that has not been signed (or whose signature has not been
/// checked for presence yet).
///
/// The `auth_` parameters the request arrived with are retained so the request can be promoted
/// with [`Request::into_signed`], but their values are not readable in this state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unsigned {
    pending: BTreeMap<String, String>,
}

impl Unsigned {
    /// The number of `auth_` parameters the request arrived with.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Indicates whether the request arrived without any `auth_` parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Indicates whether the request arrived with the named (lowercase) `auth_` parameter.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }
}

/// The auth block of a signed request: the reserved `auth_` parameters.
///
/// An `AuthParameters` value always contains a non-empty `auth_signature`; the other reserved
/// parameters are checked by the validation pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthParameters {
    parameters: BTreeMap<String, String>,
}

impl AuthParameters {
    /// Promote a raw set of `auth_` parameters to an auth block.
    fn try_from_map(parameters: BTreeMap<String, String>) -> Result<Self, SignatureError> {
        match parameters.get(AUTH_SIGNATURE) {
            Some(signature) if !signature.is_empty() => Ok(Self {
                parameters,
            }),
            _ => Err(SignatureError::NotSigned),
        }
    }

    /// Retrieve the value of a reserved parameter by its lowercase name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Retrieve `auth_version`, if present.
    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.get(AUTH_VERSION)
    }

    /// Retrieve `auth_key`, if present.
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.get(AUTH_KEY)
    }

    /// Retrieve `auth_timestamp` as sent, if present.
    #[inline]
    pub fn timestamp(&self) -> Option<&str> {
        self.get(AUTH_TIMESTAMP)
    }

    /// Retrieve `auth_signature`.
    #[inline]
    pub fn signature(&self) -> &str {
        self.get(AUTH_SIGNATURE).unwrap_or_default()
    }

    /// The number of reserved parameters in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Indicates whether the block is empty. A valid block always contains `auth_signature`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterate over the reserved parameters in name order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.parameters.iter()
    }

    /// Render the auth block as a percent-encoded query string, e.g. for appending to an outgoing
    /// URL.
    pub fn to_query_string(&self) -> String {
        encode_query_string(&self.parameters)
    }
}

impl<'a> IntoIterator for &'a AuthParameters {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Split raw query parameters into ordinary and `auth_` parameters, lowercasing every key.
///
/// Keys that are equal after lowercasing collapse to a single entry; the last one wins.
fn partition<I, K, V>(raw: I) -> (BTreeMap<String, String>, BTreeMap<String, String>)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut parameters = BTreeMap::new();
    let mut auth_parameters = BTreeMap::new();

    for (key, value) in raw {
        let key = key.as_ref().to_ascii_lowercase();
        if key.starts_with(AUTH_PARAMETER_PREFIX) {
            auth_parameters.insert(key, value.into());
        } else {
            parameters.insert(key, value.into());
        }
    }

    (parameters, auth_parameters)
}

impl Request<Unsigned> {
    /// Create a request from a method, a path, and raw query parameters.
    ///
    /// The method is uppercased; the path is kept verbatim. Every parameter key is lowercased and
    /// routed by whether it starts with `auth_`.
    pub fn new<M, P, I, K, V>(method: M, path: P, parameters: I) -> Self
    where
        M: AsRef<str>,
        P: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let (parameters, pending) = partition(parameters);
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
            parameters,
            auth: Unsigned {
                pending,
            },
        }
    }

    /// Create a request from a method, a path, and a raw (percent-encoded) query string.
    pub fn from_query_string<M, P>(method: M, path: P, query_string: &str) -> Result<Self, SignatureError>
    where
        M: AsRef<str>,
        P: Into<String>,
    {
        Ok(Self::new(method, path, parse_query_string(query_string)?))
    }

    /// Create a request from a method and a URI. The path is taken as sent, without decoding.
    pub fn from_uri<M>(method: M, uri: &Uri) -> Result<Self, SignatureError>
    where
        M: AsRef<str>,
    {
        Self::from_query_string(method, uri.path(), uri.query().unwrap_or_default())
    }

    /// Create a request from the head of an HTTP request.
    pub fn from_http_parts(parts: &Parts) -> Result<Self, SignatureError> {
        Self::from_uri(parts.method.as_str(), &parts.uri)
    }

    /// Create a request from an HTTP request. The body is not examined.
    pub fn from_http_request<B>(request: &http::Request<B>) -> Result<Self, SignatureError> {
        Self::from_uri(request.method().as_str(), request.uri())
    }

    /// Retrieve the authentication state. Only the presence of `auth_` parameters can be queried.
    #[inline]
    pub fn auth_state(&self) -> &Unsigned {
        &self.auth
    }

    /// Promote this request to the signed state using the `auth_` parameters it arrived with.
    ///
    /// # Errors
    /// Returns [`SignatureError::NotSigned`] unless the request carries a non-empty
    /// `auth_signature`.
    pub fn into_signed(self) -> Result<Request<AuthParameters>, SignatureError> {
        let auth = AuthParameters::try_from_map(self.auth.pending)?;
        Ok(Request {
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            auth,
        })
    }
}

impl TryFrom<Request<Unsigned>> for Request<AuthParameters> {
    type Error = SignatureError;

    fn try_from(request: Request<Unsigned>) -> Result<Self, SignatureError> {
        request.into_signed()
    }
}

impl<A> Request<A> {
    /// Retrieve the uppercased request method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Retrieve the request path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Retrieve the ordinary (non-`auth_`) query parameters.
    #[inline]
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Return the string to sign: `METHOD\nPATH\nCANONICAL_PARAMETERS`.
    ///
    /// The auth parameters are never part of the string to sign.
    pub fn string_to_sign(&self, canonicalizer: &dyn Canonicalizer) -> String {
        let canonical_parameters = canonicalizer.canonicalize(&self.parameters);
        let mut result =
            String::with_capacity(self.method.len() + self.path.len() + canonical_parameters.len() + 2);
        result.push_str(&self.method);
        result.push('\n');
        result.push_str(&self.path);
        result.push('\n');
        result.push_str(&canonical_parameters);
        result
    }

    /// Compute the hex-encoded HMAC-SHA256 signature of this request under `token`.
    pub fn signature(&self, token: &Token, canonicalizer: &dyn Canonicalizer) -> String {
        let string_to_sign = self.string_to_sign(canonicalizer);
        trace!("String to sign:\n{}", string_to_sign);
        hmac_sha256_hex(token.secret(), string_to_sign.as_bytes())
    }

    /// Sign this request with `token`, replacing any existing auth block.
    ///
    /// The timestamp is taken from the clock in `options`, in seconds since the Unix epoch.
    pub fn sign(self, token: &Token, options: &SignatureOptions) -> Request<AuthParameters> {
        let timestamp = options.now().timestamp();
        let signature = self.signature(token, options.canonicalizer());
        debug!("sign: key={} timestamp={}", token.key(), timestamp);

        let mut parameters = BTreeMap::new();
        parameters.insert(AUTH_VERSION.to_string(), SUPPORTED_VERSION.to_string());
        parameters.insert(AUTH_KEY.to_string(), token.key().to_string());
        parameters.insert(AUTH_TIMESTAMP.to_string(), timestamp.to_string());
        parameters.insert(AUTH_SIGNATURE.to_string(), signature);

        Request {
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            auth: AuthParameters {
                parameters,
            },
        }
    }
}

impl Request<AuthParameters> {
    /// Retrieve the auth block.
    #[inline]
    pub fn auth_parameters(&self) -> &AuthParameters {
        &self.auth
    }

    /// Render every parameter, ordinary and reserved, as a percent-encoded query string.
    pub fn to_query_string(&self) -> String {
        encode_query_string(self.parameters.iter().chain(self.auth.iter()))
    }
}
