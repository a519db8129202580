//! The `query_auth_signature` crate signs and verifies HTTP requests with an HMAC-SHA256
//! signature carried in reserved `auth_` query parameters.
//!
//! A signer holding a [`Token`] (a public key identifier plus a shared secret) adds four query
//! parameters to a request:
//!
//! | Parameter        | Value                                                         |
//! | ---------------- | ------------------------------------------------------------- |
//! | `auth_version`   | `1.0`                                                         |
//! | `auth_key`       | The token's key identifier.                                   |
//! | `auth_timestamp` | The signing time, in **seconds** since the Unix epoch.        |
//! | `auth_signature` | Lowercase hex `HMAC-SHA256(secret, string_to_sign)`.          |
//!
//! The string to sign is `METHOD + "\n" + PATH + "\n" + canonical_parameters`, where the
//! canonical parameters are the non-`auth_` parameters sorted by key, rendered `key=value`, and
//! joined with `&`. Parameter names are case-insensitive and are lowercased on receipt.
//!
//! A verifier checks, in order, the protocol version, that the timestamp is within a grace window
//! of its own clock (600 seconds by default), and the signature.
//!
//! # Workflow
//! 1. Build a [`Request`] from the method, path, and query parameters (or directly from an
//!    [`http::Request`]).
//! 2. To sign, call [`Request::sign`] and attach the resulting auth parameters to the outgoing
//!    request.
//! 3. To verify, promote the received request with [`Request::into_signed`] and call
//!    [`Request::authenticate`] with a [`TokenResolver`] that maps `auth_key` to a token.
//!
//! ## Example
//! ```rust
//! use chrono::{DateTime, Utc};
//! use query_auth_signature::{Request, SignatureError, SignatureOptions, Token};
//!
//! const KEY: &str = "278d425bdf160c739803";
//! const SECRET: &str = "7ad3773142a6692b25b8";
//!
//! // Pin the clock so the example is deterministic. Normally you would use
//! // `SignatureOptions::default()`, which reads the system clock.
//! let now = DateTime::<Utc>::from_timestamp(1_353_088_179, 0).unwrap();
//! let options = SignatureOptions::builder().clock(now).build().unwrap();
//!
//! // Client side: sign the request and send the query string.
//! let token = Token::new(KEY, SECRET);
//! let signed = Request::new("POST", "/apps/3/events", [("name", "foo")]).sign(&token, &options);
//! let query = signed.to_query_string();
//!
//! // Server side: rebuild the request from the wire and authenticate it.
//! let received = Request::from_query_string("POST", "/apps/3/events", &query)?.into_signed()?;
//! let resolved = received.authenticate(&|key: &str| (key == KEY).then(|| Token::new(KEY, SECRET)), &options)?;
//! assert_eq!(resolved.key(), KEY);
//!
//! // A request that was never signed cannot be authenticated.
//! let unsigned = Request::from_query_string("POST", "/apps/3/events", "name=foo")?;
//! assert!(matches!(unsigned.into_signed(), Err(SignatureError::NotSigned)));
//! # Ok::<(), SignatureError>(())
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

mod auth;
pub mod canonical;
mod chronoutil;
pub mod constants;
mod crypto;
mod error;
mod request;
mod signature;
mod token;

pub use {
    canonical::{Canonicalizer, QueryStringCanonicalizer},
    chronoutil::{Clock, SystemClock},
    error::{BoxError, SignatureError},
    request::{AuthParameters, Request, Unsigned},
    signature::{
        sign_http_request, validate_http_request, SignatureOptions, SignatureOptionsBuilder,
        SignatureOptionsBuilderError,
    },
    token::{resolver_fn, ResolverFn, Token, TokenResolver},
};

/// Re-export of the `scratchstack_errors` crate, whose [`ServiceError`][errors::ServiceError]
/// trait maps each [`SignatureError`] to an error code and HTTP status.
pub use scratchstack_errors as errors;
