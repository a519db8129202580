//! Common constants used throughout the crate.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Query parameter carrying the key identifier of the signing token.
pub const AUTH_KEY: &str = "auth_key";

/// Prefix shared by every reserved authentication query parameter.
pub const AUTH_PARAMETER_PREFIX: &str = "auth_";

/// Query parameter carrying the hex-encoded HMAC-SHA256 signature.
pub const AUTH_SIGNATURE: &str = "auth_signature";

/// Query parameter carrying the signing time, in seconds since the Unix epoch.
pub const AUTH_TIMESTAMP: &str = "auth_timestamp";

/// Query parameter carrying the protocol version.
pub const AUTH_VERSION: &str = "auth_version";

/// Default grace window, in seconds, between the request timestamp and the server clock.
pub const DEFAULT_TIMESTAMP_GRACE_SECONDS: i64 = 600;

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: InvalidInput
pub(crate) const ERR_CODE_INVALID_INPUT: &str = "InvalidInput";

/// Error code: InvalidKey
pub(crate) const ERR_CODE_INVALID_KEY: &str = "InvalidKey";

/// Error code: InvalidTimestamp
pub(crate) const ERR_CODE_INVALID_TIMESTAMP: &str = "InvalidTimestamp";

/// Error code: MissingKey
pub(crate) const ERR_CODE_MISSING_KEY: &str = "MissingKey";

/// Error code: MissingTimestamp
pub(crate) const ERR_CODE_MISSING_TIMESTAMP: &str = "MissingTimestamp";

/// Error code: MissingVersion
pub(crate) const ERR_CODE_MISSING_VERSION: &str = "MissingVersion";

/// Error code: NotSigned
pub(crate) const ERR_CODE_NOT_SIGNED: &str = "NotSigned";

/// Error code: SignatureMismatch
pub(crate) const ERR_CODE_SIGNATURE_MISMATCH: &str = "SignatureMismatch";

/// Error code: TimestampExpired
pub(crate) const ERR_CODE_TIMESTAMP_EXPIRED: &str = "TimestampExpired";

/// Error code: UnsupportedVersion
pub(crate) const ERR_CODE_UNSUPPORTED_VERSION: &str = "UnsupportedVersion";

/// Uppercase hex digits.
pub(crate) const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

/// Error message: `"Illegal hex character in escape % pattern: %"`
pub(crate) const MSG_ILLEGAL_HEX_CHAR: &str = "Illegal hex character in escape % pattern: %";

/// Error message: `"Incomplete trailing escape % sequence"`
pub(crate) const MSG_INCOMPLETE_TRAILING_ESCAPE: &str = "Incomplete trailing escape % sequence";

/// Error message: `"Invalid authentication key"`
pub(crate) const MSG_INVALID_KEY: &str = "Invalid authentication key";

/// Error message: `"Query string is not valid UTF-8 after decoding"`
pub(crate) const MSG_INVALID_UTF8: &str = "Query string is not valid UTF-8 after decoding";

/// Error message: `"Authentication key required"`
pub(crate) const MSG_MISSING_KEY: &str = "Authentication key required";

/// Error message: `"Timestamp required"`
pub(crate) const MSG_MISSING_TIMESTAMP: &str = "Timestamp required";

/// Error message: `"Version required"`
pub(crate) const MSG_MISSING_VERSION: &str = "Version required";

/// Error message: `"Request not signed"`
pub(crate) const MSG_NOT_SIGNED: &str = "Request not signed";

/// Error message: `"Version not supported: "`
pub(crate) const MSG_UNSUPPORTED_VERSION: &str = "Version not supported: ";

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// The only protocol version this crate produces or accepts.
pub const SUPPORTED_VERSION: &str = "1.0";
