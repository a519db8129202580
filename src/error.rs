use {
    crate::{chronoutil::duration_to_string, constants::*},
    chrono::Duration,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// A boxed, thread-safe error, as returned by token resolvers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error returned when constructing, signing, or authenticating a request fails.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The request could not be built from its wire representation (for example, a malformed
    /// percent-escape in the query string).
    InvalidInput(/* message */ String),

    /// The request does not carry a non-empty `auth_signature`, so its authentication parameters
    /// cannot be read.
    NotSigned,

    /// The `auth_version` parameter is missing.
    MissingVersion,

    /// The `auth_version` parameter is present but is not `"1.0"`.
    UnsupportedVersion(/* version */ String),

    /// The `auth_timestamp` parameter is missing.
    MissingTimestamp,

    /// The `auth_timestamp` parameter is not an integer number of seconds.
    InvalidTimestamp(/* timestamp */ String),

    /// The request timestamp is not within the grace window of the server clock.
    TimestampExpired {
        /// The timestamp supplied by the request, in seconds since the Unix epoch.
        timestamp: i64,

        /// The server time the timestamp was compared against, in seconds since the Unix epoch.
        server_time: i64,

        /// The grace window in effect.
        grace: Duration,
    },

    /// The `auth_key` parameter is missing.
    MissingKey,

    /// The token resolver did not produce a usable token for the `auth_key`.
    InvalidKey(/* message */ String),

    /// The signature supplied with the request does not match the signature we calculated.
    SignatureMismatch {
        /// The signature we calculated.
        expected: String,

        /// The signature the request carried.
        provided: String,
    },

    /// The token resolver failed for a reason other than an unknown key.
    InternalServiceError(BoxError),
}

impl SignatureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => ERR_CODE_INVALID_INPUT,
            Self::NotSigned => ERR_CODE_NOT_SIGNED,
            Self::MissingVersion => ERR_CODE_MISSING_VERSION,
            Self::UnsupportedVersion(_) => ERR_CODE_UNSUPPORTED_VERSION,
            Self::MissingTimestamp => ERR_CODE_MISSING_TIMESTAMP,
            Self::InvalidTimestamp(_) => ERR_CODE_INVALID_TIMESTAMP,
            Self::TimestampExpired {
                ..
            } => ERR_CODE_TIMESTAMP_EXPIRED,
            Self::MissingKey => ERR_CODE_MISSING_KEY,
            Self::InvalidKey(_) => ERR_CODE_INVALID_KEY,
            Self::SignatureMismatch {
                ..
            } => ERR_CODE_SIGNATURE_MISMATCH,
            Self::InternalServiceError(_) => ERR_CODE_INTERNAL_FAILURE,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_)
            | Self::MissingVersion
            | Self::UnsupportedVersion(_)
            | Self::MissingTimestamp
            | Self::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            Self::InternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl ServiceError for SignatureError {
    fn error_code(&self) -> &'static str {
        SignatureError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SignatureError::http_status(self)
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidInput(msg) => f.write_str(msg),
            Self::NotSigned => f.write_str(MSG_NOT_SIGNED),
            Self::MissingVersion => f.write_str(MSG_MISSING_VERSION),
            Self::UnsupportedVersion(version) => write!(f, "{}{}", MSG_UNSUPPORTED_VERSION, version),
            Self::MissingTimestamp => f.write_str(MSG_MISSING_TIMESTAMP),
            Self::InvalidTimestamp(timestamp) => write!(f, "Timestamp is not an integer: {}", timestamp),
            Self::TimestampExpired {
                timestamp,
                server_time,
                grace,
            } => write!(
                f,
                "Timestamp expired: Given timestamp ({}) not within {} of server time ({})",
                timestamp,
                duration_to_string(*grace),
                server_time
            ),
            Self::MissingKey => f.write_str(MSG_MISSING_KEY),
            Self::InvalidKey(msg) => f.write_str(msg),
            Self::SignatureMismatch {
                expected,
                provided,
            } => write!(f, "Invalid signature: you should have sent {}, but you sent {}", expected, provided),
            Self::InternalServiceError(ref e) => Display::fmt(e, f),
        }
    }
}

impl Error for SignatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InternalServiceError(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<BoxError> for SignatureError {
    fn from(e: BoxError) -> SignatureError {
        match e.downcast::<SignatureError>() {
            Ok(sig_err) => *sig_err,
            Err(e) => SignatureError::InternalServiceError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{BoxError, SignatureError},
        chrono::Duration,
        std::error::Error,
    };

    #[test_log::test]
    fn test_from() {
        // This just exercises a few codepaths that aren't usually exercised.
        let utf8_error = Box::new(String::from_utf8(b"\x80".to_vec()).unwrap_err());
        let e: SignatureError = (utf8_error as BoxError).into();
        assert_eq!(e.error_code(), "InternalFailure");
        assert_eq!(e.http_status(), 500);
        assert!(e.source().is_some());

        let e = SignatureError::InvalidInput("foo".to_string());
        let e2 = SignatureError::from(Box::new(e) as BoxError);
        assert_eq!(e2.to_string(), "foo");
        assert_eq!(e2.error_code(), "InvalidInput");
        assert_eq!(e2.http_status(), 400);
        assert!(e2.source().is_none());
    }

    #[test_log::test]
    fn test_messages() {
        let e = SignatureError::NotSigned;
        assert_eq!(e.to_string(), "Request not signed");
        assert_eq!(e.error_code(), "NotSigned");
        assert_eq!(e.http_status(), 401);

        let e = SignatureError::MissingVersion;
        assert_eq!(e.to_string(), "Version required");
        assert_eq!(e.error_code(), "MissingVersion");
        assert_eq!(e.http_status(), 400);

        let e = SignatureError::UnsupportedVersion("2.0".to_string());
        assert_eq!(e.to_string(), "Version not supported: 2.0");
        assert_eq!(e.error_code(), "UnsupportedVersion");

        let e = SignatureError::MissingTimestamp;
        assert_eq!(e.to_string(), "Timestamp required");
        assert_eq!(e.error_code(), "MissingTimestamp");

        let e = SignatureError::InvalidTimestamp("soon".to_string());
        assert_eq!(e.to_string(), "Timestamp is not an integer: soon");
        assert_eq!(e.error_code(), "InvalidTimestamp");
        assert_eq!(e.http_status(), 400);

        let e = SignatureError::TimestampExpired {
            timestamp: 1000,
            server_time: 1600,
            grace: Duration::seconds(600),
        };
        assert_eq!(e.to_string(), "Timestamp expired: Given timestamp (1000) not within 10 min of server time (1600)");
        assert_eq!(e.error_code(), "TimestampExpired");
        assert_eq!(e.http_status(), 401);

        let e = SignatureError::MissingKey;
        assert_eq!(e.to_string(), "Authentication key required");
        assert_eq!(e.error_code(), "MissingKey");

        let e = SignatureError::InvalidKey("Invalid authentication key".to_string());
        assert_eq!(e.to_string(), "Invalid authentication key");
        assert_eq!(e.error_code(), "InvalidKey");
        assert_eq!(e.http_status(), 401);

        let e = SignatureError::SignatureMismatch {
            expected: "abc".to_string(),
            provided: "abd".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid signature: you should have sent abc, but you sent abd");
        assert_eq!(e.error_code(), "SignatureMismatch");
        assert_eq!(e.http_status(), 401);
    }
}
