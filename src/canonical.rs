//! Canonicalization of query parameters for the string to sign, and the query-string codec used to
//! move requests on and off the wire.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{constants::*, SignatureError},
    log::trace,
    qualifier_attr::qualifiers,
    std::{collections::BTreeMap, fmt::Debug},
};

/// Serializes the ordinary (non-`auth_`) query parameters for the string to sign.
///
/// Implementations must be deterministic and independent of insertion order, and signer and
/// verifier must use the same implementation; any divergence makes every signature fail.
pub trait Canonicalizer: Debug + Send + Sync {
    /// Produce the canonical form of `parameters`.
    fn canonicalize(&self, parameters: &BTreeMap<String, String>) -> String;
}

/// The default canonicalizer: parameters sorted by key, rendered as `key=value` without escaping,
/// and joined with `&`.
///
/// Because nothing is escaped, distinct parameter maps can share a canonical form: `{a: "1&b=2"}`
/// and `{a: "1", b: "2"}` both render as `a=1&b=2` and therefore carry the same signature. Both
/// parties must use this form to interoperate with existing signers; a [`Canonicalizer`] that
/// needs an injective encoding should escape `&` and `=` in keys and values.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryStringCanonicalizer;

impl Canonicalizer for QueryStringCanonicalizer {
    fn canonicalize(&self, parameters: &BTreeMap<String, String>) -> String {
        // BTreeMap iterates in key order already.
        let mut result = String::new();
        for (key, value) in parameters {
            if !result.is_empty() {
                result.push('&');
            }
            result.push_str(key);
            result.push('=');
            result.push_str(value);
        }
        result
    }
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Convert a byte to uppercase hex representation.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    let result: [u8; 2] = [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]];
    result
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.bytes() {
        if is_rfc3986_unreserved(c) {
            result.push(c as char);
        } else {
            let hex = u8_to_upper_hex(c);
            result.push('%');
            result.push(hex[0] as char);
            result.push(hex[1] as char);
        }
    }
    result
}

/// Decode a percent-encoded query string element. `+` decodes to a space.
///
/// Incomplete or non-hex escapes, and decoded bytes that are not UTF-8, are rejected with
/// [`SignatureError::InvalidInput`].
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn percent_decode(element: &str) -> Result<String, SignatureError> {
    let bytes = element.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 >= bytes.len() {
                    return Err(SignatureError::InvalidInput(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
                }

                let hex_digits = &bytes[i + 1..i + 3];
                match hex::decode(hex_digits) {
                    Ok(value) => result.push(value[0]),
                    Err(_) => {
                        return Err(SignatureError::InvalidInput(format!(
                            "{}{}{}",
                            MSG_ILLEGAL_HEX_CHAR, hex_digits[0] as char, hex_digits[1] as char
                        )));
                    }
                }
                i += 3;
            }
            b'+' => {
                result.push(b' ');
                i += 1;
            }
            c => {
                result.push(c);
                i += 1;
            }
        }
    }

    String::from_utf8(result).map_err(|_| SignatureError::InvalidInput(MSG_INVALID_UTF8.to_string()))
}

/// Split a raw query string into decoded `(key, value)` pairs, in the order they appear.
///
/// Empty components (`a=1&&b=2`) are skipped; a component without `=` has an empty value. Keys
/// are returned as sent; case folding happens when the pairs are partitioned into a request.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn parse_query_string(query_string: &str) -> Result<Vec<(String, String)>, SignatureError> {
    let mut result = Vec::new();

    for component in query_string.split('&') {
        if component.is_empty() {
            continue;
        }

        let (key, value) = component.split_once('=').unwrap_or((component, ""));
        result.push((percent_decode(key)?, percent_decode(value)?));
    }

    trace!("parse_query_string: {} parameter(s) from {:?}", result.len(), query_string);
    Ok(result)
}

/// Render parameters as a percent-encoded query string, sorted by key.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn encode_query_string<'a, I>(parameters: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut pairs: Vec<String> = parameters
        .into_iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect();
    pairs.sort_unstable();
    pairs.join("&")
}

#[cfg(test)]
mod tests {
    use {
        super::{
            encode_query_string, parse_query_string, percent_decode, percent_encode, u8_to_upper_hex, Canonicalizer,
            QueryStringCanonicalizer,
        },
        crate::SignatureError,
        std::collections::BTreeMap,
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(ref v) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), v),
                Err(ref e) => match e {
                    SignatureError::$expected(_) => e.to_string(),
                    _ => panic!("Expected {}; got {:#?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    #[test_log::test]
    fn canonicalize_sorted_pairs() {
        let mut parameters = BTreeMap::new();
        parameters.insert("b".to_string(), "B".to_string());
        parameters.insert("c".to_string(), "C".to_string());
        parameters.insert("a".to_string(), "A".to_string());
        assert_eq!(QueryStringCanonicalizer.canonicalize(&parameters), "a=A&b=B&c=C");
    }

    #[test_log::test]
    fn canonicalize_unescaped_values_collide() {
        let embedded = BTreeMap::from([("a".to_string(), "1&b=2".to_string())]);
        let separate = BTreeMap::from([("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]);
        assert_eq!(QueryStringCanonicalizer.canonicalize(&embedded), "a=1&b=2");
        assert_eq!(QueryStringCanonicalizer.canonicalize(&embedded), QueryStringCanonicalizer.canonicalize(&separate));
    }

    #[test_log::test]
    fn canonicalize_order_independent() {
        let forward: BTreeMap<String, String> =
            [("x", "1"), ("y", "2"), ("z", "3")].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let reverse: BTreeMap<String, String> =
            [("z", "3"), ("y", "2"), ("x", "1")].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(QueryStringCanonicalizer.canonicalize(&forward), QueryStringCanonicalizer.canonicalize(&reverse));
    }

    #[test_log::test]
    fn canonicalize_empty_and_unescaped() {
        assert_eq!(QueryStringCanonicalizer.canonicalize(&BTreeMap::new()), "");

        let mut parameters = BTreeMap::new();
        parameters.insert("q".to_string(), "a b&c".to_string());
        assert_eq!(QueryStringCanonicalizer.canonicalize(&parameters), "q=a b&c");
    }

    #[test_log::test]
    fn decode_valid() {
        assert_eq!(percent_decode("hello").unwrap(), "hello");
        assert_eq!(percent_decode("a%20b").unwrap(), "a b");
        assert_eq!(percent_decode("a+b").unwrap(), "a b");
        assert_eq!(percent_decode("%2a%2A").unwrap(), "**");
        assert_eq!(percent_decode("%E2%9C%93").unwrap(), "\u{2713}");
        assert_eq!(percent_decode("").unwrap(), "");
    }

    #[test_log::test]
    fn decode_invalid() {
        let e = expect_err!(percent_decode("abc%"), InvalidInput);
        assert_eq!(e, "Incomplete trailing escape % sequence");
        let e = expect_err!(percent_decode("abc%4"), InvalidInput);
        assert_eq!(e, "Incomplete trailing escape % sequence");
        let e = expect_err!(percent_decode("abc%yy"), InvalidInput);
        assert_eq!(e, "Illegal hex character in escape % pattern: %yy");
        let e = expect_err!(percent_decode("%80"), InvalidInput);
        assert_eq!(e, "Query string is not valid UTF-8 after decoding");
    }

    #[test_log::test]
    fn encode_reserved() {
        assert_eq!(percent_encode("abc-._~XYZ019"), "abc-._~XYZ019");
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("\u{2713}"), "%E2%9C%93");
        assert_eq!(u8_to_upper_hex(0x0a), [b'0', b'A']);
    }

    #[test_log::test]
    fn parse_query() {
        let pairs = parse_query_string("Foo=bar&&baz&auth_key=k%201").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("Foo".to_string(), "bar".to_string()),
                ("baz".to_string(), "".to_string()),
                ("auth_key".to_string(), "k 1".to_string()),
            ]
        );
        assert!(parse_query_string("").unwrap().is_empty());
        assert_eq!(parse_query_string("a=b=c").unwrap(), vec![("a".to_string(), "b=c".to_string())]);
        expect_err!(parse_query_string("a=%zz"), InvalidInput);
    }

    #[test_log::test]
    fn encode_then_parse() {
        let mut parameters = BTreeMap::new();
        parameters.insert("name".to_string(), "a b&c=d".to_string());
        parameters.insert("auth_key".to_string(), "k1".to_string());
        let query = encode_query_string(&parameters);
        assert_eq!(query, "auth_key=k1&name=a%20b%26c%3Dd");

        let parsed: BTreeMap<String, String> = parse_query_string(&query).unwrap().into_iter().collect();
        assert_eq!(parsed, parameters);
    }
}
