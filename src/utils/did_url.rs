// src/utils/did_url.rs
//! DID key URL parsing.
//!
//! Splits a DID key URL of the form
//!
//! ```text
//! did:<method>:<method-specific-id>[?versionId=<value>][#<fragment>]
//! ```
//!
//! into the bare DID and its optional version. The fragment (usually a key
//! id such as `#public-key-0`) is accepted and ignored. No case folding or
//! percent-decoding is applied to any component.

use crate::error::{LedgerError, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

const DID_SCHEME: &str = "did";
const DID_PREFIX: &str = "did:";
/// Reserved and unreserved characters of RFC 3986, besides letters and digits.
const URI_SYMBOLS: &[u8] = b"-._~:/?#[]@!$&'()*+,;=";
const VERSION_ID_KEY: &str = "versionId";

/// A parsed DID key URL.
///
/// `did` always starts with `did:` and contains a method segment followed by
/// a method-specific id. `version_id` is empty when the URL carries no query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidKeyUrl {
    did: String,
    version_id: String,
}

impl DidKeyUrl {
    /// Parses a raw DID key URL.
    ///
    /// # Errors
    /// Returns [`LedgerError::MalformedIdentifier`] if:
    /// - the string is not a syntactically valid URI
    /// - the scheme is not exactly `did`
    /// - the part before `?` has no `:`-delimited method-specific id
    /// - a query is present whose key is not `versionId` or which has no value
    pub fn parse(raw: &str) -> Result<Self> {
        ensure_uri_characters(raw)?;

        let uri = Url::parse(raw).map_err(|e| {
            LedgerError::malformed_identifier(format!("{raw}: not a valid URI ({e})"))
        })?;

        // `Url` lower-cases the scheme, so the raw prefix is checked as well.
        let Some(rest) = raw.strip_prefix(DID_PREFIX).filter(|_| uri.scheme() == DID_SCHEME) else {
            return Err(LedgerError::malformed_identifier(format!(
                "{raw}: scheme must be 'did'"
            )));
        };

        // Components are sliced from the raw input; `Url` accessors may differ.
        let without_fragment = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (scheme_specific, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        // Opaque URIs keep the whole `<method>:<id>` in the path.
        match scheme_specific.split_once(':') {
            Some((method, _)) if !method.is_empty() && uri.cannot_be_a_base() => {}
            _ => {
                return Err(LedgerError::malformed_identifier(format!(
                    "{raw}: invalid did method"
                )))
            }
        }
        let did = format!("{DID_PREFIX}{scheme_specific}");

        let version_id = match query.filter(|q| !q.is_empty()) {
            Some(query) => match query.split_once('=') {
                Some((VERSION_ID_KEY, value)) if !value.is_empty() => value.to_string(),
                _ => {
                    return Err(LedgerError::malformed_identifier(format!(
                        "{raw}: invalid query"
                    )))
                }
            },
            None => String::new(),
        };

        Ok(Self { did, version_id })
    }

    /// The DID without query or fragment, e.g. `did:example:test`.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The requested version, or an empty string for the latest one.
    pub fn version_id(&self) -> &str {
        &self.version_id
    }
}

/// Rejects anything a URI cannot contain, before `Url` gets a chance to
/// strip, trim or re-encode it.
fn ensure_uri_characters(raw: &str) -> Result<()> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes.get(i + 1..i + 3);
                if !escaped.map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                    return Err(LedgerError::malformed_identifier(format!(
                        "{raw}: invalid percent-encoding at offset {i}"
                    )));
                }
                i += 3;
                continue;
            }
            b if b.is_ascii_alphanumeric() || URI_SYMBOLS.contains(&b) => {}
            _ => {
                return Err(LedgerError::malformed_identifier(format!(
                    "{raw}: illegal character at offset {i}"
                )))
            }
        }
        i += 1;
    }
    Ok(())
}

impl FromStr for DidKeyUrl {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DidKeyUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version_id.is_empty() {
            write!(f, "{}", self.did)
        } else {
            write!(f, "{}?{}={}", self.did, VERSION_ID_KEY, self.version_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_without_version() {
        let url = DidKeyUrl::parse("did:example:test#public-key-0").unwrap();
        assert_eq!(url.did(), "did:example:test");
        assert_eq!(url.version_id(), "");
    }

    #[test]
    fn test_parse_with_version() {
        let url = DidKeyUrl::parse("did:example:test?versionId=2#public-key-0").unwrap();
        assert_eq!(url.did(), "did:example:test");
        assert_eq!(url.version_id(), "2");

        let url = DidKeyUrl::parse("did:omn:3kdS9Lz1yq8oGh?versionId=12").unwrap();
        assert_eq!(url.did(), "did:omn:3kdS9Lz1yq8oGh");
        assert_eq!(url.version_id(), "12");
    }

    #[test]
    fn test_bare_did_is_accepted() {
        let url: DidKeyUrl = "did:omn:issuer".parse().unwrap();
        assert_eq!(url.did(), "did:omn:issuer");
        assert_eq!(url.version_id(), "");
        assert_eq!(url.to_string(), "did:omn:issuer");
    }

    #[test]
    fn test_method_specific_id_may_contain_colons() {
        let url = DidKeyUrl::parse("did:web:example.com:user:alice?versionId=3").unwrap();
        assert_eq!(url.did(), "did:web:example.com:user:alice");
        assert_eq!(url.version_id(), "3");
    }

    #[test]
    fn test_no_percent_decoding() {
        let url = DidKeyUrl::parse("did:web:localhost%3A8080").unwrap();
        assert_eq!(url.did(), "did:web:localhost%3A8080");
    }

    #[test]
    fn test_invalid_urls() {
        let invalid = [
            "invalid:example:test?versionId=2#public-key-0",
            "did:example?versionId=2#public-key-0",
            "did:example:test?version=2",
            "did:example:test?versionId",
            "did:example:test?versionId=",
            "did::test",
            "DID:example:test",
            "did:/example:test",
            "not a uri",
            "",
            "did:exa\tmple:test",
            "did:example:te st",
            "did:example:t\u{e9}st",
            "did:example:test?versionId=2\n",
            " did:example:test",
            "did:example:test%2",
            "did:example:test%zz",
        ];

        for raw in invalid {
            let err = DidKeyUrl::parse(raw).unwrap_err();
            assert_eq!(
                err.code(),
                Some(ErrorCode::DidKeyUrlParsingError),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_components_are_taken_verbatim() {
        let url = DidKeyUrl::parse("did:example:a%2Fb?versionId=v%201#frag?x=y").unwrap();
        assert_eq!(url.did(), "did:example:a%2Fb");
        assert_eq!(url.version_id(), "v%201");

        let url = DidKeyUrl::parse("did:example:test?").unwrap();
        assert_eq!(url.did(), "did:example:test");
        assert_eq!(url.version_id(), "");
    }

    #[test]
    fn test_display_round_trips_version() {
        let url = DidKeyUrl::parse("did:example:test?versionId=7#key-1").unwrap();
        assert_eq!(url.to_string(), "did:example:test?versionId=7");
    }
}
