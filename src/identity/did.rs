/// DID syntax checking
///
/// Grammar (W3C DID Core):
///
/// ```text
/// did                = "did:" method-name ":" method-specific-id
/// method-name        = 1*( %x61-7A / DIGIT )
/// method-specific-id = *( *idchar ":" ) 1*idchar
/// idchar             = ALPHA / DIGIT / "." / "-" / "_" / pct-encoded
/// pct-encoded        = "%" HEXDIG HEXDIG
/// ```
use serde::Serialize;
use std::fmt;

const DID_PREFIX: &str = "did:";

/// A string that passed [`is_valid_identifier`]
///
/// The only constructor is [`Did::parse`], so holding a `Did` is proof the
/// syntax check ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    pub fn parse(candidate: &str) -> Option<Self> {
        if is_valid_identifier(candidate) {
            Some(Did(candidate.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Does `candidate` conform to the DID syntax this gateway accepts
///
/// Total: never panics, returns false for empty or malformed input.
pub fn is_valid_identifier(candidate: &str) -> bool {
    let Some(rest) = candidate.strip_prefix(DID_PREFIX) else {
        return false;
    };
    let Some((method, id)) = rest.split_once(':') else {
        return false;
    };

    is_valid_method_name(method) && is_valid_method_specific_id(id)
}

fn is_valid_method_name(method: &str) -> bool {
    !method.is_empty()
        && method
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn is_valid_method_specific_id(id: &str) -> bool {
    // Inner segments may be empty, the last one may not
    match id.rsplit(':').next() {
        Some(last) if !last.is_empty() => {}
        _ => return false,
    }

    let bytes = id.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex_pair = bytes.get(i + 1..i + 3);
                match hex_pair {
                    Some(pair) if pair.iter().all(u8::is_ascii_hexdigit) => i += 3,
                    _ => return false,
                }
            }
            b if is_idchar(b) || b == b':' => i += 1,
            _ => return false,
        }
    }
    true
}

fn is_idchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_dids() {
        let valid = [
            "did:example:1",
            "did:example:nonexistent",
            "did:jlinx:7jqgSzTZUPhPH4fr2tEkNaKP2QnGLgU6Sv7SyMi2mLA",
            "did:jlinx:dGhpcy1pcy1hLWJhc2U2NHVybC1pZA",
            "did:web:example.com",
            "did:web:example.com:user:alice",
            "did:plc:ewvi7nxzyoun6zhxrhs64oiz",
            "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
            "did:example:abc%20def",
            "did:example::trailing-after-empty",
            "did:3:x_y.z-w",
        ];
        for did in valid {
            assert!(is_valid_identifier(did), "expected valid: {}", did);
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        let invalid = [
            "",
            "did",
            "did:",
            "did::abc",
            "did:example",
            "did:example:",
            "did:example:abc:",
            "did:Example:abc",
            "did:ex-ample:abc",
            "DID:example:abc",
            "not-a-did",
            "status",
            "new",
            "did:example:abc def",
            "did:example:abc/def",
            "did:example:abc?x=1",
            "did:example:abc#frag",
            "did:example:%zz",
            "did:example:%2",
            "did:example:caf\u{e9}",
            " did:example:abc",
        ];
        for did in invalid {
            assert!(!is_valid_identifier(did), "expected invalid: {:?}", did);
        }
    }

    #[test]
    fn test_parse_only_yields_valid_dids() {
        assert!(Did::parse("did:example:1").is_some());
        assert!(Did::parse("did:example").is_none());
    }

    #[test]
    fn test_did_keeps_original_text() {
        let did = Did::parse("did:web:example.com:user").unwrap();
        assert_eq!(did.as_str(), "did:web:example.com:user");
        assert_eq!(did.to_string(), "did:web:example.com:user");
        assert_eq!(serde_json::to_string(&did).unwrap(), "\"did:web:example.com:user\"");

        // Escapes are part of the identifier, not decoded
        let did = Did::parse("did:example:abc%20def").unwrap();
        assert_eq!(did.as_str(), "did:example:abc%20def");
    }
}
