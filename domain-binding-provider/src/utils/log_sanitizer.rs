//! Log sanitization utilities
//!
//! Prevents sensitive data (private keys, certificate bodies, signed payloads)
//! from being fully exposed in debug/error logs.

use regex::Regex;

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

const PEM_BLOCK: &str = r"(?s)-----BEGIN ([A-Z0-9 ]+)-----.*?-----END ([A-Z0-9 ]+)-----";

const BASE64_FIELD: &str = r#""(PrivateKey|Certificate|CertificateChain)"\s*:\s*"[^"]*""#;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Replace PEM blocks and base64 key/certificate fields with placeholders.
///
/// Redacts everything if a pattern fails to compile.
pub fn redact_pem(s: &str) -> String {
    let (Ok(pem), Ok(field)) = (Regex::new(PEM_BLOCK), Regex::new(BASE64_FIELD)) else {
        return "[redacted]".to_string();
    };
    let out = pem.replace_all(s, "[redacted $1]");
    field.replace_all(&out, r#""$1":"[redacted]""#).into_owned()
}

/// Redact, then truncate.
pub fn sanitize_for_log(s: &str) -> String {
    truncate_for_log(&redact_pem(s))
}
