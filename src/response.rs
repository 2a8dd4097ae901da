//! [`ResponseRecord`]: the data carrier a worker produces for one request
//! (§3). Constructed exactly once per request, whether served from cache
//! or fetched over the wire.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// An ordered name/value mapping, preserving header order and allowing
/// duplicate names.
pub type OrderedPairs = Vec<(String, String)>;

/// Response to one [`crate::request::RequestRecord`] (§3).
///
/// `text` and `json()` are derived lazily from `content` rather than
/// stored eagerly, matching the "derived" wording in §3 — `text()` runs the
/// declared/detected encoding on first call and the result isn't cached,
/// since a `ResponseRecord` is handed to the consumer exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// `true` iff `status` is in `200..300`.
    pub ok: bool,
    /// HTTP status code, or `0` on transport failure.
    pub status: u16,
    /// HTTP reason phrase, or `repr(error)` on transport failure.
    pub reason: String,
    /// Final URL after redirects, empty on transport failure.
    pub url: String,
    /// Response headers, in the order the server sent them.
    pub headers: OrderedPairs,
    /// Fully buffered response body.
    pub content: Vec<u8>,
    /// Declared or detected character encoding, if known.
    pub encoding: Option<String>,
}

impl ResponseRecord {
    /// A synthetic response representing a transport failure (§4.5 step 4).
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 0,
            reason: reason.into(),
            url: String::new(),
            headers: Vec::new(),
            content: Vec::new(),
            encoding: None,
        }
    }

    /// Decode `content` to text using the declared charset; if none was
    /// declared (or the label isn't recognized), run byte-level charset
    /// detection over the body before falling back to UTF-8 with lossy
    /// replacement of invalid sequences (§3, §4.5 step 3).
    pub fn text(&self) -> String {
        let encoding = self
            .encoding
            .as_deref()
            .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
            .unwrap_or_else(|| detect_encoding(&self.content));
        let (decoded, _, _) = encoding.decode(&self.content);
        decoded.into_owned()
    }

    /// Parse [`Self::text`] as JSON.
    pub fn json(&self) -> Result<serde_json::Value, DecodeError> {
        serde_json::from_str(&self.text()).map_err(DecodeError::from)
    }
}

/// Guess the character encoding of a response body that declared no
/// (or an unrecognized) charset, using a full byte-frequency detector
/// rather than a handful of hardcoded aliases.
fn detect_encoding(content: &[u8]) -> &'static encoding_rs::Encoding {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(content, true);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_has_zero_status() {
        let r = ResponseRecord::transport_failure("dns error");
        assert!(!r.ok);
        assert_eq!(r.status, 0);
        assert_eq!(r.reason, "dns error");
        assert_eq!(r.url, "");
        assert!(r.content.is_empty());
    }

    #[test]
    fn text_detects_utf8_when_no_charset_declared() {
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: "héllo".as_bytes().to_vec(),
            encoding: None,
        };
        assert_eq!(r.text(), "héllo");
    }

    #[test]
    fn json_parses_valid_body() {
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: br#"{"foo":"bar"}"#.to_vec(),
            encoding: Some("utf-8".into()),
        };
        let value = r.json().unwrap();
        assert_eq!(value["foo"], "bar");
    }

    #[test]
    fn json_reports_decode_error_on_non_json_body() {
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: b"not json".to_vec(),
            encoding: None,
        };
        assert!(r.json().is_err());
    }

    #[test]
    fn latin1_encoding_is_decoded_byte_for_byte() {
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: vec![0xe9], // 'é' in latin-1
            encoding: Some("latin-1".into()),
        };
        assert_eq!(r.text(), "é");
    }

    #[test]
    fn windows_1251_label_decodes_via_the_full_charset_table() {
        // 0xCF 0xF0 0xE8 0xE2 0xE5 0xF2 is "Привет" in windows-1251, a
        // charset the old 4-alias shortlist never recognized.
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: vec![0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2],
            encoding: Some("windows-1251".into()),
        };
        assert_eq!(r.text(), "Привет");
    }

    #[test]
    fn unrecognized_label_falls_back_to_detection() {
        let r = ResponseRecord {
            ok: true,
            status: 200,
            reason: "OK".into(),
            url: "https://example.com".into(),
            headers: vec![],
            content: "héllo".as_bytes().to_vec(),
            encoding: Some("not-a-real-charset".into()),
        };
        assert_eq!(r.text(), "héllo");
    }
}
