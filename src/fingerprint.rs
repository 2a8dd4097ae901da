//! Canonical request fingerprinting (§4.2).
//!
//! Builds a stable SHA-256 digest over a canonical JSON-like
//! representation of a request, so two requests that are semantically
//! identical (same method, URL, query, headers, and body — modulo key
//! order and, for the body, map-key order) fingerprint identically.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::request::{Body, RequestRecord};

/// Hex-encoded SHA-256 digest of a canonicalized request.
pub type Fingerprint = String;

/// Compute the fingerprint of a request per §4.2.
pub fn fingerprint(request: &RequestRecord) -> Fingerprint {
    let canonical = canonicalize(request);
    let serialized =
        serde_json::to_string(&canonical).expect("canonical value is always serializable");

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the canonical JSON value described in §4.2, steps 1-4.
fn canonicalize(request: &RequestRecord) -> Value {
    let (scheme_host, path) = split_scheme_host_path(&request.url);

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, values) in url_query_pairs(&request.url)
        .into_iter()
        .chain(request.params.iter().cloned())
        .map(|(k, v)| (k, vec![v]))
    {
        query.entry(key).or_default().extend(values);
    }

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &request.headers {
        headers.insert(name.trim().to_ascii_lowercase(), value.clone());
    }

    let mut object = Map::new();
    object.insert(
        "method".to_string(),
        Value::String(request.method.as_str().trim().to_string()),
    );
    object.insert("scheme_host".to_string(), Value::String(scheme_host));
    object.insert("path".to_string(), Value::String(path));
    object.insert(
        "query".to_string(),
        Value::Object(
            query
                .into_iter()
                .map(|(k, v)| (k, Value::Array(v.into_iter().map(Value::String).collect())))
                .collect(),
        ),
    );
    object.insert(
        "headers".to_string(),
        Value::Object(
            headers
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        ),
    );
    object.insert("body".to_string(), normalize_body(&request.body));

    Value::Object(object)
}

/// Split a URL into lowercased `scheme://host[:port]` and the verbatim
/// path (query stripped). Malformed URLs fall back to treating the whole
/// string as the "path" with an empty scheme/host — fingerprinting must
/// never fail (§4.2 contract: pure and stable).
fn split_scheme_host_path(url: &str) -> (String, String) {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme_host = format!(
                "{}://{}",
                parsed.scheme().to_ascii_lowercase(),
                parsed.host_str().unwrap_or("").to_ascii_lowercase()
            );
            let scheme_host = match parsed.port() {
                Some(port) => format!("{scheme_host}:{port}"),
                None => scheme_host,
            };
            (scheme_host, parsed.path().to_string())
        }
        Err(_) => (String::new(), url.to_string()),
    }
}

/// Extract query pairs already present in the URL, preserving insertion
/// order within each key (merged with `params` by the caller).
fn url_query_pairs(url: &str) -> Vec<(String, String)> {
    url::Url::parse(url)
        .map(|parsed| {
            parsed
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize a request body per §4.2 step 4.
fn normalize_body(body: &Body) -> Value {
    match body {
        Body::None => Value::Null,
        Body::Raw(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let mut object = Map::new();
            object.insert("__type".to_string(), Value::String("bytes".to_string()));
            object.insert(
                "sha256".to_string(),
                Value::String(format!("{:x}", hasher.finalize())),
            );
            Value::Object(object)
        }
        Body::Json(value) => normalize_json_value(value),
    }
}

/// Recursively normalize a JSON value: sort object keys lexicographically,
/// preserve array order, pass primitives through unchanged.
fn normalize_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), normalize_json_value(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_json_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn identical_requests_yield_identical_fingerprints() {
        let a = RequestRecord::new(Method::Get, "https://example.com/x");
        let b = RequestRecord::new(Method::Get, "https://example.com/x");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn query_param_order_does_not_matter() {
        // S5: GET https://x/?a=1&b=2 vs GET https://x/?b=2&a=1
        let a = RequestRecord::new(Method::Get, "https://x/?a=1&b=2");
        let b = RequestRecord::new(Method::Get, "https://x/?b=2&a=1");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn params_merge_with_url_query() {
        let a = RequestRecord::new(Method::Get, "https://x/?a=1").with_params(vec![(
            "b".to_string(),
            "2".to_string(),
        )]);
        let b = RequestRecord::new(Method::Get, "https://x/?a=1&b=2");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn header_key_order_and_case_do_not_matter() {
        let a = RequestRecord::new(Method::Get, "https://x/").with_headers(vec![
            ("Accept".to_string(), "json".to_string()),
            ("X-Foo".to_string(), "bar".to_string()),
        ]);
        let b = RequestRecord::new(Method::Get, "https://x/").with_headers(vec![
            ("x-foo".to_string(), "bar".to_string()),
            ("ACCEPT".to_string(), "json".to_string()),
        ]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn json_body_key_order_does_not_matter() {
        let a = RequestRecord::new(Method::Post, "https://x/")
            .with_json_body(json!({"foo": "bar", "baz": 1}));
        let b = RequestRecord::new(Method::Post, "https://x/")
            .with_json_body(json!({"baz": 1, "foo": "bar"}));
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn json_array_order_matters() {
        let a = RequestRecord::new(Method::Post, "https://x/").with_json_body(json!([1, 2, 3]));
        let b = RequestRecord::new(Method::Post, "https://x/").with_json_body(json!([3, 2, 1]));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn different_methods_yield_different_fingerprints() {
        let get = RequestRecord::new(Method::Get, "https://x/");
        let post = RequestRecord::new(Method::Post, "https://x/");
        assert_ne!(fingerprint(&get), fingerprint(&post));
    }

    #[test]
    fn raw_body_fingerprints_by_content_hash() {
        let a = RequestRecord::new(Method::Post, "https://x/").with_raw_body(b"hello".to_vec());
        let b = RequestRecord::new(Method::Post, "https://x/").with_raw_body(b"hello".to_vec());
        let c = RequestRecord::new(Method::Post, "https://x/").with_raw_body(b"world".to_vec());
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        let req = RequestRecord::new(Method::Get, "https://x/?a=1");
        assert_eq!(fingerprint(&req), fingerprint(&req));
    }
}
