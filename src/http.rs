//! Thin `reqwest` wrapper that turns a [`RequestRecord`] into a
//! [`ResponseRecord`], never propagating transport failures as `Err`
//! (§4.5, §7 "failures are data").
//!
//! Build a `RequestBuilder`, send it, read the status/headers/body, and
//! fold any reqwest error into a domain value rather than returning it.
//! There is no retry loop and no response-shape parsing — §6 rules out
//! retry/backoff, and the body is handed back as opaque bytes for the
//! caller to interpret.

use reqwest::Client;

use crate::request::{Body, RequestRecord};
use crate::response::{OrderedPairs, ResponseRecord};

/// Send `request` over `client`, folding transport failures into a
/// synthetic [`ResponseRecord`] instead of returning `Err` (§4.5 step 4).
///
/// `log_errors` is the driver's resolved [`crate::config::DriverConfig::log_errors`]
/// toggle, passed in rather than re-read from the environment here so a
/// single `DriverConfig` governs every worker's logging behavior
/// consistently (§6).
pub async fn send(
    client: &Client,
    request: &RequestRecord,
    default_timeout: std::time::Duration,
    log_errors: bool,
) -> ResponseRecord {
    match try_send(client, request, default_timeout).await {
        Ok(response) => response,
        Err(reason) => {
            if log_errors {
                tracing::error!(url = %request.url, method = request.method.as_str(), %reason, "request failed");
            }
            ResponseRecord::transport_failure(reason)
        }
    }
}

async fn try_send(
    client: &Client,
    request: &RequestRecord,
    default_timeout: std::time::Duration,
) -> Result<ResponseRecord, String> {
    let mut builder = client
        .request(request.method.into(), &request.url)
        .timeout(request.timeout(default_timeout));

    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if !request.params.is_empty() {
        builder = builder.query(&request.params);
    }

    builder = match &request.body {
        Body::None => builder,
        Body::Raw(bytes) => builder.body(bytes.clone()),
        Body::Json(value) => builder.json(value),
    };

    let response = builder.send().await.map_err(|e| e.to_string())?;

    let status = response.status();
    let final_url = response.url().to_string();
    let headers: OrderedPairs = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let encoding = declared_encoding(&headers);
    let content = response.bytes().await.map_err(|e| e.to_string())?.to_vec();

    Ok(ResponseRecord {
        ok: status.is_success(),
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string(),
        url: final_url,
        headers,
        content,
        encoding,
    })
}

/// Pull the `charset` parameter out of a `Content-Type` header, if any
/// (§4.5 step 3: "declared or detected").
fn declared_encoding(headers: &OrderedPairs) -> Option<String> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .and_then(|(_, value)| {
            value
                .split(';')
                .skip(1)
                .find_map(|param| param.trim().strip_prefix("charset="))
                .map(|charset| charset.trim_matches('"').to_string())
        })
}
