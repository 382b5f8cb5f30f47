//! HTTP client construction, auth headers and response decoding.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::error::{OneKeyError, Result};
use crate::models::ProviderId;

/// Fixed client identifier sent as `User-Agent` on every request.
pub const CLIENT_ID: &str = concat!("onekey/", env!("CARGO_PKG_VERSION"));

/// Timeout for hosted chat vendors.
pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Timeout for inference-heavy vendors (HuggingFace, local Ollama).
pub const EXTENDED_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Build the client an adapter keeps for its whole lifetime.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(CLIENT_ID)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(OneKeyError::from)
}

pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// A credential that cannot travel in a header is a local configuration
/// problem, never something to send without.
fn credential_header(value: &str, name: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        OneKeyError::Configuration(format!(
            "{name} contains characters that are not allowed in an HTTP header"
        ))
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    headers.insert(
        AUTHORIZATION,
        credential_header(&format!("Bearer {api_key}"), "API key")?,
    );
    Ok(headers)
}

/// Build Anthropic-style headers (x-api-key).
pub fn anthropic_headers(api_key: &str, version: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    headers.insert("x-api-key", credential_header(api_key, "API key")?);
    headers.insert("anthropic-version", credential_header(version, "API version")?);
    Ok(headers)
}

/// Build Azure-style headers (api-key).
pub fn api_key_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    headers.insert("api-key", credential_header(api_key, "API key")?);
    Ok(headers)
}

/// Send a prepared request and return the body of a successful response.
///
/// Any status outside 2xx becomes a protocol error carrying the raw body.
pub async fn send(request: reqwest::RequestBuilder) -> Result<String> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body_text = resp.text().await.unwrap_or_default();
        return Err(OneKeyError::protocol(status.as_u16(), body_text));
    }
    Ok(resp.text().await?)
}

/// Decode a vendor envelope.
///
/// Blank bodies, `null`, `{}` and `[]` are empty responses; anything that is
/// not valid JSON for `T` is a transport failure.
pub fn decode_envelope<T: DeserializeOwned>(provider: ProviderId, body: &str) -> Result<T> {
    let empty = || OneKeyError::EmptyResponse {
        provider: provider.display_name().to_string(),
    };
    if body.trim().is_empty() {
        return Err(empty());
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    let is_empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(empty());
    }
    Ok(serde_json::from_value(value)?)
}
