use axum::extract::{Query, State};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

// Some image hosts refuse requests without a browser-looking UA.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// GET /api/proxy-image?url= - fetch an external image server-side and hand
/// it back as a base64 data URL, bypassing browser CORS. Stateless
/// passthrough; no store involvement.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> ApiResult<Value> {
    let raw = query
        .url
        .ok_or_else(|| ApiError::bad_request("URL parameter is required"))?;

    let parsed = Url::parse(&raw).map_err(|_| ApiError::bad_request("Invalid URL format"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::bad_request("URL must use http or https protocol"));
    }

    let mut response = state
        .http
        .get(parsed)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "image/*,*/*;q=0.8")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ApiError::gateway_timeout("Remote server took too long to respond")
            } else {
                ApiError::bad_gateway(format!("Failed to reach remote server: {}", e))
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::bad_gateway(format!(
            "Remote server responded with {}",
            status
        )));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/png")
        .to_string();

    // Enforce the size cap before and while downloading, never after.
    let max_body_bytes = config::config().proxy.max_body_bytes;
    if let Some(length) = response.content_length() {
        if length > max_body_bytes as u64 {
            return Err(ApiError::bad_gateway("Remote image exceeds size limit"));
        }
    }

    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Failed to read remote body: {}", e)))?
    {
        if bytes.len() + chunk.len() > max_body_bytes {
            return Err(ApiError::bad_gateway("Remote image exceeds size limit"));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Err(ApiError::bad_gateway("Empty response from remote server"));
    }

    let encoded = BASE64.encode(&bytes);
    Ok(ApiResponse::success(json!({
        "dataUrl": format!("data:{};base64,{}", content_type, encoded),
        "contentType": content_type,
    })))
}
