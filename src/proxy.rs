// src/proxy.rs

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};

use crate::config::Config;
use crate::error::ApiError;

/* ============================================================
   Same-origin API proxy

   The panel talks to /api/... on its own origin; this forwards
   to the configured upstream with the bearer token attached
   server-side, so the credential never reaches a client. With
   no upstream URL or token configured the proxy refuses the
   request outright rather than forwarding unauthenticated.
   ============================================================ */

/// Request bodies are JSON form payloads; anything bigger is rejected
/// before buffering.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    upstream_url: String,
    token: String,
}

impl ProxyState {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            upstream_url: config.upstream_url.clone(),
            token: config.api_token.clone(),
        }
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/{*path}", any(forward))
        .with_state(state)
}

fn ensure_configured(state: &ProxyState) -> Result<(), ApiError> {
    if state.upstream_url.trim().is_empty() || state.token.trim().is_empty() {
        return Err(ApiError::upstream_not_configured());
    }
    Ok(())
}

/// Rebuild the upstream URL from the incoming request path, keeping the
/// query string intact.
fn upstream_url(base: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), path);
    if let Some(query) = query
        && !query.is_empty()
    {
        url.push('?');
        url.push_str(query);
    }
    url
}

fn forwarded_headers(incoming: &HeaderMap) -> Vec<(header::HeaderName, header::HeaderValue)> {
    [header::CONTENT_TYPE, header::ACCEPT]
        .into_iter()
        .filter_map(|name| incoming.get(&name).map(|value| (name, value.clone())))
        .collect()
}

async fn read_body(body: Body) -> Result<axum::body::Bytes, ApiError> {
    axum::body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| {
        ApiError::BadRequest(
            "BODY_TOO_LARGE",
            format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        )
    })
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Result<Response, ApiError> {
    ensure_configured(&state)?;

    let (parts, body) = request.into_parts();
    let url = upstream_url(&state.upstream_url, parts.uri.path(), parts.uri.query());

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|_| ApiError::BadRequest("BAD_METHOD", parts.method.to_string()))?;

    let body = read_body(body).await?;

    let mut builder = state.http.request(method, url).bearer_auth(&state.token);
    for (name, value) in forwarded_headers(&parts.headers) {
        builder = builder.header(name, value);
    }
    if !body.is_empty() {
        builder = builder.body(body);
    }

    let upstream = builder
        .send()
        .await
        .map_err(|err| ApiError::upstream_unreachable(err.to_string()))?;

    // Relay status, content type and body as-is; the upstream's error
    // shapes pass through untouched.
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = upstream
        .bytes()
        .await
        .map_err(|err| ApiError::upstream_unreachable(err.to_string()))?;

    let mut response = (status, Body::from(bytes)).into_response();
    if let Some(content_type) = content_type
        && let Ok(value) = header::HeaderValue::from_str(&content_type)
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(url: &str, token: &str) -> ProxyState {
        ProxyState {
            http: reqwest::Client::new(),
            upstream_url: url.to_string(),
            token: token.to_string(),
        }
    }

    #[test]
    fn refuses_when_upstream_or_token_missing() {
        assert!(ensure_configured(&state("", "secret")).is_err());
        assert!(ensure_configured(&state("https://api.example.com", "")).is_err());
        assert!(ensure_configured(&state("https://api.example.com", "  ")).is_err());
        assert!(ensure_configured(&state("https://api.example.com", "secret")).is_ok());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_forwarding() {
        let body = Body::from(vec![0u8; MAX_BODY_BYTES + 1]);
        assert!(matches!(
            read_body(body).await,
            Err(ApiError::BadRequest("BODY_TOO_LARGE", _))
        ));

        let small = Body::from("{}");
        assert_eq!(read_body(small).await.unwrap().as_ref(), b"{}");
    }

    #[test]
    fn rebuilds_upstream_url_with_query() {
        assert_eq!(
            upstream_url(
                "https://api.example.com/",
                "/api/scheduler/appointments",
                Some("page=2&status=new"),
            ),
            "https://api.example.com/api/scheduler/appointments?page=2&status=new"
        );
        assert_eq!(
            upstream_url("https://api.example.com", "/api/areas", None),
            "https://api.example.com/api/areas"
        );
        assert_eq!(
            upstream_url("https://api.example.com", "/api/areas", Some("")),
            "https://api.example.com/api/areas"
        );
    }
}
