//! Access logging for HTML page loads.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Client address: `X-Forwarded-For` when present and non-blank, otherwise
/// the socket peer, otherwise `unknown`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Runs the request, then logs one line for every `*.html` path.
pub async fn log_html_access(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !path.ends_with(".html") {
        return next.run(req).await;
    }
    let method = req.method().clone();
    let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0);
    let ip = client_ip(req.headers(), peer);

    let res = next.run(req).await;
    info!(event = "html_access", %ip, %method, %path, status = res.status().as_u16(), "HTML access");
    res
}
