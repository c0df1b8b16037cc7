//! Client metadata captured for audit entries.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use projman_core::audit::RequestContext;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_SESSION_ID: &str = "x-session-id";
const X_REQUEST_ID: &str = "x-request-id";

/// [`RequestContext`] built from the incoming request.
///
/// - client ip: first hop of `x-forwarded-for`, else the socket peer
/// - session id: `x-session-id`, else the request id
///
/// Never rejects; absent values stay `None`.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(RequestMeta(context_from_headers(&parts.headers, peer)))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn context_from_headers(headers: &HeaderMap, peer: Option<String>) -> RequestContext {
    let forwarded = header(headers, X_FORWARDED_FOR).and_then(|v| {
        v.split(',')
            .map(str::trim)
            .find(|hop| !hop.is_empty())
            .map(str::to_string)
    });

    RequestContext {
        client_ip: forwarded.or(peer),
        user_agent: header(headers, "user-agent"),
        origin: header(headers, "origin"),
        session_id: header(headers, X_SESSION_ID).or_else(|| header(headers, X_REQUEST_ID)),
    }
}
