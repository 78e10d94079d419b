//! Custom Axum extractors.
//!
//! This module contains the extractor for the one piece of request context
//! the domain cares about:
//! - `ClientIp`: the identifier the participation rate limiter keys on
//!
//! # Examples
//!
//! ```ignore
//! use rifa_web::extractors::ClientIp;
//!
//! async fn handler(client_ip: ClientIp) -> String {
//!     format!("Client: {}", client_ip.0)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Shared limiter bucket for clients that present no identifying header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client identifier for rate limiting.
///
/// Extracts the client identity from proxy headers.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first entry in the list, trimmed)
/// 2. `X-Real-IP`
/// 3. The literal [`UNKNOWN_CLIENT`]
///
/// There is deliberately no socket-address fallback: header-less clients
/// all land in one shared bucket instead of each minting a fresh rate
/// budget. The identifier stays a string, so a proxy that forwards
/// something that is not an IP address still gets limited under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_client_ip(&parts.headers)))
    }
}

/// Extract the client identifier from proxy headers.
fn extract_client_ip(headers: &HeaderMap) -> String {
    // Try X-Forwarded-For (take first entry)
    if let Some(forwarded) = headers.get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first) = forwarded_str.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    // Try X-Real-IP
    if let Some(real_ip) = headers.get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            let ip_str = ip_str.trim();
            if !ip_str.is_empty() {
                return ip_str.to_string();
            }
        }
    }

    UNKNOWN_CLIENT.to_string()
}
