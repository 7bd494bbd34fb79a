//! Caller metadata: device id, User-Agent and peer address.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::connect_info::MockConnectInfo;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};

use skybook_auth::ClientMeta;

/// Header carrying the optional client device id.
pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Request metadata recorded on refresh tokens.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    /// Value of `X-Device-Id`, if present and non-blank.
    pub device_id: Option<String>,
    /// User-Agent and peer IP.
    pub meta: ClientMeta,
}

/// Raw peer address of the connection. No proxy headers are consulted.
pub fn peer_ip(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .or_else(|| {
            extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr.ip())
        })
}

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl<S: Send + Sync> FromRequestParts<S> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientContext {
            device_id: header_value(&parts.headers, DEVICE_ID_HEADER),
            meta: ClientMeta {
                user_agent: header_value(&parts.headers, header::USER_AGENT),
                ip_address: peer_ip(&parts.extensions).map(|ip| ip.to_string()),
            },
        })
    }
}
