//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use domains::ClientKey;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Hashed identity of the caller, derived from `X-Forwarded-For`.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub ClientKey);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIdentity(client_key_from_headers(&parts.headers)))
    }
}

/// Non-UTF-8 header values count as absent.
pub fn client_key_from_headers(headers: &HeaderMap) -> ClientKey {
    let forwarded = headers.get(FORWARDED_FOR).and_then(|value| value.to_str().ok());
    services::client_key(forwarded)
}
