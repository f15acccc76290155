//! Cookie-based session identity.
//!
//! The session id is an opaque grouping key for a browser's attempts, not
//! an authenticated account. It arrives on the `klack_session` cookie and
//! is minted as a UUID when a scoring request shows up without one.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "klack_session";

/// The session id carried by the request, if any. Extraction never fails;
/// handlers decide what an absent session means for their endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionId(pub Option<String>);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| cookie_value(header, SESSION_COOKIE));
        Ok(SessionId(id))
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// `Set-Cookie` value issuing a session id to the client.
pub fn set_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
