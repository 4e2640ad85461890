//! Optional HTTP Basic credential gate.
//!
//! The gate is active only when both a username and a password are
//! configured; otherwise every request passes through untouched. That
//! permissive default is deliberate and logged at startup.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::AppState;

/// Configured username/password pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Extract the username/password pair from a Basic Authorization header.
fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let encoded = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            "Basic realm=\"Restricted Area\"".to_string(),
        )],
        "Unauthorized",
    )
        .into_response()
}

/// Middleware gating every route behind the configured credentials.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(credentials) = state.credentials.as_ref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic);

    match provided {
        Some((username, password)) if credentials.matches(&username, &password) => {
            next.run(request).await
        }
        _ => challenge(),
    }
}
