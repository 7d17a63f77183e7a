/// Request middleware
pub mod auth;
pub mod session_guard;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use session_guard::session_guard_middleware;

use axum::http::{header, HeaderMap};

/// Read a cookie value by name from every `Cookie` header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
