//! `_method` override for HTML forms.
//!
//! Browsers only submit forms as GET or POST. A POST carrying
//! `?_method=PUT`, `PATCH` or `DELETE` in its query string is rewritten to
//! that method. This runs before routing, so it wraps the [`Router`] as a
//! service instead of being added with `Router::layer`.
//!
//! [`Router`]: axum::Router

use axum::extract::Request;
use axum::http::Method;

/// Query parameter carrying the intended method.
pub const METHOD_PARAM: &str = "_method";

/// Rewrite the method of an overridden POST request.
pub fn method_override(mut req: Request) -> Request {
    if req.method() == Method::POST {
        if let Some(method) = override_from_query(req.uri().query()) {
            tracing::trace!(%method, uri = %req.uri(), "Method override");
            *req.method_mut() = method;
        }
    }
    req
}

/// The override method named in a query string, if any.
fn override_from_query(query: Option<&str>) -> Option<Method> {
    let value = query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == METHOD_PARAM).then_some(value)
    })?;
    let value = urlencoding::decode(value).ok()?;

    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}
