//! Response translation.
//!
//! # Responsibilities
//! - Turn a `DispatchResponse` into an HTTP response with representation headers
//! - Map dispatch and request errors to status codes, with `Allow` where needed
//!
//! # Design Decisions
//! - Server-side failures answer with a generic body; details go to the log

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch::{DispatchError, DispatchResponse};
use crate::http::request::RequestError;

fn allow_header(methods: &[Method]) -> Option<HeaderValue> {
    if methods.is_empty() {
        return None;
    }
    let joined = methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    HeaderValue::from_str(&joined).ok()
}

fn content_type(response: &DispatchResponse) -> Option<HeaderValue> {
    let media_type = response.media_type.as_ref()?;
    let value = match &response.character_set {
        Some(charset) if media_type.parameter("charset").is_none() => {
            format!("{media_type};charset={}", charset.name())
        }
        _ => media_type.to_string(),
    };
    HeaderValue::from_str(&value).ok()
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        let content_type = content_type(&self);
        let content_language = self
            .language
            .as_ref()
            .and_then(|l| HeaderValue::from_str(&l.to_string()).ok());
        let allow = allow_header(&self.allow);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        if let Some(value) = content_type {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Some(value) = content_language {
            headers.insert(header::CONTENT_LANGUAGE, value);
        }
        if let Some(value) = allow {
            headers.insert(header::ALLOW, value);
        }
        response
    }
}

fn error_response(status: StatusCode, message: String, allow: &[Method]) -> Response {
    let body = if status.is_server_error() {
        status.canonical_reason().unwrap_or("Internal Server Error").to_string()
    } else {
        message
    };
    let mut response = (status, body).into_response();
    if let Some(value) = allow_header(allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string(), self.allowed_methods())
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string(), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ResolutionError;

    #[test]
    fn test_representation_headers() {
        let mut dispatched = DispatchResponse::ok("text/plain".parse().unwrap(), b"hi".to_vec());
        dispatched.character_set = Some("utf-8".parse().unwrap());
        dispatched.language = Some("en-us".parse().unwrap());

        let response = dispatched.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain;charset=utf-8");
        assert_eq!(response.headers()[header::CONTENT_LANGUAGE], "en-us");
    }

    #[test]
    fn test_options_response_lists_allow() {
        let response = DispatchResponse::options(vec![Method::GET, Method::POST]).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[test]
    fn test_method_not_allowed_carries_allow() {
        let error = DispatchError::from(ResolutionError::MethodNotAllowed {
            method: Method::DELETE,
            allowed: vec![Method::GET],
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }
}
