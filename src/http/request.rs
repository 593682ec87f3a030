//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Translate method, path and negotiation headers into a `RequestContext`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An entity type is only recorded when the request carries a body;
//!   a body without `Content-Type` is treated as `application/octet-stream`

use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::media::{ClientPreferences, MediaError, MediaType};
use crate::routing::RequestContext;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID for every request without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request headers that cannot be interpreted.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid Content-Type: {0}")]
    ContentType(#[source] MediaError),

    #[error("header {0} is not valid ASCII")]
    NonAsciiHeader(&'static str),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NonAsciiHeader(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<Option<&'a str>, RequestError> {
    headers
        .get(name)
        .map(|v| v.to_str().map_err(|_| RequestError::NonAsciiHeader(name)))
        .transpose()
}

/// Build the resolution context for a request.
pub fn request_context(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    has_entity: bool,
) -> Result<RequestContext, RequestError> {
    let preferences = ClientPreferences::from_headers(
        header_str(headers, "accept")?,
        header_str(headers, "accept-language")?,
        header_str(headers, "accept-charset")?,
    );

    let mut context = RequestContext::new(method.clone(), uri.path()).with_preferences(preferences);
    if has_entity {
        let entity_type = match header_str(headers, "content-type")? {
            Some(value) => value.parse().map_err(RequestError::ContentType)?,
            None => MediaType::octet_stream(),
        };
        context = context.with_entity_type(entity_type);
    }
    Ok(context)
}
