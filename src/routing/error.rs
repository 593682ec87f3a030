//! Routing error types.

use std::error::Error as StdError;

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::media::MediaType;
use crate::template::TemplateError;

/// Failure raised by application code while creating or invoking a resource.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised while registering root routes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a root route with template {template} is already registered")]
    DuplicateRoute { template: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Why a request could not be resolved to a handler method.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no root resource matches {path}")]
    RootNotFound { path: String },

    #[error("no sub-resource of {resource} matches {path}")]
    PathNotFound { resource: String, path: String },

    #[error("{resource} has no handler method for {path}")]
    MethodPathNotFound { resource: String, path: String },

    #[error("method {method} not allowed, allowed: {}", join_methods(.allowed))]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    #[error("no handler method consumes {given}")]
    UnsupportedMediaType { given: MediaType },

    #[error("no handler method produces a type acceptable to the client")]
    NotAcceptable,

    #[error("failed to create resource: {0}")]
    HandlerCreation(#[from] HandlerError),

    #[error("locator {locator} on {resource} consumed nothing of {path}")]
    LocatorConsumedNothing {
        resource: String,
        locator: String,
        path: String,
    },
}

impl ResolutionError {
    /// HTTP status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RootNotFound { .. } | Self::PathNotFound { .. } | Self::MethodPathNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::HandlerCreation(_) | Self::LocatorConsumedNothing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for errors caused by a broken resource model rather than by the
    /// request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LocatorConsumedNothing { .. })
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RootNotFound { .. } => "root_not_found",
            Self::PathNotFound { .. } => "path_not_found",
            Self::MethodPathNotFound { .. } => "method_path_not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::NotAcceptable => "not_acceptable",
            Self::HandlerCreation(_) => "handler_creation",
            Self::LocatorConsumedNothing { .. } => "locator_consumed_nothing",
        }
    }

    /// Verbs to advertise in an `Allow` header.
    pub fn allowed_methods(&self) -> &[Method] {
        match self {
            Self::MethodNotAllowed { allowed, .. } => allowed,
            _ => &[],
        }
    }
}

pub(crate) fn join_methods(methods: &[Method]) -> String {
    methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ")
}

/// Result type for resolution.
pub type ResolutionResult<T> = Result<T, ResolutionError>;
