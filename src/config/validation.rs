//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse, qualities in [0, 1])
//! - Build the resource model once to surface template, verb and media type
//!   errors before the config is accepted
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::negotiation::FallbackQualities;
use crate::resources::{build_dispatcher, CatalogError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("negotiation.fallback.{field} must be within [0, 1]")]
    QualityOutOfRange { field: &'static str },

    #[error(transparent)]
    Resource(#[from] CatalogError),
}

/// Check a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    check_qualities(&mut errors, &config.negotiation.fallback);

    if let Err(resource_errors) = build_dispatcher(config) {
        errors.extend(resource_errors.into_iter().map(ValidationError::from));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_qualities(errors: &mut Vec<ValidationError>, fallback: &FallbackQualities) {
    let fields = [
        ("primary_tag_base", fallback.primary_tag_base),
        ("primary_tag_step", fallback.primary_tag_step),
        ("default_language", fallback.default_language),
        ("default_primary_tag", fallback.default_primary_tag),
        ("catch_all", fallback.catch_all),
    ];
    for (field, quality) in fields {
        if !(0.0..=1.0).contains(&quality) {
            errors.push(ValidationError::QualityOutOfRange { field });
        }
    }
}
