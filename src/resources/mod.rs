//! Declared resources.
//!
//! # Data Flow
//! ```text
//! RouterConfig.resources / .serializers
//!     → catalog.rs (compile templates, parse verbs and media types,
//!                   check locator targets, collect every error)
//!     → ResourceCatalog (ResourceFactory + ResourceInvoker)
//!     → build_dispatcher → RouteRegistry + Dispatcher
//! ```
//!
//! # Design Decisions
//! - Resources are stateless; an instance only records its type name
//! - Responses are canned bodies with `{param}` and `{entity}` placeholders
//! - Building reports all problems at once so a bad config is fixed in one pass

pub mod catalog;

use std::sync::Arc;

use thiserror::Error;

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::media::{Language, MediaError};
use crate::negotiation::VariantNegotiator;
use crate::routing::{RegistryError, Resolver, RouteRegistry};
use crate::template::{TemplateError, TemplateOptions};

pub use catalog::{DeclaredResource, ResourceCatalog};

/// Problems found while building resources from configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate resource name '{0}'")]
    DuplicateResource(String),

    #[error("resource '{resource}' declares '{member}' twice")]
    DuplicateMember { resource: String, member: String },

    #[error("resource '{resource}', route '{route}': {source}")]
    Template {
        resource: String,
        route: String,
        source: TemplateError,
    },

    #[error("resource '{resource}', route '{route}': {source}")]
    MediaType {
        resource: String,
        route: String,
        source: MediaError,
    },

    #[error("resource '{resource}', method '{method}': invalid verb '{verb}'")]
    InvalidVerb {
        resource: String,
        method: String,
        verb: String,
    },

    #[error("resource '{resource}', locator '{locator}': unknown target resource '{target}'")]
    UnknownTarget {
        resource: String,
        locator: String,
        target: String,
    },

    #[error("serializer '{type_name}': {source}")]
    Serializer { type_name: String, source: MediaError },

    #[error("default language: {0}")]
    DefaultLanguage(MediaError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Template options selected by configuration.
pub fn template_options(config: &RouterConfig) -> TemplateOptions {
    TemplateOptions {
        encode: config.templates.encode,
    }
}

/// Variant negotiator configured with the default language and fallbacks.
pub fn variant_negotiator(config: &RouterConfig) -> Result<VariantNegotiator, CatalogError> {
    let default_language = config
        .negotiation
        .default_language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()
        .map_err(CatalogError::DefaultLanguage)?;
    Ok(VariantNegotiator::new(default_language, config.negotiation.fallback))
}

/// Build the complete dispatcher for a configuration.
pub fn build_dispatcher(config: &RouterConfig) -> Result<Dispatcher<ResourceCatalog>, Vec<CatalogError>> {
    let catalog = ResourceCatalog::from_config(config)?;
    let negotiator = variant_negotiator(config).map_err(|e| vec![e])?;
    let registry = RouteRegistry::with_roots(catalog.roots().to_vec(), template_options(config))
        .map_err(|e| vec![e.into()])?;

    tracing::info!(
        roots = registry.len(),
        resource_types = catalog.resource_count(),
        "Resource model built"
    );

    let serializers = Arc::new(catalog.serializers().clone());
    let resolver = Resolver::new(Arc::new(registry), Arc::new(catalog));
    Ok(Dispatcher::new(resolver, serializers, negotiator))
}
