//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the request to a handler method
//! - Invoke the handler through the application's `ResourceInvoker`
//! - Turn the handler output into a response (negotiation, HEAD, OPTIONS)
//! - Map every failure to exactly one HTTP status

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::dispatch::output::{DispatchResponse, HandlerOutput};
use crate::negotiation::{negotiate_response_type, NegotiationError, SerializerRegistry, VariantNegotiator};
use crate::routing::{
    HandlerError, RequestContext, Resolution, ResolutionError, ResolvedMethod, Resolver, ResourceFactory,
};

/// Application hook that runs a resolved handler method.
pub trait ResourceInvoker: ResourceFactory {
    fn invoke(
        &self,
        resolved: &ResolvedMethod<Self::Resource>,
        request: &RequestContext,
        entity: &[u8],
    ) -> Result<HandlerOutput, HandlerError>;
}

/// Errors surfaced by [`Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error("handler method {method} failed: {source}")]
    Invocation {
        method: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Resolution(e) => e.status(),
            Self::Negotiation(_) => StatusCode::NOT_ACCEPTABLE,
            Self::Invocation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn allowed_methods(&self) -> &[Method] {
        match self {
            Self::Resolution(e) => e.allowed_methods(),
            _ => &[],
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution(e) => e.kind(),
            Self::Negotiation(_) => "negotiation",
            Self::Invocation { .. } => "invocation",
        }
    }
}

/// Resolves, invokes and represents requests.
pub struct Dispatcher<F> {
    resolver: Resolver<F>,
    serializers: Arc<dyn SerializerRegistry>,
    variants: VariantNegotiator,
}

impl<F: ResourceInvoker> Dispatcher<F> {
    pub fn new(
        resolver: Resolver<F>,
        serializers: Arc<dyn SerializerRegistry>,
        variants: VariantNegotiator,
    ) -> Self {
        Self {
            resolver,
            serializers,
            variants,
        }
    }

    pub fn resolver(&self) -> &Resolver<F> {
        &self.resolver
    }

    pub fn dispatch(&self, request: &RequestContext, entity: &[u8]) -> Result<DispatchResponse, DispatchError> {
        let resolved = match self.resolver.resolve(request) {
            Ok(Resolution::Method(resolved)) => resolved,
            Ok(Resolution::Options { allowed }) => return Ok(DispatchResponse::options(allowed)),
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(error = %e, path = %request.path, "Resource model error");
                }
                return Err(e.into());
            }
        };

        let output = self
            .resolver
            .factory()
            .invoke(&resolved, request, entity)
            .map_err(|source| DispatchError::Invocation {
                method: resolved.method.name.clone(),
                source,
            })?;

        let mut response = self.represent(output, &resolved, request)?;
        if request.method == Method::HEAD {
            response.body.clear();
        }
        Ok(response)
    }

    fn represent(
        &self,
        output: HandlerOutput,
        resolved: &ResolvedMethod<F::Resource>,
        request: &RequestContext,
    ) -> Result<DispatchResponse, DispatchError> {
        match output {
            HandlerOutput::NoContent => Ok(DispatchResponse::no_content()),
            HandlerOutput::Typed { media_type, body } => Ok(DispatchResponse::ok(media_type, body)),
            HandlerOutput::Value(entity) => {
                let media_type = negotiate_response_type(
                    &resolved.method.produces,
                    &entity.type_name,
                    &request.preferences.media_types,
                    self.serializers.as_ref(),
                )?;
                Ok(DispatchResponse::ok(media_type, entity.body))
            }
            HandlerOutput::Variants(variants) => {
                let Some(best) = self.variants.best(&variants, &request.preferences) else {
                    return Err(NegotiationError::NoAcceptableVariant(variants.len()).into());
                };
                let mut response = DispatchResponse::new(StatusCode::OK);
                response.media_type = best.media_type.clone();
                response.language = best.languages.first().cloned();
                response.character_set = best.character_set.clone();
                response.body = best.body.clone();
                Ok(response)
            }
        }
    }
}
