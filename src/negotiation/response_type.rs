//! Response media type selection.
//!
//! # Responsibilities
//! - Determine which media types a handler result can be written as
//! - Intersect them with the client's accepted types, client order first
//! - Resolve ranges to a concrete type, falling back to octet-stream

use std::collections::HashMap;

use crate::media::{sort_by_concreteness, MediaType, PreferenceList};
use crate::negotiation::{NegotiationError, NegotiationResult};

/// Source of the media types a result type can be serialised as.
pub trait SerializerRegistry: Send + Sync {
    /// Media types writable for values of `type_name`, in no particular order.
    fn producible_media_types(&self, type_name: &str) -> Vec<MediaType>;
}

/// A fixed type-name → media types table.
#[derive(Debug, Clone, Default)]
pub struct StaticSerializers {
    table: HashMap<String, Vec<MediaType>>,
}

impl StaticSerializers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, media_types: Vec<MediaType>) {
        self.table.entry(type_name.into()).or_default().extend(media_types);
    }
}

impl SerializerRegistry for StaticSerializers {
    fn producible_media_types(&self, type_name: &str) -> Vec<MediaType> {
        self.table.get(type_name).cloned().unwrap_or_default()
    }
}

/// Choose the media type for a handler result.
///
/// `produces` is what the handler method declares; when empty, the
/// serializers for `type_name` decide. A handler that can produce nothing
/// known writes `application/octet-stream`.
pub fn negotiate_response_type(
    produces: &[MediaType],
    type_name: &str,
    preferences: &PreferenceList<MediaType>,
    serializers: &dyn SerializerRegistry,
) -> NegotiationResult<MediaType> {
    let mut producible = if produces.is_empty() {
        serializers.producible_media_types(type_name)
    } else {
        produces.to_vec()
    };
    if producible.is_empty() {
        return Ok(MediaType::octet_stream());
    }
    sort_by_concreteness(&mut producible);

    let any = MediaType::all();
    let mut accepted: Vec<&MediaType> = preferences.acceptable().map(|p| &p.value).collect();
    if accepted.is_empty() && preferences.is_empty() {
        accepted.push(&any);
    }

    let mut candidates: Vec<&MediaType> = Vec::new();
    for &wanted in &accepted {
        for offered in &producible {
            if offered.is_compatible(wanted) {
                candidates.push(MediaType::most_specific(offered, wanted));
            }
        }
    }

    if let Some(concrete) = candidates.iter().find(|t| t.is_concrete()) {
        return Ok((*concrete).clone());
    }
    let falls_back = candidates
        .iter()
        .any(|t| t.main_type() == "*" || (t.main_type() == "application" && t.sub_type() == "*"));
    if falls_back {
        return Ok(MediaType::octet_stream());
    }

    Err(NegotiationError::NotAcceptable {
        offered: join(producible.iter()),
        accepted: join(accepted.into_iter()),
    })
}

fn join<'a>(types: impl Iterator<Item = &'a MediaType>) -> String {
    types.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
