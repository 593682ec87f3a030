//! Route descriptors.
//!
//! # Responsibilities
//! - Describe handler methods (verb, consumed and produced media types)
//! - Describe sub-resource locators
//! - Group them into resource types and bind resource types to root templates

use std::sync::Arc;

use axum::http::Method;

use crate::media::MediaType;
use crate::template::PathTemplate;

/// A handler method on a resource type.
#[derive(Debug, Clone)]
pub struct MethodRoute {
    pub name: String,
    pub http_method: Method,
    /// Empty means any entity type.
    pub consumes: Vec<MediaType>,
    /// Empty means whatever the result type can be serialised as.
    pub produces: Vec<MediaType>,
}

impl MethodRoute {
    pub fn new(name: impl Into<String>, http_method: Method) -> Self {
        Self {
            name: name.into(),
            http_method,
            consumes: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn consumes(mut self, media_types: impl IntoIterator<Item = MediaType>) -> Self {
        self.consumes.extend(media_types);
        self
    }

    pub fn produces(mut self, media_types: impl IntoIterator<Item = MediaType>) -> Self {
        self.produces.extend(media_types);
        self
    }

    /// HEAD is served by GET methods.
    pub fn supports_verb(&self, verb: &Method) -> bool {
        self.http_method == verb || (verb == Method::HEAD && self.http_method == Method::GET)
    }

    pub fn accepts_entity(&self, given: &MediaType) -> bool {
        self.consumes.is_empty() || self.consumes.iter().any(|c| c.is_compatible(given))
    }

    pub fn produces_any_of(&self, accepted: &[MediaType]) -> bool {
        self.produces.is_empty()
            || self.produces.iter().any(|p| accepted.iter().any(|a| p.is_compatible(a)))
    }
}

/// A sub-resource locator: consumes part of the path and yields another
/// resource object that continues matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRoute {
    pub name: String,
}

impl LocatorRoute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone)]
pub enum RouteKind {
    Method(MethodRoute),
    Locator(LocatorRoute),
}

/// A method or locator bound to a template relative to its resource.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub template: PathTemplate,
    pub kind: RouteKind,
}

impl RouteDescriptor {
    pub fn method(template: PathTemplate, method: MethodRoute) -> Self {
        Self {
            template,
            kind: RouteKind::Method(method),
        }
    }

    pub fn locator(template: PathTemplate, locator: LocatorRoute) -> Self {
        Self {
            template,
            kind: RouteKind::Locator(locator),
        }
    }

    pub fn as_method(&self) -> Option<&MethodRoute> {
        match &self.kind {
            RouteKind::Method(m) => Some(m),
            RouteKind::Locator(_) => None,
        }
    }

    pub fn is_locator(&self) -> bool {
        matches!(self.kind, RouteKind::Locator(_))
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            RouteKind::Method(m) => &m.name,
            RouteKind::Locator(l) => &l.name,
        }
    }
}

/// The routes exposed by one kind of resource object.
#[derive(Debug, Clone)]
pub struct ResourceType {
    name: String,
    routes: Vec<RouteDescriptor>,
}

impl ResourceType {
    pub fn new(name: impl Into<String>, routes: Vec<RouteDescriptor>) -> Self {
        Self {
            name: name.into(),
            routes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// True when some route can consume path below the resource itself.
    pub fn has_nested_routes(&self) -> bool {
        self.routes
            .iter()
            .any(|r| r.is_locator() || !r.template.is_empty_or_slash())
    }
}

/// A resource type reachable directly under the service root.
#[derive(Debug, Clone)]
pub struct RootRoute {
    pub template: PathTemplate,
    pub resource_type: Arc<ResourceType>,
}

impl RootRoute {
    pub fn new(template: PathTemplate, resource_type: Arc<ResourceType>) -> Self {
        Self {
            template,
            resource_type,
        }
    }
}
