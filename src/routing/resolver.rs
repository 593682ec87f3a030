//! Three-phase request resolution.
//!
//! # Responsibilities
//! - Phase 1: pick the root resource for the request path
//! - Phase 2: walk sub-resource locators until the path is consumed or a
//!   handler method path matches
//! - Phase 3: filter handler methods by verb, entity type and accepted types,
//!   then pick the most specific one
//!
//! # Design Decisions
//! - Resolution state (remaining path, parameters, matched paths) lives on
//!   the stack of one `resolve` call; nothing is shared between requests
//! - A locator must consume part of the path, otherwise resolution would
//!   never terminate; a locator that consumes nothing is a model error
//! - OPTIONS without an explicit handler answers with the allowed verbs

use std::cmp::{Ordering, Reverse};
use std::sync::Arc;

use axum::http::Method;

use crate::media::{ClientPreferences, MediaType};
use crate::routing::descriptor::{LocatorRoute, MethodRoute, ResourceType, RootRoute, RouteDescriptor, RouteKind};
use crate::routing::error::{HandlerError, ResolutionError, ResolutionResult};
use crate::routing::registry::{select_most_specific, RouteRegistry};
use crate::template::{MatchResult, PathTemplate, RemainingPath};

/// The parts of a request that resolution looks at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Path relative to the service root, still percent-encoded.
    pub path: String,
    /// Media type of the request entity, when there is one.
    pub entity_type: Option<MediaType>,
    pub preferences: ClientPreferences,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            entity_type: None,
            preferences: ClientPreferences::default(),
        }
    }

    pub fn with_entity_type(mut self, entity_type: MediaType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_preferences(mut self, preferences: ClientPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Path variables captured during resolution, in capture order.
///
/// A name captured more than once keeps every value; [`get`](Self::get)
/// returns the latest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParameters(Vec<(String, String)>);

impl PathParameters {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn extend(&mut self, captured: impl IntoIterator<Item = (String, String)>) {
        self.0.extend(captured);
    }
}

impl FromIterator<(String, String)> for PathParameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A resource instance together with the routes it exposes.
#[derive(Debug, Clone)]
pub struct ResourceObject<R> {
    pub resource_type: Arc<ResourceType>,
    pub instance: R,
}

impl<R> ResourceObject<R> {
    pub fn new(resource_type: Arc<ResourceType>, instance: R) -> Self {
        Self {
            resource_type,
            instance,
        }
    }
}

/// Application hook that instantiates resources during resolution.
pub trait ResourceFactory: Send + Sync {
    type Resource: Send;

    /// Create the instance for a matched root route.
    fn create_root(
        &self,
        root: &RootRoute,
        parameters: &PathParameters,
        request: &RequestContext,
    ) -> Result<Self::Resource, HandlerError>;

    /// Invoke a locator on `parent` and return the sub-resource it yields.
    fn invoke_locator(
        &self,
        parent: &ResourceObject<Self::Resource>,
        locator: &LocatorRoute,
        parameters: &PathParameters,
        request: &RequestContext,
    ) -> Result<ResourceObject<Self::Resource>, HandlerError>;
}

/// The handler method chosen for a request.
#[derive(Debug)]
pub struct ResolvedMethod<R> {
    pub resource: ResourceObject<R>,
    pub method: MethodRoute,
    pub template: PathTemplate,
    pub parameters: PathParameters,
    /// Path portions consumed by each matched template, outermost first.
    pub matched_paths: Vec<String>,
}

#[derive(Debug)]
pub enum Resolution<R> {
    Method(ResolvedMethod<R>),
    /// OPTIONS on a path with no explicit OPTIONS handler.
    Options { allowed: Vec<Method> },
}

/// Resolves requests against a registry, creating resources through `F`.
pub struct Resolver<F> {
    registry: Arc<RouteRegistry>,
    factory: Arc<F>,
}

impl<F> Clone for Resolver<F> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            factory: Arc::clone(&self.factory),
        }
    }
}

#[derive(Default)]
struct Trail {
    parameters: PathParameters,
    matched: Vec<String>,
}

impl Trail {
    fn record(&mut self, matched: MatchResult) {
        if matched.matched() != "/" {
            self.matched.push(matched.matched().to_string());
        }
        self.parameters.extend(matched.into_variables());
    }
}

impl<F: ResourceFactory> Resolver<F> {
    pub fn new(registry: Arc<RouteRegistry>, factory: Arc<F>) -> Self {
        Self { registry, factory }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn factory(&self) -> &Arc<F> {
        &self.factory
    }

    /// Resolve a request to a handler method.
    pub fn resolve(&self, request: &RequestContext) -> ResolutionResult<Resolution<F::Resource>> {
        let mut trail = Trail::default();
        let path = RemainingPath::new(&request.path);

        let (root, remaining) = self.identify_root(&path, &mut trail)?;
        let instance = self.factory.create_root(&root, &trail.parameters, request)?;
        let resource = ResourceObject::new(Arc::clone(&root.resource_type), instance);

        let (resource, remaining) = self.obtain_resource(resource, remaining, &mut trail, request)?;
        self.identify_method(resource, remaining, trail, request)
    }

    fn identify_root(
        &self,
        path: &RemainingPath,
        trail: &mut Trail,
    ) -> ResolutionResult<(Arc<RootRoute>, RemainingPath)> {
        let snapshot = self.registry.snapshot();
        let eligible = snapshot.roots().iter().filter_map(|root| {
            let matched = root.template.match_path(path)?;
            let usable = matched.remaining().is_empty_or_slash() || root.resource_type.has_nested_routes();
            usable.then_some((root, matched))
        });

        let Some((root, matched)) = select_most_specific(eligible, |(root, _)| &root.template) else {
            return Err(ResolutionError::RootNotFound {
                path: path.to_string(),
            });
        };

        tracing::trace!(template = %root.template, resource = root.resource_type.name(), "Root resource identified");
        let remaining = matched.remaining().clone();
        trail.record(matched);
        Ok((Arc::clone(root), remaining))
    }

    fn obtain_resource(
        &self,
        mut resource: ResourceObject<F::Resource>,
        mut remaining: RemainingPath,
        trail: &mut Trail,
        request: &RequestContext,
    ) -> ResolutionResult<(ResourceObject<F::Resource>, RemainingPath)> {
        while !remaining.is_empty_or_slash() {
            let resource_type = Arc::clone(&resource.resource_type);
            let candidates = resource_type.routes().iter().filter_map(|route| {
                let matched = route.template.match_path(&remaining)?;
                (route.is_locator() || matched.remaining().is_empty_or_slash()).then_some((route, matched))
            });

            let Some((route, matched)) = select_most_specific(candidates, |(route, _)| &route.template) else {
                return Err(ResolutionError::PathNotFound {
                    resource: resource_type.name().to_string(),
                    path: remaining.to_string(),
                });
            };

            let locator = match &route.kind {
                RouteKind::Method(_) => break,
                RouteKind::Locator(locator) => locator,
            };

            if matched.consumed() == 0 {
                tracing::error!(
                    resource = resource_type.name(),
                    locator = %locator.name,
                    path = %remaining,
                    "Sub-resource locator consumed no part of the path"
                );
                return Err(ResolutionError::LocatorConsumedNothing {
                    resource: resource_type.name().to_string(),
                    locator: locator.name.clone(),
                    path: remaining.to_string(),
                });
            }

            let next_remaining = matched.remaining().clone();
            trail.record(matched);
            tracing::trace!(locator = %locator.name, remaining = %next_remaining, "Following sub-resource locator");

            resource = self
                .factory
                .invoke_locator(&resource, locator, &trail.parameters, request)?;
            remaining = next_remaining;
        }

        Ok((resource, remaining))
    }

    fn identify_method(
        &self,
        resource: ResourceObject<F::Resource>,
        remaining: RemainingPath,
        mut trail: Trail,
        request: &RequestContext,
    ) -> ResolutionResult<Resolution<F::Resource>> {
        let resource_type = Arc::clone(&resource.resource_type);
        let matching: Vec<(&RouteDescriptor, &MethodRoute, MatchResult)> = resource_type
            .routes()
            .iter()
            .filter_map(|route| {
                let method = route.as_method()?;
                let matched = route.template.match_path(&remaining)?;
                matched
                    .remaining()
                    .is_empty_or_slash()
                    .then_some((route, method, matched))
            })
            .collect();

        if matching.is_empty() {
            return Err(ResolutionError::MethodPathNotFound {
                resource: resource_type.name().to_string(),
                path: remaining.to_string(),
            });
        }

        let allowed = allowed_methods(matching.iter().map(|(_, m, _)| *m));
        let mut candidates: Vec<_> = matching
            .into_iter()
            .filter(|(_, m, _)| m.supports_verb(&request.method))
            .collect();

        if candidates.is_empty() {
            if request.method == Method::OPTIONS {
                return Ok(Resolution::Options { allowed });
            }
            return Err(ResolutionError::MethodNotAllowed {
                method: request.method.clone(),
                allowed,
            });
        }

        if let Some(given) = &request.entity_type {
            candidates.retain(|(_, m, _)| m.accepts_entity(given));
            if candidates.is_empty() {
                return Err(ResolutionError::UnsupportedMediaType { given: given.clone() });
            }
        }

        let accepted = request.preferences.accepted_media_types();
        candidates.retain(|(_, m, _)| m.produces_any_of(&accepted));
        if candidates.is_empty() {
            return Err(ResolutionError::NotAcceptable);
        }

        let entity_types: Vec<MediaType> = request.entity_type.iter().cloned().collect();
        let rank = |(route, method, _): &(&RouteDescriptor, &MethodRoute, MatchResult)| {
            (
                type_match_rank(&method.consumes, &entity_types),
                type_match_rank(&method.produces, &accepted),
                Reverse(preference_position(&method.produces, &accepted)),
                route.template.specificity(),
                method.http_method == request.method,
            )
        };

        let mut best = None;
        for candidate in candidates {
            let better = match &best {
                Some(current) => rank(&candidate).cmp(&rank(current)) == Ordering::Greater,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        let Some((route, method, matched)) = best else {
            return Err(ResolutionError::NotAcceptable);
        };

        tracing::debug!(
            resource = resource_type.name(),
            method = %method.name,
            template = %route.template,
            "Handler method selected"
        );

        let method = method.clone();
        let template = route.template.clone();
        trail.record(matched);
        Ok(Resolution::Method(ResolvedMethod {
            resource,
            method,
            template,
            parameters: trail.parameters,
            matched_paths: trail.matched,
        }))
    }
}

/// Distinct declared verbs, sorted by name.
fn allowed_methods<'a>(methods: impl Iterator<Item = &'a MethodRoute>) -> Vec<Method> {
    let mut allowed: Vec<Method> = Vec::new();
    for method in methods {
        if !allowed.contains(&method.http_method) {
            allowed.push(method.http_method.clone());
        }
    }
    allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    allowed
}

/// How closely declared types match the wanted ones: 2 for an exact type,
/// 1 for a `type/*` declaration, 0 for `*/*` or nothing declared.
fn type_match_rank(declared: &[MediaType], wanted: &[MediaType]) -> u8 {
    if declared.is_empty() {
        return 0;
    }
    declared
        .iter()
        .flat_map(|d| wanted.iter().map(move |w| (d, w)))
        .filter(|(d, w)| d.is_compatible(w))
        .map(|(d, w)| match d.specificity() {
            1 if d.same_type(w) || !w.is_concrete() => 2,
            1 | 0 => 1,
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

/// Index of the first accepted type, in client preference order, that one of
/// the declared types can serve. Nothing declared serves anything.
fn preference_position(declared: &[MediaType], accepted: &[MediaType]) -> usize {
    accepted
        .iter()
        .position(|wanted| declared.is_empty() || declared.iter().any(|d| d.is_compatible(wanted)))
        .unwrap_or(accepted.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mt(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    #[test]
    fn test_type_match_rank() {
        assert_eq!(type_match_rank(&[], &[mt("text/plain")]), 0);
        assert_eq!(type_match_rank(&[mt("text/plain")], &[mt("text/plain")]), 2);
        assert_eq!(type_match_rank(&[mt("text/*")], &[mt("text/plain")]), 1);
        assert_eq!(type_match_rank(&[mt("*/*")], &[mt("text/plain")]), 0);
    }

    #[test]
    fn test_preference_position() {
        let accepted = [mt("text/html"), mt("application/json")];
        assert_eq!(preference_position(&[mt("application/json")], &accepted), 1);
        assert_eq!(preference_position(&[mt("text/*")], &accepted), 0);
        assert_eq!(preference_position(&[], &accepted), 0);
        assert_eq!(preference_position(&[mt("image/png")], &accepted), 2);
    }

    #[test]
    fn test_allowed_methods_distinct_and_sorted() {
        let routes = [
            MethodRoute::new("a", Method::POST),
            MethodRoute::new("b", Method::GET),
            MethodRoute::new("c", Method::POST),
        ];
        let allowed = allowed_methods(routes.iter());
        assert_eq!(allowed, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_path_parameters_latest_wins() {
        let mut params = PathParameters::default();
        params.extend([("id".to_string(), "1".to_string()), ("id".to_string(), "2".to_string())]);
        assert_eq!(params.get("id"), Some("2"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("missing"), None);
    }
}
