//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::Method;
use resource_router::dispatch::{Dispatcher, Entity, HandlerOutput, ResourceInvoker};
use resource_router::media::{ClientPreferences, MediaType};
use resource_router::negotiation::{FallbackQualities, StaticSerializers, VariantNegotiator};
use resource_router::routing::{
    HandlerError, LocatorRoute, MethodRoute, PathParameters, RequestContext, ResolvedMethod, Resolver,
    ResourceFactory, ResourceObject, ResourceType, RootRoute, RouteDescriptor, RouteRegistry,
};
use resource_router::template::{compile, TemplateOptions};

pub fn mt(s: &str) -> MediaType {
    s.parse().unwrap()
}

pub fn method(path: &str, name: &str, verb: Method) -> RouteDescriptor {
    RouteDescriptor::method(compile(path).unwrap(), MethodRoute::new(name, verb))
}

pub fn method_route(path: &str, route: MethodRoute) -> RouteDescriptor {
    RouteDescriptor::method(compile(path).unwrap(), route)
}

pub fn locator(path: &str, name: &str) -> RouteDescriptor {
    RouteDescriptor::locator(compile(path).unwrap(), LocatorRoute::new(name))
}

pub fn resource(name: &str, routes: Vec<RouteDescriptor>) -> Arc<ResourceType> {
    Arc::new(ResourceType::new(name, routes))
}

pub fn root(path: &str, resource_type: &Arc<ResourceType>) -> RootRoute {
    RootRoute::new(compile(path).unwrap(), Arc::clone(resource_type))
}

pub fn request(verb: Method, path: &str) -> RequestContext {
    RequestContext::new(verb, path)
}

pub fn accepting(verb: Method, path: &str, accept: &str) -> RequestContext {
    RequestContext::new(verb, path).with_preferences(ClientPreferences::from_headers(Some(accept), None, None))
}

/// Resource factory whose instances are the names of their resource types.
#[derive(Default)]
pub struct TestFactory {
    targets: HashMap<String, Arc<ResourceType>>,
    failing_root: Option<String>,
    pub locator_calls: AtomicUsize,
}

impl TestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator `name` yields an instance of `target`.
    pub fn with_target(mut self, name: &str, target: &Arc<ResourceType>) -> Self {
        self.targets.insert(name.to_string(), Arc::clone(target));
        self
    }

    /// Creating the root resource of type `name` fails.
    pub fn failing_root(mut self, name: &str) -> Self {
        self.failing_root = Some(name.to_string());
        self
    }

    pub fn locator_calls(&self) -> usize {
        self.locator_calls.load(Ordering::SeqCst)
    }
}

impl ResourceFactory for TestFactory {
    type Resource = String;

    fn create_root(
        &self,
        root: &RootRoute,
        _parameters: &PathParameters,
        _request: &RequestContext,
    ) -> Result<String, HandlerError> {
        let name = root.resource_type.name();
        if self.failing_root.as_deref() == Some(name) {
            return Err(HandlerError::new(format!("cannot construct {name}")));
        }
        Ok(name.to_string())
    }

    fn invoke_locator(
        &self,
        _parent: &ResourceObject<String>,
        locator: &LocatorRoute,
        _parameters: &PathParameters,
        _request: &RequestContext,
    ) -> Result<ResourceObject<String>, HandlerError> {
        self.locator_calls.fetch_add(1, Ordering::SeqCst);
        let target = self
            .targets
            .get(&locator.name)
            .ok_or_else(|| HandlerError::new(format!("no target for {}", locator.name)))?;
        Ok(ResourceObject::new(Arc::clone(target), target.name().to_string()))
    }
}

impl ResourceInvoker for TestFactory {
    fn invoke(
        &self,
        resolved: &ResolvedMethod<String>,
        _request: &RequestContext,
        _entity: &[u8],
    ) -> Result<HandlerOutput, HandlerError> {
        let body = format!("{}:{}", resolved.resource.instance, resolved.method.name);
        Ok(HandlerOutput::Value(Entity::new("text", body)))
    }
}

pub fn resolver(roots: Vec<RootRoute>, factory: TestFactory) -> Resolver<TestFactory> {
    let registry = RouteRegistry::with_roots(roots, TemplateOptions::default()).unwrap();
    Resolver::new(Arc::new(registry), Arc::new(factory))
}

pub fn dispatcher(roots: Vec<RootRoute>, factory: TestFactory) -> Dispatcher<TestFactory> {
    let mut serializers = StaticSerializers::new();
    serializers.register("text", vec![mt("text/plain"), mt("application/json")]);
    Dispatcher::new(
        resolver(roots, factory),
        Arc::new(serializers),
        VariantNegotiator::new(None, FallbackQualities::default()),
    )
}

/// A small declared service used by the HTTP tests.
pub const SHOP_CONFIG: &str = r#"
[observability]
metrics_enabled = false

[[serializers]]
type_name = "item"
media_types = ["application/json", "text/plain"]

[[resources]]
name = "shop"
path = "/shop"

[[resources.methods]]
name = "index"
produces = ["text/plain"]
response = { body = "welcome" }

[[resources.methods]]
name = "order"
verb = "POST"
consumes = ["application/json"]
response = { media_type = "application/json", body = "{entity}" }

[[resources.locators]]
name = "item"
path = "items/{id}"
target = "item"

[[resources]]
name = "item"

[[resources.methods]]
name = "show"
response = { type_name = "item", body = "item {id}" }

[[resources.methods]]
name = "remove"
verb = "DELETE"

[[resources.methods]]
name = "greeting"
path = "greeting"

[[resources.methods.response.variants]]
media_type = "text/plain"
languages = ["en"]
body = "hello {id}"

[[resources.methods.response.variants]]
media_type = "text/plain"
languages = ["fr"]
body = "bonjour {id}"
"#;
