//! Resource catalog built from configuration.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use axum::http::Method;

use crate::config::schema::{MethodConfig, ResourceConfig, ResponseConfig, RouterConfig};
use crate::dispatch::{Entity, HandlerOutput, ResourceInvoker, Variant};
use crate::media::{CharacterSet, Language, MediaError, MediaType};
use crate::negotiation::StaticSerializers;
use crate::resources::{template_options, CatalogError};
use crate::routing::{
    HandlerError, LocatorRoute, MethodRoute, PathParameters, RequestContext, ResolvedMethod, ResourceFactory,
    ResourceObject, ResourceType, RootRoute, RouteDescriptor,
};
use crate::template::{compile_with, PathTemplate, TemplateOptions};

/// Instance of a declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredResource {
    pub type_name: String,
}

#[derive(Debug, Clone)]
enum CannedResponse {
    NoContent,
    Value { type_name: String, body: String },
    Typed { media_type: MediaType, body: String },
    Variants(Vec<CannedVariant>),
}

#[derive(Debug, Clone)]
struct CannedVariant {
    media_type: Option<MediaType>,
    languages: Vec<Language>,
    character_set: Option<CharacterSet>,
    body: String,
}

type MemberKey = (String, String);

/// Every declared resource type, with the responses of their methods.
#[derive(Debug, Default)]
pub struct ResourceCatalog {
    types: HashMap<String, Arc<ResourceType>>,
    roots: Vec<RootRoute>,
    responses: HashMap<MemberKey, CannedResponse>,
    locator_targets: HashMap<MemberKey, String>,
    serializers: StaticSerializers,
}

impl ResourceCatalog {
    /// Build the catalog, reporting every invalid declaration.
    pub fn from_config(config: &RouterConfig) -> Result<Self, Vec<CatalogError>> {
        let options = template_options(config);
        let mut catalog = Self::default();
        let mut errors = Vec::new();

        for serializer in &config.serializers {
            match parse_media_types(&serializer.media_types) {
                Ok(types) => catalog.serializers.register(serializer.type_name.clone(), types),
                Err(source) => errors.push(CatalogError::Serializer {
                    type_name: serializer.type_name.clone(),
                    source,
                }),
            }
        }

        let declared: HashSet<&str> = config.resources.iter().map(|r| r.name.as_str()).collect();
        for resource in &config.resources {
            if catalog.types.contains_key(&resource.name) {
                errors.push(CatalogError::DuplicateResource(resource.name.clone()));
                continue;
            }
            catalog.add_resource(resource, &declared, options, &mut errors);
        }

        if errors.is_empty() {
            Ok(catalog)
        } else {
            Err(errors)
        }
    }

    fn add_resource(
        &mut self,
        resource: &ResourceConfig,
        declared: &HashSet<&str>,
        options: TemplateOptions,
        errors: &mut Vec<CatalogError>,
    ) {
        let mut routes = Vec::new();
        let mut members = HashSet::new();
        let mut duplicate = |member: &str, errors: &mut Vec<CatalogError>| {
            let fresh = members.insert(member.to_string());
            if !fresh {
                errors.push(CatalogError::DuplicateMember {
                    resource: resource.name.clone(),
                    member: member.to_string(),
                });
            }
            !fresh
        };

        for method in &resource.methods {
            if duplicate(&method.name, errors) {
                continue;
            }
            match build_method(resource, method, options) {
                Ok((route, response)) => {
                    routes.push(route);
                    self.responses
                        .insert((resource.name.clone(), method.name.clone()), response);
                }
                Err(e) => errors.push(e),
            }
        }

        for locator in &resource.locators {
            if duplicate(&locator.name, errors) {
                continue;
            }
            if !declared.contains(locator.target.as_str()) {
                errors.push(CatalogError::UnknownTarget {
                    resource: resource.name.clone(),
                    locator: locator.name.clone(),
                    target: locator.target.clone(),
                });
                continue;
            }
            match compile_route(resource, &locator.name, &locator.path, options) {
                Ok(template) => {
                    routes.push(RouteDescriptor::locator(template, LocatorRoute::new(&locator.name)));
                    self.locator_targets
                        .insert((resource.name.clone(), locator.name.clone()), locator.target.clone());
                }
                Err(e) => errors.push(e),
            }
        }

        let resource_type = Arc::new(ResourceType::new(&resource.name, routes));
        if let Some(path) = &resource.path {
            match compile_route(resource, &resource.name, path, options) {
                Ok(template) => self.roots.push(RootRoute::new(template, Arc::clone(&resource_type))),
                Err(e) => errors.push(e),
            }
        }
        self.types.insert(resource.name.clone(), resource_type);
    }

    /// Root routes in declaration order.
    pub fn roots(&self) -> &[RootRoute] {
        &self.roots
    }

    pub fn resource_type(&self, name: &str) -> Option<&Arc<ResourceType>> {
        self.types.get(name)
    }

    pub fn resource_count(&self) -> usize {
        self.types.len()
    }

    pub fn serializers(&self) -> &StaticSerializers {
        &self.serializers
    }
}

fn compile_route(
    resource: &ResourceConfig,
    route: &str,
    path: &str,
    options: TemplateOptions,
) -> Result<PathTemplate, CatalogError> {
    compile_with(path, options).map_err(|source| CatalogError::Template {
        resource: resource.name.clone(),
        route: route.to_string(),
        source,
    })
}

fn build_method(
    resource: &ResourceConfig,
    method: &MethodConfig,
    options: TemplateOptions,
) -> Result<(RouteDescriptor, CannedResponse), CatalogError> {
    let media_error = |source| CatalogError::MediaType {
        resource: resource.name.clone(),
        route: method.name.clone(),
        source,
    };

    let verb = Method::from_bytes(method.verb.to_ascii_uppercase().as_bytes()).map_err(|_| {
        CatalogError::InvalidVerb {
            resource: resource.name.clone(),
            method: method.name.clone(),
            verb: method.verb.clone(),
        }
    })?;
    let template = compile_route(resource, &method.name, &method.path, options)?;
    let route = MethodRoute::new(&method.name, verb)
        .consumes(parse_media_types(&method.consumes).map_err(media_error)?)
        .produces(parse_media_types(&method.produces).map_err(media_error)?);
    let response = build_response(&method.response).map_err(media_error)?;

    Ok((RouteDescriptor::method(template, route), response))
}

fn build_response(response: &ResponseConfig) -> Result<CannedResponse, MediaError> {
    if !response.variants.is_empty() {
        let variants = response
            .variants
            .iter()
            .map(|v| -> Result<CannedVariant, MediaError> {
                Ok(CannedVariant {
                    media_type: v.media_type.as_deref().map(str::parse::<MediaType>).transpose()?,
                    languages: parse_all(&v.languages)?,
                    character_set: v.charset.as_deref().map(str::parse::<CharacterSet>).transpose()?,
                    body: v.body.clone(),
                })
            })
            .collect::<Result<Vec<_>, MediaError>>()?;
        return Ok(CannedResponse::Variants(variants));
    }

    let Some(body) = &response.body else {
        return Ok(CannedResponse::NoContent);
    };
    Ok(match &response.media_type {
        Some(media_type) => CannedResponse::Typed {
            media_type: media_type.parse()?,
            body: body.clone(),
        },
        None => CannedResponse::Value {
            type_name: response.type_name.clone(),
            body: body.clone(),
        },
    })
}

fn parse_media_types(values: &[String]) -> Result<Vec<MediaType>, MediaError> {
    parse_all(values)
}

fn parse_all<T: FromStr<Err = MediaError>>(values: &[String]) -> Result<Vec<T>, MediaError> {
    values.iter().map(|v| v.parse()).collect()
}

/// Replace `{name}` with the path parameter `name` and `{entity}` with the
/// request entity. Unknown placeholders are left as written.
fn render(body: &str, parameters: &PathParameters, entity: &[u8]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match (name, parameters.get(name)) {
            (_, Some(value)) => out.push_str(value),
            ("entity", None) => out.push_str(&String::from_utf8_lossy(entity)),
            _ => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

impl ResourceFactory for ResourceCatalog {
    type Resource = DeclaredResource;

    fn create_root(
        &self,
        root: &RootRoute,
        _parameters: &PathParameters,
        _request: &RequestContext,
    ) -> Result<DeclaredResource, HandlerError> {
        Ok(DeclaredResource {
            type_name: root.resource_type.name().to_string(),
        })
    }

    fn invoke_locator(
        &self,
        parent: &ResourceObject<DeclaredResource>,
        locator: &LocatorRoute,
        _parameters: &PathParameters,
        _request: &RequestContext,
    ) -> Result<ResourceObject<DeclaredResource>, HandlerError> {
        let key = (parent.instance.type_name.clone(), locator.name.clone());
        let target = self
            .locator_targets
            .get(&key)
            .ok_or_else(|| HandlerError::new(format!("locator {} has no target", locator.name)))?;
        let resource_type = self
            .types
            .get(target)
            .ok_or_else(|| HandlerError::new(format!("unknown resource type {target}")))?;

        Ok(ResourceObject::new(
            Arc::clone(resource_type),
            DeclaredResource {
                type_name: target.clone(),
            },
        ))
    }
}

impl ResourceInvoker for ResourceCatalog {
    fn invoke(
        &self,
        resolved: &ResolvedMethod<DeclaredResource>,
        _request: &RequestContext,
        entity: &[u8],
    ) -> Result<HandlerOutput, HandlerError> {
        let key = (resolved.resource.instance.type_name.clone(), resolved.method.name.clone());
        let response = self
            .responses
            .get(&key)
            .ok_or_else(|| HandlerError::new(format!("no response declared for {}", resolved.method.name)))?;
        let params = &resolved.parameters;

        Ok(match response {
            CannedResponse::NoContent => HandlerOutput::NoContent,
            CannedResponse::Value { type_name, body } => {
                HandlerOutput::Value(Entity::new(type_name.clone(), render(body, params, entity)))
            }
            CannedResponse::Typed { media_type, body } => HandlerOutput::Typed {
                media_type: media_type.clone(),
                body: render(body, params, entity).into_bytes(),
            },
            CannedResponse::Variants(variants) => HandlerOutput::Variants(
                variants
                    .iter()
                    .map(|v| Variant {
                        media_type: v.media_type.clone(),
                        languages: v.languages.clone(),
                        character_set: v.character_set.clone(),
                        body: render(&v.body, params, entity).into_bytes(),
                    })
                    .collect(),
            ),
        })
    }
}
