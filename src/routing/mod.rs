//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup / reload:
//!     RootRoute[] (template + resource type)
//!     → registry.rs (duplicate check, atomic table swap)
//!
//! Per request (resolver.rs):
//!     Phase 1: registry snapshot → eligible roots → most specific → create root
//!     Phase 2: resource routes → most specific → locator? consume & descend
//!     Phase 3: method routes → verb → consumes → produces → best method
//!     → Resolution::Method(ResolvedMethod) | Resolution::Options
//! ```
//!
//! # Design Decisions
//! - Specificity: more literal characters first, then more capturing groups,
//!   then registration order
//! - Route tables are immutable once published; readers never block
//! - Resource instantiation is delegated to a `ResourceFactory`

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod resolver;

pub use descriptor::{LocatorRoute, MethodRoute, ResourceType, RootRoute, RouteDescriptor, RouteKind};
pub use error::{HandlerError, RegistryError, ResolutionError, ResolutionResult};
pub use registry::{select_most_specific, sort_by_specificity, RouteRegistry, RouteTable};
pub use resolver::{
    PathParameters, RequestContext, Resolution, ResolvedMethod, Resolver, ResourceFactory, ResourceObject,
};
