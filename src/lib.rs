//! Request matching and content negotiation for resource-oriented HTTP services.
//!
//! Requests are resolved in three phases (root resource, sub-resource
//! locators, handler method) against compiled URI templates, and the response
//! representation is chosen from the client's Accept headers.

// Matching and negotiation core
pub mod media;
pub mod negotiation;
pub mod routing;
pub mod template;

// Dispatch and declared resources
pub mod dispatch;
pub mod resources;

// Transport and cross-cutting concerns
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RouterConfig;
pub use dispatch::{DispatchError, DispatchResponse, Dispatcher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Resolver, RouteRegistry};
