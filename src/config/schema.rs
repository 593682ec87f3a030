//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::negotiation::FallbackQualities;

/// Root configuration for the resource router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Template compilation settings.
    pub templates: TemplateConfig,

    /// Content negotiation settings.
    pub negotiation: NegotiationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Media types each result type can be written as.
    pub serializers: Vec<SerializerConfig>,

    /// Declared resource types. Those with a `path` are root resources.
    pub resources: Vec<ResourceConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request entity accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Template compilation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Percent-encode characters that may not appear literally in a path.
    /// When false, templates containing them are rejected.
    pub encode: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self { encode: true }
    }
}

/// Content negotiation settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Language preferred by the server when the client's preferences leave
    /// a choice (e.g., "en-US").
    pub default_language: Option<String>,

    /// Qualities of the synthesised language preferences.
    pub fallback: FallbackQualities,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Media types a result type can be serialised as.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerializerConfig {
    /// Result type name used by handler responses.
    pub type_name: String,

    /// Producible media types (e.g., "application/json").
    pub media_types: Vec<String>,
}

/// A declared resource type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Unique resource type name.
    pub name: String,

    /// Root template. Resources without one are only reachable via locators.
    #[serde(default)]
    pub path: Option<String>,

    /// Handler methods.
    #[serde(default)]
    pub methods: Vec<MethodConfig>,

    /// Sub-resource locators.
    #[serde(default)]
    pub locators: Vec<LocatorConfig>,
}

/// A declared handler method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodConfig {
    /// Method identifier for logging.
    pub name: String,

    /// HTTP verb (GET, POST, ...).
    #[serde(default = "default_verb")]
    pub verb: String,

    /// Template relative to the resource; empty for the resource itself.
    #[serde(default)]
    pub path: String,

    /// Accepted entity media types; empty accepts any.
    #[serde(default)]
    pub consumes: Vec<String>,

    /// Produced media types; empty defers to the serializers.
    #[serde(default)]
    pub produces: Vec<String>,

    /// Canned response.
    #[serde(default)]
    pub response: ResponseConfig,
}

fn default_verb() -> String {
    "GET".to_string()
}

/// The canned response of a declared method.
///
/// `{name}` in a body is replaced by the path parameter `name`, and
/// `{entity}` by the request entity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Result type name for serializer lookup.
    pub type_name: String,

    /// Pins the response media type instead of negotiating it.
    pub media_type: Option<String>,

    /// Response body. No body and no variants means 204 No Content.
    pub body: Option<String>,

    /// Alternative representations chosen by variant negotiation.
    pub variants: Vec<VariantConfig>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            type_name: "text".to_string(),
            media_type: None,
            body: None,
            variants: Vec::new(),
        }
    }
}

/// One representation of a variant response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VariantConfig {
    #[serde(default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub charset: Option<String>,

    pub body: String,
}

/// A declared sub-resource locator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocatorConfig {
    /// Locator identifier for logging.
    pub name: String,

    /// Template relative to the resource.
    pub path: String,

    /// Name of the resource type the locator yields.
    pub target: String,
}
