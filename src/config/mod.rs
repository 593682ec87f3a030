//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, trial build of the resource model)
//!     → RouterConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the server, which swaps in a freshly built dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - An invalid reload is logged and the running configuration kept

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, LocatorConfig, LogFormat, MethodConfig, NegotiationConfig, ObservabilityConfig, ResourceConfig,
    ResponseConfig, RouterConfig, SerializerConfig, TemplateConfig, TimeoutConfig, VariantConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
