//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext + entity bytes
//!     → dispatcher.rs
//!         → routing::Resolver (root → locators → method)
//!         → ResourceInvoker::invoke (application code)
//!         → output.rs HandlerOutput
//!         → negotiation (response type or best variant)
//!     → DispatchResponse | DispatchError (status + Allow)
//! ```
//!
//! # Design Decisions
//! - Dispatch is synchronous and transport-neutral; the HTTP layer only
//!   translates headers in and out
//! - HEAD runs the GET handler and drops the body afterwards

pub mod dispatcher;
pub mod output;

pub use dispatcher::{DispatchError, Dispatcher, ResourceInvoker};
pub use output::{DispatchResponse, Entity, HandlerOutput, Variant};
