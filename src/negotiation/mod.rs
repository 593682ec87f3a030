//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Selected handler method + result type + Accept preferences
//!     → response_type.rs (declared produces ∩ accepted → one media type)
//!
//! Handler-provided variants + ClientPreferences
//!     → variant.rs (enrich language prefs, score, pick best)
//!         → score.rs (media type / language compatibility scores)
//! ```
//!
//! # Design Decisions
//! - Response type selection walks client preferences first, so client
//!   quality dominates declaration order
//! - Variant quality weights language ten times higher than media type
//! - Ties always go to the earliest candidate

pub mod response_type;
pub mod score;
pub mod variant;

use thiserror::Error;

pub use response_type::{negotiate_response_type, SerializerRegistry, StaticSerializers};
pub use variant::{best_variant, FallbackQualities, Negotiable, VariantNegotiator};

/// Errors raised during negotiation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// No producible type satisfies the client.
    #[error("none of {offered} is acceptable to the client (accepts {accepted})")]
    NotAcceptable { offered: String, accepted: String },

    /// No variant satisfies the client.
    #[error("none of the {0} available variants is acceptable to the client")]
    NoAcceptableVariant(usize),
}

/// Result type for negotiation.
pub type NegotiationResult<T> = Result<T, NegotiationError>;
