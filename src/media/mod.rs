//! Media metadata subsystem.
//!
//! # Data Flow
//! ```text
//! Accept / Accept-Language / Accept-Charset headers
//!     → preference.rs (split, parse q-values, order by quality)
//!     → ClientPreferences
//!
//! Declared consumes/produces, variant metadata
//!     → media_type.rs / language.rs (parse, compare, rank specificity)
//! ```
//!
//! # Design Decisions
//! - Type, subtype and parameter names are case-insensitive and stored lowercase
//! - Unparsable header entries are dropped rather than failing the request
//! - Preference lists keep header order among equal qualities

pub mod language;
pub mod media_type;
pub mod preference;

use thiserror::Error;

pub use language::{CharacterSet, Language};
pub use media_type::{sort_by_concreteness, MediaType};
pub use preference::{ClientPreferences, Preference, PreferenceList};

/// Errors raised while parsing media metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("invalid media type \"{0}\"")]
    InvalidMediaType(String),

    #[error("invalid language tag \"{0}\"")]
    InvalidLanguage(String),

    #[error("invalid character set \"{0}\"")]
    InvalidCharacterSet(String),
}
