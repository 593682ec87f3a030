//! URI template subsystem.
//!
//! # Data Flow
//! ```text
//! Template string ("/users/{id}/posts/{slug:[a-z-]+}")
//!     → compiler.rs (parse, encode literals, build regex, count specificity)
//!     → PathTemplate (immutable, shared by route tables)
//!
//! Request path
//!     → path.rs (strip matrix parameters, normalise slashes)
//!     → matcher.rs (full match, variable capture, remaining path)
//!     → MatchResult
//! ```
//!
//! # Design Decisions
//! - Every template ends in an implicit `(/.*)?` group so prefixes can match
//! - Variables are captured through generated group names, so user regexes
//!   containing their own groups never shift variable positions
//! - Equality is structural: two templates differing only in variable names
//!   compile to the same pattern and are considered duplicates

pub mod compiler;
pub mod matcher;
pub mod path;

pub use compiler::{compile, compile_with, PathTemplate, TemplateError, TemplateOptions};
pub use matcher::MatchResult;
pub use path::RemainingPath;
