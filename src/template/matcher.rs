//! Matching request paths against compiled templates.
//!
//! # Responsibilities
//! - Full-match the normalised remaining path against a template regex
//! - Capture variable values in declaration order
//! - Split off the final group as the new remaining path

use crate::template::compiler::{PathTemplate, FINAL_GROUP};
use crate::template::path::RemainingPath;

/// Outcome of a successful template match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    variables: Vec<(String, String)>,
    matched: String,
    remaining: RemainingPath,
    consumed: usize,
}

impl MatchResult {
    /// Captured `(name, value)` pairs in declaration order.
    pub fn variables(&self) -> &[(String, String)] {
        &self.variables
    }

    pub fn into_variables(self) -> Vec<(String, String)> {
        self.variables
    }

    /// The part of the path consumed by the template, without a trailing `/`.
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// The final group, i.e. what is left for nested routes.
    pub fn remaining(&self) -> &RemainingPath {
        &self.remaining
    }

    /// Number of characters of the normalised path the template consumed.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl PathTemplate {
    /// Match `path` against this template.
    ///
    /// Returns `None` when the template does not match the full path.
    pub fn match_path(&self, path: &RemainingPath) -> Option<MatchResult> {
        let input = path.match_input();
        let captures = self.regex().captures(&input)?;

        let variables = self
            .variables()
            .iter()
            .zip(self.group_names())
            .map(|(name, group)| {
                let value = captures.name(group).map_or("", |m| m.as_str());
                (name.clone(), value.to_string())
            })
            .collect();

        let final_group = captures.name(FINAL_GROUP).map_or("", |m| m.as_str());
        let consumed = input.len() - final_group.len();
        let matched = input[..consumed].trim_end_matches('/');

        let remaining = if final_group.is_empty() {
            RemainingPath::default()
        } else {
            RemainingPath::new(&format!("/{final_group}"))
        };

        Some(MatchResult {
            variables,
            matched: format!("/{matched}"),
            remaining,
            consumed,
        })
    }

    /// True when the template matches and leaves nothing behind.
    pub fn matches_fully(&self, path: &RemainingPath) -> bool {
        self.match_path(path)
            .is_some_and(|m| m.remaining().is_empty_or_slash())
    }
}
