//! Request path handling.

use std::borrow::Cow;
use std::fmt;

/// The part of a request path not yet consumed by matching.
///
/// Matrix parameters (`;name=value`) are removed from every segment on
/// construction, since templates never declare them. Percent escapes are
/// upper-cased to match compiled template literals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemainingPath(String);

impl RemainingPath {
    pub fn new(path: &str) -> Self {
        let path = normalize_escapes(path);
        if !path.contains(';') {
            return Self(path.into_owned());
        }
        let stripped = path
            .split('/')
            .map(|segment| segment.split(';').next().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("/");
        Self(stripped)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `""` and `"/"`, the states in which nothing remains to match.
    pub fn is_empty_or_slash(&self) -> bool {
        self.0.is_empty() || self.0 == "/"
    }

    /// The form templates are matched against: no leading `/`, and a
    /// trailing `/` whenever the path is not empty.
    pub(crate) fn match_input(&self) -> Cow<'_, str> {
        let body = self.0.strip_prefix('/').unwrap_or(&self.0);
        if body.is_empty() || body.ends_with('/') {
            Cow::Borrowed(body)
        } else {
            Cow::Owned(format!("{body}/"))
        }
    }
}

impl fmt::Display for RemainingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemainingPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn normalize_escapes(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }
    let mut normalized = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(index) = rest.find('%') {
        normalized.push_str(&rest[..index]);
        let escape = &rest[index..];
        match escape.get(1..3) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                normalized.push('%');
                normalized.push_str(&hex.to_ascii_uppercase());
                rest = &escape[3..];
            }
            _ => {
                normalized.push('%');
                rest = &escape[1..];
            }
        }
    }
    normalized.push_str(rest);
    Cow::Owned(normalized)
}
