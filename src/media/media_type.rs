//! Media types (`type/subtype;param=value`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::media::MediaError;

/// A media type or media range.
///
/// `*/*` and `type/*` are ranges; everything else is concrete. Parameters are
/// kept sorted by name so equality ignores their declared order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    main: String,
    sub: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    pub fn new(main: &str, sub: &str) -> Self {
        Self {
            main: main.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match self.parameters.binary_search_by(|(n, _)| n.as_str().cmp(&name)) {
            Ok(i) => self.parameters[i].1 = value.to_string(),
            Err(i) => self.parameters.insert(i, (name, value.to_string())),
        }
        self
    }

    /// `*/*`
    pub fn all() -> Self {
        Self::new("*", "*")
    }

    /// `application/octet-stream`
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    pub fn main_type(&self) -> &str {
        &self.main
    }

    pub fn sub_type(&self) -> &str {
        &self.sub
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    pub fn without_parameters(&self) -> Self {
        Self::new(&self.main, &self.sub)
    }

    pub fn is_concrete(&self) -> bool {
        self.main != "*" && self.sub != "*"
    }

    /// `*/*` ranks -1, `type/*` ranks 0, concrete types rank 1.
    pub fn specificity(&self) -> i8 {
        if self.main == "*" {
            -1
        } else if self.sub == "*" {
            0
        } else {
            1
        }
    }

    /// True when `self`, read as a range, covers `other`. Parameters are ignored.
    pub fn includes(&self, other: &MediaType) -> bool {
        self.main == "*"
            || (self.main == other.main && (self.sub == "*" || self.sub == other.sub))
    }

    /// True when either type includes the other.
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        self.includes(other) || other.includes(self)
    }

    /// Same type and subtype, parameters ignored.
    pub fn same_type(&self, other: &MediaType) -> bool {
        self.main == other.main && self.sub == other.sub
    }

    /// The more specific of two compatible types, preferring `first` on ties.
    pub fn most_specific<'a>(first: &'a MediaType, second: &'a MediaType) -> &'a MediaType {
        if second.specificity() > first.specificity() {
            second
        } else {
            first
        }
    }
}

/// Sort most concrete first; equally concrete types by case-insensitive text.
pub fn sort_by_concreteness(types: &mut [MediaType]) {
    types.sort_by(compare_concreteness);
}

pub fn compare_concreteness(a: &MediaType, b: &MediaType) -> Ordering {
    b.specificity()
        .cmp(&a.specificity())
        .then_with(|| a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()))
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_graphic() && !matches!(c, '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':'
                | '\\' | '"' | '/' | '[' | ']' | '?' | '=' | '{' | '}')
        })
}

impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MediaError::InvalidMediaType(s.to_string());
        let mut pieces = s.split(';');
        let essence = pieces.next().unwrap_or_default().trim();

        let (main, sub) = match essence.split_once('/') {
            Some((main, sub)) => (main.trim(), sub.trim()),
            None if essence == "*" => ("*", "*"),
            None => return Err(invalid()),
        };
        if !is_token(main) || !is_token(sub) || (main == "*" && sub != "*") {
            return Err(invalid());
        }

        let mut media_type = MediaType::new(main, sub);
        for piece in pieces {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (name, value) = piece.split_once('=').ok_or_else(invalid)?;
            let name = name.trim();
            if !is_token(name) {
                return Err(invalid());
            }
            let value = value.trim().trim_matches('"');
            media_type = media_type.with_parameter(name, value);
        }
        Ok(media_type)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)?;
        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mt(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse() {
        let t = mt("Text/HTML; charset=\"UTF-8\"; level=1");
        assert_eq!(t.main_type(), "text");
        assert_eq!(t.sub_type(), "html");
        assert_eq!(t.parameter("charset"), Some("UTF-8"));
        assert_eq!(t.to_string(), "text/html;charset=UTF-8;level=1");
        assert_eq!(mt("*"), MediaType::all());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "text", "text/", "/html", "*/html", "text/html;broken", "te xt/html"] {
            assert!(bad.parse::<MediaType>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_parameter_order_irrelevant() {
        assert_eq!(mt("a/b;x=1;y=2"), mt("a/b;y=2;x=1"));
    }

    #[test]
    fn test_specificity() {
        assert_eq!(mt("*/*").specificity(), -1);
        assert_eq!(mt("text/*").specificity(), 0);
        assert_eq!(mt("text/plain").specificity(), 1);
    }

    #[test]
    fn test_compatibility() {
        assert!(mt("text/*").is_compatible(&mt("text/plain")));
        assert!(mt("text/plain").is_compatible(&mt("*/*")));
        assert!(!mt("text/plain").is_compatible(&mt("application/json")));
        assert!(!mt("text/*").is_compatible(&mt("application/*")));
    }

    #[test]
    fn test_most_specific() {
        let range = mt("text/*");
        let concrete = mt("text/plain");
        assert_eq!(MediaType::most_specific(&range, &concrete), &concrete);
        assert_eq!(MediaType::most_specific(&concrete, &range), &concrete);
    }

    #[test]
    fn test_sort_by_concreteness() {
        let mut types = vec![mt("*/*"), mt("text/plain"), mt("text/*"), mt("Application/JSON")];
        sort_by_concreteness(&mut types);
        let sorted: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        assert_eq!(sorted, ["application/json", "text/plain", "text/*", "*/*"]);
    }
}
