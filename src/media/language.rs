//! Language tags and character sets.

use std::fmt;
use std::str::FromStr;

use crate::media::MediaError;

/// A language tag such as `en`, `en-US` or the wildcard `*`.
///
/// Tags compare case-insensitively and are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    primary: String,
    sub_tags: Vec<String>,
}

impl Language {
    /// The wildcard `*`.
    pub fn all() -> Self {
        Self {
            primary: "*".to_string(),
            sub_tags: Vec::new(),
        }
    }

    pub fn primary_tag(&self) -> &str {
        &self.primary
    }

    pub fn sub_tags(&self) -> &[String] {
        &self.sub_tags
    }

    pub fn is_wildcard(&self) -> bool {
        self.primary == "*"
    }

    /// The primary tag alone, e.g. `en` for `en-US`.
    pub fn primary_only(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            sub_tags: Vec::new(),
        }
    }
}

impl FromStr for Language {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let mut parts = tag.split('-');
        let primary = parts.next().unwrap_or_default();
        let valid_part = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric());

        if primary != "*" && !valid_part(primary) {
            return Err(MediaError::InvalidLanguage(s.to_string()));
        }
        let sub_tags: Vec<String> = parts.map(str::to_ascii_lowercase).collect();
        if sub_tags.iter().any(|p| !valid_part(p)) || (primary == "*" && !sub_tags.is_empty()) {
            return Err(MediaError::InvalidLanguage(s.to_string()));
        }

        Ok(Self {
            primary: primary.to_ascii_lowercase(),
            sub_tags,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.primary)?;
        for sub in &self.sub_tags {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

/// A character set name such as `utf-8`, or the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterSet(String);

impl CharacterSet {
    pub fn all() -> Self {
        Self("*".to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == "*"
    }

    pub fn includes(&self, other: &CharacterSet) -> bool {
        self.is_wildcard() || self == other
    }
}

impl FromStr for CharacterSet {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '*'));
        if !valid {
            return Err(MediaError::InvalidCharacterSet(s.to_string()));
        }
        Ok(Self(name.to_ascii_lowercase()))
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        let lang: Language = "en-US".parse().unwrap();
        assert_eq!(lang.primary_tag(), "en");
        assert_eq!(lang.sub_tags(), ["us".to_string()]);
        assert_eq!(lang.to_string(), "en-us");
        assert_eq!(lang, "EN-us".parse().unwrap());
        assert_eq!(lang.primary_only(), "en".parse().unwrap());
        assert!("*".parse::<Language>().unwrap().is_wildcard());
    }

    #[test]
    fn test_language_rejects_garbage() {
        for bad in ["", "en-", "e n", "*-us", "en--us"] {
            assert!(bad.parse::<Language>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_charset() {
        let utf8: CharacterSet = "UTF-8".parse().unwrap();
        assert_eq!(utf8.name(), "utf-8");
        assert!(CharacterSet::all().includes(&utf8));
        assert!(!utf8.includes(&"iso-8859-1".parse().unwrap()));
    }
}
