//! Client preferences parsed from `Accept*` headers.
//!
//! # Responsibilities
//! - Split comma-separated header values into weighted entries
//! - Parse the `q` parameter, defaulting to 1.0
//! - Keep entries ordered by descending quality, header order on ties

use std::str::FromStr;

use crate::media::{CharacterSet, Language, MediaType};

/// A value with a quality weight in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preference<T> {
    pub value: T,
    pub quality: f32,
}

impl<T> Preference<T> {
    pub fn new(value: T, quality: f32) -> Self {
        Self {
            value,
            quality: quality.clamp(0.0, 1.0),
        }
    }
}

/// Preferences for one negotiation dimension, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceList<T> {
    entries: Vec<Preference<T>>,
}

impl<T> Default for PreferenceList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> PreferenceList<T> {
    pub fn new(mut entries: Vec<Preference<T>>) -> Self {
        entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preference<T>> {
        self.entries.iter()
    }

    /// Entries with a quality above zero.
    pub fn acceptable(&self) -> impl Iterator<Item = &Preference<T>> {
        self.entries.iter().filter(|p| p.quality > 0.0)
    }
}

impl<T: FromStr> PreferenceList<T> {
    /// Parse a header value such as `text/html;q=0.8, application/json`.
    ///
    /// Entries that fail to parse are skipped. Parameters after `q` are
    /// accept-extensions and are discarded.
    pub fn parse_header(header: &str) -> Self {
        let entries = header
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let parsed = parse_entry(entry);
                if parsed.is_none() {
                    tracing::debug!(entry = %entry, "Skipping unparsable preference entry");
                }
                parsed
            })
            .collect();
        Self::new(entries)
    }
}

fn parse_entry<T: FromStr>(entry: &str) -> Option<Preference<T>> {
    let mut pieces = entry.split(';');
    let mut value = pieces.next().unwrap_or_default().trim().to_string();
    let mut quality = 1.0;

    for piece in pieces {
        let piece = piece.trim();
        match piece.split_once('=') {
            Some((name, q)) if name.trim().eq_ignore_ascii_case("q") => {
                quality = q.trim().parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?;
                break;
            }
            _ => {
                value.push(';');
                value.push_str(piece);
            }
        }
    }

    let value = value.parse().ok()?;
    Some(Preference::new(value, quality))
}

/// Everything a client told us about the representations it wants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPreferences {
    pub media_types: PreferenceList<MediaType>,
    pub languages: PreferenceList<Language>,
    pub character_sets: PreferenceList<CharacterSet>,
}

impl ClientPreferences {
    /// Build preferences from raw header values; absent headers give empty lists.
    pub fn from_headers(
        accept: Option<&str>,
        accept_language: Option<&str>,
        accept_charset: Option<&str>,
    ) -> Self {
        Self {
            media_types: accept.map(PreferenceList::parse_header).unwrap_or_default(),
            languages: accept_language.map(PreferenceList::parse_header).unwrap_or_default(),
            character_sets: accept_charset.map(PreferenceList::parse_header).unwrap_or_default(),
        }
    }

    /// Acceptable media types best first, or `*/*` when the client named none.
    pub fn accepted_media_types(&self) -> Vec<MediaType> {
        let accepted: Vec<MediaType> = self.media_types.acceptable().map(|p| p.value.clone()).collect();
        if accepted.is_empty() {
            vec![MediaType::all()]
        } else {
            accepted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accept_orders_by_quality() {
        let prefs: PreferenceList<MediaType> =
            PreferenceList::parse_header("text/html;q=0.8, application/json;q=0.9, */*;q=0.1");
        let order: Vec<String> = prefs.iter().map(|p| p.value.to_string()).collect();
        assert_eq!(order, ["application/json", "text/html", "*/*"]);
        assert_eq!(prefs.iter().next().map(|p| p.quality), Some(0.9));
    }

    #[test]
    fn test_equal_quality_keeps_header_order() {
        let prefs: PreferenceList<MediaType> = PreferenceList::parse_header("text/plain, text/html");
        let order: Vec<String> = prefs.iter().map(|p| p.value.to_string()).collect();
        assert_eq!(order, ["text/plain", "text/html"]);
    }

    #[test]
    fn test_media_parameters_before_q_are_kept() {
        let prefs: PreferenceList<MediaType> =
            PreferenceList::parse_header("text/html;level=1;q=0.5;ext=foo");
        let first = prefs.iter().next().unwrap();
        assert_eq!(first.value.parameter("level"), Some("1"));
        assert_eq!(first.value.parameter("ext"), None);
        assert_eq!(first.quality, 0.5);
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let prefs: PreferenceList<Language> = PreferenceList::parse_header("en-US, e n, fr;q=2, de;q=0.5");
        let order: Vec<String> = prefs.iter().map(|p| p.value.to_string()).collect();
        assert_eq!(order, ["en-us", "de"]);
    }

    #[test]
    fn test_zero_quality_not_acceptable() {
        let prefs: PreferenceList<MediaType> = PreferenceList::parse_header("text/html;q=0, */*");
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs.acceptable().count(), 1);
    }

    #[test]
    fn test_accepted_media_types_default() {
        let prefs = ClientPreferences::default();
        assert_eq!(prefs.accepted_media_types(), vec![MediaType::all()]);
    }
}
