//! Best-variant selection.
//!
//! # Responsibilities
//! - Enrich client language preferences with low-quality fallbacks
//! - Find the best-scoring language and media type preference per candidate
//! - Rank eligible candidates by `language_q * 10 + media_q`
//!
//! # Design Decisions
//! - Browsers rarely list every language a reader understands, so a client
//!   asking for `en-US` also gets `en` and `*` at very small qualities
//! - A configured default language outranks the client's own `*`
//! - Candidates that declare no language or media type match anything

use serde::{Deserialize, Serialize};

use crate::media::{CharacterSet, ClientPreferences, Language, MediaType, Preference, PreferenceList};
use crate::negotiation::score::{score_language, score_media_type, INCOMPATIBLE};

/// Qualities given to synthesised language preferences.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackQualities {
    /// Base quality of a primary tag derived from a sub-tagged preference.
    pub primary_tag_base: f32,
    /// Added per unit of the originating preference's quality.
    pub primary_tag_step: f32,
    pub default_language: f32,
    /// Primary tag of a sub-tagged default language.
    pub default_primary_tag: f32,
    /// The trailing `*` preference.
    pub catch_all: f32,
}

impl Default for FallbackQualities {
    fn default() -> Self {
        Self {
            primary_tag_base: 0.005,
            primary_tag_step: 0.001,
            default_language: 0.003,
            default_primary_tag: 0.002,
            catch_all: 0.001,
        }
    }
}

/// A candidate representation.
pub trait Negotiable {
    fn media_type(&self) -> Option<&MediaType>;

    fn languages(&self) -> &[Language];

    fn character_set(&self) -> Option<&CharacterSet> {
        None
    }
}

/// Picks the best of several pre-built representations.
#[derive(Debug, Clone, Default)]
pub struct VariantNegotiator {
    default_language: Option<Language>,
    fallback: FallbackQualities,
}

impl VariantNegotiator {
    pub fn new(default_language: Option<Language>, fallback: FallbackQualities) -> Self {
        Self {
            default_language,
            fallback,
        }
    }

    /// Client language preferences followed by the synthesised fallbacks.
    pub fn enriched_languages(&self, client: &PreferenceList<Language>) -> Vec<Preference<Language>> {
        let mut prefs: Vec<Preference<Language>> = Vec::new();
        let mut primaries: Vec<Preference<Language>> = Vec::new();

        if client.is_empty() {
            prefs.push(Preference::new(Language::all(), 1.0));
        } else {
            prefs.extend(client.iter().cloned());

            let mut seen: Vec<&str> = Vec::new();
            for pref in client.iter().filter(|p| !p.value.sub_tags().is_empty()) {
                let primary = pref.value.primary_tag();
                if !seen.contains(&primary) {
                    seen.push(primary);
                    let quality = self.fallback.primary_tag_base + self.fallback.primary_tag_step * pref.quality;
                    primaries.push(Preference::new(pref.value.primary_only(), quality));
                }
            }

            if let Some(default) = &self.default_language {
                if !default.sub_tags().is_empty() && !seen.contains(&default.primary_tag()) {
                    primaries.push(Preference::new(
                        default.primary_only(),
                        self.fallback.default_primary_tag,
                    ));
                }
            }
        }

        prefs.extend(primaries);
        if let Some(default) = &self.default_language {
            prefs.push(Preference::new(default.clone(), self.fallback.default_language));
            prefs.retain(|p| !p.value.is_wildcard());
        }
        prefs.push(Preference::new(Language::all(), self.fallback.catch_all));
        prefs
    }

    /// The best candidate, or `None` when no candidate is acceptable.
    /// Equal qualities resolve to the earliest candidate.
    pub fn best<'a, V: Negotiable>(&self, candidates: &'a [V], client: &ClientPreferences) -> Option<&'a V> {
        let languages = self.enriched_languages(&client.languages);
        let mut best: Option<(&'a V, f32)> = None;

        for candidate in candidates {
            let Some(quality) = self.quality(candidate, &languages, client) else {
                continue;
            };
            match best {
                Some((_, q)) if quality <= q => {}
                _ => best = Some((candidate, quality)),
            }
        }

        if let Some((_, quality)) = best {
            tracing::trace!(quality, candidates = candidates.len(), "Variant selected");
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Combined quality of one candidate, `None` when it is not acceptable.
    fn quality<V: Negotiable>(
        &self,
        candidate: &V,
        languages: &[Preference<Language>],
        client: &ClientPreferences,
    ) -> Option<f32> {
        let offered_languages = candidate.languages();
        let language_pref = offered_languages
            .iter()
            .flat_map(|offered| languages.iter().map(move |pref| (score_language(offered, &pref.value), pref)))
            .filter(|(score, pref)| *score != INCOMPATIBLE && pref.quality > 0.0)
            .fold(None, pick_best);
        if !offered_languages.is_empty() && language_pref.is_none() {
            return None;
        }

        let any = [Preference::new(MediaType::all(), 1.0)];
        let media_prefs: Vec<&Preference<MediaType>> = if client.media_types.is_empty() {
            any.iter().collect()
        } else {
            client.media_types.iter().collect()
        };
        let media_pref = candidate.media_type().and_then(|offered| {
            media_prefs
                .iter()
                .map(|pref| (score_media_type(offered, &pref.value), *pref))
                .filter(|(score, pref)| *score != INCOMPATIBLE && pref.quality > 0.0)
                .fold(None, pick_best)
        });
        if candidate.media_type().is_some() && media_pref.is_none() {
            return None;
        }

        if let Some(charset) = candidate.character_set() {
            let mut acceptable = client.character_sets.acceptable().peekable();
            if acceptable.peek().is_some() && !acceptable.any(|p| p.value.includes(charset)) {
                return None;
            }
        }

        let language_q = language_pref.map_or(0.0, |(_, p)| p.quality);
        let media_q = media_pref.map_or(0.0, |(_, p)| p.quality);
        Some(language_q * 10.0 + media_q)
    }
}

/// Keeps the first preference with the strictly highest score.
fn pick_best<'p, T>(
    best: Option<(f32, &'p Preference<T>)>,
    current: (f32, &'p Preference<T>),
) -> Option<(f32, &'p Preference<T>)> {
    match best {
        Some((score, _)) if current.0 <= score => best,
        _ => Some(current),
    }
}

/// [`VariantNegotiator::best`] without a default language.
pub fn best_variant<'a, V: Negotiable>(candidates: &'a [V], client: &ClientPreferences) -> Option<&'a V> {
    VariantNegotiator::default().best(candidates, client)
}
