//! Pairwise compatibility scores.
//!
//! A score is either [`INCOMPATIBLE`] or a non-negative number where larger
//! means a closer match. Scores only rank preferences against one offered
//! value; they are never compared across dimensions.

use crate::media::{Language, MediaType};

/// Score for a pair that can never match.
pub const INCOMPATIBLE: f32 = -1.0;

const MAIN_TYPE_MATCH: f32 = 1000.0;
const SUB_TYPE_MATCH: f32 = 100.0;
const PRIMARY_TAG_MATCH: f32 = 100.0;
const NO_SUB_TAGS_MATCH: f32 = 10.0;

/// Score an offered media type against a client media range.
///
/// Exact main type outweighs a `*` range, exact subtype outweighs a
/// `type/*` range, and each offered parameter repeated by the client adds one.
pub fn score_media_type(offered: &MediaType, preferred: &MediaType) -> f32 {
    let mut score = 0.0;

    if preferred.main_type() == offered.main_type() {
        score += MAIN_TYPE_MATCH;
    } else if preferred.main_type() != "*" || preferred.sub_type() != "*" {
        return INCOMPATIBLE;
    }

    if preferred.sub_type() == offered.sub_type() {
        score += SUB_TYPE_MATCH;
    } else if preferred.sub_type() != "*" {
        return INCOMPATIBLE;
    }

    for (name, value) in offered.parameters() {
        if preferred.parameter(name) == Some(value.as_str()) {
            score += 1.0;
        }
    }

    score
}

/// Score an offered language against a client language range.
///
/// The wildcard is the weakest valid match. Sub-tags compared position by
/// position contribute `10^(1-i)`; any differing position is incompatible.
pub fn score_language(offered: &Language, preferred: &Language) -> f32 {
    let mut score = 0.0;

    if preferred.primary_tag() == offered.primary_tag() {
        score += PRIMARY_TAG_MATCH;
    } else if !preferred.is_wildcard() || !preferred.sub_tags().is_empty() {
        return INCOMPATIBLE;
    } else {
        score += 1.0;
    }

    let preferred_subs = preferred.sub_tags();
    let offered_subs = offered.sub_tags();
    if preferred_subs.is_empty() || offered_subs.is_empty() {
        if preferred_subs.is_empty() && offered_subs.is_empty() {
            score += NO_SUB_TAGS_MATCH;
        }
        return score;
    }

    for (i, (p, o)) in preferred_subs.iter().zip(offered_subs).enumerate() {
        if p != o {
            return INCOMPATIBLE;
        }
        score += 10f32.powi(1 - i as i32);
    }
    score
}
