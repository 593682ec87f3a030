//! Handler results and dispatch responses.

use axum::http::{Method, StatusCode};

use crate::media::{CharacterSet, Language, MediaType};
use crate::negotiation::Negotiable;

/// A serialised handler result whose media type is negotiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Runtime type name used to look up serializers.
    pub type_name: String,
    pub body: Vec<u8>,
}

impl Entity {
    pub fn new(type_name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            type_name: type_name.into(),
            body: body.into(),
        }
    }
}

/// One pre-built representation offered to variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub media_type: Option<MediaType>,
    pub languages: Vec<Language>,
    pub character_set: Option<CharacterSet>,
    pub body: Vec<u8>,
}

impl Variant {
    pub fn new(media_type: Option<MediaType>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type,
            languages: Vec::new(),
            character_set: None,
            body: body.into(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.languages.push(language);
        self
    }

    pub fn with_character_set(mut self, character_set: CharacterSet) -> Self {
        self.character_set = Some(character_set);
        self
    }
}

impl Negotiable for Variant {
    fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    fn languages(&self) -> &[Language] {
        &self.languages
    }

    fn character_set(&self) -> Option<&CharacterSet> {
        self.character_set.as_ref()
    }
}

/// What a handler method returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutput {
    NoContent,
    /// Media type chosen by negotiation.
    Value(Entity),
    /// Media type pinned by the handler.
    Typed { media_type: MediaType, body: Vec<u8> },
    /// Best variant chosen by negotiation.
    Variants(Vec<Variant>),
}

/// Transport-neutral response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub media_type: Option<MediaType>,
    pub language: Option<Language>,
    pub character_set: Option<CharacterSet>,
    /// Verbs for the `Allow` header; empty when not applicable.
    pub allow: Vec<Method>,
    pub body: Vec<u8>,
}

impl DispatchResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            media_type: None,
            language: None,
            character_set: None,
            allow: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    pub fn options(allowed: Vec<Method>) -> Self {
        Self {
            allow: allowed,
            ..Self::no_content()
        }
    }

    pub fn ok(media_type: MediaType, body: Vec<u8>) -> Self {
        Self {
            media_type: Some(media_type),
            body,
            ..Self::new(StatusCode::OK)
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
