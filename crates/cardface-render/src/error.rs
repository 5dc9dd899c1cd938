//! Error types for card rendering.
//!
//! [`TemplateError`] is the only failure a render can surface: the partial
//! render gateway folds every engine-internal problem into it, and the render
//! orchestrator turns it into an error card rather than propagating it.
//!
//! [`FilterError`] is what a filter callback returns when it cannot produce
//! output. It never escapes the filter chain.

use thiserror::Error;

use crate::card::CardId;

/// Help page shown when a card's question side renders blank.
pub const CARD_BLANK_HELP: &str =
    "https://anki.tenderapp.com/kb/card-appearance/the-front-of-this-card-is-blank";

/// A card template could not be rendered.
///
/// The `Display` output is shown to the user in place of the card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{{` was opened but never closed.
    #[error("missing '}}}}' in template: {context}")]
    NoClosingBrackets { context: String },

    /// The engine does not understand conditional sections.
    #[error("conditional sections are not supported: {tag}")]
    SectionsUnsupported { tag: String },

    /// A replacement referred to a field the note type does not have.
    #[error("found '{{{{{field}}}}}', but there is no field called '{field}'")]
    FieldNotFound { field: String },

    /// The question side would have been blank.
    #[error("the front of this card is blank. More info: {}", CARD_BLANK_HELP)]
    EmptyFront,

    /// The card to render does not exist.
    #[error("card {0} not found")]
    NoSuchCard(CardId),

    /// The note type has no template for the card's ordinal.
    #[error("no card template for ordinal {ord}")]
    NoSuchTemplate { ord: u16 },

    /// The template override document could not be read.
    #[error("invalid card template: {0}")]
    InvalidTemplate(String),

    /// Any other engine failure, already worded for the user.
    #[error("{0}")]
    Engine(String),
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::InvalidTemplate(err.to_string())
    }
}

/// A filter callback failed to transform its input.
#[derive(Debug, Error)]
#[error("filter '{filter}' failed: {message}")]
pub struct FilterError {
    /// Name of the filter being applied when the failure occurred.
    pub filter: String,
    /// Human-readable error message.
    pub message: String,
    /// The underlying error source, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl FilterError {
    /// Creates a new filter error.
    pub fn new(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}
