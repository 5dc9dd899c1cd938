//! Interfaces to the collection the renderer works against.
//!
//! The renderer does not parse template grammar, look up decks, or scan for
//! playback directives itself. Those jobs belong to the collection backend,
//! reached through three narrow traits:
//!
//! - [`PartialRenderer`]: turns a stored (or uncommitted) template plus field
//!   data into a [`PartiallyRenderedCard`], applying the filters it knows
//! - [`AvTagExtractor`]: removes `[sound:..]` / TTS directives from final text
//! - [`DeckNames`]: resolves deck names for the legacy field map
//!
//! [`Collection`] bundles the three and is implemented automatically for any
//! type providing them. A [`RenderContext`](crate::RenderContext) only ever
//! borrows the collection for the duration of one render.

use cardface_avtags::{extract_av_tags, AvExtraction, CardSide, PlayTagMode};

use crate::card::{CardId, DeckId, Note};
use crate::error::TemplateError;
use crate::node::PartiallyRenderedCard;

/// The external template engine.
///
/// Implementations apply every filter they recognize and stop at the first
/// one they do not, leaving the rest on the [`FieldReplacement`](crate::FieldReplacement).
pub trait PartialRenderer {
    /// Renders a stored card. `browser` selects the browser-specific formats.
    fn render_existing_card(
        &self,
        card_id: CardId,
        browser: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError>;

    /// Renders a card from an uncommitted note and template, as the card
    /// layout editor does.
    ///
    /// `template` is the [`CardTemplate`](crate::CardTemplate) override as a
    /// JSON document. With `fill_empty`, empty fields are rendered with a
    /// placeholder so the layout is visible.
    fn render_uncommitted_card(
        &self,
        note: &Note,
        card_ord: u16,
        template: &serde_json::Value,
        fill_empty: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError>;
}

/// Scanner for embedded playback directives.
pub trait AvTagExtractor {
    fn extract_av_tags(&self, text: &str, side: CardSide) -> AvExtraction;
}

/// Deck name lookup.
pub trait DeckNames {
    /// Full `::`-separated name of the deck, if it exists.
    fn deck_name(&self, deck_id: DeckId) -> Option<String>;
}

/// Everything the renderer needs from a collection.
pub trait Collection: PartialRenderer + AvTagExtractor + DeckNames {}

impl<T> Collection for T where T: PartialRenderer + AvTagExtractor + DeckNames + ?Sized {}

/// [`AvTagExtractor`] backed by `cardface-avtags`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuiltinAvExtractor {
    mode: PlayTagMode,
}

impl BuiltinAvExtractor {
    pub fn new(mode: PlayTagMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PlayTagMode {
        self.mode
    }
}

impl AvTagExtractor for BuiltinAvExtractor {
    fn extract_av_tags(&self, text: &str, side: CardSide) -> AvExtraction {
        extract_av_tags(text, side, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_extractor_uses_mode() {
        let strip = BuiltinAvExtractor::default();
        assert_eq!(strip.extract_av_tags("a[sound:x.mp3]", CardSide::Question).text, "a");

        let refs = BuiltinAvExtractor::new(PlayTagMode::Reference);
        assert_eq!(
            refs.extract_av_tags("a[sound:x.mp3]", CardSide::Answer).text,
            "a[anki:play:a:0]"
        );
    }
}
