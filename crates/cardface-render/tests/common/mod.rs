//! A canned collection for integration tests.

#![allow(dead_code)]

use cardface_render::{
    AvExtraction, AvTagExtractor, BuiltinAvExtractor, Card, CardId, CardSide, CardTemplate,
    DeckId, DeckNames, Note, NoteType, PartialRenderer, PartiallyRenderedCard, RenderContext,
    TemplateError,
};

pub struct CannedCollection {
    pub result: Result<PartiallyRenderedCard, TemplateError>,
    pub extractor: BuiltinAvExtractor,
}

impl CannedCollection {
    pub fn new(card: PartiallyRenderedCard) -> Self {
        Self {
            result: Ok(card),
            extractor: BuiltinAvExtractor::default(),
        }
    }

    pub fn failing(err: TemplateError) -> Self {
        Self {
            result: Err(err),
            extractor: BuiltinAvExtractor::default(),
        }
    }
}

impl PartialRenderer for CannedCollection {
    fn render_existing_card(
        &self,
        _card_id: CardId,
        _browser: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        self.result.clone()
    }

    fn render_uncommitted_card(
        &self,
        _note: &Note,
        _card_ord: u16,
        _template: &serde_json::Value,
        _fill_empty: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        self.result.clone()
    }
}

impl AvTagExtractor for CannedCollection {
    fn extract_av_tags(&self, text: &str, side: CardSide) -> AvExtraction {
        self.extractor.extract_av_tags(text, side)
    }
}

impl DeckNames for CannedCollection {
    fn deck_name(&self, _deck_id: DeckId) -> Option<String> {
        Some("Default".into())
    }
}

/// Card, note, and note type for a "Basic" note with `Front = 2+2`, `Back = 4`.
pub struct Records {
    pub card: Card,
    pub note: Note,
    pub note_type: NoteType,
}

impl Records {
    pub fn basic() -> Self {
        Self {
            card: Card {
                id: CardId(7),
                ..Default::default()
            },
            note: Note {
                fields: vec![("Front".into(), "2+2".into()), ("Back".into(), "4".into())],
                ..Default::default()
            },
            note_type: NoteType {
                name: "Basic".into(),
                fields: vec!["Front".into(), "Back".into()],
                templates: vec![CardTemplate {
                    name: "Card 1".into(),
                    qfmt: "{{Front}}".into(),
                    afmt: "{{FrontSide}}<hr>{{Back}}".into(),
                    ..Default::default()
                }],
                css: ".card {}".into(),
                ..Default::default()
            },
        }
    }

    pub fn context<'a>(&'a self, col: &'a CannedCollection) -> RenderContext<'a> {
        RenderContext::from_existing_card(col, &self.card, &self.note, &self.note_type, false)
    }
}
