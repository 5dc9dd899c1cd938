//! Shared fixtures for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use cardface_avtags::{AvExtraction, CardSide};

use crate::card::{Card, CardId, CardTemplate, DeckId, Note, NoteId, NoteType, NotetypeId};
use crate::context::RenderContext;
use crate::error::TemplateError;
use crate::gateway::{AvTagExtractor, BuiltinAvExtractor, DeckNames, PartialRenderer};
use crate::node::{FieldReplacement, PartiallyRenderedCard, Side};

/// A collection that returns canned node lists.
pub struct StubCollection {
    /// Returned for every stored card.
    pub card: PartiallyRenderedCard,
    /// When set, every partial render fails with this error.
    pub fail_with: Option<TemplateError>,
    pub decks: HashMap<DeckId, String>,
    /// Template document received by the last preview render.
    pub last_template: RefCell<Option<serde_json::Value>>,
    pub last_fill_empty: Cell<Option<bool>>,
    extractor: BuiltinAvExtractor,
}

impl PartialRenderer for StubCollection {
    fn render_existing_card(
        &self,
        _card_id: CardId,
        _browser: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(self.card.clone()),
        }
    }

    fn render_uncommitted_card(
        &self,
        _note: &Note,
        _card_ord: u16,
        template: &serde_json::Value,
        fill_empty: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        *self.last_template.borrow_mut() = Some(template.clone());
        self.last_fill_empty.set(Some(fill_empty));
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(PartiallyRenderedCard::new(
            Side::text("preview"),
            Side::new(vec![
                FieldReplacement::new("FrontSide", "").into(),
                " answer".into(),
            ]),
        ))
    }
}

impl AvTagExtractor for StubCollection {
    fn extract_av_tags(&self, text: &str, side: CardSide) -> AvExtraction {
        self.extractor.extract_av_tags(text, side)
    }
}

impl DeckNames for StubCollection {
    fn deck_name(&self, deck_id: DeckId) -> Option<String> {
        self.decks.get(&deck_id).cloned()
    }
}

pub struct Fixture {
    pub collection: StubCollection,
    pub card: Card,
    pub note: Note,
    pub note_type: NoteType,
}

impl Fixture {
    /// A "Basic" note with `Front = 2+2` and `Back = 4`, whose card renders
    /// `{{Front}}` / `{{FrontSide}}<hr>{{Back}}`.
    pub fn basic() -> Self {
        let qnodes = Side::new(vec![FieldReplacement::new("Front", "2+2").into()]);
        let anodes = Side::new(vec![
            FieldReplacement::new("FrontSide", "").into(),
            "<hr>".into(),
            FieldReplacement::new("Back", "4").into(),
        ]);

        let collection = StubCollection {
            card: PartiallyRenderedCard::new(qnodes, anodes),
            fail_with: None,
            decks: HashMap::from([
                (DeckId(1), "Default".to_string()),
                (DeckId(2), "Languages::Japanese".to_string()),
            ]),
            last_template: RefCell::new(None),
            last_fill_empty: Cell::new(None),
            extractor: BuiltinAvExtractor::default(),
        };

        let note_type = NoteType {
            id: NotetypeId(10),
            name: "Basic".into(),
            fields: vec!["Front".into(), "Back".into()],
            templates: vec![CardTemplate {
                name: "Card 1".into(),
                qfmt: "{{Front}}".into(),
                afmt: "{{FrontSide}}<hr>{{Back}}".into(),
                bqfmt: "{{Front}} (browser)".into(),
                bafmt: String::new(),
            }],
            css: ".card { color: black; }".into(),
        };

        let note = Note {
            id: NoteId(100),
            notetype_id: note_type.id,
            fields: vec![
                ("Front".into(), "2+2".into()),
                ("Back".into(), "4".into()),
            ],
            tags: Vec::new(),
        };

        let card = Card {
            id: CardId(1),
            note_id: note.id,
            ord: 0,
            deck_id: DeckId(1),
            ..Default::default()
        };

        Self {
            collection,
            card,
            note,
            note_type,
        }
    }

    pub fn context(&self) -> RenderContext<'_> {
        RenderContext::from_existing_card(
            &self.collection,
            &self.card,
            &self.note,
            &self.note_type,
            false,
        )
    }

    pub fn browser_context(&self) -> RenderContext<'_> {
        RenderContext::from_existing_card(
            &self.collection,
            &self.card,
            &self.note,
            &self.note_type,
            true,
        )
    }

    pub fn preview_context(&self, template: CardTemplate, fill_empty: bool) -> RenderContext<'_> {
        RenderContext::from_card_layout(
            &self.collection,
            &self.note,
            &self.card,
            &self.note_type,
            template,
            fill_empty,
        )
    }
}
