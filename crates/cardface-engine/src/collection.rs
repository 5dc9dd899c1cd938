//! An in-memory collection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use cardface_render::{
    templates_for_card, AvExtraction, AvTagExtractor, BuiltinAvExtractor, Card, CardId, CardSide,
    CardTemplate, DeckId, DeckNames, Note, NoteId, NoteType, NotetypeId, PartialRenderer,
    PartiallyRenderedCard, PlayTagMode, RenderContext, TemplateError,
};

use crate::filters::strip_html;
use crate::template::ParsedTemplate;

/// A named deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
}

/// Serializable contents of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionData {
    #[serde(default)]
    pub decks: Vec<Deck>,
    #[serde(default)]
    pub notetypes: Vec<NoteType>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Decks, note types, notes, and cards held in memory, rendered with the
/// field-substitution engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    decks: HashMap<DeckId, String>,
    notetypes: HashMap<NotetypeId, NoteType>,
    notes: HashMap<NoteId, Note>,
    cards: BTreeMap<CardId, Card>,
    extractor: BuiltinAvExtractor,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: CollectionData) -> Self {
        let mut col = Self::new();
        for deck in data.decks {
            col.add_deck(deck.id, deck.name);
        }
        for notetype in data.notetypes {
            col.add_notetype(notetype);
        }
        for note in data.notes {
            col.add_note(note);
        }
        for card in data.cards {
            col.add_card(card);
        }
        col
    }

    /// Selects what extraction leaves in place of playback directives.
    pub fn with_play_tag_mode(mut self, mode: PlayTagMode) -> Self {
        self.extractor = BuiltinAvExtractor::new(mode);
        self
    }

    pub fn add_deck(&mut self, id: DeckId, name: impl Into<String>) {
        self.decks.insert(id, name.into());
    }

    pub fn add_notetype(&mut self, notetype: NoteType) {
        self.notetypes.insert(notetype.id, notetype);
    }

    pub fn add_note(&mut self, note: Note) {
        self.notes.insert(note.id, note);
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn notetype(&self, id: NotetypeId) -> Option<&NoteType> {
        self.notetypes.get(&id)
    }

    /// All cards, in id order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// The card plus the note and note type it renders from.
    pub fn card_records(&self, id: CardId) -> Result<(&Card, &Note, &NoteType), TemplateError> {
        let card = self.card(id).ok_or(TemplateError::NoSuchCard(id))?;
        let note = self
            .note(card.note_id)
            .ok_or_else(|| TemplateError::Engine(format!("note {} not found", card.note_id)))?;
        let notetype = self.notetype_for(note)?;
        Ok((card, note, notetype))
    }

    /// A render context for a stored card.
    pub fn render_context(
        &self,
        id: CardId,
        browser: bool,
    ) -> Result<RenderContext<'_>, TemplateError> {
        let (card, note, notetype) = self.card_records(id)?;
        Ok(RenderContext::from_existing_card(self, card, note, notetype, browser))
    }

    fn notetype_for(&self, note: &Note) -> Result<&NoteType, TemplateError> {
        self.notetype(note.notetype_id).ok_or_else(|| {
            TemplateError::Engine(format!("note type {} not found", note.notetype_id))
        })
    }
}

impl PartialRenderer for MemoryCollection {
    fn render_existing_card(
        &self,
        card_id: CardId,
        browser: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        let (card, note, notetype) = self.card_records(card_id)?;
        let template = notetype
            .template(card.ord)
            .ok_or(TemplateError::NoSuchTemplate { ord: card.ord })?;
        let (qfmt, afmt) = templates_for_card(template, browser);

        let mut fields = note_fields(note, false);
        let deck = self.deck_name(card.current_deck_id()).unwrap_or_default();
        add_special_fields(&mut fields, note, notetype, &template.name, &deck, card.user_flag());

        tracing::debug!(
            card = %card_id,
            browser,
            template = %template.name,
            "rendering stored card"
        );
        render_sides(qfmt, afmt, &fields, true)
    }

    fn render_uncommitted_card(
        &self,
        note: &Note,
        card_ord: u16,
        template: &serde_json::Value,
        fill_empty: bool,
    ) -> Result<PartiallyRenderedCard, TemplateError> {
        let template: CardTemplate = serde_json::from_value(template.clone())?;
        let notetype = self.notetype_for(note)?;

        let mut fields = note_fields(note, fill_empty);
        add_special_fields(&mut fields, note, notetype, &template.name, "", 0);

        tracing::debug!(
            card_ord,
            fill_empty,
            template = %template.name,
            "rendering uncommitted card"
        );
        render_sides(&template.qfmt, &template.afmt, &fields, false)
    }
}

impl AvTagExtractor for MemoryCollection {
    fn extract_av_tags(&self, text: &str, side: CardSide) -> AvExtraction {
        self.extractor.extract_av_tags(text, side)
    }
}

impl DeckNames for MemoryCollection {
    fn deck_name(&self, deck_id: DeckId) -> Option<String> {
        self.decks.get(&deck_id).cloned()
    }
}

fn note_fields(note: &Note, fill_empty: bool) -> HashMap<String, String> {
    note.items()
        .iter()
        .map(|(name, value)| {
            let value = if fill_empty && field_is_empty(value) {
                format!("({})", name)
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

fn add_special_fields(
    fields: &mut HashMap<String, String>,
    note: &Note,
    notetype: &NoteType,
    card_name: &str,
    deck: &str,
    flag: u8,
) {
    fields.insert("Tags".into(), note.string_tags().trim().to_string());
    fields.insert("Type".into(), notetype.name.clone());
    fields.insert("Deck".into(), deck.to_string());
    let subdeck = deck.rsplit("::").next().unwrap_or(deck);
    fields.insert("Subdeck".into(), subdeck.to_string());
    fields.insert("Card".into(), card_name.to_string());
    let flag = if flag == 0 {
        String::new()
    } else {
        format!("flag{}", flag)
    };
    fields.insert("CardFlag".into(), flag);
}

fn field_is_empty(value: &str) -> bool {
    strip_html(value).trim().is_empty()
}

fn render_sides(
    qfmt: &str,
    afmt: &str,
    fields: &HashMap<String, String>,
    check_blank: bool,
) -> Result<PartiallyRenderedCard, TemplateError> {
    let question = ParsedTemplate::parse(qfmt)?;
    let answer = ParsedTemplate::parse(afmt)?;

    if check_blank && question_is_blank(&question, fields) {
        return Err(TemplateError::EmptyFront);
    }

    Ok(PartiallyRenderedCard::new(
        question.render(fields)?,
        answer.render(fields)?,
    ))
}

/// True when the question reads fields and every one of them is empty.
fn question_is_blank(question: &ParsedTemplate<'_>, fields: &HashMap<String, String>) -> bool {
    let mut names = question.field_names().peekable();
    if names.peek().is_none() {
        return false;
    }
    names.all(|name| fields.get(name).map_or(true, |value| field_is_empty(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> MemoryCollection {
        let mut col = MemoryCollection::new();
        col.add_deck(DeckId(1), "Languages::Japanese");
        col.add_notetype(NoteType {
            id: NotetypeId(1),
            name: "Basic".into(),
            fields: vec!["Front".into(), "Back".into()],
            templates: vec![CardTemplate {
                name: "Card 1".into(),
                qfmt: "{{Front}}".into(),
                afmt: "{{FrontSide}}<hr>{{Back}}".into(),
                bqfmt: "{{Subdeck}}: {{text:Front}}".into(),
                bafmt: String::new(),
            }],
            css: String::new(),
        });
        col.add_note(Note {
            id: NoteId(1),
            notetype_id: NotetypeId(1),
            fields: vec![("Front".into(), "<b>2+2</b>".into()), ("Back".into(), "4".into())],
            tags: vec!["math".into()],
        });
        col.add_card(Card {
            id: CardId(1),
            note_id: NoteId(1),
            deck_id: DeckId(1),
            ..Default::default()
        });
        col
    }

    #[test]
    fn test_stored_card_nodes() {
        let col = collection();
        let card = col.render_existing_card(CardId(1), false).unwrap();
        assert_eq!(card.qnodes.as_fully_rendered(), Some("<b>2+2</b>"));
        assert_eq!(card.anodes.len(), 2);
    }

    #[test]
    fn test_browser_format_with_special_fields() {
        let col = collection();
        let card = col.render_existing_card(CardId(1), true).unwrap();
        assert_eq!(card.qnodes.as_fully_rendered(), Some("Japanese: 2+2"));
    }

    #[test]
    fn test_missing_card() {
        let col = collection();
        assert_eq!(
            col.render_existing_card(CardId(9), false).unwrap_err(),
            TemplateError::NoSuchCard(CardId(9))
        );
    }

    #[test]
    fn test_missing_template() {
        let mut col = collection();
        col.add_card(Card {
            id: CardId(2),
            note_id: NoteId(1),
            ord: 3,
            ..Default::default()
        });
        assert_eq!(
            col.render_existing_card(CardId(2), false).unwrap_err(),
            TemplateError::NoSuchTemplate { ord: 3 }
        );
    }

    #[test]
    fn test_blank_front() {
        let mut col = collection();
        col.add_note(Note {
            id: NoteId(1),
            notetype_id: NotetypeId(1),
            fields: vec![("Front".into(), "<br>".into()), ("Back".into(), "4".into())],
            tags: vec![],
        });
        assert_eq!(
            col.render_existing_card(CardId(1), false).unwrap_err(),
            TemplateError::EmptyFront
        );
    }

    #[test]
    fn test_uncommitted_fill_empty() {
        let col = collection();
        let note = Note {
            id: NoteId(0),
            notetype_id: NotetypeId(1),
            fields: vec![("Front".into(), String::new()), ("Back".into(), "4".into())],
            tags: vec![],
        };
        let template = serde_json::json!({
            "name": "Draft",
            "qfmt": "{{Front}}/{{Card}}",
            "afmt": "{{Back}}"
        });

        let card = col.render_uncommitted_card(&note, 0, &template, true).unwrap();
        assert_eq!(card.qnodes.as_fully_rendered(), Some("(Front)/Draft"));

        // Without filling, an empty front is allowed in the editor
        let card = col.render_uncommitted_card(&note, 0, &template, false).unwrap();
        assert_eq!(card.qnodes.as_fully_rendered(), Some("/Draft"));
    }

    #[test]
    fn test_uncommitted_invalid_template() {
        let col = collection();
        let note = col.note(NoteId(1)).unwrap().clone();
        let err = col
            .render_uncommitted_card(&note, 0, &serde_json::json!({"qfmt": 5}), false)
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate(_)));
    }

    #[test]
    fn test_from_yaml_data() {
        let yaml = r#"
decks:
  - id: 1
    name: Default
notetypes:
  - id: 1
    name: Basic
    fields: [Front, Back]
    templates:
      - name: Card 1
        qfmt: "{{Front}}"
        afmt: "{{Back}}"
notes:
  - id: 1
    notetype_id: 1
    fields: [[Front, hello], [Back, world]]
cards:
  - id: 5
    note_id: 1
    ord: 0
    deck_id: 1
"#;
        let data: CollectionData = serde_yaml::from_str(yaml).unwrap();
        let col = MemoryCollection::from_data(data);
        assert_eq!(col.cards().count(), 1);
        assert_eq!(col.deck_name(DeckId(1)).as_deref(), Some("Default"));
        let card = col.render_existing_card(CardId(5), false).unwrap();
        assert_eq!(card.anodes.as_fully_rendered(), Some("world"));
    }
}
