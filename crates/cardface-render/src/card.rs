//! Cards, notes, and note types as the renderer sees them.
//!
//! These are read-only views: the renderer never modifies or persists them.
//! A [`Note`] holds field values, its [`NoteType`] holds the field names,
//! card templates, and stylesheet, and a [`Card`] selects one template by
//! ordinal.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a card.
    CardId
);
id_type!(
    /// Identifier of a note.
    NoteId
);
id_type!(
    /// Identifier of a deck.
    DeckId
);
id_type!(
    /// Identifier of a note type.
    NotetypeId
);

/// One reviewable card generated from a note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    /// Index of the card template this card was generated from.
    pub ord: u16,
    pub deck_id: DeckId,
    /// Home deck while the card sits in a filtered deck; zero otherwise.
    #[serde(default)]
    pub original_deck_id: DeckId,
    /// Packed flag bits; the low three hold the user flag.
    #[serde(default)]
    pub flags: u8,
}

impl Card {
    /// The user-assigned flag, 0 when no flag is set.
    pub fn user_flag(&self) -> u8 {
        self.flags & 0b111
    }

    /// The deck the card is currently reviewed from.
    pub fn current_deck_id(&self) -> DeckId {
        if self.original_deck_id.0 != 0 {
            self.original_deck_id
        } else {
            self.deck_id
        }
    }
}

/// A note: an ordered list of named field values plus tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub notetype_id: NotetypeId,
    /// `(field name, field value)` pairs in note type order.
    pub fields: Vec<(String, String)>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Field name/value pairs in note type order.
    pub fn items(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Tags as a single space-separated string.
    pub fn string_tags(&self) -> String {
        self.tags.join(" ")
    }
}

/// The question/answer formats for one card type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub qfmt: String,
    pub afmt: String,
    /// Question format used in the browser, when non-empty.
    #[serde(default)]
    pub bqfmt: String,
    /// Answer format used in the browser, when non-empty.
    #[serde(default)]
    pub bafmt: String,
}

/// Field names, card templates, and styling shared by a set of notes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteType {
    pub id: NotetypeId,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<CardTemplate>,
    #[serde(default)]
    pub css: String,
}

impl NoteType {
    /// The template a card with the given ordinal is generated from.
    pub fn template(&self, ord: u16) -> Option<&CardTemplate> {
        self.templates.get(usize::from(ord))
    }
}

/// Returns the `(question, answer)` formats for a template.
///
/// With `browser` set, the browser-specific formats win when they are
/// non-empty.
pub fn templates_for_card(template: &CardTemplate, browser: bool) -> (&str, &str) {
    (
        prefer_browser(browser, &template.bqfmt, &template.qfmt),
        prefer_browser(browser, &template.bafmt, &template.afmt),
    )
}

fn prefer_browser<'t>(browser: bool, browser_fmt: &'t str, fmt: &'t str) -> &'t str {
    if browser && !browser_fmt.is_empty() {
        browser_fmt
    } else {
        fmt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> CardTemplate {
        CardTemplate {
            name: "Card 1".into(),
            qfmt: "{{Front}}".into(),
            afmt: "{{FrontSide}}<hr>{{Back}}".into(),
            bqfmt: "{{text:Front}}".into(),
            bafmt: String::new(),
        }
    }

    #[test]
    fn test_user_flag_masks_low_bits() {
        let card = Card {
            flags: 0b1010_0011,
            ..Default::default()
        };
        assert_eq!(card.user_flag(), 3);
    }

    #[test]
    fn test_current_deck_prefers_original() {
        let mut card = Card {
            deck_id: DeckId(5),
            ..Default::default()
        };
        assert_eq!(card.current_deck_id(), DeckId(5));
        card.original_deck_id = DeckId(2);
        assert_eq!(card.current_deck_id(), DeckId(2));
    }

    #[test]
    fn test_note_lookup() {
        let note = Note {
            fields: vec![("Front".into(), "2+2".into()), ("Back".into(), "4".into())],
            tags: vec!["math".into(), "easy".into()],
            ..Default::default()
        };
        assert_eq!(note.get("Back"), Some("4"));
        assert_eq!(note.get("Missing"), None);
        assert_eq!(note.string_tags(), "math easy");
    }

    #[test]
    fn test_templates_for_review() {
        let t = template();
        assert_eq!(templates_for_card(&t, false), ("{{Front}}", "{{FrontSide}}<hr>{{Back}}"));
    }

    #[test]
    fn test_templates_for_browser_fall_back_when_empty() {
        let t = template();
        assert_eq!(
            templates_for_card(&t, true),
            ("{{text:Front}}", "{{FrontSide}}<hr>{{Back}}")
        );
    }

    #[test]
    fn test_id_display_and_serde() {
        assert_eq!(CardId(42).to_string(), "42");
        assert_eq!(serde_json::to_string(&DeckId(7)).unwrap(), "7");
    }
}
