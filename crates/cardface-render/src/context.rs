//! Per-render state handed to every filter callback.
//!
//! A [`RenderContext`] lives for exactly one render. It borrows the
//! collection, card, note, and note type, and it must not outlive them. It is
//! deliberately not `Sync`: each concurrent render builds its own.
//!
//! # Sharing State Between Filters
//!
//! Callbacks get `&RenderContext`, and can still pass information to later
//! callbacks in the same render through [`RenderContext::extra_state_mut`]:
//!
//! ```rust,ignore
//! hooks.add_field_filter(|text, _field, filter, ctx| {
//!     if filter != "count" {
//!         return Ok(text.to_string());
//!     }
//!     let mut state = ctx.extra_state_mut();
//!     let n = state.get("count").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
//!     state.insert("count".into(), n.into());
//!     Ok(format!("{}. {}", n, text))
//! });
//! ```

use once_cell::unsync::OnceCell;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;

use crate::card::{templates_for_card, Card, CardTemplate, Note, NoteType};
use crate::gateway::Collection;

/// Information for the duration of one card render.
pub struct RenderContext<'a> {
    col: &'a dyn Collection,
    card: &'a Card,
    note: &'a Note,
    note_type: &'a NoteType,
    browser: bool,
    template: Option<CardTemplate>,
    fill_empty: bool,
    fields: OnceCell<HashMap<String, String>>,
    extra_state: RefCell<HashMap<String, serde_json::Value>>,
}

impl<'a> RenderContext<'a> {
    /// Context for rendering a stored card, e.g. during review.
    ///
    /// With `browser` set, the browser formats are used and render observers
    /// are not notified.
    pub fn from_existing_card(
        col: &'a dyn Collection,
        card: &'a Card,
        note: &'a Note,
        note_type: &'a NoteType,
        browser: bool,
    ) -> Self {
        Self {
            col,
            card,
            note,
            note_type,
            browser,
            template: None,
            fill_empty: false,
            fields: OnceCell::new(),
            extra_state: RefCell::new(HashMap::new()),
        }
    }

    /// Context for previewing an uncommitted note and template in the card
    /// layout editor.
    pub fn from_card_layout(
        col: &'a dyn Collection,
        note: &'a Note,
        card: &'a Card,
        note_type: &'a NoteType,
        template: CardTemplate,
        fill_empty: bool,
    ) -> Self {
        Self {
            col,
            card,
            note,
            note_type,
            browser: false,
            template: Some(template),
            fill_empty,
            fields: OnceCell::new(),
            extra_state: RefCell::new(HashMap::new()),
        }
    }

    pub fn col(&self) -> &'a dyn Collection {
        self.col
    }

    /// The card being rendered.
    pub fn card(&self) -> &'a Card {
        self.card
    }

    pub fn note(&self) -> &'a Note {
        self.note
    }

    pub fn note_type(&self) -> &'a NoteType {
        self.note_type
    }

    pub fn browser(&self) -> bool {
        self.browser
    }

    /// The uncommitted template being previewed, if any.
    pub fn template_override(&self) -> Option<&CardTemplate> {
        self.template.as_ref()
    }

    /// True when rendering an uncommitted template from the layout editor.
    pub fn is_preview(&self) -> bool {
        self.template.is_some()
    }

    pub fn fill_empty(&self) -> bool {
        self.fill_empty
    }

    /// Scratch values shared by the filters of this render.
    pub fn extra_state(&self) -> Ref<'_, HashMap<String, serde_json::Value>> {
        self.extra_state.borrow()
    }

    /// Mutable access to the scratch values.
    ///
    /// # Panics
    ///
    /// Panics if a borrow from [`extra_state`](Self::extra_state) is still held.
    pub fn extra_state_mut(&self) -> RefMut<'_, HashMap<String, serde_json::Value>> {
        self.extra_state.borrow_mut()
    }

    /// Returns a copy of one scratch value.
    pub fn get_extra(&self, key: &str) -> Option<serde_json::Value> {
        self.extra_state.borrow().get(key).cloned()
    }

    /// Stores a scratch value, returning the previous one.
    pub fn set_extra(
        &self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.extra_state.borrow_mut().insert(key.into(), value.into())
    }

    /// Note fields merged with the special fields `Tags`, `Type`, `Deck`,
    /// `Subdeck`, `Card`, and `CardFlag`.
    ///
    /// Computed on first use and kept for the rest of the render.
    #[deprecated(since = "0.2.0", note = "use note() or card() instead")]
    pub fn fields(&self) -> &HashMap<String, String> {
        self.fields.get_or_init(|| {
            tracing::debug!(card = %self.card.id, "building legacy field map");
            self.build_legacy_fields()
        })
    }

    fn build_legacy_fields(&self) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = self.note.items().iter().cloned().collect();

        fields.insert("Tags".into(), self.note.string_tags().trim().to_string());
        fields.insert("Type".into(), self.note_type.name.clone());

        let deck = self
            .col
            .deck_name(self.card.current_deck_id())
            .unwrap_or_default();
        fields.insert("Subdeck".into(), deck_basename(&deck).to_string());
        fields.insert("Deck".into(), deck);

        let card_name = self
            .template
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default();
        fields.insert("Card".into(), card_name);

        let flag = match self.card.user_flag() {
            0 => String::new(),
            n => format!("flag{}", n),
        };
        fields.insert("CardFlag".into(), flag);

        fields
    }

    /// The card's stored question format.
    pub fn qfmt(&self) -> Option<&'a str> {
        self.stored_template()
            .map(|t| templates_for_card(t, self.browser).0)
    }

    /// The card's stored answer format.
    pub fn afmt(&self) -> Option<&'a str> {
        self.stored_template()
            .map(|t| templates_for_card(t, self.browser).1)
    }

    fn stored_template(&self) -> Option<&'a CardTemplate> {
        self.note_type.template(self.card.ord)
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("card", &self.card.id)
            .field("note", &self.note.id)
            .field("note_type", &self.note_type.name)
            .field("browser", &self.browser)
            .field("template", &self.template.as_ref().map(|t| &t.name))
            .field("fill_empty", &self.fill_empty)
            .field("extra_state", &self.extra_state.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Last component of a `::`-separated deck name.
fn deck_basename(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}
