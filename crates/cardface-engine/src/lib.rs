//! In-memory card collection for `cardface-render`.
//!
//! [`MemoryCollection`] implements every collection trait the renderer
//! needs, backed by a small field-substitution engine:
//!
//! - `{{Field}}` and the special fields `Tags`, `Type`, `Deck`, `Subdeck`,
//!   `Card`, `CardFlag`
//! - filter chains `{{f2:f1:Field}}`, applied right to left, with the
//!   built-ins `text` and `tts <lang>`; the first other filter and all after
//!   it are deferred to the renderer's hooks
//! - browser-specific formats, `fill_empty` previews, and blank front
//!   detection
//!
//! Conditional sections are not supported.
//!
//! # Example
//!
//! ```rust
//! use cardface_engine::MemoryCollection;
//! use cardface_render::{Card, CardId, CardTemplate, Hooks, Note, NoteId, NoteType, NotetypeId};
//!
//! let mut col = MemoryCollection::new();
//! col.add_notetype(NoteType {
//!     id: NotetypeId(1),
//!     name: "Basic".into(),
//!     fields: vec!["Front".into(), "Back".into()],
//!     templates: vec![CardTemplate {
//!         name: "Card 1".into(),
//!         qfmt: "{{Front}}".into(),
//!         afmt: "{{FrontSide}}<hr>{{Back}}".into(),
//!         ..Default::default()
//!     }],
//!     css: String::new(),
//! });
//! col.add_note(Note {
//!     id: NoteId(1),
//!     notetype_id: NotetypeId(1),
//!     fields: vec![("Front".into(), "2+2".into()), ("Back".into(), "4".into())],
//!     tags: vec![],
//! });
//! col.add_card(Card { id: CardId(1), note_id: NoteId(1), ..Default::default() });
//!
//! let output = col.render_context(CardId(1), false).unwrap().render_with_hooks(&Hooks::new());
//! assert_eq!(output.answer_text, "2+2<hr>4");
//! ```

mod collection;
mod filters;
mod template;

pub use collection::{CollectionData, Deck, MemoryCollection};
pub use filters::{strip_html, TEXT_FILTER, TTS_FILTER_PREFIX};
