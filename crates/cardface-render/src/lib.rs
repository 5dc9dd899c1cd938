//! Flashcard question/answer rendering with extensible field filters.
//!
//! `cardface-render` turns a card's template and its note's field values into
//! the final question and answer text. Template grammar lives in an external
//! engine behind the [`PartialRenderer`] trait; this crate owns what happens
//! after the engine is done.
//!
//! # Features
//!
//! - **Node model**: [`Side`]s of [`RenderedNode`]s, as the engine returns them
//! - **Custom filters**: [`Hooks`] resolve filter names the engine did not
//!   recognize, through general callbacks and legacy `fmod_` named callbacks
//! - **Front side linking**: `{{FrontSide}}` on the answer becomes the
//!   rendered question
//! - **Playback directives**: `[sound:..]` and TTS tags are pulled out of the
//!   text into [`AvTag`] lists
//! - **Render observers**: callbacks may edit a [`RenderOutput`] before it is
//!   returned
//!
//! # Rendering a Card
//!
//! ```rust,ignore
//! use cardface_render::{Hooks, RenderContext};
//!
//! let hooks = Hooks::new().field_filter(|text, _field, filter, _ctx| {
//!     Ok(if filter == "upper" { text.to_uppercase() } else { text.to_string() })
//! });
//!
//! let ctx = RenderContext::from_existing_card(&col, &card, &note, &note_type, false);
//! let output = ctx.render_with_hooks(&hooks);
//! println!("{}", output.question_text);
//! ```
//!
//! [`RenderContext::render`] uses the process-wide hooks instead, managed with
//! [`register_general_filter`], [`register_named_filter`],
//! [`register_card_did_render`], and [`unregister`].
//!
//! # Failure
//!
//! Rendering never fails. A [`TemplateError`] from the engine is shown on both
//! sides of the card, and a filter returning [`FilterError`] is skipped.

mod apply;
mod card;
mod context;
mod error;
mod gateway;
mod hooks;
mod node;
mod render;
mod tts;

pub mod prelude;

#[cfg(test)]
mod test_support;

pub use apply::apply_custom_filters;

pub use card::{
    templates_for_card, Card, CardId, CardTemplate, DeckId, Note, NoteId, NoteType, NotetypeId,
};

pub use context::RenderContext;

pub use error::{FilterError, TemplateError, CARD_BLANK_HELP};

pub use gateway::{AvTagExtractor, BuiltinAvExtractor, Collection, DeckNames, PartialRenderer};

pub use hooks::{
    legacy_hook_name, register_card_did_render, register_general_filter, register_named_filter,
    snapshot, unregister, CardDidRenderFn, FieldFilterFn, HookId, Hooks, LegacyFilterFn,
    LEGACY_FILTER_PREFIX,
};

pub use node::{FieldReplacement, PartiallyRenderedCard, RenderedNode, Side, FRONT_SIDE};

pub use render::RenderOutput;

pub use tts::{
    tts_voices_filter, voice_for_tag, TtsVoice, VoiceMatch, LANGUAGE_FALLBACK_RANK,
    TTS_VOICES_FILTER,
};

// Re-export the directive types so callers need only this crate
pub use cardface_avtags::{AvExtraction, AvTag, CardSide, PlayTagMode, TtsTag};
