//! Common imports for writing filters and rendering cards.
//!
//! ```rust
//! use cardface_render::prelude::*;
//!
//! fn shout(
//!     text: &str,
//!     _field: &str,
//!     filter: &str,
//!     _ctx: &RenderContext<'_>,
//! ) -> Result<String, FilterError> {
//!     Ok(if filter == "shout" { format!("{}!", text.to_uppercase()) } else { text.to_string() })
//! }
//!
//! let hooks = Hooks::new().field_filter(shout);
//! ```

pub use crate::{
    AvTag, Card, CardTemplate, Collection, FieldReplacement, FilterError, Hooks, Note, NoteType,
    PartiallyRenderedCard, RenderContext, RenderOutput, RenderedNode, Side, TemplateError,
};
