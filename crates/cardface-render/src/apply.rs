//! Applying the filters the template engine left unresolved.

use std::borrow::Cow;

use crate::context::RenderContext;
use crate::hooks::Hooks;
use crate::node::{FieldReplacement, RenderedNode, Side};

/// Flattens a side into text, running each replacement's remaining filters
/// through `hooks`.
///
/// A side that is a single literal is returned borrowed, and no hook is
/// called. `front_side` is the rendered question text: when given, a
/// `{{FrontSide}}` replacement starts from it instead of its own text.
/// Pass `None` when rendering the question.
///
/// `side` is never modified, so the same nodes can be applied again.
pub fn apply_custom_filters<'s>(
    side: &'s Side,
    ctx: &RenderContext<'_>,
    hooks: &Hooks,
    front_side: Option<&str>,
) -> Cow<'s, str> {
    if let Some(text) = side.as_fully_rendered() {
        return Cow::Borrowed(text);
    }

    let mut out = String::new();
    for node in side.nodes() {
        match node {
            RenderedNode::Text(text) => out.push_str(text),
            RenderedNode::Replacement(replacement) => {
                out.push_str(&apply_replacement(replacement, ctx, hooks, front_side));
            }
        }
    }
    Cow::Owned(out)
}

fn apply_replacement(
    replacement: &FieldReplacement,
    ctx: &RenderContext<'_>,
    hooks: &Hooks,
    front_side: Option<&str>,
) -> String {
    let start = match front_side {
        Some(front) if replacement.is_front_side() => front,
        _ => replacement.current_text.as_str(),
    };

    replacement
        .filters
        .iter()
        .fold(start.to_string(), |text, filter| {
            tracing::trace!(field = %replacement.field_name, filter = %filter, "applying filter");
            hooks.apply_filter(text, &replacement.field_name, filter, ctx)
        })
}
