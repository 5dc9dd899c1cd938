//! Render orchestration and the assembled output.
//!
//! ```text
//! partially render ──err──> error card (message on both sides)
//!        │
//!   question nodes → custom filters → AV extraction ─┐ clean question text
//!                                                    ▼
//!   answer nodes → custom filters (FrontSide linked) → AV extraction
//!        │
//!   assemble with note type css → card_did_render observers
//! ```

use cardface_avtags::{AvTag, CardSide};
use serde::{Deserialize, Serialize};

use crate::apply::apply_custom_filters;
use crate::context::RenderContext;
use crate::error::TemplateError;
use crate::hooks::{self, Hooks};
use crate::node::PartiallyRenderedCard;

/// The final, presentable form of a card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderOutput {
    pub question_text: String,
    pub answer_text: String,
    pub question_av_tags: Vec<AvTag>,
    pub answer_av_tags: Vec<AvTag>,
    /// The note type's stylesheet, passed through untouched.
    pub css: String,
}

impl RenderOutput {
    /// Output for a card whose template could not be rendered.
    pub fn from_error(err: &TemplateError) -> Self {
        let message = err.to_string();
        Self {
            question_text: message.clone(),
            answer_text: message,
            ..Default::default()
        }
    }

    pub fn question_and_style(&self) -> String {
        format!("<style>{}</style>{}", self.css, self.question_text)
    }

    pub fn answer_and_style(&self) -> String {
        format!("<style>{}</style>{}", self.css, self.answer_text)
    }
}

impl<'a> RenderContext<'a> {
    /// Renders the card with the process-wide hooks.
    pub fn render(&self) -> RenderOutput {
        let hooks = hooks::snapshot();
        self.render_with_hooks(&hooks)
    }

    /// Renders the card with an explicit set of hooks.
    ///
    /// Never fails: a [`TemplateError`] becomes an output whose question and
    /// answer both carry the error message.
    pub fn render_with_hooks(&self, hooks: &Hooks) -> RenderOutput {
        let card_id = self.card().id;

        let partial = match self.partially_render() {
            Ok(partial) => partial,
            Err(err) => {
                tracing::warn!(card = %card_id, error = %err, "template failed to render");
                return RenderOutput::from_error(&err);
            }
        };
        tracing::debug!(
            card = %card_id,
            question_nodes = partial.qnodes.len(),
            answer_nodes = partial.anodes.len(),
            "partially rendered"
        );

        let col = self.col();

        let qtext = apply_custom_filters(&partial.qnodes, self, hooks, None);
        let qout = col.extract_av_tags(&qtext, CardSide::Question);
        tracing::debug!(card = %card_id, tags = qout.tags.len(), "question side done");

        let front_side = Some(qout.text.as_str());
        let atext = apply_custom_filters(&partial.anodes, self, hooks, front_side);
        let aout = col.extract_av_tags(&atext, CardSide::Answer);
        tracing::debug!(card = %card_id, tags = aout.tags.len(), "answer side done");

        let mut output = RenderOutput {
            question_text: qout.text,
            answer_text: aout.text,
            question_av_tags: qout.tags,
            answer_av_tags: aout.tags,
            css: self.note_type().css.clone(),
        };

        if !self.browser() && !self.is_preview() {
            hooks.run_card_did_render(&mut output, self);
        }

        output
    }

    /// Asks the collection's engine for the card's node lists.
    ///
    /// Previews send the override template as JSON; stored cards are looked
    /// up by id.
    pub fn partially_render(&self) -> Result<PartiallyRenderedCard, TemplateError> {
        let col = self.col();
        match self.template_override() {
            Some(template) => {
                let template = serde_json::to_value(template)?;
                col.render_uncommitted_card(
                    self.note(),
                    self.card().ord,
                    &template,
                    self.fill_empty(),
                )
            }
            None => col.render_existing_card(self.card().id, self.browser()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardTemplate;
    use crate::node::{FieldReplacement, Side};
    use crate::test_support::Fixture;

    fn redacting_hooks() -> Hooks {
        Hooks::new().card_did_render(|output, _ctx| {
            output.answer_text = "[redacted]".into();
        })
    }

    #[test]
    fn test_renders_question_and_answer() {
        let fixture = Fixture::basic();
        let out = fixture.context().render_with_hooks(&Hooks::new());
        assert_eq!(out.question_text, "2+2");
        assert_eq!(out.answer_text, "2+2<hr>4");
        assert_eq!(out.css, ".card { color: black; }");
        assert!(out.question_av_tags.is_empty());
    }

    #[test]
    fn test_error_card() {
        let mut fixture = Fixture::basic();
        fixture.collection.fail_with = Some(TemplateError::FieldNotFound {
            field: "Bakc".into(),
        });
        let out = fixture.context().render_with_hooks(&redacting_hooks());

        let message = "found '{{Bakc}}', but there is no field called 'Bakc'";
        assert_eq!(out.question_text, message);
        assert_eq!(out.answer_text, message);
        assert!(out.question_av_tags.is_empty());
        assert!(out.answer_av_tags.is_empty());
        assert_eq!(out.css, "");
    }

    #[test]
    fn test_answer_links_clean_question() {
        let mut fixture = Fixture::basic();
        fixture.collection.card = PartiallyRenderedCard::new(
            Side::text("hi[sound:a.mp3]"),
            Side::new(vec![
                FieldReplacement::new("FrontSide", "").into(),
                "|[sound:b.mp3]".into(),
            ]),
        );
        let out = fixture.context().render_with_hooks(&Hooks::new());

        assert_eq!(out.question_text, "hi");
        assert_eq!(out.answer_text, "hi|");
        assert_eq!(
            out.question_av_tags,
            vec![AvTag::SoundOrVideo {
                filename: "a.mp3".into()
            }]
        );
        // The question's tag is not repeated on the answer
        assert_eq!(
            out.answer_av_tags,
            vec![AvTag::SoundOrVideo {
                filename: "b.mp3".into()
            }]
        );
    }

    #[test]
    fn test_observer_mutates_output() {
        let fixture = Fixture::basic();
        let out = fixture.context().render_with_hooks(&redacting_hooks());
        assert_eq!(out.answer_text, "[redacted]");
    }

    #[test]
    fn test_observer_skipped_in_browser() {
        let fixture = Fixture::basic();
        let out = fixture.browser_context().render_with_hooks(&redacting_hooks());
        assert_eq!(out.answer_text, "2+2<hr>4");
    }

    #[test]
    fn test_preview_uses_override_and_skips_observer() {
        let fixture = Fixture::basic();
        let template = CardTemplate {
            name: "Preview".into(),
            qfmt: "{{Back}}".into(),
            afmt: "{{Front}}".into(),
            ..Default::default()
        };
        let ctx = fixture.preview_context(template, true);
        let out = ctx.render_with_hooks(&redacting_hooks());

        assert_eq!(out.question_text, "preview");
        assert_ne!(out.answer_text, "[redacted]");

        let sent = fixture.collection.last_template.borrow().clone();
        let sent = sent.expect("override sent to engine");
        assert_eq!(sent["name"], "Preview");
        assert_eq!(sent["qfmt"], "{{Back}}");
        assert_eq!(fixture.collection.last_fill_empty.get(), Some(true));
    }

    #[test]
    fn test_extra_state_shared_across_sides() {
        let mut fixture = Fixture::basic();
        fixture.collection.card = PartiallyRenderedCard::new(
            Side::new(vec![FieldReplacement::new("Front", "a").with_filter("count").into()]),
            Side::new(vec![FieldReplacement::new("Back", "b").with_filter("count").into()]),
        );
        let hooks = Hooks::new().field_filter(|text, _, filter, ctx| {
            if filter != "count" {
                return Ok(text.to_string());
            }
            let n = ctx.get_extra("count").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
            ctx.set_extra("count", n);
            Ok(format!("{}{}", text, n))
        });

        let out = fixture.context().render_with_hooks(&hooks);
        assert_eq!(out.question_text, "a1");
        assert_eq!(out.answer_text, "b2");
    }

    #[test]
    fn test_with_style() {
        let out = RenderOutput {
            question_text: "Q".into(),
            answer_text: "A".into(),
            css: "b{}".into(),
            ..Default::default()
        };
        assert_eq!(out.question_and_style(), "<style>b{}</style>Q");
        assert_eq!(out.answer_and_style(), "<style>b{}</style>A");
    }

    #[test]
    fn test_output_serializes() {
        let fixture = Fixture::basic();
        let out = fixture.context().render_with_hooks(&Hooks::new());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["question_text"], "2+2");
        assert!(json["answer_av_tags"].as_array().unwrap().is_empty());
    }
}
