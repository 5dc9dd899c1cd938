//! The `render` and `voices` subcommands.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use std::io::Write;

use cardface_engine::MemoryCollection;
use cardface_render::{
    tts_voices_filter, voice_for_tag, AvTag, CardId, Hooks, PlayTagMode, RenderOutput, TtsVoice,
};

use crate::config::CollectionFile;

/// Rank given to the first requested voice.
const DEFAULT_VOICE_RANK: i32 = 0;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Only this card; all cards when unset.
    pub card: Option<i64>,
    pub browser: bool,
    pub json: bool,
    /// Leave `[anki:play:..]` references where directives were.
    pub play_refs: bool,
}

#[derive(Debug, Serialize)]
struct RenderedCard {
    card_id: CardId,
    #[serde(flatten)]
    output: RenderOutput,
}

/// Renders cards from the collection file to `out`.
pub fn render(file: CollectionFile, opts: &RenderOptions, out: &mut dyn Write) -> Result<()> {
    let mode = if opts.play_refs {
        PlayTagMode::Reference
    } else {
        PlayTagMode::Strip
    };
    let (col, voices) = file.into_collection(mode);
    let hooks = Hooks::new().field_filter(tts_voices_filter(voices));

    let mut rendered = Vec::new();
    for card_id in selected_cards(&col, opts.card)? {
        let output = match col.render_context(card_id, opts.browser) {
            Ok(ctx) => ctx.render_with_hooks(&hooks),
            Err(err) => {
                tracing::warn!(card = %card_id, error = %err, "card records are broken");
                RenderOutput::from_error(&err)
            }
        };
        tracing::info!(card = %card_id, "rendered");
        rendered.push(RenderedCard { card_id, output });
    }

    if opts.json {
        serde_json::to_writer_pretty(&mut *out, &rendered)?;
        writeln!(out)?;
        return Ok(());
    }

    for card in &rendered {
        writeln!(out, "{}", style(format!("Card {}", card.card_id)).bold())?;
        write_side(out, "Q", &card.output.question_text, &card.output.question_av_tags)?;
        write_side(out, "A", &card.output.answer_text, &card.output.answer_av_tags)?;
    }
    Ok(())
}

/// Shows which installed voice would speak each TTS directive.
pub fn voices(file: CollectionFile, lang: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let (col, voices) = file.into_collection(PlayTagMode::Strip);
    let hooks = Hooks::new();

    for card_id in selected_cards(&col, None)? {
        let output = match col.render_context(card_id, false) {
            Ok(ctx) => ctx.render_with_hooks(&hooks),
            Err(err) => {
                tracing::warn!(card = %card_id, error = %err, "skipping card");
                continue;
            }
        };
        let tags = output
            .question_av_tags
            .iter()
            .chain(&output.answer_av_tags)
            .filter_map(|tag| match tag {
                AvTag::Tts(tts) => Some(tts),
                AvTag::SoundOrVideo { .. } => None,
            })
            .filter(|tts| lang.map_or(true, |lang| tts.lang == lang));

        for tag in tags {
            match voice_for_tag(&voices, tag, DEFAULT_VOICE_RANK) {
                Some(found) => writeln!(
                    out,
                    "card {}: {} \"{}\" -> {} (rank {})",
                    card_id,
                    tag.lang,
                    tag.field_text,
                    voice_label(found.voice),
                    found.rank
                )?,
                None => writeln!(
                    out,
                    "card {}: {} \"{}\" -> {}",
                    card_id,
                    tag.lang,
                    tag.field_text,
                    style("no voice").yellow()
                )?,
            }
        }
    }
    Ok(())
}

fn selected_cards(col: &MemoryCollection, only: Option<i64>) -> Result<Vec<CardId>> {
    match only {
        Some(id) => {
            let id = CardId(id);
            col.card(id).with_context(|| format!("no card with id {}", id))?;
            Ok(vec![id])
        }
        None => Ok(col.cards().map(|card| card.id).collect()),
    }
}

fn write_side(out: &mut dyn Write, label: &str, text: &str, tags: &[AvTag]) -> Result<()> {
    writeln!(out, "  {}: {}", style(label).cyan(), text)?;
    for tag in tags {
        match tag {
            AvTag::SoundOrVideo { filename } => writeln!(out, "     sound {}", filename)?,
            AvTag::Tts(tts) => writeln!(out, "     tts {} \"{}\"", tts.lang, tts.field_text)?,
        }
    }
    Ok(())
}

fn voice_label(voice: &TtsVoice) -> String {
    if voice.unavailable {
        format!("{} (unavailable)", voice.name)
    } else {
        voice.name.clone()
    }
}
