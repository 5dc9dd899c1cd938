//! Matching text-to-speech directives to installed voices.
//!
//! A template asks for speech with `{{tts ja_JP voices=Kyoko,Otoya:Field}}`.
//! Each speech backend reports the voices it has, and the player with the
//! highest-ranked match speaks the text:
//!
//! - the first requested voice that exists for the language ranks
//!   `default_rank`, the second `default_rank - 1`, and so on
//! - failing that, any voice for the language ranks [`LANGUAGE_FALLBACK_RANK`]
//!
//! Requested voice names cannot contain spaces, so underscores in them stand
//! for spaces.

use cardface_avtags::TtsTag;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::RenderContext;
use crate::error::FilterError;

/// Rank of a voice chosen only because it speaks the right language.
pub const LANGUAGE_FALLBACK_RANK: i32 = -100;

/// Filter name that renders the list of installed voices.
pub const TTS_VOICES_FILTER: &str = "tts-voices";

/// A voice offered by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsVoice {
    pub name: String,
    /// Underscored language code, e.g. `en_US`.
    pub lang: String,
    /// Listed but not currently usable, e.g. a missing language pack.
    #[serde(default)]
    pub unavailable: bool,
}

impl TtsVoice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            unavailable: false,
        }
    }
}

impl fmt::Display for TtsVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{tts {} voices={}}}}}", self.lang, self.name)?;
        if self.unavailable {
            write!(f, " (unavailable)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceMatch<'v> {
    pub voice: &'v TtsVoice,
    pub rank: i32,
}

/// Picks the voice that should speak `tag`, if any can.
pub fn voice_for_tag<'v>(
    available: &'v [TtsVoice],
    tag: &TtsTag,
    default_rank: i32,
) -> Option<VoiceMatch<'v>> {
    let mut rank = default_rank;
    for requested in &tag.voices {
        let requested = requested.replace('_', " ");
        let found = available
            .iter()
            .find(|v| v.lang == tag.lang && v.name == requested);
        if let Some(voice) = found {
            return Some(VoiceMatch { voice, rank });
        }
        rank -= 1;
    }

    available
        .iter()
        .find(|v| v.lang == tag.lang)
        .map(|voice| VoiceMatch {
            voice,
            rank: LANGUAGE_FALLBACK_RANK,
        })
}

/// Builds a field filter that answers `tts-voices` with an HTML list of
/// `voices`, sorted by language then name.
///
/// ```rust
/// use cardface_render::{tts_voices_filter, Hooks, TtsVoice};
///
/// let voices = vec![TtsVoice::new("Kyoko", "ja_JP")];
/// let hooks = Hooks::new().field_filter(tts_voices_filter(voices));
/// ```
pub fn tts_voices_filter(
    mut voices: Vec<TtsVoice>,
) -> impl Fn(&str, &str, &str, &RenderContext<'_>) -> Result<String, FilterError>
       + Send
       + Sync
       + 'static {
    voices.sort_by(|a, b| (&a.lang, &a.name).cmp(&(&b.lang, &b.name)));
    let html = voice_list_html(&voices);
    move |text: &str, _field: &str, filter: &str, _ctx: &RenderContext<'_>| {
        if filter == TTS_VOICES_FILTER {
            Ok(html.clone())
        } else {
            Ok(text.to_string())
        }
    }
}

fn voice_list_html(voices: &[TtsVoice]) -> String {
    let list = voices
        .iter()
        .map(TtsVoice::to_string)
        .collect::<Vec<_>>()
        .join("<br>");
    let mut buf = format!(
        "<div style='font-size: 14px; text-align: left;'>TTS voices available:<br>{}",
        list
    );
    if voices.iter().any(|v| v.unavailable) {
        buf.push_str("<div>One or more voices are unavailable.");
        buf.push_str(" Installing a Windows language pack may help.</div>");
    }
    buf.push_str("</div>");
    buf
}
