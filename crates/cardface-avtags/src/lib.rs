//! Sound and text-to-speech directive extraction for rendered card text.
//!
//! Rendered card sides may carry two kinds of embedded playback directives:
//!
//! - `[sound:filename]` for an audio or video file
//! - `[anki:tts lang=ja_JP voices=Kyoko,Otoya speed=1.2]text[/anki:tts]` for
//!   text that should be spoken
//!
//! [`extract_av_tags`] pulls these out of the text, returning the cleaned text
//! and the directives in document order.
//!
//! # Example
//!
//! ```rust
//! use cardface_avtags::{extract_av_tags, AvTag, CardSide, PlayTagMode};
//!
//! let out = extract_av_tags("hello [sound:hi.mp3]", CardSide::Question, PlayTagMode::Strip);
//! assert_eq!(out.text, "hello ");
//! assert_eq!(out.tags, vec![AvTag::SoundOrVideo { filename: "hi.mp3".into() }]);
//!
//! // Keep a reference the display layer can turn into a play button
//! let out = extract_av_tags("hello [sound:hi.mp3]", CardSide::Answer, PlayTagMode::Reference);
//! assert_eq!(out.text, "hello [anki:play:a:0]");
//! ```
//!
//! # Malformed Directives
//!
//! A `[sound:` without a closing bracket, an empty filename, a TTS opening
//! tag without a matching `[/anki:tts]`, or an orphan closing tag are all
//! left in the text unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const SOUND_PREFIX: &str = "[sound:";
const TTS_OPEN: &str = "[anki:tts";
const TTS_CLOSE: &str = "[/anki:tts]";

/// Speech rate used when a TTS directive has no valid `speed` argument.
pub const DEFAULT_TTS_SPEED: f32 = 1.0;

/// Which face of the card a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSide {
    Question,
    Answer,
}

impl CardSide {
    fn play_marker(self) -> char {
        match self {
            CardSide::Question => 'q',
            CardSide::Answer => 'a',
        }
    }
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSide::Question => write!(f, "question"),
            CardSide::Answer => write!(f, "answer"),
        }
    }
}

/// What to leave in the text where a directive was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayTagMode {
    /// Remove the directive entirely.
    #[default]
    Strip,

    /// Replace the directive with `[anki:play:q:N]` / `[anki:play:a:N]`,
    /// where `N` is the directive's index in the side's tag list.
    Reference,
}

/// A text-to-speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsTag {
    /// The text to speak, with HTML markup removed.
    pub field_text: String,
    /// Underscored language code, e.g. `en_US`.
    pub lang: String,
    /// Preferred voices, most preferred first.
    pub voices: Vec<String>,
    /// Any `key=value` arguments not understood here, in source order.
    pub other_args: Vec<String>,
    pub speed: f32,
}

/// A playback directive extracted from rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvTag {
    SoundOrVideo {
        filename: String,
    },
    #[serde(rename = "text_to_speech")]
    Tts(TtsTag),
}

/// Result of [`extract_av_tags`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvExtraction {
    pub text: String,
    pub tags: Vec<AvTag>,
}

/// Extracts all playback directives from `text`.
///
/// Tags are returned in the order they appear. The `side` only matters in
/// [`PlayTagMode::Reference`] mode, where it selects the `q`/`a` marker.
pub fn extract_av_tags(text: &str, side: CardSide, mode: PlayTagMode) -> AvExtraction {
    let tokens = Tokenizer::new(text).collect::<Vec<_>>();
    let mut output = String::with_capacity(text.len());
    let mut tags = Vec::new();
    // Once a search for a close fails, no later opening tag can find one.
    let mut no_close_left = false;

    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(raw) | Token::TtsClose(raw) => output.push_str(raw),
            Token::Sound { filename, .. } => {
                emit_directive(&mut output, side, mode, tags.len());
                tags.push(AvTag::SoundOrVideo {
                    filename: (*filename).to_string(),
                });
            }
            Token::TtsOpen { raw, .. } if no_close_left => output.push_str(raw),
            Token::TtsOpen { raw, args } => match find_close(&tokens[i + 1..]) {
                Some(offset) => {
                    let content: String = tokens[i + 1..i + 1 + offset]
                        .iter()
                        .map(Token::raw)
                        .collect();
                    emit_directive(&mut output, side, mode, tags.len());
                    tags.push(AvTag::Tts(parse_tts(args, &content)));
                    i += offset + 1;
                }
                None => {
                    no_close_left = true;
                    output.push_str(raw);
                }
            },
        }
        i += 1;
    }

    AvExtraction { text: output, tags }
}

/// Removes all playback directives, discarding them.
pub fn strip_av_tags(text: &str) -> String {
    extract_av_tags(text, CardSide::Question, PlayTagMode::Strip).text
}

fn emit_directive(output: &mut String, side: CardSide, mode: PlayTagMode, index: usize) {
    if mode == PlayTagMode::Reference {
        output.push_str(&format!("[anki:play:{}:{}]", side.play_marker(), index));
    }
}

/// Finds the first closing TTS tag. TTS directives do not nest.
fn find_close(tokens: &[Token]) -> Option<usize> {
    tokens.iter().position(|t| matches!(t, Token::TtsClose(_)))
}

fn parse_tts(args: &str, content: &str) -> TtsTag {
    let mut tag = TtsTag {
        field_text: strip_html_for_tts(content),
        lang: String::new(),
        voices: Vec::new(),
        other_args: Vec::new(),
        speed: DEFAULT_TTS_SPEED,
    };

    for arg in args.split_whitespace() {
        match arg.split_once('=') {
            Some(("lang", value)) => tag.lang = value.to_string(),
            Some(("voices", value)) => {
                tag.voices = value
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Some(("speed", value)) => match value.parse::<f32>() {
                Ok(speed) if speed > 0.0 => tag.speed = speed,
                _ => tag.other_args.push(arg.to_string()),
            },
            _ => tag.other_args.push(arg.to_string()),
        }
    }

    tag
}

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|<div>").expect("valid regex"));

/// Removes markup so only speakable text remains.
fn strip_html_for_tts(html: &str) -> String {
    let spaced = LINE_BREAK.replace_all(html, " ");
    let stripped = HTML_TAG.replace_all(&spaced, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Plain text, including brackets that do not start a directive.
    Text(&'a str),
    /// `[sound:filename]`
    Sound { raw: &'a str, filename: &'a str },
    /// `[anki:tts args]`
    TtsOpen { raw: &'a str, args: &'a str },
    /// `[/anki:tts]`
    TtsClose(&'a str),
}

impl<'a> Token<'a> {
    fn raw(&self) -> &'a str {
        match self {
            Token::Text(raw) | Token::TtsClose(raw) => *raw,
            Token::Sound { raw, .. } | Token::TtsOpen { raw, .. } => *raw,
        }
    }
}

/// Tokenizer for playback directives.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Attempts to read a directive at the start of `remaining`, which begins with `[`.
    fn directive(remaining: &'a str) -> Option<Token<'a>> {
        if remaining.starts_with(TTS_CLOSE) {
            return Some(Token::TtsClose(&remaining[..TTS_CLOSE.len()]));
        }

        let close = remaining.find(']')?;
        let raw = &remaining[..=close];

        if let Some(filename) = raw[..close].strip_prefix(SOUND_PREFIX) {
            if filename.is_empty() {
                return None;
            }
            return Some(Token::Sound { raw, filename });
        }

        if let Some(args) = raw[..close].strip_prefix(TTS_OPEN) {
            // `[anki:ttsfoo]` is not a directive
            if args.is_empty() || args.starts_with(char::is_whitespace) {
                return Some(Token::TtsOpen {
                    raw,
                    args: args.trim(),
                });
            }
        }

        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];

        match remaining.find('[') {
            Some(0) => {
                if let Some(token) = Self::directive(remaining) {
                    self.pos += token.raw().len();
                    Some(token)
                } else {
                    // A bracket that starts no directive is literal text
                    self.pos += 1;
                    Some(Token::Text(&remaining[..1]))
                }
            }
            Some(bracket_pos) => {
                self.pos += bracket_pos;
                Some(Token::Text(&remaining[..bracket_pos]))
            }
            None => {
                self.pos = self.input.len();
                Some(Token::Text(remaining))
            }
        }
    }
}
