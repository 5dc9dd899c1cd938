//! Filters the engine applies itself.
//!
//! | Filter | Effect |
//! |--------|--------|
//! | `text` | strips HTML markup and decodes common entities |
//! | `tts <lang> [key=value ..]` | wraps the text in an `[anki:tts ..]` directive |
//!
//! Any other filter name is left for the custom filter hooks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Filter that strips HTML.
pub const TEXT_FILTER: &str = "text";

/// Prefix of the text-to-speech filter, e.g. `tts en_US voices=Alex`.
pub const TTS_FILTER_PREFIX: &str = "tts ";

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Applies a built-in filter, or returns `None` if `filter` is not one.
pub(crate) fn apply_builtin(filter: &str, text: &str) -> Option<String> {
    if filter == TEXT_FILTER {
        return Some(strip_html(text));
    }
    if let Some(args) = filter.strip_prefix(TTS_FILTER_PREFIX) {
        return tts_directive(args, text);
    }
    None
}

/// Removes HTML tags and comments, decoding the common entities.
pub fn strip_html(html: &str) -> String {
    let without_comments = HTML_COMMENT.replace_all(html, "");
    let without_tags = HTML_TAG.replace_all(&without_comments, "");
    without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// `tts en_US voices=Alex` over `hello` gives
/// `[anki:tts lang=en_US voices=Alex]hello[/anki:tts]`.
///
/// The first argument must be a language code, not `key=value`.
fn tts_directive(args: &str, text: &str) -> Option<String> {
    let mut args = args.split_whitespace();
    let lang = args.next().filter(|lang| !lang.contains('='))?;

    let mut open = format!("[anki:tts lang={}", lang);
    for arg in args {
        open.push(' ');
        open.push_str(arg);
    }
    Some(format!("{}]{}[/anki:tts]", open, text))
}
