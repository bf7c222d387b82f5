//! Color code translation for player-facing messages.
//!
//! Config authors write `&c` style codes. Clients render `§c`. A marker
//! followed by a valid code character is rewritten with the section sign and
//! the code lowercased. Everything else passes through untouched.

use regex_lite::{Captures, Regex};
use std::sync::OnceLock;

/// Marker character used in config files.
pub const ALT_COLOR_MARKER: char = '&';

/// Marker character understood by clients.
pub const COLOR_CHAR: char = '§';

fn color_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&([0-9A-Fa-fK-Ok-oRrXx])").expect("color code pattern is valid")
    })
}

fn formatted_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"§.").expect("formatted code pattern is valid"))
}

/// Translate `&`-prefixed color codes into client formatting codes.
pub fn translate_color_codes(text: &str) -> String {
    color_code_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}{}", COLOR_CHAR, caps[1].to_ascii_lowercase())
        })
        .into_owned()
}

/// Remove client formatting codes, for plain-text output.
pub fn strip_color_codes(text: &str) -> String {
    formatted_code_pattern().replace_all(text, "").into_owned()
}
