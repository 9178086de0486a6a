//! Legacy escape handling.
//!
//! Trees that went through the XML export/import round trip come back with
//! `&`, `>`, `<`, `"` and `'` spelled as the bare codes `u0026`, `u003e`, `u003c`,
//! `u0022` and `u0027`. Decoding is a plain string substitution kept behind
//! [`EscapeDecoder`] so the compiler does not depend on it directly.

use std::borrow::Cow;

pub const ENCODED_AMPERSAND: &str = "u0026";
pub const ENCODED_GREATER_THAN: &str = "u003e";
pub const ENCODED_LESS_THAN: &str = "u003c";
pub const ENCODED_DOUBLE_QUOTE: &str = "u0022";
pub const ENCODED_SINGLE_QUOTE: &str = "u0027";

pub trait EscapeDecoder: Sync {
    /// Decode a resolved selector right before its declarations are attached.
    fn decode_selector<'a>(&self, selector: &'a str) -> Cow<'a, str>;

    /// Decode a string property value.
    fn decode_value<'a>(&self, value: &'a str) -> Cow<'a, str>;

    /// Replace every encoded parent reference in `key` with `parent`.
    /// Returns `None` when `key` carries no encoded reference.
    fn substitute_parent(&self, key: &str, parent: &str) -> Option<String>;
}

/// Decoder for trees that may have been exported as XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEscapes;

impl EscapeDecoder for LegacyEscapes {
    fn decode_selector<'a>(&self, selector: &'a str) -> Cow<'a, str> {
        replace_codes(
            selector,
            &[
                (ENCODED_GREATER_THAN, ">"),
                (ENCODED_LESS_THAN, "<"),
                (ENCODED_DOUBLE_QUOTE, "\""),
                (ENCODED_SINGLE_QUOTE, "'"),
            ],
        )
    }

    fn decode_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        replace_codes(
            value,
            &[(ENCODED_DOUBLE_QUOTE, "\""), (ENCODED_SINGLE_QUOTE, "'")],
        )
    }

    fn substitute_parent(&self, key: &str, parent: &str) -> Option<String> {
        if key.contains(ENCODED_AMPERSAND) {
            Some(key.replace(ENCODED_AMPERSAND, parent))
        } else {
            None
        }
    }
}

/// Passthrough decoder for trees known to never have been exported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscapes;

impl EscapeDecoder for NoEscapes {
    fn decode_selector<'a>(&self, selector: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(selector)
    }

    fn decode_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(value)
    }

    fn substitute_parent(&self, _key: &str, _parent: &str) -> Option<String> {
        None
    }
}

fn replace_codes<'a>(input: &'a str, codes: &[(&str, &str)]) -> Cow<'a, str> {
    if !codes.iter().any(|(code, _)| input.contains(code)) {
        return Cow::Borrowed(input);
    }
    let mut out = input.to_string();
    for (code, replacement) in codes {
        if out.contains(code) {
            out = out.replace(code, replacement);
        }
    }
    Cow::Owned(out)
}

/// HTML-entity escape the comparison characters of a selector so the compiled
/// CSS survives being stored inside an HTML attribute.
pub fn escape_selector(selector: &str) -> Cow<'_, str> {
    if !selector.contains('>') && !selector.contains('<') {
        return Cow::Borrowed(selector);
    }
    Cow::Owned(selector.replace('>', "&gt;").replace('<', "&lt;"))
}
