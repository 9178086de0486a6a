//! Property Normalizer
//!
//! Turns one `(key, value)` leaf of a style tree into a CSS declaration: dash-case
//! property name, legacy-decoded value, pixel unit inference and `!important`
//! preservation.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt;

use crate::escape::{EscapeDecoder, LegacyEscapes};

const IMPORTANT_SUFFIX: &str = " !important";

lazy_static! {
    /// Properties whose bare numeric values are pixel lengths.
    static ref PIXEL_PROPERTIES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("border-top-width");
        s.insert("border-right-width");
        s.insert("border-bottom-width");
        s.insert("border-left-width");
        s.insert("border-width");
        s.insert("border-bottom-left-radius");
        s.insert("border-bottom-right-radius");
        s.insert("border-top-left-radius");
        s.insert("border-top-right-radius");
        s.insert("border-radius");
        s.insert("bottom");
        s.insert("top");
        s.insert("left");
        s.insert("right");
        s.insert("font-size");
        s.insert("height");
        s.insert("width");
        s.insert("min-height");
        s.insert("min-width");
        s.insert("max-height");
        s.insert("max-width");
        s.insert("margin-left");
        s.insert("margin-right");
        s.insert("margin-top");
        s.insert("margin-bottom");
        s.insert("margin");
        s.insert("padding-left");
        s.insert("padding-right");
        s.insert("padding-top");
        s.insert("padding-bottom");
        s.insert("padding");
        s.insert("outline-width");
        s
    };

    /// Strings made only of digits, dots and minus signs get a `px` suffix. The empty
    /// string matches too.
    static ref NUMERIC_STRING: Regex = Regex::new(r"^[0-9.\-]*$").unwrap();
}

/// A normalized CSS declaration, rendered as `property: value;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {};", self.property, self.value)
    }
}

pub fn is_pixel_property(property: &str) -> bool {
    PIXEL_PROPERTIES.contains(property)
}

/// `marginTop` -> `margin-top`. Names that are already dashed pass through.
///
/// Every uppercase letter that follows a letter or digit starts a new word, so runs
/// of capitals split per letter (`aBC` -> `a-b-c`).
pub fn camel_case_to_dash(name: &str) -> String {
    let mut dashed = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && previous.map_or(false, char::is_alphanumeric) {
            dashed.push('-');
        }
        dashed.extend(c.to_lowercase());
        previous = Some(c);
    }
    dashed
}

/// Normalize with the legacy escape decoder.
pub fn normalize(property: &str, raw: &Value) -> Option<Declaration> {
    normalize_with(&LegacyEscapes, property, raw)
}

/// Returns `None` for values that must not produce a declaration (`false`, `null`)
/// and for nested scopes, which are not leaves.
pub fn normalize_with(
    decoder: &dyn EscapeDecoder,
    property: &str,
    raw: &Value,
) -> Option<Declaration> {
    let property = camel_case_to_dash(property);

    let value = match raw {
        Value::Null | Value::Bool(false) => return None,
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) => {
            let text = format_number(n);
            if !is_zero(n) && is_pixel_property(&property) {
                format!("{}px", text)
            } else {
                text
            }
        }
        Value::String(s) => normalize_string(decoder, s),
        Value::Array(_) | Value::Object(_) => return None,
    };

    Some(Declaration { property, value })
}

fn normalize_string(decoder: &dyn EscapeDecoder, raw: &str) -> String {
    let decoded = decoder.decode_value(raw);

    let (bare, important) = match decoded.strip_suffix(IMPORTANT_SUFFIX) {
        Some(bare) => (bare, true),
        None => (&*decoded, false),
    };

    let mut value = bare.to_string();
    if NUMERIC_STRING.is_match(bare) {
        value.push_str("px");
    }
    if important {
        value.push_str(IMPORTANT_SUFFIX);
    }
    value
}

fn is_zero(n: &Number) -> bool {
    n.as_f64().map(|f| f == 0.0).unwrap_or(false)
}

/// Print numbers the way the editor does: integral floats lose their `.0`, and
/// magnitudes of at least 1e21 or below 1e-6 use exponent notation (`1e+21`, `1e-7`).
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => format_float(f),
        _ => n.to_string(),
    }
}

fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        // `{:e}` prints the shortest mantissa but omits the `+` of positive exponents
        let text = format!("{:e}", f);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }
    format!("{}", f)
}
