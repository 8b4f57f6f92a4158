//! HTML entity decoding for supplier exports that escape their text.

use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};
use std::borrow::Cow;

static ENTITY_RX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").ok()
});

fn numeric_entity(body: &str) -> Option<char> {
    let code = match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Decode named (full HTML5 set), decimal and hex entities.
///
/// Unknown entities and bare `&` are left as is, so supplier text that was
/// never escaped passes through untouched.
pub fn decode_html_entities(input: &str) -> Cow<'_, str> {
    let re = match ENTITY_RX.as_ref() {
        Some(re) if input.contains('&') => re,
        _ => return Cow::Borrowed(input),
    };
    re.replace_all(input, |caps: &Captures| {
        let body = &caps[1];
        let decoded = match body.strip_prefix('#') {
            Some(num) => numeric_entity(num).map(String::from),
            None => resolve_html5_entity(body).map(String::from),
        };
        decoded.unwrap_or_else(|| caps[0].to_string())
    })
}
