//! SKU and barcode normalization.
//!
//! Spreadsheet tools mangle numeric-looking codes: leading zeros vanish and
//! long numbers turn into scientific notation. Shopify exports therefore carry
//! codes prefixed with `'`, and supplier feeds carry them in any state. Both
//! sides go through the functions here before they are compared.

use std::fmt;

/// Sentinel written when a product has no usable barcode.
pub const BARCODE_DOES_NOT_APPLY: &str = "does not apply";

/// Strip one leading `'` from a SKU. Empty SKUs yield `None`.
pub fn parse_sku(raw: &str) -> Option<&str> {
    let sku = raw.strip_prefix('\'').unwrap_or(raw);
    if sku.is_empty() {
        None
    } else {
        Some(sku)
    }
}

/// Prefix fully numeric, zero-leading SKUs with `'` for the spreadsheet.
///
/// # Example
/// ```
/// use stocksync::transform::normalize::escape_sku;
///
/// assert_eq!(escape_sku("00123"), "'00123");
/// assert_eq!(escape_sku("0A12"), "0A12");
/// assert_eq!(escape_sku("123"), "123");
/// ```
pub fn escape_sku(sku: &str) -> String {
    if sku.starts_with('0') && sku.chars().all(|c| c.is_ascii_digit()) {
        format!("'{}", sku)
    } else {
        sku.to_string()
    }
}

/// A normalized barcode: a 12-digit UPC, a 13-digit EAN, or nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Barcode {
    Valid(String),
    DoesNotApply,
}

impl Barcode {
    pub fn is_valid(&self) -> bool {
        matches!(self, Barcode::Valid(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Barcode::Valid(code) => code,
            Barcode::DoesNotApply => BARCODE_DOES_NOT_APPLY,
        }
    }

    /// Form written back to Shopify: valid codes get a leading `'`.
    pub fn escape(&self) -> String {
        match self {
            Barcode::Valid(code) => format!("'{}", code),
            Barcode::DoesNotApply => BARCODE_DOES_NOT_APPLY.to_string(),
        }
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw barcode.
///
/// Whitespace is trimmed and quote or bracket characters removed. An 11 digit
/// result is assumed to be a UPC-A that lost its leading zero. Anything that
/// does not end up as 12 or 13 digits does not apply.
pub fn parse_barcode(raw: Option<&str>) -> Barcode {
    let Some(raw) = raw else {
        return Barcode::DoesNotApply;
    };

    let mut code: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '[' | ']'))
        .collect();

    if code.len() == 11 {
        code.insert(0, '0');
    }

    if (code.len() == 12 || code.len() == 13) && code.chars().all(|c| c.is_ascii_digit()) {
        Barcode::Valid(code)
    } else {
        Barcode::DoesNotApply
    }
}

/// URL-safe handle fragment: lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
