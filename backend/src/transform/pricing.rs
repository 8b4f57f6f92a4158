//! Price, weight and stock arithmetic shared by every vendor formula.

use crate::config::{IN_STOCK_FALLBACK_QUANTITY, MAX_WEIGHT, SALE_RATIO};
use crate::models::columns::{VARIANT_COMPARE_AT_PRICE, VARIANT_PRICE};
use crate::models::Record;

/// Lenient numeric read of a spreadsheet cell.
///
/// Blank reads as `0`, anything that is not a plain decimal number reads as NaN.
pub fn number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    if raw.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Round up to the next whole unit, then price at `.99`.
///
/// Returns `None` for NaN or infinite input so the caller can skip the record.
///
/// # Example
/// ```
/// use stocksync::transform::pricing::round_price;
///
/// assert_eq!(round_price(10.0 * 1.4 * 1.2 + 5.0), Some(21.99));
/// assert_eq!(round_price(f64::NAN), None);
/// ```
pub fn round_price(price: f64) -> Option<f64> {
    if !price.is_finite() {
        return None;
    }
    Some(price.ceil() - 0.01)
}

/// Price as written to the catalog: shortest decimal form, no trailing zeros.
pub fn format_price(price: f64) -> String {
    format!("{}", price)
}

/// Compare two price cells, numerically when both parse.
pub fn same_price(a: &str, b: &str) -> bool {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => (x - y).abs() < 1e-9,
        _ => a.trim() == b.trim(),
    }
}

/// Clamp a weight to the destination schema limit.
pub fn cap_weight(weight: f64) -> f64 {
    weight.min(MAX_WEIGHT)
}

/// Supplier stock figure as an integer quantity.
///
/// Numeric values are truncated; suppliers that only report availability say
/// `True` for in stock, which maps to a fixed fallback. Anything else is 0.
pub fn parse_stock(raw: &str) -> i64 {
    let value = number(raw);
    if value.is_finite() {
        return value.max(0.0) as i64;
    }
    if raw.trim() == "True" {
        IN_STOCK_FALLBACK_QUANTITY
    } else {
        0
    }
}

/// Apply the run's stock cap.
pub fn cap_quantity(quantity: i64, max_quantity: i64) -> i64 {
    quantity.min(max_quantity)
}

/// Whether a catalog row is priced at or below the sale ratio of its
/// compare-at price. Rows without a positive compare-at price are not on sale.
pub fn is_on_sale(row: &Record) -> bool {
    let price = number(row.text(VARIANT_PRICE));
    let rrp = number(row.text(VARIANT_COMPARE_AT_PRICE));
    if !price.is_finite() || !rrp.is_finite() || rrp <= 0.0 {
        return false;
    }
    price / rrp <= SALE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rounding_parity() {
        let raw = 10.0 * 1.4 * 1.2 + 5.0;
        let price = round_price(raw).unwrap();
        assert_eq!(format_price(price), "21.99");
    }

    #[test]
    fn test_whole_number_still_rounds_down_a_penny() {
        assert_eq!(format_price(round_price(22.0).unwrap()), "21.99");
        assert_eq!(format_price(round_price(0.5).unwrap()), "0.99");
    }

    #[test]
    fn test_round_price_rejects_nan() {
        assert_eq!(round_price(number("n/a") * 1.4), None);
        assert_eq!(round_price(f64::INFINITY), None);
    }

    #[test]
    fn test_number_semantics() {
        assert_eq!(number(""), 0.0);
        assert_eq!(number(" 12.5 "), 12.5);
        assert_eq!(number("1e2"), 100.0);
        assert!(number("inf").is_nan());
        assert!(number("True").is_nan());
    }

    #[test]
    fn test_same_price() {
        assert!(same_price("22.00", "22"));
        assert!(same_price("21.99", "21.99"));
        assert!(!same_price("21.99", "22.99"));
        assert!(!same_price("", "21.99"));
    }

    #[test]
    fn test_cap_weight() {
        assert_eq!(cap_weight(1500.0), 999.0);
        assert_eq!(cap_weight(2.5), 2.5);
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("12"), 12);
        assert_eq!(parse_stock("True"), 25);
        assert_eq!(parse_stock("False"), 0);
        assert_eq!(parse_stock("-3"), 0);
    }

    #[test]
    fn test_quantity_cap() {
        assert_eq!(cap_quantity(500, 50), 50);
        assert_eq!(cap_quantity(3, 50), 3);
    }

    #[test]
    fn test_on_sale() {
        let sale = Record::from_pairs([(VARIANT_PRICE, "69.99"), (VARIANT_COMPARE_AT_PRICE, "100")]);
        let full = Record::from_pairs([(VARIANT_PRICE, "89.99"), (VARIANT_COMPARE_AT_PRICE, "100")]);
        let no_rrp = Record::from_pairs([(VARIANT_PRICE, "9.99"), (VARIANT_COMPARE_AT_PRICE, "")]);

        assert!(is_on_sale(&sale));
        assert!(!is_on_sale(&full));
        assert!(!is_on_sale(&no_rrp));
    }
}
