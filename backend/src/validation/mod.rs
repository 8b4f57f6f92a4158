//! Header-shape validation for input files and column checks for output.
//!
//! Inputs are checked as soon as they are parsed, before any field is read:
//! every expected header must be present, extra headers are tolerated since
//! Shopify adds columns between exports.

use crate::api::logs::log_warning;
use crate::error::InputError;
use crate::models::columns::{
    INVENTORY_COLUMNS, ON_HAND, ON_HAND_CURRENT, PRODUCT_COLUMNS,
};
use crate::models::Record;

/// Expected headers that are missing from `headers`.
pub fn missing_headers<'a>(expected: &[&'a str], headers: &[String]) -> Vec<&'a str> {
    expected
        .iter()
        .filter(|e| !headers.iter().any(|h| h == *e))
        .copied()
        .collect()
}

/// Fail with [`InputError::WrongHeaders`] unless every expected header is present.
///
/// Each missing header is logged as a warning first, so the user can see
/// which columns tripped the check.
pub fn check_headers(
    name: &str,
    label: &str,
    expected: &[&str],
    headers: &[String],
) -> Result<(), InputError> {
    let missing = missing_headers(expected, headers);
    if missing.is_empty() {
        return Ok(());
    }

    for header in &missing {
        log_warning(format!("{} csv missing possible header: {}", name, header));
    }

    Err(InputError::WrongHeaders {
        label: label.to_string(),
        expected: expected.iter().map(|s| s.to_string()).collect(),
        got: headers.to_vec(),
    })
}

/// Shopify inventory export: fixed columns plus either on-hand layout.
pub fn check_inventory_headers(label: &str, headers: &[String]) -> Result<(), InputError> {
    let on_hand = if headers.iter().any(|h| h == ON_HAND) {
        ON_HAND
    } else {
        ON_HAND_CURRENT
    };
    let mut expected: Vec<&str> = INVENTORY_COLUMNS.to_vec();
    expected.push(on_hand);
    check_headers("shopify-inventory", label, &expected, headers)
}

/// Shopify product export: the full product column set.
pub fn check_product_headers(label: &str, headers: &[String]) -> Result<(), InputError> {
    check_headers("shopify-products", label, PRODUCT_COLUMNS, headers)
}

/// Columns carried by `records` that fall outside `allowed`.
///
/// Used before serializing to report pass-through columns that the output
/// layout drops.
pub fn stray_columns<'a, I>(records: I, allowed: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut stray: Vec<String> = Vec::new();
    for record in records {
        for column in record.columns() {
            if !allowed.contains(&column) && !stray.iter().any(|s| s == column) {
                stray.push(column.to_string());
            }
        }
    }
    stray
}
