//! Blitz: typed-row export with HTML-escaped text and per-SKU courier rates.

use super::{non_empty, num, numbered_columns, options_from, Item, Vendor};
use crate::config::{IN_STOCK_FALLBACK_QUANTITY, SMALL_PARCEL_SHIPPING};
use crate::models::{OptionPair, Record};
use crate::transform::reshape::{typed_rows, TypedRows};

const PROFIT: f64 = 1.40;

const VAT: f64 = 0.2;

/// Courier rates for items too bulky for a small parcel, keyed by raw SKU.
const SHIPPING: &[(&str, f64)] = &[
    ("16098", 42.0),
    ("16829", 15.84),
    ("21891", 18.0),
    ("21892", 18.0),
    ("21893", 18.0),
    ("4021", 15.84),
    ("12836", 15.84),
    ("6371", 42.0),
];

const SHAPE: TypedRows = TypedRows {
    vendor: "blitz",
    kind: "Type",
    sku: "Sku",
    parent_sku: "ParentSku",
    keep: "Title",
};

fn reshape(records: Vec<Record>) -> Vec<Record> {
    typed_rows(records, &SHAPE)
}

fn sku(item: &Item) -> Option<String> {
    non_empty(item, "Sku")
}

/// Blitz only say whether an item is in stock.
fn quantity(item: &Item) -> i64 {
    if item.text("InStock") == "True" {
        IN_STOCK_FALLBACK_QUANTITY
    } else {
        0
    }
}

fn title(item: &Item) -> String {
    item.text("Title").to_string()
}

fn is_taxable(item: &Item) -> bool {
    item.text("Taxable") == "True"
}

fn shipping(raw_sku: &str) -> f64 {
    SHIPPING
        .iter()
        .find(|(sku, _)| *sku == raw_sku)
        .map(|(_, rate)| *rate)
        .unwrap_or(SMALL_PARCEL_SHIPPING)
}

fn price(item: &Item) -> f64 {
    let vat = if is_taxable(item) { VAT } else { 0.0 };
    num(item, "TradePrice") * PROFIT * (1.0 + vat) + shipping(item.text("Sku"))
}

fn rrp(item: &Item) -> f64 {
    num(item, "RetailPrice")
}

fn barcode(item: &Item) -> Option<String> {
    item.get("Ean").map(str::to_string)
}

fn main_image(item: &Item) -> String {
    item.text("ImageUrl").to_string()
}

/// Gallery images belong to the first variant of a product only.
fn additional_images(item: &Item) -> Vec<String> {
    if item.has_parent() {
        return Vec::new();
    }
    numbered_columns(item, "AltImage", 1..=12)
}

fn features(item: &Item) -> Vec<String> {
    numbered_columns(item, "Feature", 1..=5)
}

fn weight(item: &Item) -> f64 {
    num(item, "Weight")
}

fn category(item: &Item) -> String {
    item.text("Category").to_string()
}

fn tags(_item: &Item) -> String {
    "new in,blitz".to_string()
}

fn brand(item: &Item) -> String {
    item.text("Brand").to_string()
}

fn description(item: &Item) -> String {
    item.text("Description").to_string()
}

fn variants(item: &Item) -> Vec<OptionPair> {
    options_from(item, &[("Size", "Size"), ("Colour", "Colour")])
}

fn parent_sku(record: &Record) -> Option<String> {
    non_empty(record, "ParentSku")
}

pub const BLITZ: Vendor = Vendor {
    update_inventory: true,
    update_products: true,
    add_products: true,
    html_decode: true,
    use_barcode_for_exclusive_matching: true,
    use_title_for_matching: true,
    expected_headers: &[
        "Sku", "Type", "ParentSku", "Title", "InStock", "TradePrice", "RetailPrice", "Taxable",
        "Ean", "ImageUrl", "Brand", "Description", "Category", "Weight", "Size", "Colour",
    ],
    // Test item
    deny: &["21682"],
    get_price: Some(price),
    get_rrp: Some(rrp),
    get_barcode: Some(barcode),
    get_weight: Some(weight),
    get_taxable: Some(is_taxable),
    get_vendor_name: Some(brand),
    get_description: Some(description),
    get_main_image_url: Some(main_image),
    get_additional_images: Some(additional_images),
    get_variants: Some(variants),
    get_tags: Some(tags),
    get_type: Some(category),
    get_features: Some(features),
    get_variant_correlation_id: Some(parent_sku),
    parse_import: Some(reshape),
    ..Vendor::new("blitz", "Blitz CSV", sku, quantity, title)
};

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_price_formula() {
        let r = record(&[("Sku", "100"), ("TradePrice", "10"), ("Taxable", "True")]);
        let p = price(&Item::new(&r));
        assert!((p - (10.0 * 1.4 * 1.2 + 5.0)).abs() < 1e-9);
        assert_eq!(crate::transform::pricing::round_price(p), Some(21.99));
    }

    #[test]
    fn test_shipping_override_and_untaxed() {
        let r = record(&[("Sku", "16098"), ("TradePrice", "10"), ("Taxable", "False")]);
        let p = price(&Item::new(&r));
        assert!((p - (14.0 + 42.0)).abs() < 1e-9);
    }

    #[test]
    fn test_quantity_from_stock_flag() {
        assert_eq!(quantity(&Item::new(&record(&[("InStock", "True")]))), 25);
        assert_eq!(quantity(&Item::new(&record(&[("InStock", "False")]))), 0);
    }

    #[test]
    fn test_images_only_on_representative() {
        let r = record(&[("AltImage1", "a.jpg"), ("AltImage12", "l.jpg")]);
        let parent = record(&[]);
        assert_eq!(additional_images(&Item::new(&r)), vec!["a.jpg", "l.jpg"]);
        assert!(additional_images(&Item::with_parent(&r, Some(&parent))).is_empty());
    }

    #[test]
    fn test_denied_test_item() {
        assert!(BLITZ.is_denied("21682"));
    }
}
