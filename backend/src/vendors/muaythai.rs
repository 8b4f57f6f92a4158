//! Muay Thai Boxing: parent-marker export where variants carry their EAN as
//! the SKU.

use super::{non_empty, num, numbered_columns, Item, Vendor};
use crate::config::SMALL_PARCEL_SHIPPING;
use crate::models::{OptionPair, Record};
use crate::transform::pricing::parse_stock;
use crate::transform::reshape::{parent_marker, ParentMarker};

/// Orders at or above this price ship free.
const FREE_SHIPPING_FROM: f64 = 20.0;

const SHAPE: ParentMarker = ParentMarker {
    sku: "SKU",
    title: "Name",
    overlays: &[
        ("SKU", "Option EAN"),
        ("EAN", "Option EAN"),
        ("Quantity", "Option quantity"),
        ("Option value", "Option value"),
    ],
};

fn reshape(records: Vec<Record>) -> Vec<Record> {
    parent_marker(records, &SHAPE)
}

fn sku(item: &Item) -> Option<String> {
    non_empty(item, "SKU")
}

fn quantity(item: &Item) -> i64 {
    parse_stock(item.text("Quantity"))
}

fn title(item: &Item) -> String {
    item.text("Name").to_string()
}

fn barcode(item: &Item) -> Option<String> {
    item.get("EAN").map(str::to_string)
}

fn weight(item: &Item) -> f64 {
    num(item, "Weight")
}

fn taxable(_item: &Item) -> bool {
    true
}

fn price(item: &Item) -> f64 {
    let base = num(item, "Price");
    let shipping = if base >= FREE_SHIPPING_FROM { 0.0 } else { SMALL_PARCEL_SHIPPING };
    base * 1.2 + shipping
}

fn description(item: &Item) -> String {
    item.text("Description").to_string()
}

fn manufacturer(item: &Item) -> String {
    item.text("Manufacturer").to_string()
}

fn main_image(item: &Item) -> String {
    item.text("Main image").to_string()
}

fn additional_images(item: &Item) -> Vec<String> {
    numbered_columns(item, "Image ", 2..=5)
}

fn tags(_item: &Item) -> String {
    "mtb, new in".to_string()
}

fn variants(item: &Item) -> Vec<OptionPair> {
    non_empty(item, "Option value")
        .map(|value| vec![OptionPair::new("Variant", value)])
        .unwrap_or_default()
}

fn model(record: &Record) -> Option<String> {
    non_empty(record, "Model")
}

pub const MUAYTHAI: Vendor = Vendor {
    update_inventory: true,
    update_products: true,
    add_products: true,
    use_barcode_for_exclusive_matching: true,
    expected_headers: &[
        "Name", "Model", "SKU", "EAN", "Quantity", "Price", "Option value", "Option EAN",
        "Option quantity",
    ],
    get_barcode: Some(barcode),
    get_weight: Some(weight),
    get_taxable: Some(taxable),
    get_price: Some(price),
    get_description: Some(description),
    get_vendor_name: Some(manufacturer),
    get_main_image_url: Some(main_image),
    get_additional_images: Some(additional_images),
    get_tags: Some(tags),
    get_variants: Some(variants),
    get_variant_correlation_id: Some(model),
    parse_import: Some(reshape),
    ..Vendor::new("muaythai", "Muay Thai Boxing CSV", sku, quantity, title)
};
