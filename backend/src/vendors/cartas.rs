//! Cartas: header-less stock export and a separate products CSV.

use super::{non_empty, num, numbered_columns, options_from, Item, Vendor};
use crate::config::SMALL_PARCEL_SHIPPING;
use crate::models::{OptionPair, Record};
use crate::transform::pricing::{number, parse_stock};

/// Cartas never report more than this many units.
const STOCK_CEILING: i64 = 50;

const PROFIT: f64 = 1.35;

fn sku(item: &Item) -> Option<String> {
    non_empty(item, "SKU")
}

fn quantity(item: &Item) -> i64 {
    parse_stock(item.text("Quantity")).min(STOCK_CEILING)
}

fn title(item: &Item) -> String {
    item.text("Title").to_string()
}

pub const CARTAS: Vendor = Vendor {
    update_inventory: true,
    force_headers: Some(&["a", "b", "c", "d", "SKU", "Title", "f", "g", "Quantity", "h"]),
    expected_headers: &["SKU", "Title", "Quantity"],
    ..Vendor::new("cartas", "Cartas Inventory CSV", sku, quantity, title)
};

// =============================================================================
// Products CSV
// =============================================================================

/// Only live products are offered.
fn product_sku(item: &Item) -> Option<String> {
    if item.text("STATUS") == "LIVE" {
        non_empty(item, "CODE")
    } else {
        None
    }
}

fn product_quantity(item: &Item) -> i64 {
    parse_stock(item.text("STOCK")).min(STOCK_CEILING)
}

fn product_title(item: &Item) -> String {
    item.trimmed("PRODUCT_NAME").to_string()
}

/// VAT multiplier from a `20%` style cell.
fn vat_from(item: &Item) -> f64 {
    let raw = item.text("VAT").replace('%', "");
    number(&raw) / 100.0 + 1.0
}

fn price(item: &Item) -> f64 {
    num(item, "TRADE_PRICE") * PROFIT * vat_from(item) + SMALL_PARCEL_SHIPPING
}

fn rrp(item: &Item) -> f64 {
    price(item) * 1.2
}

fn taxable(item: &Item) -> bool {
    vat_from(item) > 1.0
}

fn weight(item: &Item) -> f64 {
    num(item, "WEIGHT")
}

/// Category minus the upper-cased brand prefix, dashes as spaces.
fn product_type(item: &Item) -> String {
    let brand = item.text("BRAND").to_uppercase();
    let category = item.text("CATEGORY");
    let stripped = if brand.is_empty() {
        category.to_string()
    } else {
        category.replacen(&brand, "", 1)
    };
    stripped.replace('-', " ").trim().to_string()
}

fn barcode(item: &Item) -> Option<String> {
    let code = item.text("EAN").replace('"', "");
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(format!("'{}", code))
    }
}

fn brand(item: &Item) -> String {
    item.trimmed("BRAND").to_string()
}

fn description(item: &Item) -> String {
    let text = item.text("DESCRIPTION");
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);
    text.trim().to_string()
}

fn main_image(item: &Item) -> String {
    item.trimmed("MAIN_IMAGE").to_string()
}

fn additional_images(item: &Item) -> Vec<String> {
    numbered_columns(item, "IMAGE_", 1..=4)
}

fn tags(_item: &Item) -> String {
    "new in,cartas,cartas-new-csv".to_string()
}

fn variants(item: &Item) -> Vec<OptionPair> {
    options_from(item, &[("Size", "SIZE"), ("Colour", "COLOUR")])
}

/// The export spells the column `PERANT_ID`; later files fixed it.
fn parent_id(record: &Record) -> Option<String> {
    non_empty(record, "PERANT_ID").or_else(|| non_empty(record, "PARENT_ID"))
}

pub const CARTAS_PRODUCTS: Vendor = Vendor {
    update_products: true,
    add_products: true,
    expected_headers: &[
        "CODE", "STATUS", "PRODUCT_NAME", "DESCRIPTION", "BRAND", "CATEGORY", "TRADE_PRICE",
        "VAT", "STOCK", "EAN", "WEIGHT", "MAIN_IMAGE", "IMAGE_1", "IMAGE_2", "IMAGE_3",
        "IMAGE_4", "SIZE", "COLOUR",
    ],
    get_price: Some(price),
    get_rrp: Some(rrp),
    get_barcode: Some(barcode),
    get_weight: Some(weight),
    get_taxable: Some(taxable),
    get_vendor_name: Some(brand),
    get_description: Some(description),
    get_main_image_url: Some(main_image),
    get_additional_images: Some(additional_images),
    get_variants: Some(variants),
    get_tags: Some(tags),
    get_type: Some(product_type),
    get_variant_correlation_id: Some(parent_id),
    ..Vendor::new(
        "cartas-products",
        "Cartas Products CSV",
        product_sku,
        product_quantity,
        product_title,
    )
};
