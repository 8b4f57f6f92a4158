//! Reydon (also distributes Skechers): full product feed plus a lighter
//! stock-only export.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{non_empty, num, options_from, Item, Vendor};
use crate::config::{LARGE_PARCEL_SHIPPING, SMALL_PARCEL_SHIPPING};
use crate::models::{OptionPair, Record};
use crate::transform::pricing::parse_stock;

/// Any side at or above this length (cm) ships as a large parcel.
const LARGE_PARCEL_CM: f64 = 110.0;

const PROFIT: f64 = 1.45;

static PARENTHESISED: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\([^()]*\)").ok());

fn sku(item: &Item) -> Option<String> {
    non_empty(item, "Sku_Code").map(|s| s.replacen('\n', "", 1))
}

fn title(item: &Item) -> String {
    item.text("Product_Name").to_string()
}

fn quantity(item: &Item) -> i64 {
    parse_stock(item.text("Free_Stock"))
}

fn shipping(item: &Item) -> f64 {
    let largest = ["Width_CM", "Length_CM", "Height_CM"]
        .iter()
        .map(|c| num(item, c))
        .fold(f64::NEG_INFINITY, f64::max);
    if largest >= LARGE_PARCEL_CM {
        LARGE_PARCEL_SHIPPING
    } else {
        SMALL_PARCEL_SHIPPING
    }
}

/// Trade price + profit + VAT + shipping.
fn price(item: &Item) -> f64 {
    num(item, "Your_Price") * PROFIT * (1.0 + num(item, "VAT") / 100.0) + shipping(item)
}

fn rrp(item: &Item) -> f64 {
    price(item) * 1.2
}

fn barcode(item: &Item) -> Option<String> {
    item.get("Barcode").map(str::to_string)
}

fn weight(item: &Item) -> f64 {
    num(item, "Weight_KG")
}

fn taxable(item: &Item) -> bool {
    num(item, "VAT") > 0.0
}

fn brand(item: &Item) -> String {
    item.text("Brand").to_string()
}

fn description(item: &Item) -> String {
    item.text("Description").to_string()
}

fn image(item: &Item) -> String {
    item.text("Image_FTP").to_string()
}

fn variants(item: &Item) -> Vec<OptionPair> {
    options_from(item, &[("Colour", "Colour"), ("Size", "Size")])
}

fn product_name(record: &Record) -> Option<String> {
    Some(record.text("Product_Name").to_string())
}

pub const REYDON: Vendor = Vendor {
    update_inventory: true,
    update_products: true,
    add_products: true,
    use_barcode_for_exclusive_matching: true,
    use_title_for_matching: true,
    expected_headers: &[
        "Sku_Code", "Product_Name", "Description", "Image_File", "Image_FTP", "Size", "Colour",
        "Brand", "VAT", "Barcode", "Trade", "SRP", "Weight_KG", "Length_CM", "Width_CM",
        "Height_CM", "Commodity_Code", "Easy_Store_Quantity", "COFO", "COFO_Code",
        "Product_Parent", "Date_First_Available", "Free_Stock", "Approx_Restock_Date_MMyy",
        "Can_Sell_In", "Cannot_Sell_In", "Product_Material", "Your_Price", "Currency",
        "Price_Updated",
    ],
    get_price: Some(price),
    get_rrp: Some(rrp),
    get_barcode: Some(barcode),
    get_weight: Some(weight),
    get_taxable: Some(taxable),
    get_vendor_name: Some(brand),
    get_description: Some(description),
    get_main_image_url: Some(image),
    get_variant_image_url: Some(image),
    get_variants: Some(variants),
    get_variant_correlation_id: Some(product_name),
    order_by: Some(product_name),
    ..Vendor::new("reydon", "Reydon CSV", sku, quantity, title)
};

// =============================================================================
// Stock-only export
// =============================================================================

fn inventory_sku(item: &Item) -> Option<String> {
    non_empty(item, "Code").map(|s| s.replacen('\n', "", 1))
}

fn inventory_quantity(item: &Item) -> i64 {
    parse_stock(item.text("Quantity"))
}

/// Product name without the bracketed size/colour notes Reydon appends.
fn inventory_title(item: &Item) -> String {
    let name = item.text("Product Name");
    match PARENTHESISED.as_ref() {
        Some(re) => re.replace_all(name, "").into_owned(),
        None => name.to_string(),
    }
}

pub const REYDON_INVENTORY: Vendor = Vendor {
    update_inventory: true,
    use_title_for_matching: true,
    expected_headers: &["Product Name", "Code", "Quantity"],
    ..Vendor::new(
        "reydon-inventory",
        "Reydon Inventory CSV",
        inventory_sku,
        inventory_quantity,
        inventory_title,
    )
};

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_price_small_parcel() {
        let r = record(&[("Your_Price", "10"), ("VAT", "20"), ("Width_CM", "30"), ("Length_CM", "40"), ("Height_CM", "5")]);
        let p = price(&Item::new(&r));
        assert!((p - (10.0 * 1.45 * 1.2 + 5.0)).abs() < 1e-9);
        assert!((rrp(&Item::new(&r)) - p * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_price_large_parcel() {
        let r = record(&[("Your_Price", "10"), ("VAT", "0"), ("Width_CM", "30"), ("Length_CM", "110"), ("Height_CM", "")]);
        let p = price(&Item::new(&r));
        assert!((p - (14.5 + 20.0)).abs() < 1e-9);
        assert!(!taxable(&Item::new(&r)));
    }

    #[test]
    fn test_sku_newline_stripped() {
        let r = record(&[("Sku_Code", "RE123\n")]);
        assert_eq!(sku(&Item::new(&r)), Some("RE123".into()));
    }

    #[test]
    fn test_variant_order_colour_then_size() {
        let r = record(&[("Size", "M"), ("Colour", "Red")]);
        let v = variants(&Item::new(&r));
        assert_eq!(v, vec![OptionPair::new("Colour", "Red"), OptionPair::new("Size", "M")]);
    }

    #[test]
    fn test_inventory_title_strips_brackets() {
        let r = record(&[("Product Name", "Shin Guard (Large) (Blue)")]);
        assert_eq!(inventory_title(&Item::new(&r)), "Shin Guard  ");
    }
}
