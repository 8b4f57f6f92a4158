//! Unicorn: stock and barcodes only.

use super::{non_empty, Item, Vendor};
use crate::transform::pricing::parse_stock;

fn sku(item: &Item) -> Option<String> {
    non_empty(item, "SKU")
}

fn quantity(item: &Item) -> i64 {
    parse_stock(item.text("QTY"))
}

fn title(item: &Item) -> String {
    item.text("Description").to_string()
}

fn barcode(item: &Item) -> Option<String> {
    item.get("Barcode EAN/UPC").map(str::to_string)
}

pub const UNICORN: Vendor = Vendor {
    update_inventory: true,
    update_products: true,
    use_barcode_for_exclusive_matching: true,
    expected_headers: &["SKU", "QTY", "Barcode EAN/UPC", "Description"],
    get_barcode: Some(barcode),
    ..Vendor::new("unicorn", "Unicorn CSV", sku, quantity, title)
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_extractors() {
        let r = Record::from_pairs([
            ("SKU", "U-77"),
            ("QTY", "12"),
            ("Barcode EAN/UPC", "5012345678900"),
            ("Description", "Hand Wraps"),
        ]);
        let item = Item::new(&r);
        assert_eq!((UNICORN.get_sku)(&item), Some("U-77".into()));
        assert_eq!((UNICORN.get_quantity)(&item), 12);
        assert_eq!((UNICORN.get_title)(&item), "Hand Wraps");
        assert!(UNICORN.get_price.is_none());
    }
}
