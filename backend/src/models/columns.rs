//! Column names of the Shopify product and inventory exports.

pub const HANDLE: &str = "Handle";
pub const TITLE: &str = "Title";
pub const BODY_HTML: &str = "Body (HTML)";
pub const VENDOR: &str = "Vendor";
pub const PRODUCT_CATEGORY: &str = "Product Category";
pub const TYPE: &str = "Type";
pub const TAGS: &str = "Tags";
pub const PUBLISHED: &str = "Published";
pub const VARIANT_SKU: &str = "Variant SKU";
pub const VARIANT_GRAMS: &str = "Variant Grams";
pub const VARIANT_INVENTORY_TRACKER: &str = "Variant Inventory Tracker";
pub const VARIANT_INVENTORY_QTY: &str = "Variant Inventory Qty";
pub const VARIANT_INVENTORY_POLICY: &str = "Variant Inventory Policy";
pub const VARIANT_FULFILLMENT_SERVICE: &str = "Variant Fulfillment Service";
pub const VARIANT_PRICE: &str = "Variant Price";
pub const VARIANT_COMPARE_AT_PRICE: &str = "Variant Compare At Price";
pub const VARIANT_REQUIRES_SHIPPING: &str = "Variant Requires Shipping";
pub const VARIANT_TAXABLE: &str = "Variant Taxable";
pub const VARIANT_BARCODE: &str = "Variant Barcode";
pub const IMAGE_SRC: &str = "Image Src";
pub const GIFT_CARD: &str = "Gift Card";
pub const VARIANT_IMAGE: &str = "Variant Image";
pub const VARIANT_WEIGHT_UNIT: &str = "Variant Weight Unit";
pub const VARIANT_TAX_CODE: &str = "Variant Tax Code";
pub const INCLUDED_UNITED_KINGDOM: &str = "Included / United Kingdom";
pub const STATUS: &str = "Status";

/// `Option{n} Name` for `n` in `1..=3`.
pub fn option_name(n: usize) -> String {
    format!("Option{} Name", n)
}

/// `Option{n} Value` for `n` in `1..=3`.
pub fn option_value(n: usize) -> String {
    format!("Option{} Value", n)
}

/// `Option{n} Linked To` for `n` in `1..=3`.
pub fn option_linked_to(n: usize) -> String {
    format!("Option{} Linked To", n)
}

/// Canonical product export columns. Also the expected header set of a
/// product export and the column list of every product output file.
pub const PRODUCT_COLUMNS: &[&str] = &[
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Product Category",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Google Shopping / Google Product Category",
    "Google Shopping / Gender",
    "Google Shopping / Age Group",
    "Google Shopping / MPN",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Google: Custom Product (product.metafields.mm-google-shopping.custom_product)",
    "Product rating count (product.metafields.reviews.rating_count)",
    "Color (product.metafields.shopify.color-pattern)",
    "Fabric (product.metafields.shopify.fabric)",
    "Neckline (product.metafields.shopify.neckline)",
    "Sleeve length type (product.metafields.shopify.sleeve-length-type)",
    "Target gender (product.metafields.shopify.target-gender)",
    "Top length type (product.metafields.shopify.top-length-type)",
    "Complementary products (product.metafields.shopify--discovery--product_recommendation.complementary_products)",
    "Related products (product.metafields.shopify--discovery--product_recommendation.related_products)",
    "Related products settings (product.metafields.shopify--discovery--product_recommendation.related_products_display)",
    "Search product boosts (product.metafields.shopify--discovery--product_search_boost.queries)",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
    "Status",
];

/// Columns only written for synthesized products.
pub const NEW_PRODUCT_EXTRA_COLUMNS: &[&str] = &[VARIANT_INVENTORY_QTY, INCLUDED_UNITED_KINGDOM];

// Inventory export

pub const INVENTORY_SKU: &str = "SKU";
pub const ON_HAND: &str = "On hand";
pub const ON_HAND_CURRENT: &str = "On hand (current)";
pub const ON_HAND_NEW: &str = "On hand (new)";

/// Columns every inventory export carries, whatever its schema version.
pub const INVENTORY_COLUMNS: &[&str] = &[
    HANDLE,
    TITLE,
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    INVENTORY_SKU,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_columns_cover_named_constants() {
        for col in [HANDLE, TITLE, TAGS, VARIANT_SKU, VARIANT_PRICE, VARIANT_BARCODE, IMAGE_SRC, VARIANT_IMAGE, STATUS] {
            assert!(PRODUCT_COLUMNS.contains(&col), "missing {}", col);
        }
        assert!(PRODUCT_COLUMNS.contains(&option_name(3).as_str()));
    }

    #[test]
    fn test_extra_columns_not_in_canonical_set() {
        for col in NEW_PRODUCT_EXTRA_COLUMNS {
            assert!(!PRODUCT_COLUMNS.contains(col));
        }
    }
}
