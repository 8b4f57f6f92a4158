//! Supplier adapters.
//!
//! A [`Vendor`] is plain configuration: identity, policy flags and a bundle of
//! extractor functions reading one supplier record. Optional extractors left
//! as `None` mean the engine does not manage that attribute for the supplier,
//! and the matching catalog field is never touched.
//!
//! Adapters are declared as constants with [`Vendor::new`] providing the
//! required parts and struct update syntax filling in the rest.

pub mod blitz;
pub mod cartas;
pub mod muaythai;
pub mod registry;
pub mod reydon;
pub mod unicorn;

use std::ops::Deref;

use serde::Serialize;

use crate::models::{OptionPair, Record};
use crate::transform::pricing::number;

pub use registry::VendorRegistry;

/// One supplier record as seen by the extractors.
///
/// `parent` is the representative record sharing this record's correlation
/// id, when one precedes it in the feed.
#[derive(Debug, Clone, Copy)]
pub struct Item<'a> {
    pub record: &'a Record,
    pub parent: Option<&'a Record>,
}

impl<'a> Item<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record, parent: None }
    }

    pub fn with_parent(record: &'a Record, parent: Option<&'a Record>) -> Self {
        Self { record, parent }
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

impl Deref for Item<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record
    }
}

/// Extractor reading one attribute from a supplier record.
pub type Extract<T> = for<'a> fn(&Item<'a>) -> T;

/// Raw-to-raw reshape applied before extraction.
pub type Reshape = fn(Vec<Record>) -> Vec<Record>;

/// Key read straight from a raw record (ordering, correlation).
pub type RecordKey = fn(&Record) -> Option<String>;

/// A supplier adapter.
#[derive(Clone, Copy)]
pub struct Vendor {
    /// Unique name, also the catalog tag marking this supplier's products
    pub name: &'static str,
    /// Label shown next to the file input and in header errors
    pub import_label: &'static str,

    pub update_inventory: bool,
    pub update_products: bool,
    pub add_products: bool,

    /// Columns a raw feed must carry
    pub expected_headers: &'static [&'static str],
    /// Synthetic header row for header-less exports
    pub force_headers: Option<&'static [&'static str]>,
    /// Decode HTML entities in every field
    pub html_decode: bool,
    /// Supplier SKUs that never match
    pub deny: &'static [&'static str],
    pub use_title_for_matching: bool,
    pub use_barcode_for_exclusive_matching: bool,

    pub get_sku: Extract<Option<String>>,
    pub get_quantity: Extract<i64>,
    pub get_title: Extract<String>,
    pub get_price: Option<Extract<f64>>,
    pub get_rrp: Option<Extract<f64>>,
    pub get_barcode: Option<Extract<Option<String>>>,
    pub get_weight: Option<Extract<f64>>,
    pub get_taxable: Option<Extract<bool>>,
    pub get_vendor_name: Option<Extract<String>>,
    pub get_description: Option<Extract<String>>,
    pub get_main_image_url: Option<Extract<String>>,
    pub get_variant_image_url: Option<Extract<String>>,
    pub get_additional_images: Option<Extract<Vec<String>>>,
    pub get_variants: Option<Extract<Vec<OptionPair>>>,
    pub get_tags: Option<Extract<String>>,
    pub get_type: Option<Extract<String>>,
    pub get_features: Option<Extract<Vec<String>>>,

    pub get_variant_correlation_id: Option<RecordKey>,
    pub parse_import: Option<Reshape>,
    pub order_by: Option<RecordKey>,
}

impl Vendor {
    /// Adapter with only the required extractors and every flag off.
    pub const fn new(
        name: &'static str,
        import_label: &'static str,
        get_sku: Extract<Option<String>>,
        get_quantity: Extract<i64>,
        get_title: Extract<String>,
    ) -> Self {
        Self {
            name,
            import_label,
            update_inventory: false,
            update_products: false,
            add_products: false,
            expected_headers: &[],
            force_headers: None,
            html_decode: false,
            deny: &[],
            use_title_for_matching: false,
            use_barcode_for_exclusive_matching: false,
            get_sku,
            get_quantity,
            get_title,
            get_price: None,
            get_rrp: None,
            get_barcode: None,
            get_weight: None,
            get_taxable: None,
            get_vendor_name: None,
            get_description: None,
            get_main_image_url: None,
            get_variant_image_url: None,
            get_additional_images: None,
            get_variants: None,
            get_tags: None,
            get_type: None,
            get_features: None,
            get_variant_correlation_id: None,
            parse_import: None,
            order_by: None,
        }
    }

    pub fn is_denied(&self, sku: &str) -> bool {
        self.deny.contains(&sku)
    }

    /// Listing entry for the UI and the `vendors` command.
    pub fn summary(&self) -> VendorSummary {
        VendorSummary {
            name: self.name,
            import_label: self.import_label,
            update_inventory: self.update_inventory,
            update_products: self.update_products,
            add_products: self.add_products,
            expected_headers: self.expected_headers.to_vec(),
        }
    }
}

impl std::fmt::Debug for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vendor")
            .field("name", &self.name)
            .field("import_label", &self.import_label)
            .finish_non_exhaustive()
    }
}

/// Serializable view of a vendor's identity and capabilities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub name: &'static str,
    pub import_label: &'static str,
    pub update_inventory: bool,
    pub update_products: bool,
    pub add_products: bool,
    pub expected_headers: Vec<&'static str>,
}

// =============================================================================
// Extractor helpers
// =============================================================================

/// Non-empty trimmed value of a column.
pub(crate) fn non_empty(record: &Record, column: &str) -> Option<String> {
    let value = record.trimmed(column);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Numeric value of a column with spreadsheet semantics.
pub(crate) fn num(record: &Record, column: &str) -> f64 {
    number(record.text(column))
}

/// Collect `{prefix}{n}` image columns for `n` in `range`, skipping blanks.
pub(crate) fn numbered_columns(
    record: &Record,
    prefix: &str,
    range: std::ops::RangeInclusive<usize>,
) -> Vec<String> {
    range
        .filter_map(|i| non_empty(record, &format!("{}{}", prefix, i)))
        .collect()
}

/// Option pairs from `(option name, column)` pairs, skipping blank columns.
pub(crate) fn options_from(record: &Record, columns: &[(&str, &str)]) -> Vec<OptionPair> {
    columns
        .iter()
        .filter_map(|(name, column)| non_empty(record, column).map(|v| OptionPair::new(*name, v)))
        .collect()
}
