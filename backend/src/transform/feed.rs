//! A supplier feed ready for matching.
//!
//! Loading runs the vendor's parsing switches, checks headers, reshapes,
//! orders and correlates. The parent back-references and normalized barcodes
//! live in side-tables indexed like `records`, so raw records stay untouched.

use once_cell::unsync::OnceCell;

use crate::api::logs::log_debug;
use crate::error::{InputError, ReconcileError, ReconcileResult};
use crate::models::Table;
use crate::parser::{load_file, parse_bytes, InputFile, ParseOptions};
use crate::transform::normalize::{parse_barcode, parse_sku, Barcode};
use crate::transform::reshape::{correlate, order_by};
use crate::transform::run::RunToken;
use crate::validation::check_headers;
use crate::vendors::{Item, Vendor};

/// Identity of one supplier record as the matcher sees it.
#[derive(Debug, Clone)]
pub struct Probe<'a> {
    /// Normalized SKU
    pub sku: String,
    pub title: String,
    pub barcode: &'a Barcode,
}

impl Probe<'_> {
    /// `SKU (title/barcode)` for log lines.
    pub fn label(&self) -> String {
        format!("{} ({}/{})", self.sku, self.title, self.barcode)
    }
}

/// Reshaped supplier records plus their side-tables.
pub struct VendorFeed {
    pub vendor: &'static Vendor,
    records: Vec<crate::models::Record>,
    parents: Vec<Option<usize>>,
    barcodes: Vec<OnceCell<Barcode>>,
}

impl VendorFeed {
    /// Build a feed from an already parsed table.
    pub fn from_table(vendor: &'static Vendor, table: Table) -> Result<Self, InputError> {
        check_headers(vendor.name, vendor.import_label, vendor.expected_headers, &table.headers)?;

        let mut records = table.records;
        if let Some(reshape) = vendor.parse_import {
            records = reshape(records);
        }
        if let Some(key) = vendor.order_by {
            order_by(&mut records, key);
        }
        let parents = match vendor.get_variant_correlation_id {
            Some(key) => correlate(&records, key),
            None => vec![None; records.len()],
        };
        let barcodes = records.iter().map(|_| OnceCell::new()).collect();

        Ok(Self {
            vendor,
            records,
            parents,
            barcodes,
        })
    }

    /// Read, decode and reshape a supplier file.
    pub async fn load(vendor: &'static Vendor, file: &InputFile, token: &RunToken) -> ReconcileResult<Self> {
        let (name, bytes) = load_file(file, token).await?;
        let options = ParseOptions {
            force_headers: vendor.force_headers,
            html_decode: vendor.html_decode,
        };
        let parsed = parse_bytes(&bytes, &options).map_err(|e| ReconcileError::csv(&name, e))?;
        log_debug(format!(
            "{}: {} rows, {} encoding, '{}' delimiter",
            name,
            parsed.table.len(),
            parsed.encoding,
            parsed.delimiter.escape_default()
        ));
        token.checkpoint()?;

        Ok(Self::from_table(vendor, parsed.table)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record `index` with its representative parent, if any.
    pub fn item(&self, index: usize) -> Item<'_> {
        let parent = self.parents[index].map(|p| &self.records[p]);
        Item::with_parent(&self.records[index], parent)
    }

    /// Index of the representative parent of record `index`.
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.parents[index]
    }

    /// Normalized SKU, `None` when the adapter yields nothing usable.
    pub fn sku(&self, index: usize) -> Option<String> {
        let raw = (self.vendor.get_sku)(&self.item(index))?;
        parse_sku(&raw).map(str::to_string)
    }

    /// Normalized barcode, computed once per record.
    pub fn barcode(&self, index: usize) -> &Barcode {
        self.barcodes[index].get_or_init(|| match self.vendor.get_barcode {
            Some(get) => parse_barcode(get(&self.item(index)).as_deref()),
            None => Barcode::DoesNotApply,
        })
    }

    pub fn title(&self, index: usize) -> String {
        (self.vendor.get_title)(&self.item(index))
    }

    /// Matcher input for record `index`, `None` without a SKU.
    pub fn probe(&self, index: usize) -> Option<Probe<'_>> {
        Some(Probe {
            sku: self.sku(index)?,
            title: self.title(index),
            barcode: self.barcode(index),
        })
    }
}
