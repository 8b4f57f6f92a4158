//! Reconciliation operations.
//!
//! Every operation has the same outline: load the Shopify export, walk the
//! registered vendors in order, stream each supplier feed through the matcher
//! and write back only what changed. Vendors run strictly one after another
//! because a later vendor may attach variants to products an earlier one
//! created in the same run.
//!
//! # Example
//!
//! ```rust,ignore
//! use stocksync::parser::InputFile;
//! use stocksync::transform::{update_inventory, RunInputs, RunToken};
//! use stocksync::vendors::VendorRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inputs = RunInputs::new()
//!         .with_inventory(InputFile::from_path("inventory_export.csv"))
//!         .with_vendor("unicorn", InputFile::from_path("unicorn.csv"));
//!
//!     let result = update_inventory(&inputs, &VendorRegistry::new(), &RunToken::new()).await?;
//!     if let Some(output) = result.output {
//!         std::fs::write(output.file_name, output.csv)?;
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::logs::{log_debug, log_error, log_info, log_success, log_warning};
use crate::config::{
    RunOptions, DEFAULT_PRODUCT_CATEGORY, INVENTORY_UPDATE_FILE_NAME, MAX_OPTIONS,
    NEW_IN_TAG, NEW_PRODUCTS_FILE_NAME, PRODUCTS_UPDATE_FILE_NAME, SALE_TAG,
    SWAPPED_OPTIONS_FILE_NAME,
};
use crate::error::{InputError, ReconcileError, ReconcileResult, RecordError};
use crate::models::columns::{
    option_linked_to, option_name, option_value, BODY_HTML, GIFT_CARD, HANDLE, IMAGE_SRC,
    INCLUDED_UNITED_KINGDOM, NEW_PRODUCT_EXTRA_COLUMNS, PRODUCT_CATEGORY, PRODUCT_COLUMNS,
    PUBLISHED, STATUS, TAGS, TITLE, TYPE, VARIANT_BARCODE, VARIANT_COMPARE_AT_PRICE,
    VARIANT_FULFILLMENT_SERVICE, VARIANT_GRAMS, VARIANT_IMAGE, VARIANT_INVENTORY_POLICY,
    VARIANT_INVENTORY_QTY, VARIANT_INVENTORY_TRACKER, VARIANT_PRICE, VARIANT_REQUIRES_SHIPPING,
    VARIANT_SKU, VARIANT_TAXABLE, VARIANT_WEIGHT_UNIT, VENDOR,
};
use crate::models::{Record, TagSet, Table};
use crate::parser::{load_file, parse_bytes, write_csv, InputFile, ParseOptions};
use crate::transform::catalog::{
    Catalog, CatalogRow, Inventory, ProductGroup, RowRef, Slot, INVENTORY_LABEL, PRODUCTS_LABEL,
};
use crate::transform::feed::{Probe, VendorFeed};
use crate::transform::matcher::{match_inventory, match_product};
use crate::transform::normalize::{escape_sku, slugify, Barcode};
use crate::transform::pricing::{
    cap_quantity, cap_weight, format_price, is_on_sale, number, round_price, same_price,
};
use crate::transform::run::RunToken;
use crate::validation::{check_inventory_headers, check_product_headers, stray_columns};
use crate::vendors::{Extract, Item, Vendor, VendorRegistry};

// =============================================================================
// Operations and inputs
// =============================================================================

/// The reconciliation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Inventory,
    UpdateProducts,
    AddProducts,
    SwapOptions,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Inventory => "inventory",
            Operation::UpdateProducts => "update-products",
            Operation::AddProducts => "add-products",
            Operation::SwapOptions => "swap-options",
        }
    }

    /// Name of the file this operation produces.
    pub fn file_name(self) -> &'static str {
        match self {
            Operation::Inventory => INVENTORY_UPDATE_FILE_NAME,
            Operation::UpdateProducts => PRODUCTS_UPDATE_FILE_NAME,
            Operation::AddProducts => NEW_PRODUCTS_FILE_NAME,
            Operation::SwapOptions => SWAPPED_OPTIONS_FILE_NAME,
        }
    }

    /// Whether `vendor` takes part in this operation.
    pub fn applies_to(self, vendor: &Vendor) -> bool {
        match self {
            Operation::Inventory => vendor.update_inventory,
            Operation::UpdateProducts => vendor.update_products,
            Operation::AddProducts => vendor.add_products,
            Operation::SwapOptions => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files and options for one run.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// Shopify inventory exports, concatenated in order
    pub inventory: Vec<InputFile>,
    /// Shopify product exports, concatenated in order
    pub products: Vec<InputFile>,
    /// Supplier files keyed by vendor name
    pub vendors: Vec<(String, InputFile)>,
    pub options: RunOptions,
}

impl RunInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(mut self, file: InputFile) -> Self {
        self.inventory.push(file);
        self
    }

    pub fn with_products(mut self, file: InputFile) -> Self {
        self.products.push(file);
        self
    }

    pub fn with_vendor(mut self, name: impl Into<String>, file: InputFile) -> Self {
        self.vendors.push((name.into(), file));
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// The file supplied for a vendor. Only the first one counts.
    pub fn vendor_file(&self, name: &str) -> Option<&InputFile> {
        self.vendors.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    fn check_vendors(&self, registry: &VendorRegistry) -> ReconcileResult<()> {
        for (name, _) in &self.vendors {
            if registry.get(name).is_none() {
                return Err(ReconcileError::UnknownVendor(name.clone()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// Counters for one vendor pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorReport {
    pub vendor: String,
    /// Records read from the feed after reshaping
    pub records: usize,
    pub matched: usize,
    pub not_found: usize,
    /// Records without a SKU or with unusable values
    pub skipped: usize,
    /// Rows changed or added
    pub changed: usize,
    #[serde(skip)]
    barcodes: BTreeMap<String, usize>,
}

impl VendorReport {
    pub fn new(vendor: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            ..Self::default()
        }
    }

    fn count_barcode(&mut self, barcode: &Barcode) {
        *self.barcodes.entry(barcode.as_str().to_string()).or_insert(0) += 1;
    }
}

/// Diagnostics returned with every run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub vendors: Vec<VendorReport>,
    /// How often each normalized supplier barcode was seen
    pub barcodes: BTreeMap<String, usize>,
}

impl RunReport {
    pub fn push(&mut self, report: VendorReport) {
        for (barcode, count) in &report.barcodes {
            *self.barcodes.entry(barcode.clone()).or_insert(0) += count;
        }
        self.vendors.push(report);
    }

    pub fn total_changed(&self) -> usize {
        self.vendors.iter().map(|v| v.changed).sum()
    }

    /// Valid barcodes seen on more than one supplier record.
    pub fn duplicate_barcodes(&self) -> impl Iterator<Item = (&str, usize)> {
        self.barcodes
            .iter()
            .filter(|(barcode, count)| **count > 1 && barcode.chars().all(|c| c.is_ascii_digit()))
            .map(|(barcode, count)| (barcode.as_str(), *count))
    }
}

/// A CSV ready for download.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub file_name: &'static str,
    pub csv: Vec<u8>,
    /// Data rows written, header excluded
    pub rows: usize,
}

/// Outcome of a completed run. `output` is `None` when nothing changed.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub operation: Operation,
    pub output: Option<RunOutput>,
    pub report: RunReport,
}

impl RunResult {
    /// Completed, but there is nothing to download.
    pub fn is_empty(&self) -> bool {
        self.output.is_none()
    }
}

fn finish<'a, I>(
    operation: Operation,
    columns: &[&str],
    records: I,
    report: RunReport,
    token: &RunToken,
) -> ReconcileResult<RunResult>
where
    I: IntoIterator<Item = &'a Record>,
{
    token.checkpoint()?;
    let records: Vec<&Record> = records.into_iter().collect();
    if records.is_empty() {
        log_info("[DONE] Nothing to download");
        return Ok(RunResult {
            operation,
            output: None,
            report,
        });
    }

    let dropped = stray_columns(records.iter().copied(), columns);
    if !dropped.is_empty() {
        log_debug(format!("Columns left out of the output: {}", dropped.join(", ")));
    }

    let file_name = operation.file_name();
    let csv = write_csv(columns, records.iter().copied()).map_err(|e| ReconcileError::csv(file_name, e))?;
    log_success(format!("[DONE] {} rows ready in {}", records.len(), file_name));

    Ok(RunResult {
        operation,
        output: Some(RunOutput {
            file_name,
            csv,
            rows: records.len(),
        }),
        report,
    })
}

// =============================================================================
// Loading
// =============================================================================

/// Read and concatenate the Shopify export files of one kind.
async fn read_exports(
    files: &[InputFile],
    label: &str,
    missing: &str,
    check: fn(&str, &[String]) -> Result<(), InputError>,
    token: &RunToken,
) -> ReconcileResult<Table> {
    if files.is_empty() {
        return Err(InputError::MissingFile(missing.to_string()).into());
    }

    let mut table = Table::default();
    for file in files {
        let (name, bytes) = load_file(file, token).await?;
        let parsed =
            parse_bytes(&bytes, &ParseOptions::default()).map_err(|e| ReconcileError::csv(&name, e))?;
        token.checkpoint()?;
        check(label, &parsed.table.headers)?;
        log_info(format!("Loaded {} rows from {}", parsed.table.len(), name));
        table.extend(parsed.table);
    }
    Ok(table)
}

async fn load_inventory(inputs: &RunInputs, token: &RunToken) -> ReconcileResult<Inventory> {
    let table = read_exports(
        &inputs.inventory,
        INVENTORY_LABEL,
        "shopify inventory CSV",
        check_inventory_headers,
        token,
    )
    .await?;
    Ok(Inventory::from_table(table))
}

async fn load_catalog(inputs: &RunInputs, token: &RunToken) -> ReconcileResult<(Catalog, Vec<String>)> {
    let table = read_exports(
        &inputs.products,
        PRODUCTS_LABEL,
        "shopify products CSV",
        check_product_headers,
        token,
    )
    .await?;
    let headers = table.headers.clone();
    let catalog = Catalog::from_table(table);
    log_info(format!("{} products in the catalog", catalog.len()));
    Ok((catalog, headers))
}

/// The feed for `vendor`, or `None` when it sits this operation out.
async fn vendor_feed(
    vendor: &'static Vendor,
    operation: Operation,
    inputs: &RunInputs,
    token: &RunToken,
) -> ReconcileResult<Option<VendorFeed>> {
    token.checkpoint()?;
    if !operation.applies_to(vendor) {
        log_info(format!("[SKIP] {} not applicable to {}", operation, vendor.name));
        return Ok(None);
    }
    let Some(file) = inputs.vendor_file(vendor.name) else {
        log_info(format!("[SKIP] no file selected for {}", vendor.name));
        return Ok(None);
    };

    log_info(format!("Processing {} from {}", vendor.name, file.name));
    let feed = VendorFeed::load(vendor, file, token).await?;
    token.checkpoint()?;
    Ok(Some(feed))
}

/// Count the record and build its probe, `None` when it has no SKU.
fn probe_record<'f>(feed: &'f VendorFeed, index: usize, stats: &mut VendorReport) -> Option<Probe<'f>> {
    stats.records += 1;
    match feed.probe(index) {
        Some(probe) => {
            stats.count_barcode(probe.barcode);
            Some(probe)
        }
        None => {
            log_debug(format!(
                "[NOT FOUND] {} {} (record {})",
                feed.vendor.name,
                RecordError::MissingSku,
                index + 1
            ));
            stats.skipped += 1;
            None
        }
    }
}

fn log_pass(stats: &VendorReport) {
    log_info(format!(
        "{}: {} records, {} matched, {} not found, {} skipped, {} changed",
        stats.vendor, stats.records, stats.matched, stats.not_found, stats.skipped, stats.changed
    ));
}

// =============================================================================
// Inventory update
// =============================================================================

/// Stage on-hand changes from one feed. `staged[i]` is set for every
/// inventory row whose quantity changed.
pub fn reconcile_inventory(
    inventory: &mut Inventory,
    feed: &VendorFeed,
    options: &RunOptions,
    token: &RunToken,
    staged: &mut [bool],
) -> ReconcileResult<VendorReport> {
    let vendor = feed.vendor;
    let mut stats = VendorReport::new(vendor.name);

    for index in 0..feed.len() {
        token.checkpoint()?;
        let Some(probe) = probe_record(feed, index, &mut stats) else {
            continue;
        };

        let row = match match_inventory(vendor, &probe, inventory) {
            Ok(outcome) => outcome.row,
            Err(_) => {
                log_debug(format!("[NOT FOUND] {} SKU {} in shopify inventory", vendor.name, probe.label()));
                stats.not_found += 1;
                continue;
            }
        };
        stats.matched += 1;

        let quantity = cap_quantity((vendor.get_quantity)(&feed.item(index)), options.max_quantity);
        let current = inventory.on_hand(row);
        if number(current) == quantity as f64 {
            log_debug(format!(
                "[QUANTITY MATCH] {} SKU {} quantity {} matches shopify",
                vendor.name,
                probe.label(),
                quantity
            ));
            continue;
        }

        log_info(format!(
            "[QUANTITY UPDATE] {} SKU {} quantity {} differs in shopify: {}",
            vendor.name,
            probe.label(),
            quantity,
            current
        ));
        inventory.set_on_hand(row, quantity);
        staged[row] = true;
        stats.changed += 1;
    }

    Ok(stats)
}

/// Write supplier stock levels into the Shopify inventory export.
pub async fn update_inventory(
    inputs: &RunInputs,
    registry: &VendorRegistry,
    token: &RunToken,
) -> ReconcileResult<RunResult> {
    inputs.check_vendors(registry)?;
    let mut inventory = load_inventory(inputs, token).await?;
    let mut staged = vec![false; inventory.len()];
    let mut report = RunReport::default();

    for &vendor in registry.list() {
        let Some(feed) = vendor_feed(vendor, Operation::Inventory, inputs, token).await? else {
            continue;
        };
        let stats = reconcile_inventory(&mut inventory, &feed, &inputs.options, token, &mut staged)?;
        log_pass(&stats);
        report.push(stats);
    }

    let headers: Vec<&str> = inventory.headers.iter().map(String::as_str).collect();
    let rows = (0..inventory.len())
        .filter(|&i| staged[i])
        .map(|i| &inventory.row(i).record);
    finish(Operation::Inventory, &headers, rows, report, token)
}

// =============================================================================
// Product update
// =============================================================================

/// A supplier record paired with its catalog row.
struct Matched<'a> {
    vendor: &'static Vendor,
    item: Item<'a>,
    probe: &'a Probe<'a>,
    at: RowRef,
}

fn rounded(get: Option<Extract<f64>>, item: &Item<'_>, sku: &str) -> Result<Option<f64>, RecordError> {
    match get {
        Some(get) => round_price(get(item))
            .map(Some)
            .ok_or_else(|| RecordError::PriceNotANumber(sku.to_string())),
        None => Ok(None),
    }
}

/// Fill a column from the supplier when empty, or always with `force`.
fn refresh_image(row: &mut CatalogRow, column: &str, url: String, force: bool) -> bool {
    let current = row.text(column);
    if url.trim().is_empty() || url == current || (!current.is_empty() && !force) {
        return false;
    }
    row.set(column, url);
    true
}

/// Apply one matched supplier record. Returns whether anything changed.
///
/// The price is derived before any mutation, so a record that fails leaves
/// the catalog untouched.
fn update_matched(
    catalog: &mut Catalog,
    m: &Matched<'_>,
    options: &RunOptions,
    sale: &mut HashMap<usize, bool>,
) -> Result<bool, RecordError> {
    let vendor = m.vendor;
    let label = m.probe.label();
    let price = rounded(vendor.get_price, &m.item, &m.probe.sku)?;

    let group = catalog.group_mut(m.at.group);
    let handle = group.handle().to_string();
    let mut edited = false;

    let on_sale = {
        let Some(row) = group.row_mut(m.at.slot) else {
            return Ok(false);
        };

        if let Some(price) = price {
            let price = format_price(price);
            let current = row.text(VARIANT_PRICE);
            if same_price(current, &price) {
                log_debug(format!("[PRICE MATCH] {} SKU {} price {} matches shopify product {}", vendor.name, label, price, handle));
            } else {
                log_info(format!(
                    "[PRICE UPDATE] {} SKU {} price {} differs in shopify product {}: {}",
                    vendor.name, label, price, handle, current
                ));
                row.set(VARIANT_PRICE, price);
                edited = true;
            }
        }

        if vendor.get_barcode.is_some() {
            if row.barcode() == m.probe.barcode {
                log_debug(format!("[BARCODE MATCH] {} SKU {} barcode matches shopify product {}", vendor.name, label, handle));
            } else if !m.probe.barcode.is_valid() {
                log_debug(format!(
                    "[BARCODE UPDATE IGNORED] {} SKU {} barcode missing but exists in shopify product {}",
                    vendor.name, label, handle
                ));
            } else {
                log_info(format!("[BARCODE UPDATE] {} SKU {} barcode differs in shopify product {}", vendor.name, label, handle));
                row.set(VARIANT_BARCODE, m.probe.barcode.escape());
                edited = true;
            }
        }

        if m.at.slot == Slot::Primary {
            if let Some(get) = vendor.get_main_image_url {
                if refresh_image(row, IMAGE_SRC, get(&m.item), options.update_images) {
                    log_info(format!("[IMAGE UPDATE] {} SKU {} editing main image on product {}", vendor.name, label, handle));
                    edited = true;
                }
            }
            if let (true, Some(get)) = (options.update_descriptions, vendor.get_description) {
                let description = get(&m.item);
                if !description.trim().is_empty() && description != row.text(BODY_HTML) {
                    log_info(format!("[DESCRIPTION UPDATE] {} SKU {} on product {}", vendor.name, label, handle));
                    row.set(BODY_HTML, description);
                    edited = true;
                }
            }
        }

        if let Some(get) = vendor.get_variant_image_url {
            if refresh_image(row, VARIANT_IMAGE, get(&m.item), options.update_images) {
                log_info(format!("[IMAGE UPDATE] {} SKU {} editing variant image on product {}", vendor.name, label, handle));
                edited = true;
            }
        }

        is_on_sale(row.record())
    };

    // Sale state covers the rows of this group seen in the current vendor pass.
    let seen = sale.entry(m.at.group).or_insert(false);
    *seen |= on_sale;
    let on_sale = *seen;

    let mut tags = group.tags();
    let mut tags_changed = false;
    if tags.insert(vendor.name) {
        log_info(format!("[TAGS UPDATE] shopify product {} tags are missing {} vendor: [{}]", handle, vendor.name, group.primary.text(TAGS)));
        tags_changed = true;
    }
    if on_sale && tags.insert(SALE_TAG) {
        log_info(format!("[TAGS UPDATE] shopify product {} tags are missing sale", handle));
        tags_changed = true;
    } else if !on_sale && tags.remove(SALE_TAG) {
        log_info(format!("[TAGS UPDATE] shopify product {} tags should not have sale", handle));
        tags_changed = true;
    }
    if tags_changed {
        group.primary.set(TAGS, tags.to_string());
        edited = true;
    }

    // Galleries curated by hand are left alone.
    let wants_images = !group.has_image_only_rows();
    if let (true, Some(get)) = (wants_images, vendor.get_additional_images) {
        let images = get(&m.item);
        if !images.is_empty() {
            log_info(format!(
                "[ADDITIONAL IMAGE UPDATE] {} SKU {} adding {} more images to product {}",
                vendor.name,
                label,
                images.len(),
                handle
            ));
            for image in images {
                catalog.push_secondary(m.at.group, image_row(&handle, image));
            }
            edited = true;
        }
    }

    if edited {
        catalog.group_mut(m.at.group).edited = true;
    }
    Ok(edited)
}

fn image_row(handle: &str, image: String) -> CatalogRow {
    CatalogRow::new(Record::from_pairs([(HANDLE, handle.to_string()), (IMAGE_SRC, image)]))
}

/// Apply one feed to the product catalog.
pub fn reconcile_products(
    catalog: &mut Catalog,
    feed: &VendorFeed,
    options: &RunOptions,
    token: &RunToken,
) -> ReconcileResult<VendorReport> {
    let vendor = feed.vendor;
    let mut stats = VendorReport::new(vendor.name);
    let mut sale = HashMap::new();

    for index in 0..feed.len() {
        token.checkpoint()?;
        let Some(probe) = probe_record(feed, index, &mut stats) else {
            continue;
        };

        let at = match match_product(vendor, &probe, catalog) {
            Ok(outcome) => outcome.row,
            Err(_) => {
                log_debug(format!("[NOT FOUND] {} SKU {} in shopify products", vendor.name, probe.label()));
                stats.not_found += 1;
                continue;
            }
        };
        stats.matched += 1;

        let matched = Matched {
            vendor,
            item: feed.item(index),
            probe: &probe,
            at,
        };
        match update_matched(catalog, &matched, options, &mut sale) {
            Ok(true) => stats.changed += 1,
            Ok(false) => {}
            Err(e) => {
                log_error(format!("{} SKU {}: {}", vendor.name, probe.label(), e));
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Bring prices, barcodes, tags and images of matched products in line with
/// the supplier feeds.
pub async fn update_products(
    inputs: &RunInputs,
    registry: &VendorRegistry,
    token: &RunToken,
) -> ReconcileResult<RunResult> {
    inputs.check_vendors(registry)?;
    let (mut catalog, _) = load_catalog(inputs, token).await?;
    let mut report = RunReport::default();

    for &vendor in registry.list() {
        let Some(feed) = vendor_feed(vendor, Operation::UpdateProducts, inputs, token).await? else {
            continue;
        };
        let stats = reconcile_products(&mut catalog, &feed, &inputs.options, token)?;
        log_pass(&stats);
        report.push(stats);
    }

    for (barcode, count) in report.duplicate_barcodes() {
        log_warning(format!("Barcode {} appears on {} supplier records", barcode, count));
    }

    finish(Operation::UpdateProducts, PRODUCT_COLUMNS, catalog.edited_records(), report, token)
}

// =============================================================================
// Product addition
// =============================================================================

/// Rows synthesized for one supplier record.
struct Draft {
    row: Record,
    images: Vec<CatalogRow>,
    tags: TagSet,
}

fn feature_list(features: &[String]) -> String {
    if features.is_empty() {
        return String::new();
    }
    let items: String = features
        .iter()
        .map(|f| format!("<li><p>{}</p></li>", f))
        .collect();
    format!("<br><ul>{}</ul>", items)
}

/// Build the variant row, plus product fields when `parent` is `None`.
fn draft_variant(
    vendor: &Vendor,
    item: &Item<'_>,
    probe: &Probe<'_>,
    options: &RunOptions,
    parent: Option<&ProductGroup>,
) -> Result<Draft, RecordError> {
    let missing_price = || RecordError::PriceNotANumber(probe.sku.clone());
    let price = rounded(vendor.get_price, item, &probe.sku)?.ok_or_else(missing_price)?;
    let rrp = rounded(vendor.get_rrp, item, &probe.sku)?.unwrap_or(price);
    let title = (vendor.get_title)(item).trim().to_string();

    let handle = match parent {
        Some(group) => group.handle().to_string(),
        None => format!("{}-{}", vendor.name, slugify(&title)),
    };

    let mut row = Record::new();
    row.set(HANDLE, handle.as_str());
    if parent.is_none() {
        let features = vendor.get_features.map(|get| get(item)).unwrap_or_default();
        let description = vendor.get_description.map(|get| get(item)).unwrap_or_default();
        row.set(TITLE, title.as_str());
        row.set(BODY_HTML, feature_list(&features) + &description);
        row.set(VENDOR, vendor.get_vendor_name.map(|get| get(item)).unwrap_or_default());
        row.set(PRODUCT_CATEGORY, DEFAULT_PRODUCT_CATEGORY);
        row.set(
            TYPE,
            vendor
                .get_type
                .map(|get| get(item))
                .unwrap_or_else(|| DEFAULT_PRODUCT_CATEGORY.to_string()),
        );
        row.set(PUBLISHED, "TRUE");
        row.set(IMAGE_SRC, vendor.get_main_image_url.map(|get| get(item)).unwrap_or_default());
    }

    let quantity = cap_quantity((vendor.get_quantity)(item), options.max_quantity);
    let taxable = vendor.get_taxable.is_some_and(|get| get(item));
    row.set(VARIANT_SKU, escape_sku(&probe.sku));
    row.set(VARIANT_INVENTORY_TRACKER, "shopify");
    row.set(VARIANT_INVENTORY_QTY, quantity.to_string());
    row.set(VARIANT_INVENTORY_POLICY, "deny");
    row.set(VARIANT_FULFILLMENT_SERVICE, "manual");
    row.set(VARIANT_PRICE, format_price(price));
    row.set(VARIANT_COMPARE_AT_PRICE, format_price(rrp));
    row.set(VARIANT_REQUIRES_SHIPPING, "TRUE");
    row.set(VARIANT_TAXABLE, if taxable { "TRUE" } else { "FALSE" });
    row.set(VARIANT_BARCODE, probe.barcode.escape());
    row.set(GIFT_CARD, "FALSE");
    row.set(VARIANT_WEIGHT_UNIT, "kg");
    row.set(INCLUDED_UNITED_KINGDOM, "TRUE");
    row.set(STATUS, "active");

    if let Some(get) = vendor.get_weight {
        let weight = cap_weight(get(item));
        if weight.is_finite() {
            row.set(VARIANT_GRAMS, weight.to_string());
        }
    }

    let variants = vendor.get_variants.map(|get| get(item)).unwrap_or_default();
    if variants.is_empty() {
        row.set(option_name(1), "Title");
        row.set(option_value(1), "Default Title");
    } else {
        if let Some(get) = vendor.get_variant_image_url {
            row.set(VARIANT_IMAGE, get(item));
        }
        if variants.len() > MAX_OPTIONS {
            log_warning(format!(
                "{} SKU {} has {} options, keeping the first {}",
                vendor.name,
                probe.label(),
                variants.len(),
                MAX_OPTIONS
            ));
        }
        for (n, pair) in variants.iter().take(MAX_OPTIONS).enumerate() {
            row.set(option_name(n + 1), pair.name.as_str());
            row.set(option_value(n + 1), pair.value.as_str());
        }
    }

    let images = vendor
        .get_additional_images
        .map(|get| get(item))
        .unwrap_or_default()
        .into_iter()
        .map(|image| image_row(&handle, image))
        .collect();

    let mut tags = parent.map(ProductGroup::tags).unwrap_or_default();
    tags.insert(NEW_IN_TAG);
    tags.insert(vendor.name);
    let on_sale = is_on_sale(&row)
        || parent.is_some_and(|group| {
            group
                .records()
                .any(|r| r.has(VARIANT_PRICE) && is_on_sale(r))
        });
    if on_sale {
        tags.insert(SALE_TAG);
    } else {
        tags.remove(SALE_TAG);
    }
    if let Some(get) = vendor.get_tags {
        for tag in TagSet::parse(&get(item)).iter() {
            tags.insert(tag);
        }
    }

    Ok(Draft { row, images, tags })
}

/// Add the supplier records of one feed that have no catalog counterpart.
pub fn add_from_feed(
    catalog: &mut Catalog,
    feed: &VendorFeed,
    options: &RunOptions,
    token: &RunToken,
) -> ReconcileResult<VendorReport> {
    let vendor = feed.vendor;
    let mut stats = VendorReport::new(vendor.name);

    for index in 0..feed.len() {
        token.checkpoint()?;
        let Some(probe) = probe_record(feed, index, &mut stats) else {
            continue;
        };

        if match_product(vendor, &probe, catalog).is_ok() {
            log_debug(format!("[FOUND] {} SKU {} in shopify products", vendor.name, probe.label()));
            stats.matched += 1;
            continue;
        }
        stats.not_found += 1;

        // A variant joins the product its representative record matched,
        // possibly one added earlier in this pass.
        let parent = feed
            .parent_of(index)
            .and_then(|p| feed.probe(p))
            .and_then(|p| match_product(vendor, &p, catalog).ok())
            .map(|outcome| outcome.row.group);

        let item = feed.item(index);
        let draft = match draft_variant(vendor, &item, &probe, options, parent.map(|g| catalog.group(g))) {
            Ok(draft) => draft,
            Err(e) => {
                log_error(format!("{} SKU {}: {}", vendor.name, probe.label(), e));
                stats.skipped += 1;
                continue;
            }
        };

        match parent {
            Some(group) => {
                log_info(format!("[ADDING] {} SKU {} to existing product in shopify", vendor.name, probe.label()));
                let target = catalog.group_mut(group);
                target.primary.set(TAGS, draft.tags.to_string());
                target.edited = true;
                catalog.push_secondary(group, CatalogRow::new(draft.row));
                for image in draft.images {
                    catalog.push_secondary(group, image);
                }
            }
            None => {
                log_info(format!("[ADDING] {} SKU {} to shopify", vendor.name, probe.label()));
                let mut row = draft.row;
                row.set(TAGS, draft.tags.to_string());
                let mut group = ProductGroup::new(CatalogRow::new(row));
                group.secondary = draft.images;
                group.edited = true;
                catalog.push_group(group);
            }
        }
        stats.changed += 1;
    }

    Ok(stats)
}

/// Synthesize catalog rows for supplier records the catalog does not have.
pub async fn add_products(
    inputs: &RunInputs,
    registry: &VendorRegistry,
    token: &RunToken,
) -> ReconcileResult<RunResult> {
    inputs.check_vendors(registry)?;
    let (mut catalog, _) = load_catalog(inputs, token).await?;
    let mut report = RunReport::default();

    for &vendor in registry.list() {
        let Some(feed) = vendor_feed(vendor, Operation::AddProducts, inputs, token).await? else {
            continue;
        };
        let stats = add_from_feed(&mut catalog, &feed, &inputs.options, token)?;
        log_pass(&stats);
        report.push(stats);
    }

    let columns: Vec<&str> = PRODUCT_COLUMNS
        .iter()
        .chain(NEW_PRODUCT_EXTRA_COLUMNS)
        .copied()
        .collect();
    finish(Operation::AddProducts, &columns, catalog.edited_records(), report, token)
}

// =============================================================================
// Option swap
// =============================================================================

fn swap_columns(row: &mut CatalogRow, a: &str, b: &str) {
    if !row.record().contains_column(a) && !row.record().contains_column(b) {
        return;
    }
    let first = row.text(a).to_string();
    let second = row.text(b).to_string();
    row.set(a, second);
    row.set(b, first);
}

/// Turn `Size` / `Colour` products into `Colour` / `Size`. Returns whether
/// the group was swapped.
pub fn swap_size_colour(group: &mut ProductGroup) -> bool {
    let primary = group.primary.record();
    if primary.text(&option_name(1)) != "Size" || primary.text(&option_name(2)) != "Colour" {
        return false;
    }

    for row in group.rows_mut() {
        swap_columns(row, &option_name(1), &option_name(2));
        swap_columns(row, &option_value(1), &option_value(2));
        swap_columns(row, &option_linked_to(1), &option_linked_to(2));
    }
    group.edited = true;
    true
}

/// Swap options 1 and 2 on every `Size` / `Colour` product.
pub async fn swap_options(inputs: &RunInputs, token: &RunToken) -> ReconcileResult<RunResult> {
    let (mut catalog, headers) = load_catalog(inputs, token).await?;

    let mut swapped = 0;
    for index in 0..catalog.len() {
        token.checkpoint()?;
        let group = catalog.group_mut(index);
        if swap_size_colour(group) {
            log_info(format!("[OPTIONS SWAPPED] {}", group.handle()));
            swapped += 1;
        }
    }
    log_info(format!("{} products swapped", swapped));

    let linked: Vec<String> = (1..=MAX_OPTIONS)
        .map(option_linked_to)
        .filter(|column| headers.contains(column))
        .collect();
    let columns: Vec<&str> = PRODUCT_COLUMNS
        .iter()
        .copied()
        .chain(linked.iter().map(String::as_str))
        .collect();
    finish(Operation::SwapOptions, &columns, catalog.edited_records(), RunReport::default(), token)
}

/// Dispatch an operation by kind.
pub async fn run_operation(
    operation: Operation,
    inputs: &RunInputs,
    registry: &VendorRegistry,
    token: &RunToken,
) -> ReconcileResult<RunResult> {
    match operation {
        Operation::Inventory => update_inventory(inputs, registry, token).await,
        Operation::UpdateProducts => update_products(inputs, registry, token).await,
        Operation::AddProducts => add_products(inputs, registry, token).await,
        Operation::SwapOptions => swap_options(inputs, token).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::{INVENTORY_SKU, ON_HAND};
    use crate::vendors::{non_empty, num};

    fn acme_sku(item: &Item) -> Option<String> {
        non_empty(item, "SKU")
    }

    fn acme_quantity(item: &Item) -> i64 {
        num(item, "Stock") as i64
    }

    fn acme_title(item: &Item) -> String {
        item.text("Title").to_string()
    }

    fn acme_price(item: &Item) -> f64 {
        num(item, "Cost") * 1.4 * 1.2 + 5.0
    }

    fn acme_rrp(item: &Item) -> f64 {
        match num(item, "RRP") {
            rrp if rrp > 0.0 => rrp,
            _ => acme_price(item),
        }
    }

    fn acme_barcode(item: &Item) -> Option<String> {
        item.get("EAN").map(str::to_string)
    }

    fn acme_images(item: &Item) -> Vec<String> {
        item.text("Images")
            .split('|')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn acme_variants(item: &Item) -> Vec<crate::models::OptionPair> {
        crate::vendors::options_from(item, &[("Size", "Size")])
    }

    fn acme_group(record: &Record) -> Option<String> {
        non_empty(record, "Group")
    }

    static ACME: Vendor = Vendor {
        update_inventory: true,
        update_products: true,
        add_products: true,
        expected_headers: &["SKU", "Title", "Stock", "Cost", "RRP", "EAN", "Images", "Size", "Group"],
        get_price: Some(acme_price),
        get_rrp: Some(acme_rrp),
        get_barcode: Some(acme_barcode),
        get_additional_images: Some(acme_images),
        get_variants: Some(acme_variants),
        get_variant_correlation_id: Some(acme_group),
        ..Vendor::new("acme", "Acme CSV", acme_sku, acme_quantity, acme_title)
    };

    const FEED_HEADER: &str = "SKU,Title,Stock,Cost,RRP,EAN,Images,Size,Group\n";

    fn registry() -> VendorRegistry {
        VendorRegistry::with_vendors(vec![&ACME])
    }

    fn feed_file(rows: &str) -> InputFile {
        InputFile::from_bytes("acme.csv", format!("{}{}", FEED_HEADER, rows).into_bytes())
    }

    fn products_file(rows: &[&[(&str, &str)]]) -> InputFile {
        let records: Vec<Record> = rows.iter().map(|r| Record::from_pairs(r.iter().copied())).collect();
        InputFile::from_bytes("products_export.csv", write_csv(PRODUCT_COLUMNS, &records).unwrap())
    }

    fn output_table(result: &RunResult) -> Table {
        let output = result.output.as_ref().expect("expected an output file");
        parse_bytes(&output.csv, &ParseOptions::default()).unwrap().table
    }

    const INVENTORY: &str = "Handle,Title,Option1 Name,Option1 Value,Option2 Name,Option2 Value,Option3 Name,Option3 Value,SKU,On hand\n\
red-shoe,Red Shoe,Title,Default Title,,,,,X1,3\n\
blue-hat,Blue Hat,Title,Default Title,,,,,X2,5\n";

    #[tokio::test]
    async fn test_inventory_caps_and_stages_changed_rows() {
        let inputs = RunInputs::new()
            .with_inventory(InputFile::from_bytes("inventory_export.csv", INVENTORY.as_bytes().to_vec()))
            .with_vendor("acme", feed_file("X1,Red Shoe,500,10,,,,,\nX2,Blue Hat,5,10,,,,,\nX9,Gone,1,10,,,,,\n"))
            .with_options(RunOptions {
                max_quantity: 50,
                ..RunOptions::default()
            });

        let result = update_inventory(&inputs, &registry(), &RunToken::new()).await.unwrap();

        let table = output_table(&result);
        assert_eq!(result.output.as_ref().unwrap().file_name, INVENTORY_UPDATE_FILE_NAME);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].text(INVENTORY_SKU), "X1");
        assert_eq!(table.records[0].text(ON_HAND), "50");

        let stats = &result.report.vendors[0];
        assert_eq!((stats.records, stats.matched, stats.not_found, stats.changed), (3, 2, 1, 1));
    }

    #[tokio::test]
    async fn test_inventory_without_changes_has_nothing_to_download() {
        let inputs = RunInputs::new()
            .with_inventory(InputFile::from_bytes("inventory_export.csv", INVENTORY.as_bytes().to_vec()))
            .with_vendor("acme", feed_file("X1,Red Shoe,3,10,,,,,\n"));

        let result = update_inventory(&inputs, &registry(), &RunToken::new()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.report.total_changed(), 0);
    }

    #[tokio::test]
    async fn test_missing_export_and_unknown_vendor() {
        let err = update_inventory(&RunInputs::new(), &registry(), &RunToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no shopify inventory CSV selected");
        assert!(err.is_expected());

        let inputs = RunInputs::new().with_vendor("nope", feed_file(""));
        let err = add_products(&inputs, &registry(), &RunToken::new()).await.unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownVendor(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_cancelled_run_produces_no_output() {
        let inputs = RunInputs::new()
            .with_inventory(InputFile::from_bytes("inventory_export.csv", INVENTORY.as_bytes().to_vec()))
            .with_vendor("acme", feed_file("X1,Red Shoe,500,10,,,,,\n"));
        let token = RunToken::new();
        token.cancel();

        let err = update_inventory(&inputs, &registry(), &token).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Cancelled));
    }

    #[test]
    fn test_cancel_stops_record_loop() {
        let table = parse_bytes(format!("{}X1,Red Shoe,500,10,,,,,\n", FEED_HEADER).as_bytes(), &ParseOptions::default())
            .unwrap()
            .table;
        let feed = VendorFeed::from_table(&ACME, table).unwrap();
        let mut inventory = Inventory::from_table(
            parse_bytes(INVENTORY.as_bytes(), &ParseOptions::default()).unwrap().table,
        );
        let mut staged = vec![false; inventory.len()];
        let token = RunToken::new();
        token.cancel();

        let result = reconcile_inventory(&mut inventory, &feed, &RunOptions::default(), &token, &mut staged);
        assert!(matches!(result, Err(ReconcileError::Cancelled)));
        assert!(staged.iter().all(|s| !s));
    }

    const SHOE: &[(&str, &str)] = &[
        (HANDLE, "red-shoe"),
        (TITLE, "Red Shoe"),
        (TAGS, "acme"),
        (VARIANT_SKU, "X1"),
        (VARIANT_PRICE, "30"),
        (VARIANT_COMPARE_AT_PRICE, "40"),
        (IMAGE_SRC, "shoe.jpg"),
    ];

    #[tokio::test]
    async fn test_product_update_then_second_run_is_idle() {
        let feed = "X1,Red Shoe,3,10,,5012345678900,a.jpg|b.jpg,,\n";
        let inputs = RunInputs::new()
            .with_products(products_file(&[SHOE]))
            .with_vendor("acme", feed_file(feed));

        let first = update_products(&inputs, &registry(), &RunToken::new()).await.unwrap();
        let table = output_table(&first);
        assert_eq!(table.len(), 3);
        let primary = &table.records[0];
        assert_eq!(primary.text(VARIANT_PRICE), "21.99");
        assert_eq!(primary.text(VARIANT_BARCODE), "'5012345678900");
        assert_eq!(primary.text(TAGS), "acme, sale");
        assert_eq!(primary.text(IMAGE_SRC), "shoe.jpg");
        assert_eq!(table.records[1].text(IMAGE_SRC), "a.jpg");

        let again = RunInputs::new()
            .with_products(InputFile::from_bytes("second.csv", first.output.unwrap().csv))
            .with_vendor("acme", feed_file(feed));
        let second = update_products(&again, &registry(), &RunToken::new()).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(second.report.vendors[0].matched, 1);
        assert_eq!(second.report.total_changed(), 0);
    }

    #[test]
    fn test_bad_price_skips_record_untouched() {
        let table = parse_bytes(
            format!("{}X1,Red Shoe,3,abc,,,,,\n", FEED_HEADER).as_bytes(),
            &ParseOptions::default(),
        )
        .unwrap()
        .table;
        let feed = VendorFeed::from_table(&ACME, table).unwrap();
        let mut catalog = Catalog::from_table(Table::new(vec![], vec![Record::from_pairs(SHOE.iter().copied())]));

        let stats = reconcile_products(&mut catalog, &feed, &RunOptions::default(), &RunToken::new()).unwrap();
        assert_eq!((stats.matched, stats.skipped, stats.changed), (1, 1, 0));
        assert!(!catalog.group(0).edited);
        assert_eq!(catalog.group(0).primary.text(VARIANT_PRICE), "30");
    }

    fn acme_main_image(item: &Item) -> String {
        acme_images(item).into_iter().next().unwrap_or_default()
    }

    fn acme_description(item: &Item) -> String {
        format!("<p>{} from the supplier</p>", item.text("Title"))
    }

    static ACME_MEDIA: Vendor = Vendor {
        update_products: true,
        expected_headers: &["SKU", "Title", "Stock", "Cost", "RRP", "EAN", "Images", "Size", "Group"],
        get_main_image_url: Some(acme_main_image),
        get_variant_image_url: Some(acme_main_image),
        get_description: Some(acme_description),
        ..Vendor::new("acme", "Acme CSV", acme_sku, acme_quantity, acme_title)
    };

    fn media_pass(product: &[(&str, &str)], options: RunOptions) -> (Catalog, VendorReport) {
        let table = parse_bytes(
            format!("{}X1,Red Shoe,3,10,,,new.jpg,,\n", FEED_HEADER).as_bytes(),
            &ParseOptions::default(),
        )
        .unwrap()
        .table;
        let feed = VendorFeed::from_table(&ACME_MEDIA, table).unwrap();
        let mut catalog = Catalog::from_table(Table::new(vec![], vec![Record::from_pairs(product.iter().copied())]));
        let stats = reconcile_products(&mut catalog, &feed, &options, &RunToken::new()).unwrap();
        (catalog, stats)
    }

    const DRESSED_SHOE: &[(&str, &str)] = &[
        (HANDLE, "red-shoe"),
        (TITLE, "Red Shoe"),
        (TAGS, "acme"),
        (VARIANT_SKU, "X1"),
        (VARIANT_PRICE, "30"),
        (VARIANT_COMPARE_AT_PRICE, "40"),
        (IMAGE_SRC, "shoe.jpg"),
        (VARIANT_IMAGE, "shoe-red.jpg"),
        (BODY_HTML, "<p>Written in house</p>"),
    ];

    #[test]
    fn test_existing_media_kept_without_flags() {
        let (catalog, stats) = media_pass(DRESSED_SHOE, RunOptions::default());

        let shoe = &catalog.group(0).primary;
        assert_eq!(shoe.text(IMAGE_SRC), "shoe.jpg");
        assert_eq!(shoe.text(VARIANT_IMAGE), "shoe-red.jpg");
        assert_eq!(shoe.text(BODY_HTML), "<p>Written in house</p>");
        assert_eq!(stats.changed, 0);
        assert!(!catalog.group(0).edited);
    }

    #[test]
    fn test_update_images_overwrites_main_and_variant_image() {
        let options = RunOptions {
            update_images: true,
            ..RunOptions::default()
        };
        let (catalog, stats) = media_pass(DRESSED_SHOE, options);

        let shoe = &catalog.group(0).primary;
        assert_eq!(shoe.text(IMAGE_SRC), "new.jpg");
        assert_eq!(shoe.text(VARIANT_IMAGE), "new.jpg");
        assert_eq!(shoe.text(BODY_HTML), "<p>Written in house</p>");
        assert_eq!(stats.changed, 1);
        assert!(catalog.group(0).edited);
    }

    #[test]
    fn test_update_descriptions_overwrites_body() {
        let options = RunOptions {
            update_descriptions: true,
            ..RunOptions::default()
        };
        let (catalog, stats) = media_pass(DRESSED_SHOE, options);

        let shoe = &catalog.group(0).primary;
        assert_eq!(shoe.text(BODY_HTML), "<p>Red Shoe from the supplier</p>");
        assert_eq!(shoe.text(IMAGE_SRC), "shoe.jpg");
        assert_eq!(stats.changed, 1);
    }

    #[test]
    fn test_missing_images_filled_without_flags() {
        let (catalog, stats) = media_pass(SHOE, RunOptions::default());

        let shoe = &catalog.group(0).primary;
        assert_eq!(shoe.text(IMAGE_SRC), "shoe.jpg");
        assert_eq!(shoe.text(VARIANT_IMAGE), "new.jpg");
        assert_eq!(stats.changed, 1);
    }

    #[tokio::test]
    async fn test_add_products_builds_groups_from_correlated_rows() {
        let feed = "X1,Red Shoe,3,10,,,,,\n\
N1,Bag Gloves,9,10,25,5012345678900,g.jpg,S,BG\n\
N2,Bag Gloves,2,10,25,,,M,BG\n\
007,Hand Wraps,1,10,,,,,\n";
        let inputs = RunInputs::new()
            .with_products(products_file(&[SHOE]))
            .with_vendor("acme", feed_file(feed));

        let result = add_products(&inputs, &registry(), &RunToken::new()).await.unwrap();
        let stats = &result.report.vendors[0];
        assert_eq!((stats.matched, stats.changed), (1, 3));

        let table = output_table(&result);
        assert!(table.headers.iter().any(|h| h == VARIANT_INVENTORY_QTY));
        let handles: Vec<&str> = table.records.iter().map(|r| r.text(HANDLE)).collect();
        assert_eq!(handles, vec!["acme-bag-gloves", "acme-bag-gloves", "acme-bag-gloves", "acme-hand-wraps"]);

        let gloves = &table.records[0];
        assert_eq!(gloves.text(TITLE), "Bag Gloves");
        assert_eq!(gloves.text(VARIANT_PRICE), "21.99");
        assert_eq!(gloves.text(VARIANT_COMPARE_AT_PRICE), "24.99");
        assert_eq!(gloves.text(VARIANT_INVENTORY_QTY), "5");
        assert_eq!(gloves.text(&option_name(1)), "Size");
        assert_eq!(gloves.text(&option_value(1)), "S");
        assert_eq!(gloves.text(TAGS), "new in, acme");
        assert_eq!(gloves.text(VARIANT_BARCODE), "'5012345678900");
        assert_eq!(table.records[1].text(IMAGE_SRC), "g.jpg");

        let variant = &table.records[2];
        assert_eq!(variant.text(VARIANT_SKU), "N2");
        assert_eq!(variant.text(TITLE), "");
        assert_eq!(variant.text(&option_value(1)), "M");

        let wraps = &table.records[3];
        assert_eq!(wraps.text(VARIANT_SKU), "'007");
        assert_eq!(wraps.text(&option_value(1)), "Default Title");
        assert_eq!(wraps.text(VARIANT_COMPARE_AT_PRICE), "21.99");
    }

    #[test]
    fn test_swap_size_colour() {
        let mut rows = vec![
            Record::from_pairs([
                (HANDLE, "tee"),
                (TITLE, "Tee"),
                ("Option1 Name", "Size"),
                ("Option1 Value", "M"),
                ("Option2 Name", "Colour"),
                ("Option2 Value", "Red"),
            ]),
            Record::from_pairs([(HANDLE, "tee"), ("Option1 Value", "L"), ("Option2 Value", "Blue")]),
        ];
        rows.push(Record::from_pairs([(HANDLE, "cap"), (TITLE, "Cap"), ("Option1 Name", "Colour")]));
        let mut catalog = Catalog::from_table(Table::new(vec![], rows));

        assert!(!swap_size_colour(catalog.group_mut(0)));
        assert!(swap_size_colour(catalog.group_mut(1)));

        let tee = catalog.group(1);
        assert_eq!(tee.primary.text("Option1 Name"), "Colour");
        assert_eq!(tee.primary.text("Option2 Value"), "M");
        assert_eq!(tee.secondary[0].text("Option1 Value"), "Blue");
        assert!(!tee.primary.record().contains_column("Option1 Linked To"));
    }
}
