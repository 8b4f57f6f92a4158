//! In-memory Shopify catalog: product groups, the flat inventory list, and
//! flattening back to rows for output.
//!
//! # Product groups
//!
//! The product export has one row per variant plus image-only rows, all
//! sharing a `Handle`. Rows are stably sorted by handle and consecutive rows
//! with the same handle form a [`ProductGroup`]: the first row is the
//! primary (it carries title, tags, body and vendor), the rest are secondary.
//!
//! ```text
//! Handle   Title       Variant SKU   Image Src
//! shoe-1   Red Shoe    X1            a.jpg      ─┐ primary
//! shoe-1               X2                        ├ secondary
//! shoe-1                             b.jpg      ─┘ secondary (image only)
//! ```
//!
//! Groups start unedited; any mutation sets `edited` and only edited groups
//! are written back.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

use crate::models::columns::{
    HANDLE, IMAGE_SRC, INVENTORY_SKU, ON_HAND, ON_HAND_CURRENT, ON_HAND_NEW, TAGS, TITLE,
    VARIANT_BARCODE, VARIANT_SKU,
};
use crate::models::{Record, TagSet, Table};
use crate::transform::normalize::{parse_barcode, parse_sku, Barcode};

/// Import label of the Shopify product export.
pub const PRODUCTS_LABEL: &str = "Shopify products CSV";

/// Import label of the Shopify inventory export.
pub const INVENTORY_LABEL: &str = "Shopify inventory CSV";

// =============================================================================
// Rows
// =============================================================================

/// One catalog row with its normalized SKU and lazily parsed barcode.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    record: Record,
    sku: String,
    barcode: OnceCell<Barcode>,
}

impl CatalogRow {
    pub fn new(record: Record) -> Self {
        let sku = parse_sku(record.text(VARIANT_SKU)).unwrap_or("").to_string();
        Self {
            record,
            sku,
            barcode: OnceCell::new(),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Normalized variant SKU, empty for image-only rows.
    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn barcode(&self) -> &Barcode {
        self.barcode
            .get_or_init(|| parse_barcode(self.record.get(VARIANT_BARCODE)))
    }

    pub fn text(&self, column: &str) -> &str {
        self.record.text(column)
    }

    /// Set a column, keeping the cached SKU and barcode in step.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.record.set(column, value);
        if column == VARIANT_BARCODE {
            self.barcode = OnceCell::new();
        } else if column == VARIANT_SKU {
            self.sku = parse_sku(self.record.text(VARIANT_SKU)).unwrap_or("").to_string();
        }
    }

    /// An extra gallery image: image set, no title, no SKU.
    pub fn is_image_only(&self) -> bool {
        self.record.has(IMAGE_SRC) && !self.record.has(TITLE) && !self.record.has(VARIANT_SKU)
    }
}

/// Position of a row within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Primary,
    Secondary(usize),
}

/// Address of a row in the catalog. Orders like the catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowRef {
    pub group: usize,
    pub slot: Slot,
}

// =============================================================================
// Product groups
// =============================================================================

/// One product: its primary row and the rows sharing its handle.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub primary: CatalogRow,
    pub secondary: Vec<CatalogRow>,
    pub edited: bool,
}

impl ProductGroup {
    pub fn new(primary: CatalogRow) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
            edited: false,
        }
    }

    pub fn handle(&self) -> &str {
        self.primary.text(HANDLE)
    }

    pub fn title(&self) -> &str {
        self.primary.text(TITLE)
    }

    pub fn tags(&self) -> TagSet {
        TagSet::parse(self.primary.text(TAGS))
    }

    pub fn row(&self, slot: Slot) -> Option<&CatalogRow> {
        match slot {
            Slot::Primary => Some(&self.primary),
            Slot::Secondary(i) => self.secondary.get(i),
        }
    }

    pub fn row_mut(&mut self, slot: Slot) -> Option<&mut CatalogRow> {
        match slot {
            Slot::Primary => Some(&mut self.primary),
            Slot::Secondary(i) => self.secondary.get_mut(i),
        }
    }

    /// Rows in file order with their slots.
    pub fn rows(&self) -> impl Iterator<Item = (Slot, &CatalogRow)> {
        std::iter::once((Slot::Primary, &self.primary)).chain(
            self.secondary
                .iter()
                .enumerate()
                .map(|(i, row)| (Slot::Secondary(i), row)),
        )
    }

    /// Mutable rows in file order.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut CatalogRow> {
        std::iter::once(&mut self.primary).chain(self.secondary.iter_mut())
    }

    pub fn has_image_only_rows(&self) -> bool {
        self.secondary.iter().any(CatalogRow::is_image_only)
    }

    /// Records of every row, primary first.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.rows().map(|(_, row)| row.record())
    }
}

/// Grouped product catalog with a SKU index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    groups: Vec<ProductGroup>,
    sku_index: HashMap<String, Vec<RowRef>>,
}

impl Catalog {
    /// Group a product export by handle.
    pub fn from_table(table: Table) -> Self {
        let mut records = table.records;
        records.sort_by(|a, b| a.text(HANDLE).cmp(b.text(HANDLE)));

        let mut catalog = Self::default();
        for record in records {
            let row = CatalogRow::new(record);
            let same_handle = catalog
                .groups
                .last()
                .is_some_and(|g| g.handle() == row.text(HANDLE));
            if same_handle {
                let group = catalog.groups.len() - 1;
                catalog.push_secondary(group, row);
            } else {
                catalog.push_group(ProductGroup::new(row));
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[ProductGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> &ProductGroup {
        &self.groups[index]
    }

    pub fn group_mut(&mut self, index: usize) -> &mut ProductGroup {
        &mut self.groups[index]
    }

    pub fn row(&self, at: RowRef) -> Option<&CatalogRow> {
        self.groups.get(at.group).and_then(|g| g.row(at.slot))
    }

    /// Rows with this normalized SKU, in catalog order.
    pub fn candidates(&self, sku: &str) -> &[RowRef] {
        self.sku_index.get(sku).map(Vec::as_slice).unwrap_or(&[])
    }

    fn index(&mut self, sku: &str, at: RowRef) {
        if sku.is_empty() {
            return;
        }
        let refs = self.sku_index.entry(sku.to_string()).or_default();
        let pos = refs.partition_point(|r| *r < at);
        refs.insert(pos, at);
    }

    /// Append a new product. Returns its group index.
    pub fn push_group(&mut self, group: ProductGroup) -> usize {
        let index = self.groups.len();
        let refs: Vec<(String, RowRef)> = group
            .rows()
            .map(|(slot, row)| (row.sku().to_string(), RowRef { group: index, slot }))
            .collect();
        self.groups.push(group);
        for (sku, at) in refs {
            self.index(&sku, at);
        }
        index
    }

    /// Append a row to an existing product.
    pub fn push_secondary(&mut self, group: usize, row: CatalogRow) -> RowRef {
        let target = &mut self.groups[group];
        let at = RowRef {
            group,
            slot: Slot::Secondary(target.secondary.len()),
        };
        let sku = row.sku().to_string();
        target.secondary.push(row);
        self.index(&sku, at);
        at
    }

    pub fn edited_groups(&self) -> impl Iterator<Item = &ProductGroup> {
        self.groups.iter().filter(|g| g.edited)
    }

    /// Rows of edited groups, whole groups in catalog order.
    pub fn edited_records(&self) -> impl Iterator<Item = &Record> {
        self.edited_groups().flat_map(ProductGroup::records)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// One inventory row with its normalized SKU.
#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub record: Record,
    sku: String,
}

impl InventoryRow {
    pub fn sku(&self) -> &str {
        &self.sku
    }
}

/// Flat Shopify inventory export.
///
/// Older exports have a single `On hand` column that is both read and
/// written. Newer ones split it into `On hand (current)`, read, and
/// `On hand (new)`, written.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub headers: Vec<String>,
    rows: Vec<InventoryRow>,
    sku_index: HashMap<String, Vec<usize>>,
    current_column: &'static str,
    new_column: &'static str,
}

impl Inventory {
    pub fn from_table(table: Table) -> Self {
        let has = |c: &str| table.headers.iter().any(|h| h == c);
        let (current_column, new_column) = if has(ON_HAND_NEW) || has(ON_HAND_CURRENT) {
            (ON_HAND_CURRENT, ON_HAND_NEW)
        } else {
            (ON_HAND, ON_HAND)
        };

        let mut rows = Vec::with_capacity(table.records.len());
        let mut sku_index: HashMap<String, Vec<usize>> = HashMap::new();
        for record in table.records {
            let sku = parse_sku(record.text(INVENTORY_SKU)).unwrap_or("").to_string();
            if !sku.is_empty() {
                sku_index.entry(sku.clone()).or_default().push(rows.len());
            }
            rows.push(InventoryRow { record, sku });
        }

        let mut headers = table.headers;
        if !headers.iter().any(|h| h == new_column) {
            headers.push(new_column.to_string());
        }

        Self {
            headers,
            rows,
            sku_index,
            current_column,
            new_column,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &InventoryRow {
        &self.rows[index]
    }

    /// Row indices with this normalized SKU, in file order.
    pub fn candidates(&self, sku: &str) -> &[usize] {
        self.sku_index.get(sku).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current on-hand value of a row as text.
    pub fn on_hand(&self, index: usize) -> &str {
        self.rows[index].record.text(self.current_column)
    }

    /// Write the new on-hand value of a row.
    pub fn set_on_hand(&mut self, index: usize, quantity: i64) {
        let column = self.new_column;
        self.rows[index].record.set(column, quantity.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(handle: &str, title: &str, sku: &str, image: &str) -> Record {
        Record::from_pairs([
            (HANDLE, handle),
            (TITLE, title),
            (VARIANT_SKU, sku),
            (IMAGE_SRC, image),
            (VARIANT_BARCODE, ""),
        ])
    }

    fn table(records: Vec<Record>) -> Table {
        Table::new(vec![HANDLE.into(), TITLE.into(), VARIANT_SKU.into(), IMAGE_SRC.into()], records)
    }

    #[test]
    fn test_group_invariant() {
        let catalog = Catalog::from_table(table(vec![
            product("shoe-1", "Red Shoe", "X1", "a.jpg"),
            product("shoe-1", "", "X2", ""),
            product("shoe-1", "", "", "b.jpg"),
        ]));

        assert_eq!(catalog.len(), 1);
        let group = catalog.group(0);
        assert_eq!(group.secondary.len(), 2);
        assert!(group.rows().all(|(_, r)| r.text(HANDLE) == "shoe-1"));
        assert_eq!(group.primary.sku(), "X1");
        assert!(!group.edited);
        assert!(group.has_image_only_rows());
    }

    #[test]
    fn test_rows_sorted_by_handle_stably() {
        let catalog = Catalog::from_table(table(vec![
            product("b", "B", "B1", ""),
            product("a", "A", "A1", ""),
            product("b", "", "B2", ""),
        ]));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.group(0).handle(), "a");
        assert_eq!(catalog.group(1).primary.sku(), "B1");
        assert_eq!(catalog.group(1).secondary[0].sku(), "B2");
    }

    #[test]
    fn test_sku_index_normalizes_and_tracks_additions() {
        let mut catalog = Catalog::from_table(table(vec![
            product("a", "A", "'007", ""),
            product("c", "C", "X", ""),
        ]));
        assert_eq!(catalog.candidates("007"), &[RowRef { group: 0, slot: Slot::Primary }]);

        let at = catalog.push_secondary(0, CatalogRow::new(product("a", "", "X", "")));
        let refs = catalog.candidates("X");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], at);
        assert_eq!(refs[1].group, 1);
    }

    #[test]
    fn test_barcode_cache_invalidated_on_set() {
        let mut row = CatalogRow::new(product("a", "A", "X", ""));
        assert_eq!(row.barcode(), &Barcode::DoesNotApply);
        row.set(VARIANT_BARCODE, "'123456789012");
        assert_eq!(row.barcode().as_str(), "123456789012");
    }

    #[test]
    fn test_edited_records_whole_groups_only() {
        let mut catalog = Catalog::from_table(table(vec![
            product("a", "A", "A1", ""),
            product("a", "", "A2", ""),
            product("b", "B", "B1", ""),
        ]));
        catalog.group_mut(0).edited = true;
        let skus: Vec<&str> = catalog.edited_records().map(|r| r.text(VARIANT_SKU)).collect();
        assert_eq!(skus, vec!["A1", "A2"]);
    }

    #[test]
    fn test_inventory_schema_versions() {
        let legacy = Inventory::from_table(Table::new(
            vec!["SKU".into(), ON_HAND.into()],
            vec![Record::from_pairs([("SKU", "A"), (ON_HAND, "3")])],
        ));
        assert_eq!(legacy.on_hand(0), "3");

        let mut split = Inventory::from_table(Table::new(
            vec!["SKU".into(), ON_HAND_CURRENT.into(), ON_HAND_NEW.into()],
            vec![Record::from_pairs([("SKU", "'0012"), (ON_HAND_CURRENT, "3"), (ON_HAND_NEW, "")])],
        ));
        assert_eq!(split.candidates("0012"), &[0]);
        split.set_on_hand(0, 5);
        assert_eq!(split.on_hand(0), "3");
        assert_eq!(split.row(0).record.text(ON_HAND_NEW), "5");
    }
}
