//! Raw feed reshaping: turning multi-row supplier layouts into one record per
//! sellable item, ordering, and correlating variants with their first sibling.
//!
//! Suppliers use one of two layouts for products with variants:
//!
//! - **parent marker**: a row with a title and no SKU opens a product; the
//!   following SKU-less rows are its variants and carry their own codes in
//!   option columns. See [`parent_marker`].
//! - **typed rows**: a `Type` column says `Parent`, `Standard` or `Child`, and
//!   children name their parent by SKU. See [`typed_rows`].
//!
//! Both are single pass and keep row order.

use std::collections::HashMap;

use crate::api::logs::{log_error, log_warning};
use crate::models::Record;
use crate::vendors::RecordKey;

/// Column layout of a parent-marker export.
#[derive(Debug, Clone, Copy)]
pub struct ParentMarker {
    /// Identifying column; blank on parent and variant rows
    pub sku: &'static str,
    /// Column only a parent row fills in
    pub title: &'static str,
    /// `(target, source)` pairs copied from a variant row onto its parent
    pub overlays: &'static [(&'static str, &'static str)],
}

/// Flatten a parent-marker export.
///
/// Rows with a SKU pass through and close any open parent. A variant row
/// becomes a copy of the open parent with the overlay columns taken from the
/// variant. A variant with no open parent keeps only the overlay columns.
pub fn parent_marker(records: Vec<Record>, shape: &ParentMarker) -> Vec<Record> {
    let mut out = Vec::with_capacity(records.len());
    let mut parent: Option<Record> = None;

    for record in records {
        if record.has(shape.title) && !record.has(shape.sku) {
            parent = Some(record);
            continue;
        }

        if record.has(shape.sku) {
            out.push(record);
            parent = None;
            continue;
        }

        let mut variant = parent.clone().unwrap_or_default();
        for (target, source) in shape.overlays {
            variant.set(*target, record.text(source));
        }
        out.push(variant);
    }

    out
}

/// Column layout of a typed-row export.
#[derive(Debug, Clone, Copy)]
pub struct TypedRows {
    /// Vendor name for log messages
    pub vendor: &'static str,
    /// Discriminator column: `Parent`, `Standard` or `Child`
    pub kind: &'static str,
    pub sku: &'static str,
    /// Column on a child naming its parent's SKU
    pub parent_sku: &'static str,
    /// Column a child never overrides on its parent
    pub keep: &'static str,
}

/// Flatten a typed-row export.
///
/// Parents are held, standard rows pass through, and each child is emitted as
/// its parent overlaid with the child's non-empty fields. A child whose parent
/// is unknown is emitted alone and stands in as a parent for later rows.
pub fn typed_rows(records: Vec<Record>, shape: &TypedRows) -> Vec<Record> {
    let mut out = Vec::with_capacity(records.len());
    let mut parents: HashMap<String, Record> = HashMap::new();

    for record in records {
        match record.text(shape.kind) {
            "Parent" => {
                let sku = record.text(shape.sku).to_string();
                if parents.contains_key(&sku) {
                    log_error(format!("{} duplicate parent SKU {}", shape.vendor, sku));
                    continue;
                }
                parents.insert(sku, record);
            }
            "Standard" => out.push(record),
            "Child" => match parents.get(record.text(shape.parent_sku)) {
                Some(parent) => {
                    let mut merged = parent.clone();
                    for (column, value) in record.iter() {
                        if column != shape.keep && !value.is_empty() {
                            merged.set(column, value);
                        }
                    }
                    out.push(merged);
                }
                None => {
                    log_warning(format!(
                        "{} dangling child/variant without parent SKU {}",
                        shape.vendor,
                        record.text(shape.sku)
                    ));
                    parents.insert(record.text(shape.sku).to_string(), record.clone());
                    out.push(record);
                }
            },
            _ => {}
        }
    }

    out
}

/// Stable sort by a record key, ignoring case. Keys equal up to case keep
/// their input order.
pub fn order_by(records: &mut [Record], key: RecordKey) {
    records.sort_by_cached_key(|r| key(r).unwrap_or_default().to_lowercase());
}

/// For every record, the index of the first earlier record with the same
/// correlation id. Records without an id, and the first of each id, map to `None`.
pub fn correlate(records: &[Record], key: RecordKey) -> Vec<Option<usize>> {
    let mut first: HashMap<String, usize> = HashMap::new();
    records
        .iter()
        .enumerate()
        .map(|(i, record)| match key(record).filter(|id| !id.is_empty()) {
            Some(id) => match first.get(&id) {
                Some(&representative) => Some(representative),
                None => {
                    first.insert(id, i);
                    None
                }
            },
            None => None,
        })
        .collect()
}
