//! Pairing supplier records with catalog rows.
//!
//! Supplier SKUs are not unique across suppliers and supplier titles and
//! barcodes are unreliable, so a SKU hit is only accepted after the
//! corroborating checks available for the vendor. Checks run in a fixed
//! order and stop at the first decisive one:
//!
//! 1. candidates with an equal normalized SKU (none: not found)
//! 2. the vendor's deny list (denied: not found)
//! 3. product catalog only: the product must carry the vendor's name as a tag
//! 4. barcodes, when the vendor relies on them or both sides have one:
//!    equal barcodes accept immediately, anything else is a warning and
//!    falls through
//! 5. titles, when the vendor asks for it: similarity at or below the
//!    threshold rejects
//! 6. otherwise the SKU alone is enough
//!
//! The first accepted candidate in catalog order wins.

use crate::api::logs::{log_error, log_warning};
use crate::config::TITLE_SIMILARITY_THRESHOLD;
use crate::models::TagSet;
use crate::transform::catalog::{Catalog, Inventory, RowRef};
use crate::transform::feed::Probe;
use crate::transform::normalize::Barcode;
use crate::vendors::Vendor;

/// Which signal settled an accepted match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchBasis {
    /// SKU only, no corroborating check applied
    Sku,
    /// Equal barcodes
    Barcode,
    /// Title similarity above the threshold
    Title(f64),
}

/// An accepted match and the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct MatchOutcome<R> {
    pub row: R,
    pub basis: MatchBasis,
    pub warnings: Vec<String>,
}

/// Why no row was matched. All variants mean "not found" to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NoCandidate,
    Denied,
    MissingVendorTag,
    TitleMismatch(f64),
}

/// Catalog side of a comparison.
struct Candidate<'a> {
    sku: &'a str,
    title: &'a str,
    barcode: Option<&'a Barcode>,
    tags: Option<TagSet>,
}

impl Candidate<'_> {
    fn label(&self) -> String {
        match self.barcode {
            Some(barcode) => format!("{} ({}/{})", self.sku, self.title, barcode),
            None => format!("{} ({})", self.sku, self.title),
        }
    }
}

/// Dice coefficient over character bigrams. Case counts.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b)
}

fn check(vendor: &Vendor, probe: &Probe<'_>, candidate: &Candidate<'_>) -> Result<(MatchBasis, Vec<String>), Rejection> {
    let mut warnings = Vec::new();

    if let Some(tags) = &candidate.tags {
        if !tags.contains(vendor.name) {
            log_warning(format!(
                "{} SKU {} matches SKU but the matched shopify product is missing {} tag {} ({}). Not matching.",
                vendor.name,
                probe.label(),
                vendor.name,
                candidate.label(),
                tags
            ));
            return Err(Rejection::MissingVendorTag);
        }
    }

    if let Some(barcode) = candidate.barcode {
        let applies = vendor.use_barcode_for_exclusive_matching
            || (probe.barcode.is_valid() && barcode.is_valid());
        if applies {
            if probe.barcode.is_valid() && probe.barcode == barcode {
                return Ok((MatchBasis::Barcode, warnings));
            }
            let warning = format!(
                "{} SKU {} matches SKU but barcode diverged from shopify product {}",
                vendor.name,
                probe.label(),
                candidate.label()
            );
            log_warning(&warning);
            warnings.push(warning);
        }
    }

    if vendor.use_title_for_matching {
        let similarity = title_similarity(&probe.title, candidate.title);
        if similarity <= TITLE_SIMILARITY_THRESHOLD {
            log_error(format!(
                "{} SKU {} matches SKU but does not match shopify product title {}. ({:.2} similar)",
                vendor.name,
                probe.label(),
                candidate.label(),
                similarity
            ));
            return Err(Rejection::TitleMismatch(similarity));
        }
        return Ok((MatchBasis::Title(similarity), warnings));
    }

    Ok((MatchBasis::Sku, warnings))
}

/// Walk candidates in order; first acceptance wins, else the first rejection.
fn first_accepted<'c, R: Copy>(
    vendor: &Vendor,
    probe: &Probe<'_>,
    refs: &[R],
    candidate: impl Fn(R) -> Option<Candidate<'c>>,
) -> Result<MatchOutcome<R>, Rejection> {
    if refs.is_empty() {
        return Err(Rejection::NoCandidate);
    }
    if vendor.is_denied(&probe.sku) {
        return Err(Rejection::Denied);
    }

    let mut rejection = Rejection::NoCandidate;
    for (i, &row) in refs.iter().enumerate() {
        let Some(c) = candidate(row) else { continue };
        match check(vendor, probe, &c) {
            Ok((basis, warnings)) => return Ok(MatchOutcome { row, basis, warnings }),
            Err(r) if i == 0 => rejection = r,
            Err(_) => {}
        }
    }
    Err(rejection)
}

/// Match against the flat inventory: SKU plus title, never barcodes or tags.
pub fn match_inventory(
    vendor: &Vendor,
    probe: &Probe<'_>,
    inventory: &Inventory,
) -> Result<MatchOutcome<usize>, Rejection> {
    first_accepted(vendor, probe, inventory.candidates(&probe.sku), |i| {
        let row = inventory.row(i);
        Some(Candidate {
            sku: row.sku(),
            title: row.record.text(crate::models::columns::TITLE),
            barcode: None,
            tags: None,
        })
    })
}

/// Match against the grouped product catalog with every check.
///
/// Titles and tags come from the product's primary row.
pub fn match_product(
    vendor: &Vendor,
    probe: &Probe<'_>,
    catalog: &Catalog,
) -> Result<MatchOutcome<RowRef>, Rejection> {
    first_accepted(vendor, probe, catalog.candidates(&probe.sku), |at| {
        let row = catalog.row(at)?;
        let group = catalog.group(at.group);
        Some(Candidate {
            sku: row.sku(),
            title: group.title(),
            barcode: Some(row.barcode()),
            tags: Some(group.tags()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::{HANDLE, TAGS, TITLE, VARIANT_BARCODE, VARIANT_SKU};
    use crate::models::{Record, Table};
    use crate::transform::normalize::parse_barcode;
    use crate::vendors::Item;

    fn sku(item: &Item) -> Option<String> {
        item.get("SKU").map(str::to_string)
    }

    fn qty(_item: &Item) -> i64 {
        0
    }

    fn title(item: &Item) -> String {
        item.text("Title").to_string()
    }

    const STRICT: Vendor = Vendor {
        use_barcode_for_exclusive_matching: true,
        use_title_for_matching: true,
        deny: &["BAD"],
        ..Vendor::new("acme", "Acme CSV", sku, qty, title)
    };

    const LOOSE: Vendor = Vendor::new("acme", "Acme CSV", sku, qty, title);

    fn catalog(rows: &[(&str, &str, &str, &str, &str)]) -> Catalog {
        let records = rows
            .iter()
            .map(|(handle, title, sku, barcode, tags)| {
                Record::from_pairs([
                    (HANDLE, *handle),
                    (TITLE, *title),
                    (VARIANT_SKU, *sku),
                    (VARIANT_BARCODE, *barcode),
                    (TAGS, *tags),
                ])
            })
            .collect();
        Catalog::from_table(Table::new(vec![], records))
    }

    fn probe<'a>(sku: &str, title: &str, barcode: &'a Barcode) -> Probe<'a> {
        Probe {
            sku: sku.to_string(),
            title: title.to_string(),
            barcode,
        }
    }

    #[test]
    fn test_barcode_mismatch_title_rescues() {
        let cat = catalog(&[("red-shoe", "Red Shoe Classic", "X1", "999", "acme")]);
        let barcode = parse_barcode(Some("000"));
        let outcome = match_product(&STRICT, &probe("X1", "Red Shoe", &barcode), &cat).unwrap();

        assert!(matches!(outcome.basis, MatchBasis::Title(s) if s > 0.4));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("barcode diverged"));
    }

    #[test]
    fn test_title_similarity_is_case_sensitive() {
        assert_eq!(title_similarity("Boxing Gloves", "Boxing Gloves"), 1.0);
        assert!(title_similarity("BOXING GLOVES", "boxing gloves") < 0.4);
        assert!(title_similarity("Boxing Gloves", "boxing gloves") > 0.4);
    }

    #[test]
    fn test_title_mismatch_rejects() {
        let cat = catalog(&[("blue-hat", "Blue Hat", "X1", "999", "acme")]);
        let barcode = parse_barcode(Some("000"));
        let err = match_product(&STRICT, &probe("X1", "Red Shoe", &barcode), &cat).unwrap_err();
        assert!(matches!(err, Rejection::TitleMismatch(s) if s <= 0.4));
    }

    #[test]
    fn test_equal_barcodes_confirm() {
        let cat = catalog(&[("blue-hat", "Blue Hat", "X1", "'5012345678900", "acme")]);
        let barcode = parse_barcode(Some("5012345678900"));
        let outcome = match_product(&STRICT, &probe("X1", "Red Shoe", &barcode), &cat).unwrap();
        assert_eq!(outcome.basis, MatchBasis::Barcode);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_missing_vendor_tag() {
        let cat = catalog(&[("red-shoe", "Red Shoe", "X1", "", "other, new in")]);
        let barcode = Barcode::DoesNotApply;
        let err = match_product(&LOOSE, &probe("X1", "Red Shoe", &barcode), &cat).unwrap_err();
        assert_eq!(err, Rejection::MissingVendorTag);
    }

    #[test]
    fn test_deny_and_no_candidate() {
        let cat = catalog(&[("bad", "Bad", "BAD", "", "acme")]);
        let barcode = Barcode::DoesNotApply;
        assert_eq!(match_product(&STRICT, &probe("BAD", "Bad", &barcode), &cat).unwrap_err(), Rejection::Denied);
        assert_eq!(match_product(&STRICT, &probe("NOPE", "Bad", &barcode), &cat).unwrap_err(), Rejection::NoCandidate);
    }

    #[test]
    fn test_sku_alone_without_checks() {
        let cat = catalog(&[("a", "Anything", "X1", "", "acme")]);
        let barcode = Barcode::DoesNotApply;
        let outcome = match_product(&LOOSE, &probe("X1", "Unrelated", &barcode), &cat).unwrap();
        assert_eq!(outcome.basis, MatchBasis::Sku);
    }

    #[test]
    fn test_both_missing_barcodes_never_confirm() {
        let cat = catalog(&[("a", "Blue Hat", "X1", "", "acme")]);
        let barcode = Barcode::DoesNotApply;
        let err = match_product(&STRICT, &probe("X1", "Red Shoe", &barcode), &cat).unwrap_err();
        assert!(matches!(err, Rejection::TitleMismatch(_)));
    }

    #[test]
    fn test_first_accepted_candidate_wins() {
        let cat = catalog(&[
            ("a-hat", "Blue Hat", "X1", "", "acme"),
            ("b-shoe", "Red Shoe", "X1", "", "acme"),
            ("c-shoe", "Red Shoe", "X1", "", "acme"),
        ]);
        let barcode = Barcode::DoesNotApply;
        let outcome = match_product(&STRICT, &probe("X1", "Red Shoe", &barcode), &cat).unwrap();
        assert_eq!(outcome.row.group, 1);
    }

    #[test]
    fn test_inventory_ignores_barcodes() {
        let inv = Inventory::from_table(Table::new(
            vec!["SKU".into(), "Title".into(), "On hand".into()],
            vec![Record::from_pairs([("SKU", "X1"), ("Title", "Red Shoe Classic"), ("On hand", "1")])],
        ));
        let barcode = parse_barcode(Some("000"));
        let outcome = match_inventory(&STRICT, &probe("X1", "Red Shoe", &barcode), &inv).unwrap();
        assert_eq!(outcome.row, 0);
        assert!(outcome.warnings.is_empty());
    }
}
