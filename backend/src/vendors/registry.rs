//! Vendor Registry - look up adapters by name and recognise feeds by their headers.

use super::{blitz, cartas, muaythai, reydon, unicorn, Vendor};

/// Adapters shipped with the engine, in processing order.
///
/// Order matters: a later vendor's additions can attach to products an
/// earlier vendor created in the same run.
pub static BUILT_IN: &[Vendor] = &[
    reydon::REYDON,
    reydon::REYDON_INVENTORY,
    cartas::CARTAS,
    cartas::CARTAS_PRODUCTS,
    unicorn::UNICORN,
    muaythai::MUAYTHAI,
    blitz::BLITZ,
];

/// Registry of vendor adapters.
#[derive(Debug, Clone)]
pub struct VendorRegistry {
    vendors: Vec<&'static Vendor>,
}

impl VendorRegistry {
    /// Registry holding every built-in adapter.
    pub fn new() -> Self {
        Self::with_vendors(BUILT_IN.iter().collect())
    }

    /// Registry with a custom adapter list.
    pub fn with_vendors(vendors: Vec<&'static Vendor>) -> Self {
        Self { vendors }
    }

    /// All adapters, in processing order
    pub fn list(&self) -> &[&'static Vendor] {
        &self.vendors
    }

    /// Get an adapter by name
    pub fn get(&self, name: &str) -> Option<&'static Vendor> {
        self.vendors.iter().copied().find(|v| v.name == name)
    }

    /// Find adapters whose expected headers appear in `csv_columns`.
    /// Returns adapters sorted by compatibility score, best first.
    pub fn find_compatible(&self, csv_columns: &[String]) -> Vec<(&'static Vendor, f64)> {
        let mut compatible: Vec<_> = self
            .vendors
            .iter()
            .filter_map(|v| {
                let score = self.calculate_compatibility(v.expected_headers, csv_columns);
                if score > 0.5 {
                    Some((*v, score))
                } else {
                    None
                }
            })
            .collect();

        compatible.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        compatible
    }

    /// Fraction of expected headers present in the CSV columns (case-insensitive).
    fn calculate_compatibility(&self, expected: &[&str], csv: &[String]) -> f64 {
        if expected.is_empty() {
            return 0.0;
        }

        let csv_lower: Vec<String> = csv.iter().map(|c| c.to_lowercase()).collect();
        let match_count = expected
            .iter()
            .filter(|col| csv_lower.contains(&col.to_lowercase()))
            .count();

        match_count as f64 / expected.len() as f64
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_names_unique() {
        let registry = VendorRegistry::new();
        for (i, a) in registry.list().iter().enumerate() {
            for b in &registry.list()[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_get_by_name() {
        let registry = VendorRegistry::new();
        assert_eq!(registry.get("blitz").map(|v| v.import_label), Some("Blitz CSV"));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_compatibility_score() {
        let registry = VendorRegistry::new();
        let score = registry.calculate_compatibility(
            &["Product Name", "Code", "Quantity"],
            &cols(&["Code", "Quantity", "Location"]),
        );
        assert!((score - 0.666).abs() < 0.01); // 2/3 match
    }

    #[test]
    fn test_case_insensitive_match() {
        let registry = VendorRegistry::new();
        let score = registry.calculate_compatibility(&["sku", "QTY"], &cols(&["SKU", "qty"]));
        assert!((score - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_detect_unicorn_feed() {
        let registry = VendorRegistry::new();
        let found = registry.find_compatible(&cols(&["SKU", "QTY", "Barcode EAN/UPC", "Description"]));
        assert_eq!(found[0].0.name, "unicorn");
        assert!((found[0].1 - 1.0).abs() < 1e-9);
    }
}
