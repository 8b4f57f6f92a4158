//! Run options and engine constants.
//!
//! Per-run settings arrive from the CLI or the upload form as [`RunOptions`].
//! Everything else is fixed business data kept here in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output file for the inventory update.
pub const INVENTORY_UPDATE_FILE_NAME: &str = "completed_inventory_update_for_shopify.csv";

/// Output file for the product update.
pub const PRODUCTS_UPDATE_FILE_NAME: &str = "completed_products_update_for_shopify.csv";

/// Output file for product additions.
pub const NEW_PRODUCTS_FILE_NAME: &str = "new_products_for_shopify.csv";

/// Output file for the option swap.
pub const SWAPPED_OPTIONS_FILE_NAME: &str = "swapped_options_for_shopify.csv";

/// Stock cap used when the form leaves it untouched.
pub const DEFAULT_MAX_QUANTITY: i64 = 5;

/// Quantity assumed for suppliers that only say "True" for in stock.
pub const IN_STOCK_FALLBACK_QUANTITY: i64 = 25;

/// A row is on sale when `price / compare_at <= SALE_RATIO`.
pub const SALE_RATIO: f64 = 0.7;

/// Titles at or below this similarity are treated as a SKU collision.
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.4;

/// Destination schema limit for the weight column.
pub const MAX_WEIGHT: f64 = 999.0;

/// Shopify supports at most three options per product.
pub const MAX_OPTIONS: usize = 3;

/// Category and fallback type for synthesized products.
pub const DEFAULT_PRODUCT_CATEGORY: &str = "Sporting Goods";

/// Tag kept in step with the on-sale state of a product.
pub const SALE_TAG: &str = "sale";

/// Tag every synthesized product or variant receives.
pub const NEW_IN_TAG: &str = "new in";

/// Royal Mail small parcel rate.
pub const SMALL_PARCEL_SHIPPING: f64 = 5.0;

/// Royal Mail large parcel rate.
pub const LARGE_PARCEL_SHIPPING: f64 = 20.0;

/// Upload limit per request (50 MB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Options for a single reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunOptions {
    /// Cap applied to every supplier quantity
    pub max_quantity: i64,

    /// Overwrite main and variant images even when already set
    pub update_images: bool,

    /// Overwrite the product body with the supplier description
    pub update_descriptions: bool,

    /// Emit debug-level logs
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_quantity: DEFAULT_MAX_QUANTITY,
            update_images: false,
            update_descriptions: false,
            verbose: false,
        }
    }
}

/// Build timestamp in milliseconds since epoch, if the build provided one.
fn build_time_millis() -> Option<i64> {
    option_env!("BUILD_TIME")
        .map(str::to_string)
        .or_else(|| std::env::var("BUILD_TIME").ok())
        .and_then(|raw| raw.trim().parse::<i64>().ok())
}

/// Human-readable version label: package version plus build date when known.
pub fn version_label() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match build_time_millis().and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(built) => format!("{} ({})", version, built.format("%A, %-d %B %Y at %H:%M:%S UTC")),
        None => version.to_string(),
    }
}
