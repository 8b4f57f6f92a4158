//! # Stocksync - Shopify catalog reconciliation against supplier feeds
//!
//! Stocksync reads a Shopify inventory or product export together with the
//! stock and product files of each supplier, and produces the minimal CSV to
//! import back into Shopify.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Vendor CSV  │────▶│   Parser    │────▶│   Vendor    │────▶│   Matcher   │
//! │ (csv / zip) │     │  (auto-enc) │     │  adapters   │     │ SKU+barcode │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    ▼
//! ┌─────────────┐     ┌─────────────┐                          ┌─────────────┐
//! │ Shopify CSV │────▶│   Catalog   │─────────────────────────▶│  Pipeline   │──▶ changed rows
//! │  (export)   │     │  (grouped)  │                          │ (4 passes)  │
//! └─────────────┘     └─────────────┘                          └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stocksync::{update_products, InputFile, RunInputs, RunToken, VendorRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let inputs = RunInputs::new()
//!         .with_products(InputFile::from_path("products_export.csv"))
//!         .with_vendor("reydon", InputFile::from_path("reydon.zip"));
//!     let result = update_products(&inputs, &VendorRegistry::new(), &RunToken::new()).await.unwrap();
//!     println!("{} rows changed", result.report.total_changed());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Run options and engine constants
//! - [`models`] - Records, tables, tags and Shopify column names
//! - [`parser`] - CSV and zip input with encoding detection
//! - [`validation`] - Header checks
//! - [`vendors`] - Supplier adapters and their registry
//! - [`transform`] - Catalog model, matcher and reconciliation operations
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Suppliers
pub mod vendors;

// Reconciliation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ArchiveError, CsvError, InputError, ReconcileError, ReconcileResult, RecordError, ServerError,
};

// =============================================================================
// Re-exports - Models and configuration
// =============================================================================

pub use config::{version_label, RunOptions};
pub use models::{OptionPair, Record, TagSet, Table};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_file, write_csv,
    write_table, InputFile, ParseOptions, ParseResult,
};

// =============================================================================
// Re-exports - Vendors
// =============================================================================

pub use vendors::{Vendor, VendorRegistry, VendorSummary};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    add_products, run_operation, swap_options, update_inventory, update_products, Operation,
    RunInputs, RunOutput, RunReport, RunResult, VendorReport,
};
pub use transform::run::{RunControl, RunState, RunStatus, RunToken};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
