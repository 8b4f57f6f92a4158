//! Reconciliation engine.
//!
//! This module turns supplier feeds into catalog changes:
//! - Normalize / Pricing: identifier and price arithmetic
//! - Reshape / Feed: supplier records ready for matching
//! - Catalog / Matcher: the Shopify side and how records pair with it
//! - Pipeline: the reconciliation operations
//! - Run: run lifecycle and cancellation

pub mod catalog;
pub mod feed;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod pricing;
pub mod reshape;
pub mod run;

pub use catalog::{Catalog, Inventory, ProductGroup};
pub use feed::VendorFeed;
pub use pipeline::*;
pub use run::{RunControl, RunState, RunStatus, RunToken};
