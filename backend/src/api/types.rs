//! REST API types for the upload form.
//!
//! A run that produces a file answers with the CSV itself; everything else is
//! one of the JSON bodies below.

use serde::Serialize;
use serde_json::{json, Value};

use crate::transform::pipeline::{Operation, RunReport, RunResult};
use crate::transform::run::RunStatus;
use crate::vendors::{VendorRegistry, VendorSummary};

/// Response for a run that finished without a file to download.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    /// Status: "empty" or "cancelled"
    pub status: String,

    pub operation: Operation,

    /// Line shown to the user
    pub message: String,

    /// Per-vendor counters, absent for cancelled runs
    pub report: Option<RunReport>,
}

impl RunResponse {
    /// Completed with zero changes.
    pub fn empty(result: RunResult) -> Self {
        Self {
            status: "empty".to_string(),
            operation: result.operation,
            message: "Nothing to download".to_string(),
            report: Some(result.report),
        }
    }

    /// Stopped by a cancel request. Partial results are discarded.
    pub fn cancelled(operation: Operation) -> Self {
        Self {
            status: "cancelled".to_string(),
            operation,
            message: "Run cancelled, no file produced".to_string(),
            report: None,
        }
    }
}

/// Vendor listing for building the upload form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorsResponse {
    pub vendors: Vec<VendorSummary>,
}

impl From<&VendorRegistry> for VendorsResponse {
    fn from(registry: &VendorRegistry) -> Self {
        Self {
            vendors: registry.list().iter().map(|v| v.summary()).collect(),
        }
    }
}

/// Current run state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub run: RunStatus,
    pub version: String,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
