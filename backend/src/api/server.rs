//! HTTP Server for the reconciliation API.
//!
//! The upload form posts the Shopify export and one file per vendor; the
//! answer is the CSV to import back into Shopify, or a JSON status.
//!
//! # API Endpoints
//!
//! | Method | Path                         | Description                      |
//! |--------|------------------------------|----------------------------------|
//! | GET    | `/health`                    | Health check and version label   |
//! | GET    | `/api/vendors`               | Registered vendors               |
//! | GET    | `/api/logs`                  | SSE stream for real-time logs    |
//! | GET    | `/api/status`                | Current run state                |
//! | POST   | `/api/cancel`                | Cancel the running operation     |
//! | POST   | `/api/inventory`             | Inventory update                 |
//! | POST   | `/api/products/update`       | Product update                   |
//! | POST   | `/api/products/add`          | Product addition                 |
//! | POST   | `/api/products/swap-options` | Swap Size / Colour options       |

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, RunResponse, StatusResponse, VendorsResponse};
use crate::config::{version_label, MAX_UPLOAD_BYTES};
use crate::error::{ReconcileError, ServerError, ServerResult};
use crate::parser::InputFile;
use crate::transform::pipeline::{run_operation, Operation, RunInputs};
use crate::transform::run::RunControl;
use crate::vendors::VendorRegistry;

/// Header carrying the per-vendor counters next to a CSV download.
const RUN_REPORT_HEADER: &str = "x-run-report";

type ApiError = (StatusCode, Json<Value>);

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub control: Arc<RunControl>,
    pub registry: Arc<VendorRegistry>,
}

impl AppState {
    pub fn new(registry: VendorRegistry) -> Self {
        Self {
            control: Arc::new(RunControl::new()),
            registry: Arc::new(registry),
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            header::CONTENT_TYPE,
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(RUN_REPORT_HEADER),
        ]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/vendors", get(vendors))
        .route("/api/logs", get(sse_logs))
        .route("/api/status", get(status))
        .route("/api/cancel", post(cancel))
        .route("/api/inventory", post(inventory))
        .route("/api/products/update", post(update_products))
        .route("/api/products/add", post(add_products))
        .route("/api/products/swap-options", post(swap_options))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let app = router(AppState::new(VendorRegistry::new()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Stocksync server running on http://localhost:{}", port);
    println!("   POST /api/inventory             - Inventory update");
    println!("   POST /api/products/update       - Product update");
    println!("   POST /api/products/add          - Product addition");
    println!("   POST /api/products/swap-options - Swap Size / Colour");
    println!("   POST /api/cancel                - Cancel the running operation");
    println!("   GET  /api/logs                  - SSE log stream");
    println!("   GET  /health                    - Health check");
    println!();
    println!("📦 Version {}", version_label());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "stocksync",
        "version": version_label(),
    }))
}

async fn vendors(State(state): State<AppState>) -> Json<VendorsResponse> {
    Json(VendorsResponse::from(state.registry.as_ref()))
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        run: state.control.status(),
        version: version_label(),
    })
}

async fn cancel(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "cancelled": state.control.cancel() }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn inventory(State(state): State<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    run(state, Operation::Inventory, multipart).await
}

async fn update_products(State(state): State<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    run(state, Operation::UpdateProducts, multipart).await
}

async fn add_products(State(state): State<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    run(state, Operation::AddProducts, multipart).await
}

async fn swap_options(State(state): State<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    run(state, Operation::SwapOptions, multipart).await
}

/// Status code and JSON body for a failed request.
fn error_reply(err: &ServerError) -> ApiError {
    let status = match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Reconcile(ReconcileError::Busy) => StatusCode::CONFLICT,
        ServerError::Reconcile(e) if e.is_expected() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match err {
        ServerError::Reconcile(e) => e.user_message(),
        other => other.to_string(),
    };
    (status, Json(error_response(&message)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

/// Collect files and options from the upload form.
///
/// File fields are `shopify-inventory`, `shopify-products` (both repeatable)
/// and one per vendor name. Empty file inputs are ignored.
async fn read_form(registry: &VendorRegistry, mut multipart: Multipart) -> ServerResult<RunInputs> {
    let mut inputs = RunInputs::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        let text = || String::from_utf8_lossy(&bytes).to_string();
        let file = || InputFile::from_bytes(file_name.clone().unwrap_or_else(|| name.clone()), bytes.to_vec());

        match name.as_str() {
            "maxQuantity" => {
                inputs.options.max_quantity = text()
                    .trim()
                    .parse()
                    .map_err(|_| ServerError::BadRequest(format!("maxQuantity is not a number: {}", text())))?;
            }
            "updateImages" => inputs.options.update_images = parse_flag(&text()),
            "updateDescriptions" => inputs.options.update_descriptions = parse_flag(&text()),
            "verbose" => inputs.options.verbose = parse_flag(&text()),
            _ if bytes.is_empty() => {}
            "shopify-inventory" => inputs.inventory.push(file()),
            "shopify-products" => inputs.products.push(file()),
            vendor if registry.get(vendor).is_some() => inputs.vendors.push((name.clone(), file())),
            other => return Err(ServerError::BadRequest(format!("Unknown form field: {}", other))),
        }
    }

    Ok(inputs)
}

/// Run one operation for an upload and shape the answer.
async fn run(state: AppState, operation: Operation, multipart: Multipart) -> Result<Response, ApiError> {
    let inputs = read_form(&state.registry, multipart)
        .await
        .map_err(|e| error_reply(&e))?;
    LOG_BROADCASTER.set_verbose(inputs.options.verbose);

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 {}: {} inventory, {} products, {} vendor files",
        operation,
        inputs.inventory.len(),
        inputs.products.len(),
        inputs.vendors.len()
    );
    println!("{}\n", "=".repeat(70));

    let registry = state.registry.as_ref();
    let inputs = &inputs;
    let result = state
        .control
        .run(operation.as_str(), |token| async move {
            run_operation(operation, inputs, registry, &token).await
        })
        .await;

    match result {
        Ok(result) => match result.output {
            Some(output) => {
                let report = serde_json::to_string(&result.report.vendors).unwrap_or_default();
                let headers = [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", output.file_name),
                    ),
                    (HeaderName::from_static(RUN_REPORT_HEADER), report),
                ];
                Ok((StatusCode::OK, headers, output.csv).into_response())
            }
            None => Ok(Json(RunResponse::empty(result)).into_response()),
        },
        Err(ReconcileError::Cancelled) => Ok(Json(RunResponse::cancelled(operation)).into_response()),
        Err(e) => {
            if !e.is_expected() {
                log_error(e.user_message());
            }
            Err(error_reply(&ServerError::Reconcile(e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;

    #[test]
    fn test_error_status_mapping() {
        let busy = error_reply(&ServerError::Reconcile(ReconcileError::Busy));
        assert_eq!(busy.0, StatusCode::CONFLICT);

        let missing = error_reply(&ServerError::Reconcile(
            InputError::MissingFile("shopify products CSV".into()).into(),
        ));
        assert_eq!(missing.0, StatusCode::BAD_REQUEST);
        assert_eq!(missing.1 .0["error"], "no shopify products CSV selected");

        let internal = error_reply(&ServerError::Reconcile(ReconcileError::Internal("boom".into())));
        assert_eq!(internal.0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" on "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_router_builds() {
        let _ = router(AppState::new(VendorRegistry::new()));
    }
}
