// 🌐 REST API - JSON endpoints over the subdivision core
//
// Stateless: every request carries the data it works on.

use crate::document::{prepare_document_with_stem, DocumentError};
use crate::form::{evaluate_form, regenerate_result_parcels, SubdivisionForm};
use crate::parcel::Parcel;
use crate::reconciliation::reconcile_areas;
use crate::schema::{errors_by_path, SchemaValidator};
use crate::subdivision::{derive_cadastral_keys, derive_result_parcels};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub default_file_stem: Arc<str>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            default_file_stem: Arc::from("subdivision"),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn unprocessable(error: impl std::fmt::Display) -> Response {
    warn!(error = %error, "request rejected");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }),
    )
        .into_response()
}

// ============================================================================
// Request bodies
// ============================================================================

// Counts come in as plain numbers so that 2.5 reaches the domain check
#[derive(Deserialize)]
struct KeysRequest {
    base_key: String,
    count: f64,
}

#[derive(Deserialize)]
struct ParcelsRequest {
    original: Parcel,
    count: f64,
}

#[derive(Deserialize)]
struct ReconcileRequest {
    #[serde(deserialize_with = "crate::parcel::lenient_number")]
    original_area: f64,
    result_parcels: Vec<Parcel>,
}

#[derive(Deserialize)]
struct RegenerateRequest {
    form: SubdivisionForm,
    count: f64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// POST /api/keys - Derive cadastral keys
async fn keys(Json(req): Json<KeysRequest>) -> Response {
    match derive_cadastral_keys(&req.base_key, req.count) {
        Ok(keys) => ApiResponse::ok(keys),
        Err(e) => unprocessable(e),
    }
}

/// POST /api/parcels - Derive blank result parcels
async fn parcels(Json(req): Json<ParcelsRequest>) -> Response {
    match derive_result_parcels(&req.original, req.count) {
        Ok(parcels) => ApiResponse::ok(parcels),
        Err(e) => unprocessable(e),
    }
}

/// POST /api/reconcile - Check result areas against the original area
async fn reconcile(Json(req): Json<ReconcileRequest>) -> Response {
    ApiResponse::ok(reconcile_areas(req.original_area, &req.result_parcels))
}

/// POST /api/form/regenerate - Replace the form's result parcels
async fn form_regenerate(Json(req): Json<RegenerateRequest>) -> Response {
    match regenerate_result_parcels(&req.form, req.count) {
        Ok(form) => ApiResponse::ok(form),
        Err(e) => unprocessable(e),
    }
}

/// POST /api/form/evaluate - Area reconciliation for a form
async fn form_evaluate(Json(form): Json<SubdivisionForm>) -> Response {
    ApiResponse::ok(evaluate_form(&form))
}

/// POST /api/form/validate - Field errors keyed by form path
async fn form_validate(Json(form): Json<SubdivisionForm>) -> Response {
    let errors: BTreeMap<String, String> = match SchemaValidator::new().validate_form(&form) {
        Ok(()) => BTreeMap::new(),
        Err(errors) => errors_by_path(&errors),
    };
    ApiResponse::ok(errors)
}

/// POST /api/form/document - Template patches for a reconciled form
async fn form_document(
    State(state): State<AppState>,
    Json(form): Json<SubdivisionForm>,
) -> Response {
    match prepare_document_with_stem(&form, &state.default_file_stem) {
        Ok(plan) => ApiResponse::ok(plan),
        Err(e @ DocumentError::AreaMismatch { .. }) => unprocessable(e),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/keys", post(keys))
        .route("/parcels", post(parcels))
        .route("/reconcile", post(reconcile))
        .route("/form/regenerate", post(form_regenerate))
        .route("/form/evaluate", post(form_evaluate))
        .route("/form/validate", post(form_validate))
        .route("/form/document", post(form_document))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
