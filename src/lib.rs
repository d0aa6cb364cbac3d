// Parcel Subdivision - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod parcel;          // Parcels, boundaries, lenient numeric input
pub mod subdivision;     // Cadastral keys + result parcel derivation
pub mod reconciliation;  // Area reconciliation (absolute 1e-6 tolerance)
pub mod form;            // Form snapshot + pure orchestration
pub mod schema;          // Per-step field validation
pub mod wizard;          // Step state machine
pub mod document;        // Template patch map
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use parcel::{BoundaryMeasurement, Parcel, Side};
pub use subdivision::{
    derive_cadastral_keys, derive_result_parcels, result_parcels,
    InvalidCountError, MAX_RESULT_COUNT, IntoResultCount, ResultCount, SubdivisionRequest,
};
pub use reconciliation::{reconcile_areas, sum_areas, AreaReconciliation, HasArea, AREA_TOLERANCE};
pub use form::{evaluate_form, regenerate_result_parcels, SubdivisionForm};
pub use schema::{errors_by_path, SchemaValidator, ValidationError, ValidationResult};
pub use wizard::{Wizard, WizardStep};
pub use document::{
    build_patches, output_file_name, prepare_document,
    DocumentError, DocumentPlan, Patch, PatchMap, Paragraph, TextRun,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
