// 📐 Shape Layer - Form Field Validation
// Declarative per-field rules for each wizard step, reported as path -> message

use crate::form::{evaluate_form, SubdivisionForm};
use crate::parcel::Side;
use crate::wizard::WizardStep;
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Form path, e.g. `original_parcel.area` or `result_parcels[2].address`
    pub field: String,
    pub message: String,
    /// Step the rule belongs to
    pub context: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Collapse errors into a path -> message map. First message per path wins.
pub fn errors_by_path(errors: &[ValidationError]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for error in errors {
        map.entry(error.field.clone())
            .or_insert_with(|| error.message.clone());
    }
    map
}

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator
    }

    /// Validate the fields collected by one wizard step
    pub fn validate_step(&self, form: &SubdivisionForm, step: WizardStep) -> ValidationResult {
        let mut errors = Vec::new();
        let context = step.name();

        let mut fail = |field: String, message: String| {
            errors.push(ValidationError {
                field,
                message,
                context: context.to_string(),
            });
        };

        match step {
            WizardStep::General => {
                if form.folium.trim().is_empty() {
                    fail("folium".to_string(), "Folium is required".to_string());
                }
                if form.owner.trim().is_empty() {
                    fail("owner".to_string(), "Owner is required".to_string());
                }
            }

            WizardStep::OriginalParcel => {
                let parcel = &form.original_parcel;
                if parcel.address.trim().is_empty() {
                    fail(
                        "original_parcel.address".to_string(),
                        "Address is required".to_string(),
                    );
                }
                if parcel.cadastral_key.trim().is_empty() {
                    fail(
                        "original_parcel.cadastral_key".to_string(),
                        "Cadastral key is required".to_string(),
                    );
                }
                if !(parcel.area.is_finite() && parcel.area > 0.0) {
                    fail(
                        "original_parcel.area".to_string(),
                        format!("Area must be greater than 0, got {}", parcel.area),
                    );
                }
                for side in Side::ALL {
                    let distance = parcel.boundary(side).distance;
                    if !(distance.is_finite() && distance >= 0.0) {
                        fail(
                            format!("original_parcel.{}.distance", side.key()),
                            format!("Distance cannot be negative, got {}", distance),
                        );
                    }
                }
            }

            WizardStep::Subdivision => {
                let expected = form.result_count.as_usize();
                if form.result_parcels.len() != expected {
                    fail(
                        "result_parcels".to_string(),
                        format!(
                            "Expected {} result parcels, found {}; regenerate them",
                            expected,
                            form.result_parcels.len()
                        ),
                    );
                }
            }

            WizardStep::ResultParcels => {
                for (i, parcel) in form.result_parcels.iter().enumerate() {
                    if parcel.address.trim().is_empty() {
                        fail(
                            format!("result_parcels[{}].address", i),
                            "Address is required".to_string(),
                        );
                    }
                    if !(parcel.area.is_finite() && parcel.area >= 0.0) {
                        fail(
                            format!("result_parcels[{}].area", i),
                            format!("Area cannot be negative, got {}", parcel.area),
                        );
                    }
                }

                let reconciliation = evaluate_form(form);
                if reconciliation.is_mismatch() {
                    fail("result_parcels".to_string(), reconciliation.summary());
                }
            }

            WizardStep::Review => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Run every step's rules
    pub fn validate_form(&self, form: &SubdivisionForm) -> ValidationResult {
        let errors: Vec<ValidationError> = WizardStep::ALL
            .iter()
            .filter_map(|step| self.validate_step(form, *step).err())
            .flatten()
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
