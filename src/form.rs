// 📝 Subdivision Form - Snapshot of everything the wizard collects
//
// Orchestration functions take a form and return a new one. They never touch
// wizard state, so they can be tested on plain data.

use crate::parcel::Parcel;
use crate::reconciliation::{reconcile_areas, AreaReconciliation};
use crate::subdivision::{result_parcels, InvalidCountError, IntoResultCount, ResultCount};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdivisionForm {
    /// Document number of the subdivision request
    #[serde(default)]
    pub folium: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub original_parcel: Parcel,
    #[serde(default)]
    pub result_count: ResultCount,
    #[serde(default)]
    pub result_parcels: Vec<Parcel>,
}

impl SubdivisionForm {
    /// Blank form dated today, one requested parcel, none generated yet
    pub fn new() -> Self {
        Self::dated(Local::now().date_naive())
    }

    pub fn dated(date: NaiveDate) -> Self {
        SubdivisionForm {
            folium: String::new(),
            date,
            owner: String::new(),
            original_parcel: Parcel::default(),
            result_count: ResultCount::ONE,
            result_parcels: Vec::new(),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse form {}", path.display()))
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write form {}", path.display()))
    }
}

impl Default for SubdivisionForm {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Replace `result_count` and `result_parcels`, keep everything else.
pub fn regenerate_result_parcels<C: IntoResultCount>(
    form: &SubdivisionForm,
    new_count: C,
) -> Result<SubdivisionForm, InvalidCountError> {
    let result_count = new_count.into_result_count()?;
    Ok(SubdivisionForm {
        result_count,
        result_parcels: result_parcels(&form.original_parcel, result_count),
        ..form.clone()
    })
}

/// Business rule: result areas must add up to the original area
pub fn evaluate_form(form: &SubdivisionForm) -> AreaReconciliation {
    reconcile_areas(form.original_parcel.area, &form.result_parcels)
}

// ============================================================================
// TESTS
// ============================================================================
