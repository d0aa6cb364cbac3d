// 📄 Document Patches - Placeholder values for the subdivision template
//
// The legal document template carries `{{placeholder}}` markers. This module
// decides what goes into each one. Applying the patches to an actual
// document file is left to the document layer.

use crate::form::{evaluate_form, SubdivisionForm};
use crate::parcel::{Parcel, Side};
use crate::reconciliation::AreaReconciliation;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const DEFAULT_FILE_STEM: &str = "subdivision";

const MONTHS: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

// ============================================================================
// PATCH TYPES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            ..TextRun::default()
        }
    }

    /// Bold and underlined, used for headings inside a parcel block
    pub fn emphasized(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            bold: true,
            underline: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn blank() -> Self {
        Self::text("")
    }

    pub fn text(text: impl Into<String>) -> Self {
        Paragraph {
            runs: vec![TextRun::plain(text)],
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "children", rename_all = "snake_case")]
pub enum Patch {
    /// Inline replacement inside the placeholder's paragraph
    Paragraph(Vec<TextRun>),
    /// Replaces the placeholder's paragraph with whole paragraphs
    Document(Vec<Paragraph>),
}

impl Patch {
    fn text(text: impl Into<String>) -> Self {
        Patch::Paragraph(vec![TextRun::plain(text)])
    }
}

pub type PatchMap = BTreeMap<String, Patch>;

// ============================================================================
// DOCUMENT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// Result areas don't add up to the original; no document is produced
    AreaMismatch { expected: f64, actual: f64 },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::AreaMismatch { expected, actual } => write!(
                f,
                "areas do not match: expected {}, actual {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for DocumentError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPlan {
    pub file_name: String,
    pub patches: PatchMap,
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Two decimals; non-finite values print as 0.00
pub fn format_number(n: f64) -> String {
    let n = if n.is_finite() { n } else { 0.0 };
    format!("{:.2}", n)
}

/// `14 DE MARZO DE 2025`
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} DE {} DE {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Folium turned into a safe file name: runs of anything outside
/// `[A-Za-z0-9_-]` become a single `_`.
pub fn output_file_name(folium: &str) -> String {
    output_file_name_or(folium, DEFAULT_FILE_STEM)
}

pub fn output_file_name_or(folium: &str, default_stem: &str) -> String {
    let stem = if folium.is_empty() { default_stem } else { folium };

    let mut safe = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            safe.push(c);
            in_run = false;
        } else if !in_run {
            safe.push('_');
            in_run = true;
        }
    }

    format!("{}.docx", safe)
}

// ============================================================================
// PARCEL BLOCKS
// ============================================================================

fn side_heading(side: Side) -> &'static str {
    match side {
        Side::North => "Norte:",
        Side::South => "Sur:",
        Side::East => "Este:",
        Side::West => "Oeste:",
    }
}

/// Order the boundaries appear in the document
const DOCUMENT_SIDES: [Side; 4] = [Side::North, Side::South, Side::East, Side::West];

/// Paragraphs describing one result parcel
pub fn parcel_block(parcel: &Parcel) -> Vec<Paragraph> {
    let mut block = vec![
        Paragraph {
            runs: vec![TextRun::emphasized(parcel.address.as_str())],
        },
        Paragraph::blank(),
    ];

    for side in DOCUMENT_SIDES {
        let boundary = parcel.boundary(side);
        block.push(Paragraph {
            runs: vec![
                TextRun::emphasized(side_heading(side)),
                TextRun::plain(format!(
                    " {} mts. Con {}",
                    format_number(boundary.distance),
                    boundary.label
                )),
            ],
        });
    }

    block.push(Paragraph::blank());
    block.push(Paragraph::text(format!(
        "Superficie: {} m2",
        format_number(parcel.area)
    )));
    block.push(Paragraph::text(format!(
        "Clave Catastral: {}",
        parcel.cadastral_key
    )));
    block.push(Paragraph::blank());

    block
}

/// All result parcels, one blank paragraph between consecutive blocks
pub fn result_parcels_block(parcels: &[Parcel]) -> Patch {
    let mut children = Vec::new();

    for (i, parcel) in parcels.iter().enumerate() {
        children.extend(parcel_block(parcel));
        if i + 1 < parcels.len() {
            children.push(Paragraph::blank());
        }
    }

    Patch::Document(children)
}

// ============================================================================
// PATCH MAP
// ============================================================================

/// Some template placeholders were typed with a stray `]`
/// (`{{original_batch_north_meters]}}`), so both spellings get the value.
fn insert_with_bracket_variant(patches: &mut PatchMap, key: &str, value: String) {
    patches.insert(format!("{}]", key), Patch::text(value.clone()));
    patches.insert(key.to_string(), Patch::text(value));
}

pub fn build_patches(form: &SubdivisionForm) -> PatchMap {
    let mut patches = PatchMap::new();
    let original = &form.original_parcel;

    patches.insert("folium".to_string(), Patch::text(form.folium.as_str()));
    patches.insert(
        "formatted_date".to_string(),
        Patch::text(format_date(form.date)),
    );
    patches.insert("owner".to_string(), Patch::text(form.owner.to_uppercase()));

    patches.insert(
        "original_batch_address".to_string(),
        Patch::text(original.address.to_uppercase()),
    );

    for side in Side::ALL {
        let boundary = original.boundary(side);
        insert_with_bracket_variant(
            &mut patches,
            &format!("original_batch_{}_meters", side.key()),
            format_number(boundary.distance),
        );
        patches.insert(
            format!("original_batch_{}_text", side.key()),
            Patch::text(boundary.label.as_str()),
        );
    }

    patches.insert(
        "original_batch_area".to_string(),
        Patch::text(format_number(original.area)),
    );
    patches.insert(
        "original_batch_catastral_key".to_string(),
        Patch::text(original.cadastral_key.as_str()),
    );

    patches.insert(
        "result_batches_block".to_string(),
        result_parcels_block(&form.result_parcels),
    );

    patches
}

/// Patches plus output file name, only for forms whose areas reconcile
pub fn prepare_document(form: &SubdivisionForm) -> Result<DocumentPlan, DocumentError> {
    prepare_document_with_stem(form, DEFAULT_FILE_STEM)
}

pub fn prepare_document_with_stem(
    form: &SubdivisionForm,
    default_stem: &str,
) -> Result<DocumentPlan, DocumentError> {
    if let AreaReconciliation::Mismatch {
        expected, actual, ..
    } = evaluate_form(form)
    {
        return Err(DocumentError::AreaMismatch { expected, actual });
    }

    Ok(DocumentPlan {
        file_name: output_file_name_or(&form.folium, default_stem),
        patches: build_patches(form),
    })
}

// ============================================================================
// TESTS
// ============================================================================
