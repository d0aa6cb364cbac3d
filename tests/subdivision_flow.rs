//! End-to-end subdivision: wizard, reconciliation and document patches

use chrono::NaiveDate;
use parcel_subdivision::{
    derive_cadastral_keys, prepare_document, AreaReconciliation, BoundaryMeasurement,
    DocumentError, Parcel, Patch, SubdivisionForm, Wizard, WizardStep,
};

fn original_parcel() -> Parcel {
    Parcel {
        address: "Av. Juarez 101, Col. Centro".to_string(),
        north: BoundaryMeasurement::new(25.0, "Lote 4"),
        east: BoundaryMeasurement::new(20.0, "Calle Hidalgo"),
        west: BoundaryMeasurement::new(20.0, "Lote 6"),
        south: BoundaryMeasurement::new(25.0, "Lote 18"),
        cadastral_key: "ABC-123".to_string(),
        area: 500.0,
    }
}

#[test]
fn test_count_validation_scenarios() {
    assert!(derive_cadastral_keys("ABC-123", 0).is_err());
    assert!(derive_cadastral_keys("ABC-123", -1).is_err());
    assert!(derive_cadastral_keys("ABC-123", 2.5).is_err());
}

#[test]
fn test_wizard_to_document() {
    let form = SubdivisionForm::dated(NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
    let mut wizard = Wizard::with_form(form);

    wizard.form_mut().folium = "1024/2025".to_string();
    wizard.form_mut().owner = "Rosa Martinez".to_string();
    assert!(wizard.next());

    wizard.form_mut().original_parcel = original_parcel();
    assert!(wizard.next());
    assert_eq!(wizard.step(), WizardStep::Subdivision);

    wizard.set_result_count(3).unwrap();
    let keys: Vec<_> = wizard
        .form()
        .result_parcels
        .iter()
        .map(|p| p.cadastral_key.as_str())
        .collect();
    assert_eq!(keys, vec!["ABC-123-1", "ABC-123-2", "ABC-123-3"]);
    assert!(wizard.next());

    assert_eq!(
        wizard.area_validation(),
        AreaReconciliation::Mismatch {
            expected: 500.0,
            actual: 0.0,
            difference: -500.0,
        }
    );
    assert!(matches!(
        prepare_document(wizard.form()),
        Err(DocumentError::AreaMismatch { .. })
    ));

    let areas = [250.0, 125.0, 125.0];
    for (parcel, area) in wizard.form_mut().result_parcels.iter_mut().zip(areas) {
        parcel.area = area;
    }
    assert!(wizard.field_errors().is_empty());
    assert!(wizard.next());
    assert_eq!(wizard.step(), WizardStep::Review);

    let plan = prepare_document(wizard.form()).unwrap();
    assert_eq!(plan.file_name, "1024_2025.docx");
    assert_eq!(
        plan.patches["formatted_date"],
        Patch::Paragraph(vec![parcel_subdivision::TextRun::plain("3 DE OCTUBRE DE 2025")])
    );
    match &plan.patches["result_batches_block"] {
        Patch::Document(paragraphs) => assert_eq!(paragraphs.len(), 32),
        other => panic!("unexpected patch {:?}", other),
    }
}

#[test]
fn test_changing_count_discards_entries() {
    let mut wizard = Wizard::new();
    wizard.form_mut().original_parcel = original_parcel();
    wizard.set_result_count(2).unwrap();
    wizard.form_mut().result_parcels[0].area = 250.0;
    wizard.form_mut().result_parcels[0].north = BoundaryMeasurement::new(12.5, "Lote 4");

    wizard.set_result_count(3).unwrap();
    let first = &wizard.form().result_parcels[0];
    assert_eq!(first.area, 0.0);
    assert_eq!(first.north, BoundaryMeasurement::zero());
    assert_eq!(first.address, "Av. Juarez 101, Col. Centro");
}
