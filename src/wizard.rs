// 🧭 Subdivision Wizard - Step state machine over a form snapshot
//
// General → OriginalParcel → Subdivision → ResultParcels → Review
//
// The wizard owns the form and the current step. Moving forward is gated by
// the checks for the current step; moving back is always allowed.

use crate::form::{evaluate_form, regenerate_result_parcels, SubdivisionForm};
use crate::reconciliation::AreaReconciliation;
use crate::schema::{errors_by_path, SchemaValidator};
use crate::subdivision::{result_parcels, InvalidCountError, IntoResultCount};
use std::collections::BTreeMap;
use tracing::{info, warn};

// ============================================================================
// STEPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    General,
    OriginalParcel,
    Subdivision,
    ResultParcels,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::General,
        WizardStep::OriginalParcel,
        WizardStep::Subdivision,
        WizardStep::ResultParcels,
        WizardStep::Review,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Self {
        match self {
            WizardStep::General => WizardStep::OriginalParcel,
            WizardStep::OriginalParcel => WizardStep::Subdivision,
            WizardStep::Subdivision => WizardStep::ResultParcels,
            WizardStep::ResultParcels => WizardStep::Review,
            WizardStep::Review => WizardStep::Review,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            WizardStep::General => WizardStep::General,
            WizardStep::OriginalParcel => WizardStep::General,
            WizardStep::Subdivision => WizardStep::OriginalParcel,
            WizardStep::ResultParcels => WizardStep::Subdivision,
            WizardStep::Review => WizardStep::ResultParcels,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::General => "General",
            WizardStep::OriginalParcel => "OriginalParcel",
            WizardStep::Subdivision => "Subdivision",
            WizardStep::ResultParcels => "ResultParcels",
            WizardStep::Review => "Review",
        }
    }
}

// ============================================================================
// WIZARD
// ============================================================================

pub struct Wizard {
    step: WizardStep,
    form: SubdivisionForm,
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_form(SubdivisionForm::new())
    }

    pub fn with_form(form: SubdivisionForm) -> Self {
        Wizard {
            step: WizardStep::General,
            form,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &SubdivisionForm {
        &self.form
    }

    /// Direct access for field edits (address, areas, boundaries...)
    pub fn form_mut(&mut self) -> &mut SubdivisionForm {
        &mut self.form
    }

    pub fn into_form(self) -> SubdivisionForm {
        self.form
    }

    pub fn area_validation(&self) -> AreaReconciliation {
        evaluate_form(&self.form)
    }

    pub fn can_go_next(&self) -> bool {
        let f = &self.form;

        match self.step {
            WizardStep::General => !f.folium.is_empty(),
            WizardStep::OriginalParcel => {
                let o = &f.original_parcel;
                !o.address.is_empty() && !o.cadastral_key.is_empty() && o.area > 0.0
            }
            WizardStep::Subdivision => f.result_parcels.len() == f.result_count.as_usize(),
            WizardStep::ResultParcels => self.area_validation().is_ok(),
            WizardStep::Review => true,
        }
    }

    /// Advance one step if the current one is complete
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            warn!(step = self.step.name(), "step incomplete, staying");
            return false;
        }
        let next = self.step.next();
        let advanced = next != self.step;
        self.step = next;
        if advanced {
            info!(step = self.step.name(), "wizard advanced");
        }
        advanced
    }

    pub fn prev(&mut self) {
        self.step = self.step.previous();
    }

    /// Change the requested count and regenerate result parcels.
    /// On error the form is left as it was.
    pub fn set_result_count<C: IntoResultCount>(&mut self, count: C) -> Result<(), InvalidCountError> {
        match regenerate_result_parcels(&self.form, count) {
            Ok(form) => {
                self.form = form;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rejected result count");
                Err(e)
            }
        }
    }

    /// Rebuild result parcels for the current count.
    /// Without a cadastral key on the original there is nothing to derive from.
    pub fn regenerate_result_parcels(&mut self) {
        if self.form.original_parcel.cadastral_key.is_empty() {
            self.form.result_parcels.clear();
            return;
        }
        self.form.result_parcels =
            result_parcels(&self.form.original_parcel, self.form.result_count);
    }

    /// Field errors for the current step, keyed by form path
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match SchemaValidator::new().validate_step(&self.form, self.step) {
            Ok(()) => BTreeMap::new(),
            Err(errors) => errors_by_path(&errors),
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subdivision::MAX_RESULT_COUNT;

    fn fill_general(wizard: &mut Wizard) {
        wizard.form_mut().folium = "F-9".to_string();
        wizard.form_mut().owner = "Ana Ruiz".to_string();
    }

    fn fill_original(wizard: &mut Wizard) {
        let original = &mut wizard.form_mut().original_parcel;
        original.address = "Calle 10 #200".to_string();
        original.cadastral_key = "ABC-123".to_string();
        original.area = 500.0;
    }

    #[test]
    fn test_general_gate() {
        let mut wizard = Wizard::new();
        assert!(!wizard.can_go_next());
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::General);

        fill_general(&mut wizard);
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::OriginalParcel);
    }

    #[test]
    fn test_original_parcel_gate() {
        let mut wizard = Wizard::new();
        fill_general(&mut wizard);
        wizard.next();

        wizard.form_mut().original_parcel.address = "Calle 10".to_string();
        assert!(!wizard.can_go_next());

        fill_original(&mut wizard);
        wizard.form_mut().original_parcel.area = 0.0;
        assert!(!wizard.can_go_next());

        wizard.form_mut().original_parcel.area = 500.0;
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Subdivision);
    }

    #[test]
    fn test_full_flow() {
        let mut wizard = Wizard::new();
        fill_general(&mut wizard);
        assert!(wizard.next());
        fill_original(&mut wizard);
        assert!(wizard.next());

        // Count 1 but nothing generated yet
        assert!(!wizard.can_go_next());
        wizard.set_result_count(3).unwrap();
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::ResultParcels);

        // Fresh parcels have area 0
        assert!(!wizard.can_go_next());
        assert_eq!(wizard.area_validation().difference(), -500.0);

        for (parcel, area) in wizard
            .form_mut()
            .result_parcels
            .iter_mut()
            .zip([200.0, 150.0, 150.0])
        {
            parcel.area = area;
        }
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Review);

        // Review is the last step
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_prev_saturates() {
        let mut wizard = Wizard::new();
        wizard.prev();
        assert_eq!(wizard.step(), WizardStep::General);

        fill_general(&mut wizard);
        wizard.next();
        wizard.prev();
        assert_eq!(wizard.step(), WizardStep::General);
    }

    #[test]
    fn test_invalid_count_leaves_form() {
        let mut wizard = Wizard::new();
        fill_original(&mut wizard);
        wizard.set_result_count(2).unwrap();
        let before = wizard.form().clone();

        assert!(wizard.set_result_count(0).is_err());
        assert!(wizard.set_result_count(-1).is_err());
        assert!(wizard.set_result_count(2.5).is_err());
        assert_eq!(wizard.form(), &before);
    }

    #[test]
    fn test_regenerate_without_key_clears() {
        let mut wizard = Wizard::new();
        fill_original(&mut wizard);
        wizard.set_result_count(2).unwrap();
        assert_eq!(wizard.form().result_parcels.len(), 2);

        wizard.form_mut().original_parcel.cadastral_key = String::new();
        wizard.regenerate_result_parcels();
        assert!(wizard.form().result_parcels.is_empty());

        wizard.form_mut().original_parcel.cadastral_key = "Z-1".to_string();
        wizard.regenerate_result_parcels();
        let keys: Vec<_> = wizard
            .form()
            .result_parcels
            .iter()
            .map(|p| p.cadastral_key.clone())
            .collect();
        assert_eq!(keys, vec!["Z-1-1", "Z-1-2"]);
    }

    #[test]
    fn test_count_change_after_key_edit_uses_new_key() {
        let mut wizard = Wizard::new();
        fill_general(&mut wizard);
        wizard.next();
        fill_original(&mut wizard);
        wizard.next();
        assert_eq!(wizard.step(), WizardStep::Subdivision);

        wizard.set_result_count(2).unwrap();
        assert!(wizard.can_go_next());

        wizard.form_mut().original_parcel.cadastral_key = "XYZ-9".to_string();
        wizard.set_result_count(3).unwrap();
        assert!(wizard.can_go_next());

        let keys: Vec<_> = wizard
            .form()
            .result_parcels
            .iter()
            .map(|p| p.cadastral_key.as_str())
            .collect();
        assert_eq!(keys, vec!["XYZ-9-1", "XYZ-9-2", "XYZ-9-3"]);
        assert_eq!(wizard.form().result_count.get(), 3);
    }

    #[test]
    fn test_oversized_count_rejected() {
        let mut wizard = Wizard::new();
        fill_original(&mut wizard);
        wizard.set_result_count(2).unwrap();

        assert!(wizard.set_result_count(MAX_RESULT_COUNT + 1).is_err());
        assert!(wizard.set_result_count(4_000_000_000u32).is_err());
        assert_eq!(wizard.form().result_parcels.len(), 2);
    }

    #[test]
    fn test_field_errors_current_step() {
        let wizard = Wizard::new();
        let errors = wizard.field_errors();
        assert!(errors.contains_key("folium"));
        assert!(errors.contains_key("owner"));
    }

    #[test]
    fn test_step_indexes() {
        let indexes: Vec<_> = WizardStep::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    }
}
