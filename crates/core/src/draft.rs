//! The in-memory prescription draft and its finalised record.

use crate::enterprise::{EnterpriseProfile, EnterpriseRef};
use crate::error::{RxError, RxResult};
use crate::medication::{Medication, MedicationField, MedicationId, PrescribedMedication};
use crate::regimen::is_complete_regimen;
use chrono::{DateTime, Utc};
use rx_uuid::IdGenerator;
use serde::{Deserialize, Serialize};

/// Free-text patient fields. None of them is required.
///
/// Serialised with the stored `patient*` key names, so a [`Prescription`] can flatten them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PatientDetails {
    /// Name and any other identifying notes.
    #[serde(rename = "patientDetails")]
    pub details: String,
    #[serde(rename = "patientAge")]
    pub age: String,
    #[serde(rename = "patientWeight")]
    pub weight: String,
    #[serde(rename = "patientHeight")]
    pub height: String,
    #[serde(rename = "patientBmi")]
    pub bmi: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum PatientField {
    Details,
    Age,
    Weight,
    Height,
    Bmi,
}

impl PatientDetails {
    pub fn set(&mut self, field: PatientField, value: &str) {
        let slot = match field {
            PatientField::Details => &mut self.details,
            PatientField::Age => &mut self.age,
            PatientField::Weight => &mut self.weight,
            PatientField::Height => &mut self.height,
            PatientField::Bmi => &mut self.bmi,
        };
        *slot = value.to_owned();
    }
}

/// A prescription being composed. Never persisted as such.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    pub owner_id: String,
    pub enterprise: Option<EnterpriseRef>,
    pub patient: PatientDetails,
    pub medications: Vec<Medication>,
    pub advice: String,
    pub notes: String,
}

/// The persistable result of finalising a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(rename = "userUid")]
    pub owner_id: String,
    /// Present together with `clinic_name`, or not at all.
    pub clinic_id: Option<String>,
    pub clinic_name: Option<String>,
    #[serde(flatten)]
    pub patient: PatientDetails,
    pub medications: Vec<PrescribedMedication>,
    pub advice: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl PrescriptionDraft {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            enterprise: None,
            patient: PatientDetails::default(),
            medications: Vec::new(),
            advice: String::new(),
            notes: String::new(),
        }
    }

    /// Appends an empty manual row and returns its identity.
    pub fn add_medication(&mut self, ids: &dyn IdGenerator) -> MedicationId {
        let mut id = MedicationId::new(ids.next_id());
        // Template rows keep their stored ids, so a fresh id could in principle collide.
        while self.medications.iter().any(|m| m.id == id) {
            id = MedicationId::new(ids.next_id());
        }
        self.medications.push(Medication::blank(id.clone()));
        id
    }

    /// Removes the row with `id`. Returns whether a row was removed.
    pub fn remove_medication(&mut self, id: &MedicationId) -> bool {
        let before = self.medications.len();
        self.medications.retain(|m| &m.id != id);
        before != self.medications.len()
    }

    /// Edits one field of the row with `id`. Returns `Ok(false)` when no such row exists.
    pub fn edit_medication(
        &mut self,
        id: &MedicationId,
        field: MedicationField,
        value: &str,
    ) -> RxResult<bool> {
        match self.medications.iter_mut().find(|m| &m.id == id) {
            Some(med) => {
                med.set_field(field, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn select_enterprise(&mut self, profile: Option<&EnterpriseProfile>) {
        self.enterprise = profile.map(EnterpriseProfile::reference);
    }

    /// Rows with a non-blank name, in draft order.
    pub fn filled_medications(&self) -> impl Iterator<Item = &Medication> {
        self.medications.iter().filter(|m| m.is_filled())
    }

    /// Produces the record to persist. The draft itself is left untouched.
    ///
    /// # Errors
    ///
    /// - [`RxError::MissingClinic`] when no enterprise is selected.
    /// - [`RxError::IncompleteRegimen`] when a named row has a partially filled regimen.
    pub fn finalise(&self, now: DateTime<Utc>) -> RxResult<Prescription> {
        let enterprise = self.enterprise.as_ref().ok_or(RxError::MissingClinic)?;

        let filled: Vec<&Medication> = self.filled_medications().collect();
        if let Some(med) = filled
            .iter()
            .find(|m| !m.regimen.is_empty() && !is_complete_regimen(&m.regimen))
        {
            return Err(RxError::IncompleteRegimen {
                medication: med.name.trim().to_owned(),
            });
        }

        Ok(Prescription {
            owner_id: self.owner_id.clone(),
            clinic_id: Some(enterprise.id.clone()),
            clinic_name: Some(enterprise.hospital_name.clone()),
            patient: self.patient.clone(),
            medications: filled.into_iter().map(PrescribedMedication::from).collect(),
            advice: self.advice.clone(),
            notes: self.notes.clone(),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enterprise::EnterpriseDetails;
    use crate::medication::{Frequency, MealTime};
    use rx_uuid::SequentialIds;

    fn clinic() -> EnterpriseProfile {
        EnterpriseProfile {
            id: "e1".into(),
            details: EnterpriseDetails::new("City Clinic", "Addr", "Dr. Rao", "LIC", None)
                .unwrap(),
            owner_id: "u1".into(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn add_row_uses_generator_and_defaults() {
        let ids = SequentialIds::new("row");
        let mut draft = PrescriptionDraft::new("u1");

        let first = draft.add_medication(&ids);
        let second = draft.add_medication(&ids);

        assert_eq!(first.as_str(), "row-1");
        assert_eq!(second.as_str(), "row-2");
        assert_eq!(draft.medications[0].meal_time, MealTime::AfterMeal);
        assert_eq!(draft.medications[0].frequency, Frequency::Daily);
    }

    #[test]
    fn add_row_skips_colliding_generated_id() {
        let ids = SequentialIds::new("row");
        let mut draft = PrescriptionDraft::new("u1");
        draft.medications.push(Medication::blank("row-1".into()));

        let id = draft.add_medication(&ids);

        assert_eq!(id.as_str(), "row-2");
    }

    #[test]
    fn remove_and_edit_missing_rows_are_no_ops() {
        let mut draft = PrescriptionDraft::new("u1");
        draft.medications.push(Medication::blank("a".into()));

        assert!(!draft.remove_medication(&"zz".into()));
        assert!(!draft
            .edit_medication(&"zz".into(), MedicationField::Name, "x")
            .unwrap());
        assert_eq!(draft.medications.len(), 1);

        assert!(draft.remove_medication(&"a".into()));
        assert!(draft.medications.is_empty());
    }

    #[test]
    fn edit_routes_regimen_through_normaliser() {
        let mut draft = PrescriptionDraft::new("u1");
        draft.medications.push(Medication::blank("a".into()));

        draft
            .edit_medication(&"a".into(), MedicationField::Regimen, "1a0b1c2")
            .unwrap();
        draft
            .edit_medication(&"a".into(), MedicationField::Name, "  Aspirin ")
            .unwrap();

        assert_eq!(draft.medications[0].regimen, "1-0-1");
        assert_eq!(draft.medications[0].name, "  Aspirin ");
    }

    #[test]
    fn finalise_without_clinic_fails_and_leaves_draft() {
        let mut draft = PrescriptionDraft::new("u1");
        let mut med = Medication::blank("a".into());
        med.name = "Aspirin".into();
        draft.medications.push(med);
        let before = draft.clone();

        let err = draft.finalise(Utc::now()).unwrap_err();

        assert!(matches!(err, RxError::MissingClinic));
        assert_eq!(draft, before);
    }

    #[test]
    fn finalise_filters_unnamed_rows_and_strips_ids() {
        let mut draft = PrescriptionDraft::new("u1");
        draft.select_enterprise(Some(&clinic()));
        draft.patient.set(PatientField::Age, "42");
        draft.advice = "Plenty of fluids".into();

        let mut named = Medication::blank("a".into());
        named.name = "Aspirin".into();
        named.regimen = "1-0-1".into();
        named.source_template_id = Some("T1".into());
        draft.medications.push(named);
        draft.medications.push(Medication::blank("b".into()));

        let now = Utc::now();
        let record = draft.finalise(now).unwrap();

        assert_eq!(record.clinic_id.as_deref(), Some("e1"));
        assert_eq!(record.clinic_name.as_deref(), Some("City Clinic"));
        assert_eq!(record.patient.age, "42");
        assert_eq!(record.medications.len(), 1);
        assert_eq!(record.medications[0].name, "Aspirin");
        assert_eq!(record.created_at, now);

        let json = serde_json::to_value(&record).unwrap();
        let row = &json["medications"][0];
        assert!(row.get("id").is_none());
        assert!(row.get("sourceTemplateId").is_none());
        assert_eq!(json["userUid"], "u1");
        assert_eq!(json["clinicName"], "City Clinic");
        assert_eq!(json["patientAge"], "42");
        assert_eq!(json["patientDetails"], "");
        assert!(json.get("patient").is_none());
    }

    #[test]
    fn finalise_rejects_partial_regimen_on_named_rows() {
        let mut draft = PrescriptionDraft::new("u1");
        draft.select_enterprise(Some(&clinic()));

        let mut partial = Medication::blank("a".into());
        partial.name = "Aspirin".into();
        partial.regimen = "1-0".into();
        draft.medications.push(partial);

        // Unnamed rows are dropped, so their regimen does not matter.
        let mut ignored = Medication::blank("b".into());
        ignored.regimen = "1".into();
        draft.medications.push(ignored);

        match draft.finalise(Utc::now()) {
            Err(RxError::IncompleteRegimen { medication }) => assert_eq!(medication, "Aspirin"),
            other => panic!("unexpected: {other:?}"),
        }

        draft.medications[0].regimen.clear();
        assert!(draft.finalise(Utc::now()).is_ok());
    }
}
