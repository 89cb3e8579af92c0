//! The compose session: one prescription being written, plus the lists it draws from.

use crate::composer::{MergeOutcome, TemplateComposer};
use crate::constants::{
    CLINICS_LOAD_FAILED, PRESCRIPTION_SAVE_FAILED, TEMPLATES_LOAD_FAILED, TEMPLATE_SAVE_FAILED,
};
use crate::draft::{PatientField, Prescription, PrescriptionDraft};
use crate::enterprise::EnterpriseProfile;
use crate::error::{RxError, RxResult};
use crate::gateway::{DataGateway, GatewayError};
use crate::medication::{MedicationField, MedicationId};
use crate::template::{template_from_draft, Template};
use chrono::{DateTime, Utc};
use rx_uuid::IdGenerator;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Open,
    Dirty,
    Finalizing,
    Closed,
}

impl SessionState {
    pub fn is_editable(self) -> bool {
        matches!(self, SessionState::Open | SessionState::Dirty)
    }
}

/// Serializable snapshot of a session.
#[derive(Clone, Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    pub draft: Option<PrescriptionDraft>,
    pub selected_templates: Vec<String>,
    pub enterprises: Vec<EnterpriseProfile>,
    pub templates: Vec<Template>,
    pub clinic_error: Option<String>,
    pub template_error: Option<String>,
    pub error: Option<String>,
}

/// A stored prescription, as returned by [`ComposeSession::submit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
    pub id: String,
    pub prescription: Prescription,
}

#[derive(Debug, Default)]
pub struct ComposeSession {
    state: SessionState,
    draft: Option<PrescriptionDraft>,
    composer: TemplateComposer,
    enterprises: Vec<EnterpriseProfile>,
    templates: Vec<Template>,
    clinic_error: Option<String>,
    template_error: Option<String>,
    error: Option<String>,
}

impl ComposeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> Option<&PrescriptionDraft> {
        self.draft.as_ref()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn enterprises(&self) -> &[EnterpriseProfile] {
        &self.enterprises
    }

    pub fn selected_templates(&self) -> &[String] {
        self.composer.selected()
    }

    pub fn clinic_error(&self) -> Option<&str> {
        self.clinic_error.as_deref()
    }

    pub fn template_error(&self) -> Option<&str> {
        self.template_error.as_deref()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            draft: self.draft.clone(),
            selected_templates: self.composer.selected().to_vec(),
            enterprises: self.enterprises.clone(),
            templates: self.templates.clone(),
            clinic_error: self.clinic_error.clone(),
            template_error: self.template_error.clone(),
            error: self.error.clone(),
        }
    }

    /// Starts a fresh draft for `owner_id`. Any draft in progress is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::InvalidInput`] while a submission is in flight.
    pub fn open(&mut self, owner_id: &str) -> RxResult<()> {
        if self.state == SessionState::Finalizing {
            return Err(RxError::InvalidInput(
                "the prescription is being saved".into(),
            ));
        }
        *self = Self {
            state: SessionState::Open,
            draft: Some(PrescriptionDraft::new(owner_id)),
            ..Self::default()
        };
        Ok(())
    }

    /// Discards all session state.
    pub fn cancel(&mut self) {
        *self = Self {
            state: SessionState::Closed,
            ..Self::default()
        };
    }

    fn owner_id(&self) -> RxResult<String> {
        self.draft
            .as_ref()
            .filter(|_| self.state.is_editable())
            .map(|d| d.owner_id.clone())
            .ok_or(RxError::SessionClosed)
    }

    fn editable_draft(&mut self) -> RxResult<&mut PrescriptionDraft> {
        if !self.state.is_editable() {
            return Err(RxError::SessionClosed);
        }
        self.draft.as_mut().ok_or(RxError::SessionClosed)
    }

    /// Loads the owner's active profiles and preselects the first one.
    ///
    /// A failed load is recorded as the clinic error and leaves an empty list.
    pub async fn load_enterprises(&mut self, gateway: &dyn DataGateway) -> RxResult<()> {
        let owner_id = self.owner_id()?;
        let result = gateway.list_active_enterprises(&owner_id).await;
        let draft = self.editable_draft()?;

        match result {
            Ok(profiles) => {
                draft.select_enterprise(profiles.first());
                self.enterprises = profiles;
                self.clinic_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load enterprise profiles");
                draft.select_enterprise(None);
                self.enterprises.clear();
                self.clinic_error = Some(err.message_or(CLINICS_LOAD_FAILED).to_owned());
            }
        }
        Ok(())
    }

    /// Loads the owner's active templates, newest first.
    ///
    /// A failed load is recorded as the template error and leaves an empty list.
    pub async fn load_templates(&mut self, gateway: &dyn DataGateway) -> RxResult<()> {
        let owner_id = self.owner_id()?;
        let result = gateway.list_active_templates(&owner_id).await;
        if !self.state.is_editable() {
            return Err(RxError::SessionClosed);
        }

        match result {
            Ok(templates) => {
                self.templates = templates;
                self.template_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load templates");
                self.templates.clear();
                self.template_error = Some(err.message_or(TEMPLATES_LOAD_FAILED).to_owned());
            }
        }
        Ok(())
    }

    pub fn add_medication(&mut self, ids: &dyn IdGenerator) -> RxResult<MedicationId> {
        let id = self.editable_draft()?.add_medication(ids);
        self.state = SessionState::Dirty;
        Ok(id)
    }

    pub fn remove_medication(&mut self, id: &MedicationId) -> RxResult<bool> {
        let removed = self.editable_draft()?.remove_medication(id);
        self.state = SessionState::Dirty;
        Ok(removed)
    }

    pub fn edit_medication(
        &mut self,
        id: &MedicationId,
        field: MedicationField,
        value: &str,
    ) -> RxResult<bool> {
        let edited = self.editable_draft()?.edit_medication(id, field, value)?;
        self.state = SessionState::Dirty;
        Ok(edited)
    }

    pub fn set_patient_field(&mut self, field: PatientField, value: &str) -> RxResult<()> {
        self.editable_draft()?.patient.set(field, value);
        self.state = SessionState::Dirty;
        Ok(())
    }

    pub fn set_advice(&mut self, advice: &str) -> RxResult<()> {
        self.editable_draft()?.advice = advice.to_owned();
        self.state = SessionState::Dirty;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> RxResult<()> {
        self.editable_draft()?.notes = notes.to_owned();
        self.state = SessionState::Dirty;
        Ok(())
    }

    /// Selects a loaded profile by identity. An identity that is not loaded clears the selection.
    pub fn select_enterprise(&mut self, id: Option<&str>) -> RxResult<()> {
        let draft = self.draft.as_mut().filter(|_| self.state.is_editable());
        let draft = draft.ok_or(RxError::SessionClosed)?;

        let profile = id.and_then(|id| self.enterprises.iter().find(|e| e.id == id));
        draft.select_enterprise(profile);
        if profile.is_some() {
            self.clinic_error = None;
        }
        self.state = SessionState::Dirty;
        Ok(())
    }

    /// Applies a template checkbox change. See [`TemplateComposer::toggle`].
    pub fn toggle_template(&mut self, template_id: &str, checked: bool) -> RxResult<MergeOutcome> {
        if !self.state.is_editable() {
            return Err(RxError::SessionClosed);
        }
        let draft = self.draft.as_mut().ok_or(RxError::SessionClosed)?;
        self.template_error = None;

        let outcome = self
            .composer
            .toggle(&self.templates, template_id, checked, &mut draft.medications);
        match outcome {
            Ok(outcome) => {
                self.state = SessionState::Dirty;
                Ok(outcome)
            }
            Err(err) => {
                self.template_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Saves the named rows of the draft as a new template.
    ///
    /// On success the template is placed first in the loaded list so it can be selected at once.
    /// The draft itself is not changed.
    pub async fn save_as_template(
        &mut self,
        gateway: &dyn DataGateway,
        name: &str,
    ) -> RxResult<Template> {
        let draft = self
            .draft
            .as_ref()
            .filter(|_| self.state.is_editable())
            .ok_or(RxError::SessionClosed)?;
        let new = template_from_draft(&draft.medications, name, &draft.owner_id)?;

        let id = gateway.create_template(&new).await.map_err(|err| {
            tracing::error!(error = %err, "failed to save template");
            GatewayError::new(err.message_or(TEMPLATE_SAVE_FAILED))
        })?;

        let template = Template {
            id,
            name: new.name.into_inner(),
            medications: new.medications,
            owner_id: new.owner_id,
            is_deleted: false,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tracing::info!(template_id = %template.id, "template saved from draft");
        self.templates.insert(0, template.clone());
        Ok(template)
    }

    /// Finalises the draft and stores it. The session closes on success.
    ///
    /// On any failure the draft is kept and the session returns to `Dirty`.
    pub async fn submit(
        &mut self,
        gateway: &dyn DataGateway,
        now: DateTime<Utc>,
    ) -> RxResult<Submitted> {
        if !self.state.is_editable() {
            return Err(RxError::SessionClosed);
        }
        let draft = self.draft.as_ref().ok_or(RxError::SessionClosed)?;
        self.state = SessionState::Finalizing;
        self.error = None;

        let prescription = match draft.finalise(now) {
            Ok(prescription) => prescription,
            Err(err) => {
                self.state = SessionState::Dirty;
                match err {
                    RxError::MissingClinic => self.clinic_error = Some(err.to_string()),
                    _ => self.error = Some(err.to_string()),
                }
                return Err(err);
            }
        };

        match gateway.create_prescription(&prescription).await {
            Ok(id) => {
                tracing::info!(prescription_id = %id, "prescription saved");
                self.cancel();
                Ok(Submitted { id, prescription })
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save prescription");
                self.state = SessionState::Dirty;
                self.error = Some(err.message_or(PRESCRIPTION_SAVE_FAILED).to_owned());
                Err(err.into())
            }
        }
    }
}
