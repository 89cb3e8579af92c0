//! Medication templates and their validation.

use crate::error::{RxError, RxResult};
use crate::medication::{Medication, TemplateMedication};
use chrono::{DateTime, Utc};
use rx_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A stored, named list of medication rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(rename = "templateName")]
    pub name: String,
    #[serde(default)]
    pub medications: Vec<TemplateMedication>,
    #[serde(rename = "createdByUid")]
    pub owner_id: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A template about to be created. The gateway assigns identity and timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    #[serde(rename = "templateName")]
    pub name: NonEmptyText,
    pub medications: Vec<TemplateMedication>,
    #[serde(rename = "createdByUid")]
    pub owner_id: String,
}

/// A partial replacement of a template's fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    #[serde(rename = "templateName", skip_serializing_if = "Option::is_none")]
    pub name: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<TemplateMedication>>,
}

/// Builds the template a "save as template" action would create from a draft list.
///
/// Only rows with a non-blank name are kept; their draft-only back-reference is dropped while
/// the row identity survives.
///
/// # Errors
///
/// - [`RxError::EmptyList`] when no row has a name.
/// - [`RxError::EmptyTemplateName`] when `name` is blank.
pub fn template_from_draft(
    medications: &[Medication],
    name: &str,
    owner_id: &str,
) -> RxResult<NewTemplate> {
    let rows: Vec<TemplateMedication> = medications
        .iter()
        .filter(|m| m.is_filled())
        .map(TemplateMedication::from)
        .collect();

    if rows.is_empty() {
        return Err(RxError::EmptyList);
    }

    let name = NonEmptyText::new(name).map_err(|_| RxError::EmptyTemplateName)?;

    Ok(NewTemplate {
        name,
        medications: rows,
        owner_id: owner_id.to_owned(),
    })
}

/// Form input of the template create/edit screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemplateEditor {
    #[serde(alias = "templateName")]
    pub name: String,
    #[serde(default)]
    pub medications: Vec<TemplateMedication>,
}

/// A template form that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidTemplate {
    pub name: NonEmptyText,
    pub medications: Vec<TemplateMedication>,
}

impl TemplateEditor {
    /// Validates the form: a name is required and at least one row must be named.
    /// Unnamed rows are dropped.
    pub fn validate(&self) -> RxResult<ValidTemplate> {
        let name = NonEmptyText::new(&self.name)
            .map_err(|_| RxError::InvalidInput("Template name is required.".into()))?;

        let medications: Vec<TemplateMedication> = self
            .medications
            .iter()
            .filter(|m| m.is_filled())
            .cloned()
            .collect();
        if medications.is_empty() {
            return Err(RxError::InvalidInput(
                "You must add at least one medication.".into(),
            ));
        }

        Ok(ValidTemplate { name, medications })
    }
}

impl ValidTemplate {
    pub fn into_new(self, owner_id: &str) -> NewTemplate {
        NewTemplate {
            name: self.name,
            medications: self.medications,
            owner_id: owner_id.to_owned(),
        }
    }

    pub fn into_patch(self) -> TemplatePatch {
        TemplatePatch {
            name: Some(self.name),
            medications: Some(self.medications),
        }
    }
}
