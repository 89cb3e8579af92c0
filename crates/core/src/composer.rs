//! Template composition: merging template rows into a draft and taking them back out.
//!
//! Row identity is the only deduplication key. A merged row remembers the template it came from
//! (`source_template_id`) so that deselecting the template removes exactly the rows it added and
//! nothing else.

use crate::error::{RxError, RxResult};
use crate::medication::{Medication, MedicationId, TemplateMedication};
use crate::template::Template;
use serde::Serialize;
use std::collections::HashSet;

/// Result of merging one template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MergeOutcome {
    pub admitted: usize,
    /// Rows dropped for a missing identity or an identity already in the draft.
    pub skipped: usize,
}

/// Appends the admissible rows of a template to `medications`.
///
/// A row is admitted when it has a non-blank identity that is not yet present in the list,
/// counting rows admitted earlier in the same call. Admitted rows are backfilled and tagged
/// with `template_id`, and keep template order.
pub fn merge_template_rows(
    medications: &mut Vec<Medication>,
    rows: &[TemplateMedication],
    template_id: &str,
) -> MergeOutcome {
    let mut present: HashSet<MedicationId> = medications.iter().map(|m| m.id.clone()).collect();
    let mut outcome = MergeOutcome::default();

    for row in rows {
        match Medication::from_template_row(row, template_id) {
            Some(med) if present.insert(med.id.clone()) => {
                medications.push(med);
                outcome.admitted += 1;
            }
            _ => outcome.skipped += 1,
        }
    }

    outcome
}

/// Removes every row merged from `template_id`. Returns how many rows were removed.
pub fn remove_template_rows(medications: &mut Vec<Medication>, template_id: &str) -> usize {
    let before = medications.len();
    medications.retain(|m| m.source_template_id.as_deref() != Some(template_id));
    before - medications.len()
}

/// Tracks which templates are currently applied to a draft.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateComposer {
    selected: Vec<String>,
}

impl TemplateComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected template identities, in selection order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, template_id: &str) -> bool {
        self.selected.iter().any(|id| id == template_id)
    }

    /// Merges `template` into `medications` and marks it selected.
    pub fn merge(&mut self, template: &Template, medications: &mut Vec<Medication>) -> MergeOutcome {
        let outcome = merge_template_rows(medications, &template.medications, &template.id);

        if outcome.skipped > 0 {
            tracing::warn!(
                template = %template.name,
                skipped = outcome.skipped,
                "skipped medication(s) from template due to missing ids or duplicates"
            );
        }

        if !self.is_selected(&template.id) {
            self.selected.push(template.id.clone());
        }
        outcome
    }

    /// Removes the rows a template contributed and marks it deselected.
    pub fn unmerge(&mut self, template_id: &str, medications: &mut Vec<Medication>) -> usize {
        self.selected.retain(|id| id != template_id);
        remove_template_rows(medications, template_id)
    }

    /// Applies a checkbox change for `template_id` against the loaded `templates`.
    ///
    /// Deselection needs no lookup. Returns the merge outcome (all zero on deselect).
    ///
    /// # Errors
    ///
    /// Returns [`RxError::TemplateNotFound`] when selecting an identity that is not loaded;
    /// nothing is changed in that case.
    pub fn toggle(
        &mut self,
        templates: &[Template],
        template_id: &str,
        checked: bool,
        medications: &mut Vec<Medication>,
    ) -> RxResult<MergeOutcome> {
        if !checked {
            self.unmerge(template_id, medications);
            return Ok(MergeOutcome::default());
        }

        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| RxError::TemplateNotFound(template_id.to_owned()))?;
        Ok(self.merge(template, medications))
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
