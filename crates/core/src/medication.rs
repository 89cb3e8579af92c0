//! Medication rows.
//!
//! Three shapes of the same row exist:
//!
//! - [`Medication`]: a fully populated row held in a draft. May carry a back-reference to the
//!   template it was merged from.
//! - [`TemplateMedication`]: the stored form inside a template. Every field is optional because
//!   stored documents may be incomplete; defaults are applied when the row is merged into a draft.
//! - [`PrescribedMedication`]: the row as written into a finalised prescription, without any
//!   identifiers.

use crate::error::{RxError, RxResult};
use crate::regimen::normalise_regimen;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a medication row, unique within its containing list.
///
/// Opaque: rows read from stored templates keep whatever identifier they were saved with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct MedicationId(String);

impl MedicationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MedicationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// When the dose is taken relative to a meal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum MealTime {
    #[serde(rename = "Before Meal")]
    BeforeMeal,
    #[default]
    #[serde(rename = "After Meal")]
    AfterMeal,
    #[serde(rename = "With Meal")]
    WithMeal,
}

impl MealTime {
    pub const ALL: [MealTime; 3] = [MealTime::BeforeMeal, MealTime::AfterMeal, MealTime::WithMeal];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealTime::BeforeMeal => "Before Meal",
            MealTime::AfterMeal => "After Meal",
            MealTime::WithMeal => "With Meal",
        }
    }
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealTime {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| RxError::InvalidInput(format!("unknown meal time: '{s}'")))
    }
}

/// How often the dose is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    #[serde(rename = "Twice a day")]
    TwiceADay,
    #[serde(rename = "As needed")]
    AsNeeded,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::TwiceADay,
        Frequency::AsNeeded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::TwiceADay => "Twice a day",
            Frequency::AsNeeded => "As needed",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| RxError::InvalidInput(format!("unknown frequency: '{s}'")))
    }
}

/// Editable fields of a draft medication row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum MedicationField {
    Name,
    Regimen,
    MealTime,
    Duration,
    Frequency,
    Remarks,
}

impl FromStr for MedicationField {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "regimen" => Ok(Self::Regimen),
            "mealTime" | "meal_time" => Ok(Self::MealTime),
            "duration" => Ok(Self::Duration),
            "frequency" => Ok(Self::Frequency),
            "remarks" => Ok(Self::Remarks),
            other => Err(RxError::InvalidInput(format!(
                "unknown medication field: '{other}'"
            ))),
        }
    }
}

/// A medication row in a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: MedicationId,
    pub name: String,
    pub regimen: String,
    pub meal_time: MealTime,
    pub duration: String,
    pub frequency: Frequency,
    pub remarks: String,
    /// Set when the row was merged in from a template; manual rows never carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_template_id: Option<String>,
}

impl Medication {
    /// An empty manual row, as created by "add row".
    pub fn blank(id: MedicationId) -> Self {
        Self {
            id,
            name: String::new(),
            regimen: String::new(),
            meal_time: MealTime::default(),
            duration: String::new(),
            frequency: Frequency::default(),
            remarks: String::new(),
            source_template_id: None,
        }
    }

    /// Builds a draft row from a stored template row, tagging it with `template_id`.
    ///
    /// Returns `None` when the stored row has no usable identity. Missing or empty fields fall
    /// back to their defaults: After Meal, Daily, and empty text for everything else.
    pub fn from_template_row(row: &TemplateMedication, template_id: &str) -> Option<Self> {
        let id = row.id.as_ref().filter(|id| !id.is_empty())?.clone();

        Some(Self {
            id,
            name: row.name.clone().unwrap_or_default(),
            regimen: row.regimen.clone().unwrap_or_default(),
            meal_time: row.meal_time.unwrap_or_default(),
            duration: row.duration.clone().unwrap_or_default(),
            frequency: row.frequency.unwrap_or_default(),
            remarks: row.remarks.clone().unwrap_or_default(),
            source_template_id: Some(template_id.to_owned()),
        })
    }

    /// True when the row has a name worth keeping.
    pub fn is_filled(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Replaces one field. Regimen input is normalised; other text is stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::InvalidInput`] when a meal time or frequency value is not one of the
    /// known labels.
    pub fn set_field(&mut self, field: MedicationField, value: &str) -> RxResult<()> {
        match field {
            MedicationField::Name => self.name = value.to_owned(),
            MedicationField::Regimen => self.regimen = normalise_regimen(value),
            MedicationField::MealTime => self.meal_time = value.parse()?,
            MedicationField::Duration => self.duration = value.to_owned(),
            MedicationField::Frequency => self.frequency = value.parse()?,
            MedicationField::Remarks => self.remarks = value.to_owned(),
        }
        Ok(())
    }
}

/// A medication row as stored inside a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemplateMedication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MedicationId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub regimen: Option<String>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub meal_time: Option<MealTime>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub remarks: Option<String>,
}

impl From<&Medication> for TemplateMedication {
    /// Drops the draft-only back-reference and keeps the row identity.
    fn from(med: &Medication) -> Self {
        Self {
            id: Some(med.id.clone()),
            name: Some(med.name.clone()),
            regimen: Some(med.regimen.clone()),
            meal_time: Some(med.meal_time),
            duration: Some(med.duration.clone()),
            frequency: Some(med.frequency),
            remarks: Some(med.remarks.clone()),
        }
    }
}

impl TemplateMedication {
    pub fn is_filled(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// A medication as written into a finalised prescription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedication {
    pub name: String,
    pub regimen: String,
    pub meal_time: MealTime,
    pub duration: String,
    pub frequency: Frequency,
    pub remarks: String,
}

impl From<&Medication> for PrescribedMedication {
    fn from(med: &Medication) -> Self {
        Self {
            name: med.name.clone(),
            regimen: med.regimen.clone(),
            meal_time: med.meal_time,
            duration: med.duration.clone(),
            frequency: med.frequency,
            remarks: med.remarks.clone(),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

// Stored documents may hold blanks or labels this build does not know; both read as absent.
fn lenient_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_row_has_form_defaults() {
        let med = Medication::blank(MedicationId::new("m1"));
        assert_eq!(med.meal_time, MealTime::AfterMeal);
        assert_eq!(med.frequency, Frequency::Daily);
        assert!(med.name.is_empty() && med.regimen.is_empty());
        assert!(med.duration.is_empty() && med.remarks.is_empty());
        assert!(med.source_template_id.is_none());
        assert!(!med.is_filled());
    }

    #[test]
    fn template_row_backfills_missing_fields() {
        let row: TemplateMedication = serde_json::from_str(
            r#"{"id":"r1","name":"Metformin","mealTime":"","frequency":"Fortnightly","remarks":null}"#,
        )
        .unwrap();

        let med = Medication::from_template_row(&row, "t1").expect("row has an id");
        assert_eq!(med.id.as_str(), "r1");
        assert_eq!(med.name, "Metformin");
        assert_eq!(med.regimen, "");
        assert_eq!(med.meal_time, MealTime::AfterMeal);
        assert_eq!(med.frequency, Frequency::Daily);
        assert_eq!(med.duration, "");
        assert_eq!(med.remarks, "");
        assert_eq!(med.source_template_id.as_deref(), Some("t1"));
    }

    #[test]
    fn template_row_keeps_present_fields() {
        let row = TemplateMedication {
            id: Some("r2".into()),
            name: Some("Omeprazole".into()),
            regimen: Some("1-0-0".into()),
            meal_time: Some(MealTime::BeforeMeal),
            duration: Some("14 Days".into()),
            frequency: Some(Frequency::TwiceADay),
            remarks: Some("empty stomach".into()),
        };
        let med = Medication::from_template_row(&row, "t9").unwrap();
        assert_eq!(med.meal_time, MealTime::BeforeMeal);
        assert_eq!(med.frequency, Frequency::TwiceADay);
        assert_eq!(med.duration, "14 Days");
        assert_eq!(med.remarks, "empty stomach");
    }

    #[test]
    fn template_row_without_identity_is_rejected() {
        let mut row = TemplateMedication {
            name: Some("Paracetamol".into()),
            ..Default::default()
        };
        assert!(Medication::from_template_row(&row, "t1").is_none());

        row.id = Some(MedicationId::new(""));
        assert!(Medication::from_template_row(&row, "t1").is_none());

        row.id = Some(MedicationId::new("  "));
        let kept = Medication::from_template_row(&row, "t1").unwrap();
        assert_eq!(kept.id.as_str(), "  ");
    }

    #[test]
    fn set_field_normalises_regimen_only() {
        let mut med = Medication::blank("m1".into());
        med.set_field(MedicationField::Regimen, "1 then 0 then 1 then 1")
            .unwrap();
        assert_eq!(med.regimen, "1-0-1");

        med.set_field(MedicationField::Duration, " 101 days ").unwrap();
        assert_eq!(med.duration, " 101 days ");

        med.set_field(MedicationField::MealTime, "With Meal").unwrap();
        assert_eq!(med.meal_time, MealTime::WithMeal);

        let err = med
            .set_field(MedicationField::Frequency, "Hourly")
            .expect_err("unknown frequency");
        assert!(matches!(err, RxError::InvalidInput(_)));
        assert_eq!(med.frequency, Frequency::Daily);
    }

    #[test]
    fn medication_serialises_with_stored_labels() {
        let mut med = Medication::blank("m1".into());
        med.frequency = Frequency::AsNeeded;
        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["mealTime"], "After Meal");
        assert_eq!(json["frequency"], "As needed");
        assert!(json.get("sourceTemplateId").is_none());
    }

    #[test]
    fn template_row_from_draft_drops_source() {
        let mut med = Medication::blank("m1".into());
        med.name = "Aspirin".into();
        med.source_template_id = Some("t1".into());

        let row = TemplateMedication::from(&med);
        assert_eq!(row.id, Some(MedicationId::new("m1")));
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("sourceTemplateId").is_none());
        assert_eq!(json["name"], "Aspirin");
    }

    #[test]
    fn field_names_parse_from_form_keys() {
        assert_eq!(
            "mealTime".parse::<MedicationField>().unwrap(),
            MedicationField::MealTime
        );
        assert!("dosage".parse::<MedicationField>().is_err());
    }
}
