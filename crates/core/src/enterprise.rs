//! Enterprise (clinic) profiles.
//!
//! A profile brands a prescription with the hospital name, doctor and license number. The core
//! only needs its identity and hospital name; everything else is carried for display.

use crate::error::RxResult;
use chrono::{DateTime, Utc};
use rx_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// The editable part of a profile. All fields except the logo are required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseDetails {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub hospital_name: NonEmptyText,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub address: NonEmptyText,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub doctor_name: NonEmptyText,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub license_number: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl EnterpriseDetails {
    /// Validates raw form input.
    ///
    /// Text is trimmed; a blank logo URL reads as absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RxError::Text`] when a required field is blank.
    pub fn new(
        hospital_name: &str,
        address: &str,
        doctor_name: &str,
        license_number: &str,
        logo_url: Option<&str>,
    ) -> RxResult<Self> {
        Ok(Self {
            hospital_name: NonEmptyText::new(hospital_name)?,
            address: NonEmptyText::new(address)?,
            doctor_name: NonEmptyText::new(doctor_name)?,
            license_number: NonEmptyText::new(license_number)?,
            logo_url: logo_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
        })
    }
}

/// A stored enterprise profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseProfile {
    pub id: String,
    #[serde(flatten)]
    pub details: EnterpriseDetails,
    #[serde(rename = "createdByUid")]
    pub owner_id: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EnterpriseProfile {
    pub fn hospital_name(&self) -> &str {
        self.details.hospital_name.as_str()
    }

    /// The reference a draft keeps to this profile.
    pub fn reference(&self) -> EnterpriseRef {
        EnterpriseRef {
            id: self.id.clone(),
            hospital_name: self.hospital_name().to_owned(),
        }
    }
}

/// The part of a profile a prescription needs: who issued it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseRef {
    pub id: String,
    pub hospital_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RxError;

    #[test]
    fn details_trim_and_drop_blank_logo() {
        let details = EnterpriseDetails::new(
            " City Clinic ",
            "12 High Street",
            "Dr. Rao",
            "LIC-42",
            Some("   "),
        )
        .unwrap();
        assert_eq!(details.hospital_name.as_str(), "City Clinic");
        assert!(details.logo_url.is_none());
    }

    #[test]
    fn details_require_every_text_field() {
        let err = EnterpriseDetails::new("City Clinic", "", "Dr. Rao", "LIC-42", None)
            .expect_err("address is required");
        assert!(matches!(err, RxError::Text(_)));
    }

    #[test]
    fn profile_serialises_with_stored_field_names() {
        let profile = EnterpriseProfile {
            id: "e1".into(),
            details: EnterpriseDetails::new("City Clinic", "Addr", "Dr. Rao", "LIC", None)
                .unwrap(),
            owner_id: "u1".into(),
            is_deleted: false,
            deleted_at: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["hospitalName"], "City Clinic");
        assert_eq!(json["createdByUid"], "u1");
        assert_eq!(json["isDeleted"], false);

        let reference = profile.reference();
        assert_eq!(reference.id, "e1");
        assert_eq!(reference.hospital_name, "City Clinic");
    }
}
