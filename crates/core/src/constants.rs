//! Constants used throughout the Rx core crate.
//!
//! Collection names, user-facing fallback messages and form limits live here so that the
//! gateways, the screen state and the API layer agree on them.

/// Document collection holding enterprise (clinic) profiles.
pub const ENTERPRISES_COLLECTION: &str = "enterprises";

/// Document collection holding medication templates.
pub const TEMPLATES_COLLECTION: &str = "templates";

/// Document collection holding finalised prescriptions.
pub const PRESCRIPTIONS_COLLECTION: &str = "prescriptions";

/// Maximum number of regimen slots (morning, afternoon, night).
pub const REGIMEN_SLOTS: usize = 3;

/// Separator placed between regimen digits.
pub const REGIMEN_SEPARATOR: char = '-';

/// Default minimum password length accepted at sign-up.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// Fallback shown when loading clinics fails without a message.
pub const CLINICS_LOAD_FAILED: &str = "Failed to load clinics.";

/// Fallback shown when loading templates fails without a message.
pub const TEMPLATES_LOAD_FAILED: &str = "Failed to load templates.";

/// Fallback shown when a template save fails without a message.
pub const TEMPLATE_SAVE_FAILED: &str = "An unknown error occurred while saving the template.";

/// Fallback shown when a prescription save fails without a message.
pub const PRESCRIPTION_SAVE_FAILED: &str = "Failed to save prescription.";

/// Fallback shown when creating an enterprise profile fails without a message.
pub const PROFILE_CREATE_FAILED: &str = "Failed to create profile.";

/// Fallback shown when updating an enterprise profile fails without a message.
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile.";
