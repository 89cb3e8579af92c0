//! # Rx Core
//!
//! Core business logic for composing prescriptions.
//!
//! This crate contains the pure draft and template operations plus the gateway boundaries:
//! - Template composition: merging template rows into a draft and taking them back out
//! - The prescription draft, its finalisation and the compose session around it
//! - Regimen input normalisation
//! - Screen state for enterprise profiles and templates, with optimistic archiving
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest` and `rx-cli`.

pub mod composer;
pub mod config;
pub mod constants;
pub mod context;
pub mod draft;
pub mod enterprise;
pub mod error;
pub mod gateway;
pub mod medication;
pub mod regimen;
pub mod screens;
pub mod session;
pub mod template;

pub use composer::{MergeOutcome, TemplateComposer};
pub use config::CoreConfig;
pub use context::{AppContext, Theme};
pub use draft::{PatientDetails, PatientField, Prescription, PrescriptionDraft};
pub use enterprise::{EnterpriseDetails, EnterpriseProfile, EnterpriseRef};
pub use error::{RxError, RxResult};
pub use gateway::{
    AuthState, DataGateway, GatewayError, GatewayResult, IdentityGateway, InMemoryGateway,
    InMemoryIdentity, User,
};
pub use medication::{
    Frequency, MealTime, Medication, MedicationField, MedicationId, PrescribedMedication,
    TemplateMedication,
};
pub use regimen::normalise_regimen;
pub use screens::{EnterpriseDirectory, TemplateLibrary};
pub use session::{ComposeSession, SessionState, SessionView, Submitted};
pub use template::{Template, TemplateEditor};
