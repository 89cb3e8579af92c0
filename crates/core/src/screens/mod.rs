//! State behind the enterprise and template management screens.
//!
//! Each holder owns one list of the signed-in owner's records and the last error message. Updates
//! and archives only touch records in that list. Archiving is optimistic: the row leaves the list
//! before the gateway is asked and comes back if the gateway refuses.

mod enterprises;
mod helpers;
mod templates;

pub use enterprises::EnterpriseDirectory;
pub use helpers::Removal;
pub use templates::TemplateLibrary;
