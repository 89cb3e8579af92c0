//! Boundaries to the hosted document store and identity provider.
//!
//! The core never talks to a backend directly. Screens and the compose session call these traits,
//! and the binaries decide which implementation to wire in. The in-process implementations in
//! [`memory`] and [`identity`] back the local server and the test suite.

pub mod identity;
pub mod memory;

use crate::draft::Prescription;
use crate::enterprise::{EnterpriseDetails, EnterpriseProfile};
use crate::template::{NewTemplate, Template, TemplatePatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use identity::InMemoryIdentity;
pub use memory::InMemoryGateway;

/// A failed gateway call, carrying the backend's human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backend message, or `fallback` when the backend gave none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.trim().is_empty() {
            fallback
        } else {
            &self.message
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// A signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
}

/// One snapshot of the identity stream.
///
/// `checking` is true until the provider has resolved whether a session exists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub checking: bool,
}

impl AuthState {
    pub fn checking() -> Self {
        Self {
            user: None,
            checking: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            checking: false,
        }
    }
}

/// Document store operations used by the core.
///
/// Deletes are always soft: the record is flagged and disappears from the `list_active_*`
/// queries but stays stored.
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn list_active_enterprises(&self, owner_id: &str)
        -> GatewayResult<Vec<EnterpriseProfile>>;

    async fn create_enterprise(
        &self,
        owner_id: &str,
        details: &EnterpriseDetails,
    ) -> GatewayResult<String>;

    async fn replace_enterprise(&self, id: &str, details: &EnterpriseDetails) -> GatewayResult<()>;

    /// Flags the profile deleted and stamps the deletion time.
    async fn soft_delete_enterprise(&self, id: &str) -> GatewayResult<()>;

    /// Active templates of `owner_id`, newest created first.
    async fn list_active_templates(&self, owner_id: &str) -> GatewayResult<Vec<Template>>;

    /// Stores a new template stamped not-deleted with the creation time. Returns its identity.
    async fn create_template(&self, template: &NewTemplate) -> GatewayResult<String>;

    /// Replaces the fields present in `patch` and stamps the update time.
    async fn replace_template_fields(&self, id: &str, patch: &TemplatePatch) -> GatewayResult<()>;

    async fn soft_delete_template(&self, id: &str) -> GatewayResult<()>;

    async fn create_prescription(&self, prescription: &Prescription) -> GatewayResult<String>;
}

/// Email/password identity provider.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<User>;

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<User>;

    async fn sign_out(&self) -> GatewayResult<()>;

    /// A receiver that always holds the latest auth snapshot.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}
