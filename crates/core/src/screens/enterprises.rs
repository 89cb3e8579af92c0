use super::helpers::Removal;
use crate::constants::{CLINICS_LOAD_FAILED, PROFILE_CREATE_FAILED, PROFILE_UPDATE_FAILED};
use crate::enterprise::{EnterpriseDetails, EnterpriseProfile};
use crate::error::{RxError, RxResult};
use crate::gateway::DataGateway;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseDirectory {
    profiles: Vec<EnterpriseProfile>,
    error: Option<String>,
}

impl EnterpriseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[EnterpriseProfile] {
        &self.profiles
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reloads the owner's active profiles. A failure clears the list and records the message.
    pub async fn refresh(&mut self, gateway: &dyn DataGateway, owner_id: &str) {
        match gateway.list_active_enterprises(owner_id).await {
            Ok(profiles) => {
                self.profiles = profiles;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load enterprise profiles");
                self.profiles.clear();
                self.error = Some(err.message_or(CLINICS_LOAD_FAILED).to_owned());
            }
        }
    }

    pub async fn create(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        details: &EnterpriseDetails,
    ) -> RxResult<String> {
        let id = gateway
            .create_enterprise(owner_id, details)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to create enterprise profile");
                self.error = Some(err.message_or(PROFILE_CREATE_FAILED).to_owned());
                err
            })?;
        tracing::info!(enterprise_id = %id, "enterprise profile created");
        self.refresh(gateway, owner_id).await;
        Ok(id)
    }

    pub async fn update(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        id: &str,
        details: &EnterpriseDetails,
    ) -> RxResult<()> {
        self.ensure_owned(gateway, owner_id, id).await?;
        gateway
            .replace_enterprise(id, details)
            .await
            .map_err(|err| {
                tracing::error!(enterprise_id = %id, error = %err, "failed to update enterprise profile");
                self.error = Some(err.message_or(PROFILE_UPDATE_FAILED).to_owned());
                err
            })?;
        self.refresh(gateway, owner_id).await;
        Ok(())
    }

    /// Succeeds when `id` is one of the owner's active profiles, reloading the list once if the
    /// id is not loaded yet.
    async fn ensure_owned(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        id: &str,
    ) -> RxResult<()> {
        let owned = |dir: &Self| {
            dir.profiles
                .iter()
                .any(|p| p.id == id && p.owner_id == owner_id)
        };
        if !owned(self) {
            self.refresh(gateway, owner_id).await;
        }
        if owned(self) {
            Ok(())
        } else {
            tracing::warn!(enterprise_id = %id, "update refused for profile outside the owner's list");
            Err(RxError::NotFound {
                kind: "enterprise",
                id: id.to_owned(),
            })
        }
    }

    /// Soft-deletes a loaded profile, restoring it locally if the gateway refuses.
    pub async fn archive(&mut self, gateway: &dyn DataGateway, id: &str) -> RxResult<()> {
        let removal = Removal::take(&mut self.profiles, |p| p.id == id).ok_or_else(|| {
            RxError::NotFound {
                kind: "enterprise",
                id: id.to_owned(),
            }
        })?;

        match gateway.soft_delete_enterprise(id).await {
            Ok(()) => {
                let profile = removal.commit();
                tracing::info!(enterprise_id = %profile.id, "enterprise profile archived");
                self.error = None;
                Ok(())
            }
            Err(err) => {
                let fallback = format!("Failed to archive profile: {}.", removal.item().hospital_name());
                tracing::warn!(enterprise_id = %id, error = %err, "archive failed, restoring profile");
                self.error = Some(err.message_or(&fallback).to_owned());
                removal.rollback(&mut self.profiles);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;

    fn details(name: &str) -> EnterpriseDetails {
        EnterpriseDetails::new(name, "Addr", "Dr. Rao", "LIC", None).unwrap()
    }

    #[tokio::test]
    async fn create_and_update_refresh_the_list() {
        let gw = InMemoryGateway::new();
        let mut dir = EnterpriseDirectory::new();

        let id = dir.create(&gw, "u1", &details("City Clinic")).await.unwrap();
        assert_eq!(dir.profiles().len(), 1);

        dir.update(&gw, "u1", &id, &details("Town Clinic")).await.unwrap();
        assert_eq!(dir.profiles()[0].hospital_name(), "Town Clinic");
    }

    #[tokio::test]
    async fn update_of_another_owners_profile_is_refused() {
        let gw = InMemoryGateway::new();
        let id = EnterpriseDirectory::new()
            .create(&gw, "userA", &details("City Clinic"))
            .await
            .unwrap();

        let mut dir_b = EnterpriseDirectory::new();
        let err = dir_b
            .update(&gw, "userB", &id, &details("Hijacked"))
            .await
            .unwrap_err();

        assert!(matches!(err, RxError::NotFound { kind: "enterprise", .. }));
        let stored = gw.enterprise(&id).await.unwrap();
        assert_eq!(stored.hospital_name(), "City Clinic");
        assert_eq!(stored.owner_id, "userA");

        let mut dir_a = EnterpriseDirectory::new();
        dir_a.update(&gw, "userA", &id, &details("Town Clinic")).await.unwrap();
        assert_eq!(gw.enterprise(&id).await.unwrap().hospital_name(), "Town Clinic");
    }

    #[tokio::test]
    async fn archive_failure_restores_row_in_place() {
        let gw = InMemoryGateway::new();
        let mut dir = EnterpriseDirectory::new();
        for name in ["A", "B", "C"] {
            dir.create(&gw, "u1", &details(name)).await.unwrap();
        }
        let before: Vec<_> = dir.profiles().iter().map(|p| p.id.clone()).collect();

        gw.set_offline(true);
        let err = dir.archive(&gw, &before[1]).await.unwrap_err();

        assert!(matches!(err, RxError::Gateway(_)));
        let after: Vec<_> = dir.profiles().iter().map(|p| p.id.clone()).collect();
        assert_eq!(after, before);
        assert!(dir.error().is_some());
    }

    #[tokio::test]
    async fn archive_success_soft_deletes() {
        let gw = InMemoryGateway::new();
        let mut dir = EnterpriseDirectory::new();
        let id = dir.create(&gw, "u1", &details("A")).await.unwrap();

        dir.archive(&gw, &id).await.unwrap();

        assert!(dir.profiles().is_empty());
        assert!(gw.enterprise(&id).await.unwrap().is_deleted);

        let err = dir.archive(&gw, &id).await.unwrap_err();
        assert!(matches!(err, RxError::NotFound { kind: "enterprise", .. }));
    }

    #[tokio::test]
    async fn failed_refresh_clears_list() {
        let gw = InMemoryGateway::new();
        let mut dir = EnterpriseDirectory::new();
        dir.create(&gw, "u1", &details("A")).await.unwrap();

        gw.set_offline(true);
        dir.refresh(&gw, "u1").await;

        assert!(dir.profiles().is_empty());
        assert_eq!(dir.error(), Some("The service is currently unavailable."));
        let json = serde_json::to_value(&dir).unwrap();
        assert_eq!(json["error"], "The service is currently unavailable.");
        assert!(json.get("loading").is_none());
    }
}
