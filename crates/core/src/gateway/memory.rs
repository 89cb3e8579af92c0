//! In-process document store.
//!
//! Keeps every collection in memory behind a `tokio::sync::RwLock`. Identities are fresh
//! [`RecordId`]s; listings follow the same rules as the hosted store (owner filter, soft-deleted
//! records hidden, templates newest first).

use super::{DataGateway, GatewayError, GatewayResult};
use crate::constants::{ENTERPRISES_COLLECTION, PRESCRIPTIONS_COLLECTION, TEMPLATES_COLLECTION};
use crate::draft::Prescription;
use crate::enterprise::{EnterpriseDetails, EnterpriseProfile};
use crate::template::{NewTemplate, Template, TemplatePatch};
use async_trait::async_trait;
use chrono::Utc;
use rx_uuid::RecordId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

const UNAVAILABLE: &str = "The service is currently unavailable.";

#[derive(Clone, Debug)]
struct StoredTemplate {
    // Insertion order, to break ties between equal creation times.
    seq: u64,
    template: Template,
}

#[derive(Default)]
pub struct InMemoryGateway {
    enterprises: RwLock<Vec<EnterpriseProfile>>,
    templates: RwLock<HashMap<String, StoredTemplate>>,
    prescriptions: RwLock<Vec<(String, Prescription)>>,
    seq: AtomicU64,
    offline: AtomicBool,
    blank_errors: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails, without touching stored data.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Offline failures carry an empty message, like a backend that reports nothing useful.
    pub fn set_blank_errors(&self, blank: bool) {
        self.blank_errors.store(blank, Ordering::SeqCst);
    }

    /// A stored template, deleted or not.
    pub async fn template(&self, id: &str) -> Option<Template> {
        self.templates
            .read()
            .await
            .get(id)
            .map(|stored| stored.template.clone())
    }

    /// A stored enterprise profile, deleted or not.
    pub async fn enterprise(&self, id: &str) -> Option<EnterpriseProfile> {
        self.enterprises
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub async fn prescriptions(&self) -> Vec<(String, Prescription)> {
        self.prescriptions.read().await.clone()
    }

    fn ensure_online(&self) -> GatewayResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            let message = if self.blank_errors.load(Ordering::SeqCst) {
                ""
            } else {
                UNAVAILABLE
            };
            return Err(GatewayError::new(message));
        }
        Ok(())
    }

    fn missing(collection: &str, id: &str) -> GatewayError {
        GatewayError::new(format!("No document to update: {collection}/{id}"))
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn list_active_enterprises(
        &self,
        owner_id: &str,
    ) -> GatewayResult<Vec<EnterpriseProfile>> {
        self.ensure_online()?;
        let enterprises = self.enterprises.read().await;
        Ok(enterprises
            .iter()
            .filter(|e| e.owner_id == owner_id && !e.is_deleted)
            .cloned()
            .collect())
    }

    async fn create_enterprise(
        &self,
        owner_id: &str,
        details: &EnterpriseDetails,
    ) -> GatewayResult<String> {
        self.ensure_online()?;
        let id = RecordId::new().to_string();
        self.enterprises.write().await.push(EnterpriseProfile {
            id: id.clone(),
            details: details.clone(),
            owner_id: owner_id.to_owned(),
            is_deleted: false,
            deleted_at: None,
        });
        tracing::debug!(collection = ENTERPRISES_COLLECTION, %id, "created");
        Ok(id)
    }

    async fn replace_enterprise(&self, id: &str, details: &EnterpriseDetails) -> GatewayResult<()> {
        self.ensure_online()?;
        let mut enterprises = self.enterprises.write().await;
        let profile = enterprises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::missing(ENTERPRISES_COLLECTION, id))?;
        profile.details = details.clone();
        Ok(())
    }

    async fn soft_delete_enterprise(&self, id: &str) -> GatewayResult<()> {
        self.ensure_online()?;
        let mut enterprises = self.enterprises.write().await;
        let profile = enterprises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::missing(ENTERPRISES_COLLECTION, id))?;
        profile.is_deleted = true;
        profile.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn list_active_templates(&self, owner_id: &str) -> GatewayResult<Vec<Template>> {
        self.ensure_online()?;
        let templates = self.templates.read().await;
        let mut active: Vec<&StoredTemplate> = templates
            .values()
            .filter(|s| s.template.owner_id == owner_id && !s.template.is_deleted)
            .collect();
        active.sort_by(|a, b| {
            (b.template.created_at, b.seq).cmp(&(a.template.created_at, a.seq))
        });
        Ok(active.into_iter().map(|s| s.template.clone()).collect())
    }

    async fn create_template(&self, template: &NewTemplate) -> GatewayResult<String> {
        self.ensure_online()?;
        let id = RecordId::new().to_string();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let stored = StoredTemplate {
            seq,
            template: Template {
                id: id.clone(),
                name: template.name.as_str().to_owned(),
                medications: template.medications.clone(),
                owner_id: template.owner_id.clone(),
                is_deleted: false,
                created_at: Some(Utc::now()),
                updated_at: None,
            },
        };
        self.templates.write().await.insert(id.clone(), stored);
        tracing::debug!(collection = TEMPLATES_COLLECTION, %id, "created");
        Ok(id)
    }

    async fn replace_template_fields(&self, id: &str, patch: &TemplatePatch) -> GatewayResult<()> {
        self.ensure_online()?;
        let mut templates = self.templates.write().await;
        let stored = templates
            .get_mut(id)
            .ok_or_else(|| Self::missing(TEMPLATES_COLLECTION, id))?;
        if let Some(name) = &patch.name {
            stored.template.name = name.as_str().to_owned();
        }
        if let Some(medications) = &patch.medications {
            stored.template.medications = medications.clone();
        }
        stored.template.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn soft_delete_template(&self, id: &str) -> GatewayResult<()> {
        self.ensure_online()?;
        let mut templates = self.templates.write().await;
        let stored = templates
            .get_mut(id)
            .ok_or_else(|| Self::missing(TEMPLATES_COLLECTION, id))?;
        stored.template.is_deleted = true;
        Ok(())
    }

    async fn create_prescription(&self, prescription: &Prescription) -> GatewayResult<String> {
        self.ensure_online()?;
        let id = RecordId::new().to_string();
        self.prescriptions
            .write()
            .await
            .push((id.clone(), prescription.clone()));
        tracing::debug!(collection = PRESCRIPTIONS_COLLECTION, %id, "created");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::TemplateMedication;
    use rx_types::NonEmptyText;

    fn details(name: &str) -> EnterpriseDetails {
        EnterpriseDetails::new(name, "Addr", "Dr. Rao", "LIC", None).unwrap()
    }

    fn new_template(name: &str, owner: &str) -> NewTemplate {
        NewTemplate {
            name: NonEmptyText::new(name).unwrap(),
            medications: vec![TemplateMedication {
                id: Some("r1".into()),
                name: Some("Aspirin".into()),
                ..Default::default()
            }],
            owner_id: owner.into(),
        }
    }

    #[tokio::test]
    async fn enterprises_are_scoped_to_owner_and_hide_deleted() {
        let gw = InMemoryGateway::new();
        let a = gw.create_enterprise("u1", &details("A")).await.unwrap();
        gw.create_enterprise("u1", &details("B")).await.unwrap();
        gw.create_enterprise("u2", &details("C")).await.unwrap();

        gw.soft_delete_enterprise(&a).await.unwrap();

        let listed = gw.list_active_enterprises("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].hospital_name(), "B");

        let archived = gw.enterprise(&a).await.unwrap();
        assert!(archived.is_deleted);
        assert!(archived.deleted_at.is_some());
    }

    #[tokio::test]
    async fn templates_list_newest_first() {
        let gw = InMemoryGateway::new();
        gw.create_template(&new_template("First", "u1")).await.unwrap();
        gw.create_template(&new_template("Second", "u1")).await.unwrap();
        gw.create_template(&new_template("Other", "u2")).await.unwrap();

        let names: Vec<_> = gw
            .list_active_templates("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn template_patch_replaces_present_fields_and_stamps_update() {
        let gw = InMemoryGateway::new();
        let id = gw.create_template(&new_template("Old", "u1")).await.unwrap();

        let patch = TemplatePatch {
            name: Some(NonEmptyText::new("New").unwrap()),
            medications: None,
        };
        gw.replace_template_fields(&id, &patch).await.unwrap();

        let stored = gw.template(&id).await.unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(stored.medications.len(), 1);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn unknown_ids_and_offline_calls_fail() {
        let gw = InMemoryGateway::new();
        assert!(gw.soft_delete_template("nope").await.is_err());
        assert!(gw.replace_enterprise("nope", &details("A")).await.is_err());

        gw.create_enterprise("u1", &details("A")).await.unwrap();
        gw.set_offline(true);
        let err = gw.list_active_enterprises("u1").await.unwrap_err();
        assert_eq!(err.message(), UNAVAILABLE);

        gw.set_offline(false);
        assert_eq!(gw.list_active_enterprises("u1").await.unwrap().len(), 1);
    }
}
