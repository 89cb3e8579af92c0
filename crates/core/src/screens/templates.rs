use super::helpers::Removal;
use crate::constants::{TEMPLATES_LOAD_FAILED, TEMPLATE_SAVE_FAILED};
use crate::error::{RxError, RxResult};
use crate::gateway::DataGateway;
use crate::template::{Template, TemplateEditor};
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    error: Option<String>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub async fn refresh(&mut self, gateway: &dyn DataGateway, owner_id: &str) {
        match gateway.list_active_templates(owner_id).await {
            Ok(templates) => {
                self.templates = templates;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load templates");
                self.templates.clear();
                self.error = Some(err.message_or(TEMPLATES_LOAD_FAILED).to_owned());
            }
        }
    }

    pub async fn create(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        editor: &TemplateEditor,
    ) -> RxResult<String> {
        let new = editor.validate()?.into_new(owner_id);
        let id = gateway.create_template(&new).await.map_err(|err| {
            tracing::error!(error = %err, "failed to create template");
            self.error = Some(err.message_or(TEMPLATE_SAVE_FAILED).to_owned());
            err
        })?;
        tracing::info!(template_id = %id, "template created");
        self.refresh(gateway, owner_id).await;
        Ok(id)
    }

    /// Replaces both the name and the rows of a template.
    pub async fn update(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        id: &str,
        editor: &TemplateEditor,
    ) -> RxResult<()> {
        let patch = editor.validate()?.into_patch();
        self.ensure_owned(gateway, owner_id, id).await?;
        gateway
            .replace_template_fields(id, &patch)
            .await
            .map_err(|err| {
                tracing::error!(template_id = %id, error = %err, "failed to update template");
                self.error = Some(err.message_or(TEMPLATE_SAVE_FAILED).to_owned());
                err
            })?;
        tracing::info!(template_id = %id, "template updated");
        self.refresh(gateway, owner_id).await;
        Ok(())
    }

    async fn ensure_owned(
        &mut self,
        gateway: &dyn DataGateway,
        owner_id: &str,
        id: &str,
    ) -> RxResult<()> {
        let owned = |lib: &Self| lib.get(id).is_some_and(|t| t.owner_id == owner_id);
        if !owned(self) {
            self.refresh(gateway, owner_id).await;
        }
        if owned(self) {
            Ok(())
        } else {
            tracing::warn!(template_id = %id, "update refused for template outside the owner's list");
            Err(RxError::NotFound {
                kind: "template",
                id: id.to_owned(),
            })
        }
    }

    pub async fn archive(&mut self, gateway: &dyn DataGateway, id: &str) -> RxResult<()> {
        let removal = Removal::take(&mut self.templates, |t| t.id == id).ok_or_else(|| {
            RxError::NotFound {
                kind: "template",
                id: id.to_owned(),
            }
        })?;

        match gateway.soft_delete_template(id).await {
            Ok(()) => {
                removal.commit();
                tracing::info!(template_id = %id, "template archived");
                self.error = None;
                Ok(())
            }
            Err(err) => {
                let fallback = format!("Failed to delete template: {}.", removal.item().name);
                tracing::warn!(template_id = %id, error = %err, "archive failed, restoring template");
                self.error = Some(err.message_or(&fallback).to_owned());
                removal.rollback(&mut self.templates);
                Err(err.into())
            }
        }
    }
}
