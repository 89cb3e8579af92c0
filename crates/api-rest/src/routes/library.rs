//! Enterprise profile and template management endpoints.

use crate::error::{ApiResult, ErrorRes};
use crate::{AppState, IdRes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rx_core::{
    EnterpriseDetails, EnterpriseDirectory, RxError, RxResult, Template, TemplateEditor,
    TemplateLibrary,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// Raw enterprise profile form. Validated into [`EnterpriseDetails`].
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseForm {
    pub hospital_name: String,
    pub address: String,
    pub doctor_name: String,
    pub license_number: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl EnterpriseForm {
    fn details(&self) -> RxResult<EnterpriseDetails> {
        EnterpriseDetails::new(
            &self.hospital_name,
            &self.address,
            &self.doctor_name,
            &self.license_number,
            self.logo_url.as_deref(),
        )
        .map_err(|_| {
            RxError::InvalidInput(
                "Hospital name, address, doctor name and license number are required.".into(),
            )
        })
    }
}

#[utoipa::path(
    get,
    path = "/enterprises",
    responses(
        (status = 200, description = "Active enterprise profiles", body = EnterpriseDirectory),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// List the signed-in user's active enterprise profiles
///
/// A failed load is not an error: the list comes back empty with the message in `error`.
#[axum::debug_handler]
pub async fn list_enterprises(State(state): State<AppState>) -> ApiResult<Json<EnterpriseDirectory>> {
    let owner_id = state.owner_id()?;
    let mut dir = state.enterprises.lock().await;
    dir.refresh(state.ctx.data(), &owner_id).await;
    Ok(Json(dir.clone()))
}

#[utoipa::path(
    post,
    path = "/enterprises",
    request_body = EnterpriseForm,
    responses(
        (status = 201, description = "Profile created", body = IdRes),
        (status = 400, description = "Missing required field", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 502, description = "Store rejected the write", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_enterprise(
    State(state): State<AppState>,
    Json(form): Json<EnterpriseForm>,
) -> ApiResult<(StatusCode, Json<IdRes>)> {
    let owner_id = state.owner_id()?;
    let details = form.details()?;
    let mut dir = state.enterprises.lock().await;
    let id = dir.create(state.ctx.data(), &owner_id, &details).await?;
    Ok((StatusCode::CREATED, Json(IdRes { id })))
}

#[utoipa::path(
    put,
    path = "/enterprises/{id}",
    request_body = EnterpriseForm,
    params(("id" = String, Path, description = "Enterprise profile id")),
    responses(
        (status = 200, description = "Profile replaced", body = EnterpriseDirectory),
        (status = 400, description = "Missing required field", body = ErrorRes),
        (status = 404, description = "Not one of your records", body = ErrorRes),
        (status = 502, description = "Store rejected the write", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn update_enterprise(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<EnterpriseForm>,
) -> ApiResult<Json<EnterpriseDirectory>> {
    let owner_id = state.owner_id()?;
    let details = form.details()?;
    let mut dir = state.enterprises.lock().await;
    dir.update(state.ctx.data(), &owner_id, &id, &details).await?;
    Ok(Json(dir.clone()))
}

#[utoipa::path(
    delete,
    path = "/enterprises/{id}",
    params(("id" = String, Path, description = "Enterprise profile id")),
    responses(
        (status = 200, description = "Profile archived", body = EnterpriseDirectory),
        (status = 404, description = "Profile not loaded", body = ErrorRes),
        (status = 502, description = "Store rejected the delete; the profile was restored", body = ErrorRes)
    )
)]
/// Archive (soft-delete) a loaded enterprise profile
///
/// The profile must be in the last listing. It is removed locally before the store is asked and
/// put back at its original position if the store refuses.
#[axum::debug_handler]
pub async fn archive_enterprise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EnterpriseDirectory>> {
    state.owner_id()?;
    let mut dir = state.enterprises.lock().await;
    dir.archive(state.ctx.data(), &id).await?;
    Ok(Json(dir.clone()))
}

#[utoipa::path(
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Active templates, newest first", body = TemplateLibrary),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<TemplateLibrary>> {
    let owner_id = state.owner_id()?;
    let mut lib = state.templates.lock().await;
    lib.refresh(state.ctx.data(), &owner_id).await;
    Ok(Json(lib.clone()))
}

#[utoipa::path(
    get,
    path = "/templates/{id}",
    params(("id" = String, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template", body = Template),
        (status = 404, description = "No active template with this id", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Template>> {
    let owner_id = state.owner_id()?;
    let mut lib = state.templates.lock().await;
    if lib.get(&id).is_none() {
        lib.refresh(state.ctx.data(), &owner_id).await;
    }
    let template = lib.get(&id).cloned().ok_or(RxError::NotFound {
        kind: "template",
        id,
    })?;
    Ok(Json(template))
}

#[utoipa::path(
    post,
    path = "/templates",
    request_body = TemplateEditor,
    responses(
        (status = 201, description = "Template created", body = IdRes),
        (status = 400, description = "Name or medications missing", body = ErrorRes),
        (status = 502, description = "Store rejected the write", body = ErrorRes)
    )
)]
/// Create a template from the editor form
///
/// Rows without a name are dropped. At least one named row and a name are required.
#[axum::debug_handler]
pub async fn create_template(
    State(state): State<AppState>,
    Json(editor): Json<TemplateEditor>,
) -> ApiResult<(StatusCode, Json<IdRes>)> {
    let owner_id = state.owner_id()?;
    let mut lib = state.templates.lock().await;
    let id = lib.create(state.ctx.data(), &owner_id, &editor).await?;
    Ok((StatusCode::CREATED, Json(IdRes { id })))
}

#[utoipa::path(
    put,
    path = "/templates/{id}",
    request_body = TemplateEditor,
    params(("id" = String, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template replaced", body = TemplateLibrary),
        (status = 400, description = "Name or medications missing", body = ErrorRes),
        (status = 404, description = "Not one of your records", body = ErrorRes),
        (status = 502, description = "Store rejected the write", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(editor): Json<TemplateEditor>,
) -> ApiResult<Json<TemplateLibrary>> {
    let owner_id = state.owner_id()?;
    let mut lib = state.templates.lock().await;
    lib.update(state.ctx.data(), &owner_id, &id, &editor).await?;
    Ok(Json(lib.clone()))
}

#[utoipa::path(
    delete,
    path = "/templates/{id}",
    params(("id" = String, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template archived", body = TemplateLibrary),
        (status = 404, description = "Template not loaded", body = ErrorRes),
        (status = 502, description = "Store rejected the delete; the template was restored", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn archive_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TemplateLibrary>> {
    state.owner_id()?;
    let mut lib = state.templates.lock().await;
    lib.archive(state.ctx.data(), &id).await?;
    Ok(Json(lib.clone()))
}
