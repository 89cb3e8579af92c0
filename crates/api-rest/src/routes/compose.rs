//! Endpoints driving the compose session.
//!
//! Every mutator answers with the full [`SessionView`] so a client can re-render from one response.

use crate::error::{ApiResult, ErrorRes};
use crate::{AppState, IdRes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rx_core::{
    MedicationField, MedicationId, MergeOutcome, PatientField, SessionView, Submitted, Template,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditMedicationReq {
    pub field: MedicationField,
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatientFieldReq {
    pub field: PatientField,
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextReq {
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectEnterpriseReq {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleTemplateReq {
    pub checked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleTemplateRes {
    pub outcome: MergeOutcome,
    pub session: SessionView,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveTemplateReq {
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/compose/open",
    responses(
        (status = 200, description = "Fresh draft with profiles and templates loaded", body = SessionView),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Start a new prescription
///
/// Discards any draft in progress, then loads the user's profiles (selecting the first) and
/// templates. Failed loads are reported in `clinicError` / `templateError`.
#[axum::debug_handler]
pub async fn open(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    let owner_id = state.owner_id()?;
    let mut session = state.session.lock().await;
    session.open(&owner_id)?;
    session.load_enterprises(state.ctx.data()).await?;
    session.load_templates(state.ctx.data()).await?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    get,
    path = "/compose",
    responses(
        (status = 200, description = "Current session", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn view(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let session = state.session.lock().await;
    Ok(Json(session.view()))
}

#[utoipa::path(
    post,
    path = "/compose/medications",
    responses(
        (status = 201, description = "Empty row added", body = IdRes),
        (status = 409, description = "No prescription open", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn add_medication(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<IdRes>)> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    let id = session.add_medication(state.ids.as_ref())?;
    Ok((
        StatusCode::CREATED,
        Json(IdRes {
            id: id.as_str().to_owned(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/compose/medications/{id}",
    request_body = EditMedicationReq,
    params(("id" = String, Path, description = "Medication row id")),
    responses(
        (status = 200, description = "Row edited (unknown ids are ignored)", body = SessionView),
        (status = 400, description = "Unknown meal time or frequency label", body = ErrorRes)
    )
)]
/// Edit one field of a medication row
///
/// Regimen values are normalised to the `d-d-d` form as they are typed.
#[axum::debug_handler]
pub async fn edit_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditMedicationReq>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.edit_medication(&MedicationId::new(id), req.field, &req.value)?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    delete,
    path = "/compose/medications/{id}",
    params(("id" = String, Path, description = "Medication row id")),
    responses(
        (status = 200, description = "Row removed (unknown ids are ignored)", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn remove_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.remove_medication(&MedicationId::new(id))?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    put,
    path = "/compose/patient",
    request_body = PatientFieldReq,
    responses(
        (status = 200, description = "Patient field set", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn set_patient_field(
    State(state): State<AppState>,
    Json(req): Json<PatientFieldReq>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.set_patient_field(req.field, &req.value)?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    put,
    path = "/compose/advice",
    request_body = TextReq,
    responses(
        (status = 200, description = "Advice set", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn set_advice(
    State(state): State<AppState>,
    Json(req): Json<TextReq>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.set_advice(&req.text)?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    put,
    path = "/compose/notes",
    request_body = TextReq,
    responses(
        (status = 200, description = "Notes set", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn set_notes(
    State(state): State<AppState>,
    Json(req): Json<TextReq>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.set_notes(&req.text)?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    put,
    path = "/compose/enterprise",
    request_body = SelectEnterpriseReq,
    responses(
        (status = 200, description = "Selection changed; an unknown id clears it", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn select_enterprise(
    State(state): State<AppState>,
    Json(req): Json<SelectEnterpriseReq>,
) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.select_enterprise(req.id.as_deref())?;
    Ok(Json(session.view()))
}

#[utoipa::path(
    post,
    path = "/compose/templates/{id}",
    request_body = ToggleTemplateReq,
    params(("id" = String, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template merged or removed", body = ToggleTemplateRes),
        (status = 404, description = "Template not loaded", body = ErrorRes)
    )
)]
/// Select or deselect a template for the draft
///
/// Selecting merges the template's rows, skipping rows whose id is missing or already present.
/// Deselecting removes exactly the rows that template contributed.
#[axum::debug_handler]
pub async fn toggle_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ToggleTemplateReq>,
) -> ApiResult<Json<ToggleTemplateRes>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    let outcome = session.toggle_template(&id, req.checked)?;
    Ok(Json(ToggleTemplateRes {
        outcome,
        session: session.view(),
    }))
}

#[utoipa::path(
    post,
    path = "/compose/save-template",
    request_body = SaveTemplateReq,
    responses(
        (status = 201, description = "Template saved and listed first", body = Template),
        (status = 400, description = "Empty medication list or blank name", body = ErrorRes),
        (status = 502, description = "Store rejected the write", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn save_as_template(
    State(state): State<AppState>,
    Json(req): Json<SaveTemplateReq>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    let template = session.save_as_template(state.ctx.data(), &req.name).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    post,
    path = "/compose/submit",
    responses(
        (status = 201, description = "Prescription stored; the session is closed", body = Submitted),
        (status = 400, description = "No clinic selected or incomplete regimen", body = ErrorRes),
        (status = 502, description = "Store rejected the write; the draft is kept", body = ErrorRes)
    )
)]
/// Finalise and store the prescription
///
/// # Errors
/// - `400 Bad Request` when no clinic is selected ("Please select a clinic.") or a named row has a
///   partial regimen.
/// - `502 Bad Gateway` when the store fails. The draft stays editable in both cases.
#[axum::debug_handler]
pub async fn submit(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Submitted>)> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    let submitted = session.submit(state.ctx.data(), Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

#[utoipa::path(
    post,
    path = "/compose/cancel",
    responses(
        (status = 200, description = "Session discarded", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn cancel(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    state.owner_id()?;
    let mut session = state.session.lock().await;
    session.cancel();
    Ok(Json(session.view()))
}
