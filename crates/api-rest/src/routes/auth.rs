//! Identity and theme endpoints. None of these require a signed-in user.

use crate::error::{ApiResult, ErrorRes};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use rx_core::{AuthState, Theme, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThemeBody {
    pub theme: Theme,
}

#[utoipa::path(
    get,
    path = "/auth/state",
    responses(
        (status = 200, description = "Latest auth snapshot", body = AuthState)
    )
)]
#[axum::debug_handler]
pub async fn auth_state(State(state): State<AppState>) -> Json<AuthState> {
    Json(state.ctx.wait_until_ready().await)
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = CredentialsReq,
    responses(
        (status = 200, description = "Signed in", body = User),
        (status = 502, description = "Rejected by the identity provider", body = ErrorRes)
    )
)]
/// Sign in with email and password
///
/// Any per-user state left from a previous account is discarded on success.
///
/// # Errors
/// Returns `502 Bad Gateway` with the provider message (for example "Invalid email or
/// password.") when the provider rejects the credentials.
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<CredentialsReq>,
) -> ApiResult<Json<User>> {
    let user = state.ctx.sign_in(&req.email, &req.password).await?;
    state.reset_user_state().await;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = CredentialsReq,
    responses(
        (status = 201, description = "Account created and signed in", body = User),
        (status = 502, description = "Rejected by the identity provider", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<CredentialsReq>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.ctx.sign_up(&req.email, &req.password).await?;
    state.reset_user_state().await;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 204, description = "Signed out")
    )
)]
/// Sign out and drop the draft and screen state of the signed-in user.
#[axum::debug_handler]
pub async fn sign_out(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.ctx.sign_out().await?;
    state.reset_user_state().await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/theme",
    responses(
        (status = 200, description = "Current theme", body = ThemeBody)
    )
)]
#[axum::debug_handler]
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(ThemeBody {
        theme: state.ctx.theme(),
    })
}

#[utoipa::path(
    put,
    path = "/theme",
    request_body = ThemeBody,
    responses(
        (status = 200, description = "Theme changed", body = ThemeBody)
    )
)]
#[axum::debug_handler]
pub async fn set_theme(
    State(state): State<AppState>,
    Json(req): Json<ThemeBody>,
) -> Json<ThemeBody> {
    state.ctx.set_theme(req.theme);
    Json(ThemeBody {
        theme: state.ctx.theme(),
    })
}
