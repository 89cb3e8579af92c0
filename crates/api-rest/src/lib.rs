//! # API REST
//!
//! REST API implementation for Rx.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! The server acts for one signed-in user at a time, the way a single browser tab would. It
//! holds that user's compose session and screen state; signing out drops all of it.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod routes;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use rx_core::{AppContext, ComposeSession, EnterpriseDirectory, TemplateLibrary};
use rx_uuid::{IdGenerator, RandomIds};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use error::{ApiResult, ErrorRes};
use routes::{auth, compose, library};

/// Application state for the REST API server
///
/// Shared by every handler. Each piece of per-user state sits behind its own mutex, so requests
/// touching the same screen are applied one at a time.
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<AppContext>,
    ids: Arc<dyn IdGenerator>,
    session: Arc<Mutex<ComposeSession>>,
    enterprises: Arc<Mutex<EnterpriseDirectory>>,
    templates: Arc<Mutex<TemplateLibrary>>,
}

impl AppState {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self::with_ids(ctx, Arc::new(RandomIds))
    }

    /// Uses `ids` for new medication rows instead of random identifiers.
    pub fn with_ids(ctx: Arc<AppContext>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ctx,
            ids,
            session: Arc::new(Mutex::new(ComposeSession::new())),
            enterprises: Arc::new(Mutex::new(EnterpriseDirectory::new())),
            templates: Arc::new(Mutex::new(TemplateLibrary::new())),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// The signed-in user's uid, or `401 Unauthorized`.
    fn owner_id(&self) -> ApiResult<String> {
        Ok(self.ctx.require_user()?.uid)
    }

    async fn reset_user_state(&self) {
        *self.session.lock().await = ComposeSession::new();
        *self.enterprises.lock().await = EnterpriseDirectory::new();
        *self.templates.lock().await = TemplateLibrary::new();
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Identity of a newly created record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdRes {
    pub id: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        auth::auth_state,
        auth::sign_in,
        auth::sign_up,
        auth::sign_out,
        auth::get_theme,
        auth::set_theme,
        library::list_enterprises,
        library::create_enterprise,
        library::update_enterprise,
        library::archive_enterprise,
        library::list_templates,
        library::get_template,
        library::create_template,
        library::update_template,
        library::archive_template,
        compose::open,
        compose::view,
        compose::add_medication,
        compose::edit_medication,
        compose::remove_medication,
        compose::set_patient_field,
        compose::set_advice,
        compose::set_notes,
        compose::select_enterprise,
        compose::toggle_template,
        compose::save_as_template,
        compose::submit,
        compose::cancel,
    ),
    components(schemas(
        HealthRes,
        IdRes,
        ErrorRes,
        auth::CredentialsReq,
        auth::ThemeBody,
        library::EnterpriseForm,
        compose::EditMedicationReq,
        compose::PatientFieldReq,
        compose::TextReq,
        compose::SelectEnterpriseReq,
        compose::ToggleTemplateReq,
        compose::ToggleTemplateRes,
        compose::SaveTemplateReq,
        rx_core::AuthState,
        rx_core::User,
        rx_core::Theme,
        rx_core::EnterpriseDetails,
        rx_core::EnterpriseProfile,
        rx_core::EnterpriseRef,
        rx_core::EnterpriseDirectory,
        rx_core::Template,
        rx_core::TemplateEditor,
        rx_core::TemplateLibrary,
        rx_core::TemplateMedication,
        rx_core::Medication,
        rx_core::MedicationId,
        rx_core::MedicationField,
        rx_core::MealTime,
        rx_core::Frequency,
        rx_core::PrescribedMedication,
        rx_core::PatientDetails,
        rx_core::PatientField,
        rx_core::PrescriptionDraft,
        rx_core::Prescription,
        rx_core::MergeOutcome,
        rx_core::SessionState,
        rx_core::SessionView,
        rx_core::Submitted,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs at `/api-docs/openapi.json` and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/state", get(auth::auth_state))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/theme", get(auth::get_theme).put(auth::set_theme))
        .route(
            "/enterprises",
            get(library::list_enterprises).post(library::create_enterprise),
        )
        .route(
            "/enterprises/:id",
            put(library::update_enterprise).delete(library::archive_enterprise),
        )
        .route(
            "/templates",
            get(library::list_templates).post(library::create_template),
        )
        .route(
            "/templates/:id",
            get(library::get_template)
                .put(library::update_template)
                .delete(library::archive_template),
        )
        .route("/compose", get(compose::view))
        .route("/compose/open", post(compose::open))
        .route("/compose/medications", post(compose::add_medication))
        .route(
            "/compose/medications/:id",
            axum::routing::patch(compose::edit_medication).delete(compose::remove_medication),
        )
        .route("/compose/patient", put(compose::set_patient_field))
        .route("/compose/advice", put(compose::set_advice))
        .route("/compose/notes", put(compose::set_notes))
        .route("/compose/enterprise", put(compose::select_enterprise))
        .route("/compose/templates/:id", post(compose::toggle_template))
        .route("/compose/save-template", post(compose::save_as_template))
        .route("/compose/submit", post(compose::submit))
        .route("/compose/cancel", post(compose::cancel))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Binds `addr` and serves the REST API until the server fails.
///
/// # Errors
/// Returns an error if the address cannot be bound or the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Starting Rx REST API on {}", addr);
    axum::serve(listener, router(state)).await
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Rx REST API is alive".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rx_core::{CoreConfig, InMemoryGateway, InMemoryIdentity};
    use rx_uuid::SequentialIds;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<InMemoryGateway>) {
        let data = Arc::new(InMemoryGateway::new());
        let ctx = AppContext::new(
            data.clone(),
            Arc::new(InMemoryIdentity::default()),
            CoreConfig::default(),
        );
        let state = AppState::with_ids(Arc::new(ctx), Arc::new(SequentialIds::new("row")));
        (router(state), data)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn signed_in_app() -> (Router, Arc<InMemoryGateway>) {
        let (app, data) = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/auth/sign-up",
            Some(json!({"email": "dr@clinic.org", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (app, data)
    }

    fn clinic_form(name: &str) -> Value {
        json!({
            "hospitalName": name,
            "address": "12 High Street",
            "doctorName": "Dr. Rao",
            "licenseNumber": "LIC-42"
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = test_app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn protected_routes_require_sign_in() {
        let (app, _) = test_app();
        for (method, uri) in [
            ("GET", "/enterprises"),
            ("GET", "/templates"),
            ("POST", "/compose/open"),
        ] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["message"], "sign in required");
        }
    }

    #[tokio::test]
    async fn bad_credentials_surface_provider_message() {
        let (app, _) = signed_in_app().await;
        send(&app, "POST", "/auth/sign-out", None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/sign-in",
            Some(json!({"email": "dr@clinic.org", "password": "nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn compose_with_template_and_submit() {
        let (app, data) = signed_in_app().await;

        let (status, _) = send(&app, "POST", "/enterprises", Some(clinic_form("City Clinic"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, created) = send(
            &app,
            "POST",
            "/templates",
            Some(json!({
                "name": "Pain",
                "medications": [
                    {"id": "t-a", "name": "Ibuprofen", "regimen": "1-0-1"},
                    {"name": "No id"}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let template_id = created["id"].as_str().unwrap().to_owned();

        let (status, session) = send(&app, "POST", "/compose/open", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["draft"]["enterprise"]["hospitalName"], "City Clinic");

        let (_, row) = send(&app, "POST", "/compose/medications", None).await;
        assert_eq!(row["id"], "row-1");
        let (status, session) = send(
            &app,
            "PATCH",
            "/compose/medications/row-1",
            Some(json!({"field": "regimen", "value": "1a0b1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["draft"]["medications"][0]["regimen"], "1-0-1");
        send(
            &app,
            "PATCH",
            "/compose/medications/row-1",
            Some(json!({"field": "name", "value": "Aspirin"})),
        )
        .await;

        let (status, toggled) = send(
            &app,
            "POST",
            &format!("/compose/templates/{template_id}"),
            Some(json!({"checked": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["outcome"]["admitted"], 1);
        assert_eq!(toggled["session"]["draft"]["medications"].as_array().unwrap().len(), 2);

        let (status, submitted) = send(&app, "POST", "/compose/submit", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(submitted["prescription"]["clinicName"], "City Clinic");
        assert_eq!(submitted["prescription"]["medications"].as_array().unwrap().len(), 2);

        let (_, session) = send(&app, "GET", "/compose", None).await;
        assert_eq!(session["state"], "closed");
        assert_eq!(data.prescriptions().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_without_clinic_is_rejected() {
        let (app, _) = signed_in_app().await;
        send(&app, "POST", "/compose/open", None).await;

        let (status, body) = send(&app, "POST", "/compose/submit", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please select a clinic.");

        let (_, session) = send(&app, "GET", "/compose", None).await;
        assert_eq!(session["state"], "dirty");
        assert_eq!(session["clinicError"], "Please select a clinic.");
    }

    #[tokio::test]
    async fn archive_failure_restores_profile() {
        let (app, data) = signed_in_app().await;
        send(&app, "POST", "/enterprises", Some(clinic_form("A"))).await;
        let (_, dir) = send(&app, "GET", "/enterprises", None).await;
        let id = dir["profiles"][0]["id"].as_str().unwrap().to_owned();

        data.set_offline(true);
        let (status, _) = send(&app, "DELETE", &format!("/enterprises/{id}"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        data.set_offline(false);

        let (_, dir) = send(&app, "GET", "/enterprises", None).await;
        assert_eq!(dir["profiles"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", "/enterprises/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn updates_are_limited_to_own_records() {
        let (app, data) = signed_in_app().await;
        let (_, created) = send(&app, "POST", "/enterprises", Some(clinic_form("A"))).await;
        let id = created["id"].as_str().unwrap().to_owned();

        send(&app, "POST", "/auth/sign-out", None).await;
        let (status, _) = send(
            &app,
            "POST",
            "/auth/sign-up",
            Some(json!({"email": "other@clinic.org", "password": "secret2"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/enterprises/{id}"),
            Some(clinic_form("Hijacked")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(data.enterprise(&id).await.unwrap().hospital_name(), "A");
    }

    #[tokio::test]
    async fn sign_out_drops_session() {
        let (app, _) = signed_in_app().await;
        send(&app, "POST", "/compose/open", None).await;

        let (status, _) = send(&app, "POST", "/auth/sign-out", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        send(
            &app,
            "POST",
            "/auth/sign-in",
            Some(json!({"email": "dr@clinic.org", "password": "secret1"})),
        )
        .await;

        let (_, session) = send(&app, "GET", "/compose", None).await;
        assert_eq!(session["state"], "idle");
        assert!(session["draft"].is_null());
    }

    #[tokio::test]
    async fn theme_round_trips() {
        let (app, _) = test_app();
        let (_, body) = send(&app, "GET", "/theme", None).await;
        assert_eq!(body["theme"], "system");

        let (status, body) = send(&app, "PUT", "/theme", Some(json!({"theme": "dark"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");
    }

    #[test]
    fn openapi_lists_compose_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/compose/submit"));
        assert!(doc.paths.paths.contains_key("/templates/{id}"));
    }
}
