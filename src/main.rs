use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use rx_core::config::{min_password_len_from_env_value, theme_from_env_value};
use rx_core::{AppContext, CoreConfig, InMemoryGateway, InMemoryIdentity};

/// Main entry point for the Rx application
///
/// Resolves configuration once, wires the in-process gateways into the application context and
/// serves the REST API with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `RX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `RX_DEFAULT_THEME`: `dark`, `light` or `system` (default: "system")
/// - `RX_MIN_PASSWORD_LEN`: minimum sign-up password length (default: 6)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value cannot be parsed, or
/// - the server address cannot be bound or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rx=info".parse()?)
                .add_directive("rx_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("RX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        theme_from_env_value(std::env::var("RX_DEFAULT_THEME").ok())?,
        min_password_len_from_env_value(std::env::var("RX_MIN_PASSWORD_LEN").ok())?,
    )?;
    tracing::info!(theme = %cfg.default_theme(), min_password_len = cfg.min_password_len(), "configuration resolved");

    let identity = Arc::new(InMemoryIdentity::new(cfg.min_password_len()));
    let ctx = AppContext::new(Arc::new(InMemoryGateway::new()), identity, cfg);
    let auth = ctx.wait_until_ready().await;
    tracing::info!(signed_in = auth.user.is_some(), "identity provider ready");

    api_rest::serve(&rest_addr, AppState::new(Arc::new(ctx))).await?;

    Ok(())
}
