//! Process-wide application context.
//!
//! Built once at startup and handed to every handler. Owns the gateways, the latest auth snapshot
//! and the display theme.

use crate::config::CoreConfig;
use crate::error::{RxError, RxResult};
use crate::gateway::{AuthState, DataGateway, IdentityGateway, User};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    /// Follow the operating system preference.
    #[default]
    System,
}

impl Theme {
    /// The theme actually shown, given whether the system prefers a dark scheme.
    pub fn effective(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "system" => Ok(Theme::System),
            other => Err(RxError::InvalidInput(format!(
                "theme must be dark, light or system, got '{other}'"
            ))),
        }
    }
}

pub struct AppContext {
    data: Arc<dyn DataGateway>,
    identity: Arc<dyn IdentityGateway>,
    auth: watch::Receiver<AuthState>,
    theme: watch::Sender<Theme>,
    config: CoreConfig,
}

impl AppContext {
    pub fn new(
        data: Arc<dyn DataGateway>,
        identity: Arc<dyn IdentityGateway>,
        config: CoreConfig,
    ) -> Self {
        let auth = identity.subscribe();
        let (theme, _) = watch::channel(config.default_theme());
        Self {
            data,
            identity,
            auth,
            theme,
            config,
        }
    }

    pub fn data(&self) -> &dyn DataGateway {
        self.data.as_ref()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.send_replace(theme);
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.borrow().user.clone()
    }

    /// The signed-in user, or [`RxError::Unauthenticated`].
    pub fn require_user(&self) -> RxResult<User> {
        self.current_user().ok_or(RxError::Unauthenticated)
    }

    /// Waits until the identity provider has resolved whether a session exists.
    pub async fn wait_until_ready(&self) -> AuthState {
        let mut rx = self.auth.clone();
        let ready = rx.wait_for(|state| !state.checking).await.map(|s| (*s).clone());
        match ready {
            Ok(state) => state,
            // Provider gone: the last snapshot is all there will ever be.
            Err(_) => rx.borrow().clone(),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> RxResult<User> {
        Ok(self.identity.sign_in(email, password).await?)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> RxResult<User> {
        Ok(self.identity.sign_up(email, password).await?)
    }

    /// Ends the identity session. Callers holding per-user state discard it afterwards.
    pub async fn sign_out(&self) -> RxResult<()> {
        Ok(self.identity.sign_out().await?)
    }
}
