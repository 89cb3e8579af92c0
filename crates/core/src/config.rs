//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into the application context. Nothing in the core
//! reads process-wide environment variables while handling a request.

use crate::constants::DEFAULT_MIN_PASSWORD_LEN;
use crate::context::Theme;
use crate::{RxError, RxResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    default_theme: Theme,
    min_password_len: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::System,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl CoreConfig {
    pub fn new(default_theme: Theme, min_password_len: usize) -> RxResult<Self> {
        if min_password_len == 0 {
            return Err(RxError::InvalidInput(
                "min_password_len must be at least 1".into(),
            ));
        }

        Ok(Self {
            default_theme,
            min_password_len,
        })
    }

    pub fn default_theme(&self) -> Theme {
        self.default_theme
    }

    pub fn min_password_len(&self) -> usize {
        self.min_password_len
    }
}

/// Parse the default theme from an optional environment value.
///
/// Unset or blank values fall back to [`Theme::System`].
pub fn theme_from_env_value(value: Option<String>) -> RxResult<Theme> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<Theme>()).transpose()?;

    Ok(parsed.unwrap_or(Theme::System))
}

/// Parse the minimum sign-up password length from an optional environment value.
pub fn min_password_len_from_env_value(value: Option<String>) -> RxResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                RxError::InvalidInput(format!("RX_MIN_PASSWORD_LEN must be a number, got '{v}'"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MIN_PASSWORD_LEN))
}
