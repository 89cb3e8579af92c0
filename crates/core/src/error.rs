use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum RxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("Please select a clinic.")]
    MissingClinic,
    #[error("Regimen for '{medication}' must cover morning, afternoon and night (e.g. 1-0-1).")]
    IncompleteRegimen { medication: String },
    #[error("Cannot save an empty medication list as a template.")]
    EmptyList,
    #[error("Template name cannot be empty.")]
    EmptyTemplateName,
    #[error("Could not find selected template.")]
    TemplateNotFound(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("no prescription is being composed")]
    SessionClosed,
    #[error("sign in required")]
    Unauthenticated,

    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("invalid text: {0}")]
    Text(#[from] rx_types::TextError),
}

impl RxError {
    /// True for errors caused by the caller's input or the current screen state, as opposed to
    /// a failing gateway.
    pub fn is_validation(&self) -> bool {
        !matches!(self, RxError::Gateway(_))
    }
}

pub type RxResult<T> = std::result::Result<T, RxError>;
