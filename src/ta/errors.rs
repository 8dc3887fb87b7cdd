use thiserror::Error;

use crate::apdu::StatusCode;

/// Failure modes of the terminal-authentication command handlers.
///
/// Every variant maps to exactly one ISO 7816-4 status word; the carried
/// message is the human-readable reason handed to the logging sink and has
/// no protocol meaning.
#[derive(Error, Debug)]
pub enum TaError {
    #[error("terminal authentication must be executed in secure messaging")]
    NotSecureMessaged,

    #[error("unexpected APDU routed to terminal authentication, check the dispatcher")]
    WrongApduType,

    #[error("{0}")]
    MissingReference(String),

    #[error("{0}")]
    MalformedData(String),

    #[error("{0}")]
    NotUsable(String),

    #[error("the terminal signature could not be verified")]
    AuthenticationFailed,

    #[error("{0}")]
    ConditionsNotSatisfied(String),

    #[error("{0}")]
    SecurityStatusNotSatisfied(String),

    #[error("{0}")]
    ImplementationError(String),
}

impl TaError {
    /// The status word carried by the response APDU for this failure
    pub fn status_word(&self) -> StatusCode {
        match self {
            TaError::NotSecureMessaged => StatusCode::SECURITY_STATUS_NOT_SATISFIED,
            TaError::WrongApduType => StatusCode::IMPLEMENTATION_ERROR,
            TaError::MissingReference(_) => StatusCode::REFERENCE_DATA_NOT_FOUND,
            TaError::MalformedData(_) => StatusCode::WRONG_DATA,
            TaError::NotUsable(_) => StatusCode::REFERENCE_DATA_NOT_USABLE,
            TaError::AuthenticationFailed => StatusCode::AUTHENTICATION_FAILED,
            TaError::ConditionsNotSatisfied(_) => StatusCode::CONDITIONS_OF_USE_NOT_SATISFIED,
            TaError::SecurityStatusNotSatisfied(_) => StatusCode::SECURITY_STATUS_NOT_SATISFIED,
            TaError::ImplementationError(_) => StatusCode::IMPLEMENTATION_ERROR,
        }
    }
}
