use shared::domain::{CategoryId, GlassId};
use thiserror::Error;

use crate::{tokens::RequestKind, wizard::WizardStep};

/// Local precondition failure. Never sent to the service; the rejected event leaves
/// the session untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please select or enter valid stock sheet dimensions.")]
    InvalidStockSheet,
    #[error("Please enter at least one glass dimension.")]
    NoPieces,
    #[error("Please wait for the calculation to finish.")]
    OptimizationPending,
    #[error("Run the optimization before continuing.")]
    MissingOptimization,
    #[error("Please select a glass type.")]
    NoGlassSelected,
    #[error("glass category {0} is not in the loaded catalog")]
    UnknownCategory(CategoryId),
    #[error("glass type {0} is not in the loaded list")]
    UnknownGlass(GlassId),
    #[error("piece #{0} does not exist")]
    UnknownPiece(usize),
    #[error("{0} is the last step")]
    NoNextStep(WizardStep),
    #[error("{0} is the first step")]
    NoPreviousStep(WizardStep),
    #[error("{action} is not available on step {step}")]
    NotAvailable {
        action: &'static str,
        step: WizardStep,
    },
}

/// A remote call failed or the service reported a failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{kind} failed with HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        kind: RequestKind,
        status: u16,
        message: Option<String>,
    },
    #[error("{kind} rejected by service: {}", .message.as_deref().unwrap_or("no error message"))]
    Rejected {
        kind: RequestKind,
        message: Option<String>,
    },
    #[error("{kind} transport failure: {source}")]
    Transport {
        kind: RequestKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("{kind} returned an undecodable body: {source}")]
    Decode {
        kind: RequestKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} endpoint url is invalid: {source}")]
    InvalidUrl {
        kind: RequestKind,
        #[source]
        source: url::ParseError,
    },
    #[error("{kind} request aborted before completion")]
    Aborted { kind: RequestKind },
}

impl ServiceError {
    pub fn kind(&self) -> RequestKind {
        match self {
            ServiceError::Api { kind, .. }
            | ServiceError::Rejected { kind, .. }
            | ServiceError::Transport { kind, .. }
            | ServiceError::Decode { kind, .. }
            | ServiceError::InvalidUrl { kind, .. }
            | ServiceError::Aborted { kind } => *kind,
        }
    }

    /// The service's own error text when it sent one, else a generic message for the
    /// request class.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api {
                message: Some(message),
                ..
            }
            | ServiceError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.kind().fallback_message().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: ServiceError,
    },
}

impl From<ServiceError> for OptimizationError {
    fn from(source: ServiceError) -> Self {
        Self::Service {
            message: source.user_message(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_service_text() {
        let err = ServiceError::Api {
            kind: RequestKind::Optimize,
            status: 400,
            message: Some("no fit".into()),
        };
        assert_eq!(err.user_message(), "no fit");
        assert_eq!(OptimizationError::from(err).to_string(), "no fit");
    }

    #[test]
    fn user_message_falls_back_per_request_class() {
        let err = ServiceError::Api {
            kind: RequestKind::Pricing,
            status: 500,
            message: None,
        };
        assert_eq!(
            err.user_message(),
            "An error occurred while calculating the price."
        );

        let err = ServiceError::Aborted {
            kind: RequestKind::History,
        };
        assert_eq!(err.user_message(), "Failed to load history.");
    }
}
