//! Per-session calculation history: listing, and clearing behind a confirmation.

use shared::domain::{HistoryRecord, SessionId};
use tracing::info;

use crate::{
    controller::Effect,
    error::ServiceError,
    service::GlassService,
    session::{HistoryState, Notice, SessionState},
    tokens::RequestKind,
};

pub const CLEAR_HISTORY_PROMPT: &str =
    "Do you really want to delete the whole calculation history?";
pub const HISTORY_CLEARED_MESSAGE: &str = "History was cleared.";

/// Answer to [`CLEAR_HISTORY_PROMPT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Cancelled,
}

pub async fn load_history(
    service: &dyn GlassService,
    session_id: SessionId,
) -> Result<Vec<HistoryRecord>, ServiceError> {
    service.load_history(session_id).await
}

/// Issues the destructive call only after an explicit confirmation.
pub async fn clear_history(
    service: &dyn GlassService,
    session_id: SessionId,
    confirmation: Confirmation,
) -> Result<ClearOutcome, ServiceError> {
    if confirmation == Confirmation::Declined {
        return Ok(ClearOutcome::Cancelled);
    }
    service.clear_history(session_id).await?;
    Ok(ClearOutcome::Cleared)
}

pub(crate) fn open(state: &mut SessionState) -> Effect {
    let token = state.tokens.issue(RequestKind::History);
    Effect::LoadHistory {
        token,
        session_id: state.session_id,
    }
}

pub(crate) fn clear(state: &mut SessionState, confirmation: Confirmation) -> Vec<Effect> {
    if confirmation == Confirmation::Declined {
        return Vec::new();
    }
    let token = state.tokens.issue(RequestKind::ClearHistory);
    vec![Effect::ClearHistory {
        token,
        session_id: state.session_id,
    }]
}

pub(crate) fn reconcile_loaded(
    state: &mut SessionState,
    outcome: Result<Vec<HistoryRecord>, ServiceError>,
) {
    match outcome {
        Ok(records) => {
            info!(session_id = %state.session_id, count = records.len(), "history loaded");
            state.history = HistoryState::Loaded(records);
        }
        Err(err) => state.surface_service_error(&err),
    }
}

pub(crate) fn reconcile_cleared(state: &mut SessionState, outcome: Result<(), ServiceError>) {
    match outcome {
        Ok(()) => {
            info!(session_id = %state.session_id, "history cleared");
            // A listing still in flight predates the clear.
            state.tokens.supersede(RequestKind::History);
            state.history = HistoryState::Loaded(Vec::new());
            state.notice = Some(Notice::info(HISTORY_CLEARED_MESSAGE));
        }
        Err(err) => state.surface_service_error(&err),
    }
}
