//! Cutting layout optimization: request building, the remote call and folding its
//! outcome back into the session.

use shared::{
    dimensions::serialize_dimensions,
    domain::{OptimizationResult, PieceDimension, SessionId, StockSheet},
    protocol::OptimizeRequest,
};
use tracing::info;

use crate::{
    controller::Effect,
    error::{OptimizationError, ServiceError, ValidationError},
    service::GlassService,
    session::SessionState,
    tokens::RequestKind,
    wizard::WizardStep,
};

pub fn build_request(
    session_id: SessionId,
    pieces: &[PieceDimension],
    stock: StockSheet,
) -> Result<OptimizeRequest, ValidationError> {
    if pieces.is_empty() {
        return Err(ValidationError::NoPieces);
    }
    if !stock.is_valid() {
        return Err(ValidationError::InvalidStockSheet);
    }
    Ok(OptimizeRequest {
        user_id: session_id,
        dimensions: serialize_dimensions(pieces),
        stock_width: stock.width,
        stock_height: stock.height,
    })
}

/// Runs one optimization. Totals in the result are passed through as computed by
/// the service.
pub async fn request_optimization(
    service: &dyn GlassService,
    session_id: SessionId,
    pieces: &[PieceDimension],
    stock: StockSheet,
) -> Result<OptimizationResult, OptimizationError> {
    let request = build_request(session_id, pieces, stock)?;
    Ok(service.optimize(&request).await?)
}

/// Drops the current result and issues a fresh token. Validation happens first so a
/// rejected call leaves the state alone.
pub(crate) fn begin(state: &mut SessionState) -> Result<Effect, ValidationError> {
    let request = build_request(state.session_id, &state.pieces, state.stock)?;
    state.optimization = None;
    let token = state.tokens.issue(RequestKind::Optimize);
    info!(
        session_id = %state.session_id,
        %token,
        pieces = state.pieces.len(),
        "optimization requested"
    );
    Ok(Effect::Optimize { token, request })
}

/// Pieces or stock changed: the current result and anything in flight no longer
/// describe the input.
pub(crate) fn invalidate(state: &mut SessionState) {
    state.optimization = None;
    if state.tokens.is_loading(RequestKind::Optimize) {
        info!(session_id = %state.session_id, "in-flight optimization superseded by input change");
    }
    state.tokens.supersede(RequestKind::Optimize);
}

pub(crate) fn reconcile(
    state: &mut SessionState,
    outcome: Result<OptimizationResult, ServiceError>,
) {
    match outcome {
        Ok(result) => {
            info!(
                session_id = %state.session_id,
                sheets = result.layouts.len(),
                total_area = result.total_area,
                average_waste = result.average_waste,
                "optimization finished"
            );
            state.optimization = Some(result);
        }
        Err(err) => {
            state.optimization = None;
            state.surface_service_error(&err);
            if state.step >= WizardStep::Optimization {
                state.step = WizardStep::PieceEntry;
            }
        }
    }
}
