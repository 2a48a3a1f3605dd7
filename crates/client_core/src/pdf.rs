//! PDF export of the current quote.

use std::path::{Path, PathBuf};

use shared::{
    domain::{GlassId, SessionId},
    protocol::GlassQuoteRequest,
};
use tracing::info;

use crate::{
    controller::Effect,
    error::{ServiceError, ValidationError},
    service::GlassService,
    session::SessionState,
    tokens::RequestKind,
    wizard::WizardStep,
};

pub const PDF_FILENAME: &str = "glass_calculation.pdf";

pub async fn export_pdf(
    service: &dyn GlassService,
    session_id: SessionId,
    glass_id: GlassId,
) -> Result<Vec<u8>, ServiceError> {
    service
        .generate_pdf(&GlassQuoteRequest {
            user_id: session_id,
            glass_id,
        })
        .await
}

/// Writes a downloaded document into `dir` and returns its full path.
pub async fn save_document(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub(crate) fn begin(state: &mut SessionState) -> Result<Effect, ValidationError> {
    if state.step != WizardStep::PriceReview {
        return Err(ValidationError::NotAvailable {
            action: "PDF export",
            step: state.step,
        });
    }
    let glass_id = state
        .glass_selection
        .ok_or(ValidationError::NoGlassSelected)?;
    let token = state.tokens.issue(RequestKind::PdfExport);
    Ok(Effect::GeneratePdf {
        token,
        request: GlassQuoteRequest {
            user_id: state.session_id,
            glass_id,
        },
    })
}

pub(crate) fn reconcile(
    state: &mut SessionState,
    outcome: Result<Vec<u8>, ServiceError>,
) -> Vec<Effect> {
    match outcome {
        Ok(bytes) => {
            info!(session_id = %state.session_id, size_bytes = bytes.len(), "pdf generated");
            vec![Effect::SaveDocument {
                filename: PDF_FILENAME,
                bytes,
            }]
        }
        Err(err) => {
            state.surface_service_error(&err);
            Vec::new()
        }
    }
}
