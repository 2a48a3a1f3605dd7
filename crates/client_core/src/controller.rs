//! Events, effects and the transition function of the workflow.
//!
//! `SessionState::apply` takes one event and returns the remote calls it needs.
//! Service responses come back as [`Completion`] events carrying the token they
//! were issued with.

use std::path::PathBuf;

use shared::{
    dimensions::{dimensions_text, parse_dimensions},
    domain::{
        Category, CategoryId, GlassId, GlassType, HistoryRecord, OptimizationResult,
        PriceBreakdown, SessionId, StockSheet,
    },
    protocol::{GlassQuoteRequest, OptimizeRequest},
};
use tracing::{debug, error, info};

use crate::{
    catalog,
    error::{ServiceError, ValidationError},
    history::{self, Confirmation},
    optimization, pdf, pricing,
    session::{Notice, SessionState},
    tokens::RequestToken,
    wizard::{self, WizardStep},
};

#[derive(Debug)]
pub enum WizardEvent {
    SelectStock(StockSheet),
    SetStockWidth(f64),
    SetStockHeight(f64),
    EditPieces(String),
    RemovePiece(usize),
    ClearPieces,
    Advance,
    Retreat,
    SelectCategory(Option<CategoryId>),
    SelectGlass(GlassId),
    NewCalculation,
    ExportPdf,
    OpenHistory,
    ClearHistory(Confirmation),
    DismissNotice,
    Completed(Completion),
}

#[derive(Debug)]
pub enum Completion {
    Optimized {
        token: RequestToken,
        outcome: Result<OptimizationResult, ServiceError>,
    },
    CategoriesLoaded {
        token: RequestToken,
        outcome: Result<Vec<Category>, ServiceError>,
    },
    GlassTypesLoaded {
        token: RequestToken,
        outcome: Result<Vec<GlassType>, ServiceError>,
    },
    PriceCalculated {
        token: RequestToken,
        outcome: Result<PriceBreakdown, ServiceError>,
    },
    PdfGenerated {
        token: RequestToken,
        outcome: Result<Vec<u8>, ServiceError>,
    },
    HistoryLoaded {
        token: RequestToken,
        outcome: Result<Vec<HistoryRecord>, ServiceError>,
    },
    HistoryCleared {
        token: RequestToken,
        outcome: Result<(), ServiceError>,
    },
    DocumentSaved {
        filename: &'static str,
        outcome: Result<PathBuf, String>,
    },
}

impl Completion {
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Completion::Optimized { token, .. }
            | Completion::CategoriesLoaded { token, .. }
            | Completion::GlassTypesLoaded { token, .. }
            | Completion::PriceCalculated { token, .. }
            | Completion::PdfGenerated { token, .. }
            | Completion::HistoryLoaded { token, .. }
            | Completion::HistoryCleared { token, .. } => Some(*token),
            Completion::DocumentSaved { .. } => None,
        }
    }
}

/// Work the driver must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Optimize {
        token: RequestToken,
        request: OptimizeRequest,
    },
    LoadCategories {
        token: RequestToken,
    },
    LoadGlassTypes {
        token: RequestToken,
        category_id: CategoryId,
    },
    CalculatePrice {
        token: RequestToken,
        request: GlassQuoteRequest,
    },
    GeneratePdf {
        token: RequestToken,
        request: GlassQuoteRequest,
    },
    LoadHistory {
        token: RequestToken,
        session_id: SessionId,
    },
    ClearHistory {
        token: RequestToken,
        session_id: SessionId,
    },
    SaveDocument {
        filename: &'static str,
        bytes: Vec<u8>,
    },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Optimize { .. } => "optimize",
            Effect::LoadCategories { .. } => "load_categories",
            Effect::LoadGlassTypes { .. } => "load_glass_types",
            Effect::CalculatePrice { .. } => "calculate_price",
            Effect::GeneratePdf { .. } => "generate_pdf",
            Effect::LoadHistory { .. } => "load_history",
            Effect::ClearHistory { .. } => "clear_history",
            Effect::SaveDocument { .. } => "save_document",
        }
    }
}

impl SessionState {
    /// Applies one event. A `ValidationError` means the event was rejected and the
    /// state is exactly as before.
    pub fn apply(&mut self, event: WizardEvent) -> Result<Vec<Effect>, ValidationError> {
        match event {
            WizardEvent::SelectStock(stock) => {
                self.require_step(WizardStep::StockSelection, "stock selection")?;
                self.set_stock(stock);
                Ok(Vec::new())
            }
            WizardEvent::SetStockWidth(width) => {
                self.require_step(WizardStep::StockSelection, "stock selection")?;
                self.set_stock(StockSheet::new(width, self.stock.height));
                Ok(Vec::new())
            }
            WizardEvent::SetStockHeight(height) => {
                self.require_step(WizardStep::StockSelection, "stock selection")?;
                self.set_stock(StockSheet::new(self.stock.width, height));
                Ok(Vec::new())
            }
            WizardEvent::EditPieces(text) => {
                self.require_step(WizardStep::PieceEntry, "piece entry")?;
                self.pieces = parse_dimensions(&text);
                self.piece_text = text;
                optimization::invalidate(self);
                Ok(Vec::new())
            }
            WizardEvent::RemovePiece(index) => {
                self.require_step(WizardStep::PieceEntry, "piece removal")?;
                if index >= self.pieces.len() {
                    return Err(ValidationError::UnknownPiece(index));
                }
                self.pieces.remove(index);
                self.piece_text = dimensions_text(&self.pieces);
                optimization::invalidate(self);
                Ok(Vec::new())
            }
            WizardEvent::ClearPieces => {
                self.require_step(WizardStep::PieceEntry, "piece removal")?;
                self.pieces.clear();
                self.piece_text.clear();
                optimization::invalidate(self);
                Ok(Vec::new())
            }
            WizardEvent::Advance => wizard::advance(self),
            WizardEvent::Retreat => wizard::retreat(self),
            WizardEvent::SelectCategory(category_id) => catalog::select_category(self, category_id),
            WizardEvent::SelectGlass(glass_id) => {
                catalog::select_glass(self, glass_id)?;
                Ok(Vec::new())
            }
            WizardEvent::NewCalculation => wizard::new_calculation(self),
            WizardEvent::ExportPdf => Ok(vec![pdf::begin(self)?]),
            WizardEvent::OpenHistory => Ok(vec![history::open(self)]),
            WizardEvent::ClearHistory(confirmation) => Ok(history::clear(self, confirmation)),
            WizardEvent::DismissNotice => {
                self.notice = None;
                Ok(Vec::new())
            }
            WizardEvent::Completed(completion) => Ok(self.reconcile(completion)),
        }
    }

    fn require_step(&self, step: WizardStep, action: &'static str) -> Result<(), ValidationError> {
        if self.step == step {
            Ok(())
        } else {
            Err(ValidationError::NotAvailable {
                action,
                step: self.step,
            })
        }
    }

    fn set_stock(&mut self, stock: StockSheet) {
        if self.stock != stock {
            self.stock = stock;
            optimization::invalidate(self);
        }
    }

    fn reconcile(&mut self, completion: Completion) -> Vec<Effect> {
        if let Some(token) = completion.token() {
            if !self.tokens.complete(token) {
                debug!(session_id = %self.session_id, %token, "discarding superseded response");
                return Vec::new();
            }
        }

        match completion {
            Completion::Optimized { outcome, .. } => {
                optimization::reconcile(self, outcome);
                Vec::new()
            }
            Completion::CategoriesLoaded { outcome, .. } => {
                catalog::reconcile_categories(self, outcome);
                Vec::new()
            }
            Completion::GlassTypesLoaded { outcome, .. } => {
                catalog::reconcile_glass_types(self, outcome);
                Vec::new()
            }
            Completion::PriceCalculated { outcome, .. } => {
                pricing::reconcile(self, outcome);
                Vec::new()
            }
            Completion::PdfGenerated { outcome, .. } => pdf::reconcile(self, outcome),
            Completion::HistoryLoaded { outcome, .. } => {
                history::reconcile_loaded(self, outcome);
                Vec::new()
            }
            Completion::HistoryCleared { outcome, .. } => {
                history::reconcile_cleared(self, outcome);
                Vec::new()
            }
            Completion::DocumentSaved { filename, outcome } => {
                match outcome {
                    Ok(path) => {
                        info!(
                            session_id = %self.session_id,
                            path = %path.display(),
                            "document saved"
                        );
                        self.notice = Some(Notice::info(format!(
                            "Saved {filename} to {}",
                            path.display()
                        )));
                    }
                    Err(message) => {
                        error!(
                            session_id = %self.session_id,
                            %filename,
                            %message,
                            "failed to save document"
                        );
                        self.notice = Some(Notice::error(message));
                    }
                }
                Vec::new()
            }
        }
    }

    /// Records a failed remote call as the current notice.
    pub(crate) fn surface_service_error(&mut self, err: &ServiceError) {
        error!(
            session_id = %self.session_id,
            request = %err.kind(),
            error = %err,
            "service call failed"
        );
        self.notice = Some(Notice::error(err.user_message()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
