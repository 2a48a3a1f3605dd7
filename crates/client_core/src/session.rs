//! Session-scoped workflow state.
//!
//! One `SessionState` value holds everything the wizard accumulates. It is only
//! mutated through [`SessionState::apply`](crate::controller), which keeps the
//! transition rules in one place.

use shared::domain::{
    Category, CategoryId, GlassId, GlassType, HistoryRecord, OptimizationResult,
    PieceDimension, PriceBreakdown, SessionId, StockSheet,
};

use crate::{
    tokens::{RequestKind, RequestTokens},
    wizard::WizardStep,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Last user-facing message produced by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryState {
    #[default]
    NotLoaded,
    Loaded(Vec<HistoryRecord>),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) session_id: SessionId,
    pub(crate) step: WizardStep,
    pub(crate) stock: StockSheet,
    pub(crate) piece_text: String,
    pub(crate) pieces: Vec<PieceDimension>,
    pub(crate) optimization: Option<OptimizationResult>,
    pub(crate) categories: Vec<Category>,
    pub(crate) selected_category: Option<CategoryId>,
    pub(crate) glass_types: Vec<GlassType>,
    pub(crate) glass_selection: Option<GlassId>,
    pub(crate) price: Option<PriceBreakdown>,
    pub(crate) history: HistoryState,
    pub(crate) notice: Option<Notice>,
    pub(crate) tokens: RequestTokens,
}

impl SessionState {
    pub fn new(session_id: SessionId) -> Self {
        Self::with_stock(session_id, StockSheet::default())
    }

    pub fn with_stock(session_id: SessionId, stock: StockSheet) -> Self {
        Self {
            session_id,
            step: WizardStep::default(),
            stock,
            piece_text: String::new(),
            pieces: Vec::new(),
            optimization: None,
            categories: Vec::new(),
            selected_category: None,
            glass_types: Vec::new(),
            glass_selection: None,
            price: None,
            history: HistoryState::default(),
            notice: None,
            tokens: RequestTokens::default(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn stock(&self) -> StockSheet {
        self.stock
    }

    pub fn piece_text(&self) -> &str {
        &self.piece_text
    }

    pub fn pieces(&self) -> &[PieceDimension] {
        &self.pieces
    }

    pub fn optimization(&self) -> Option<&OptimizationResult> {
        self.optimization.as_ref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.selected_category
    }

    pub fn glass_types(&self) -> &[GlassType] {
        &self.glass_types
    }

    pub fn glass_selection(&self) -> Option<GlassId> {
        self.glass_selection
    }

    pub fn selected_glass(&self) -> Option<&GlassType> {
        let id = self.glass_selection?;
        self.glass_types.iter().find(|glass| glass.id == id)
    }

    pub fn price(&self) -> Option<&PriceBreakdown> {
        self.price.as_ref()
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self, kind: RequestKind) -> bool {
        self.tokens.is_loading(kind)
    }

    pub fn has_pending_requests(&self) -> bool {
        self.tokens.any_loading()
    }
}
