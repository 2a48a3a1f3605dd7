//! Linear five step wizard: step ordering, preconditions and the step transitions.

use std::fmt;

use tracing::info;

use crate::{
    catalog,
    controller::Effect,
    error::ValidationError,
    optimization, pricing,
    session::SessionState,
    tokens::RequestKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    StockSelection,
    PieceEntry,
    Optimization,
    GlassSelection,
    PriceReview,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::StockSelection,
        WizardStep::PieceEntry,
        WizardStep::Optimization,
        WizardStep::GlassSelection,
        WizardStep::PriceReview,
    ];

    /// One-based position shown in the step indicator.
    pub fn ordinal(self) -> usize {
        match self {
            WizardStep::StockSelection => 1,
            WizardStep::PieceEntry => 2,
            WizardStep::Optimization => 3,
            WizardStep::GlassSelection => 4,
            WizardStep::PriceReview => 5,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.ordinal()).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.ordinal()
            .checked_sub(2)
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::StockSelection => "Stock sheet",
            WizardStep::PieceEntry => "Glass dimensions",
            WizardStep::Optimization => "Optimization",
            WizardStep::GlassSelection => "Glass type",
            WizardStep::PriceReview => "Price",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.ordinal(), self.title())
    }
}

/// Checks that `state.step` holds everything needed to move past it.
pub fn check_precondition(state: &SessionState) -> Result<(), ValidationError> {
    match state.step {
        WizardStep::StockSelection if !state.stock.is_valid() => {
            Err(ValidationError::InvalidStockSheet)
        }
        WizardStep::PieceEntry if state.pieces.is_empty() => Err(ValidationError::NoPieces),
        WizardStep::Optimization if state.optimization.is_none() => {
            if state.tokens.is_loading(RequestKind::Optimize) {
                Err(ValidationError::OptimizationPending)
            } else {
                Err(ValidationError::MissingOptimization)
            }
        }
        WizardStep::GlassSelection if state.glass_selection.is_none() => {
            Err(ValidationError::NoGlassSelected)
        }
        WizardStep::PriceReview => Err(ValidationError::NoNextStep(state.step)),
        _ => Ok(()),
    }
}

pub fn can_advance(state: &SessionState) -> bool {
    check_precondition(state).is_ok()
}

/// Moves to the next step and returns that step's entry effects. On failure
/// nothing in `state` changes.
pub(crate) fn advance(state: &mut SessionState) -> Result<Vec<Effect>, ValidationError> {
    check_precondition(state)?;
    let target = state
        .step
        .next()
        .ok_or(ValidationError::NoNextStep(state.step))?;

    let effects = match target {
        WizardStep::Optimization => vec![optimization::begin(state)?],
        WizardStep::GlassSelection => vec![catalog::begin(state)],
        WizardStep::PriceReview => vec![pricing::begin(state)?],
        WizardStep::StockSelection | WizardStep::PieceEntry => Vec::new(),
    };

    info!(session_id = %state.session_id, from = %state.step, to = %target, "wizard advanced");
    state.step = target;
    state.notice = None;
    Ok(effects)
}

/// Steps back without discarding anything already entered.
pub(crate) fn retreat(state: &mut SessionState) -> Result<Vec<Effect>, ValidationError> {
    let target = state
        .step
        .previous()
        .ok_or(ValidationError::NoPreviousStep(state.step))?;
    info!(session_id = %state.session_id, from = %state.step, to = %target, "wizard retreated");
    state.step = target;
    Ok(Vec::new())
}

/// Returns to the first step, dropping the result, the glass choice and the price
/// while keeping the session id, stock sheet and pieces.
pub(crate) fn new_calculation(state: &mut SessionState) -> Result<Vec<Effect>, ValidationError> {
    if state.step != WizardStep::PriceReview {
        return Err(ValidationError::NotAvailable {
            action: "new calculation",
            step: state.step,
        });
    }

    optimization::invalidate(state);
    catalog::reset_selection(state);
    pricing::reset(state);
    state.step = WizardStep::StockSelection;
    state.notice = None;
    info!(session_id = %state.session_id, "new calculation started");
    Ok(Vec::new())
}
