//! Price breakdown for the selected glass, plus the cosmetic count-up of the total.

use std::time::Duration;

use shared::{
    domain::{GlassId, PriceBreakdown, SessionId},
    protocol::GlassQuoteRequest,
};
use tracing::{info, warn};

use crate::{
    controller::Effect,
    error::{ServiceError, ValidationError},
    service::GlassService,
    session::SessionState,
    tokens::RequestKind,
};

pub const COUNT_UP_DURATION: Duration = Duration::from_millis(1000);

pub async fn calculate_price(
    service: &dyn GlassService,
    session_id: SessionId,
    glass_id: GlassId,
) -> Result<PriceBreakdown, ServiceError> {
    service
        .calculate_price(&GlassQuoteRequest {
            user_id: session_id,
            glass_id,
        })
        .await
}

pub(crate) fn begin(state: &mut SessionState) -> Result<Effect, ValidationError> {
    let glass_id = state
        .glass_selection
        .ok_or(ValidationError::NoGlassSelected)?;
    state.price = None;
    let token = state.tokens.issue(RequestKind::Pricing);
    Ok(Effect::CalculatePrice {
        token,
        request: GlassQuoteRequest {
            user_id: state.session_id,
            glass_id,
        },
    })
}

pub(crate) fn reset(state: &mut SessionState) {
    state.price = None;
    state.tokens.supersede(RequestKind::Pricing);
}

pub(crate) fn reconcile(state: &mut SessionState, outcome: Result<PriceBreakdown, ServiceError>) {
    match outcome {
        Ok(breakdown) => {
            if breakdown.area == 0.0 && breakdown.area_price > 0.0 {
                warn!(
                    session_id = %state.session_id,
                    area_price = breakdown.area_price,
                    "price breakdown has zero area with a positive area price"
                );
            }
            info!(
                session_id = %state.session_id,
                glass = %breakdown.glass_name,
                total_price = breakdown.total_price,
                "price calculated"
            );
            state.price = Some(breakdown);
        }
        Err(err) => state.surface_service_error(&err),
    }
}

/// Interpolates a displayed value from 0 to `target` with an ease-out curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountUp {
    target: f64,
    duration: Duration,
}

impl CountUp {
    pub fn new(target: f64) -> Self {
        Self::with_duration(target, COUNT_UP_DURATION)
    }

    pub fn with_duration(target: f64, duration: Duration) -> Self {
        Self { target, duration }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn value_at(&self, elapsed: Duration) -> f64 {
        let progress = self.progress(elapsed);
        self.target * ease_out(progress)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.progress(elapsed) >= 1.0
    }
}

pub fn ease_out(progress: f64) -> f64 {
    progress * (2.0 - progress)
}
