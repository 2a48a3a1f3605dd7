//! Glass category and type catalog, and the single-valued glass selection.

use shared::domain::{Category, CategoryId, GlassId, GlassType};
use tracing::{info, warn};

use crate::{
    controller::Effect,
    error::{ServiceError, ValidationError},
    service::GlassService,
    session::SessionState,
    tokens::RequestKind,
    wizard::WizardStep,
};

pub async fn load_categories(service: &dyn GlassService) -> Result<Vec<Category>, ServiceError> {
    service.list_categories().await
}

pub async fn load_types(
    service: &dyn GlassService,
    category_id: CategoryId,
) -> Result<Vec<GlassType>, ServiceError> {
    service.list_glass_types(category_id).await
}

pub(crate) fn begin(state: &mut SessionState) -> Effect {
    let token = state.tokens.issue(RequestKind::Categories);
    Effect::LoadCategories { token }
}

/// Changing the category throws away the loaded types and the glass selection.
pub(crate) fn select_category(
    state: &mut SessionState,
    category_id: Option<CategoryId>,
) -> Result<Vec<Effect>, ValidationError> {
    require_glass_step(state, "category selection")?;
    if let Some(id) = category_id {
        if !state.categories.is_empty() && !state.categories.iter().any(|c| c.id == id) {
            return Err(ValidationError::UnknownCategory(id));
        }
    }

    state.selected_category = category_id;
    state.glass_types.clear();
    state.glass_selection = None;
    state.tokens.supersede(RequestKind::GlassTypes);

    Ok(match category_id {
        Some(category_id) => {
            let token = state.tokens.issue(RequestKind::GlassTypes);
            vec![Effect::LoadGlassTypes { token, category_id }]
        }
        None => Vec::new(),
    })
}

pub(crate) fn select_glass(
    state: &mut SessionState,
    glass_id: GlassId,
) -> Result<(), ValidationError> {
    require_glass_step(state, "glass selection")?;
    if !state.glass_types.iter().any(|glass| glass.id == glass_id) {
        return Err(ValidationError::UnknownGlass(glass_id));
    }
    state.glass_selection = Some(glass_id);
    info!(session_id = %state.session_id, glass_id = %glass_id, "glass type selected");
    Ok(())
}

pub(crate) fn reset_selection(state: &mut SessionState) {
    state.glass_selection = None;
    state.selected_category = None;
    state.glass_types.clear();
    state.tokens.supersede(RequestKind::GlassTypes);
}

pub(crate) fn reconcile_categories(
    state: &mut SessionState,
    outcome: Result<Vec<Category>, ServiceError>,
) {
    match outcome {
        Ok(categories) => {
            info!(
                session_id = %state.session_id,
                count = categories.len(),
                "glass categories loaded"
            );
            let still_listed = state
                .selected_category
                .is_some_and(|id| categories.iter().any(|category| category.id == id));
            if state.selected_category.is_some() && !still_listed {
                warn!(session_id = %state.session_id, "selected category vanished from catalog");
                reset_selection(state);
            }
            state.categories = categories;
        }
        Err(err) => state.surface_service_error(&err),
    }
}

pub(crate) fn reconcile_glass_types(
    state: &mut SessionState,
    outcome: Result<Vec<GlassType>, ServiceError>,
) {
    match outcome {
        Ok(glass_types) => {
            info!(session_id = %state.session_id, count = glass_types.len(), "glass types loaded");
            state.glass_types = glass_types;
        }
        Err(err) => state.surface_service_error(&err),
    }
}

fn require_glass_step(state: &SessionState, action: &'static str) -> Result<(), ValidationError> {
    if state.step == WizardStep::GlassSelection {
        Ok(())
    } else {
        Err(ValidationError::NotAvailable {
            action,
            step: state.step,
        })
    }
}
