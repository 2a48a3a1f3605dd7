//! Projection of the session into display-ready values.
//!
//! Nothing here mutates state; front-ends render these structs however they like.

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use shared::{
    domain::{GlassId, GlassType, HistoryRecord, Layout, PriceBreakdown},
    format::{format_area, format_dimensions, format_percentage, format_price},
};

use crate::{
    pricing::CountUp,
    session::{HistoryState, SessionState},
    tokens::RequestKind,
    wizard::{self, WizardStep},
};

static THICKNESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9]+)?\s*mm").expect("thickness pattern"));

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIndicator {
    pub step: WizardStep,
    pub status: StepStatus,
}

pub fn step_indicators(state: &SessionState) -> Vec<StepIndicator> {
    let active = state.step();
    WizardStep::ALL
        .iter()
        .map(|&step| StepIndicator {
            step,
            status: if step == active {
                StepStatus::Active
            } else if step < active {
                StepStatus::Completed
            } else {
                StepStatus::Pending
            },
        })
        .collect()
}

pub fn continue_enabled(state: &SessionState) -> bool {
    wizard::can_advance(state)
}

pub fn piece_rows(state: &SessionState) -> Vec<String> {
    state
        .pieces()
        .iter()
        .map(|piece| format_dimensions(piece.width, piece.height))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCard {
    pub title: String,
    pub area: String,
    pub waste_area: String,
    pub utilization: String,
    pub image_base64: String,
}

impl LayoutCard {
    fn new(index: usize, layout: &Layout) -> Self {
        Self {
            title: format!("Sheet #{}", index + 1),
            area: format_area(layout.area),
            waste_area: format_area(layout.waste_area),
            utilization: format_percentage(layout.utilization_percentage()),
            image_base64: layout.image.clone(),
        }
    }

    pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
        decode_layout_image(&self.image_base64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSummary {
    pub sheets_count: usize,
    pub total_area: String,
    pub average_waste: String,
    pub layouts: Vec<LayoutCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationView {
    pub loading: bool,
    pub summary: Option<OptimizationSummary>,
}

pub fn optimization_view(state: &SessionState) -> OptimizationView {
    let summary = state.optimization().map(|result| OptimizationSummary {
        sheets_count: result.layouts.len(),
        total_area: format_area(result.total_area),
        average_waste: format_percentage(result.average_waste),
        layouts: result
            .layouts
            .iter()
            .enumerate()
            .map(|(index, layout)| LayoutCard::new(index, layout))
            .collect(),
    });
    OptimizationView {
        loading: state.is_loading(RequestKind::Optimize),
        summary,
    }
}

/// Decodes a layout preview. A leading `data:<mime>;base64,` prefix is tolerated.
pub fn decode_layout_image(image: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match image.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => image,
    };
    STANDARD.decode(payload.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlassTypeCard {
    pub id: GlassId,
    pub name: String,
    pub price: String,
    pub thickness: String,
    pub selected: bool,
}

pub fn glass_type_cards(state: &SessionState) -> Vec<GlassTypeCard> {
    glass_type_cards_for(state.glass_types(), state.glass_selection())
}

pub fn glass_type_cards_for(
    glass_types: &[GlassType],
    selection: Option<GlassId>,
) -> Vec<GlassTypeCard> {
    glass_types
        .iter()
        .map(|glass| glass_type_card(glass, selection == Some(glass.id)))
        .collect()
}

fn glass_type_card(glass: &GlassType, selected: bool) -> GlassTypeCard {
    GlassTypeCard {
        id: glass.id,
        name: glass.name.clone(),
        price: format!("{} / m²", format_price(glass.price)),
        thickness: thickness_label(&glass.name),
        selected,
    }
}

/// Thickness such as `4 mm` or `6mm` found in a glass name, else `N/A`.
pub fn thickness_label(name: &str) -> String {
    THICKNESS_RE
        .find(name)
        .map(|found| found.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceView {
    pub glass_name: String,
    pub unit_price: String,
    pub area: String,
    pub area_price: String,
    pub waste_area: String,
    pub waste_price: String,
    pub total_price: String,
    pub total_count_up: CountUp,
}

pub fn price_view(state: &SessionState) -> Option<PriceView> {
    state.price().map(price_view_for)
}

pub fn price_view_for(breakdown: &PriceBreakdown) -> PriceView {
    PriceView {
        glass_name: breakdown.glass_name.clone(),
        unit_price: breakdown
            .unit_price()
            .map(|price| format!("{} / m²", format_price(price)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        area: format_area(breakdown.area),
        area_price: format_price(breakdown.area_price),
        waste_area: format_area(breakdown.waste_area),
        waste_price: format_price(breakdown.waste_price),
        total_price: format_price(breakdown.total_price),
        total_count_up: CountUp::new(breakdown.total_price),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub date: String,
    pub glass_name: String,
    pub area: String,
    pub waste_area: String,
    pub total_price: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            date: record.date.clone(),
            glass_name: record.glass_name.clone(),
            area: format_area(record.area),
            waste_area: format_area(record.waste_area),
            total_price: format_price(record.total_price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    NotLoaded,
    Empty,
    Rows(Vec<HistoryRow>),
}

pub fn history_view(state: &SessionState) -> HistoryView {
    history_view_for(state.history())
}

pub fn history_view_for(history: &HistoryState) -> HistoryView {
    match history {
        HistoryState::NotLoaded => HistoryView::NotLoaded,
        HistoryState::Loaded(records) if records.is_empty() => HistoryView::Empty,
        HistoryState::Loaded(records) => {
            HistoryView::Rows(records.iter().map(HistoryRow::from).collect())
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
