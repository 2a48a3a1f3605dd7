use serde::{Deserialize, Serialize};

use crate::domain::{GlassId, SessionId};

pub const OPTIMIZE_ROUTE: &str = "/api/optimize";
pub const CATEGORIES_ROUTE: &str = "/api/categories";
pub const CALCULATE_PRICE_ROUTE: &str = "/api/calculate-price";
pub const GENERATE_PDF_ROUTE: &str = "/api/generate-pdf";

pub fn glass_types_route(category_id: i64) -> String {
    format!("/api/glasses/{category_id}")
}

pub fn history_route(session_id: SessionId) -> String {
    format!("/api/history/{}", session_id.0)
}

pub fn clear_history_route(session_id: SessionId) -> String {
    format!("/api/clear-history/{}", session_id.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub user_id: SessionId,
    /// Pieces serialized as `WxH` joined by `-`.
    pub dimensions: String,
    pub stock_width: f64,
    pub stock_height: f64,
}

/// Body shared by the price calculation and PDF export calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassQuoteRequest {
    pub user_id: SessionId,
    pub glass_id: GlassId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
