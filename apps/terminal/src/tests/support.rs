//! Fixed-answer glass service for driving the front-end without a network.

use async_trait::async_trait;
use client_core::{GlassService, ServiceError};
use shared::{
    domain::{
        Category, CategoryId, GlassId, GlassType, HistoryRecord, Layout, OptimizationResult,
        PriceBreakdown, SessionId,
    },
    protocol::{GlassQuoteRequest, OptimizeRequest},
};

pub(crate) const QUOTE_PDF: &[u8] = b"%PDF-1.4 canned quote";

pub(crate) struct CannedGlassService;

#[async_trait]
impl GlassService for CannedGlassService {
    async fn optimize(
        &self,
        _request: &OptimizeRequest,
    ) -> Result<OptimizationResult, ServiceError> {
        Ok(OptimizationResult {
            layouts: vec![Layout {
                area: 7.2225,
                waste_area: 6.48,
                waste_percentage: 89.75,
                image: "iVBORw0KGgo=".into(),
            }],
            total_area: 0.74,
            average_waste: 89.75,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(vec![Category {
            id: CategoryId(1),
            name: "FLOAT".into(),
        }])
    }

    async fn list_glass_types(
        &self,
        _category_id: CategoryId,
    ) -> Result<Vec<GlassType>, ServiceError> {
        Ok(vec![GlassType {
            id: GlassId(1),
            name: "4 mm Float".into(),
            price: 7.74,
        }])
    }

    async fn calculate_price(
        &self,
        _request: &GlassQuoteRequest,
    ) -> Result<PriceBreakdown, ServiceError> {
        Ok(PriceBreakdown {
            glass_name: "4 mm Float".into(),
            area: 2.0,
            area_price: 15.48,
            waste_area: 0.5,
            waste_price: 3.87,
            total_price: 19.35,
        })
    }

    async fn generate_pdf(&self, _request: &GlassQuoteRequest) -> Result<Vec<u8>, ServiceError> {
        Ok(QUOTE_PDF.to_vec())
    }

    async fn load_history(
        &self,
        _session_id: SessionId,
    ) -> Result<Vec<HistoryRecord>, ServiceError> {
        Ok(Vec::new())
    }

    async fn clear_history(&self, _session_id: SessionId) -> Result<(), ServiceError> {
        Ok(())
    }
}

pub(crate) fn temp_dir(label: &str) -> std::path::PathBuf {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("glass_quote_{label}_{suffix}"))
}
