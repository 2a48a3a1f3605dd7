//! The remote glass service: trait seam plus the reqwest implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        Category, CategoryId, GlassType, HistoryRecord, OptimizationResult, PriceBreakdown,
        SessionId,
    },
    error::ApiError,
    protocol::{
        clear_history_route, glass_types_route, history_route, ClearHistoryResponse,
        GlassQuoteRequest, OptimizeRequest, CALCULATE_PRICE_ROUTE, CATEGORIES_ROUTE,
        GENERATE_PDF_ROUTE, OPTIMIZE_ROUTE,
    },
};
use tracing::debug;
use url::Url;

use crate::{error::ServiceError, tokens::RequestKind};

#[async_trait]
pub trait GlassService: Send + Sync {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizationResult, ServiceError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;
    async fn list_glass_types(&self, category_id: CategoryId)
        -> Result<Vec<GlassType>, ServiceError>;
    async fn calculate_price(
        &self,
        request: &GlassQuoteRequest,
    ) -> Result<PriceBreakdown, ServiceError>;
    async fn generate_pdf(&self, request: &GlassQuoteRequest) -> Result<Vec<u8>, ServiceError>;
    async fn load_history(&self, session_id: SessionId) -> Result<Vec<HistoryRecord>, ServiceError>;
    async fn clear_history(&self, session_id: SessionId) -> Result<(), ServiceError>;
}

pub struct HttpGlassService {
    http: Client,
    base_url: Url,
}

impl HttpGlassService {
    /// `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid service url '{base_url}'"))?;
        // Routes are joined relative to the base, which needs a trailing slash to
        // keep any path prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, kind: RequestKind, route: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .map_err(|source| ServiceError::InvalidUrl { kind, source })
    }

    async fn send(
        &self,
        kind: RequestKind,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|source| ServiceError::Transport { kind, source })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport { kind, source })?;
        debug!(
            request = %kind,
            status = status.as_u16(),
            size_bytes = body.len(),
            "service responded"
        );

        if !status.is_success() {
            return Err(ServiceError::Api {
                kind,
                status: status.as_u16(),
                message: ApiError::message_from_body(&body),
            });
        }
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let body = self.send(kind, request).await?;
        serde_json::from_slice(&body).map_err(|source| ServiceError::Decode { kind, source })
    }
}

#[async_trait]
impl GlassService for HttpGlassService {
    async fn optimize(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizationResult, ServiceError> {
        let kind = RequestKind::Optimize;
        let url = self.endpoint(kind, OPTIMIZE_ROUTE)?;
        self.send_json(kind, self.http.post(url).json(request)).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        let kind = RequestKind::Categories;
        let url = self.endpoint(kind, CATEGORIES_ROUTE)?;
        self.send_json(kind, self.http.get(url)).await
    }

    async fn list_glass_types(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<GlassType>, ServiceError> {
        let kind = RequestKind::GlassTypes;
        let url = self.endpoint(kind, &glass_types_route(category_id.0))?;
        self.send_json(kind, self.http.get(url)).await
    }

    async fn calculate_price(
        &self,
        request: &GlassQuoteRequest,
    ) -> Result<PriceBreakdown, ServiceError> {
        let kind = RequestKind::Pricing;
        let url = self.endpoint(kind, CALCULATE_PRICE_ROUTE)?;
        self.send_json(kind, self.http.post(url).json(request)).await
    }

    async fn generate_pdf(&self, request: &GlassQuoteRequest) -> Result<Vec<u8>, ServiceError> {
        let kind = RequestKind::PdfExport;
        let url = self.endpoint(kind, GENERATE_PDF_ROUTE)?;
        self.send(kind, self.http.post(url).json(request)).await
    }

    async fn load_history(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<HistoryRecord>, ServiceError> {
        let kind = RequestKind::History;
        let url = self.endpoint(kind, &history_route(session_id))?;
        self.send_json(kind, self.http.get(url)).await
    }

    async fn clear_history(&self, session_id: SessionId) -> Result<(), ServiceError> {
        let kind = RequestKind::ClearHistory;
        let url = self.endpoint(kind, &clear_history_route(session_id))?;
        let response: ClearHistoryResponse = self.send_json(kind, self.http.post(url)).await?;
        if response.success {
            Ok(())
        } else {
            Err(ServiceError::Rejected {
                kind,
                message: response.error.filter(|message| !message.trim().is_empty()),
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
