//! In-process stand-in for the glass service used by the async test suites.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::{
    dimensions::parse_dimensions,
    domain::{Category, CategoryId, GlassId, GlassType, HistoryRecord, Layout, OptimizationResult},
    protocol::{ClearHistoryResponse, GlassQuoteRequest, OptimizeRequest},
};
use tokio::{net::TcpListener, sync::Mutex};

pub(crate) const PDF_BYTES: &[u8] = b"%PDF-1.4 mock quote";
pub(crate) const LAYOUT_PNG_B64: &str = "iVBORw0KGgo=";

#[derive(Clone)]
pub(crate) struct MockGlassServer {
    pub optimize_requests: Arc<Mutex<Vec<OptimizeRequest>>>,
    pub optimize_failure: Arc<Mutex<Option<(StatusCode, String)>>>,
    /// Consumed one per optimize call, in arrival order.
    pub optimize_delays: Arc<Mutex<VecDeque<Duration>>>,
    pub price_requests: Arc<Mutex<Vec<GlassQuoteRequest>>>,
    pub history: Arc<Mutex<Vec<HistoryRecord>>>,
    pub history_requests: Arc<Mutex<Vec<i64>>>,
    pub clear_calls: Arc<Mutex<u32>>,
    pub clear_failure: Arc<Mutex<Option<String>>>,
}

impl MockGlassServer {
    fn new() -> Self {
        Self {
            optimize_requests: Arc::new(Mutex::new(Vec::new())),
            optimize_failure: Arc::new(Mutex::new(None)),
            optimize_delays: Arc::new(Mutex::new(VecDeque::new())),
            price_requests: Arc::new(Mutex::new(Vec::new())),
            history: Arc::new(Mutex::new(vec![sample_history_record()])),
            history_requests: Arc::new(Mutex::new(Vec::new())),
            clear_calls: Arc::new(Mutex::new(0)),
            clear_failure: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn fail_optimize(&self, status: StatusCode, body: impl Into<String>) {
        *self.optimize_failure.lock().await = Some((status, body.into()));
    }

    pub async fn delay_next_optimize(&self, delay: Duration) {
        self.optimize_delays.lock().await.push_back(delay);
    }
}

pub(crate) fn sample_history_record() -> HistoryRecord {
    HistoryRecord {
        date: "2025-03-01 10:15".into(),
        glass_name: "4 mm Float".into(),
        area: 1.2,
        waste_area: 0.35,
        total_price: 14.0,
    }
}

fn catalog() -> Vec<(CategoryId, GlassType)> {
    vec![
        (
            CategoryId(1),
            GlassType {
                id: GlassId(1),
                name: "4 mm Float".into(),
                price: 7.74,
            },
        ),
        (
            CategoryId(1),
            GlassType {
                id: GlassId(2),
                name: "6 mm Float".into(),
                price: 12.5,
            },
        ),
        (
            CategoryId(3),
            GlassType {
                id: GlassId(7),
                name: "6mm Stopsol bronzový".into(),
                price: 32.65,
            },
        ),
    ]
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn optimize(
    State(state): State<MockGlassServer>,
    Json(request): Json<OptimizeRequest>,
) -> Response {
    let delay = state.optimize_delays.lock().await.pop_front();
    state.optimize_requests.lock().await.push(request.clone());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = state.optimize_failure.lock().await.clone() {
        return (status, body).into_response();
    }

    // total_area encodes the piece count so tests can tell responses apart.
    let pieces = parse_dimensions(&request.dimensions);
    Json(OptimizationResult {
        layouts: vec![Layout {
            area: request.stock_width * request.stock_height / 10_000.0,
            waste_area: 6.48,
            waste_percentage: 89.75,
            image: LAYOUT_PNG_B64.into(),
        }],
        total_area: pieces.len() as f64,
        average_waste: 89.75,
    })
    .into_response()
}

async fn categories() -> Json<Vec<Category>> {
    Json(vec![
        Category {
            id: CategoryId(1),
            name: "FLOAT".into(),
        },
        Category {
            id: CategoryId(3),
            name: "STOPSOL".into(),
        },
    ])
}

async fn glass_types(Path(category_id): Path<i64>) -> Json<Vec<GlassType>> {
    Json(
        catalog()
            .into_iter()
            .filter(|(category, _)| category.0 == category_id)
            .map(|(_, glass)| glass)
            .collect(),
    )
}

async fn calculate_price(
    State(state): State<MockGlassServer>,
    Json(request): Json<GlassQuoteRequest>,
) -> Response {
    state.price_requests.lock().await.push(request);
    let Some((_, glass)) = catalog()
        .into_iter()
        .find(|(_, glass)| glass.id == request.glass_id)
    else {
        return error_response(StatusCode::NOT_FOUND, "Glass not found");
    };
    Json(json!({
        "glass_name": glass.name,
        "area": 2.0,
        "area_price": glass.price * 2.0,
        "waste_area": 0.5,
        "waste_price": glass.price * 0.5,
        "total_price": glass.price * 2.5
    }))
    .into_response()
}

async fn generate_pdf(Json(request): Json<GlassQuoteRequest>) -> Response {
    if !catalog().iter().any(|(_, glass)| glass.id == request.glass_id) {
        return error_response(StatusCode::NOT_FOUND, "Glass not found");
    }
    ([(header::CONTENT_TYPE, "application/pdf")], PDF_BYTES).into_response()
}

async fn history(
    State(state): State<MockGlassServer>,
    Path(user_id): Path<i64>,
) -> Json<Vec<HistoryRecord>> {
    state.history_requests.lock().await.push(user_id);
    Json(state.history.lock().await.clone())
}

async fn clear_history(
    State(state): State<MockGlassServer>,
    Path(_user_id): Path<i64>,
) -> Json<ClearHistoryResponse> {
    *state.clear_calls.lock().await += 1;
    if let Some(message) = state.clear_failure.lock().await.clone() {
        return Json(ClearHistoryResponse {
            success: false,
            error: Some(message),
        });
    }
    state.history.lock().await.clear();
    Json(ClearHistoryResponse {
        success: true,
        error: None,
    })
}

pub(crate) async fn spawn_glass_server() -> Result<(String, MockGlassServer)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = MockGlassServer::new();
    let app = Router::new()
        .route("/api/optimize", post(optimize))
        .route("/api/categories", get(categories))
        .route("/api/glasses/:category_id", get(glass_types))
        .route("/api/calculate-price", post(calculate_price))
        .route("/api/generate-pdf", post(generate_pdf))
        .route("/api/history/:user_id", get(history))
        .route("/api/clear-history/:user_id", post(clear_history))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}
