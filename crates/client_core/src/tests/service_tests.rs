use super::*;
use crate::{
    catalog,
    error::{OptimizationError, ValidationError},
    history::{self, ClearOutcome, Confirmation},
    optimization::request_optimization,
    pdf, pricing,
    test_support::{spawn_glass_server, PDF_BYTES},
};
use axum::http::StatusCode;
use shared::domain::{GlassId, PieceDimension, StockSheet};
use tokio::net::TcpListener;

const SESSION: SessionId = SessionId(1_700_000_000_123);

fn service(url: &str) -> HttpGlassService {
    HttpGlassService::new(url, None).expect("service")
}

#[tokio::test]
async fn optimize_posts_wire_body_and_passes_totals_through() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    let service = service(&url);

    let result = request_optimization(
        &service,
        SESSION,
        &[PieceDimension::new(100.0, 50.0), PieceDimension::new(60.0, 40.0)],
        StockSheet::new(321.0, 225.0),
    )
    .await
    .expect("optimize");

    assert_eq!(result.layouts.len(), 1);
    assert_eq!(result.total_area, 2.0);
    assert_eq!(result.average_waste, 89.75);

    let requests = server.optimize_requests.lock().await;
    assert_eq!(
        requests.as_slice(),
        &[OptimizeRequest {
            user_id: SESSION,
            dimensions: "100x50-60x40".into(),
            stock_width: 321.0,
            stock_height: 225.0,
        }]
    );
}

#[tokio::test]
async fn optimize_error_body_becomes_user_message() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    server
        .fail_optimize(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"no fit"}"#)
        .await;

    let err = request_optimization(
        &service(&url),
        SESSION,
        &[PieceDimension::new(500.0, 500.0)],
        StockSheet::default(),
    )
    .await
    .expect_err("must fail");

    match err {
        OptimizationError::Service { message, source } => {
            assert_eq!(message, "no fit");
            assert!(matches!(
                source,
                ServiceError::Api {
                    status: 422,
                    kind: RequestKind::Optimize,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_without_message_uses_fallback() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    server
        .fail_optimize(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
        .await;

    let err = service(&url)
        .optimize(&OptimizeRequest {
            user_id: SESSION,
            dimensions: "10x10".into(),
            stock_width: 321.0,
            stock_height: 225.0,
        })
        .await
        .expect_err("must fail");

    assert_eq!(err.user_message(), "An error occurred during optimization.");
}

#[tokio::test]
async fn optimization_validates_before_calling() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");

    let err = request_optimization(&service(&url), SESSION, &[], StockSheet::default())
        .await
        .expect_err("no pieces");

    assert!(matches!(
        err,
        OptimizationError::Validation(ValidationError::NoPieces)
    ));
    assert!(server.optimize_requests.lock().await.is_empty());
}

#[tokio::test]
async fn loads_categories_and_types() {
    let (url, _server) = spawn_glass_server().await.expect("spawn server");
    let service = service(&url);

    let categories = catalog::load_categories(&service).await.expect("categories");
    assert_eq!(
        categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["FLOAT", "STOPSOL"]
    );

    let types = catalog::load_types(&service, CategoryId(1))
        .await
        .expect("types");
    assert_eq!(
        types.iter().map(|g| g.id).collect::<Vec<_>>(),
        vec![GlassId(1), GlassId(2)]
    );
}

#[tokio::test]
async fn calculates_price_for_session_and_glass() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");

    let breakdown = pricing::calculate_price(&service(&url), SESSION, GlassId(2))
        .await
        .expect("price");

    assert_eq!(breakdown.glass_name, "6 mm Float");
    assert_eq!(breakdown.total_price, 31.25);
    assert_eq!(breakdown.unit_price(), Some(12.5));
    assert_eq!(
        server.price_requests.lock().await.as_slice(),
        &[GlassQuoteRequest {
            user_id: SESSION,
            glass_id: GlassId(2),
        }]
    );
}

#[tokio::test]
async fn unknown_glass_surfaces_service_message() {
    let (url, _server) = spawn_glass_server().await.expect("spawn server");

    let err = pricing::calculate_price(&service(&url), SESSION, GlassId(404))
        .await
        .expect_err("unknown glass");
    assert_eq!(err.user_message(), "Glass not found");

    let err = pdf::export_pdf(&service(&url), SESSION, GlassId(404))
        .await
        .expect_err("unknown glass");
    assert_eq!(err.kind(), RequestKind::PdfExport);
    assert_eq!(err.user_message(), "Glass not found");
}

#[tokio::test]
async fn pdf_export_returns_raw_document() {
    let (url, _server) = spawn_glass_server().await.expect("spawn server");

    let bytes = pdf::export_pdf(&service(&url), SESSION, GlassId(1))
        .await
        .expect("pdf");
    assert_eq!(bytes, PDF_BYTES);
}

#[tokio::test]
async fn history_is_keyed_by_session() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");

    let records = history::load_history(&service(&url), SESSION)
        .await
        .expect("history");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].glass_name, "4 mm Float");
    assert_eq!(
        server.history_requests.lock().await.as_slice(),
        &[SESSION.0]
    );
}

#[tokio::test]
async fn clear_history_without_confirmation_sends_nothing() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    let service = service(&url);

    let outcome = history::clear_history(&service, SESSION, Confirmation::Declined)
        .await
        .expect("declined");
    assert_eq!(outcome, ClearOutcome::Cancelled);
    assert_eq!(*server.clear_calls.lock().await, 0);

    let outcome = history::clear_history(&service, SESSION, Confirmation::Confirmed)
        .await
        .expect("confirmed");
    assert_eq!(outcome, ClearOutcome::Cleared);
    assert_eq!(*server.clear_calls.lock().await, 1);
    assert!(history::load_history(&service, SESSION)
        .await
        .expect("history")
        .is_empty());
}

#[tokio::test]
async fn reported_clear_failure_is_an_error() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    *server.clear_failure.lock().await = Some("history store locked".into());

    let err = service(&url)
        .clear_history(SESSION)
        .await
        .expect_err("rejected");

    assert!(matches!(err, ServiceError::Rejected { .. }));
    assert_eq!(err.user_message(), "history store locked");
    assert_eq!(server.history.lock().await.len(), 1);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service(&format!("http://{addr}"))
        .list_categories()
        .await
        .expect_err("nothing listening");

    assert!(matches!(err, ServiceError::Transport { .. }));
    assert_eq!(err.user_message(), "Failed to load glass categories.");
}

#[tokio::test]
async fn configured_timeout_fails_slow_calls() {
    let (url, server) = spawn_glass_server().await.expect("spawn server");
    server.delay_next_optimize(Duration::from_millis(500)).await;
    let service = HttpGlassService::new(&url, Some(Duration::from_millis(50))).expect("service");

    let err = service
        .optimize(&OptimizeRequest {
            user_id: SESSION,
            dimensions: "10x10".into(),
            stock_width: 321.0,
            stock_height: 225.0,
        })
        .await
        .expect_err("timeout");

    assert!(matches!(err, ServiceError::Transport { .. }));
}

#[test]
fn base_path_prefix_is_kept() {
    let service = HttpGlassService::new("http://glass.example/quote", None).expect("service");
    assert_eq!(service.base_url().as_str(), "http://glass.example/quote/");

    let url = service
        .endpoint(RequestKind::Optimize, OPTIMIZE_ROUTE)
        .expect("join");
    assert_eq!(url.as_str(), "http://glass.example/quote/api/optimize");

    let url = service
        .endpoint(RequestKind::History, &history_route(SESSION))
        .expect("join");
    assert_eq!(
        url.as_str(),
        "http://glass.example/quote/api/history/1700000000123"
    );
}

#[test]
fn rejects_malformed_base_url() {
    assert!(HttpGlassService::new("not a url", None).is_err());
}
