use super::*;

use std::sync::Arc;

use client_core::pdf::PDF_FILENAME;
use shared::domain::SessionId;

use crate::test_support::{temp_dir, CannedGlassService, QUOTE_PDF};

fn request(export_pdf: bool) -> QuoteRequest {
    QuoteRequest {
        stock: StockSheet::default(),
        pieces: "100x50-60x40".into(),
        category_id: CategoryId(1),
        glass_id: GlassId(1),
        export_pdf,
        layouts_dir: None,
    }
}

#[tokio::test]
async fn quote_with_pdf_saves_the_document() {
    let dir = temp_dir("quote_pdf");
    let workflow = Workflow::new(Arc::new(CannedGlassService), SessionId(5), &dir);

    run(workflow, request(true)).await.expect("quote");

    let saved = tokio::fs::read(dir.join(PDF_FILENAME)).await.expect("saved pdf");
    assert_eq!(saved, QUOTE_PDF);
    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}

#[tokio::test]
async fn unknown_glass_stops_the_quote() {
    let workflow = Workflow::new(Arc::new(CannedGlassService), SessionId(5), temp_dir("quote_bad"));
    let mut bad = request(false);
    bad.glass_id = GlassId(99);

    let err = run(workflow, bad).await.expect_err("glass 99 is not listed");
    assert!(err.to_string().contains("glass 99"));
}
