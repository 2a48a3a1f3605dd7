//! One-shot quote: drives the whole wizard from command-line arguments.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use client_core::{view, NoticeLevel, WizardEvent, Workflow};
use shared::domain::{CategoryId, GlassId, StockSheet};
use tracing::info;

use crate::render;

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub stock: StockSheet,
    pub pieces: String,
    pub category_id: CategoryId,
    pub glass_id: GlassId,
    pub export_pdf: bool,
    pub layouts_dir: Option<PathBuf>,
}

/// Fails with the service's message when the last completion left an error notice.
fn ensure_no_error(workflow: &Workflow) -> Result<()> {
    match workflow.state().notice() {
        Some(notice) if notice.level == NoticeLevel::Error => Err(anyhow!(notice.message.clone())),
        _ => Ok(()),
    }
}

async fn step(workflow: &mut Workflow, event: WizardEvent) -> Result<()> {
    workflow.dispatch(event)?;
    workflow.settle().await;
    ensure_no_error(workflow)
}

pub async fn run(mut workflow: Workflow, request: QuoteRequest) -> Result<()> {
    info!(session_id = %workflow.state().session_id(), "running one-shot quote");

    step(&mut workflow, WizardEvent::SelectStock(request.stock)).await?;
    step(&mut workflow, WizardEvent::Advance).await?;
    step(&mut workflow, WizardEvent::EditPieces(request.pieces)).await?;
    if workflow.state().pieces().is_empty() {
        bail!("no valid glass dimensions given, expected e.g. 100x50-60x40");
    }
    println!("{}", render::step_line(workflow.state()));
    render::print_pieces(workflow.state());

    step(&mut workflow, WizardEvent::Advance)
        .await
        .context("optimization failed")?;
    let summary = view::optimization_view(workflow.state())
        .summary
        .context("optimization returned no result")?;
    render::print_optimization(&summary);
    if let Some(dir) = &request.layouts_dir {
        for path in render::save_layout_images(&summary, dir).await? {
            println!("Saved {}", path.display());
        }
    }

    step(&mut workflow, WizardEvent::Advance)
        .await
        .context("loading glass categories failed")?;
    step(&mut workflow, WizardEvent::SelectCategory(Some(request.category_id)))
        .await
        .with_context(|| {
            format!(
                "loading glass types of category {} failed",
                request.category_id
            )
        })?;
    step(&mut workflow, WizardEvent::SelectGlass(request.glass_id))
        .await
        .with_context(|| {
            format!(
                "glass {} is not offered in category {}",
                request.glass_id, request.category_id
            )
        })?;
    render::print_glass_cards(&view::glass_type_cards(workflow.state()));

    step(&mut workflow, WizardEvent::Advance)
        .await
        .context("price calculation failed")?;
    let price = view::price_view(workflow.state()).context("no price was calculated")?;
    println!("{}", render::step_line(workflow.state()));

    if !request.export_pdf {
        render::print_price_animated(&price).await;
        return Ok(());
    }

    // The export is already in flight while the total counts up.
    workflow.dispatch(WizardEvent::ExportPdf)?;
    tokio::join!(render::print_price_animated(&price), workflow.settle());
    ensure_no_error(&workflow).context("PDF export failed")?;
    if let Some(notice) = workflow.state().notice() {
        render::print_notice(notice);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/quote_tests.rs"]
mod tests;
