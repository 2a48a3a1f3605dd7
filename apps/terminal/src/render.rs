//! Plain-text rendering of the view projections.

use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use client_core::{
    pricing::CountUp,
    view::{self, GlassTypeCard, HistoryView, OptimizationSummary, PriceView, StepStatus},
    Notice, NoticeLevel, RequestKind, SessionState, WizardStep,
};
use shared::{
    domain::{StockSheet, STOCK_PRESETS},
    format::{format_dimensions, format_price},
};
use tokio::time::{Instant, Interval, MissedTickBehavior};

const FRAME_INTERVAL: Duration = Duration::from_millis(40);

pub fn step_line(state: &SessionState) -> String {
    view::step_indicators(state)
        .iter()
        .map(|indicator| {
            let marker = match indicator.status {
                StepStatus::Completed => "x",
                StepStatus::Active => ">",
                StepStatus::Pending => " ",
            };
            format!("[{marker}] {}", indicator.step)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn print_screen(state: &SessionState) {
    println!();
    println!("{}", step_line(state));
    match state.step() {
        WizardStep::StockSelection => print_stock(state.stock()),
        WizardStep::PieceEntry => print_pieces(state),
        WizardStep::Optimization => {
            let optimization = view::optimization_view(state);
            if optimization.loading {
                println!("Optimizing...");
            } else if let Some(summary) = &optimization.summary {
                print_optimization(summary);
            }
        }
        WizardStep::GlassSelection => {
            print_categories(state);
            if state.is_loading(RequestKind::GlassTypes) {
                println!("Loading glass types...");
            }
            print_glass_cards(&view::glass_type_cards(state));
        }
        WizardStep::PriceReview => match view::price_view(state) {
            Some(price) => print_price(&price),
            None => println!("Calculating price..."),
        },
    }
    if !view::continue_enabled(state) && state.step() != WizardStep::PriceReview {
        println!("(complete this step to continue)");
    }
}

pub fn print_stock(current: StockSheet) {
    println!("Stock sheets:");
    for (index, preset) in STOCK_PRESETS.iter().enumerate() {
        let marker = if *preset == current { "*" } else { " " };
        println!(
            " {marker} {}) {}",
            index + 1,
            format_dimensions(preset.width, preset.height)
        );
    }
    if !STOCK_PRESETS.contains(&current) {
        println!(
            " * custom: {}",
            format_dimensions(current.width, current.height)
        );
    }
}

pub fn print_pieces(state: &SessionState) {
    let rows = view::piece_rows(state);
    if rows.is_empty() {
        println!("No glass dimensions entered yet (e.g. `pieces 100x50-60x40`).");
        return;
    }
    println!("Pieces:");
    for (index, row) in rows.iter().enumerate() {
        println!("  {}. {row}", index + 1);
    }
}

pub fn print_optimization(summary: &OptimizationSummary) {
    println!(
        "Sheets: {}  Total area: {}  Average waste: {}",
        summary.sheets_count, summary.total_area, summary.average_waste
    );
    for card in &summary.layouts {
        println!(
            "  {}: area {}, waste {}, utilization {}",
            card.title, card.area, card.waste_area, card.utilization
        );
    }
}

/// Writes each layout preview as `sheet_<n>.png` into `dir`.
pub async fn save_layout_images(summary: &OptimizationSummary, dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create '{}'", dir.display()))?;
    let mut written = Vec::with_capacity(summary.layouts.len());
    for (index, card) in summary.layouts.iter().enumerate() {
        let bytes = card
            .decode_image()
            .with_context(|| format!("{} has an undecodable preview", card.title))?;
        let path = dir.join(format!("sheet_{}.png", index + 1));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

pub fn print_categories(state: &SessionState) {
    let categories = state.categories();
    if state.is_loading(RequestKind::Categories) {
        println!("Loading categories...");
        return;
    }
    if categories.is_empty() {
        println!("No glass categories available.");
        return;
    }
    println!("Categories:");
    for category in categories {
        let marker = if state.selected_category() == Some(category.id) {
            "*"
        } else {
            " "
        };
        println!(" {marker} [{}] {}", category.id, category.name);
    }
}

pub fn print_glass_cards(cards: &[GlassTypeCard]) {
    for card in cards {
        let marker = if card.selected { "*" } else { " " };
        println!(
            " {marker} [{}] {}  {}  thickness {}",
            card.id, card.name, card.price, card.thickness
        );
    }
}

pub fn print_price(price: &PriceView) {
    print_breakdown(price);
    println!("Total:          {}", price.total_price);
}

/// Whether the total should be counted up rather than printed once.
pub fn animations_enabled() -> bool {
    io::stdout().is_terminal()
}

/// Ticks at the count-up frame rate; a late tick is skipped, not bunched up.
pub fn frame_ticker() -> Interval {
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// The total being counted up on the current terminal line.
#[derive(Debug, Clone, Copy)]
pub struct TotalCountUp {
    count_up: CountUp,
    started: Instant,
}

impl TotalCountUp {
    fn start(price: &PriceView) -> Self {
        print_breakdown(price);
        Self {
            count_up: price.total_count_up,
            started: Instant::now(),
        }
    }

    /// The line to draw after `elapsed`, and whether it shows the final value.
    pub fn frame_at(&self, elapsed: Duration) -> (String, bool) {
        let frame = format!(
            "\rTotal:          {}   ",
            format_price(self.count_up.value_at(elapsed))
        );
        (frame, self.count_up.is_finished(elapsed))
    }

    /// Draws the current frame. Returns `false` once the final value is shown.
    pub fn tick(&self) -> bool {
        let (frame, finished) = self.frame_at(self.started.elapsed());
        draw(&frame, finished);
        !finished
    }

    /// Jumps straight to the final value, e.g. before other output.
    pub fn finish(&self) {
        let (frame, _) = self.frame_at(self.count_up.duration());
        draw(&frame, true);
    }
}

fn draw(frame: &str, last: bool) {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{frame}");
    if last {
        let _ = writeln!(stdout);
    }
    let _ = stdout.flush();
}

/// Prints the breakdown. With `animate` the total is left to the returned
/// count-up, which the caller ticks from its own loop.
pub fn start_price(price: &PriceView, animate: bool) -> Option<TotalCountUp> {
    if animate {
        Some(TotalCountUp::start(price))
    } else {
        print_price(price);
        None
    }
}

/// Prints the price and counts the total up on a terminal. Only awaits the
/// animation itself; callers run other work alongside it.
pub async fn print_price_animated(price: &PriceView) {
    let Some(count_up) = start_price(price, animations_enabled()) else {
        return;
    };
    let mut ticker = frame_ticker();
    loop {
        ticker.tick().await;
        if !count_up.tick() {
            break;
        }
    }
}

fn print_breakdown(price: &PriceView) {
    println!("Glass:          {}", price.glass_name);
    println!("Unit price:     {}", price.unit_price);
    println!("Area:           {} ({})", price.area, price.area_price);
    println!("Waste:          {} ({})", price.waste_area, price.waste_price);
}

pub fn print_history(history: &HistoryView) {
    match history {
        HistoryView::NotLoaded => println!("Loading history..."),
        HistoryView::Empty => println!("No calculations yet."),
        HistoryView::Rows(rows) => {
            for row in rows {
                println!(
                    "{}  {}  area {}  waste {}  total {}",
                    row.date, row.glass_name, row.area, row.waste_area, row.total_price
                );
            }
        }
    }
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}", notice.message),
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}
