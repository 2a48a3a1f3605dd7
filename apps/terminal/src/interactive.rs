//! Line-oriented front-end: stdin commands and service completions share one loop.

use anyhow::{bail, Context, Result};
use client_core::{
    history::CLEAR_HISTORY_PROMPT, view, Confirmation, HistoryState, RequestKind,
    SessionState, WizardEvent, WizardStep, Workflow,
};
use shared::{
    domain::{CategoryId, GlassId, StockSheet, STOCK_PRESETS},
    format::parse_number,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::{self, TotalCountUp};

pub const HELP: &str = "\
commands:
  stock <n>|<W>x<H>     pick preset n or a custom sheet
  width <cm>            custom sheet width
  height <cm>           custom sheet height
  pieces <list>         replace the piece list (e.g. 100x50-60x40)
  add <W>x<H>           append one piece
  remove <n>            remove piece n
  clear                 remove all pieces
  next | back           move through the steps
  category <id>|none    choose a glass category
  glass <id>            choose a glass type
  pdf                   download the quote as PDF
  history               list earlier calculations
  clear-history         delete the calculation history
  new                   start a new calculation
  show | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Help,
    Preset(usize),
    Stock(StockSheet),
    Width(f64),
    Height(f64),
    Pieces(String),
    Add(String),
    Remove(usize),
    ClearPieces,
    Next,
    Back,
    Category(Option<CategoryId>),
    Glass(GlassId),
    Pdf,
    History,
    ClearHistory,
    New,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "show" | "s" => Command::Show,
        "help" | "?" => Command::Help,
        "stock" => parse_stock(arg)?,
        // Unparsable sizes become 0 so the step stays blocked until corrected.
        "width" => Command::Width(parse_number(arg).unwrap_or(0.0)),
        "height" => Command::Height(parse_number(arg).unwrap_or(0.0)),
        "pieces" => Command::Pieces(arg.to_string()),
        "add" if !arg.is_empty() => Command::Add(arg.to_string()),
        "remove" => Command::Remove(parse_position(arg)?),
        "clear" => Command::ClearPieces,
        "next" | "n" => Command::Next,
        "back" | "b" => Command::Back,
        "category" if arg.eq_ignore_ascii_case("none") => Command::Category(None),
        "category" => Command::Category(Some(CategoryId(parse_id(arg)?))),
        "glass" => Command::Glass(GlassId(parse_id(arg)?)),
        "pdf" => Command::Pdf,
        "history" => Command::History,
        "clear-history" => Command::ClearHistory,
        "new" => Command::New,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{other}', type `help`"),
    };
    Ok(Some(command))
}

fn parse_stock(arg: &str) -> Result<Command> {
    if let Ok(position) = arg.parse::<usize>() {
        if (1..=STOCK_PRESETS.len()).contains(&position) {
            return Ok(Command::Preset(position - 1));
        }
        bail!("there are {} stock presets", STOCK_PRESETS.len());
    }
    Ok(Command::Stock(arg.parse()?))
}

fn parse_position(arg: &str) -> Result<usize> {
    match arg.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => bail!("expected a position starting at 1, got '{arg}'"),
    }
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.parse()
        .with_context(|| format!("expected a numeric id, got '{arg}'"))
}

/// Confirmation answers accept `y`/`yes`; anything else declines.
pub fn parse_confirmation(line: &str) -> Confirmation {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    }
}

/// Prints a rejected event instead of failing the loop.
fn dispatch(workflow: &mut Workflow, event: WizardEvent) -> bool {
    match workflow.dispatch(event) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("error: {err}");
            false
        }
    }
}

/// What the screen currently shows, used to decide whether a completion needs
/// a redraw.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    step: WizardStep,
    has_result: bool,
    categories: usize,
    glass_types: usize,
    has_price: bool,
}

impl Snapshot {
    fn of(state: &SessionState) -> Self {
        Self {
            step: state.step(),
            has_result: state.optimization().is_some(),
            categories: state.categories().len(),
            glass_types: state.glass_types().len(),
            has_price: state.price().is_some(),
        }
    }
}

#[derive(Debug, Default)]
struct Prompt {
    awaiting_confirmation: bool,
    history_requested: bool,
    animate: bool,
}

impl Prompt {
    fn new(animate: bool) -> Self {
        Self {
            animate,
            ..Self::default()
        }
    }

    /// Returns `false` once the user asked to quit.
    fn handle_line(&mut self, workflow: &mut Workflow, line: &str) -> bool {
        if self.awaiting_confirmation {
            self.awaiting_confirmation = false;
            let confirmation = parse_confirmation(line);
            if confirmation == Confirmation::Declined {
                println!("History kept.");
            }
            dispatch(workflow, WizardEvent::ClearHistory(confirmation));
            return true;
        }

        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(err) => {
                eprintln!("error: {err:#}");
                return true;
            }
        };
        debug!(?command, "command entered");

        let event = match command {
            Command::Quit => return false,
            Command::Help => {
                println!("{HELP}");
                return true;
            }
            Command::Show => {
                render::print_screen(workflow.state());
                return true;
            }
            Command::ClearHistory => {
                print!("{CLEAR_HISTORY_PROMPT} [y/N] ");
                let _ = std::io::Write::flush(&mut std::io::stdout());
                self.awaiting_confirmation = true;
                return true;
            }
            Command::History => {
                self.history_requested = true;
                WizardEvent::OpenHistory
            }
            Command::Preset(index) => WizardEvent::SelectStock(STOCK_PRESETS[index]),
            Command::Stock(stock) => WizardEvent::SelectStock(stock),
            Command::Width(width) => WizardEvent::SetStockWidth(width),
            Command::Height(height) => WizardEvent::SetStockHeight(height),
            Command::Pieces(text) => WizardEvent::EditPieces(text),
            Command::Add(piece) => {
                let current = workflow.state().piece_text();
                let text = if current.trim().is_empty() {
                    piece
                } else {
                    format!("{current}\n{piece}")
                };
                WizardEvent::EditPieces(text)
            }
            Command::Remove(position) => WizardEvent::RemovePiece(position - 1),
            Command::ClearPieces => WizardEvent::ClearPieces,
            Command::Next => WizardEvent::Advance,
            Command::Back => WizardEvent::Retreat,
            Command::Category(category_id) => WizardEvent::SelectCategory(category_id),
            Command::Glass(glass_id) => WizardEvent::SelectGlass(glass_id),
            Command::Pdf => WizardEvent::ExportPdf,
            Command::New => WizardEvent::NewCalculation,
        };

        if dispatch(workflow, event) {
            render::print_screen(workflow.state());
        }
        true
    }

    /// Reports what a completion changed. A newly arrived price comes back as a
    /// count-up for the caller's loop to tick.
    fn after_completion(
        &mut self,
        workflow: &mut Workflow,
        before: &Snapshot,
    ) -> Option<TotalCountUp> {
        if let Some(notice) = workflow.state().notice().cloned() {
            render::print_notice(&notice);
            let _ = workflow.dispatch(WizardEvent::DismissNotice);
        }

        if self.history_requested && !workflow.state().is_loading(RequestKind::History) {
            if let HistoryState::Loaded(_) = workflow.state().history() {
                render::print_history(&view::history_view(workflow.state()));
            }
            self.history_requested = false;
        }

        let after = Snapshot::of(workflow.state());
        if after == *before {
            return None;
        }
        if !before.has_price && after.has_price {
            println!("{}", render::step_line(workflow.state()));
            let price = view::price_view(workflow.state())?;
            return render::start_price(&price, self.animate);
        }
        render::print_screen(workflow.state());
        None
    }
}

pub async fn run(mut workflow: Workflow) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut prompt = Prompt::new(render::animations_enabled());
    let mut ticker = render::frame_ticker();
    let mut count_up: Option<TotalCountUp> = None;
    let mut stdin_open = true;

    println!(
        "Session {}. Type `help` for commands.",
        workflow.state().session_id()
    );
    render::print_screen(workflow.state());

    // After stdin closes, finish whatever is still in flight before exiting.
    while stdin_open || workflow.outstanding() > 0 || count_up.is_some() {
        let before = Snapshot::of(workflow.state());
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                // Other output must not land on the count-up line.
                if let Some(running) = count_up.take() {
                    running.finish();
                }
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        if !prompt.handle_line(&mut workflow, &line) {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            applied = workflow.pump(), if workflow.outstanding() > 0 => {
                if let Some(running) = count_up.take() {
                    running.finish();
                }
                if applied {
                    count_up = prompt.after_completion(&mut workflow, &before);
                }
            }
            _ = ticker.tick(), if count_up.is_some() => {
                if let Some(running) = count_up {
                    if !running.tick() {
                        count_up = None;
                    }
                }
            }
        }
    }
    Ok(())
}
