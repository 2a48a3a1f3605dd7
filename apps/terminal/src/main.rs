use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    catalog, history, history::CLEAR_HISTORY_PROMPT, view, ClearOutcome, Confirmation,
    HistoryState, HttpGlassService, SessionState, Workflow,
};
use shared::domain::{CategoryId, GlassId, SessionId, StockSheet};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod interactive;
mod quote;
mod render;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "glass-quote", about = "Cut-to-size glass quotes against the glass service")]
struct Cli {
    /// Config file; defaults to ./glass_quote.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Reuse an earlier session id, e.g. to look at its history.
    #[arg(long, global = true)]
    session: Option<i64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Step through the wizard with typed commands (the default).
    Interactive,
    /// Run the whole wizard in one go and print the quote.
    Quote {
        /// Stock sheet as WIDTHxHEIGHT in cm; the configured default otherwise.
        #[arg(long)]
        stock: Option<StockSheet>,
        /// Pieces as WxH entries separated by `-` or newlines.
        #[arg(long)]
        pieces: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        glass: i64,
        /// Also download the quote PDF into the download directory.
        #[arg(long)]
        pdf: bool,
        /// Save the layout previews as PNG files into this directory.
        #[arg(long)]
        layouts_dir: Option<PathBuf>,
    },
    /// List glass categories.
    Categories,
    /// List the glass types of one category.
    Glasses { category_id: i64 },
    /// Show the calculation history of the session.
    History,
    /// Delete the calculation history of the session.
    ClearHistory {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = load_settings(self.config.as_deref())?;
        if let Some(server_url) = &self.server_url {
            settings.server_url = server_url.clone();
        }
        if let Some(download_dir) = &self.download_dir {
            settings.download_dir = download_dir.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.request_timeout_secs = Some(timeout_secs);
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let session_id = cli.session.map(SessionId).unwrap_or_else(SessionId::generate);
    let service = HttpGlassService::new(&settings.server_url, settings.request_timeout())?;
    info!(
        server_url = %service.base_url(),
        %session_id,
        download_dir = %settings.download_dir.display(),
        "glass-quote starting"
    );

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let state = SessionState::with_stock(session_id, settings.default_stock);
            let workflow = Workflow::with_state(Arc::new(service), state, &settings.download_dir);
            interactive::run(workflow).await?;
        }
        Command::Quote {
            stock,
            pieces,
            category,
            glass,
            pdf,
            layouts_dir,
        } => {
            let workflow = Workflow::new(Arc::new(service), session_id, &settings.download_dir);
            let request = quote::QuoteRequest {
                stock: stock.unwrap_or(settings.default_stock),
                pieces,
                category_id: CategoryId(category),
                glass_id: GlassId(glass),
                export_pdf: pdf,
                layouts_dir,
            };
            quote::run(workflow, request).await?;
        }
        Command::Categories => {
            for category in catalog::load_categories(&service).await? {
                println!("[{}] {}", category.id, category.name);
            }
        }
        Command::Glasses { category_id } => {
            let types = catalog::load_types(&service, CategoryId(category_id)).await?;
            if types.is_empty() {
                println!("No glass types in category {category_id}.");
            }
            render::print_glass_cards(&view::glass_type_cards_for(&types, None));
        }
        Command::History => {
            let records = history::load_history(&service, session_id).await?;
            render::print_history(&view::history_view_for(&HistoryState::Loaded(records)));
        }
        Command::ClearHistory { yes } => {
            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                ask_confirmation().await?
            };
            match history::clear_history(&service, session_id, confirmation).await? {
                ClearOutcome::Cleared => println!("{}", history::HISTORY_CLEARED_MESSAGE),
                ClearOutcome::Cancelled => println!("History kept."),
            }
        }
    }

    Ok(())
}

async fn ask_confirmation() -> Result<Confirmation> {
    println!("{CLEAR_HISTORY_PROMPT} [y/N]");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines
        .next_line()
        .await
        .context("failed to read confirmation")?
        .unwrap_or_default();
    Ok(interactive::parse_confirmation(&answer))
}
