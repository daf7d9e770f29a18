use std::{io::Write as _, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use client_core::{
    build_store, spawn_store_worker, ClientSettings, DispatchError, PageWindow, StoreCommand,
    StoreHandle, StoreSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod render;

use input::{parse_input, Input, HELP};
use render::{render_detail, render_snapshot};

#[derive(Parser, Debug)]
#[command(name = "inventrix", about = "Paginated notes synced against a REST posts endpoint")]
struct Args {
    /// Base url of the remote posts service.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<usize>,
    /// TOML settings file (defaults to ./inventrix.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run without a remote; every change is kept locally.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = ClientSettings::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    if let Some(page_size) = args.page_size {
        settings.set_page_size(page_size);
    }
    settings.validate()?;
    info!(
        api = %settings.api_base_url,
        page_size = settings.page_size,
        offline = args.offline,
        "starting inventrix"
    );

    let (handle, _worker) = spawn_store_worker(build_store(&settings, args.offline));
    let snapshot = handle.execute(StoreCommand::Initialize).await?;
    print!("{}", render_snapshot(&snapshot));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(error) => {
                println!("error: {error:#}");
                continue;
            }
        };
        match run_input(&handle, input).await? {
            Some(text) => print!("{text}"),
            None => break,
        }
    }

    Ok(())
}

/// Applies one prompt command and returns what to print, or `None` to quit.
async fn run_input(handle: &StoreHandle, input: Input) -> Result<Option<String>> {
    let current = handle.snapshot();
    let command = match input {
        Input::Store(command) => command,
        Input::Page(page) => match bounded_page(&current, page) {
            Some(page) => StoreCommand::ChangePage(page),
            None => {
                return Ok(Some(format!(
                    "page must be between 1 and {}\n",
                    current.total_pages
                )))
            }
        },
        Input::Next => {
            let window = window_of(&current);
            if !window.has_next() {
                return Ok(Some("already on the last page\n".to_string()));
            }
            StoreCommand::ChangePage(current.current_page + 1)
        }
        Input::Prev => {
            let window = window_of(&current);
            if !window.has_previous() {
                return Ok(Some("already on the first page\n".to_string()));
            }
            StoreCommand::ChangePage(current.current_page - 1)
        }
        Input::Show(id) => {
            let text = current
                .page_items
                .iter()
                .find(|item| item.id == id)
                .map(render_detail)
                .unwrap_or_else(|| format!("item {id} is not on this page\n"));
            return Ok(Some(text));
        }
        Input::List => return Ok(Some(render_snapshot(&current))),
        Input::Help => return Ok(Some(format!("{HELP}\n"))),
        Input::Quit => return Ok(None),
    };

    match handle.execute(command).await {
        Ok(snapshot) => Ok(Some(render_snapshot(&snapshot))),
        Err(DispatchError::Busy) | Err(DispatchError::QueueFull) => {
            warn!("store busy; command dropped");
            Ok(Some("still working on the previous change, try again\n".to_string()))
        }
        Err(error @ DispatchError::Disconnected) => Err(error.into()),
    }
}

fn window_of(snapshot: &StoreSnapshot) -> PageWindow {
    PageWindow::new(
        snapshot.current_page,
        snapshot.page_size,
        snapshot.total_items,
    )
}

/// The prompt only offers pages that exist.
fn bounded_page(snapshot: &StoreSnapshot, page: usize) -> Option<usize> {
    (1..=snapshot.total_pages).contains(&page).then_some(page)
}
