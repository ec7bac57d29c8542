mod app;
mod backend;
mod config;
mod constants;
mod conversation;
mod error;
mod input;
mod panel;
mod ui;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::backend::ConversationStore;
use crate::config::Config;

/// Conversations written by `chatrail seed` when no count is given
const DEFAULT_SEED_COUNT: usize = 60;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chatrail=debug"));

    // The terminal belongs to the UI, so log to a file when possible
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("chatrail.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"chatrail - Terminal conversation navigator

Usage: chatrail [command]

Commands:
    (none)          Open the conversation panel
    init            Write a default configuration file
    seed [count]    Fill the local store with demo conversations
    help            Show this help message

Configuration file: ~/.config/chatrail/config.toml
"#
    );
}

fn run_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn run_seed(count: Option<&str>) -> Result<()> {
    let count = match count {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("Invalid conversation count: {}", raw))?,
        None => DEFAULT_SEED_COUNT,
    };

    let config = Config::load()?;
    config.ensure_dirs()?;
    let store = ConversationStore::open(&Config::database_path()?).await?;
    let written = store.seed_demo(count).await?;
    println!(
        "Seeded {} conversations ({} total)",
        written,
        store.conversation_count().await?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("init") => run_init(),
        Some("seed") => run_seed(args.get(2).map(|s| s.as_str())).await,
        Some("run") | None => {
            setup_logging();

            let config = Config::load()?;
            config.ensure_dirs()?;

            crate::ui::theme::init_theme(config.ui.theme);

            let mut app = App::new(config).await?;
            app.run().await
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }
}
