//! forge-shell - terminal IDE shell
//!
//! Run without arguments to launch the TUI, or use subcommands for CLI mode.
//!
//! Available as the `forge` command.

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use forge_shell::ai::{AiBackend, GeminiClient};
use forge_shell::cli::{ai, config, shell, Cli, Commands};
use forge_shell::core::config::Config;
use forge_shell::core::store::FileStore;
use forge_shell::error::Result;
use forge_shell::tui::App;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.is_none());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr in CLI mode; in TUI mode log to a file so the screen stays clean
fn init_logging(tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let log_file = Config::log_path().ok().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // No subcommand - launch TUI mode
        None => run_tui().await,
        Some(Commands::Exec(args)) => shell::handle_exec(args).await,
        Some(Commands::Search(args)) => ai::handle_search(args).await,
        Some(Commands::Audit(args)) => ai::handle_audit(args).await,
        Some(Commands::Refactor(args)) => ai::handle_refactor(args).await,
        Some(Commands::Config(args)) => config::handle_config(args.command),
    }
}

/// Run the TUI application
async fn run_tui() -> Result<()> {
    let config = Config::load()?;
    let store = Arc::new(FileStore::open(Config::store_path()?));

    let backend: Option<Arc<dyn AiBackend>> = match GeminiClient::new() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::info!(error = %e, "starting without AI backend");
            None
        }
    };

    let mut app = App::new(config, store, backend);
    app.run().await
}
