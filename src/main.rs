pub mod app;
pub mod cli;
pub mod client;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod credentials;
pub mod editor;
pub mod event;
pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod session;
pub mod ui;
pub mod upstream;

use app::App;
use clap::Parser;
use cli::{Cli, CliCommand};
use color_eyre::eyre::{WrapErr, eyre};
use config::load_config;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use gateway::GatewayConfig;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize tracing (logs to stderr if RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // No subcommand or explicit `tui` → launch the interactive TUI.
        None | Some(CliCommand::Tui) => run_tui().await,
        Some(CliCommand::Serve { port }) => run_gateway(port).await,
        Some(CliCommand::Process(args)) => cli::run_process(args).await,
    }
}

/// Launch the interactive TUI.
async fn run_tui() -> color_eyre::Result<()> {
    credentials::load_env_files();
    let config = load_config();
    let api_key = credentials::load_client_key();

    // A bad gateway URL still opens the form; submitting reports it.
    let client = match client::GatewayClient::new(&config.gateway_url) {
        Ok(client) => {
            tracing::info!(endpoint = client.endpoint(), "gateway client ready");
            Some(client)
        }
        Err(e) => {
            tracing::warn!("gateway client setup failed: {e}");
            eprintln!("Warning: {e}. Requests are disabled until gateway_url is fixed.");
            None
        }
    };

    let terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableBracketedPaste) {
        tracing::warn!("bracketed paste unavailable: {e}");
    }
    let result = App::new(config, client, api_key).run(terminal).await;
    let _ = execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    result
}

/// `copycode serve`: run the HTTP gateway until interrupted.
async fn run_gateway(port: Option<u16>) -> color_eyre::Result<()> {
    let mut config = GatewayConfig::from_env().map_err(|e| eyre!("{e}"))?;
    if let Some(port) = port {
        config.port = port;
    }

    if config.default_api_key.is_none() {
        eprintln!(
            "Hint: set {} to let clients call without their own key.",
            credentials::SERVER_KEY_VAR
        );
    }

    gateway::serve(config)
        .await
        .wrap_err("gateway stopped")
}
