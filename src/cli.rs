use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr, eyre};

use crate::client::GatewayClient;
use crate::clipboard::{self, NotificationKind};
use crate::config::{AppConfig, load_config};
use crate::credentials::{self, ApiKey};
use crate::prompt::{CommentLevel, Mode, ProcessingRequest, build_prompt};
use crate::session::{self, ValidationError};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "copycode",
    about = "Improve code with Anthropic models: terminal form, gateway and CLI"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui,
    /// Run the HTTP gateway that proxies prompts to the Anthropic API
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Process source from a file or stdin and print the improved code
    Process(ProcessArgs),
}

#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Source file; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,
    /// code or text
    #[arg(long)]
    pub mode: Option<Mode>,
    /// none, minimal, standard or detailed
    #[arg(long)]
    pub comments: Option<CommentLevel>,
    #[arg(long)]
    pub debug: bool,
    #[arg(long)]
    pub optimize: bool,
    #[arg(long)]
    pub explain: bool,
    /// Keep the code's structure and functionality
    #[arg(long)]
    pub preserve: bool,
    /// Gateway base URL (overrides config.toml)
    #[arg(long)]
    pub gateway: Option<String>,
    /// Anthropic API key (defaults to COPYCODE_API_KEY / ANTHROPIC_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,
    /// Print the built prompt and exit without calling the gateway
    #[arg(long)]
    pub print_prompt: bool,
    /// Also copy the result to the clipboard
    #[arg(long)]
    pub copy: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_source(file: Option<&PathBuf>) -> eyre::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Merge flags over config defaults. A key on the command line wins over
/// the one found in the environment.
fn build_request(
    args: &ProcessArgs,
    config: &AppConfig,
    source_text: String,
    env_key: Option<ApiKey>,
) -> ProcessingRequest {
    let api_key = args
        .api_key
        .as_deref()
        .and_then(ApiKey::new)
        .or(env_key)
        .map(|k| k.expose().to_owned());

    ProcessingRequest {
        api_key,
        source_text,
        mode: args.mode.unwrap_or(config.default_mode),
        comment_level: args.comments.unwrap_or(config.default_comment_level),
        preserve_structure: args.preserve,
        debug: args.debug,
        optimize: args.optimize,
        explain: args.explain,
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

pub async fn run_process(args: ProcessArgs) -> eyre::Result<()> {
    credentials::load_env_files();
    let config = load_config();

    let source = read_source(args.file.as_ref())?;
    let request = build_request(&args, &config, source, credentials::load_client_key());

    if args.print_prompt {
        if request.source_text.trim().is_empty() {
            return Err(eyre!(ValidationError::EmptySource));
        }
        print!("{}", build_prompt(&request));
        return Ok(());
    }

    let gateway_url = args.gateway.as_deref().unwrap_or(&config.gateway_url);
    let client = GatewayClient::new(gateway_url)?;

    let result = session::run(&client, request, config.allow_server_key)
        .await
        .map_err(|e| eyre!("{e}"))?;

    print!("{}", result.code);
    if !result.code.ends_with('\n') {
        println!();
    }

    if args.copy {
        let copied = clipboard::copy_to_clipboard(&result.code);
        let notification = clipboard::processed_notification(&copied);
        if notification.kind != NotificationKind::Success {
            eprintln!("{}", notification.message);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
