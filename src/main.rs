#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdpsnap::commands;
use cdpsnap::errors::SnapError;

// Exit codes
const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "cdpsnap")]
#[command(about = "Capture screenshots and page info from a running Chrome via CDP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate a page and capture a screenshot plus a page-info log
    Capture {
        /// URL to navigate to
        url: String,

        /// Remote debugging endpoint of the running Chrome
        #[arg(long, default_value = "http://127.0.0.1:9222")]
        endpoint: String,

        /// Maximum readiness probe attempts
        #[arg(long, default_value = "3")]
        attempts: u32,

        /// Delay between probe attempts in milliseconds
        #[arg(long, default_value = "2000")]
        retry_delay_ms: u64,

        /// Navigation timeout in milliseconds
        #[arg(long, default_value = "30000")]
        timeout_ms: u64,

        /// Screenshot output path
        #[arg(short, long, default_value = "screenshot.png")]
        output: String,

        /// Page-info log output path
        #[arg(long, default_value = "page_info.log")]
        log: String,

        /// Viewport size (WIDTHxHEIGHT, e.g., 1920x1024)
        #[arg(long, default_value = "1920x1024")]
        viewport: String,

        /// Capture the full scrollable page instead of the viewport
        #[arg(long)]
        full_page: bool,
    },

    /// Check whether the debugging endpoint is reachable
    Check {
        /// Remote debugging endpoint of the running Chrome
        #[arg(long, default_value = "http://127.0.0.1:9222")]
        endpoint: String,

        /// Maximum readiness probe attempts
        #[arg(long, default_value = "3")]
        attempts: u32,

        /// Delay between probe attempts in milliseconds
        #[arg(long, default_value = "2000")]
        retry_delay_ms: u64,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", err);
            if let Some(hint) = err.suggestion() {
                eprintln!("Suggestion: {}", hint);
            }
            std::process::exit(err.exit_code());
        }
    }
}

async fn run() -> Result<(), SnapError> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdpsnap=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr) // Output logs to stderr
                .with_target(false), // Don't show target module in logs
        )
        .init();

    let cli = Cli::parse();

    // Ctrl-C flips the token; suspension points observe it and the process
    // exits 0 without leaving artifacts half-written.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received interrupt, exiting gracefully...");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Capture {
            url,
            endpoint,
            attempts,
            retry_delay_ms,
            timeout_ms,
            output,
            log,
            viewport,
            full_page,
        } => {
            commands::capture::handle_capture(
                url,
                endpoint,
                attempts,
                retry_delay_ms,
                timeout_ms,
                output,
                log,
                viewport,
                full_page,
                &cancel,
            )
            .await?
        }

        Commands::Check {
            endpoint,
            attempts,
            retry_delay_ms,
        } => commands::check::handle_check(endpoint, attempts, retry_delay_ms, &cancel).await?,

        Commands::Version => commands::version::handle_version().await?,
    }

    Ok(())
}
