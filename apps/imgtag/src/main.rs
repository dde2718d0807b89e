//! # imgtag - Image Catalog Server
//!
//! The main binary for the imgtag image catalog.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for catalog operations
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/imgtag (THE BINARY)          │
//! │                                              │
//! │   ┌─────────────┐        ┌─────────────┐     │
//! │   │    CLI      │        │  HTTP API   │     │
//! │   │   (clap)    │        │   (axum)    │     │
//! │   └──────┬──────┘        └──────┬──────┘     │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │  imgtag-core  │               │
//! │              │ (THE ENGINE)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Load a dataset and start the HTTP server
//! imgtag import -f images.json
//! imgtag server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! imgtag status
//! imgtag sample --tags sunset,beach --seed 42
//! ```

use clap::Parser;
use imgtag::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // IMGTAG_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("IMGTAG_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            if cli.verbose {
                "imgtag=debug,tower_http=debug".into()
            } else {
                "imgtag=info,tower_http=debug".into()
            }
        });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Print the imgtag startup banner.
fn print_banner() {
    println!("imgtag v{} - tag sampling image catalog", env!("CARGO_PKG_VERSION"));
    println!();
}
