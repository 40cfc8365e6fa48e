// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! HamDB server binary.
//!
//! ## Usage
//!
//! ```bash
//! # Serve on the default bind address with unbounded storage
//! hamdb serve
//!
//! # Bound every bucket store to 100k buckets
//! hamdb serve --bind 0.0.0.0:3000 --max-buckets 100000
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hamdb_server::{create_app, Registry};

/// Hamming-distance search database
#[derive(Parser, Debug)]
#[command(name = "hamdb")]
#[command(about = "Hamming-distance search database")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Host and port to bind
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,

        /// Per-bucket-store LRU capacity; 0 means unbounded stores
        #[arg(short, long, default_value = "0")]
        max_buckets: usize,

        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let Command::Serve { bind, max_buckets, debug } = args.command;

    // Initialize tracing
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let registry = Arc::new(Registry::new(max_buckets));
    let app = create_app(registry);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("Starting HamDB server on {}", bind);
    tracing::info!("Server version: {}", env!("CARGO_PKG_VERSION"));
    if max_buckets == 0 {
        tracing::info!("Storage: unbounded bucket stores");
    } else {
        tracing::info!("Storage: LRU bucket stores, {} buckets each", max_buckets);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
