// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hookchain binary entry point.

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hookchain::cli::Cli;
use hookchain::commands;
use hookchain::env;
use hookchain::output::print_error;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(format_args!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Log to stderr, filtered by `HOOKCHAIN_LOG` (default `hookchain=warn`).
fn init_tracing() {
    let filter = env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("hookchain=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
