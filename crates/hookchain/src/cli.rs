// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing.

use crate::event::EventKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and exercise lifecycle hook chains
#[derive(Parser, Debug)]
#[command(name = "hookchain", version, about = "Inspect and exercise lifecycle hook chains")]
pub struct Cli {
    /// Project directory containing `.hookchain/`
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Directory containing the user settings file
    #[arg(long, global = true, env = "HOOKCHAIN_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the effective hook chain for one or every event kind
    List {
        /// Only this event kind
        #[arg(long)]
        event: Option<EventKind>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show which hooks an operation would run, and in what order
    Explain {
        event: EventKind,

        /// Operation name (or agent type for sub-agent stops)
        operation: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Run one handler with a payload, bypassing the chain
    Invoke {
        /// Handler path or name on PATH
        handler: String,

        #[arg(long)]
        event: EventKind,

        /// Payload JSON; a synthetic payload is used when omitted
        #[arg(long)]
        input: Option<String>,

        /// Subject for the synthetic payload
        #[arg(long, conflicts_with = "input")]
        operation: Option<String>,

        #[arg(long)]
        timeout_ms: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Dispatch an event through the effective chain.
    ///
    /// Exits 0 to proceed (printing the payload to use), 2 to suppress,
    /// and 1 to abort.
    Dispatch {
        event: EventKind,

        /// Payload JSON; read from stdin when omitted
        #[arg(long)]
        input: Option<String>,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
